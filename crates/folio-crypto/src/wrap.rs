//! Content-key wrapping for envelopes

use folio_core::{FolioError, FolioResult};
use tracing::warn;
use zeroize::Zeroizing;

use crate::keys::{ContentKey, WrappingKey};
use crate::provider::CryptoProvider;

/// A content key sealed under a wrapping key, with its detached HMAC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKey {
    pub ciphertext: Vec<u8>,
    pub mac: Vec<u8>,
}

pub fn wrap_key(
    provider: &dyn CryptoProvider,
    wrapping: &WrappingKey,
    content: &ContentKey,
) -> FolioResult<WrappedKey> {
    let plaintext = content.to_bytes();
    let ciphertext = provider.seal(wrapping.cipher_key(), wrapping.nonce(), &plaintext[..])?;
    let mac = provider.hmac(wrapping.mac_key(), &ciphertext)?.to_vec();
    Ok(WrappedKey { ciphertext, mac })
}

/// Verify the tag, then decrypt and decode the content key.
pub fn unwrap_key(
    provider: &dyn CryptoProvider,
    wrapping: &WrappingKey,
    ciphertext: &[u8],
    mac: &[u8],
) -> FolioResult<ContentKey> {
    if !provider.verify_hmac(wrapping.mac_key(), ciphertext, mac)? {
        warn!("wrapped content key MAC mismatch");
        return Err(FolioError::Authentication {
            what: "wrapped content key",
        });
    }
    let plaintext = Zeroizing::new(provider.open(
        wrapping.cipher_key(),
        wrapping.nonce(),
        ciphertext,
    )?);
    ContentKey::from_bytes(&plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{derive_wrapping_key, RustCryptoProvider, WRAPPING_KEY_SIZE};
    use folio_core::ErrorKind;
    use proptest::prelude::*;

    fn wrapping_key(provider: &RustCryptoProvider) -> WrappingKey {
        let mut bytes = [0u8; WRAPPING_KEY_SIZE];
        provider.fill_random(&mut bytes);
        WrappingKey::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let provider = RustCryptoProvider::new();
        let wk = wrapping_key(&provider);
        let ck = ContentKey::generate(&provider);

        let wrapped = wrap_key(&provider, &wk, &ck).unwrap();
        let unwrapped = unwrap_key(&provider, &wk, &wrapped.ciphertext, &wrapped.mac).unwrap();
        assert_eq!(unwrapped, ck);
    }

    #[test]
    fn test_reader_unwraps_authors_key() {
        let provider = RustCryptoProvider::new();
        let author = provider.generate_key_pair();
        let reader = provider.generate_key_pair();
        let ck = ContentKey::generate(&provider);

        let author_wk = derive_wrapping_key(&provider, &author, reader.public_key()).unwrap();
        let wrapped = wrap_key(&provider, &author_wk, &ck).unwrap();

        let reader_wk = derive_wrapping_key(&provider, &reader, author.public_key()).unwrap();
        let unwrapped =
            unwrap_key(&provider, &reader_wk, &wrapped.ciphertext, &wrapped.mac).unwrap();
        assert_eq!(unwrapped, ck);
    }

    #[test]
    fn test_wrong_wrapping_key() {
        let provider = RustCryptoProvider::new();
        let ck = ContentKey::generate(&provider);
        let wrapped = wrap_key(&provider, &wrapping_key(&provider), &ck).unwrap();

        let err = unwrap_key(
            &provider,
            &wrapping_key(&provider),
            &wrapped.ciphertext,
            &wrapped.mac,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn test_tampered_ciphertext() {
        let provider = RustCryptoProvider::new();
        let wk = wrapping_key(&provider);
        let mut wrapped = wrap_key(&provider, &wk, &ContentKey::generate(&provider)).unwrap();
        wrapped.ciphertext[10] ^= 0x04;

        let err = unwrap_key(&provider, &wk, &wrapped.ciphertext, &wrapped.mac).unwrap_err();
        assert!(matches!(
            err,
            FolioError::Authentication {
                what: "wrapped content key"
            }
        ));
    }

    #[test]
    fn test_truncated_plaintext_is_length_mismatch() {
        // Correctly tagged but carrying a short key
        let provider = RustCryptoProvider::new();
        let wk = wrapping_key(&provider);
        let ciphertext = provider
            .seal(wk.cipher_key(), wk.nonce(), &[0u8; 64])
            .unwrap();
        let mac = provider.hmac(wk.mac_key(), &ciphertext).unwrap();

        let err = unwrap_key(&provider, &wk, &ciphertext, &mac).unwrap_err();
        assert!(matches!(err, FolioError::LengthMismatch { actual: 64, .. }));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn wrap_roundtrip(
            wk_bytes in proptest::collection::vec(any::<u8>(), WRAPPING_KEY_SIZE),
            ck_bytes in proptest::collection::vec(any::<u8>(), crate::CONTENT_KEY_SIZE),
        ) {
            let provider = RustCryptoProvider::new();
            let wk = WrappingKey::from_bytes(&wk_bytes).unwrap();
            let ck = ContentKey::from_bytes(&ck_bytes).unwrap();

            let wrapped = wrap_key(&provider, &wk, &ck).unwrap();
            let unwrapped = unwrap_key(&provider, &wk, &wrapped.ciphertext, &wrapped.mac).unwrap();
            prop_assert_eq!(unwrapped, ck);
        }
    }
}
