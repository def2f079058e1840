//! Page cipher
//!
//! Each page is sealed with XChaCha20-Poly1305 under the content key's cipher
//! key. The nonce is not stored: it is recomputed from the page-nonce seed and
//! the page index, so pages can be sealed and opened independently and in any
//! order. Index uniqueness within an upload gives nonce uniqueness.

use folio_core::FolioResult;

use crate::provider::CryptoProvider;
use crate::{KEY_SIZE, NONCE_SIZE, SEED_SIZE};

/// `HMAC-SHA256(seed, BE32(index))`, truncated to the AEAD nonce width.
pub fn derive_page_nonce(
    provider: &dyn CryptoProvider,
    seed: &[u8; SEED_SIZE],
    index: u32,
) -> FolioResult<[u8; NONCE_SIZE]> {
    let tag = provider.hmac(seed, &index.to_be_bytes())?;
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&tag[..NONCE_SIZE]);
    Ok(nonce)
}

/// Encrypt one page of compressed content.
pub fn encrypt_page(
    provider: &dyn CryptoProvider,
    cipher_key: &[u8; KEY_SIZE],
    seed: &[u8; SEED_SIZE],
    plaintext: &[u8],
    index: u32,
) -> FolioResult<Vec<u8>> {
    let nonce = derive_page_nonce(provider, seed, index)?;
    provider.seal(cipher_key, &nonce, plaintext)
}

/// Decrypt one page. Fails with an authentication error if the AEAD tag
/// does not verify, which includes decrypting under the wrong index.
pub fn decrypt_page(
    provider: &dyn CryptoProvider,
    cipher_key: &[u8; KEY_SIZE],
    seed: &[u8; SEED_SIZE],
    ciphertext: &[u8],
    index: u32,
) -> FolioResult<Vec<u8>> {
    let nonce = derive_page_nonce(provider, seed, index)?;
    provider.open(cipher_key, &nonce, ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RustCryptoProvider, TAG_SIZE};
    use folio_core::ErrorKind;
    use proptest::prelude::*;

    const KEY: [u8; KEY_SIZE] = [0x42; KEY_SIZE];
    const SEED: [u8; SEED_SIZE] = [0x17; SEED_SIZE];

    #[test]
    fn test_nonce_is_truncated_hmac() {
        let provider = RustCryptoProvider::new();
        let full = provider.hmac(&SEED, &7u32.to_be_bytes()).unwrap();
        let nonce = derive_page_nonce(&provider, &SEED, 7).unwrap();
        assert_eq!(nonce[..], full[..NONCE_SIZE]);
    }

    #[test]
    fn test_nonce_differs_per_index() {
        let provider = RustCryptoProvider::new();
        let n0 = derive_page_nonce(&provider, &SEED, 0).unwrap();
        let n1 = derive_page_nonce(&provider, &SEED, 1).unwrap();
        assert_ne!(n0, n1);
        assert_eq!(n0, derive_page_nonce(&provider, &SEED, 0).unwrap());
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let provider = RustCryptoProvider::new();
        let ct = encrypt_page(&provider, &KEY, &SEED, b"page body", 3).unwrap();
        assert_eq!(ct.len(), b"page body".len() + TAG_SIZE);

        let pt = decrypt_page(&provider, &KEY, &SEED, &ct, 3).unwrap();
        assert_eq!(pt, b"page body");
    }

    #[test]
    fn test_empty_page() {
        let provider = RustCryptoProvider::new();
        let ct = encrypt_page(&provider, &KEY, &SEED, b"", 0).unwrap();
        assert_eq!(ct.len(), TAG_SIZE);
        assert!(decrypt_page(&provider, &KEY, &SEED, &ct, 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_wrong_index_fails() {
        let provider = RustCryptoProvider::new();
        let ct = encrypt_page(&provider, &KEY, &SEED, b"page body", 0).unwrap();
        let err = decrypt_page(&provider, &KEY, &SEED, &ct, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn test_wrong_key_fails() {
        let provider = RustCryptoProvider::new();
        let ct = encrypt_page(&provider, &KEY, &SEED, b"page body", 0).unwrap();
        let err = decrypt_page(&provider, &[0u8; KEY_SIZE], &SEED, &ct, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    proptest! {
        #[test]
        fn bit_flip_never_decrypts(
            data in proptest::collection::vec(any::<u8>(), 0..512),
            pos in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let provider = RustCryptoProvider::new();
            let mut ct = encrypt_page(&provider, &KEY, &SEED, &data, 5).unwrap();
            let i = pos.index(ct.len());
            ct[i] ^= 1 << bit;
            prop_assert!(decrypt_page(&provider, &KEY, &SEED, &ct, 5).is_err());
        }
    }
}
