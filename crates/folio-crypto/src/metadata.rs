//! Entry metadata cipher
//!
//! Metadata is encoded, sealed under the content key's cipher key and its
//! dedicated metadata nonce, then tagged with the content key's MAC key.
//! Decryption checks the tag before the AEAD is touched.

use folio_core::{EntryMetadata, FolioError, FolioResult};
use tracing::warn;

use crate::keys::ContentKey;
use crate::provider::CryptoProvider;

/// Sealed metadata plus its detached HMAC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMetadata {
    pub ciphertext: Vec<u8>,
    pub mac: Vec<u8>,
}

/// Each content key seals exactly one metadata record: its metadata nonce
/// must not be used again.
pub fn encrypt_metadata(
    provider: &dyn CryptoProvider,
    metadata: &EntryMetadata,
    key: &ContentKey,
) -> FolioResult<EncryptedMetadata> {
    let plaintext = metadata.encode();
    let ciphertext = provider.seal(key.cipher_key(), key.metadata_nonce(), &plaintext)?;
    let mac = provider.hmac(key.mac_key(), &ciphertext)?.to_vec();
    Ok(EncryptedMetadata { ciphertext, mac })
}

pub fn decrypt_metadata(
    provider: &dyn CryptoProvider,
    ciphertext: &[u8],
    mac: &[u8],
    key: &ContentKey,
) -> FolioResult<EntryMetadata> {
    if !provider.verify_hmac(key.mac_key(), ciphertext, mac)? {
        warn!("entry metadata MAC mismatch");
        return Err(FolioError::Authentication {
            what: "entry metadata",
        });
    }
    let plaintext = provider.open(key.cipher_key(), key.metadata_nonce(), ciphertext)?;
    EntryMetadata::decode(&plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RustCryptoProvider, MAC_SIZE};
    use folio_core::ErrorKind;

    fn sample_metadata() -> EntryMetadata {
        EntryMetadata {
            media_type: "text/plain".into(),
            compression_codec: "zstd".into(),
            ciphertext_size: 1234,
            ciphertext_mac: vec![1u8; MAC_SIZE],
            uncompressed_size: 5678,
            uncompressed_mac: vec![2u8; MAC_SIZE],
        }
    }

    #[test]
    fn test_metadata_roundtrip() {
        let provider = RustCryptoProvider::new();
        let key = ContentKey::generate(&provider);
        let metadata = sample_metadata();

        let sealed = encrypt_metadata(&provider, &metadata, &key).unwrap();
        assert_eq!(sealed.mac.len(), MAC_SIZE);

        let opened = decrypt_metadata(&provider, &sealed.ciphertext, &sealed.mac, &key).unwrap();
        assert_eq!(opened, metadata);
    }

    #[test]
    fn test_tampered_ciphertext_is_authentication_error() {
        let provider = RustCryptoProvider::new();
        let key = ContentKey::generate(&provider);
        let mut sealed = encrypt_metadata(&provider, &sample_metadata(), &key).unwrap();
        sealed.ciphertext[0] ^= 0x80;

        let err = decrypt_metadata(&provider, &sealed.ciphertext, &sealed.mac, &key).unwrap_err();
        assert!(matches!(
            err,
            FolioError::Authentication {
                what: "entry metadata"
            }
        ));
    }

    #[test]
    fn test_tampered_mac_is_authentication_error() {
        let provider = RustCryptoProvider::new();
        let key = ContentKey::generate(&provider);
        let mut sealed = encrypt_metadata(&provider, &sample_metadata(), &key).unwrap();
        sealed.mac[MAC_SIZE - 1] ^= 0x01;

        let err = decrypt_metadata(&provider, &sealed.ciphertext, &sealed.mac, &key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn test_wrong_content_key() {
        let provider = RustCryptoProvider::new();
        let key = ContentKey::generate(&provider);
        let other = ContentKey::generate(&provider);
        let sealed = encrypt_metadata(&provider, &sample_metadata(), &key).unwrap();

        let err = decrypt_metadata(&provider, &sealed.ciphertext, &sealed.mac, &other).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }
}
