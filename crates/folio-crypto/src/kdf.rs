//! Wrapping-key derivation: secp256k1 ECDH followed by HKDF-SHA256
//!
//! The derivation is symmetric, so the author (own secret, reader public) and
//! the reader (own secret, author public) arrive at the same [`WrappingKey`].

use folio_core::{FolioError, FolioResult};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::identity::KeyPair;
use crate::keys::{WrappingKey, WRAPPING_KEY_SIZE};
use crate::provider::CryptoProvider;

/// Derive the wrapping key shared between `own` and the holder of `peer_public`.
///
/// Fails only when `peer_public` is not a valid secp256k1 point.
pub fn derive_wrapping_key(
    provider: &dyn CryptoProvider,
    own: &KeyPair,
    peer_public: &[u8],
) -> FolioResult<WrappingKey> {
    let shared = provider.ecdh(own, peer_public)?;

    let hk = Hkdf::<Sha256>::new(None, &shared[..]);
    let mut okm = Zeroizing::new([0u8; WRAPPING_KEY_SIZE]);
    hk.expand(&[], &mut okm[..])
        .map_err(|e| FolioError::Other(anyhow::anyhow!("HKDF expand failed: {e}")))?;

    WrappingKey::from_bytes(&okm[..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RustCryptoProvider, SeededProvider, PUBLIC_KEY_SIZE};
    use folio_core::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_derivation_is_symmetric() {
        let provider = RustCryptoProvider::new();
        let author = provider.generate_key_pair();
        let reader = provider.generate_key_pair();

        let a = derive_wrapping_key(&provider, &author, reader.public_key()).unwrap();
        let b = derive_wrapping_key(&provider, &reader, author.public_key()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_peers_different_keys() {
        let provider = RustCryptoProvider::new();
        let author = provider.generate_key_pair();
        let r1 = provider.generate_key_pair();
        let r2 = provider.generate_key_pair();

        let k1 = derive_wrapping_key(&provider, &author, r1.public_key()).unwrap();
        let k2 = derive_wrapping_key(&provider, &author, r2.public_key()).unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_invalid_peer_public_key() {
        let provider = RustCryptoProvider::new();
        let own = provider.generate_key_pair();

        let err = derive_wrapping_key(&provider, &own, &[0x04; PUBLIC_KEY_SIZE]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);

        let err = derive_wrapping_key(&provider, &own, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_compressed_peer_key_accepted() {
        // SEC1 compressed form names the same point
        let provider = RustCryptoProvider::new();
        let author = provider.generate_key_pair();
        let reader = provider.generate_key_pair();

        let uncompressed = reader.public_key();
        let mut compressed = [0u8; 33];
        compressed[0] = 0x02 | (uncompressed[64] & 0x01);
        compressed[1..].copy_from_slice(&uncompressed[1..33]);

        let a = derive_wrapping_key(&provider, &author, uncompressed).unwrap();
        let b = derive_wrapping_key(&provider, &author, &compressed).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn wrapping_key_symmetry(seed_a in any::<u64>(), seed_b in any::<u64>()) {
            let a = SeededProvider::new(seed_a).generate_key_pair();
            let b = SeededProvider::new(seed_b).generate_key_pair();
            let provider = RustCryptoProvider::new();

            let ab = derive_wrapping_key(&provider, &a, b.public_key()).unwrap();
            let ba = derive_wrapping_key(&provider, &b, a.public_key()).unwrap();
            prop_assert_eq!(ab, ba);
        }
    }
}
