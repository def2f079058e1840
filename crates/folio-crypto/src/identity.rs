//! secp256k1 key pairs for authors and readers

use std::fmt;

use folio_core::PUBLIC_KEY_SIZE;
use zeroize::Zeroizing;

use crate::SECRET_KEY_SIZE;

/// A secp256k1 private scalar and its SEC1 uncompressed public key.
///
/// The private half is zeroized on drop. Construct through
/// [`CryptoProvider::generate_key_pair`](crate::CryptoProvider::generate_key_pair)
/// or [`CryptoProvider::import_secret_key`](crate::CryptoProvider::import_secret_key).
#[derive(Clone)]
pub struct KeyPair {
    secret: Zeroizing<[u8; SECRET_KEY_SIZE]>,
    public: [u8; PUBLIC_KEY_SIZE],
}

impl KeyPair {
    /// Assemble a key pair. Callers are responsible for the two halves matching;
    /// providers do this after validating the scalar.
    pub fn from_parts(secret: [u8; SECRET_KEY_SIZE], public: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self {
            secret: Zeroizing::new(secret),
            public,
        }
    }

    pub fn secret_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.secret
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &hex::encode(&self.public[..8]))
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{CryptoProvider, RustCryptoProvider};

    #[test]
    fn test_debug_redacts_secret() {
        let kp = RustCryptoProvider::new().generate_key_pair();
        let debug = format!("{kp:?}");
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_debug_shows_public_prefix_hex() {
        let kp = RustCryptoProvider::new().generate_key_pair();
        assert_eq!(kp.public_key()[0], 0x04, "uncompressed SEC1 prefix");
        let debug = format!("{kp:?}");
        assert!(debug.contains(&hex::encode(&kp.public_key()[..8])));
        assert!(!debug.contains(&hex::encode(kp.secret_bytes())));
    }
}
