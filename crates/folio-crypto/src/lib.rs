//! folio-crypto: key hierarchy and ciphers for packed uploads
//!
//! Key hierarchy:
//! ```text
//! Author key pair ──ECDH── Reader public key
//!   └── Wrapping Key (HKDF-SHA256 of shared secret; per author/reader pair)
//!       └── wraps Content Key (per upload, random)
//!           ├── Page AEAD: XChaCha20-Poly1305 (key=cipher_key, nonce=HMAC(seed, BE32(index))[..24])
//!           ├── Page/metadata tags: HMAC-SHA256 (key=mac_key)
//!           └── Metadata AEAD: XChaCha20-Poly1305 (key=cipher_key, nonce=metadata_nonce)
//! ```
//!
//! Every ciphertext carries a detached HMAC that is verified before any
//! decryption is attempted. All primitives go through [`CryptoProvider`] so
//! callers can inject a deterministic implementation in tests.

pub mod identity;
pub mod kdf;
pub mod keys;
pub mod metadata;
pub mod page;
pub mod provider;
pub mod wrap;

pub use identity::KeyPair;
pub use kdf::derive_wrapping_key;
pub use keys::{ContentKey, WrappingKey, CONTENT_KEY_SIZE, WRAPPING_KEY_SIZE};
pub use metadata::{decrypt_metadata, encrypt_metadata, EncryptedMetadata};
pub use page::{decrypt_page, derive_page_nonce, encrypt_page};
pub use provider::{CryptoProvider, RustCryptoProvider, SeededProvider};
pub use wrap::{unwrap_key, wrap_key, WrappedKey};

/// Size of a symmetric cipher key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an XChaCha20-Poly1305 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of the page-nonce seed
pub const SEED_SIZE: usize = 32;

/// Size of an HMAC-SHA256 key
pub const MAC_KEY_SIZE: usize = 32;

/// Size of a secp256k1 private scalar
pub const SECRET_KEY_SIZE: usize = 32;

/// Size of the ECDH shared secret (x-coordinate)
pub const SHARED_SECRET_SIZE: usize = 32;

pub use folio_core::{MAC_SIZE, PUBLIC_KEY_SIZE};
