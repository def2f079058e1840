//! Injected cryptographic capability
//!
//! Everything that touches a primitive (randomness, AEAD, HMAC, secp256k1)
//! goes through [`CryptoProvider`]. [`RustCryptoProvider`] backs it with the
//! RustCrypto crates; [`SeededProvider`] swaps in a seeded RNG so tests get
//! reproducible keys and uploads.

use std::sync::Mutex;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use folio_core::{check_length, FolioError, FolioResult, MAC_SIZE, PUBLIC_KEY_SIZE};
use hmac::{Hmac, Mac};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::identity::KeyPair;
use crate::{KEY_SIZE, NONCE_SIZE, SECRET_KEY_SIZE, SHARED_SECRET_SIZE};

type HmacSha256 = Hmac<Sha256>;

/// Cryptographic operations needed by the packing pipeline.
///
/// Implementations must be stateless from the caller's point of view: every
/// method depends only on its arguments (and, for randomness, an internal
/// RNG), so pages can be processed from any thread.
pub trait CryptoProvider: Send + Sync {
    /// Fill `buf` with uniformly random bytes.
    fn fill_random(&self, buf: &mut [u8]);

    /// XChaCha20-Poly1305 encrypt. Output is ciphertext with the 16-byte tag appended.
    fn seal(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> FolioResult<Vec<u8>>;

    /// XChaCha20-Poly1305 decrypt. Fails with an authentication error on tag mismatch.
    fn open(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> FolioResult<Vec<u8>>;

    /// HMAC-SHA256 of `message` under `key`.
    fn hmac(&self, key: &[u8], message: &[u8]) -> FolioResult<[u8; MAC_SIZE]>;

    /// Constant-time check of `tag` against HMAC-SHA256(key, message).
    fn verify_hmac(&self, key: &[u8], message: &[u8], tag: &[u8]) -> FolioResult<bool> {
        let expected = self.hmac(key, message)?;
        Ok(expected[..].ct_eq(tag).into())
    }

    /// Load a secp256k1 private scalar and derive its public key.
    fn import_secret_key(&self, secret: &[u8]) -> FolioResult<KeyPair>;

    /// Generate a fresh secp256k1 key pair from this provider's randomness.
    fn generate_key_pair(&self) -> KeyPair {
        let mut candidate = Zeroizing::new([0u8; SECRET_KEY_SIZE]);
        loop {
            self.fill_random(&mut candidate[..]);
            // Zero and out-of-range scalars are rejected; resample
            if let Ok(pair) = self.import_secret_key(&candidate[..]) {
                return pair;
            }
        }
    }

    /// ECDH shared secret (x-coordinate) between `own` and a peer public key.
    fn ecdh(
        &self,
        own: &KeyPair,
        peer_public: &[u8],
    ) -> FolioResult<Zeroizing<[u8; SHARED_SECRET_SIZE]>>;
}

/// Production provider backed by the RustCrypto crates and the OS RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    pub fn new() -> Self {
        Self
    }
}

impl CryptoProvider for RustCryptoProvider {
    fn fill_random(&self, buf: &mut [u8]) {
        rand::rngs::OsRng.fill_bytes(buf);
    }

    fn seal(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> FolioResult<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new(key.into());
        cipher
            .encrypt(XNonce::from_slice(nonce), plaintext)
            .map_err(|e| FolioError::Other(anyhow::anyhow!("encryption failed: {e}")))
    }

    fn open(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> FolioResult<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new(key.into());
        cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| FolioError::Authentication {
                what: "AEAD ciphertext",
            })
    }

    fn hmac(&self, key: &[u8], message: &[u8]) -> FolioResult<[u8; MAC_SIZE]> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
            .map_err(|e| FolioError::Other(anyhow::anyhow!("HMAC key: {e}")))?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().into())
    }

    fn import_secret_key(&self, secret: &[u8]) -> FolioResult<KeyPair> {
        check_length("secret key", secret, SECRET_KEY_SIZE)?;
        let sk = k256::SecretKey::from_slice(secret)
            .map_err(|_| FolioError::malformed("secret key", "scalar out of range"))?;

        let point = sk.public_key().to_encoded_point(false);
        let mut public = [0u8; PUBLIC_KEY_SIZE];
        public.copy_from_slice(point.as_bytes());

        let mut scalar = [0u8; SECRET_KEY_SIZE];
        scalar.copy_from_slice(secret);
        Ok(KeyPair::from_parts(scalar, public))
    }

    fn ecdh(
        &self,
        own: &KeyPair,
        peer_public: &[u8],
    ) -> FolioResult<Zeroizing<[u8; SHARED_SECRET_SIZE]>> {
        let sk = k256::SecretKey::from_slice(own.secret_bytes())
            .map_err(|_| FolioError::malformed("secret key", "scalar out of range"))?;
        let peer = k256::PublicKey::from_sec1_bytes(peer_public)
            .map_err(|_| FolioError::InvalidPublicKey("point not on secp256k1".into()))?;

        let shared = k256::ecdh::diffie_hellman(sk.to_nonzero_scalar(), peer.as_affine());
        let mut out = Zeroizing::new([0u8; SHARED_SECRET_SIZE]);
        out.copy_from_slice(shared.raw_secret_bytes().as_slice());
        Ok(out)
    }
}

/// Provider with a seeded RNG: same seed, same keys, same uploads.
///
/// Primitives are delegated to [`RustCryptoProvider`]. Not for production use.
#[derive(Debug)]
pub struct SeededProvider {
    rng: Mutex<StdRng>,
    inner: RustCryptoProvider,
}

impl SeededProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            inner: RustCryptoProvider,
        }
    }
}

impl CryptoProvider for SeededProvider {
    fn fill_random(&self, buf: &mut [u8]) {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.fill_bytes(buf);
    }

    fn seal(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> FolioResult<Vec<u8>> {
        self.inner.seal(key, nonce, plaintext)
    }

    fn open(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> FolioResult<Vec<u8>> {
        self.inner.open(key, nonce, ciphertext)
    }

    fn hmac(&self, key: &[u8], message: &[u8]) -> FolioResult<[u8; MAC_SIZE]> {
        self.inner.hmac(key, message)
    }

    fn import_secret_key(&self, secret: &[u8]) -> FolioResult<KeyPair> {
        self.inner.import_secret_key(secret)
    }

    fn ecdh(
        &self,
        own: &KeyPair,
        peer_public: &[u8],
    ) -> FolioResult<Zeroizing<[u8; SHARED_SECRET_SIZE]>> {
        self.inner.ecdh(own, peer_public)
    }
}
