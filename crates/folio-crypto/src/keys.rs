//! Content keys (per upload) and wrapping keys (per author/reader pair)
//!
//! Both have fixed-offset binary layouts:
//! ```text
//! ContentKey  (120 bytes): cipher_key[32] | page_nonce_seed[32] | mac_key[32] | metadata_nonce[24]
//! WrappingKey  (88 bytes): cipher_key[32] | nonce[24]           | mac_key[32]
//! ```
//! Deserialization rejects any other length before touching the bytes.

use folio_core::{check_length, FolioResult};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::provider::CryptoProvider;
use crate::{KEY_SIZE, MAC_KEY_SIZE, NONCE_SIZE, SEED_SIZE};

/// Serialized length of a [`ContentKey`]
pub const CONTENT_KEY_SIZE: usize = KEY_SIZE + SEED_SIZE + MAC_KEY_SIZE + NONCE_SIZE;

/// Serialized length of a [`WrappingKey`]
pub const WRAPPING_KEY_SIZE: usize = KEY_SIZE + NONCE_SIZE + MAC_KEY_SIZE;

/// Per-upload key material: encrypts pages and entry metadata. Zeroized on drop.
#[derive(Clone)]
pub struct ContentKey {
    cipher_key: [u8; KEY_SIZE],
    page_nonce_seed: [u8; SEED_SIZE],
    mac_key: [u8; MAC_KEY_SIZE],
    metadata_nonce: [u8; NONCE_SIZE],
}

impl ContentKey {
    /// Fresh, uniformly random key material for one upload.
    pub fn generate(provider: &dyn CryptoProvider) -> Self {
        let mut bytes = Zeroizing::new([0u8; CONTENT_KEY_SIZE]);
        provider.fill_random(&mut bytes[..]);
        Self::from_array(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> FolioResult<Self> {
        check_length("content key", bytes, CONTENT_KEY_SIZE)?;
        let mut array = Zeroizing::new([0u8; CONTENT_KEY_SIZE]);
        array.copy_from_slice(bytes);
        Ok(Self::from_array(&array))
    }

    fn from_array(bytes: &[u8; CONTENT_KEY_SIZE]) -> Self {
        let mut key = Self {
            cipher_key: [0u8; KEY_SIZE],
            page_nonce_seed: [0u8; SEED_SIZE],
            mac_key: [0u8; MAC_KEY_SIZE],
            metadata_nonce: [0u8; NONCE_SIZE],
        };
        let mut offset = 0;
        key.cipher_key
            .copy_from_slice(&bytes[offset..offset + KEY_SIZE]);
        offset += KEY_SIZE;
        key.page_nonce_seed
            .copy_from_slice(&bytes[offset..offset + SEED_SIZE]);
        offset += SEED_SIZE;
        key.mac_key
            .copy_from_slice(&bytes[offset..offset + MAC_KEY_SIZE]);
        offset += MAC_KEY_SIZE;
        key.metadata_nonce
            .copy_from_slice(&bytes[offset..offset + NONCE_SIZE]);
        key
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; CONTENT_KEY_SIZE]> {
        let mut out = Zeroizing::new([0u8; CONTENT_KEY_SIZE]);
        let mut offset = 0;
        out[offset..offset + KEY_SIZE].copy_from_slice(&self.cipher_key);
        offset += KEY_SIZE;
        out[offset..offset + SEED_SIZE].copy_from_slice(&self.page_nonce_seed);
        offset += SEED_SIZE;
        out[offset..offset + MAC_KEY_SIZE].copy_from_slice(&self.mac_key);
        offset += MAC_KEY_SIZE;
        out[offset..offset + NONCE_SIZE].copy_from_slice(&self.metadata_nonce);
        out
    }

    pub fn cipher_key(&self) -> &[u8; KEY_SIZE] {
        &self.cipher_key
    }

    pub fn page_nonce_seed(&self) -> &[u8; SEED_SIZE] {
        &self.page_nonce_seed
    }

    pub fn mac_key(&self) -> &[u8; MAC_KEY_SIZE] {
        &self.mac_key
    }

    /// Reserved for the single metadata encryption under this key.
    pub fn metadata_nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.metadata_nonce
    }
}

impl PartialEq for ContentKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes()[..].ct_eq(&other.to_bytes()[..]).into()
    }
}

impl Eq for ContentKey {}

impl Drop for ContentKey {
    fn drop(&mut self) {
        self.cipher_key.zeroize();
        self.page_nonce_seed.zeroize();
        self.mac_key.zeroize();
        self.metadata_nonce.zeroize();
    }
}

impl std::fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Per-relationship key that wraps content keys. Derived, never stored.
#[derive(Clone)]
pub struct WrappingKey {
    cipher_key: [u8; KEY_SIZE],
    nonce: [u8; NONCE_SIZE],
    mac_key: [u8; MAC_KEY_SIZE],
}

impl WrappingKey {
    pub fn from_bytes(bytes: &[u8]) -> FolioResult<Self> {
        check_length("wrapping key", bytes, WRAPPING_KEY_SIZE)?;
        let mut key = Self {
            cipher_key: [0u8; KEY_SIZE],
            nonce: [0u8; NONCE_SIZE],
            mac_key: [0u8; MAC_KEY_SIZE],
        };
        let mut offset = 0;
        key.cipher_key
            .copy_from_slice(&bytes[offset..offset + KEY_SIZE]);
        offset += KEY_SIZE;
        key.nonce.copy_from_slice(&bytes[offset..offset + NONCE_SIZE]);
        offset += NONCE_SIZE;
        key.mac_key
            .copy_from_slice(&bytes[offset..offset + MAC_KEY_SIZE]);
        Ok(key)
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; WRAPPING_KEY_SIZE]> {
        let mut out = Zeroizing::new([0u8; WRAPPING_KEY_SIZE]);
        out[..KEY_SIZE].copy_from_slice(&self.cipher_key);
        out[KEY_SIZE..KEY_SIZE + NONCE_SIZE].copy_from_slice(&self.nonce);
        out[KEY_SIZE + NONCE_SIZE..].copy_from_slice(&self.mac_key);
        out
    }

    pub fn cipher_key(&self) -> &[u8; KEY_SIZE] {
        &self.cipher_key
    }

    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    pub fn mac_key(&self) -> &[u8; MAC_KEY_SIZE] {
        &self.mac_key
    }
}

impl PartialEq for WrappingKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes()[..].ct_eq(&other.to_bytes()[..]).into()
    }
}

impl Eq for WrappingKey {}

impl Drop for WrappingKey {
    fn drop(&mut self) {
        self.cipher_key.zeroize();
        self.nonce.zeroize();
        self.mac_key.zeroize();
    }
}

impl std::fmt::Debug for WrappingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappingKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
