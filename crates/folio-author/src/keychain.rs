//! Key lookup for authors and readers
//!
//! A keychain is an immutable collection of key pairs indexed by public key.
//! Nothing in folio writes private keys anywhere; persistence is the caller's
//! business.

use std::collections::HashMap;

use folio_crypto::{CryptoProvider, KeyPair};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Read-only lookup of private keys by public key.
pub trait Keychain: Send + Sync {
    /// Key pair whose public key is `public_key` (SEC1 uncompressed), if held.
    fn get(&self, public_key: &[u8]) -> Option<&KeyPair>;

    /// A key chosen uniformly with randomness drawn from `provider`; `None`
    /// when empty.
    fn sample(&self, provider: &dyn CryptoProvider) -> Option<&KeyPair>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`Keychain`].
#[derive(Debug, Clone, Default)]
pub struct MemoryKeychain {
    keys: Vec<KeyPair>,
    by_public: HashMap<Vec<u8>, usize>,
}

impl MemoryKeychain {
    pub fn new(keys: impl IntoIterator<Item = KeyPair>) -> Self {
        let mut chain = Self::default();
        for key in keys {
            let public = key.public_key().to_vec();
            if chain.by_public.contains_key(&public) {
                continue;
            }
            chain.by_public.insert(public, chain.keys.len());
            chain.keys.push(key);
        }
        chain
    }

    /// `n` fresh key pairs from `provider`.
    pub fn generate(provider: &dyn CryptoProvider, n: usize) -> Self {
        Self::new((0..n).map(|_| provider.generate_key_pair()))
    }

    /// All keys from every chain; duplicates collapse to one entry.
    pub fn union<'a>(chains: impl IntoIterator<Item = &'a MemoryKeychain>) -> Self {
        Self::new(chains.into_iter().flat_map(|c| c.keys.iter().cloned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyPair> {
        self.keys.iter()
    }
}

impl Keychain for MemoryKeychain {
    fn get(&self, public_key: &[u8]) -> Option<&KeyPair> {
        self.by_public.get(public_key).map(|&i| &self.keys[i])
    }

    fn sample(&self, provider: &dyn CryptoProvider) -> Option<&KeyPair> {
        if self.keys.is_empty() {
            return None;
        }
        let mut seed = <StdRng as SeedableRng>::Seed::default();
        provider.fill_random(&mut seed);
        let i = StdRng::from_seed(seed).gen_range(0..self.keys.len());
        self.keys.get(i)
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}
