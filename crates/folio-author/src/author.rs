//! Upload/download facade

use std::sync::Arc;

use folio_core::{FolioConfig, FolioError, FolioResult, Id};
use folio_crypto::{ContentKey, CryptoProvider, KeyPair};
use folio_pack::{pack, unpack, verify_content, PackOptions};
use folio_storage::{DocumentStore, S3Credentials};
use tracing::info;

use crate::keychain::{Keychain, MemoryKeychain};
use crate::ship::{Receiver, Shipper};

/// Client that uploads content into, and downloads it back out of, a
/// document store.
///
/// Each upload is addressed to one of the author's own self-reader keys, so
/// the same `Author` can always download what it uploaded.
pub struct Author {
    provider: Arc<dyn CryptoProvider>,
    author_keys: Arc<MemoryKeychain>,
    self_reader_keys: Arc<MemoryKeychain>,
    options: PackOptions,
    shipper: Shipper,
    receiver: Receiver,
}

impl Author {
    pub fn new(
        provider: Arc<dyn CryptoProvider>,
        store: DocumentStore,
        options: PackOptions,
        author_keys: MemoryKeychain,
        self_reader_keys: MemoryKeychain,
    ) -> FolioResult<Self> {
        if author_keys.is_empty() || self_reader_keys.is_empty() {
            return Err(FolioError::Config(
                "author and self-reader keychains must each hold at least one key".into(),
            ));
        }
        let all_keys = MemoryKeychain::union([&author_keys, &self_reader_keys]);
        let shipper = Shipper::new(store.clone(), provider.clone());
        let receiver = Receiver::new(store, provider.clone(), Arc::new(all_keys));
        Ok(Self {
            provider,
            author_keys: Arc::new(author_keys),
            self_reader_keys: Arc::new(self_reader_keys),
            options,
            shipper,
            receiver,
        })
    }

    /// Build the store from `config.storage` (S3 credentials from the
    /// environment) and pack with `config.pack` / `config.compression`.
    pub fn from_config(
        config: &FolioConfig,
        provider: Arc<dyn CryptoProvider>,
        author_keys: MemoryKeychain,
        self_reader_keys: MemoryKeychain,
    ) -> FolioResult<Self> {
        config.validate()?;
        let credentials = S3Credentials::from_env();
        let store = DocumentStore::from_config(&config.storage, credentials.as_ref())?;
        Self::new(
            provider,
            store,
            PackOptions::from(config),
            author_keys,
            self_reader_keys,
        )
    }

    pub fn author_keys(&self) -> &MemoryKeychain {
        &self.author_keys
    }

    pub fn self_reader_keys(&self) -> &MemoryKeychain {
        &self.self_reader_keys
    }

    /// Compress, encrypt, paginate and store `content`; returns the envelope's
    /// content address.
    pub async fn upload(&self, content: Vec<u8>, media_type: &str) -> FolioResult<Id> {
        let (author, reader) = self.sample_envelope_keys()?;
        let key = ContentKey::generate(self.provider.as_ref());
        let len = content.len();

        let provider = self.provider.clone();
        let media_type = media_type.to_string();
        let pack_key = key.clone();
        let author_public_key = author.public_key().to_vec();
        let options = self.options.clone();
        let packed = tokio::task::spawn_blocking(move || {
            pack(
                provider.as_ref(),
                &content,
                &media_type,
                &pack_key,
                &author_public_key,
                &options,
            )
        })
        .await
        .map_err(|e| FolioError::Other(e.into()))??;

        let envelope_key = self
            .shipper
            .ship_entry(&packed, author, reader.public_key(), &key)
            .await?;

        info!(
            envelope = %envelope_key,
            entry = %packed.entry_key,
            bytes = len,
            pages = packed.pages.len(),
            "upload complete"
        );
        Ok(envelope_key)
    }

    /// Fetch, decrypt and reassemble the content behind an envelope.
    pub async fn download(&self, envelope_key: &Id) -> FolioResult<Vec<u8>> {
        let received = self.receiver.receive_entry(envelope_key).await?;
        let pages = received.pages.len();

        let provider = self.provider.clone();
        let unpacked = tokio::task::spawn_blocking(move || {
            let unpacked = unpack(
                provider.as_ref(),
                &received.entry,
                &received.pages,
                &received.content_key,
            )?;
            verify_content(
                provider.as_ref(),
                &unpacked.metadata,
                &unpacked.content,
                &received.content_key,
            )?;
            Ok::<_, FolioError>(unpacked)
        })
        .await
        .map_err(|e| FolioError::Other(e.into()))??;

        info!(
            envelope = %envelope_key,
            bytes = unpacked.content.len(),
            pages,
            media_type = %unpacked.metadata.media_type,
            "download complete"
        );
        Ok(unpacked.content)
    }

    /// Give another reader access to an upload: a new envelope for the same
    /// entry, wrapping the same content key for `reader_public_key`.
    pub async fn share(&self, envelope_key: &Id, reader_public_key: &[u8]) -> FolioResult<Id> {
        let envelope = self.receiver.receive_envelope(envelope_key).await?;
        let key = self.receiver.content_key(&envelope)?;
        let author = self.sample_author_key()?;

        let (_, shared_key) = self
            .shipper
            .ship_envelope(envelope.entry_key, author, reader_public_key, &key)
            .await?;
        info!(envelope = %shared_key, entry = %envelope.entry_key, "shared entry");
        Ok(shared_key)
    }

    fn sample_author_key(&self) -> FolioResult<&KeyPair> {
        self.author_keys
            .sample(self.provider.as_ref())
            .ok_or_else(|| FolioError::MissingKey("author keychain is empty".into()))
    }

    fn sample_envelope_keys(&self) -> FolioResult<(&KeyPair, &KeyPair)> {
        let author = self.sample_author_key()?;
        let reader = self
            .self_reader_keys
            .sample(self.provider.as_ref())
            .ok_or_else(|| FolioError::MissingKey("self-reader keychain is empty".into()))?;
        Ok((author, reader))
    }
}
