//! Shipping packed entries to the document store and receiving them back

use std::sync::Arc;

use folio_core::{Document, Entry, EntryPages, Envelope, FolioError, FolioResult, Id, Page};
use folio_crypto::{ContentKey, CryptoProvider, KeyPair};
use folio_pack::{open_envelope, seal_envelope, PackedEntry};
use folio_storage::DocumentStore;
use futures::future::try_join_all;
use tracing::debug;

use crate::keychain::Keychain;

/// Publishes pages, entries and envelopes.
#[derive(Clone)]
pub struct Shipper {
    store: DocumentStore,
    provider: Arc<dyn CryptoProvider>,
}

impl Shipper {
    pub fn new(store: DocumentStore, provider: Arc<dyn CryptoProvider>) -> Self {
        Self { store, provider }
    }

    /// Store the pages (multi-page entries only), the entry, and an envelope
    /// for `reader_public_key`. Returns the envelope's content address.
    pub async fn ship_entry(
        &self,
        packed: &PackedEntry,
        author: &KeyPair,
        reader_public_key: &[u8],
        key: &ContentKey,
    ) -> FolioResult<Id> {
        let pages = packed.standalone_pages();
        if !pages.is_empty() {
            try_join_all(pages.iter().map(|page| async move {
                self.store.put(&Document::Page(page.clone())).await
            }))
            .await?;
            debug!(pages = pages.len(), "shipped pages");
        }

        let entry_key = self
            .store
            .put(&Document::Entry(packed.entry.clone()))
            .await?;
        if entry_key != packed.entry_key {
            return Err(FolioError::AddressMismatch {
                requested: packed.entry_key,
                actual: entry_key,
            });
        }

        let (_, envelope_key) = self
            .ship_envelope(entry_key, author, reader_public_key, key)
            .await?;
        Ok(envelope_key)
    }

    /// Wrap `key` for `reader_public_key` and store the envelope.
    pub async fn ship_envelope(
        &self,
        entry_key: Id,
        author: &KeyPair,
        reader_public_key: &[u8],
        key: &ContentKey,
    ) -> FolioResult<(Envelope, Id)> {
        let envelope = seal_envelope(
            self.provider.as_ref(),
            entry_key,
            author,
            reader_public_key,
            key,
        )?;
        let envelope_key = self.store.put(&Document::Envelope(envelope.clone())).await?;
        debug!(envelope = %envelope_key, entry = %entry_key, "shipped envelope");
        Ok((envelope, envelope_key))
    }
}

/// An entry fetched through one of its envelopes, ready to unpack.
#[derive(Debug, Clone)]
pub struct ReceivedEntry {
    pub envelope: Envelope,
    pub entry_key: Id,
    pub entry: Entry,
    /// Pages in index order; for single-page entries, the embedded page
    pub pages: Vec<Page>,
    pub content_key: ContentKey,
}

/// Fetches envelopes, entries and pages, recovering content keys with a
/// reader keychain.
#[derive(Clone)]
pub struct Receiver {
    store: DocumentStore,
    provider: Arc<dyn CryptoProvider>,
    reader_keys: Arc<dyn Keychain>,
}

impl Receiver {
    pub fn new(
        store: DocumentStore,
        provider: Arc<dyn CryptoProvider>,
        reader_keys: Arc<dyn Keychain>,
    ) -> Self {
        Self {
            store,
            provider,
            reader_keys,
        }
    }

    pub async fn receive_envelope(&self, envelope_key: &Id) -> FolioResult<Envelope> {
        self.store.get(envelope_key).await?.into_envelope()
    }

    /// Unwrap the envelope's content key with the matching reader key.
    pub fn content_key(&self, envelope: &Envelope) -> FolioResult<ContentKey> {
        let reader = self
            .reader_keys
            .get(&envelope.reader_public_key)
            .ok_or_else(|| FolioError::missing_key(&envelope.reader_public_key))?;
        open_envelope(self.provider.as_ref(), envelope, reader)
    }

    pub async fn receive_entry(&self, envelope_key: &Id) -> FolioResult<ReceivedEntry> {
        let envelope = self.receive_envelope(envelope_key).await?;
        let content_key = self.content_key(&envelope)?;

        let entry_key = envelope.entry_key;
        let entry = self.store.get(&entry_key).await?.into_entry()?;
        let pages = self.receive_pages(&entry).await?;
        debug!(entry = %entry_key, pages = pages.len(), "received entry");

        Ok(ReceivedEntry {
            envelope,
            entry_key,
            entry,
            pages,
            content_key,
        })
    }

    async fn receive_pages(&self, entry: &Entry) -> FolioResult<Vec<Page>> {
        match &entry.pages {
            EntryPages::Single(page) => Ok(vec![page.clone()]),
            EntryPages::Keys(keys) => {
                let docs = try_join_all(keys.iter().map(|k| self.store.get(k))).await?;
                docs.into_iter().map(Document::into_page).collect()
            }
        }
    }
}
