//! Packer / unpacker
//!
//! ```text
//! pack:   content → compress → paginate → metadata → seal metadata → Entry
//! unpack: Entry → open metadata → match pages → unpaginate → decompress
//! ```
//!
//! Given the same content, key, codec and page size, `pack` is deterministic
//! apart from the Entry's creation timestamp. Pin it with
//! [`PackOptions::created_time`] to get byte-identical documents.

use std::time::{SystemTime, UNIX_EPOCH};

use folio_chunks::{codec_for, compress, decompress, Codec};
use folio_core::config::{CompressionConfig, DEFAULT_PAGE_SIZE};
use folio_core::{
    Document, Entry, EntryMetadata, EntryPages, FolioConfig, FolioError, FolioResult, Id, Page,
};
use folio_crypto::{decrypt_metadata, encrypt_metadata, ContentKey, CryptoProvider};
use tracing::debug;

use crate::paginate::{paginate, unpaginate};

/// Knobs for one [`pack`] call.
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Compressed bytes per page; must be at least 1
    pub page_size: usize,
    pub compression: CompressionConfig,
    /// Entry timestamp in Unix seconds. `None` uses the current time.
    pub created_time: Option<u32>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            compression: CompressionConfig::default(),
            created_time: None,
        }
    }
}

impl PackOptions {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }
}

impl From<&FolioConfig> for PackOptions {
    fn from(config: &FolioConfig) -> Self {
        Self {
            page_size: config.pack.page_size,
            compression: config.compression.clone(),
            created_time: None,
        }
    }
}

/// Everything `pack` produces for one upload.
#[derive(Debug, Clone)]
pub struct PackedEntry {
    pub entry: Entry,
    /// Content address of `entry`
    pub entry_key: Id,
    /// All pages in index order. A single page is also embedded in `entry`.
    pub pages: Vec<Page>,
    /// Plaintext of the metadata sealed inside `entry`
    pub metadata: EntryMetadata,
}

impl PackedEntry {
    /// Pages that must be stored as their own documents: none for a
    /// single-page upload.
    pub fn standalone_pages(&self) -> &[Page] {
        match self.entry.pages {
            EntryPages::Single(_) => &[],
            EntryPages::Keys(_) => &self.pages,
        }
    }
}

/// Recovered content with the metadata it was packed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpacked {
    pub content: Vec<u8>,
    pub metadata: EntryMetadata,
}

pub fn pack(
    provider: &dyn CryptoProvider,
    content: &[u8],
    media_type: &str,
    key: &ContentKey,
    author_public_key: &[u8],
    options: &PackOptions,
) -> FolioResult<PackedEntry> {
    let codec = codec_for(media_type, &options.compression);
    let compressed = compress(content, codec, options.compression.zstd_level)?;
    debug!(
        media_type,
        %codec,
        uncompressed = content.len(),
        compressed = compressed.len(),
        "compressed content"
    );

    let pages = paginate(provider, &compressed, key, author_public_key, options.page_size)?;

    let ciphertext: Vec<u8> = pages
        .iter()
        .flat_map(|p| p.ciphertext.iter().copied())
        .collect();
    let metadata = EntryMetadata {
        media_type: media_type.to_string(),
        compression_codec: codec.as_str().to_string(),
        ciphertext_size: ciphertext.len() as u64,
        ciphertext_mac: provider.hmac(key.mac_key(), &ciphertext)?.to_vec(),
        uncompressed_size: content.len() as u64,
        uncompressed_mac: provider.hmac(key.mac_key(), content)?.to_vec(),
    };
    let sealed = encrypt_metadata(provider, &metadata, key)?;

    let entry_pages = match pages.as_slice() {
        [single] => EntryPages::Single(single.clone()),
        many => EntryPages::Keys(many.iter().map(Page::key).collect()),
    };
    let entry = Entry {
        author_public_key: author_public_key.to_vec(),
        created_time: options.created_time.unwrap_or_else(now_secs),
        metadata_ciphertext: sealed.ciphertext,
        metadata_ciphertext_mac: sealed.mac,
        pages: entry_pages,
    };
    let entry_key = Document::Entry(entry.clone()).key();
    debug!(entry = %entry_key, pages = pages.len(), "packed entry");

    Ok(PackedEntry {
        entry,
        entry_key,
        pages,
        metadata,
    })
}

/// Reverse [`pack`].
///
/// For a multi-page entry, `pages` must be exactly the pages the entry
/// references, in order. For a single-page entry `pages` is ignored.
pub fn unpack(
    provider: &dyn CryptoProvider,
    entry: &Entry,
    pages: &[Page],
    key: &ContentKey,
) -> FolioResult<Unpacked> {
    let metadata = decrypt_metadata(
        provider,
        &entry.metadata_ciphertext,
        &entry.metadata_ciphertext_mac,
        key,
    )?;

    let pages: &[Page] = match &entry.pages {
        EntryPages::Single(page) => std::slice::from_ref(page),
        EntryPages::Keys(keys) => {
            check_page_keys(keys, pages)?;
            pages
        }
    };

    let compressed = unpaginate(provider, pages, key)?;
    let codec: Codec = metadata.compression_codec.parse()?;
    let content = decompress(&compressed, codec)?;
    debug!(
        %codec,
        pages = pages.len(),
        bytes = content.len(),
        "unpacked entry"
    );

    Ok(Unpacked { content, metadata })
}

fn check_page_keys(expected: &[Id], pages: &[Page]) -> FolioResult<()> {
    if expected.len() != pages.len() {
        return Err(FolioError::PageCountMismatch {
            expected: expected.len(),
            actual: pages.len(),
        });
    }
    for (index, (want, page)) in expected.iter().zip(pages).enumerate() {
        let actual = page.key();
        if actual != *want {
            return Err(FolioError::PageKeyMismatch {
                index,
                expected: *want,
                actual,
            });
        }
    }
    Ok(())
}

fn now_secs() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}
