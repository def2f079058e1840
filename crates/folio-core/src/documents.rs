//! Document model: Page → Entry → Envelope
//!
//! Every stored object is a [`Document`]. Its canonical form is the protobuf
//! encoding of `folio.Document` (see `proto/documents.proto`); prost writes
//! fields in tag order, so equal documents always serialize to equal bytes and
//! therefore share a content address.
//!
//! Decoding validates everything with a fixed width (public keys, MACs,
//! content addresses) and rejects documents with a missing `oneof`.

use prost::Message;

use crate::error::{check_length, FolioError, FolioResult};
use crate::id::Id;
use crate::proto;

/// SEC1 uncompressed secp256k1 public key length
pub const PUBLIC_KEY_SIZE: usize = 65;

/// HMAC-SHA256 tag length
pub const MAC_SIZE: usize = 32;

/// One encrypted slice of an upload's compressed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub author_public_key: Vec<u8>,
    /// Zero-based position within the upload
    pub index: u32,
    pub ciphertext: Vec<u8>,
    /// HMAC over `ciphertext` under the content key's MAC key
    pub ciphertext_mac: Vec<u8>,
}

/// How an Entry refers to its pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPages {
    /// Single-page upload: the page is embedded directly
    Single(Page),
    /// Multi-page upload: ordered content addresses of the page documents
    Keys(Vec<Id>),
}

/// Describes one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub author_public_key: Vec<u8>,
    /// Seconds since the Unix epoch
    pub created_time: u32,
    pub metadata_ciphertext: Vec<u8>,
    pub metadata_ciphertext_mac: Vec<u8>,
    pub pages: EntryPages,
}

/// Reader-specific pointer into an upload, carrying the wrapped content key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub entry_key: Id,
    pub author_public_key: Vec<u8>,
    pub reader_public_key: Vec<u8>,
    pub content_key_ciphertext: Vec<u8>,
    pub content_key_ciphertext_mac: Vec<u8>,
}

/// Plaintext entry metadata, encrypted under the content key inside an Entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub media_type: String,
    pub compression_codec: String,
    /// Total length of all page ciphertexts
    pub ciphertext_size: u64,
    /// HMAC over the concatenation of all page ciphertexts
    pub ciphertext_mac: Vec<u8>,
    pub uncompressed_size: u64,
    /// HMAC over the uncompressed content
    pub uncompressed_mac: Vec<u8>,
}

/// A stored object. Closed over exactly the three document kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Envelope(Envelope),
    Entry(Entry),
    Page(Page),
}

impl Document {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Envelope(_) => "envelope",
            Self::Entry(_) => "entry",
            Self::Page(_) => "page",
        }
    }

    /// Canonical serialized bytes.
    pub fn encode(&self) -> Vec<u8> {
        proto::Document::from(self).encode_to_vec()
    }

    pub fn decode(bytes: &[u8]) -> FolioResult<Self> {
        let doc = proto::Document::decode(bytes)
            .map_err(|e| FolioError::malformed("document", e))?;
        Self::try_from(doc)
    }

    /// Content address: hash of the canonical bytes.
    pub fn key(&self) -> Id {
        Id::of(&self.encode())
    }

    pub fn into_page(self) -> FolioResult<Page> {
        match self {
            Self::Page(page) => Ok(page),
            other => Err(unexpected("page", &other)),
        }
    }

    pub fn into_entry(self) -> FolioResult<Entry> {
        match self {
            Self::Entry(entry) => Ok(entry),
            other => Err(unexpected("entry", &other)),
        }
    }

    pub fn into_envelope(self) -> FolioResult<Envelope> {
        match self {
            Self::Envelope(envelope) => Ok(envelope),
            other => Err(unexpected("envelope", &other)),
        }
    }
}

fn unexpected(expected: &'static str, actual: &Document) -> FolioError {
    FolioError::UnexpectedDocument {
        expected,
        actual: actual.type_name(),
    }
}

impl Page {
    /// Content address of this page wrapped in a Document.
    pub fn key(&self) -> Id {
        let doc = proto::Document {
            contents: Some(proto::document::Contents::Page(self.into())),
        };
        Id::of(&doc.encode_to_vec())
    }
}

impl EntryMetadata {
    pub fn encode(&self) -> Vec<u8> {
        proto::EntryMetadata::from(self).encode_to_vec()
    }

    pub fn decode(bytes: &[u8]) -> FolioResult<Self> {
        let m = proto::EntryMetadata::decode(bytes)
            .map_err(|e| FolioError::malformed("entry metadata", e))?;
        check_length("ciphertext MAC", &m.ciphertext_mac, MAC_SIZE)?;
        check_length("uncompressed MAC", &m.uncompressed_mac, MAC_SIZE)?;
        Ok(Self {
            media_type: m.media_type,
            compression_codec: m.compression_codec,
            ciphertext_size: m.ciphertext_size,
            ciphertext_mac: m.ciphertext_mac,
            uncompressed_size: m.uncompressed_size,
            uncompressed_mac: m.uncompressed_mac,
        })
    }
}

// Domain -> wire

impl From<&Page> for proto::Page {
    fn from(p: &Page) -> Self {
        Self {
            author_public_key: p.author_public_key.clone(),
            index: p.index,
            ciphertext: p.ciphertext.clone(),
            ciphertext_mac: p.ciphertext_mac.clone(),
        }
    }
}

impl From<&Entry> for proto::Entry {
    fn from(e: &Entry) -> Self {
        let contents = match &e.pages {
            EntryPages::Single(page) => proto::entry::Contents::Page(page.into()),
            EntryPages::Keys(keys) => proto::entry::Contents::PageKeys(proto::PageKeys {
                keys: keys.iter().map(|k| k.as_bytes().to_vec()).collect(),
            }),
        };
        Self {
            author_public_key: e.author_public_key.clone(),
            created_time: e.created_time,
            metadata_ciphertext: e.metadata_ciphertext.clone(),
            metadata_ciphertext_mac: e.metadata_ciphertext_mac.clone(),
            contents: Some(contents),
        }
    }
}

impl From<&Envelope> for proto::Envelope {
    fn from(e: &Envelope) -> Self {
        Self {
            entry_key: e.entry_key.as_bytes().to_vec(),
            author_public_key: e.author_public_key.clone(),
            reader_public_key: e.reader_public_key.clone(),
            content_key_ciphertext: e.content_key_ciphertext.clone(),
            content_key_ciphertext_mac: e.content_key_ciphertext_mac.clone(),
        }
    }
}

impl From<&Document> for proto::Document {
    fn from(d: &Document) -> Self {
        let contents = match d {
            Document::Envelope(e) => proto::document::Contents::Envelope(e.into()),
            Document::Entry(e) => proto::document::Contents::Entry(e.into()),
            Document::Page(p) => proto::document::Contents::Page(p.into()),
        };
        Self {
            contents: Some(contents),
        }
    }
}

impl From<&EntryMetadata> for proto::EntryMetadata {
    fn from(m: &EntryMetadata) -> Self {
        Self {
            media_type: m.media_type.clone(),
            compression_codec: m.compression_codec.clone(),
            ciphertext_size: m.ciphertext_size,
            ciphertext_mac: m.ciphertext_mac.clone(),
            uncompressed_size: m.uncompressed_size,
            uncompressed_mac: m.uncompressed_mac.clone(),
        }
    }
}

// Wire -> domain, validating fixed-width fields

impl TryFrom<proto::Page> for Page {
    type Error = FolioError;

    fn try_from(p: proto::Page) -> FolioResult<Self> {
        check_length("page author public key", &p.author_public_key, PUBLIC_KEY_SIZE)?;
        check_length("page ciphertext MAC", &p.ciphertext_mac, MAC_SIZE)?;
        Ok(Self {
            author_public_key: p.author_public_key,
            index: p.index,
            ciphertext: p.ciphertext,
            ciphertext_mac: p.ciphertext_mac,
        })
    }
}

impl TryFrom<proto::Entry> for Entry {
    type Error = FolioError;

    fn try_from(e: proto::Entry) -> FolioResult<Self> {
        check_length("entry author public key", &e.author_public_key, PUBLIC_KEY_SIZE)?;
        check_length("entry metadata MAC", &e.metadata_ciphertext_mac, MAC_SIZE)?;
        let pages = match e.contents {
            Some(proto::entry::Contents::Page(page)) => EntryPages::Single(page.try_into()?),
            Some(proto::entry::Contents::PageKeys(pk)) => {
                if pk.keys.is_empty() {
                    return Err(FolioError::malformed("entry", "empty page key list"));
                }
                EntryPages::Keys(
                    pk.keys
                        .iter()
                        .map(|k| Id::from_slice(k))
                        .collect::<FolioResult<Vec<_>>>()?,
                )
            }
            None => return Err(FolioError::malformed("entry", "neither page nor page keys set")),
        };
        Ok(Self {
            author_public_key: e.author_public_key,
            created_time: e.created_time,
            metadata_ciphertext: e.metadata_ciphertext,
            metadata_ciphertext_mac: e.metadata_ciphertext_mac,
            pages,
        })
    }
}

impl TryFrom<proto::Envelope> for Envelope {
    type Error = FolioError;

    fn try_from(e: proto::Envelope) -> FolioResult<Self> {
        check_length("envelope author public key", &e.author_public_key, PUBLIC_KEY_SIZE)?;
        check_length("envelope reader public key", &e.reader_public_key, PUBLIC_KEY_SIZE)?;
        check_length("envelope content key MAC", &e.content_key_ciphertext_mac, MAC_SIZE)?;
        Ok(Self {
            entry_key: Id::from_slice(&e.entry_key)?,
            author_public_key: e.author_public_key,
            reader_public_key: e.reader_public_key,
            content_key_ciphertext: e.content_key_ciphertext,
            content_key_ciphertext_mac: e.content_key_ciphertext_mac,
        })
    }
}

impl TryFrom<proto::Document> for Document {
    type Error = FolioError;

    fn try_from(d: proto::Document) -> FolioResult<Self> {
        match d.contents {
            Some(proto::document::Contents::Envelope(e)) => Ok(Self::Envelope(e.try_into()?)),
            Some(proto::document::Contents::Entry(e)) => Ok(Self::Entry(e.try_into()?)),
            Some(proto::document::Contents::Page(p)) => Ok(Self::Page(p.try_into()?)),
            None => Err(FolioError::malformed("document", "no contents set")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn test_page(index: u32) -> Page {
        Page {
            author_public_key: vec![4u8; PUBLIC_KEY_SIZE],
            index,
            ciphertext: vec![index as u8; 100],
            ciphertext_mac: vec![7u8; MAC_SIZE],
        }
    }

    fn test_entry(pages: EntryPages) -> Entry {
        Entry {
            author_public_key: vec![4u8; PUBLIC_KEY_SIZE],
            created_time: 1_700_000_000,
            metadata_ciphertext: vec![1, 2, 3],
            metadata_ciphertext_mac: vec![9u8; MAC_SIZE],
            pages,
        }
    }

    #[test]
    fn test_document_roundtrip_each_kind() {
        let docs = vec![
            Document::Page(test_page(3)),
            Document::Entry(test_entry(EntryPages::Single(test_page(0)))),
            Document::Entry(test_entry(EntryPages::Keys(vec![
                test_page(0).key(),
                test_page(1).key(),
            ]))),
            Document::Envelope(Envelope {
                entry_key: Id::of(b"entry"),
                author_public_key: vec![4u8; PUBLIC_KEY_SIZE],
                reader_public_key: vec![5u8; PUBLIC_KEY_SIZE],
                content_key_ciphertext: vec![8u8; 136],
                content_key_ciphertext_mac: vec![6u8; MAC_SIZE],
            }),
        ];

        for doc in docs {
            let decoded = Document::decode(&doc.encode()).unwrap();
            assert_eq!(decoded, doc);
            assert_eq!(decoded.key(), doc.key());
        }
    }

    #[test]
    fn test_encoding_is_canonical() {
        let a = Document::Page(test_page(1));
        let b = Document::Page(test_page(1));
        assert_eq!(a.encode(), b.encode());
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_page_key_matches_document_key() {
        let page = test_page(2);
        assert_eq!(page.key(), Document::Page(page.clone()).key());
    }

    #[test]
    fn test_entry_key_differs_from_embedded_page_key() {
        let page = test_page(0);
        let entry = Document::Entry(test_entry(EntryPages::Single(page.clone())));
        assert_ne!(entry.key(), page.key());
    }

    #[test]
    fn test_differing_documents_differ_in_key() {
        let mut other = test_page(1);
        other.ciphertext[0] ^= 1;
        assert_ne!(test_page(1).key(), other.key());
    }

    #[test]
    fn test_decode_rejects_short_public_key() {
        let mut page = test_page(0);
        page.author_public_key.truncate(33);
        let bytes = Document::Page(page).encode();

        let err = Document::decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(matches!(
            err,
            FolioError::LengthMismatch {
                expected: PUBLIC_KEY_SIZE,
                actual: 33,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_rejects_entry_without_page_keys() {
        let bytes = Document::Entry(test_entry(EntryPages::Keys(Vec::new()))).encode();

        let err = Document::decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(matches!(err, FolioError::Malformed { what: "entry", .. }));
    }

    #[test]
    fn test_decode_rejects_empty_document() {
        let err = Document::decode(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = Document::decode(&[0xff, 0xff, 0xff]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_into_wrong_kind() {
        let doc = Document::Page(test_page(0));
        let err = doc.into_entry().unwrap_err();
        assert!(matches!(
            err,
            FolioError::UnexpectedDocument {
                expected: "entry",
                actual: "page"
            }
        ));
    }

    #[test]
    fn test_metadata_roundtrip() {
        let metadata = EntryMetadata {
            media_type: "text/plain".into(),
            compression_codec: "zstd".into(),
            ciphertext_size: 1040,
            ciphertext_mac: vec![1u8; MAC_SIZE],
            uncompressed_size: 4096,
            uncompressed_mac: vec![2u8; MAC_SIZE],
        };
        let decoded = EntryMetadata::decode(&metadata.encode()).unwrap();
        assert_eq!(decoded, metadata);
    }
}
