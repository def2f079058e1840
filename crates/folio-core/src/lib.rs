//! folio-core: content addresses, the Page → Entry → Envelope document model,
//! configuration schema, and the shared error taxonomy.

pub mod config;
pub mod documents;
pub mod error;
pub mod id;
pub mod logging;

pub use config::FolioConfig;
pub use documents::{
    Document, Entry, EntryMetadata, EntryPages, Envelope, Page, MAC_SIZE, PUBLIC_KEY_SIZE,
};
pub use error::{check_length, ErrorKind, FolioError, FolioResult};
pub use id::{Id, ID_SIZE};

/// Generated protobuf wire types (from documents.proto)
pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/folio.rs"));
}
