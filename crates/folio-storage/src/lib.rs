//! folio-storage: content-addressed document store over OpenDAL
//!
//! Documents live at `{prefix}/documents/{hex content address}`. The store
//! is the transport collaborator of the packing pipeline: it persists
//! finished documents and hands back only bytes that hash to the address
//! that was asked for.

pub mod health;
pub mod operator;
pub mod store;

pub use health::check_health;
pub use operator::{build_operator, S3Credentials};
pub use store::DocumentStore;
