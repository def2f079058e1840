//! folio-author: upload/download over a document store
//!
//! - `keychain`: immutable key lookup by public key
//! - `ship`: `Shipper` publishes pages → entry → envelope; `Receiver` walks
//!   envelope → entry → pages back
//! - `author`: `Author::upload` / `Author::download` / `Author::share`

pub mod author;
pub mod keychain;
pub mod ship;

pub use author::Author;
pub use keychain::{Keychain, MemoryKeychain};
pub use ship::{ReceivedEntry, Receiver, Shipper};
