//! folio-pack: the packing pipeline
//!
//! - `paginate`: compressed bytes ⇄ encrypted, MAC-tagged pages (parallel)
//! - `pack`: compression + pagination + metadata → Entry, and back
//! - `envelope`: wrap the content key for a reader and point at the Entry
//! - `verify`: tie recovered content back to the recorded sizes and MACs

pub mod envelope;
pub mod pack;
pub mod paginate;
pub mod verify;

pub use envelope::{new_envelope, open_envelope, seal_envelope};
pub use pack::{pack, unpack, PackOptions, PackedEntry, Unpacked};
pub use paginate::{paginate, unpaginate};
pub use verify::{verify_ciphertext, verify_content};
