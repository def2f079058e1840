//! folio-chunks: compression and page slicing
//!
//! # Overview
//! - `codec`: media-type driven codec selection and whole-buffer (de)compression
//! - `split`: fixed-size page boundaries over a compressed buffer

pub mod codec;
pub mod split;

// Convenience re-exports for the most common operations
pub use codec::{codec_for, compress, decompress, media_type_essence, Codec};
pub use split::{page_count, page_spans};
