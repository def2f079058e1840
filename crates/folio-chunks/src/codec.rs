//! Whole-buffer compression with media-type driven codec selection
//!
//! Content that is already compressed (archives, most image formats, PDF) is
//! stored as-is under the `none` codec; everything else goes through zstd.
//! The codec identifier is recorded in entry metadata so the reader knows how
//! to undo it.

use std::fmt;
use std::str::FromStr;

use folio_core::config::CompressionConfig;
use folio_core::{FolioError, FolioResult};

/// A compression codec, identified on the wire by [`Codec::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Content passes through untouched
    None,
    /// zstd streaming compression
    Zstd,
}

impl Codec {
    pub const DEFAULT: Codec = Codec::Zstd;

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Zstd => "zstd",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Codec {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "zstd" => Ok(Self::Zstd),
            other => Err(FolioError::UnsupportedCodec(other.to_string())),
        }
    }
}

/// Media type without parameters, lowercased: `"Text/HTML; charset=utf-8"` → `"text/html"`.
pub fn media_type_essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Select the codec for some content's media type.
///
/// An empty media type gets the default codec.
pub fn codec_for(media_type: &str, config: &CompressionConfig) -> Codec {
    let essence = media_type_essence(media_type);
    if essence.is_empty() {
        return Codec::DEFAULT;
    }
    if config
        .skip_media_types
        .iter()
        .any(|skip| media_type_essence(skip) == essence)
    {
        return Codec::None;
    }
    Codec::DEFAULT
}

/// Compress a whole buffer.
pub fn compress(data: &[u8], codec: Codec, level: i32) -> FolioResult<Vec<u8>> {
    match codec {
        Codec::None => Ok(data.to_vec()),
        Codec::Zstd => Ok(zstd::encode_all(data, level)?),
    }
}

/// Decompress a whole buffer.
pub fn decompress(data: &[u8], codec: Codec) -> FolioResult<Vec<u8>> {
    match codec {
        Codec::None => Ok(data.to_vec()),
        Codec::Zstd => {
            zstd::decode_all(data).map_err(|e| FolioError::malformed("zstd content", e))
        }
    }
}
