//! Caller-side checks of recovered content against entry metadata
//!
//! `unpack` authenticates every page and the metadata itself; these helpers
//! additionally tie the final content (and the full page ciphertext) back to
//! the sizes and MACs the author recorded.

use folio_core::{EntryMetadata, FolioError, FolioResult, Page};
use folio_crypto::{ContentKey, CryptoProvider};
use tracing::warn;

/// Check `content` against the recorded uncompressed size and MAC.
pub fn verify_content(
    provider: &dyn CryptoProvider,
    metadata: &EntryMetadata,
    content: &[u8],
    key: &ContentKey,
) -> FolioResult<()> {
    check_size("content", metadata.uncompressed_size, content.len())?;
    if !provider.verify_hmac(key.mac_key(), content, &metadata.uncompressed_mac)? {
        warn!("content MAC mismatch");
        return Err(FolioError::Authentication { what: "content" });
    }
    Ok(())
}

/// Check the concatenated page ciphertexts against the recorded size and MAC.
pub fn verify_ciphertext(
    provider: &dyn CryptoProvider,
    metadata: &EntryMetadata,
    pages: &[Page],
    key: &ContentKey,
) -> FolioResult<()> {
    let ciphertext: Vec<u8> = pages
        .iter()
        .flat_map(|p| p.ciphertext.iter().copied())
        .collect();
    check_size("page ciphertext", metadata.ciphertext_size, ciphertext.len())?;
    if !provider.verify_hmac(key.mac_key(), &ciphertext, &metadata.ciphertext_mac)? {
        warn!(pages = pages.len(), "page ciphertext MAC mismatch");
        return Err(FolioError::Authentication {
            what: "page ciphertext",
        });
    }
    Ok(())
}

fn check_size(what: &'static str, expected: u64, actual: usize) -> FolioResult<()> {
    if expected != actual as u64 {
        return Err(FolioError::LengthMismatch {
            what,
            expected: usize::try_from(expected).unwrap_or(usize::MAX),
            actual,
        });
    }
    Ok(())
}
