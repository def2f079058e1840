//! Paginator: compressed bytes ⇄ ordered, encrypted pages
//!
//! Pages are sealed and opened on the rayon pool; the only ordering
//! constraint is that reassembly concatenates in index order.

use folio_chunks::page_spans;
use folio_core::{FolioError, FolioResult, Page};
use folio_crypto::{decrypt_page, encrypt_page, ContentKey, CryptoProvider};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Split `compressed` into `page_size` slices and seal each one.
///
/// Always returns at least one page; an empty input gives one empty page.
pub fn paginate(
    provider: &dyn CryptoProvider,
    compressed: &[u8],
    key: &ContentKey,
    author_public_key: &[u8],
    page_size: usize,
) -> FolioResult<Vec<Page>> {
    let spans = page_spans(compressed.len(), page_size)?;
    debug!(
        bytes = compressed.len(),
        page_size,
        pages = spans.len(),
        "paginating"
    );

    spans
        .into_par_iter()
        .enumerate()
        .map(|(i, span)| {
            let index = i as u32;
            let ciphertext = encrypt_page(
                provider,
                key.cipher_key(),
                key.page_nonce_seed(),
                &compressed[span],
                index,
            )?;
            let ciphertext_mac = provider.hmac(key.mac_key(), &ciphertext)?.to_vec();
            Ok(Page {
                author_public_key: author_public_key.to_vec(),
                index,
                ciphertext,
                ciphertext_mac,
            })
        })
        .collect()
}

/// Verify, decrypt and concatenate pages supplied in index order.
///
/// At least one page is required and indices must run 0, 1, 2, … with no
/// gaps. Every page's MAC is checked
/// before its ciphertext is decrypted; nothing is returned unless every page
/// verifies.
pub fn unpaginate(
    provider: &dyn CryptoProvider,
    pages: &[Page],
    key: &ContentKey,
) -> FolioResult<Vec<u8>> {
    if pages.is_empty() {
        return Err(FolioError::PageCountMismatch {
            expected: 1,
            actual: 0,
        });
    }
    for (position, page) in pages.iter().enumerate() {
        let expected = position as u32;
        if page.index != expected {
            return Err(FolioError::OutOfOrderPage {
                expected,
                actual: page.index,
            });
        }
    }

    let slices = pages
        .par_iter()
        .map(|page| {
            if !provider.verify_hmac(key.mac_key(), &page.ciphertext, &page.ciphertext_mac)? {
                warn!(index = page.index, "page MAC mismatch");
                return Err(FolioError::Authentication { what: "page" });
            }
            decrypt_page(
                provider,
                key.cipher_key(),
                key.page_nonce_seed(),
                &page.ciphertext,
                page.index,
            )
        })
        .collect::<FolioResult<Vec<Vec<u8>>>>()?;

    debug!(pages = slices.len(), "unpaginated");
    Ok(slices.concat())
}
