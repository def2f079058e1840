//! Fixed-size page boundaries
//!
//! A buffer of `len` bytes splits into `ceil(len / page_size)` contiguous
//! slices, every one full except possibly the last. An empty buffer still
//! yields one (empty) page so that every upload has at least one page.

use std::ops::Range;

use folio_core::{FolioError, FolioResult};

/// Number of pages needed for `len` bytes. Always at least 1.
pub fn page_count(len: usize, page_size: usize) -> FolioResult<u32> {
    if page_size == 0 {
        return Err(FolioError::Config("page size must be at least 1".into()));
    }
    let n = len.div_ceil(page_size).max(1);
    u32::try_from(n).map_err(|_| {
        FolioError::malformed(
            "content",
            format!("{len} bytes at page size {page_size} needs {n} pages (max {})", u32::MAX),
        )
    })
}

/// Byte ranges of each page, in index order.
pub fn page_spans(len: usize, page_size: usize) -> FolioResult<Vec<Range<usize>>> {
    let n = page_count(len, page_size)? as usize;
    Ok((0..n)
        .map(|i| {
            let start = (i * page_size).min(len);
            let end = ((i + 1) * page_size).min(len);
            start..end
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_input_is_one_page() {
        assert_eq!(page_spans(0, 4096).unwrap(), vec![0..0]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let spans = page_spans(8192, 4096).unwrap();
        assert_eq!(spans, vec![0..4096, 4096..8192]);
    }

    #[test]
    fn short_last_page() {
        let spans = page_spans(10_000, 4096).unwrap();
        let lens: Vec<usize> = spans.iter().map(|r| r.len()).collect();
        assert_eq!(lens, vec![4096, 4096, 1808]);
    }

    #[test]
    fn zero_page_size_rejected() {
        assert!(page_spans(10, 0).is_err());
    }

    proptest! {
        #[test]
        fn spans_cover_input_contiguously(len in 0usize..=100_000, page_size in 1usize..=8192) {
            let spans = page_spans(len, page_size).unwrap();
            prop_assert_eq!(spans.len(), len.div_ceil(page_size).max(1));
            let mut next = 0;
            for span in &spans {
                prop_assert_eq!(span.start, next);
                prop_assert!(span.len() <= page_size);
                next = span.end;
            }
            prop_assert_eq!(next, len);
        }
    }
}
