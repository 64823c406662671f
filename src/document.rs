//! Document text extraction.
//!
//! Page extraction itself belongs to an external reader; the core drives it
//! through [`DocumentReader`] and runs the normalization pipeline over the
//! result.

use crate::error::Result;
use crate::text::normalize::normalize_pages;

/// Parser for raw document bytes.
pub trait DocumentReader: Send + Sync {
    /// Parse the document into ordered per-page raw text.
    ///
    /// # Errors
    ///
    /// Returns `DocumentRead` when the bytes cannot be parsed.
    fn read_pages(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// Extract and normalize document text from `start_page` (1-based) onward.
///
/// Each page is normalized independently, pages are joined with a blank
/// line, and the joined result is normalized once more to repair artifacts
/// at page boundaries. A start page beyond the document yields an empty
/// string.
///
/// # Errors
///
/// Propagates the reader's `DocumentRead` error.
pub fn extract_text(
    reader: &dyn DocumentReader,
    bytes: &[u8],
    start_page: usize,
) -> Result<String> {
    let pages = reader.read_pages(bytes)?;
    let skip = start_page.max(1) - 1;
    if skip >= pages.len() {
        return Ok(String::new());
    }
    Ok(normalize_pages(&pages[skip..]))
}
