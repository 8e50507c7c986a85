//! Native text-layer extraction.

use crate::PdfError;

/// How far into the file the `%PDF-` header may appear.
const HEADER_SEARCH_LIMIT: usize = 1024;

/// Checks that `pdf` carries a `%PDF-` header near the start of the file.
///
/// # Errors
///
/// Returns [`PdfError::NotPdf`] if no header is found.
pub fn ensure_pdf(pdf: &[u8]) -> Result<(), PdfError> {
    let head = &pdf[..pdf.len().min(HEADER_SEARCH_LIMIT)];
    if head.windows(5).any(|w| w == b"%PDF-") {
        Ok(())
    } else {
        Err(PdfError::NotPdf)
    }
}

/// Extracts the text layer of every page.
///
/// Scanned statements usually come back as empty strings here; those need
/// OCR instead.
///
/// # Errors
///
/// Returns [`PdfError::Extraction`] if the document cannot be parsed.
pub fn native_pages(pdf: &[u8]) -> Result<Vec<String>, PdfError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(pdf)
        .map_err(|e| PdfError::Extraction(format!("failed to extract text from PDF: {e}")))?;

    let chars: usize = pages.iter().map(String::len).sum();
    log::debug!("Extracted {chars} characters of text from {} page(s)", pages.len());

    if chars == 0 {
        log::warn!("PDF has no text layer; an OCR profile is probably needed");
    }

    Ok(pages)
}
