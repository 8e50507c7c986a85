#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Page extraction for PDF statements.
//!
//! Digitally generated statements carry a text layer that is read with
//! pure-Rust text extraction ([`pdf_extract`]). Scanned statements are
//! rasterized with `pdftoppm` and run through `tesseract` ([`ocr`]).
//! Either kind of page text can then be handed to the parser as plain
//! lines, or reconstructed into cell grids ([`grid`]) for the table
//! strategy.
//!
//! The primary entry point is [`PdfExtractor`].

pub mod grid;
pub mod ocr;
pub mod text;

use extracto_statement_models::TextSource;

pub use grid::{Grid, GridLayout, Row};
pub use ocr::OcrOptions;

/// Errors specific to PDF page extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The input does not look like a PDF document.
    #[error("input is not a PDF document")]
    NotPdf,

    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// An external tool (`pdftoppm`, `tesseract`) failed.
    #[error("{tool} failed: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Single-line description of the failure.
        message: String,
    },

    /// Tool output was not valid UTF-8.
    #[error("invalid UTF-8 in tool output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What kind of content to pull out of each page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractMode {
    /// Plain text lines, one list per page.
    Text(TextSource),
    /// Cell grids reconstructed from the page text, one grid per page.
    Table {
        /// Where the page text comes from.
        source: TextSource,
        /// How lines are split into cells.
        layout: GridLayout,
    },
}

impl ExtractMode {
    /// Returns the text source the mode reads from.
    #[must_use]
    pub const fn source(&self) -> TextSource {
        match self {
            Self::Text(source) | Self::Table { source, .. } => *source,
        }
    }
}

/// Extracted content of a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// Text lines per page.
    Lines(Vec<Vec<String>>),
    /// Cell grids per page.
    Grids(Vec<Grid>),
}

impl PageContent {
    /// Number of pages in the content.
    #[must_use]
    pub fn page_count(&self) -> usize {
        match self {
            Self::Lines(pages) => pages.len(),
            Self::Grids(grids) => grids.len(),
        }
    }
}

/// Extracts page content from PDF bytes.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    /// What to extract.
    mode: ExtractMode,
    /// Settings for the OCR tools (only used for [`TextSource::Ocr`]).
    ocr: OcrOptions,
}

impl PdfExtractor {
    /// Creates a new `PdfExtractor` with default OCR settings.
    #[must_use]
    pub fn new(mode: ExtractMode) -> Self {
        Self {
            mode,
            ocr: OcrOptions::default(),
        }
    }

    /// Overrides the OCR tool settings.
    #[must_use]
    pub fn with_ocr_options(mut self, options: OcrOptions) -> Self {
        self.ocr = options;
        self
    }

    /// Returns the configured extraction mode.
    #[must_use]
    pub const fn mode(&self) -> &ExtractMode {
        &self.mode
    }

    /// Extracts the content of every page.
    ///
    /// `on_page` is called after each page with the zero-based page index
    /// and the total page count.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the input is not a PDF, the text layer
    /// cannot be read, or an OCR tool fails.
    pub fn extract(
        &self,
        pdf: &[u8],
        on_page: &mut dyn FnMut(usize, usize),
    ) -> Result<PageContent, PdfError> {
        text::ensure_pdf(pdf)?;

        let pages = match self.mode.source() {
            TextSource::Native => {
                let pages = text::native_pages(pdf)?;
                let total = pages.len();
                for idx in 0..total {
                    on_page(idx, total);
                }
                pages
            }
            TextSource::Ocr => {
                let raster = ocr::rasterize(pdf, &self.ocr)?;
                let total = raster.page_count();
                let mut pages = Vec::with_capacity(total);
                for idx in 0..total {
                    pages.push(raster.recognize(idx, &self.ocr)?);
                    on_page(idx, total);
                }
                pages
            }
        };

        log::debug!(
            "Extracted {} page(s) of {} text",
            pages.len(),
            self.mode.source()
        );

        Ok(match &self.mode {
            ExtractMode::Text(_) => PageContent::Lines(
                pages
                    .iter()
                    .map(|page| page.lines().map(str::to_owned).collect())
                    .collect(),
            ),
            ExtractMode::Table { layout, .. } => PageContent::Grids(
                pages
                    .iter()
                    .map(|page| grid::page_grid(page, layout))
                    .collect(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_input() {
        let extractor = PdfExtractor::new(ExtractMode::Text(TextSource::Native));
        let err = extractor
            .extract(b"PK\x03\x04 not a pdf", &mut |_, _| {})
            .unwrap_err();
        assert!(matches!(err, PdfError::NotPdf));
    }

    #[test]
    fn table_mode_reports_its_source() {
        let mode = ExtractMode::Table {
            source: TextSource::Ocr,
            layout: GridLayout::default(),
        };
        assert_eq!(mode.source(), TextSource::Ocr);
    }

    #[test]
    fn page_count_covers_both_shapes() {
        let lines = PageContent::Lines(vec![vec!["a".to_owned()], vec![]]);
        let grids = PageContent::Grids(vec![vec![vec!["a".to_owned()]]]);
        assert_eq!(lines.page_count(), 2);
        assert_eq!(grids.page_count(), 1);
    }
}
