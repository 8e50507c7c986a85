#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! PDF statement to spreadsheet conversion.
//!
//! A [`Converter`] is built from a [`Profile`](profile::Profile) and runs
//! the whole pipeline for one document: page extraction
//! ([`extracto_pdf`]), parsing ([`extracto_parser`]) and spreadsheet
//! output ([`extracto_xlsx`]).
//!
//! Engine failures (unreadable PDF, OCR tools) abort with an error. A
//! document that yields no rows is not an error: [`Converter::convert`]
//! returns `None` and logs a warning.

pub mod profile;
pub mod progress;
pub mod registry;

use std::sync::Arc;

use extracto_parser::{ParseError, Parser};
use extracto_pdf::{PdfError, PdfExtractor};
use extracto_statement_models::StatementLine;
use extracto_xlsx::XlsxError;

use crate::profile::Profile;
use crate::progress::ProgressCallback;

/// Errors that can occur during a conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Page extraction failed.
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// The profile's parser could not be built or run.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Writing the spreadsheet failed.
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A profile could not be found or parsed.
    #[error("Profile '{id}': {message}")]
    Profile {
        /// Profile id or file path.
        id: String,
        /// Description of what went wrong.
        message: String,
    },
}

/// Runs the conversion pipeline for one profile.
#[derive(Debug)]
pub struct Converter {
    profile: Profile,
    extractor: PdfExtractor,
    parser: Parser,
}

impl Converter {
    /// Builds the extractor and parser described by `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Parse`] if the profile's regex pattern is
    /// invalid or incomplete.
    pub fn new(profile: Profile) -> Result<Self, ConvertError> {
        let parser = Parser::from_config(&profile.parser, profile.amounts.decimal)?;
        let extractor = PdfExtractor::new(profile.extract_mode())
            .with_ocr_options(profile.source.ocr.clone());

        Ok(Self {
            profile,
            extractor,
            parser,
        })
    }

    /// Returns the profile the converter was built from.
    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Extracts and parses every statement line of `pdf`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Pdf`] if page extraction fails.
    pub fn extract_lines(
        &self,
        pdf: &[u8],
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Vec<StatementLine>, ConvertError> {
        log::info!(
            "[{}] Extracting {} text from {} bytes of PDF",
            self.profile.id,
            self.profile.source.text,
            pdf.len()
        );

        progress.set_message(format!("[{}] Reading pages", self.profile.id));
        let content = self.extractor.extract(pdf, &mut |idx, total| {
            if idx == 0 {
                progress.set_total(total as u64);
            }
            progress.set_position(idx as u64 + 1);
            log::debug!("[{}] Page {}/{total} extracted", self.profile.id, idx + 1);
        })?;
        progress.finish(format!(
            "[{}] {} page(s) read",
            self.profile.id,
            content.page_count()
        ));

        Ok(self.parser.parse(&content)?)
    }

    /// Converts `pdf` into `.xlsx` bytes.
    ///
    /// Returns `None` when no statement lines were found.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if extraction fails or the workbook cannot
    /// be written.
    pub fn convert(
        &self,
        pdf: &[u8],
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Option<Vec<u8>>, ConvertError> {
        let lines = self.extract_lines(pdf, progress)?;
        self.write(&lines)
    }

    /// Writes already-parsed lines into `.xlsx` bytes, or `None` if there
    /// are no lines.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Xlsx`] if the workbook cannot be written.
    pub fn write(&self, lines: &[StatementLine]) -> Result<Option<Vec<u8>>, ConvertError> {
        if lines.is_empty() {
            log::warn!(
                "[{}] No statement lines were extracted; nothing to write",
                self.profile.id
            );
            return Ok(None);
        }

        let bytes =
            extracto_xlsx::write_workbook(lines, &self.profile.sheet_name, &self.profile.theme)?;

        log::info!(
            "[{}] Conversion complete: {} line(s), {} bytes",
            self.profile.id,
            lines.len(),
            bytes.len()
        );

        Ok(Some(bytes))
    }
}

/// Looks up a built-in profile by id.
///
/// # Errors
///
/// Returns [`ConvertError::Profile`] if no built-in profile has that id.
pub fn builtin_profile(id: &str) -> Result<Profile, ConvertError> {
    registry::find_profile(id).ok_or_else(|| ConvertError::Profile {
        id: id.to_owned(),
        message: "no built-in profile with this id".to_owned(),
    })
}
