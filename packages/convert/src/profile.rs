//! Config-driven conversion profiles.
//!
//! A [`Profile`] captures everything that differs between statement
//! layouts: where page text comes from, which parsing strategy reads it,
//! how amounts are written and how the sheet looks. One generic pipeline
//! handles every profile.

use std::path::Path;

use extracto_parser::ParserConfig;
use extracto_pdf::{ExtractMode, GridLayout, OcrOptions};
use extracto_statement_models::{DecimalConvention, TextSource};
use extracto_xlsx::Theme;
use serde::Deserialize;

use crate::ConvertError;

// ── Top-level profile ────────────────────────────────────────────────────

/// A complete conversion profile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profile {
    /// Unique identifier (e.g., `"krona_ocr"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Name of the output sheet.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Where page content comes from.
    pub source: SourceConfig,
    /// How page content is parsed.
    pub parser: ParserConfig,
    /// How amounts are read.
    #[serde(default)]
    pub amounts: AmountConfig,
    /// Look of the output sheet.
    #[serde(default)]
    pub theme: Theme,
}

fn default_sheet_name() -> String {
    "Extracto".to_owned()
}

// ── Source config ────────────────────────────────────────────────────────

/// Where page content comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// Text layer or OCR.
    pub text: TextSource,
    /// OCR tool settings. Ignored for the native text layer.
    #[serde(default)]
    pub ocr: OcrOptions,
    /// Cell splitting for the table parser. Ignored by line parsers.
    #[serde(default)]
    pub layout: GridLayout,
}

// ── Amount config ────────────────────────────────────────────────────────

/// How amounts are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AmountConfig {
    /// Separator convention.
    #[serde(default)]
    pub decimal: DecimalConvention,
}

impl Profile {
    /// Overrides the sheet name.
    #[must_use]
    pub fn with_sheet_name(mut self, sheet_name: &str) -> Self {
        sheet_name.clone_into(&mut self.sheet_name);
        self
    }

    /// Overrides the decimal convention.
    #[must_use]
    pub const fn with_decimal(mut self, decimal: DecimalConvention) -> Self {
        self.amounts.decimal = decimal;
        self
    }

    /// The extraction mode implied by the source and parser settings.
    #[must_use]
    pub fn extract_mode(&self) -> ExtractMode {
        if self.parser.expects_grids() {
            ExtractMode::Table {
                source: self.source.text,
                layout: self.source.layout.clone(),
            }
        } else {
            ExtractMode::Text(self.source.text)
        }
    }
}

/// Parses a profile from a TOML string.
///
/// # Errors
///
/// Returns the TOML error message if the string is not a valid profile.
pub fn parse_profile_toml(toml_str: &str) -> Result<Profile, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

/// Loads a profile from a TOML file.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] if the file cannot be read, or
/// [`ConvertError::Profile`] if it is not a valid profile.
pub fn load_profile(path: &Path) -> Result<Profile, ConvertError> {
    let toml_str = std::fs::read_to_string(path)?;
    parse_profile_toml(&toml_str).map_err(|message| ConvertError::Profile {
        id: path.display().to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        id = "minimal"
        name = "Minimal"

        [source]
        text = "native"

        [parser]
        type = "tokens"
    "#;

    #[test]
    fn minimal_profile_uses_defaults() {
        let profile = parse_profile_toml(MINIMAL).unwrap();
        assert_eq!(profile.sheet_name, "Extracto");
        assert_eq!(profile.amounts.decimal, DecimalConvention::Auto);
        assert_eq!(profile.theme, Theme::default());
        assert_eq!(profile.source.ocr, OcrOptions::default());
        assert_eq!(profile.extract_mode(), ExtractMode::Text(TextSource::Native));
    }

    #[test]
    fn table_parser_implies_grid_extraction() {
        let profile = parse_profile_toml(
            r#"
            id = "t"
            name = "T"
            [source]
            text = "ocr"
            [source.layout]
            type = "gaps"
            min_gap = 3
            [parser]
            type = "table"
            "#,
        )
        .unwrap();

        assert_eq!(
            profile.extract_mode(),
            ExtractMode::Table {
                source: TextSource::Ocr,
                layout: GridLayout::Gaps { min_gap: 3 },
            }
        );
    }

    #[test]
    fn overrides_apply() {
        let profile = parse_profile_toml(MINIMAL)
            .unwrap()
            .with_sheet_name("Hoja 1")
            .with_decimal(DecimalConvention::Dot);
        assert_eq!(profile.sheet_name, "Hoja 1");
        assert_eq!(profile.amounts.decimal, DecimalConvention::Dot);
    }

    #[test]
    fn unknown_parser_type_is_rejected() {
        let err = parse_profile_toml(&MINIMAL.replace("tokens", "magic")).unwrap_err();
        assert!(err.contains("magic"), "{err}");
    }

    #[test]
    fn missing_profile_file_is_io_error() {
        let err = load_profile(Path::new("/nonexistent/extracto.toml")).unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
    }
}
