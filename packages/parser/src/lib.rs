#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parsing of statement pages into [`StatementLine`] records.
//!
//! Three strategies cover the statement layouts seen so far:
//!
//! - [`tokens`]: OCR lines split on whitespace, with the amounts taken
//!   from the end of the line and the other fields found by pattern
//! - [`regex_rows`]: one anchored regex with named groups per line
//! - [`table`]: header-anchored table reconstruction over cell grids
//!
//! Lines and rows that do not match are dropped silently; the only
//! failure signal is an empty result.

pub mod amount;
pub mod regex_rows;
pub mod table;
pub mod tokens;

use extracto_pdf::PageContent;
use extracto_statement_models::{DecimalConvention, StatementLine};
use serde::Deserialize;

use crate::regex_rows::{DEFAULT_PATTERN, RegexRowParser};
use crate::tokens::TokenParser;

/// Errors that can occur while building or running a parser.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The configured regex pattern failed to compile.
    #[error("Invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),

    /// The configured regex pattern lacks a required named group.
    #[error("Regex pattern has no '{0}' group")]
    MissingGroup(String),

    /// The extracted content does not fit the parser (lines vs grids).
    #[error("{parser} parser cannot read {content}")]
    ContentMismatch {
        /// Strategy name of the parser.
        parser: &'static str,
        /// Kind of content it was given.
        content: &'static str,
    },
}

/// Parsing strategy and its settings, as written in a profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParserConfig {
    /// Whitespace tokens plus field patterns.
    Tokens {
        /// Lines containing any of these are ignored.
        #[serde(default = "default_skip_markers")]
        skip_markers: Vec<String>,
    },
    /// One anchored regex with named groups per line.
    Regex {
        /// Pattern override. Defaults to [`DEFAULT_PATTERN`].
        #[serde(default)]
        pattern: Option<String>,
        /// Lines containing any of these are ignored.
        #[serde(default = "default_skip_markers")]
        skip_markers: Vec<String>,
    },
    /// Header-anchored table reconstruction.
    Table {
        /// Rows containing any of these (case-insensitive) are ignored.
        #[serde(default = "default_noise_markers")]
        noise_markers: Vec<String>,
    },
}

fn default_skip_markers() -> Vec<String> {
    ["Comprobante", "Totales", "PERFECTA"]
        .map(str::to_owned)
        .to_vec()
}

fn default_noise_markers() -> Vec<String> {
    ["Totales", "Página"].map(str::to_owned).to_vec()
}

impl ParserConfig {
    /// Whether the strategy reads cell grids rather than text lines.
    #[must_use]
    pub const fn expects_grids(&self) -> bool {
        matches!(self, Self::Table { .. })
    }

    /// Short name of the configured strategy.
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Tokens { .. } => "tokens",
            Self::Regex { .. } => "regex",
            Self::Table { .. } => "table",
        }
    }
}

/// A ready-to-run parser.
#[derive(Debug, Clone)]
pub enum Parser {
    /// See [`tokens`].
    Tokens(TokenParser),
    /// See [`regex_rows`].
    Regex(RegexRowParser),
    /// See [`table`].
    Table {
        /// Rows containing any of these are ignored.
        noise_markers: Vec<String>,
        /// How amounts are read.
        convention: DecimalConvention,
    },
}

impl Parser {
    /// Builds the parser described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if a regex pattern is invalid or incomplete.
    pub fn from_config(
        config: &ParserConfig,
        convention: DecimalConvention,
    ) -> Result<Self, ParseError> {
        Ok(match config {
            ParserConfig::Tokens { skip_markers } => {
                Self::Tokens(TokenParser::new(skip_markers.clone(), convention))
            }
            ParserConfig::Regex {
                pattern,
                skip_markers,
            } => Self::Regex(RegexRowParser::new(
                pattern.as_deref().unwrap_or(DEFAULT_PATTERN),
                skip_markers.clone(),
                convention,
            )?),
            ParserConfig::Table { noise_markers } => Self::Table {
                noise_markers: noise_markers.clone(),
                convention,
            },
        })
    }

    /// Short strategy name for log messages.
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Tokens(_) => "tokens",
            Self::Regex(_) => "regex",
            Self::Table { .. } => "table",
        }
    }

    /// Parses the content of a whole document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::ContentMismatch`] if a line strategy is given
    /// grids or the table strategy is given lines.
    pub fn parse(&self, content: &PageContent) -> Result<Vec<StatementLine>, ParseError> {
        let rows: Vec<StatementLine> = match (self, content) {
            (Self::Tokens(parser), PageContent::Lines(pages)) => {
                pages.iter().flat_map(|page| parser.parse_page(page)).collect()
            }
            (Self::Regex(parser), PageContent::Lines(pages)) => {
                pages.iter().flat_map(|page| parser.parse_page(page)).collect()
            }
            (
                Self::Table {
                    noise_markers,
                    convention,
                },
                PageContent::Grids(grids),
            ) => match table::locate_table(grids, noise_markers) {
                Some(table) => {
                    log::debug!(
                        "Located table with {} columns and {} rows",
                        table.header.len(),
                        table.rows.len()
                    );
                    table.to_lines(*convention)
                }
                None => {
                    log::warn!("No header row mentioning debit and balance/credit was found");
                    Vec::new()
                }
            },
            (_, PageContent::Lines(_)) => {
                return Err(ParseError::ContentMismatch {
                    parser: self.strategy(),
                    content: "text lines",
                });
            }
            (_, PageContent::Grids(_)) => {
                return Err(ParseError::ContentMismatch {
                    parser: self.strategy(),
                    content: "cell grids",
                });
            }
        };

        log::info!(
            "Parsed {} statement line(s) from {} page(s) using {} strategy",
            rows.len(),
            content.page_count(),
            self.strategy()
        );

        Ok(rows)
    }
}

/// Whether `line` contains any of the skip markers.
pub(crate) fn is_skipped(line: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| line.contains(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(pages: &[&[&str]]) -> PageContent {
        PageContent::Lines(
            pages
                .iter()
                .map(|p| p.iter().map(|&l| l.to_owned()).collect())
                .collect(),
        )
    }

    #[test]
    fn tokens_config_defaults_skip_markers() {
        let config: ParserConfig = toml::from_str("type = \"tokens\"").unwrap();
        assert_eq!(
            config,
            ParserConfig::Tokens {
                skip_markers: default_skip_markers()
            }
        );
        assert!(!config.expects_grids());
    }

    #[test]
    fn table_config_reads_markers() {
        let config: ParserConfig =
            toml::from_str("type = \"table\"\nnoise_markers = [\"Subtotal\"]").unwrap();
        assert!(config.expects_grids());
        assert_eq!(
            config,
            ParserConfig::Table {
                noise_markers: vec!["Subtotal".to_owned()]
            }
        );
    }

    #[test]
    fn tokens_parser_runs_over_all_pages() {
        let parser = Parser::from_config(
            &ParserConfig::Tokens {
                skip_markers: default_skip_markers(),
            },
            DecimalConvention::StripAll,
        )
        .unwrap();
        let content = lines(&[
            &["Comprobante Fecha Débito Crédito Saldo", "FC-1 01-01-23 A 1 0 1"],
            &["FC-2 02-01-23 B 2 0 3", "Totales 3 0 3"],
        ]);

        let rows = parser.parse(&content).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].voucher, "FC-2");
    }

    #[test]
    fn regex_parser_uses_default_pattern() {
        let parser = Parser::from_config(
            &ParserConfig::Regex {
                pattern: None,
                skip_markers: Vec::new(),
            },
            DecimalConvention::Auto,
        )
        .unwrap();
        let content = lines(&[&["FC-1 01-01-23 0 123 02-01-23 5/202301 PAGO 10 0 10"]]);
        let rows = parser.parse(&content).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ledger_entry, "5/202301");
    }

    #[test]
    fn table_parser_returns_empty_without_header() {
        let parser = Parser::from_config(
            &ParserConfig::Table {
                noise_markers: Vec::new(),
            },
            DecimalConvention::Auto,
        )
        .unwrap();
        let content = PageContent::Grids(vec![vec![vec!["nothing".to_owned()]]]);
        assert!(parser.parse(&content).unwrap().is_empty());
    }

    #[test]
    fn table_parser_stops_at_blank_line_before_footer() {
        use extracto_pdf::grid::{GridLayout, page_grid};

        let page = "EMPRESA SA\n\
                    Comprobante  Concepto  Débito  Crédito  Saldo\n\
                    FC-1  PAGO  100  0  100\n\
                    FC-2  AJUSTE  0  40  60\n\
                    \n\
                    Firma  Sello  1  2  3\n";
        let parser = Parser::from_config(
            &ParserConfig::Table {
                noise_markers: Vec::new(),
            },
            DecimalConvention::Auto,
        )
        .unwrap();
        let content = PageContent::Grids(vec![page_grid(page, &GridLayout::default())]);

        let rows = parser.parse(&content).unwrap();
        let vouchers: Vec<&str> = rows.iter().map(|r| r.voucher.as_str()).collect();
        assert_eq!(vouchers, vec!["FC-1", "FC-2"]);
    }

    #[test]
    fn mismatched_content_is_an_error() {
        let parser = Parser::from_config(
            &ParserConfig::Table {
                noise_markers: Vec::new(),
            },
            DecimalConvention::Auto,
        )
        .unwrap();
        let err = parser.parse(&lines(&[&["x"]])).unwrap_err();
        assert!(matches!(err, ParseError::ContentMismatch { parser: "table", .. }));
    }
}
