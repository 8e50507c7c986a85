//! Regex-based row extraction from statement lines.
//!
//! Applies an anchored regex with named capture groups to each line.
//! Group names are column identifiers (`voucher`, `transaction_date`,
//! ..., `balance`); an extra `concept_prefix` group is joined in front of
//! the concept.

use std::str::FromStr as _;

use extracto_statement_models::{Column, DecimalConvention, StatementLine};
use regex::Regex;

use crate::amount::clean_amount;
use crate::{ParseError, is_skipped};

/// Line layout of a detailed supplier statement: voucher, optional
/// free text, transaction date, form number, payment order, payment date,
/// ledger code, concept and the three amounts at the end of the line. An
/// amount printed as a lone dash reads as zero.
pub const DEFAULT_PATTERN: &str = concat!(
    r"^(?P<voucher>\S+)\s+",
    r"(?:(?P<concept_prefix>.*?)\s+)?",
    r"(?P<transaction_date>\d{2}-\d{2}-\d{2})\s+",
    r"(?P<form_number>\d+)\s+",
    r"(?P<payment_order>\d+)\s+",
    r"(?P<payment_date>\d{2}-\d{2}-\d{2})\s+",
    r"(?P<ledger_entry>\d+/\d{6})\s+",
    r"(?:(?P<concept>.*?)\s+)?",
    r"(?P<debit>-?[\d.,]+|[-\x{2013}\x{2014}])\s+",
    r"(?P<credit>-?[\d.,]+|[-\x{2013}\x{2014}])\s+",
    r"(?P<balance>-?[\d.,]+|[-\x{2013}\x{2014}])\s*$",
);

/// Name of the optional group prepended to the concept.
const CONCEPT_PREFIX: &str = "concept_prefix";

/// Parser that matches each line against a single anchored regex.
#[derive(Debug, Clone)]
pub struct RegexRowParser {
    re: Regex,
    /// Capture group name and the column it fills.
    groups: Vec<(String, Column)>,
    /// Lines containing any of these are ignored.
    skip_markers: Vec<String>,
    /// How amounts are read.
    convention: DecimalConvention,
}

impl RegexRowParser {
    /// Compiles `pattern` and maps its named groups to columns.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Regex`] if the pattern fails to compile, or
    /// [`ParseError::MissingGroup`] if it lacks a `debit`, `credit` or
    /// `balance` group.
    pub fn new(
        pattern: &str,
        skip_markers: Vec<String>,
        convention: DecimalConvention,
    ) -> Result<Self, ParseError> {
        let re = Regex::new(pattern)?;

        let mut groups = Vec::new();
        for name in re.capture_names().flatten() {
            if name == CONCEPT_PREFIX {
                continue;
            }
            match Column::from_str(name) {
                Ok(column) => groups.push((name.to_owned(), column)),
                Err(_) => log::warn!("Ignoring regex group '{name}': not a statement column"),
            }
        }

        for required in [Column::Debit, Column::Credit, Column::Balance] {
            if !groups.iter().any(|(_, c)| *c == required) {
                return Err(ParseError::MissingGroup(required.to_string()));
            }
        }

        log::debug!("Row pattern maps {} named groups", groups.len());

        Ok(Self {
            re,
            groups,
            skip_markers,
            convention,
        })
    }

    /// Parses one line, or `None` if it does not match.
    #[must_use]
    pub fn parse_line(&self, line: &str) -> Option<StatementLine> {
        let line = line.trim();
        if line.is_empty() || is_skipped(line, &self.skip_markers) {
            return None;
        }

        let caps = self.re.captures(line)?;
        let mut row = StatementLine::default();
        let mut has_amount = false;

        for (name, column) in &self.groups {
            let value = caps
                .name(name)
                .map(|m| m.as_str().trim())
                .unwrap_or_default();
            if column.is_monetary() {
                has_amount |= !value.is_empty();
                row.set_amount(*column, clean_amount(value, self.convention));
            } else {
                row.set_text(*column, value.to_owned());
            }
        }

        if !has_amount {
            return None;
        }

        if let Some(prefix) = caps.name(CONCEPT_PREFIX) {
            let prefix = prefix.as_str().trim();
            if !prefix.is_empty() {
                row.concept = if row.concept.is_empty() {
                    prefix.to_owned()
                } else {
                    format!("{prefix} {}", row.concept)
                };
            }
        }

        Some(row)
    }

    /// Parses every line of a page, dropping the ones that do not match.
    #[must_use]
    pub fn parse_page(&self, lines: &[String]) -> Vec<StatementLine> {
        let rows: Vec<StatementLine> = lines.iter().filter_map(|l| self.parse_line(l)).collect();
        log::debug!("Regex pattern matched {} of {} lines", rows.len(), lines.len());
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> RegexRowParser {
        RegexRowParser::new(
            DEFAULT_PATTERN,
            vec!["Totales".to_owned()],
            DecimalConvention::Dot,
        )
        .unwrap()
    }

    #[test]
    fn default_pattern_extracts_every_field() {
        let line = "FC-0001 15-08-22 0 1234 20-08-22 843/202208 PAGO FACTURA 55 1.500,50 0 2.500,50";
        let row = parser().parse_line(line).unwrap();

        assert_eq!(row.voucher, "FC-0001");
        assert_eq!(row.transaction_date, "15-08-22");
        assert_eq!(row.form_number, "0");
        assert_eq!(row.payment_order, "1234");
        assert_eq!(row.payment_date, "20-08-22");
        assert_eq!(row.ledger_entry, "843/202208");
        assert_eq!(row.concept, "PAGO FACTURA 55");
        assert!((row.debit - 1500.5).abs() < f64::EPSILON);
        assert!(row.credit.abs() < f64::EPSILON);
        assert!((row.balance - 2500.5).abs() < f64::EPSILON);
    }

    #[test]
    fn concept_prefix_is_joined() {
        let line = "OP-9 RETENCION 01-02-23 0 77 03-02-23 12/202302 IVA 10 0 10";
        let row = parser().parse_line(line).unwrap();
        assert_eq!(row.concept, "RETENCION IVA");
        assert_eq!(row.payment_order, "77");
    }

    #[test]
    fn empty_concept_is_allowed() {
        let line = "OP-9 01-02-23 0 77 03-02-23 12/202302 10 0 10";
        let row = parser().parse_line(line).unwrap();
        assert_eq!(row.concept, "");
    }

    #[test]
    fn dash_amounts_read_as_zero() {
        let line = "FC-0001 15-08-22 0 1234 20-08-22 843/202208 PAGO FACTURA 1.500,00 - 2.500,00";
        let row = parser().parse_line(line).unwrap();
        assert_eq!(row.concept, "PAGO FACTURA");
        assert!((row.debit - 1500.0).abs() < f64::EPSILON);
        assert!(row.credit.abs() < f64::EPSILON);
        assert!((row.balance - 2500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_matching_lines_are_dropped() {
        let p = parser();
        assert!(p.parse_line("EXTRACTO DE PROVEEDOR").is_none());
        assert!(p.parse_line("Totales 01-02-23 0 77 03-02-23 12/202302 X 1 2 3").is_none());
    }

    #[test]
    fn custom_pattern_needs_amount_groups() {
        let err = RegexRowParser::new(
            r"(?P<voucher>\S+) (?P<debit>\d+)",
            Vec::new(),
            DecimalConvention::Auto,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::MissingGroup(ref g) if g == "credit"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = RegexRowParser::new("(unclosed", Vec::new(), DecimalConvention::Auto).unwrap_err();
        assert!(matches!(err, ParseError::Regex(_)));
    }

    #[test]
    fn custom_pattern_with_unknown_groups() {
        let p = RegexRowParser::new(
            r"^(?P<voucher>\S+) (?P<extra>\S+) (?P<debit>\S+) (?P<credit>\S+) (?P<balance>\S+)$",
            Vec::new(),
            DecimalConvention::Comma,
        )
        .unwrap();
        let row = p.parse_line("A1 zzz 1,000.5 0 1,000.5").unwrap();
        assert_eq!(row.voucher, "A1");
        assert!((row.debit - 1000.5).abs() < f64::EPSILON);
    }
}
