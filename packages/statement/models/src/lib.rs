#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Statement line record and the fixed accounting column schema.
//!
//! Every parsing strategy (OCR tokens, anchored regex, native tables)
//! produces [`StatementLine`] records. The spreadsheet writer lays them
//! out in [`Column::ALL`] order.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One column of the output sheet.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    /// Voucher identifier (first token of a line)
    Voucher,
    /// Transaction date (`DD-MM-YY`)
    TransactionDate,
    /// Form ("planilla") number
    FormNumber,
    /// Form type. Never populated by the parsers.
    FormType,
    /// Payment order number
    PaymentOrder,
    /// Payment date (`DD-MM-YY`)
    PaymentDate,
    /// Ledger entry / period code (`843/202208`)
    LedgerEntry,
    /// Free-text description
    Concept,
    /// Debit amount
    Debit,
    /// Credit amount
    Credit,
    /// Running balance
    Balance,
}

impl Column {
    /// All columns in sheet order.
    pub const ALL: [Self; 11] = [
        Self::Voucher,
        Self::TransactionDate,
        Self::FormNumber,
        Self::FormType,
        Self::PaymentOrder,
        Self::PaymentDate,
        Self::LedgerEntry,
        Self::Concept,
        Self::Debit,
        Self::Credit,
        Self::Balance,
    ];

    /// Header label written to the first row of the sheet.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Voucher => "Comprobante",
            Self::TransactionDate => "Fecha Transac.",
            Self::FormNumber => "Nro. Planilla",
            Self::FormType => "Tipo Planilla",
            Self::PaymentOrder => "Orden de Pago",
            Self::PaymentDate => "Fecha de Pago",
            Self::LedgerEntry => "Asiento/Periodo",
            Self::Concept => "Descripción Concepto",
            Self::Debit => "Débito",
            Self::Credit => "Crédito",
            Self::Balance => "Saldo",
        }
    }

    /// Whether the column holds a numeric amount.
    #[must_use]
    pub const fn is_monetary(self) -> bool {
        matches!(self, Self::Debit | Self::Credit | Self::Balance)
    }

    /// Zero-based position of the column in the sheet.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A single parsed statement line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementLine {
    /// Voucher identifier.
    pub voucher: String,
    /// Transaction date as printed.
    pub transaction_date: String,
    /// Form number.
    pub form_number: String,
    /// Form type placeholder.
    pub form_type: String,
    /// Payment order number.
    pub payment_order: String,
    /// Payment date as printed.
    pub payment_date: String,
    /// Ledger entry / period code.
    pub ledger_entry: String,
    /// Free-text description.
    pub concept: String,
    /// Debit amount.
    pub debit: f64,
    /// Credit amount.
    pub credit: f64,
    /// Running balance.
    pub balance: f64,
}

impl StatementLine {
    /// Returns the text value of a non-monetary column, or `None` for
    /// monetary columns.
    #[must_use]
    pub fn text(&self, column: Column) -> Option<&str> {
        let value = match column {
            Column::Voucher => &self.voucher,
            Column::TransactionDate => &self.transaction_date,
            Column::FormNumber => &self.form_number,
            Column::FormType => &self.form_type,
            Column::PaymentOrder => &self.payment_order,
            Column::PaymentDate => &self.payment_date,
            Column::LedgerEntry => &self.ledger_entry,
            Column::Concept => &self.concept,
            Column::Debit | Column::Credit | Column::Balance => return None,
        };
        Some(value.as_str())
    }

    /// Returns the amount of a monetary column, or `None` for text columns.
    #[must_use]
    pub const fn amount(&self, column: Column) -> Option<f64> {
        match column {
            Column::Debit => Some(self.debit),
            Column::Credit => Some(self.credit),
            Column::Balance => Some(self.balance),
            _ => None,
        }
    }

    /// Sets a text column. Monetary columns are ignored.
    pub fn set_text(&mut self, column: Column, value: String) {
        let slot = match column {
            Column::Voucher => &mut self.voucher,
            Column::TransactionDate => &mut self.transaction_date,
            Column::FormNumber => &mut self.form_number,
            Column::FormType => &mut self.form_type,
            Column::PaymentOrder => &mut self.payment_order,
            Column::PaymentDate => &mut self.payment_date,
            Column::LedgerEntry => &mut self.ledger_entry,
            Column::Concept => &mut self.concept,
            Column::Debit | Column::Credit | Column::Balance => return,
        };
        *slot = value;
    }

    /// Sets a monetary column. Text columns are ignored.
    pub const fn set_amount(&mut self, column: Column, value: f64) {
        match column {
            Column::Debit => self.debit = value,
            Column::Credit => self.credit = value,
            Column::Balance => self.balance = value,
            _ => {}
        }
    }
}

/// Where the text of a page comes from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TextSource {
    /// The PDF's own text layer (digitally generated statements)
    Native,
    /// OCR over rasterized pages (scanned statements)
    Ocr,
}

/// How thousands and decimal separators are interpreted in amounts.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DecimalConvention {
    /// Strip both `.` and `,`; any decimals are folded into the integer.
    StripAll,
    /// `,` groups thousands, `.` is the decimal point (`1,234.56`).
    Comma,
    /// `.` groups thousands, `,` is the decimal point (`1.234,56`).
    Dot,
    /// Guess per token from separator positions.
    #[default]
    Auto,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn columns_are_in_sheet_order() {
        for (i, column) in Column::ALL.iter().enumerate() {
            assert_eq!(column.index(), i);
        }
        assert_eq!(Column::ALL[7].header(), "Descripción Concepto");
    }

    #[test]
    fn only_last_three_columns_are_monetary() {
        let monetary: Vec<Column> = Column::ALL
            .into_iter()
            .filter(|c| c.is_monetary())
            .collect();
        assert_eq!(
            monetary,
            vec![Column::Debit, Column::Credit, Column::Balance]
        );
    }

    #[test]
    fn column_ids_round_trip_through_strum() {
        assert_eq!(Column::LedgerEntry.to_string(), "ledger_entry");
        assert_eq!(
            Column::from_str("payment_order").unwrap(),
            Column::PaymentOrder
        );
        assert!(Column::from_str("nope").is_err());
    }

    #[test]
    fn text_and_amount_accessors_split_by_kind() {
        let mut line = StatementLine::default();
        line.set_text(Column::Concept, "PAGO".to_owned());
        line.set_amount(Column::Credit, 12.5);
        line.set_text(Column::Debit, "ignored".to_owned());

        assert_eq!(line.text(Column::Concept), Some("PAGO"));
        assert_eq!(line.text(Column::Credit), None);
        assert_eq!(line.amount(Column::Credit), Some(12.5));
        assert_eq!(line.amount(Column::Concept), None);
        assert!(line.debit.abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_camel_case() {
        let line = StatementLine {
            voucher: "FC-1".to_owned(),
            ..StatementLine::default()
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["voucher"], "FC-1");
        assert_eq!(json["transactionDate"], "");
    }

    #[test]
    fn decimal_convention_parses_from_cli_text() {
        assert_eq!(
            DecimalConvention::from_str("strip_all").unwrap(),
            DecimalConvention::StripAll
        );
        assert_eq!(DecimalConvention::default(), DecimalConvention::Auto);
    }
}
