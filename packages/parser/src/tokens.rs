//! Whitespace-token parsing of OCR text lines.
//!
//! Each statement line ends with three amounts (debit, credit, balance)
//! and starts with the voucher. Everything in between is located by
//! pattern: `DD-MM-YY` dates, a `digits/period` ledger code and a 3–4
//! digit payment order. The concept is whatever text sits between the
//! last located field and the debit amount.

use extracto_statement_models::{DecimalConvention, StatementLine};
use regex::Regex;

use crate::amount::{clean_amount, looks_monetary};
use crate::is_skipped;

/// Parser for OCR lines using positional tokens plus field patterns.
#[derive(Debug, Clone)]
pub struct TokenParser {
    /// Lines containing any of these are ignored.
    skip_markers: Vec<String>,
    /// How amounts are read.
    convention: DecimalConvention,
    date_re: Regex,
    ledger_re: Regex,
    order_re: Regex,
}

impl TokenParser {
    /// Creates a new `TokenParser`.
    #[must_use]
    pub fn new(skip_markers: Vec<String>, convention: DecimalConvention) -> Self {
        Self {
            skip_markers,
            convention,
            date_re: Regex::new(r"\d{2}-\d{2}-\d{2}").unwrap_or_else(|_| unreachable!()),
            ledger_re: Regex::new(r"\d+/\d{6}").unwrap_or_else(|_| unreachable!()),
            order_re: Regex::new(r"\s(\d{3,4})\s").unwrap_or_else(|_| unreachable!()),
        }
    }

    /// Parses one line. Returns `None` for headers, totals, short lines
    /// and lines whose last three tokens are not amounts.
    #[must_use]
    pub fn parse_line(&self, line: &str) -> Option<StatementLine> {
        let line = line.trim();
        if line.is_empty() || is_skipped(line, &self.skip_markers) {
            return None;
        }

        let tokens = token_spans(line);
        if tokens.len() < 4 {
            return None;
        }

        let n = tokens.len();
        let (debit_start, debit) = tokens[n - 3];
        let (_, credit) = tokens[n - 2];
        let (_, balance) = tokens[n - 1];

        if ![debit, credit, balance].into_iter().all(looks_monetary) {
            return None;
        }

        let (_, voucher) = tokens[0];
        let voucher_end = voucher.len();

        // Fields are only searched for before the amounts.
        let head = &line[..debit_start];

        let mut dates = self.date_re.find_iter(head);
        let transaction_date = dates.next();
        let payment_date = dates.next();

        let ledger = self.ledger_re.find(head);

        let form_number = transaction_date.and_then(|date| {
            let rest = &head[date.end()..];
            let token = rest.split_whitespace().next()?;
            let is_form = token.len() < 3 && token.chars().all(|c| c.is_ascii_digit());
            is_form.then(|| {
                let start = date.end() + rest.find(token).unwrap_or(0);
                (start + token.len(), token)
            })
        });

        let payment_order = self
            .order_re
            .captures(head)
            .and_then(|caps| caps.get(1))
            .map_or("", |m| m.as_str());

        let concept_start = ledger
            .map(|m| m.end())
            .or_else(|| payment_date.map(|m| m.end()))
            .or_else(|| form_number.map(|(end, _)| end))
            .unwrap_or(voucher_end);

        let concept = head
            .get(concept_start.max(voucher_end)..)
            .unwrap_or_default()
            .trim();

        Some(StatementLine {
            voucher: voucher.to_owned(),
            transaction_date: transaction_date.map_or("", |m| m.as_str()).to_owned(),
            form_number: form_number.map_or("", |(_, token)| token).to_owned(),
            form_type: String::new(),
            payment_order: payment_order.to_owned(),
            payment_date: payment_date.map_or("", |m| m.as_str()).to_owned(),
            ledger_entry: ledger.map_or("", |m| m.as_str()).to_owned(),
            concept: concept.to_owned(),
            debit: clean_amount(debit, self.convention),
            credit: clean_amount(credit, self.convention),
            balance: clean_amount(balance, self.convention),
        })
    }

    /// Parses every line of a page, dropping the ones that do not match.
    #[must_use]
    pub fn parse_page(&self, lines: &[String]) -> Vec<StatementLine> {
        lines.iter().filter_map(|l| self.parse_line(l)).collect()
    }
}

/// Splits `line` on whitespace, keeping each token's byte offset.
fn token_spans(line: &str) -> Vec<(usize, &str)> {
    let mut spans = Vec::new();
    let mut start = None;

    for (i, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push((s, &line[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, &line[s..]));
    }

    spans
}
