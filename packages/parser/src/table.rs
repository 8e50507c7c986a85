//! Statement table reconstruction from page cell grids.
//!
//! The header row is the anchor: it is the first row whose text mentions
//! both a debit column and a balance or credit column. Rows after it are
//! data until an all-empty row ends the table. A header repeated on a
//! later page, and anything above it, is dropped, even when the repeat
//! carries extra cells or splits differently. Every data row is
//! coerced to the header's column count.

use extracto_pdf::{Grid, Row};
use extracto_statement_models::{Column, DecimalConvention, StatementLine};

use crate::amount::parse_amount;

/// A reconstructed table: the header plus data rows of equal width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Header cells, trimmed.
    pub header: Row,
    /// Data rows, each exactly `header.len()` cells.
    pub rows: Vec<Row>,
}

/// Whether `row` looks like the statement header.
#[must_use]
pub fn is_header_row(row: &[String]) -> bool {
    let text = row.join(" ").to_lowercase();
    let has_debit = text.contains("debito") || text.contains("débito");
    let has_other =
        text.contains("saldo") || text.contains("credito") || text.contains("crédito");
    has_debit && has_other
}

/// Finds the header across `grids` (in document order) and collects the
/// data rows beneath it.
///
/// Rows containing any of `noise_markers` (case-insensitive) are skipped.
/// Returns `None` if no grid contains a header row.
#[must_use]
pub fn locate_table(grids: &[Grid], noise_markers: &[String]) -> Option<Table> {
    let noise: Vec<String> = noise_markers.iter().map(|m| m.to_lowercase()).collect();
    let mut header: Option<Row> = None;
    let mut rows = Vec::new();

    for (page, grid) in grids.iter().enumerate() {
        let start = match &header {
            None => {
                let Some(pos) = grid.iter().position(|r| is_header_row(r)) else {
                    log::debug!("Page {}: no header row yet", page + 1);
                    continue;
                };
                let cells: Row = grid[pos].iter().map(|c| c.trim().to_owned()).collect();
                log::debug!("Page {}: header found with {} columns", page + 1, cells.len());
                header = Some(cells);
                pos + 1
            }
            // A repeated header also drops the page preamble above it.
            Some(_) => grid
                .iter()
                .position(|r| is_header_row(r))
                .map_or(0, |pos| pos + 1),
        };

        let Some(width) = header.as_ref().map(Vec::len) else {
            continue;
        };

        for row in &grid[start..] {
            if is_blank(row) {
                break;
            }
            if is_header_row(row) || is_noise(row, &noise) {
                continue;
            }
            rows.push(fit_width(row, width));
        }
    }

    header.map(|header| Table { header, rows })
}

impl Table {
    /// Converts the table into statement lines.
    ///
    /// Header labels are matched to columns by keyword; unrecognised
    /// columns are ignored. Amount cells that are not numeric read as
    /// zero, and rows without a single numeric amount are discarded.
    #[must_use]
    pub fn to_lines(&self, convention: DecimalConvention) -> Vec<StatementLine> {
        let mapping = self.column_mapping();

        if !mapping.iter().flatten().any(|c| c.is_monetary()) {
            log::warn!("Table header has no recognisable amount columns: {:?}", self.header);
            return Vec::new();
        }

        self.rows
            .iter()
            .filter_map(|row| {
                let mut line = StatementLine::default();
                let mut has_amount = false;

                for (cell, column) in row.iter().zip(&mapping) {
                    let Some(column) = column else { continue };
                    let cell = cell.trim();
                    if column.is_monetary() {
                        if let Some(amount) = parse_amount(cell, convention) {
                            has_amount = true;
                            line.set_amount(*column, amount);
                        }
                    } else {
                        line.set_text(*column, cell.to_owned());
                    }
                }

                has_amount.then_some(line)
            })
            .collect()
    }

    /// The column each header cell maps to. Only the first header cell
    /// for a given column is used.
    fn column_mapping(&self) -> Vec<Option<Column>> {
        let mut seen = Vec::new();
        self.header
            .iter()
            .map(|label| {
                let column = column_for_header(label)?;
                if seen.contains(&column) {
                    log::debug!("Duplicate header for {column}: '{label}' ignored");
                    return None;
                }
                seen.push(column);
                Some(column)
            })
            .collect()
    }
}

/// Matches a header label to a statement column by keyword.
#[must_use]
pub fn column_for_header(label: &str) -> Option<Column> {
    let label = fold(label);
    let has = |word: &str| label.contains(word);

    Some(if has("debito") {
        Column::Debit
    } else if has("credito") {
        Column::Credit
    } else if has("saldo") {
        Column::Balance
    } else if has("comprobante") {
        Column::Voucher
    } else if has("fecha") && has("pago") {
        Column::PaymentDate
    } else if has("fecha") {
        Column::TransactionDate
    } else if has("orden") {
        Column::PaymentOrder
    } else if has("tipo") {
        Column::FormType
    } else if has("planilla") {
        Column::FormNumber
    } else if has("asiento") || has("periodo") {
        Column::LedgerEntry
    } else if has("concepto") || has("descripcion") || has("detalle") {
        Column::Concept
    } else {
        return None;
    })
}

/// Lowercases and strips Spanish accents.
fn fold(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            c => c,
        })
        .collect()
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn is_noise(row: &[String], noise: &[String]) -> bool {
    if noise.is_empty() {
        return false;
    }
    let text = row.join(" ").to_lowercase();
    noise.iter().any(|marker| text.contains(marker.as_str()))
}

/// Pads with empty cells or truncates to exactly `width` cells.
fn fit_width(row: &[String], width: usize) -> Row {
    let mut cells: Row = row.iter().take(width).map(|c| c.trim().to_owned()).collect();
    cells.resize(width, String::new());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|&c| c.to_owned()).collect()
    }

    fn header() -> Row {
        row(&["Comprobante", "Fecha", "Concepto", "Débito", "Crédito", "Saldo"])
    }

    #[test]
    fn detects_header_with_accent_variants() {
        assert!(is_header_row(&header()));
        assert!(is_header_row(&row(&["DEBITO", "CREDITO"])));
        assert!(is_header_row(&row(&["debito saldo"])));
        assert!(!is_header_row(&row(&["Débito", "Total"])));
        assert!(!is_header_row(&row(&["Saldo", "Crédito"])));
    }

    #[test]
    fn no_header_yields_none() {
        let grids = vec![vec![row(&["Fecha", "Importe"]), row(&["01-01-23", "100"])]];
        assert_eq!(locate_table(&grids, &[]), None);
    }

    #[test]
    fn rows_are_padded_and_truncated_to_header_width() {
        let grids = vec![vec![
            row(&["EMPRESA SA"]),
            header(),
            row(&["FC-1", "01-01-23", "PAGO"]),
            row(&["FC-2", "02-01-23", "PAGO", "1", "0", "1", "extra", "more"]),
        ]];
        let table = locate_table(&grids, &[]).unwrap();

        assert_eq!(table.header, header());
        assert_eq!(table.rows.len(), 2);
        for r in &table.rows {
            assert_eq!(r.len(), table.header.len());
        }
        assert_eq!(table.rows[0][5], "");
        assert_eq!(table.rows[1][5], "1");
    }

    #[test]
    fn blank_row_ends_the_table_on_that_page() {
        let grids = vec![vec![
            header(),
            row(&["FC-1", "01-01-23", "A", "1", "0", "1"]),
            row(&["", " "]),
            row(&["Firma", "Autorizada", "x", "y", "z", "w"]),
        ]];
        let table = locate_table(&grids, &[]).unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn repeated_headers_on_later_pages_are_excluded() {
        let grids = vec![
            vec![header(), row(&["FC-1", "01-01-23", "A", "1", "0", "1"])],
            vec![
                row(&["EMPRESA SA", "Página 2"]),
                header(),
                row(&["FC-2", "02-01-23", "B", "2", "0", "3"]),
            ],
            vec![row(&["FC-3", "03-01-23", "C", "0", "1", "2"])],
        ];
        let table = locate_table(&grids, &[]).unwrap();

        let vouchers: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(vouchers, vec!["FC-1", "FC-2", "FC-3"]);
    }

    #[test]
    fn header_variants_on_later_pages_are_excluded() {
        let mut repeated = header();
        repeated.push("Pág. 2".to_owned());
        let grids = vec![
            vec![header(), row(&["FC-1", "01-01-23", "A", "1", "0", "1"])],
            vec![
                row(&["EMPRESA SA"]),
                repeated,
                row(&["FC-2", "02-01-23", "B", "2", "0", "3"]),
                row(&["Comprobante Fecha", "Concepto", "Débito Crédito", "Saldo"]),
                row(&["FC-3", "03-01-23", "C", "0", "1", "2"]),
            ],
            vec![row(&["FC-4", "04-01-23", "D", "0", "1", "1"])],
        ];
        let lines = locate_table(&grids, &[])
            .unwrap()
            .to_lines(DecimalConvention::Auto);

        let vouchers: Vec<&str> = lines.iter().map(|l| l.voucher.as_str()).collect();
        assert_eq!(vouchers, vec!["FC-1", "FC-2", "FC-3", "FC-4"]);
    }

    #[test]
    fn noise_rows_are_skipped() {
        let grids = vec![vec![
            header(),
            row(&["FC-1", "01-01-23", "A", "1", "0", "1"]),
            row(&["TOTALES", "", "", "1", "0", "1"]),
        ]];
        let table = locate_table(&grids, &["Totales".to_owned()]).unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn header_labels_map_to_columns() {
        assert_eq!(column_for_header("Fecha Transac."), Some(Column::TransactionDate));
        assert_eq!(column_for_header("Fecha de Pago"), Some(Column::PaymentDate));
        assert_eq!(column_for_header("Nro. Planilla"), Some(Column::FormNumber));
        assert_eq!(column_for_header("Tipo Planilla"), Some(Column::FormType));
        assert_eq!(column_for_header("Orden de Pago"), Some(Column::PaymentOrder));
        assert_eq!(column_for_header("Asiento/Periodo"), Some(Column::LedgerEntry));
        assert_eq!(column_for_header("DESCRIPCIÓN CONCEPTO"), Some(Column::Concept));
        assert_eq!(column_for_header("CRÉDITO"), Some(Column::Credit));
        assert_eq!(column_for_header("Observaciones"), None);
    }

    #[test]
    fn to_lines_normalizes_amounts_and_drops_rows_without_them() {
        let table = Table {
            header: header(),
            rows: vec![
                row(&["FC-1", "01-01-23", "PAGO", "1.234,56", "", "1.234,56"]),
                row(&["", "", "continuación del concepto", "", "", ""]),
            ],
        };
        let lines = table.to_lines(DecimalConvention::Dot);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].voucher, "FC-1");
        assert_eq!(lines[0].transaction_date, "01-01-23");
        assert_eq!(lines[0].concept, "PAGO");
        assert!((lines[0].debit - 1234.56).abs() < f64::EPSILON);
        assert!(lines[0].credit.abs() < f64::EPSILON);
    }

    #[test]
    fn rows_with_text_in_amount_cells_are_dropped() {
        let table = Table {
            header: row(&["Comprobante", "Concepto", "Débito", "Crédito", "Saldo"]),
            rows: vec![
                row(&["", "Transporte", "", "", "Pasan"]),
                row(&["FC-1", "PAGO", "10", "", "10"]),
                row(&["FC-2", "NOTA", "-", "n/a", "10"]),
            ],
        };
        let lines = table.to_lines(DecimalConvention::Auto);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].voucher, "FC-1");
        assert_eq!(lines[1].voucher, "FC-2");
        assert!(lines[1].debit.abs() < f64::EPSILON);
        assert!(lines[1].credit.abs() < f64::EPSILON);
    }

    #[test]
    fn to_lines_without_amount_columns_is_empty() {
        let table = Table {
            header: row(&["Fecha", "Concepto"]),
            rows: vec![row(&["01-01-23", "X"])],
        };
        assert!(table.to_lines(DecimalConvention::Auto).is_empty());
    }
}
