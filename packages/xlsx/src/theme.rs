//! Visual theme of the output sheet.

use extracto_statement_models::{Column, StatementLine};
use rust_xlsxwriter::Color;
use serde::Deserialize;

/// Width used for columns a fixed width list does not cover.
const FALLBACK_WIDTH: f64 = 15.0;

/// Colors, number format and column widths of the sheet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Header background as `0xRRGGBB`.
    pub header_fill: u32,
    /// Header font color as `0xRRGGBB`.
    pub header_font: u32,
    /// Excel number format for amount columns (`#,##0` or `#,##0.00`).
    pub number_format: String,
    /// Column widths.
    pub widths: ColumnWidths,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header_fill: 0x00_0000,
            header_font: 0xFF_FFFF,
            number_format: "#,##0".to_owned(),
            widths: ColumnWidths::default(),
        }
    }
}

impl Theme {
    pub(crate) const fn header_fill_color(&self) -> Color {
        Color::RGB(self.header_fill)
    }

    pub(crate) const fn header_font_color(&self) -> Color {
        Color::RGB(self.header_font)
    }
}

/// How column widths are chosen.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnWidths {
    /// One width per column, in sheet order.
    Fixed {
        /// Widths in Excel character units.
        widths: Vec<f64>,
    },
    /// Longest cell text plus padding, capped.
    Auto {
        /// Maximum width.
        #[serde(default = "default_cap")]
        cap: f64,
    },
}

const fn default_cap() -> f64 {
    50.0
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self::Fixed {
            widths: vec![
                20.0, 15.0, 12.0, 12.0, 15.0, 15.0, 18.0, 50.0, 15.0, 15.0, 15.0,
            ],
        }
    }
}

impl ColumnWidths {
    /// Returns the width of every column in [`Column::ALL`] order.
    #[must_use]
    pub fn resolve(&self, lines: &[StatementLine]) -> Vec<f64> {
        match self {
            Self::Fixed { widths } => Column::ALL
                .iter()
                .map(|c| widths.get(c.index()).copied().unwrap_or(FALLBACK_WIDTH))
                .collect(),
            Self::Auto { cap } => Column::ALL
                .iter()
                .map(|&column| {
                    let longest = lines
                        .iter()
                        .map(|line| cell_len(line, column))
                        .chain(std::iter::once(column.header().chars().count()))
                        .max()
                        .unwrap_or(0);
                    #[allow(clippy::cast_precision_loss)]
                    let width = (longest + 2) as f64;
                    width.min(*cap)
                })
                .collect(),
        }
    }
}

/// Displayed length of a cell: text length, or the grouped integer part
/// of an amount.
fn cell_len(line: &StatementLine, column: Column) -> usize {
    line.amount(column).map_or_else(
        || line.text(column).map_or(0, |t| t.chars().count()),
        |amount| {
            let digits = format!("{:.0}", amount.abs()).len();
            let groups = digits.saturating_sub(1) / 3;
            digits + groups + usize::from(amount < 0.0)
        },
    )
}
