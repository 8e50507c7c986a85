#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spreadsheet output for parsed statement lines.
//!
//! Writes a single named sheet with a dark header row, thin borders,
//! right-aligned amount columns, an auto-filter and a frozen header, and
//! returns the finished `.xlsx` bytes.

pub mod theme;

use extracto_statement_models::{Column, StatementLine};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

pub use rust_xlsxwriter::XlsxError;
pub use theme::{ColumnWidths, Theme};

/// Writes `lines` to a one-sheet workbook and returns its bytes.
///
/// # Errors
///
/// Returns [`XlsxError`] if the sheet name is invalid (empty, longer than
/// 31 characters, or containing `[]:*?/\`) or the workbook cannot be
/// serialized.
pub fn write_workbook(
    lines: &[StatementLine],
    sheet_name: &str,
    theme: &Theme,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let formats = Formats::new(theme);

    for column in Column::ALL {
        worksheet.write_string_with_format(0, col(column), column.header(), &formats.header)?;
    }

    for (i, line) in lines.iter().enumerate() {
        let row = u32::try_from(i + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        write_line(worksheet, row, line, &formats)?;
    }

    let last_row = u32::try_from(lines.len()).map_err(|_| XlsxError::RowColumnLimitError)?;
    worksheet.autofilter(0, 0, last_row, col(Column::Balance))?;
    worksheet.set_freeze_panes(1, 0)?;

    for (column, width) in Column::ALL.into_iter().zip(theme.widths.resolve(lines)) {
        worksheet.set_column_width(col(column), width)?;
    }

    let bytes = workbook.save_to_buffer()?;
    log::debug!(
        "Wrote {} row(s) to sheet '{sheet_name}' ({} bytes)",
        lines.len(),
        bytes.len()
    );

    Ok(bytes)
}

/// Cell formats derived from a [`Theme`].
struct Formats {
    header: Format,
    text: Format,
    amount: Format,
}

impl Formats {
    fn new(theme: &Theme) -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(theme.header_font_color())
                .set_background_color(theme.header_fill_color())
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
            amount: Format::new()
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Right)
                .set_num_format(&theme.number_format),
        }
    }
}

fn write_line(
    worksheet: &mut Worksheet,
    row: u32,
    line: &StatementLine,
    formats: &Formats,
) -> Result<(), XlsxError> {
    for column in Column::ALL {
        if let Some(amount) = line.amount(column) {
            worksheet.write_number_with_format(row, col(column), amount, &formats.amount)?;
        } else {
            let text = line.text(column).unwrap_or_default();
            worksheet.write_string_with_format(row, col(column), text, &formats.text)?;
        }
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
const fn col(column: Column) -> u16 {
    column.index() as u16
}
