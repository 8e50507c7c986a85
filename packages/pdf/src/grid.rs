//! Cell-grid reconstruction from page text.
//!
//! Handles two common statement table layouts:
//! - **Gap-separated cells**: columns are separated by runs of spaces
//!   (or tabs) wider than the spacing inside a cell
//! - **Fixed-width columns**: fields are at known character positions

use serde::Deserialize;

/// One table row: cell texts, left to right.
pub type Row = Vec<String>;

/// The rows of one page.
pub type Grid = Vec<Row>;

/// How a line of page text is split into cells.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridLayout {
    /// Split wherever at least `min_gap` consecutive spaces appear.
    Gaps {
        /// Minimum run of spaces separating two cells.
        #[serde(default = "default_min_gap")]
        min_gap: usize,
    },
    /// Split at fixed character positions.
    Columns {
        /// Character positions where each column starts. For example,
        /// `[0, 12, 30]` means column 1 is chars 0–11, column 2 is chars
        /// 12–29 and column 3 is the rest of the line.
        starts: Vec<usize>,
    },
}

const fn default_min_gap() -> usize {
    2
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::Gaps {
            min_gap: default_min_gap(),
        }
    }
}

/// Builds the grid for one page of text.
///
/// Each run of blank lines between text lines becomes a single empty
/// row, which ends a table. Blank lines at the start or end of the page
/// are dropped.
#[must_use]
pub fn page_grid(text: &str, layout: &GridLayout) -> Grid {
    let mut grid: Grid = Vec::new();
    let mut pending_blank = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            pending_blank = !grid.is_empty();
            continue;
        }
        if std::mem::take(&mut pending_blank) {
            grid.push(Row::new());
        }
        grid.push(match layout {
            GridLayout::Gaps { min_gap } => split_gaps(line, *min_gap),
            GridLayout::Columns { starts } => split_columns(line, starts),
        });
    }

    grid
}

/// Splits `line` on runs of at least `min_gap` spaces. A tab always
/// separates cells. Shorter runs stay inside the cell.
#[must_use]
pub fn split_gaps(line: &str, min_gap: usize) -> Row {
    let min_gap = min_gap.max(1);
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut spaces = 0usize;

    for ch in line.chars() {
        match ch {
            '\t' => spaces = spaces.max(min_gap),
            ' ' | '\u{a0}' => spaces += 1,
            _ => {
                if spaces >= min_gap {
                    if !current.is_empty() {
                        cells.push(std::mem::take(&mut current));
                    }
                } else if !current.is_empty() {
                    current.extend(std::iter::repeat_n(' ', spaces));
                }
                spaces = 0;
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        cells.push(current);
    }

    cells
}

/// Splits `line` at the given character positions.
///
/// Lines shorter than a column start yield an empty cell for that column.
#[must_use]
pub fn split_columns(line: &str, starts: &[usize]) -> Row {
    let chars: Vec<char> = line.chars().collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(chars.len());
            if start < chars.len() {
                let actual_end = end.min(chars.len()).max(start);
                chars[start..actual_end]
                    .iter()
                    .collect::<String>()
                    .trim()
                    .to_owned()
            } else {
                String::new()
            }
        })
        .collect()
}
