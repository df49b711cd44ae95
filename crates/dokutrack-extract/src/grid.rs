//! Cell grid accessor.
//!
//! Both input sources (an uploaded workbook, CSV text from a published sheet)
//! collapse into one sparse [`CellGrid`] with a single read contract: `get`
//! returns the trimmed cell text, or `""` for anything absent. The rest of
//! the engine never learns which source produced the grid.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;

// ============================================================================
// Coordinates
// ============================================================================

/// 0-based cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRef {
    /// 0-based row (sheet row 1 = 0)
    pub row: u32,
    /// 0-based column (column A = 0)
    pub col: u32,
}

impl CellRef {
    /// Create a reference from 0-based indices
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Create a reference from a 1-based sheet row and a 0-based column.
    ///
    /// Layout row numbers are 1-based like the sheet itself; this keeps the
    /// off-by-one in exactly one place.
    pub fn at_sheet_row(sheet_row: u32, col: u32) -> Self {
        Self {
            row: sheet_row.saturating_sub(1),
            col,
        }
    }

    /// Parse an A1-style label ("D2", "CQ84"). Returns `None` for anything
    /// that is not letters followed by a 1-based row number.
    pub fn parse(label: &str) -> Option<Self> {
        let split = label.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = label.split_at(split);
        let col = column_index(letters)?;
        let row: u32 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        Some(Self { row: row - 1, col })
    }

    /// A1-style label for this reference
    pub fn label(&self) -> String {
        format!("{}{}", column_letter(self.col), self.row + 1)
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 0-based column index to spreadsheet letters (`25 -> "Z"`, `26 -> "AA"`).
///
/// Spreadsheet columns are bijective base-26: there is no zero digit, so the
/// usual divmod runs on `n - 1` each round.
pub fn column_letter(col: u32) -> String {
    let mut n = u64::from(col) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Spreadsheet letters to 0-based column index (`"AA" -> 26`).
///
/// Case-insensitive; returns `None` for empty or non-alphabetic input.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        n = n * 26 + u64::from(c.to_ascii_uppercase() as u8 - b'A') + 1;
    }
    Some((n - 1) as u32)
}

// ============================================================================
// Grid
// ============================================================================

/// A sparse, immutable-after-load view of one worksheet.
///
/// Reads never fail: absent cells are the empty string. A new grid is built
/// per load; extraction runs against a grid that can no longer change
/// underneath it.
#[derive(Clone, Debug, Default)]
pub struct CellGrid {
    cells: HashMap<CellRef, String>,
}

impl CellGrid {
    /// Create an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one cell. Values are trimmed; blank values clear the cell so the
    /// grid stays sparse.
    pub fn set(&mut self, cell: CellRef, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.cells.remove(&cell);
        } else if trimmed.len() == value.len() {
            self.cells.insert(cell, value);
        } else {
            self.cells.insert(cell, trimmed.to_string());
        }
    }

    /// Read a cell; `""` when the cell is absent
    pub fn get(&self, cell: CellRef) -> &str {
        self.cells.get(&cell).map(String::as_str).unwrap_or("")
    }

    /// Read a cell by A1-style label; `""` for absent cells and for labels
    /// that do not parse
    pub fn get_a1(&self, label: &str) -> &str {
        CellRef::parse(label).map(|c| self.get(c)).unwrap_or("")
    }

    /// Number of non-empty cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when no cell holds a value
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Load the first worksheet of a workbook (xlsx/xls/ods autodetected).
    ///
    /// Cells are stringified once here: whole floats render as integers so
    /// date serials survive as "45901", and datetime cells keep their serial
    /// number for the date normalizer to interpret.
    pub fn from_workbook_bytes(bytes: &[u8]) -> Result<Self, GridError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range?,
            None => return Err(GridError::NoWorksheet),
        };

        // Ranges start at the first used cell, not A1.
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut grid = Self::new();
        for (row_offset, row) in range.rows().enumerate() {
            for (col_offset, cell) in row.iter().enumerate() {
                let value = cell_text(cell);
                if value.is_empty() {
                    continue;
                }
                grid.set(
                    CellRef::new(start_row + row_offset as u32, start_col + col_offset as u32),
                    value,
                );
            }
        }

        tracing::debug!(cells = grid.len(), "loaded workbook grid");
        Ok(grid)
    }

    /// Load CSV text into the same coordinate space as a workbook.
    ///
    /// The text is headerless: CSV line 1 is sheet row 1. Rows may have
    /// ragged widths.
    pub fn from_csv_text(text: &str) -> Result<Self, GridError> {
        // A missing final newline would leave the line counter one short on
        // the last record.
        let text: Cow<'_, str> = if text.ends_with('\n') {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(format!("{text}\n"))
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        // Record positions cannot be trusted as sheet rows: a record after a
        // run of blank lines carries the position where scanning began, and a
        // quoted field spanning physical lines makes line numbers overshoot
        // logical rows. The row is tracked here instead: one per record, plus
        // one per blank line the read consumed, recovered as the line delta
        // minus the record's own physical span.
        let mut grid = Self::new();
        let mut record = csv::StringRecord::new();
        let mut row: u64 = 0;
        loop {
            let scan_from = reader.position().line();
            if !reader.read_record(&mut record)? {
                break;
            }
            let span = 1 + record
                .iter()
                .map(|field| field.matches('\n').count() as u64)
                .sum::<u64>();
            let content_line = reader.position().line().saturating_sub(span);
            row += content_line.saturating_sub(scan_from);
            for (col_idx, field) in record.iter().enumerate() {
                if field.trim().is_empty() {
                    continue;
                }
                grid.set(CellRef::new(row as u32, col_idx as u32), field);
            }
            row += 1;
        }

        tracing::debug!(cells = grid.len(), "loaded csv grid");
        Ok(grid)
    }
}

/// Flatten a calamine cell into the grid's text representation.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if *f == f.floor() && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        // Keep the serial; the date normalizer owns serial conversion.
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            if serial == serial.floor() && serial.abs() < 1e15 {
                format!("{}", serial as i64)
            } else {
                serial.to_string()
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Grid loading error
#[derive(Debug, Error)]
pub enum GridError {
    #[error("cannot open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error("cannot parse csv: {0}")]
    Csv(#[from] csv::Error),
}

// ============================================================================
// Tests
// ============================================================================
