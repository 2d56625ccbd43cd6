//! Raw spreadsheet tables.
//!
//! [`RawTable`] is the in-memory form of an uploaded workbook: a header row
//! plus loosely typed data rows. Decoding uses calamine on the first
//! worksheet; encoding goes back out through `rust_xlsxwriter`. Both work on
//! in-memory buffers only, so a request never touches the filesystem.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use crate::error::{Result, TarifaError};

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank cell (also used for formula errors in the source sheet)
    Empty,
    /// Text content
    Text(String),
    /// Numeric content (ints and floats collapse to f64)
    Number(f64),
    /// Boolean content
    Bool(bool),
}

impl Cell {
    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric content, if this is a numeric cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the cell holds nothing usable.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// An uploaded table: header row plus data rows.
///
/// Row order is load order and is preserved through every transformation so
/// that prediction `i` always corresponds to input row `i`.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build a table from an explicit header row and data rows.
    ///
    /// Rows shorter than the header are padded with empty cells; longer rows
    /// are truncated to the header width.
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Self { headers, rows }
    }

    /// Decode the first worksheet of an xlsx workbook held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`TarifaError::Parse`] when the bytes are not a readable
    /// workbook and [`TarifaError::DataFormat`] when the worksheet has no
    /// header row.
    pub fn from_xlsx(bytes: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes.to_vec());
        let mut workbook = Xlsx::new(cursor).map_err(|e| TarifaError::Parse {
            reason: format!("not a readable xlsx workbook: {e}"),
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| TarifaError::DataFormat {
                reason: "workbook contains no worksheets".to_string(),
            })?
            .map_err(|e| TarifaError::Parse {
                reason: format!("failed to read worksheet: {e}"),
            })?;

        let mut row_iter = range.rows();
        let header_row = row_iter.next().ok_or_else(|| TarifaError::DataFormat {
            reason: "worksheet has no header row".to_string(),
        })?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| match cell {
                Data::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(TarifaError::DataFormat {
                reason: "worksheet header row is blank".to_string(),
            });
        }

        let rows: Vec<Vec<Cell>> = row_iter
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Ok(Self::new(headers, rows))
    }

    /// Column headers in sheet order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows (header excluded).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a header, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Cells of a named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Data rows, top to bottom.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Copy of this table with a trailing numeric column appended.
    ///
    /// `values` must have one entry per data row.
    pub fn with_column(&self, name: &str, values: &[f64]) -> RawTable {
        let mut headers = self.headers.clone();
        headers.push(name.to_string());
        let rows = self
            .rows
            .iter()
            .zip(values.iter())
            .map(|(row, v)| {
                let mut row = row.clone();
                row.push(Cell::Number(*v));
                row
            })
            .collect();
        RawTable { headers, rows }
    }

    /// Serialize back to an xlsx workbook in memory.
    ///
    /// # Errors
    ///
    /// Returns [`TarifaError::Archive`] when the writer fails.
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let encode = |e: rust_xlsxwriter::XlsxError| TarifaError::Archive {
            reason: format!("xlsx encode failed: {e}"),
        };

        for (col, header) in self.headers.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, header)
                .map_err(encode)?;
        }
        for (r, row) in self.rows.iter().enumerate() {
            let excel_row = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let col = c as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(excel_row, col, s).map_err(encode)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(excel_row, col, *n).map_err(encode)?;
                    }
                    Cell::Bool(b) => {
                        worksheet
                            .write_boolean(excel_row, col, *b)
                            .map_err(encode)?;
                    }
                }
            }
        }

        workbook.save_to_buffer().map_err(encode)
    }
}
