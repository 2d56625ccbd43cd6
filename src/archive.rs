//! Response archive packaging.
//!
//! A successful prediction returns one zip buffer with two fixed members:
//! the predictions as a plain-text list and the original table re-serialized
//! with a trailing `predicted_price` column. Everything is built in memory.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Result, TarifaError};
use crate::table::RawTable;

/// Plain-text archive member: one prediction per line, input row order.
pub const PREDICTIONS_TXT: &str = "predictions.txt";

/// Spreadsheet archive member: original rows plus the prediction column.
pub const PREDICTIONS_XLSX: &str = "flights_with_predictions.xlsx";

/// Column name appended to the uploaded table.
pub const PREDICTION_COLUMN: &str = "predicted_price";

/// Package predictions and the augmented table into a zip buffer.
///
/// `predictions` must have one value per data row of `table`.
///
/// # Errors
///
/// Returns [`TarifaError::Archive`] when spreadsheet or zip encoding fails.
pub fn package(table: &RawTable, predictions: &[f64]) -> Result<Vec<u8>> {
    let txt = predictions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    let xlsx = table.with_column(PREDICTION_COLUMN, predictions).to_xlsx()?;

    let zip_err = |e: zip::result::ZipError| TarifaError::Archive {
        reason: format!("zip encode failed: {e}"),
    };
    let io_err = |e: std::io::Error| TarifaError::Archive {
        reason: format!("zip write failed: {e}"),
    };

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(PREDICTIONS_TXT, options).map_err(zip_err)?;
    writer.write_all(txt.as_bytes()).map_err(io_err)?;

    writer
        .start_file(PREDICTIONS_XLSX, options)
        .map_err(zip_err)?;
    writer.write_all(&xlsx).map_err(io_err)?;

    let cursor = writer.finish().map_err(zip_err)?;
    Ok(cursor.into_inner())
}
