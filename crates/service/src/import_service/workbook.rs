//! Workbook decoding via `calamine`: first worksheet only, header row first.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use smartcrm_core::import::Sheet;

use crate::ServiceError;

fn invalid(reason: impl std::fmt::Display) -> ServiceError {
    ServiceError::InvalidInput(format!("Invalid Excel file: {reason}"))
}

/// Stringify a cell. Integral floats print without a fractional part so a
/// phone number typed as a number stays `9876543210`, not `9876543210.0`.
#[expect(clippy::cast_possible_truncation, reason = "guarded by the integral range check")]
pub(super) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Parse raw upload bytes (xlsx, xls, xlsb or ods) into a [`Sheet`].
pub(super) fn read_first_sheet(bytes: Vec<u8>) -> Result<Sheet, ServiceError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(invalid)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| invalid("workbook has no sheets"))?
        .map_err(invalid)?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| invalid("sheet is empty"))?
        .iter()
        .map(cell_text)
        .collect();
    let body: Vec<Vec<String>> = rows.map(|row| row.iter().map(cell_text).collect()).collect();
    tracing::debug!(columns = header.len(), rows = body.len(), "workbook parsed");
    Ok(Sheet::new(header, body))
}
