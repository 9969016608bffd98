//! Field readers for one significant-moment row.
//!
//! Each aggregator resolves only the columns it needs, then reads cells
//! through these helpers so every field is interpreted the same way.

use chrono::{Days, NaiveDate};

use crate::error::AnalysisError;
use crate::model::{CellValue, Table};

/// Excel 1900 date system epoch (serial 0). Serial 60 is the phantom
/// 1900-02-29, so real dates from March 1900 on line up with this epoch.
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("1899-12-30 is a valid date")
}

/// Excel serial (days since 1899-12-30, time fraction ignored) to a date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    excel_epoch().checked_add_days(Days::new(serial.floor() as u64))
}

const DATE_FORMATS: &[&str] = &["%d/%m/%y", "%d/%m/%Y", "%Y-%m-%d"];

/// Parse `dd/mm/yy`, `dd/mm/yyyy` or ISO `yyyy-mm-dd` (an ISO datetime's
/// time part is dropped).
pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let s = s.split_once('T').map(|(d, _)| d).unwrap_or(s);
    let s = s.split_once(' ').map(|(d, _)| d).unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Split a packed `"explanation, word"` field on its first comma.
///
/// Returns `(explanation, None)` when the field has no comma.
pub fn split_packed(field: &str) -> (&str, Option<&str>) {
    match field.split_once(',') {
        Some((reason, word)) => (reason, Some(word)),
        None => (field, None),
    }
}

/// The affect word of a packed field, trimmed. Missing delimiter gives the
/// empty-string bucket.
pub fn packed_word(field: &str) -> String {
    split_packed(field).1.map(|w| w.trim().to_string()).unwrap_or_default()
}

pub fn read_date(table: &Table, row: usize, col: usize) -> Result<NaiveDate, AnalysisError> {
    let cell = table.cell(row, col);
    let parsed = match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => serial_to_date(*n),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty | CellValue::Bool(_) => None,
    };
    parsed.ok_or_else(|| AnalysisError::DateParse {
        table: table.name.clone(),
        row: row + 1,
        value: cell.display(),
    })
}

/// Score of a row. An empty cell is a missing score, not an error.
pub fn read_score(table: &Table, row: usize, col: usize) -> Result<Option<f64>, AnalysisError> {
    let cell = table.cell(row, col);
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Number(n) => Ok(Some(*n)),
        CellValue::Text(s) if s.trim().is_empty() => Ok(None),
        CellValue::Text(s) => s.trim().parse::<f64>().map(Some).map_err(|_| AnalysisError::ScoreParse {
            table: table.name.clone(),
            row: row + 1,
            value: s.clone(),
        }),
        other => Err(AnalysisError::ScoreParse {
            table: table.name.clone(),
            row: row + 1,
            value: other.display(),
        }),
    }
}

pub fn read_text(table: &Table, row: usize, col: usize) -> String {
    table.cell(row, col).display()
}
