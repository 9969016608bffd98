// Workbook import (xlsx, xls, xlsb, ods) into named tables.
//
// Sheets are selected by position, not by tab name: the layout maps each
// table name to a zero-based sheet index.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use moodgrid_analysis::moment::{parse_date_text, serial_to_date};
use moodgrid_analysis::{CellValue, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetEntry {
    pub name: String,
    pub index: usize,
}

/// Which sheet index each named table is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub sheets: Vec<SheetEntry>,
}

pub const DEFAULT_PARTICIPANTS: &[&str] = &["marela", "daniel", "rainer", "melissa"];
pub const DEFAULT_FIRST_INDEX: usize = 1;
pub const DEFAULT_QUESTIONNAIRE_SUFFIX: &str = "PANAS";

impl Default for SheetLayout {
    fn default() -> Self {
        Self::paired(DEFAULT_PARTICIPANTS, DEFAULT_FIRST_INDEX, DEFAULT_QUESTIONNAIRE_SUFFIX)
    }
}

impl SheetLayout {
    /// One moments sheet followed by one questionnaire sheet per
    /// participant, starting at `first_index`.
    pub fn paired<S: AsRef<str>>(participants: &[S], first_index: usize, suffix: &str) -> Self {
        let mut sheets = Vec::with_capacity(participants.len() * 2);
        for (k, p) in participants.iter().enumerate() {
            let p = p.as_ref();
            sheets.push(SheetEntry { name: p.to_string(), index: first_index + 2 * k });
            sheets.push(SheetEntry { name: format!("{p}{suffix}"), index: first_index + 2 * k + 1 });
        }
        Self { sheets }
    }
}

// ---------------------------------------------------------------------------
// Loaded tables
// ---------------------------------------------------------------------------

/// Tables in layout order.
#[derive(Debug, Clone, Default)]
pub struct NamedTables {
    tables: Vec<Table>,
}

impl NamedTables {
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read every sheet the layout names. Column names are not checked here.
pub fn load_workbook(path: &Path, layout: &SheetLayout) -> Result<NamedTables, LoadError> {
    let mut workbook = open(path)?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let mut tables = Vec::with_capacity(layout.sheets.len());
    for entry in &layout.sheets {
        let sheet_name = sheet_names.get(entry.index).ok_or_else(|| LoadError::MissingSheet {
            name: entry.name.clone(),
            index: entry.index,
            available: sheet_names.len(),
        })?;

        let range = workbook.worksheet_range(sheet_name).map_err(|e| LoadError::ReadSheet {
            sheet: sheet_name.clone(),
            message: e.to_string(),
        })?;

        let table = range_to_table(&entry.name, &range);
        debug!(
            table = %entry.name,
            sheet = %sheet_name,
            index = entry.index,
            rows = table.len(),
            columns = table.headers.len(),
            "loaded sheet"
        );
        tables.push(table);
    }

    Ok(NamedTables { tables })
}

/// Sheet names of a workbook, in position order.
pub fn list_sheets(path: &Path) -> Result<Vec<String>, LoadError> {
    Ok(open(path)?.sheet_names().to_vec())
}

fn open(path: &Path) -> Result<calamine::Sheets<std::io::BufReader<std::fs::File>>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    open_workbook_auto(path).map_err(|e| LoadError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// First non-empty row is the header; fully empty rows are dropped.
pub fn range_to_table(name: &str, range: &Range<Data>) -> Table {
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| !c.is_empty()));

    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.display()).collect(),
        None => return Table::new(name, Vec::new(), Vec::new()),
    };

    let body: Vec<Vec<CellValue>> = rows
        .map(|mut row| {
            row.truncate(headers.len());
            row
        })
        .collect();

    Table::new(name, headers, body)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(e.to_string()),
        // 1900 date system assumed; calamine does not expose the 1904 flag.
        Data::DateTime(dt) => match serial_to_date(dt.as_f64()) {
            Some(d) => CellValue::Date(d),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_date_text(s) {
            Some(d) => CellValue::Date(d),
            None => CellValue::from(s.as_str()),
        },
        Data::DurationIso(s) => CellValue::from(s.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_skips_index_zero() {
        let layout = SheetLayout::default();
        let pairs: Vec<_> = layout.sheets.iter().map(|s| (s.name.as_str(), s.index)).collect();
        assert_eq!(
            pairs,
            vec![
                ("marela", 1),
                ("marelaPANAS", 2),
                ("daniel", 3),
                ("danielPANAS", 4),
                ("rainer", 5),
                ("rainerPANAS", 6),
                ("melissa", 7),
                ("melissaPANAS", 8),
            ]
        );
    }

    #[test]
    fn range_with_leading_blank_rows() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 1));
        range.set_value((1, 0), Data::String("date".into()));
        range.set_value((1, 1), Data::String("score".into()));
        range.set_value((2, 0), Data::Float(44197.0));
        range.set_value((2, 1), Data::Int(3));

        let table = range_to_table("t", &range);
        assert_eq!(table.headers, vec!["date", "score"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0][1], CellValue::Number(3.0));
    }

    #[test]
    fn error_cells_use_excel_spelling() {
        assert_eq!(
            convert_cell(&Data::Error(calamine::CellErrorType::Div0)),
            CellValue::Text("#DIV/0!".into())
        );
        assert_eq!(convert_cell(&Data::Error(calamine::CellErrorType::NA)), CellValue::Text("#N/A".into()));
    }

    #[test]
    fn empty_range_gives_empty_table() {
        let range: Range<Data> = Range::empty();
        let table = range_to_table("t", &range);
        assert!(table.headers.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_workbook(Path::new("/nonexistent/moments.xlsx"), &SheetLayout::default()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
