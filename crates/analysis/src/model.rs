use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single cell as handed over by the loader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Display string, as a spreadsheet would show the cell.
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => if *b { "TRUE".into() } else { "FALSE".into() },
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

/// Integers without decimals, everything else as-is.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One sheet: a header row plus data rows.
///
/// Rows are padded to the header width by the constructor, so `rows[r][c]`
/// is valid for every `c < headers.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, CellValue::Empty);
                }
                row
            })
            .collect();
        Self { name: name.into(), headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column whose header equals `name` exactly.
    pub fn column(&self, name: &str) -> Result<usize, AnalysisError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalysisError::MissingColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

// ---------------------------------------------------------------------------
// Summary output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryValue {
    Text(String),
    Number(f64),
    Count(usize),
}

impl SummaryValue {
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Count(c) => c.to_string(),
        }
    }
}

/// Column-oriented view of any derived table, for exporters and renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SummaryValue>>,
}

impl SummaryTable {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<SummaryValue>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct values of one column in first-seen order.
    pub fn distinct(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.columns.iter().position(|c| c == column) else {
            return Vec::new();
        };
        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            let v = row[idx].display();
            if !seen.contains(&v) {
                seen.push(v);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_are_padded() {
        let t = Table::new(
            "t",
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![CellValue::from("x")]],
        );
        assert_eq!(t.rows[0].len(), 3);
        assert_eq!(t.cell(0, 2), &CellValue::Empty);
    }

    #[test]
    fn column_lookup_is_exact() {
        let t = Table::new("t", vec!["PANAS Score".into()], vec![]);
        assert_eq!(t.column("PANAS Score").unwrap(), 0);
        let err = t.column("panas score").unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MissingColumn { table: "t".into(), column: "panas score".into() }
        );
    }

    #[test]
    fn number_display() {
        assert_eq!(CellValue::Number(3.0).display(), "3");
        assert_eq!(CellValue::Number(-1.5).display(), "-1.5");
    }

    #[test]
    fn distinct_keeps_first_seen_order() {
        let mut s = SummaryTable::new(&["date", "score"]);
        s.push(vec![SummaryValue::Text("b".into()), SummaryValue::Number(1.0)]);
        s.push(vec![SummaryValue::Text("a".into()), SummaryValue::Number(1.0)]);
        s.push(vec![SummaryValue::Text("b".into()), SummaryValue::Number(2.0)]);
        assert_eq!(s.distinct("date"), vec!["b", "a"]);
        assert!(s.distinct("missing").is_empty());
    }
}
