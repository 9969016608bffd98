// JSON export of summary tables

use std::path::Path;

use moodgrid_analysis::SummaryTable;
use serde_json::{Map, Value};

use crate::error::ExportError;

/// Rows as an array of objects keyed by column name.
pub fn to_records(table: &SummaryTable) -> Value {
    let records = table
        .rows
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            for (col, value) in table.columns.iter().zip(row) {
                obj.insert(col.clone(), serde_json::to_value(value).unwrap_or(Value::Null));
            }
            Value::Object(obj)
        })
        .collect();
    Value::Array(records)
}

pub fn to_string(table: &SummaryTable) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&to_records(table))?)
}

pub fn export(table: &SummaryTable, path: &Path) -> Result<(), ExportError> {
    std::fs::write(path, to_string(table)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodgrid_analysis::SummaryValue;

    #[test]
    fn records_keep_value_types() {
        let mut t = SummaryTable::new(&["date", "source", "score"]);
        t.push(vec![
            SummaryValue::Text("2021-01-01".into()),
            SummaryValue::Text("internal".into()),
            SummaryValue::Number(5.0),
        ]);
        let v = to_records(&t);
        assert_eq!(v[0]["date"], "2021-01-01");
        assert_eq!(v[0]["source"], "internal");
        assert_eq!(v[0]["score"], 5.0);
    }

    #[test]
    fn records_keep_column_order() {
        let mut t = SummaryTable::new(&["date", "source", "score"]);
        t.push(vec![
            SummaryValue::Text("2021-01-01".into()),
            SummaryValue::Text("external".into()),
            SummaryValue::Number(-1.0),
        ]);
        let v = to_records(&t);
        let keys: Vec<&str> = v[0].as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["date", "source", "score"]);
    }

    #[test]
    fn empty_table_is_empty_array() {
        let t = SummaryTable::new(&["word", "count"]);
        assert_eq!(to_string(&t).unwrap(), "[]");
    }
}
