// CSV export of summary tables

use std::io::Write;
use std::path::Path;

use moodgrid_analysis::SummaryTable;

use crate::error::ExportError;

pub fn write<W: Write>(table: &SummaryTable, writer: W) -> Result<(), ExportError> {
    let mut wtr = ::csv::Writer::from_writer(writer);
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|v| v.display()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_string(table: &SummaryTable) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write(table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn export(table: &SummaryTable, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write(table, std::io::BufWriter::new(file))
}
