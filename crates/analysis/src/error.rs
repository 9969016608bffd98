use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Column lookup by exact header name failed.
    #[error("table '{table}': missing column '{column}'")]
    MissingColumn { table: String, column: String },
    /// Date cell could not be read as a calendar date.
    #[error("table '{table}', row {row}: cannot parse date '{value}'")]
    DateParse { table: String, row: usize, value: String },
    /// Score cell held text that is not a number.
    #[error("table '{table}', row {row}: cannot parse score '{value}'")]
    ScoreParse { table: String, row: usize, value: String },
}
