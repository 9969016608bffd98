use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("workbook not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to open workbook {}: {message}", .path.display())]
    Open { path: PathBuf, message: String },
    #[error("sheet '{name}' expects index {index}, but the workbook has {available} sheet(s)")]
    MissingSheet { name: String, index: usize, available: usize },
    #[error("failed to read sheet '{sheet}': {message}")]
    ReadSheet { sheet: String, message: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
