//! `moodgrid-analysis`: aggregation engine for significant-moment tables.
//!
//! Pure engine crate: receives pre-loaded tables, returns summary tables and
//! chart specs. No CLI or IO dependencies.

pub mod chart;
pub mod daily;
pub mod error;
pub mod model;
pub mod moment;
pub mod policy;
pub mod sources;
pub mod words;

pub use chart::ChartSpec;
pub use chrono::NaiveDate;
pub use error::AnalysisError;
pub use model::{CellValue, SummaryTable, SummaryValue, Table};
pub use policy::{AnalysisPolicy, Breakdown, ColumnMapping, MomentFilter, Source, SourcePolicy};

pub type Result<T> = std::result::Result<T, AnalysisError>;
