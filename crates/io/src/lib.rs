// File I/O operations

pub mod csv;
pub mod error;
pub mod json;
pub mod workbook;

pub use error::{ExportError, LoadError};
pub use workbook::{list_sheets, load_workbook, NamedTables, SheetEntry, SheetLayout};
