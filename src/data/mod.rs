//! Data module - result table and CSV import

mod importer;
mod table;

pub use importer::{display_name, CsvImporter, ImportError, ImportSummary};
pub use table::{ResultTable, Row, SortOrder, COLUMNS, NOTES_COLUMN};
