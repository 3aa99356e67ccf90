//! CSV Importer Module
//! Loads a `Test,Result,Notes` log into the result table.

use super::table::{ResultTable, SortOrder, TEST_COLUMN};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Error reading CSV file at line {line}: {message}")]
    Csv { line: u64, message: String },
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("ValueError: {0}")]
    Value(String),
    #[error("Exception: {0}")]
    Other(String),
}

impl From<csv::Error> for ImportError {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map(|p| p.line());
        match e.kind() {
            csv::ErrorKind::Utf8 { .. } => ImportError::Value(e.to_string()),
            csv::ErrorKind::Io(io) => ImportError::Other(io.to_string()),
            _ => ImportError::Csv {
                line: line.unwrap_or(0),
                message: e.to_string(),
            },
        }
    }
}

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub file_name: String,
    pub total: usize,
    pub messages: usize,
    pub invalid: usize,
}

/// Reads result logs into a [`ResultTable`].
#[derive(Debug, Clone, Default)]
pub struct CsvImporter {
    skip_header: bool,
}

impl CsvImporter {
    pub fn new(skip_header: bool) -> Self {
        Self { skip_header }
    }

    /// Replace the table contents with the records in `path`.
    ///
    /// The table is cleared first and stays empty on any error.
    pub fn import(&self, path: &Path, table: &mut ResultTable) -> Result<ImportSummary, ImportError> {
        table.clear();

        let result = self.load_into(path, table);
        if result.is_err() {
            table.clear();
        }
        result
    }

    fn load_into(&self, path: &Path, table: &mut ResultTable) -> Result<ImportSummary, ImportError> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ImportError::NotFound(format!("{}: {}", path.display(), e)),
            _ => ImportError::Other(e.to_string()),
        })?;
        let text = String::from_utf8(bytes).map_err(|e| ImportError::Value(e.to_string()))?;

        let scan = scan_lines(&text);
        if let Some(line) = scan.unterminated_at {
            return Err(ImportError::Csv {
                line,
                message: "unexpected end of data in quoted field".to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.skip_header)
            .flexible(true)
            .from_reader(text.as_bytes());
        let header_line = if self.skip_header {
            reader.headers()?.position().map(|p| p.line())
        } else {
            None
        };

        // The csv reader drops blank lines; they come back as empty,
        // invalid rows in file order.
        let mut blank_lines = scan
            .blank_lines
            .into_iter()
            .filter(|&line| header_line.map_or(true, |header| line > header))
            .peekable();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(u64::MAX, |p| p.line());
            while blank_lines.next_if(|&blank| blank < line).is_some() {
                table.add_row(std::iter::empty::<String>());
            }
            table.add_row(record.iter());
        }
        for _ in blank_lines {
            table.add_row(std::iter::empty::<String>());
        }

        table.sort_by(TEST_COLUMN, SortOrder::Ascending);

        let summary = ImportSummary {
            file_name: display_name(path),
            total: table.len(),
            messages: table.messages_count(),
            invalid: table.invalid_count(),
        };
        log::info!(
            "Imported '{}': {} records, {} messages, {} invalid",
            summary.file_name,
            summary.total,
            summary.messages,
            summary.invalid
        );
        Ok(summary)
    }
}

/// File name shown to the user for `path`.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// What a pass over the raw text finds before parsing.
#[derive(Debug, Default, PartialEq, Eq)]
struct LineScan {
    /// Empty lines outside quoted fields.
    blank_lines: Vec<u64>,
    /// Line on which a quoted field is opened but never closed.
    unterminated_at: Option<u64>,
}

fn scan_lines(text: &str) -> LineScan {
    let mut scan = LineScan::default();
    let mut state = QuoteState::FieldStart;
    let mut line = 1u64;
    let mut opened_at = 0u64;
    let mut line_has_content = false;

    for c in text.chars() {
        if c == '\n' && !line_has_content && !matches!(state, QuoteState::Quoted) {
            scan.blank_lines.push(line);
        }

        state = match (state, c) {
            (QuoteState::Quoted, '"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, '"') => QuoteState::Quoted,
            (QuoteState::FieldStart, '"') => {
                opened_at = line;
                QuoteState::Quoted
            }
            (_, ',' | '\n' | '\r') => QuoteState::FieldStart,
            _ => QuoteState::Unquoted,
        };

        match c {
            '\n' => {
                line += 1;
                line_has_content = false;
            }
            '\r' => {}
            _ => line_has_content = true,
        }
    }

    if matches!(state, QuoteState::Quoted) {
        scan.unterminated_at = Some(opened_at);
    }
    scan
}
