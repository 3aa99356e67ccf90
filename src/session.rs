//! Session State
//! Everything the main window shows, updated by dispatching `SessionEvent`s.

use crate::config::AppConfig;
use crate::data::{display_name, CsvImporter, ImportError, ImportSummary, ResultTable};
use crate::format::group_thousands;
use crate::instrument::{discover, Connector, DiscoveryError, DiscoveryReport, InstrumentDescriptor};
use std::path::{Path, PathBuf};

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User actions, keyed by kind.
///
/// `*Requested` events only announce the work; the follow-up event they
/// return is run after the announcement has been painted.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ImportRequested(PathBuf),
    Import(PathBuf),
    SearchRequested,
    Search,
    RowSelected(usize),
    SortRequested(usize),
    InstrumentSelected(usize),
}

pub struct Session {
    pub config: AppConfig,
    pub table: ResultTable,
    pub instruments: Vec<InstrumentDescriptor>,
    pub detail: String,
    pub status: String,
    csv_file_name: Option<String>,
    importer: CsvImporter,
    connector: Connector,
}

impl Session {
    pub fn new(config: AppConfig, connector: Connector) -> Self {
        Self {
            importer: CsvImporter::new(config.skip_header),
            config,
            table: ResultTable::new(),
            instruments: Vec::new(),
            detail: format!("Calimate\nVersion {}", APP_VERSION),
            status: "Welcome to Calimate!".to_string(),
            csv_file_name: None,
            connector,
        }
    }

    /// Apply one event. Returns a follow-up event to run on the next frame.
    pub fn handle(&mut self, event: SessionEvent) -> Option<SessionEvent> {
        log::debug!("Event: {:?}", event);
        match event {
            SessionEvent::ImportRequested(path) => Some(self.begin_import(path)),
            SessionEvent::Import(path) => {
                self.import(&path);
                None
            }
            SessionEvent::SearchRequested => Some(self.begin_search()),
            SessionEvent::Search => {
                self.search();
                None
            }
            SessionEvent::RowSelected(index) => {
                self.select_row(index);
                None
            }
            SessionEvent::SortRequested(column) => {
                self.table.toggle_sort(column);
                None
            }
            SessionEvent::InstrumentSelected(index) => {
                self.select_instrument(index);
                None
            }
        }
    }

    fn count(&self, n: usize) -> String {
        group_thousands(n, self.config.thousands_separator)
    }

    fn begin_import(&mut self, path: PathBuf) -> SessionEvent {
        let name = display_name(&path);
        self.detail = format!("Loading file '{}'...", name);
        self.status = self.detail.clone();
        self.csv_file_name = Some(name);
        SessionEvent::Import(path)
    }

    fn import(&mut self, path: &Path) {
        let name = display_name(path);
        self.csv_file_name = Some(name.clone());
        log::info!("Importing {}", path.display());

        match self.importer.import(path, &mut self.table) {
            Ok(summary) => self.show_import_summary(&summary),
            Err(e) => self.show_import_error(&name, &e),
        }
    }

    fn show_import_summary(&mut self, summary: &ImportSummary) {
        self.detail = format!(
            "File: '{}' successfully imported\n\n\
             - Total records:   {:>8}\n\
             - Messages:        {:>8}\n\
             - Invalid records: {:>8}\n",
            summary.file_name,
            self.count(summary.total),
            self.count(summary.messages),
            self.count(summary.invalid),
        );
        self.status = format!(
            "File: '{}'. Total records: {}.",
            summary.file_name,
            self.count(summary.total)
        );
    }

    fn show_import_error(&mut self, name: &str, error: &ImportError) {
        let message = error.to_string();
        log::error!("{}", message);
        self.detail = format!("ERROR! File: '{}'\n\n- {}", name, message);
        self.status = message;
    }

    fn select_row(&mut self, index: usize) {
        let Some(row) = self.table.select(index) else {
            return;
        };

        let detail = if row.result.contains("Msg") {
            format!("Message:\n- {}", row.notes)
        } else {
            row.notes.clone()
        };
        self.detail = detail;

        self.status = format!(
            "File: '{}', Selected record: {} of {}.",
            self.csv_file_name.as_deref().unwrap_or_default(),
            self.count(index + 1),
            self.count(self.table.len())
        );
    }

    fn begin_search(&mut self) -> SessionEvent {
        self.instruments.clear();
        self.status = "Searching for instruments...".to_string();
        SessionEvent::Search
    }

    fn search(&mut self) {
        self.instruments.clear();
        let result = (self.connector)()
            .map_err(DiscoveryError::from)
            .and_then(|rm| discover(&*rm, &self.config));

        match result {
            Ok(report) => self.show_search_report(report),
            Err(e) => {
                let message = e.to_string();
                log::error!("Instrument search failed: {}", message);
                self.detail = format!("ERROR! Instrument search\n\n- {}", message);
                self.status = message;
            }
        }
    }

    fn show_search_report(&mut self, report: DiscoveryReport) {
        let mut detail = format!(
            "Instrument search complete\n\n- Instruments found: {}\n- Skipped resources: {}\n",
            report.instruments.len(),
            report.skipped.len()
        );
        for skipped in &report.skipped {
            detail.push_str(&format!("  - {}: {}\n", skipped.resource, skipped.reason));
        }

        self.status = format!("Found {} instrument(s).", report.instruments.len());
        self.detail = detail;
        self.instruments = report.instruments;
    }

    fn select_instrument(&mut self, index: usize) {
        let Some(instrument) = self.instruments.get(index) else {
            return;
        };

        log::info!("Selected: {} at {}", instrument.identity.raw, instrument.resource);
        log::info!("Connect Command: {:?}", instrument.commands.connect);
        log::info!("ID Command: {:?}", instrument.commands.id);
        log::info!("Close Command: {:?}", instrument.commands.close);
        self.status = format!("Selected instrument: {}", instrument.identity.raw);
    }
}
