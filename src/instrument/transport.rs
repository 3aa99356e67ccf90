//! Instrument Transport
//! The resource manager seam used by discovery. The VISA implementation lives
//! in `visa.rs`; tests use the in-memory one in `mock.rs`.

use thiserror::Error;

// Most variants are only built by the VISA backend.
#[cfg_attr(not(feature = "instrument_visa"), allow(dead_code))]
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("VISA support not enabled. Rebuild with --features instrument_visa")]
    Unsupported,
    #[error("Failed to create resource manager: {0}")]
    ResourceManager(String),
    #[error("Failed to list resources: {0}")]
    List(String),
    #[error("Failed to open {resource}: {message}")]
    Open { resource: String, message: String },
    #[error("I/O with {resource} failed: {message}")]
    Io { resource: String, message: String },
}

/// Enumerates and opens instruments.
pub trait ResourceManager {
    /// Addresses of all instruments the transport can see.
    fn list_resources(&self) -> Result<Vec<String>, TransportError>;

    fn open(&self, resource: &str) -> Result<Box<dyn InstrumentSession + '_>, TransportError>;
}

/// An open connection to one instrument.
pub trait InstrumentSession {
    fn write(&mut self, command: &str) -> Result<(), TransportError>;

    /// Write `command` and read one response line.
    fn query(&mut self, command: &str) -> Result<String, TransportError>;

    fn close(self: Box<Self>) -> Result<(), TransportError>;
}

/// Builds a fresh resource manager for each scan.
pub type Connector = Box<dyn Fn() -> Result<Box<dyn ResourceManager>, TransportError>>;
