//! In-memory resource manager for discovery tests.

use super::transport::{InstrumentSession, ResourceManager, TransportError};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// How a mock instrument answers.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Replies to `*IDN?` with this string.
    Identity(String),
    FailOpen,
    FailQuery,
}

/// Shared record of what discovery did to each instrument.
#[derive(Debug, Default)]
pub struct MockLog {
    pub writes: Vec<(String, String)>,
    pub opened: usize,
    pub closed: usize,
}

pub struct MockResourceManager {
    instruments: BTreeMap<String, MockBehavior>,
    pub log: Rc<RefCell<MockLog>>,
}

impl MockResourceManager {
    pub fn new() -> Self {
        Self {
            instruments: BTreeMap::new(),
            log: Rc::new(RefCell::new(MockLog::default())),
        }
    }

    pub fn with(mut self, resource: &str, behavior: MockBehavior) -> Self {
        self.instruments.insert(resource.to_string(), behavior);
        self
    }
}

impl ResourceManager for MockResourceManager {
    fn list_resources(&self) -> Result<Vec<String>, TransportError> {
        Ok(self.instruments.keys().cloned().collect())
    }

    fn open(&self, resource: &str) -> Result<Box<dyn InstrumentSession + '_>, TransportError> {
        let behavior = self
            .instruments
            .get(resource)
            .cloned()
            .ok_or_else(|| TransportError::Open {
                resource: resource.to_string(),
                message: "no such resource".to_string(),
            })?;
        if matches!(behavior, MockBehavior::FailOpen) {
            return Err(TransportError::Open {
                resource: resource.to_string(),
                message: "VI_ERROR_RSRC_BUSY".to_string(),
            });
        }

        self.log.borrow_mut().opened += 1;
        Ok(Box::new(MockSession {
            resource: resource.to_string(),
            behavior,
            log: Rc::clone(&self.log),
        }))
    }
}

struct MockSession {
    resource: String,
    behavior: MockBehavior,
    log: Rc<RefCell<MockLog>>,
}

impl InstrumentSession for MockSession {
    fn write(&mut self, command: &str) -> Result<(), TransportError> {
        self.log
            .borrow_mut()
            .writes
            .push((self.resource.clone(), command.to_string()));
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        match &self.behavior {
            MockBehavior::Identity(id) if command == "*IDN?" => Ok(format!("{}\n", id)),
            _ => Err(TransportError::Io {
                resource: self.resource.clone(),
                message: "VI_ERROR_TMO".to_string(),
            }),
        }
    }

    fn close(self: Box<Self>) -> Result<(), TransportError> {
        self.log.borrow_mut().closed += 1;
        Ok(())
    }
}
