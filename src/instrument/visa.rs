//! VISA resource manager backed by `visa-rs`.
//!
//! Supports resource strings like:
//! - "GPIB0::1::INSTR" (GPIB interface)
//! - "USB0::0x0699::0x0522::C012345::INSTR" (USB)
//! - "TCPIP0::192.168.1.100::INSTR" (Ethernet/LXI)

use super::transport::{InstrumentSession, ResourceManager, TransportError};
use std::ffi::CString;
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;
use visa_rs::prelude::*;

pub struct VisaResourceManager {
    rm: DefaultRM,
    filter: String,
    timeout: Duration,
}

impl VisaResourceManager {
    pub fn new(filter: &str, timeout: Duration) -> Result<Self, TransportError> {
        let rm = DefaultRM::new().map_err(|e| TransportError::ResourceManager(e.to_string()))?;
        Ok(Self {
            rm,
            filter: filter.to_string(),
            timeout,
        })
    }
}

fn visa_string(s: &str) -> Result<VisaString, String> {
    CString::new(s)
        .map(VisaString::from)
        .map_err(|e| e.to_string())
}

impl ResourceManager for VisaResourceManager {
    fn list_resources(&self) -> Result<Vec<String>, TransportError> {
        let expr = visa_string(&self.filter).map_err(TransportError::List)?;
        let mut list = self
            .rm
            .find_res_list(&expr)
            .map_err(|e| TransportError::List(e.to_string()))?;

        let mut resources = Vec::new();
        while let Some(res) = list
            .find_next()
            .map_err(|e| TransportError::List(e.to_string()))?
        {
            resources.push(res.to_string());
        }
        log::debug!("VISA resources: {:?}", resources);
        Ok(resources)
    }

    fn open(&self, resource: &str) -> Result<Box<dyn InstrumentSession + '_>, TransportError> {
        let open_err = |message: String| TransportError::Open {
            resource: resource.to_string(),
            message,
        };
        let name = visa_string(resource).map_err(open_err)?;
        let instrument = self
            .rm
            .open(&name, AccessMode::NO_LOCK, self.timeout)
            .map_err(|e| open_err(e.to_string()))?;

        Ok(Box::new(VisaSession {
            resource: resource.to_string(),
            instrument,
        }))
    }
}

struct VisaSession {
    resource: String,
    instrument: Instrument,
}

impl VisaSession {
    fn io_err(&self, e: impl std::fmt::Display) -> TransportError {
        TransportError::Io {
            resource: self.resource.clone(),
            message: e.to_string(),
        }
    }
}

impl InstrumentSession for VisaSession {
    fn write(&mut self, command: &str) -> Result<(), TransportError> {
        (&self.instrument)
            .write_all(format!("{}\n", command).as_bytes())
            .map_err(|e| self.io_err(e))?;
        log::debug!("VISA write to {}: {}", self.resource, command);
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        self.write(command)?;

        let mut response = String::new();
        BufReader::new(&self.instrument)
            .read_line(&mut response)
            .map_err(|e| self.io_err(e))?;
        log::debug!("VISA query {} '{}' -> '{}'", self.resource, command, response.trim());
        Ok(response)
    }

    fn close(self: Box<Self>) -> Result<(), TransportError> {
        // The session handle is released when the instrument is dropped.
        drop(self.instrument);
        Ok(())
    }
}
