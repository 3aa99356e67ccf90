//! Instrument module - VISA transport and discovery

mod discovery;
#[cfg(test)]
pub(crate) mod mock;
mod transport;
#[cfg(feature = "instrument_visa")]
mod visa;

pub use discovery::{discover, DiscoveryError, DiscoveryReport, InstrumentDescriptor};
pub use transport::{Connector, ResourceManager, TransportError};
#[cfg(feature = "instrument_visa")]
pub use visa::VisaResourceManager;

use crate::config::AppConfig;

/// Resource manager factory for the transport compiled into this build.
#[cfg(feature = "instrument_visa")]
pub fn connector(config: &AppConfig) -> Connector {
    let filter = config.resource_filter.clone();
    let timeout = std::time::Duration::from_millis(config.visa_timeout_ms);
    Box::new(move || {
        let rm = VisaResourceManager::new(&filter, timeout)?;
        Ok(Box::new(rm) as Box<dyn ResourceManager>)
    })
}

/// Without VISA every search reports the missing feature.
#[cfg(not(feature = "instrument_visa"))]
pub fn connector(_config: &AppConfig) -> Connector {
    Box::new(|| Err(TransportError::Unsupported))
}
