//! Instrument Discovery
//! Queries every listed resource, matches it to a per-model command file and
//! collects the instruments the user can select.

use super::transport::{InstrumentSession, ResourceManager, TransportError};
use crate::config::{AppConfig, ConfigError, InstrumentCommands};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const IDN_QUERY: &str = "*IDN?";

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Malformed identity '{0}'")]
    MalformedIdentity(String),
}

/// Parsed `*IDN?` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub raw: String,
    pub vendor: String,
    pub model: String,
    pub serial: String,
    pub firmware: String,
}

impl Identity {
    /// Parse `vendor,model,serial,firmware`. Extra fields are ignored.
    pub fn parse(raw: &str) -> Result<Self, DiscoveryError> {
        let raw = raw.trim();
        let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
        if fields.len() < 4 {
            return Err(DiscoveryError::MalformedIdentity(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            vendor: fields[0].to_string(),
            model: fields[1].to_string(),
            serial: fields[2].to_string(),
            firmware: fields[3].to_string(),
        })
    }

    /// Button caption for the instrument panel.
    pub fn label(&self) -> String {
        format!(
            "{} {}\nS/N: {}\nVer: {}",
            self.vendor, self.model, self.serial, self.firmware
        )
    }
}

/// `{Vendor}_{Model}.json` derived from a raw identity string.
///
/// Spaces become underscores and colons are dropped before splitting, so
/// "TEKTRONIX,MSO54,C0,CF:91.1CT" maps to `TEKTRONIX_MSO54.json`.
pub fn config_file_name(raw_identity: &str) -> Result<String, DiscoveryError> {
    let cleaned = raw_identity.trim().replace(' ', "_").replace(':', "");
    let mut fields = cleaned.split(',');
    match (fields.next(), fields.next()) {
        (Some(vendor), Some(model)) => Ok(format!("{}_{}.json", vendor, model)),
        _ => Err(DiscoveryError::MalformedIdentity(raw_identity.to_string())),
    }
}

/// A discovered instrument with its model commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentDescriptor {
    pub resource: String,
    pub identity: Identity,
    pub commands: InstrumentCommands,
}

/// Why a resource did not become a selectable instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoConfig(PathBuf),
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoConfig(path) => write!(f, "no configuration file {}", path.display()),
            SkipReason::Failed(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedResource {
    pub resource: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub instruments: Vec<InstrumentDescriptor>,
    pub skipped: Vec<SkippedResource>,
}

enum CheckOutcome {
    Found(InstrumentDescriptor),
    NoConfig(PathBuf),
}

/// Scan every resource the manager lists.
///
/// A failing instrument is logged and skipped; only a failure to list
/// resources aborts the scan.
pub fn discover(
    rm: &dyn ResourceManager,
    config: &AppConfig,
) -> Result<DiscoveryReport, DiscoveryError> {
    let resources = rm.list_resources()?;
    log::info!("Found {} VISA resource(s)", resources.len());

    let mut report = DiscoveryReport::default();
    for resource in resources {
        match check_resource(rm, &resource, config) {
            Ok(CheckOutcome::Found(descriptor)) => {
                log::info!("Instrument ready: {} at {}", descriptor.identity.raw, resource);
                report.instruments.push(descriptor);
            }
            Ok(CheckOutcome::NoConfig(path)) => {
                log::info!("Configuration file {} not found.", path.display());
                report.skipped.push(SkippedResource {
                    resource,
                    reason: SkipReason::NoConfig(path),
                });
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", resource, e);
                report.skipped.push(SkippedResource {
                    resource,
                    reason: SkipReason::Failed(e.to_string()),
                });
            }
        }
    }

    Ok(report)
}

fn check_resource(
    rm: &dyn ResourceManager,
    resource: &str,
    config: &AppConfig,
) -> Result<CheckOutcome, DiscoveryError> {
    let mut session = rm.open(resource)?;
    let outcome = check_session(session.as_mut(), resource, config);

    // Closed on every path; a close failure only matters if the check worked.
    match (session.close(), outcome) {
        (Ok(()), outcome) => outcome,
        (Err(e), Ok(_)) => Err(e.into()),
        (Err(e), Err(check_err)) => {
            log::warn!("Closing {} after a failed check: {}", resource, e);
            Err(check_err)
        }
    }
}

fn check_session(
    session: &mut dyn InstrumentSession,
    resource: &str,
    config: &AppConfig,
) -> Result<CheckOutcome, DiscoveryError> {
    let raw = session.query(IDN_QUERY)?.trim().to_string();
    log::debug!("{} identifies as '{}'", resource, raw);

    // Once the instrument has answered it is in remote mode and must be
    // handed back to the front panel, even if matching it fails.
    let mut model_unlock = None;
    let outcome = resolve_instrument(&raw, resource, config, &mut model_unlock);
    let unlock = model_unlock.as_deref().unwrap_or(&config.unlock_command);

    match (session.write(unlock), outcome) {
        (Ok(()), outcome) => outcome,
        (Err(e), Ok(_)) => Err(e.into()),
        (Err(e), Err(check_err)) => {
            log::warn!("Unlocking {} after a failed check: {}", resource, e);
            Err(check_err)
        }
    }
}

fn resolve_instrument(
    raw: &str,
    resource: &str,
    config: &AppConfig,
    model_unlock: &mut Option<String>,
) -> Result<CheckOutcome, DiscoveryError> {
    let file_name = config_file_name(raw)?;
    log::info!("JSON filename: {}", file_name);
    let path = config.instrument_config_dir.join(&file_name);

    let Some(commands) = load_commands(&path)? else {
        return Ok(CheckOutcome::NoConfig(path));
    };
    *model_unlock = commands.unlock.clone();
    log::info!(
        "Commands for {}: connect={:?} id={:?} close={:?}",
        file_name,
        commands.connect,
        commands.id,
        commands.close
    );

    Ok(CheckOutcome::Found(InstrumentDescriptor {
        resource: resource.to_string(),
        identity: Identity::parse(raw)?,
        commands,
    }))
}

fn load_commands(path: &Path) -> Result<Option<InstrumentCommands>, DiscoveryError> {
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(InstrumentCommands::from_file(path)?))
}
