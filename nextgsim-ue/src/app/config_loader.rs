//! Configuration Loading for the UE NAS layer
//!
//! Wraps the `UeConfig` from `nextgsim-common` with validation of the
//! subscriber identities and PDN context table, and builds a procedure
//! context over the loopback layers from it.
//!
//! # Example
//!
//! ```rust,ignore
//! use nextgsim_ue::app::{load_ue_config, validate_ue_config};
//!
//! let config = load_ue_config("config/ue.yaml")?;
//! validate_ue_config(&config)?;
//! ```

use std::collections::HashSet;
use std::path::Path;

use nextgsim_common::config::{UeConfig, MAX_PDN_CONTEXTS};
use nextgsim_common::{Imsi, Msisdn, Plmn};
use thiserror::Error;
use tracing::{debug, info};

use crate::nas::indication::IndicationSender;
use crate::nas::loopback::{LoopbackMobility, LoopbackSession};
use crate::nas::procedure::{ProcError, UeNas};

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ConfigValidationError),

    /// A configured PDN context could not be defined
    #[error("Failed to define configured PDN context: {0}")]
    ProcedureError(#[from] ProcError),
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Invalid HPLMN
    #[error("Invalid HPLMN: {0}")]
    InvalidHplmn(String),

    /// Invalid IMSI
    #[error("Invalid IMSI: {0}")]
    InvalidImsi(String),

    /// Invalid IMEI
    #[error("Invalid IMEI: {0}")]
    InvalidImei(String),

    /// Invalid MSISDN
    #[error("Invalid MSISDN: {0}")]
    InvalidMsisdn(String),

    /// Invalid PDN context table size
    #[error("Invalid PDN context table size: {0}")]
    InvalidPdnRange(String),

    /// Invalid session configuration
    #[error("Invalid session configuration: {0}")]
    InvalidSessionConfig(String),
}

/// Loads a UE configuration from a YAML file.
///
/// Only parses; call `validate_ue_config` for the semantic checks.
pub fn load_ue_config<P: AsRef<Path>>(path: P) -> Result<UeConfig, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    load_ue_config_from_str(&contents)
}

/// Loads a UE configuration from a YAML string.
pub fn load_ue_config_from_str(yaml: &str) -> Result<UeConfig, ConfigError> {
    let config: UeConfig =
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    Ok(config)
}

/// Validates a UE configuration.
///
/// # Validation Rules
///
/// - HPLMN MCC must be 3 digits (001-999), MNC 2-3 digits (00-999)
/// - IMSI must be 14 or 15 digits
/// - IMEI must be exactly 15 digits
/// - MSISDN, when present, must be 1 to 11 digits
/// - The PDN context table holds 1 to 11 slots
/// - Sessions must fit the table and use distinct, in-range cids
pub fn validate_ue_config(config: &UeConfig) -> Result<(), ConfigValidationError> {
    validate_hplmn(&config.hplmn)?;

    Imsi::parse(&config.imsi).map_err(|e| ConfigValidationError::InvalidImsi(e.to_string()))?;

    if config.imei.len() != 15 || !config.imei.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigValidationError::InvalidImei(format!(
            "IMEI '{}' must be exactly 15 digits",
            config.imei
        )));
    }

    if let Some(ref msisdn) = config.msisdn {
        Msisdn::parse(msisdn).map_err(|e| ConfigValidationError::InvalidMsisdn(e.to_string()))?;
    }

    if config.max_pdn_contexts == 0 || config.max_pdn_contexts > MAX_PDN_CONTEXTS {
        return Err(ConfigValidationError::InvalidPdnRange(format!(
            "{} must be between 1 and {}",
            config.max_pdn_contexts, MAX_PDN_CONTEXTS
        )));
    }

    if config.sessions.len() > usize::from(config.max_pdn_contexts) {
        return Err(ConfigValidationError::InvalidSessionConfig(format!(
            "{} sessions configured for {} PDN context slots",
            config.sessions.len(),
            config.max_pdn_contexts
        )));
    }

    let mut used = HashSet::new();
    for cid in session_cids(config) {
        if cid == 0 || cid > config.max_pdn_contexts {
            return Err(ConfigValidationError::InvalidSessionConfig(format!(
                "cid {} is outside 1..={}",
                cid, config.max_pdn_contexts
            )));
        }
        if !used.insert(cid) {
            return Err(ConfigValidationError::InvalidSessionConfig(format!(
                "cid {cid} is configured more than once"
            )));
        }
    }

    Ok(())
}

/// Validates a HPLMN configuration.
fn validate_hplmn(plmn: &Plmn) -> Result<(), ConfigValidationError> {
    if plmn.mcc == 0 || plmn.mcc > 999 {
        return Err(ConfigValidationError::InvalidHplmn(format!(
            "MCC {} must be between 001 and 999",
            plmn.mcc
        )));
    }

    if plmn.mnc > 999 {
        return Err(ConfigValidationError::InvalidHplmn(format!(
            "MNC {} must be between 00 and 999",
            plmn.mnc
        )));
    }

    Ok(())
}

/// Context identifiers of the configured sessions; sessions without an
/// explicit cid take their 1-based position.
fn session_cids(config: &UeConfig) -> impl Iterator<Item = u8> + '_ {
    config.sessions.iter().enumerate().map(|(index, session)| {
        session
            .cid
            .unwrap_or_else(|| u8::try_from(index + 1).unwrap_or(u8::MAX))
    })
}

/// Loads and validates a UE configuration in one step.
pub fn load_and_validate_ue_config<P: AsRef<Path>>(path: P) -> Result<UeConfig, ConfigError> {
    let config = load_ue_config(path)?;
    validate_ue_config(&config)?;
    Ok(config)
}

/// Builds a procedure context over the loopback layers from a validated
/// configuration and defines the configured PDN contexts.
pub fn build_loopback_ue(
    config: &UeConfig,
    indications: IndicationSender,
) -> Result<UeNas<LoopbackMobility, LoopbackSession>, ConfigError> {
    validate_ue_config(config)?;

    let imsi =
        Imsi::parse(&config.imsi).map_err(|e| ConfigValidationError::InvalidImsi(e.to_string()))?;
    let msisdn = config
        .msisdn
        .as_deref()
        .map(Msisdn::parse)
        .transpose()
        .map_err(|e| ConfigValidationError::InvalidMsisdn(e.to_string()))?;

    let esm = LoopbackSession::new(config.max_pdn_contexts);
    let mut emm = LoopbackMobility::new(imsi, config.hplmn);
    emm.set_msisdn(msisdn);
    emm.link_bearers(esm.bearer_link());

    info!("Building UE {} with HPLMN {}", imsi, config.hplmn);
    let mut ue = UeNas::new(emm, esm, config.ue_id, &config.imei, indications);

    for (cid, session) in session_cids(config).zip(&config.sessions) {
        debug!("Defining configured PDN context {}", cid);
        ue.define_pdn(cid, session.pdn_type, session.apn.as_deref(), session.is_emergency)?;
    }

    Ok(ue)
}
