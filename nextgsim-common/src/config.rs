//! UE configuration for the NAS procedure layer
//!
//! The configuration carries what the UE NAS layer needs at start-up: the
//! subscriber identities handed to the mobility layer, the size of the PDN
//! context table, and the PDN contexts to define at initialization.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::logging::LogLevel;
use crate::types::{PdnType, Plmn};

/// Largest PDN context table a UE exposes (cids 1..=11).
pub const MAX_PDN_CONTEXTS: u8 = 11;

fn default_max_pdn_contexts() -> u8 {
    MAX_PDN_CONTEXTS
}

/// PDN context definition applied at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Context identifier; assigned in order of appearance when absent
    #[serde(default)]
    pub cid: Option<u8>,
    /// PDN type
    #[serde(rename = "type", default)]
    pub pdn_type: PdnType,
    /// Access Point Name
    #[serde(default)]
    pub apn: Option<String>,
    /// Whether this is an emergency PDN context
    #[serde(default)]
    pub is_emergency: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cid: None,
            pdn_type: PdnType::Ipv4,
            apn: None,
            is_emergency: false,
        }
    }
}

/// UE (User Equipment) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UeConfig {
    /// IMSI digits (14 or 15), optionally prefixed with `imsi-`
    pub imsi: String,
    /// MSISDN in E.164 form (optional)
    #[serde(default)]
    pub msisdn: Option<String>,
    /// International Mobile Equipment Identity (15 digits)
    pub imei: String,
    /// Identifier of this UE towards the access stratum
    #[serde(default)]
    pub ue_id: u32,
    /// Home PLMN
    pub hplmn: Plmn,
    /// Number of PDN context slots
    #[serde(default = "default_max_pdn_contexts")]
    pub max_pdn_contexts: u8,
    /// PDN contexts defined at start-up
    #[serde(default)]
    pub sessions: Vec<SessionConfig>,
    /// Log level for the UE process
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for UeConfig {
    fn default() -> Self {
        Self {
            imsi: String::new(),
            msisdn: None,
            imei: String::new(),
            ue_id: 0,
            hplmn: Plmn::default(),
            max_pdn_contexts: MAX_PDN_CONTEXTS,
            sessions: Vec::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl UeConfig {
    /// Parses a UE configuration from a YAML string.
    ///
    /// # Example
    /// ```
    /// use nextgsim_common::UeConfig;
    ///
    /// let yaml = r#"
    /// imsi: "001010000000001"
    /// imei: "356938035643809"
    /// hplmn:
    ///   mcc: 1
    ///   mnc: 1
    /// sessions:
    ///   - type: ipv4
    ///     apn: internet
    /// "#;
    ///
    /// let config = UeConfig::from_yaml(yaml).unwrap();
    /// assert_eq!(config.max_pdn_contexts, 11);
    /// assert_eq!(config.sessions.len(), 1);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a UE configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Serializes the UE configuration to a YAML string.
    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }
}
