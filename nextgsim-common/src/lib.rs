//! Common types and utilities for nextgsim
//!
//! This crate provides shared types, configuration structures, and utilities
//! used by the UE NAS crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod octet_string;
pub mod types;

pub use config::{SessionConfig, UeConfig, MAX_PDN_CONTEXTS};
pub use error::Error;
pub use logging::{init_logging, init_logging_with_filter, log_nas_message, HexDump, LogLevel};
pub use octet_string::OctetString;
pub use types::{Imsi, Msisdn, PdnType, Plmn, BCD_FILLER, MSISDN_MAX_DIGITS};
