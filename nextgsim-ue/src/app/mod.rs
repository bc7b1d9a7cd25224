//! UE Application support
//!
//! Configuration loading and validation, and construction of a UE NAS
//! procedure context from a configuration.

mod config_loader;

pub use config_loader::{
    build_loopback_ue, load_and_validate_ue_config, load_ue_config, load_ue_config_from_str,
    validate_ue_config, ConfigError, ConfigValidationError,
};
