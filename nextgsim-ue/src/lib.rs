//! nextgsim UE NAS Library
//!
//! This crate provides the UE-side EPS NAS procedure layer for nextgsim. It
//! includes:
//!
//! - The procedure call manager dispatching application requests and
//!   access-stratum events to the EMM and ESM layers
//! - The EMM/ESM layer traits and their primitives
//! - Loopback EMM/ESM layers for simulation and testing
//! - Configuration loading and validation
//!
//! # Example
//!
//! ```rust
//! use nextgsim_ue::app::{build_loopback_ue, load_ue_config_from_str};
//! use nextgsim_ue::nas::indication::indication_channel;
//! use nextgsim_ue::PdnSelection;
//!
//! let config = load_ue_config_from_str(r#"
//! imsi: "001010000000001"
//! imei: "356938035643809"
//! hplmn: { mcc: 1, mnc: 1 }
//! sessions:
//!   - apn: internet
//! "#).unwrap();
//! nextgsim_common::init_logging(config.log_level).unwrap();
//!
//! let (tx, _rx) = indication_channel();
//! let mut ue = build_loopback_ue(&config, tx).unwrap();
//! ue.activate_pdn(PdnSelection::Cid(1)).unwrap();
//! assert!(ue.attach_status());
//! ```

pub mod app;
pub mod nas;

// Re-export NAS types
pub use nas::emm::{
    AccessTechnology, MobilityLayer, OperatorId, PlmnFormat, PlmnSelectionMode,
    RegistrationStatus,
};
pub use nas::esm::{PdnAddress, PdnContext, SessionLayer, DEFAULT_PDN_CID};
pub use nas::indication::{indication_channel, Indication, IndicationReceiver, IndicationSender};
pub use nas::loopback::{BearerLink, LoopbackMobility, LoopbackOperator, LoopbackSession};
pub use nas::procedure::{
    CellInfo, LocationInfo, PdnAddressEntry, PdnParameters, PdnSelection, PdnStatusEntry,
    ProcError, ProcResult, RegistrationData, SignalQuality, UeNas, SIGNAL_UNKNOWN,
};
pub use nas::sap::{EmmPrimitive, EsmPrimitive, SapError};
pub use nas::security::{AuthenticationData, SecurityData};

// Re-export App types
pub use app::{
    build_loopback_ue, load_and_validate_ue_config, load_ue_config, load_ue_config_from_str,
    validate_ue_config, ConfigError, ConfigValidationError,
};
