//! NAS procedure call manager
//!
//! [`UeNas`] is the single entry point for both application requests (the
//! AT-command side) and lower-layer events (the access-stratum side). It
//! validates requests against the EMM/ESM state it can observe, then hands a
//! primitive to the layer that runs the actual procedure.
//!
//! The operations are split across submodules:
//! - `registration`: EPS capability, network selection, attach and detach
//! - `pdn`: PDN context definition, activation and deactivation
//! - `lower`: events reported by the access stratum
//! - `query`: read-only status queries
//!
//! # Lifecycle
//!
//! [`UeNas::new`] initializes both layers and [`UeNas::cleanup`] detaches
//! (switch-off) and releases them. There is no way to use the context after
//! cleanup.

mod lower;
mod pdn;
mod query;
mod registration;

use thiserror::Error;
use tracing::{debug, error, info};

use super::emm::MobilityLayer;
use super::esm::SessionLayer;
use super::indication::IndicationSender;
use super::sap::SapError;
use super::security::{AuthenticationData, SecurityData};

pub use lower::CellInfo;
pub use query::{
    LocationInfo, PdnAddressEntry, PdnParameters, PdnStatusEntry, RegistrationData, SignalQuality,
};

/// Signal measurement value meaning "not known or not detectable".
pub const SIGNAL_UNKNOWN: u8 = 255;

/// Error returned by the procedure call manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcError {
    /// Implicit attach before PDN activation could not be started
    #[error("attach before PDN activation failed: {0}")]
    AttachFailed(#[source] SapError),
    /// Attached for emergency bearer services only
    #[error("UE is attached for emergency bearer services only")]
    EmergencyAttached,
    /// The PDN context is not defined
    #[error("PDN context {0} is not defined")]
    UndefinedContext(u8),
    /// An emergency PDN connection is already active
    #[error("PDN connection for emergency bearer services already established (cid={0})")]
    EmergencyAlreadyActive(u8),
    /// Disconnecting would leave the UE without any PDN connection
    #[error("cannot disconnect the last PDN connection (cid={0})")]
    LastConnection(u8),
    /// The PDN connection established at attach cannot be released alone
    #[error("PDN connection established at attach cannot be deactivated")]
    DefaultBearerProtected,
    /// Network selection did not yield a PLMN
    #[error("PLMN selection failed")]
    PlmnSelection,
    /// Downlink transfer indication without a NAS message
    #[error("empty downlink NAS message")]
    EmptyDownlink,
    /// The EMM or ESM layer refused the primitive
    #[error(transparent)]
    Sap(#[from] SapError),
}

/// Result type for procedure operations.
pub type ProcResult<T = ()> = Result<T, ProcError>;

/// Which PDN contexts an activation, deactivation or address query applies
/// to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdnSelection {
    /// A single context identifier
    Cid(u8),
    /// Every defined context
    All,
}

/// UE NAS procedure context.
///
/// Owns the EMM and ESM layers together with the per-UE procedure data.
pub struct UeNas<M: MobilityLayer, S: SessionLayer> {
    /// UE identifier towards the access stratum
    ue_id: u32,
    /// EPS capability status
    eps_capability: bool,
    /// Last reported RSRQ
    rsrq: u8,
    /// Last reported RSRP
    rsrp: u8,
    /// EPS authentication material
    authentication: AuthenticationData,
    /// EPS NAS security context
    security: SecurityData,
    emm: M,
    esm: S,
}

impl<M: MobilityLayer, S: SessionLayer> UeNas<M, S> {
    /// Creates the procedure context and initializes both layers.
    ///
    /// Signal measurements start as [`SIGNAL_UNKNOWN`] and the EPS capability
    /// as disabled.
    pub fn new(mut emm: M, mut esm: S, ue_id: u32, imei: &str, indications: IndicationSender) -> Self {
        info!("Initializing NAS procedure manager: ue_id={}", ue_id);

        emm.initialize(indications.clone(), imei);
        esm.initialize(indications);

        Self {
            ue_id,
            eps_capability: false,
            rsrq: SIGNAL_UNKNOWN,
            rsrp: SIGNAL_UNKNOWN,
            authentication: AuthenticationData::default(),
            security: SecurityData::default(),
            emm,
            esm,
        }
    }

    /// Detaches the UE (switch-off) and releases both layers.
    ///
    /// A failing detach is logged and does not prevent the release. The
    /// layers are handed back for inspection.
    pub fn cleanup(mut self) -> (M, S) {
        info!("Cleaning up NAS procedure manager: ue_id={}", self.ue_id);

        if let Err(e) = self.detach(true) {
            error!("Failed to perform local detach: {}", e);
        }

        self.emm.cleanup();
        self.esm.cleanup();
        self.authentication.clear();
        self.security.clear();
        debug!("NAS procedure manager released");

        (self.emm, self.esm)
    }

    /// UE identifier towards the access stratum.
    pub fn ue_id(&self) -> u32 {
        self.ue_id
    }

    /// EPS authentication material.
    pub fn authentication_data(&self) -> &AuthenticationData {
        &self.authentication
    }

    /// Mutable EPS authentication material.
    pub fn authentication_data_mut(&mut self) -> &mut AuthenticationData {
        &mut self.authentication
    }

    /// EPS NAS security context.
    pub fn security_data(&self) -> &SecurityData {
        &self.security
    }

    /// Mutable EPS NAS security context.
    pub fn security_data_mut(&mut self) -> &mut SecurityData {
        &mut self.security
    }

    /// The mobility layer.
    pub fn emm(&self) -> &M {
        &self.emm
    }

    /// Mutable access to the mobility layer.
    pub fn emm_mut(&mut self) -> &mut M {
        &mut self.emm
    }

    /// The session layer.
    pub fn esm(&self) -> &S {
        &self.esm
    }

    /// Mutable access to the session layer.
    pub fn esm_mut(&mut self) -> &mut S {
        &mut self.esm
    }
}
