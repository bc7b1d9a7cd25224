//! EMM and ESM Service Access Point primitives
//!
//! The procedure layer never runs the EMM/ESM state machines itself; it hands
//! them one primitive per request or lower-layer event. Each primitive kind
//! is its own variant carrying only its own fields.

use std::borrow::Cow;
use std::fmt;

use nextgsim_common::PdnType;
use thiserror::Error;

use super::emm::AccessTechnology;

/// Error returned by an EMM or ESM layer for a primitive it could not process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SapError {
    /// The layer processed the primitive and refused it
    #[error("{primitive} rejected: {reason}")]
    Rejected {
        /// Name of the refused primitive
        primitive: &'static str,
        /// Reason given by the layer
        reason: String,
    },
    /// The layer was used before being initialized
    #[error("{0} layer is not initialized")]
    NotInitialized(&'static str),
}

/// Primitive sent to the EPS Mobility Management layer.
///
/// NAS payloads are borrowed from the caller for the duration of the send;
/// use [`EmmPrimitive::into_owned`] to keep one past that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmmPrimitive<'a> {
    /// EPS capability of the UE has been enabled
    S1Enabled,
    /// EPS capability of the UE has been disabled
    S1Disabled,
    /// Run network (re)selection towards the PLMN at `index`
    RegisterReq {
        /// Index of the selected PLMN in the EMM PLMN list
        index: usize,
    },
    /// Initiate the attach procedure
    AttachInit {
        /// Attach for emergency bearer services
        is_emergency: bool,
    },
    /// Initiate the detach procedure
    DetachInit {
        /// Detach because the UE is switching off
        switch_off: bool,
    },
    /// Cell information received from the access stratum
    CellInfoRes {
        /// Whether a suitable cell was found
        found: bool,
        /// Tracking area code
        tac: u16,
        /// E-UTRAN cell identity
        cell_id: u32,
        /// Radio access technology of the cell
        rat: AccessTechnology,
    },
    /// NAS signalling connection established
    EstablishCnf {
        /// Initial downlink NAS message
        nas_msg: Cow<'a, [u8]>,
    },
    /// NAS signalling connection establishment failed
    EstablishRej,
    /// NAS signalling connection released by the network
    ReleaseInd {
        /// Release cause reported by the access stratum
        cause: u8,
    },
    /// Uplink delivery report or downlink NAS message
    DataInd {
        /// UE identifier towards the access stratum
        ue_id: u32,
        /// Whether the message was delivered
        delivered: bool,
        /// NAS message (empty for delivery reports)
        nas_msg: Cow<'a, [u8]>,
    },
}

impl EmmPrimitive<'_> {
    /// Primitive name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            EmmPrimitive::S1Enabled => "EMMREG-S1-ENABLED",
            EmmPrimitive::S1Disabled => "EMMREG-S1-DISABLED",
            EmmPrimitive::RegisterReq { .. } => "EMMREG-REGISTER-REQ",
            EmmPrimitive::AttachInit { .. } => "EMMREG-ATTACH-INIT",
            EmmPrimitive::DetachInit { .. } => "EMMREG-DETACH-INIT",
            EmmPrimitive::CellInfoRes { .. } => "EMMAS-CELL-INFO-RES",
            EmmPrimitive::EstablishCnf { .. } => "EMMAS-ESTABLISH-CNF",
            EmmPrimitive::EstablishRej => "EMMAS-ESTABLISH-REJ",
            EmmPrimitive::ReleaseInd { .. } => "EMMAS-RELEASE-IND",
            EmmPrimitive::DataInd { .. } => "EMMAS-DATA-IND",
        }
    }

    /// Detaches the primitive from any borrowed payload.
    pub fn into_owned(self) -> EmmPrimitive<'static> {
        match self {
            EmmPrimitive::S1Enabled => EmmPrimitive::S1Enabled,
            EmmPrimitive::S1Disabled => EmmPrimitive::S1Disabled,
            EmmPrimitive::RegisterReq { index } => EmmPrimitive::RegisterReq { index },
            EmmPrimitive::AttachInit { is_emergency } => EmmPrimitive::AttachInit { is_emergency },
            EmmPrimitive::DetachInit { switch_off } => EmmPrimitive::DetachInit { switch_off },
            EmmPrimitive::CellInfoRes {
                found,
                tac,
                cell_id,
                rat,
            } => EmmPrimitive::CellInfoRes {
                found,
                tac,
                cell_id,
                rat,
            },
            EmmPrimitive::EstablishCnf { nas_msg } => EmmPrimitive::EstablishCnf {
                nas_msg: Cow::Owned(nas_msg.into_owned()),
            },
            EmmPrimitive::EstablishRej => EmmPrimitive::EstablishRej,
            EmmPrimitive::ReleaseInd { cause } => EmmPrimitive::ReleaseInd { cause },
            EmmPrimitive::DataInd {
                ue_id,
                delivered,
                nas_msg,
            } => EmmPrimitive::DataInd {
                ue_id,
                delivered,
                nas_msg: Cow::Owned(nas_msg.into_owned()),
            },
        }
    }
}

impl fmt::Display for EmmPrimitive<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Primitive sent to the EPS Session Management layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EsmPrimitive {
    /// Define a PDN context (`is_defined == false`) or request connectivity
    /// to an already defined one (`is_defined == true`)
    PdnConnectivityReq {
        /// Context identifier
        cid: u8,
        /// Whether the context is already defined
        is_defined: bool,
        /// PDN type
        pdn_type: PdnType,
        /// Access Point Name
        apn: Option<String>,
        /// Emergency bearer services
        is_emergency: bool,
    },
    /// Undefine a PDN context
    PdnConnectivityRej {
        /// Context identifier
        cid: u8,
    },
    /// Release all EPS bearers towards a PDN
    PdnDisconnectReq {
        /// Context identifier
        cid: u8,
    },
}

impl EsmPrimitive {
    /// Primitive name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            EsmPrimitive::PdnConnectivityReq { .. } => "ESM-PDN-CONNECTIVITY-REQ",
            EsmPrimitive::PdnConnectivityRej { .. } => "ESM-PDN-CONNECTIVITY-REJ",
            EsmPrimitive::PdnDisconnectReq { .. } => "ESM-PDN-DISCONNECT-REQ",
        }
    }

    /// Context identifier the primitive applies to.
    pub fn cid(&self) -> u8 {
        match self {
            EsmPrimitive::PdnConnectivityReq { cid, .. }
            | EsmPrimitive::PdnConnectivityRej { cid }
            | EsmPrimitive::PdnDisconnectReq { cid } => *cid,
        }
    }
}

impl fmt::Display for EsmPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(cid={})", self.name(), self.cid())
    }
}
