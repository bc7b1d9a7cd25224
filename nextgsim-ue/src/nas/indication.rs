//! Asynchronous indications from the EMM/ESM layers
//!
//! Both layers report state changes to the application through a single
//! unbounded channel handed to them at initialization. Indications are
//! delivered in the order the layers emit them.

use std::fmt;

use tokio::sync::mpsc;

use super::emm::{AccessTechnology, RegistrationStatus};

/// State change reported by the EMM or ESM layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indication {
    /// Network registration status changed
    Registration {
        /// New registration status
        status: RegistrationStatus,
        /// Tracking area code of the serving cell
        tac: u16,
        /// Serving cell identity
        ci: u32,
        /// Access technology, if known
        rat: Option<AccessTechnology>,
    },
    /// Attach state changed
    Attach {
        /// Whether the UE is now attached
        attached: bool,
        /// Attached for emergency bearer services only
        is_emergency: bool,
    },
    /// PDN connection state changed
    PdnState {
        /// Context identifier
        cid: u8,
        /// Whether the connection is now active
        active: bool,
    },
}

impl fmt::Display for Indication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indication::Registration { status, tac, ci, .. } => {
                write!(f, "Registration({status}, tac={tac:04x}, ci={ci:08x})")
            }
            Indication::Attach { attached, is_emergency } => {
                write!(f, "Attach(attached={attached}, emergency={is_emergency})")
            }
            Indication::PdnState { cid, active } => {
                write!(f, "PdnState(cid={cid}, active={active})")
            }
        }
    }
}

/// Sending half handed to the EMM and ESM layers.
pub type IndicationSender = mpsc::UnboundedSender<Indication>;

/// Receiving half kept by the application.
pub type IndicationReceiver = mpsc::UnboundedReceiver<Indication>;

/// Creates a new indication channel.
pub fn indication_channel() -> (IndicationSender, IndicationReceiver) {
    mpsc::unbounded_channel()
}
