//! EPS Session Management boundary
//!
//! The session layer owns the PDN context table indexed by context
//! identifier (cid, starting at 1). The procedure layer reads it and asks for
//! changes through [`EsmPrimitive`]s.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use nextgsim_common::PdnType;

use super::indication::IndicationSender;
use super::sap::{EsmPrimitive, SapError};

/// Context identifier of the PDN connection set up at initial attach.
pub const DEFAULT_PDN_CID: u8 = 1;

/// Snapshot of a defined PDN context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdnContext {
    /// PDN type
    pub pdn_type: PdnType,
    /// Access Point Name
    pub apn: Option<String>,
    /// Emergency bearer services
    pub is_emergency: bool,
    /// Whether the PDN connection is active
    pub is_active: bool,
}

impl PdnContext {
    /// Creates an inactive context.
    pub fn new(pdn_type: PdnType, apn: Option<String>, is_emergency: bool) -> Self {
        Self {
            pdn_type,
            apn,
            is_emergency,
            is_active: false,
        }
    }
}

/// Addresses assigned to a PDN connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PdnAddress {
    /// IPv4 address
    pub ipv4: Option<Ipv4Addr>,
    /// IPv6 address
    pub ipv6: Option<Ipv6Addr>,
}

impl fmt::Display for PdnAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.ipv4, self.ipv6) {
            (Some(v4), Some(v6)) => write!(f, "{v4},{v6}"),
            (Some(v4), None) => write!(f, "{v4}"),
            (None, Some(v6)) => write!(f, "{v6}"),
            (None, None) => Ok(()),
        }
    }
}

/// EPS Session Management layer as seen by the procedure layer.
pub trait SessionLayer {
    /// Prepares the layer; indications are delivered through `indications`.
    fn initialize(&mut self, indications: IndicationSender);

    /// Releases resources held by the layer.
    fn cleanup(&mut self);

    /// Number of PDN context slots (highest usable cid).
    fn max_pdn_contexts(&self) -> u8;

    /// Active flag of context `cid`, or `None` when it is not defined.
    fn pdn_status(&self, cid: u8) -> Option<bool>;

    /// Context `cid`, or `None` when it is not defined.
    fn pdn(&self, cid: u8) -> Option<PdnContext>;

    /// Number of active PDN connections.
    fn active_pdn_count(&self) -> usize;

    /// Addresses of context `cid`, when defined and connected.
    fn pdn_address(&self, cid: u8) -> Option<PdnAddress>;

    /// Returns true when a PDN connection for emergency bearer services is
    /// active.
    fn has_emergency(&self) -> bool {
        (1..=self.max_pdn_contexts())
            .filter_map(|cid| self.pdn(cid))
            .any(|pdn| pdn.is_emergency && pdn.is_active)
    }

    /// Hands a primitive to the ESM layer.
    fn send(&mut self, primitive: EsmPrimitive) -> Result<(), SapError>;
}
