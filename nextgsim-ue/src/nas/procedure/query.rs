//! Read-only status queries

use nextgsim_common::PdnType;

use super::{PdnSelection, UeNas};
use crate::nas::emm::{AccessTechnology, MobilityLayer, PlmnFormat, PlmnSelectionMode, RegistrationStatus};
use crate::nas::esm::{PdnAddress, SessionLayer};

/// Last reported signal measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalQuality {
    /// Reference signal received quality (255 when unknown)
    pub rsrq: u8,
    /// Reference signal received power (255 when unknown)
    pub rsrp: u8,
}

/// Network registration data (+COPS read response).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationData {
    /// Network selection mode
    pub mode: PlmnSelectionMode,
    /// Selected operator, rendered in the requested format
    pub operator: Option<String>,
    /// Access technology of the selected operator
    pub rat: Option<AccessTechnology>,
}

impl RegistrationData {
    /// Returns true when an operator is selected.
    pub fn is_selected(&self) -> bool {
        self.operator.is_some()
    }
}

/// Serving cell location (+CEREG location fields).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationInfo {
    /// Tracking area code, 4 hex digits
    pub tac: String,
    /// Cell identity, 8 hex digits
    pub ci: String,
    /// Access technology of the selected operator
    pub rat: Option<AccessTechnology>,
}

/// Active flag of a defined PDN context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdnStatusEntry {
    /// Context identifier
    pub cid: u8,
    /// Whether the connection is active
    pub active: bool,
}

/// Parameters of a defined PDN context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdnParameters {
    /// Context identifier
    pub cid: u8,
    /// PDN type
    pub pdn_type: PdnType,
    /// Access Point Name
    pub apn: Option<String>,
}

/// Addresses of a PDN context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdnAddressEntry {
    /// Context identifier
    pub cid: u8,
    /// Assigned addresses
    pub address: PdnAddress,
}

impl<M: MobilityLayer, S: SessionLayer> UeNas<M, S> {
    /// EPS capability status.
    pub fn eps_capability(&self) -> bool {
        self.eps_capability
    }

    /// Last reported RSRQ and RSRP.
    pub fn signal_quality(&self) -> SignalQuality {
        SignalQuality {
            rsrq: self.rsrq,
            rsrp: self.rsrp,
        }
    }

    /// IMSI as a digit string, filler digits left out.
    pub fn imsi(&self) -> Option<String> {
        self.emm.imsi().map(|imsi| imsi.to_string())
    }

    /// MSISDN digits and type-of-address octet.
    pub fn msisdn(&self) -> Option<(String, u8)> {
        self.emm
            .msisdn()
            .map(|msisdn| (msisdn.to_string(), msisdn.type_of_address()))
    }

    /// Network selection mode, selected operator and its access technology.
    pub fn registration_data(&self, format: PlmnFormat) -> RegistrationData {
        let operator = self.emm.selected_plmn(format);
        let rat = if operator.is_some() {
            self.emm.plmn_rat()
        } else {
            None
        };
        RegistrationData {
            mode: self.emm.plmn_selection_mode(),
            operator,
            rat,
        }
    }

    /// Available operators as a +COPS test response.
    pub fn operator_list(&self) -> String {
        self.emm.plmn_list()
    }

    /// Network registration status.
    pub fn registration_status(&self) -> RegistrationStatus {
        self.emm.plmn_status()
    }

    /// Serving cell location.
    pub fn location_info(&self) -> LocationInfo {
        LocationInfo {
            tac: format!("{:04x}", self.emm.plmn_tac()),
            ci: format!("{:08x}", self.emm.plmn_ci()),
            rat: self.emm.plmn_rat(),
        }
    }

    /// Whether the UE is attached.
    pub fn attach_status(&self) -> bool {
        self.emm.is_attached()
    }

    /// Highest usable context identifier.
    pub fn pdn_range(&self) -> u8 {
        self.esm.max_pdn_contexts()
    }

    /// Active flags of defined contexts in cid order, at most `max` entries.
    pub fn pdn_status(&self, max: usize) -> Vec<PdnStatusEntry> {
        self.defined_cids()
            .filter_map(|cid| {
                self.esm
                    .pdn_status(cid)
                    .map(|active| PdnStatusEntry { cid, active })
            })
            .take(max)
            .collect()
    }

    /// Parameters of defined contexts in cid order, at most `max` entries.
    pub fn pdn_parameters(&self, max: usize) -> Vec<PdnParameters> {
        self.defined_cids()
            .filter_map(|cid| {
                self.esm.pdn(cid).map(|pdn| PdnParameters {
                    cid,
                    pdn_type: pdn.pdn_type,
                    apn: pdn.apn,
                })
            })
            .take(max)
            .collect()
    }

    /// Addresses of the selected contexts.
    ///
    /// A single cid yields at most one entry; [`PdnSelection::All`] lists
    /// contexts in cid order, at most `max` entries. Cid 0 never matches.
    pub fn pdn_addresses(&self, selection: PdnSelection, max: usize) -> Vec<PdnAddressEntry> {
        match selection {
            PdnSelection::Cid(cid) => self
                .esm
                .pdn_address(cid)
                .map(|address| PdnAddressEntry { cid, address })
                .into_iter()
                .collect(),
            PdnSelection::All => self
                .defined_cids()
                .filter_map(|cid| {
                    self.esm
                        .pdn_address(cid)
                        .map(|address| PdnAddressEntry { cid, address })
                })
                .take(max)
                .collect(),
        }
    }

    fn defined_cids(&self) -> impl Iterator<Item = u8> {
        1..=self.esm.max_pdn_contexts()
    }
}
