//! EPS Mobility Management boundary
//!
//! The mobility layer owns the EMM state machine, the PLMN list and the
//! subscriber identities. The procedure layer only queries it and hands it
//! [`EmmPrimitive`]s.

use std::fmt;

use nextgsim_common::{Imsi, Msisdn, Plmn};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::indication::IndicationSender;
use super::sap::{EmmPrimitive, SapError};

/// Network selection mode (3GPP TS 27.007 +COPS `<mode>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PlmnSelectionMode {
    /// Automatic network selection
    #[default]
    Automatic = 0,
    /// Manual network selection
    Manual = 1,
    /// Deregister from the network
    Deregister = 2,
    /// Only set the operator name format
    SetFormatOnly = 3,
    /// Manual selection, automatic if the manual one fails
    ManualAutomatic = 4,
}

/// Operator name format (+COPS `<format>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PlmnFormat {
    /// Long alphanumeric name
    #[default]
    LongAlpha = 0,
    /// Short alphanumeric name
    ShortAlpha = 1,
    /// Numeric MCC/MNC
    Numeric = 2,
}

/// Operator identifier given for manual network selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorId {
    /// Long alphanumeric operator name
    LongName(String),
    /// Short alphanumeric operator name
    ShortName(String),
    /// Numeric PLMN identity
    Numeric(Plmn),
}

impl OperatorId {
    /// Format this identifier is expressed in.
    pub fn format(&self) -> PlmnFormat {
        match self {
            OperatorId::LongName(_) => PlmnFormat::LongAlpha,
            OperatorId::ShortName(_) => PlmnFormat::ShortAlpha,
            OperatorId::Numeric(_) => PlmnFormat::Numeric,
        }
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorId::LongName(name) | OperatorId::ShortName(name) => f.write_str(name),
            OperatorId::Numeric(plmn) => write!(f, "{plmn}"),
        }
    }
}

/// Access technology (+COPS `<AcT>`).
///
/// "Unavailable" is represented as `None` wherever an access technology is
/// optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum AccessTechnology {
    /// GSM
    Gsm = 0,
    /// GSM Compact
    GsmCompact = 1,
    /// UTRAN
    Utran = 2,
    /// GSM w/EGPRS
    GsmEgprs = 3,
    /// UTRAN w/HSDPA
    UtranHsdpa = 4,
    /// UTRAN w/HSUPA
    UtranHsupa = 5,
    /// UTRAN w/HSDPA and HSUPA
    UtranHsdpaHsupa = 6,
    /// E-UTRAN
    Eutran = 7,
}

impl fmt::Display for AccessTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessTechnology::Gsm => write!(f, "GSM"),
            AccessTechnology::GsmCompact => write!(f, "GSM-COMPACT"),
            AccessTechnology::Utran => write!(f, "UTRAN"),
            AccessTechnology::GsmEgprs => write!(f, "GSM-EGPRS"),
            AccessTechnology::UtranHsdpa => write!(f, "UTRAN-HSDPA"),
            AccessTechnology::UtranHsupa => write!(f, "UTRAN-HSUPA"),
            AccessTechnology::UtranHsdpaHsupa => write!(f, "UTRAN-HSDPA-HSUPA"),
            AccessTechnology::Eutran => write!(f, "E-UTRAN"),
        }
    }
}

/// EPS network registration status (+CEREG `<stat>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RegistrationStatus {
    /// Not registered, not searching
    #[default]
    NotRegistered = 0,
    /// Registered, home network
    RegisteredHome = 1,
    /// Not registered, searching
    Searching = 2,
    /// Registration denied
    Denied = 3,
    /// Unknown
    Unknown = 4,
    /// Registered, roaming
    RegisteredRoaming = 5,
}

impl RegistrationStatus {
    /// Returns true for both home and roaming registration.
    pub fn is_registered(self) -> bool {
        matches!(
            self,
            RegistrationStatus::RegisteredHome | RegistrationStatus::RegisteredRoaming
        )
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationStatus::NotRegistered => write!(f, "NOT-REGISTERED"),
            RegistrationStatus::RegisteredHome => write!(f, "REGISTERED-HOME"),
            RegistrationStatus::Searching => write!(f, "SEARCHING"),
            RegistrationStatus::Denied => write!(f, "DENIED"),
            RegistrationStatus::Unknown => write!(f, "UNKNOWN"),
            RegistrationStatus::RegisteredRoaming => write!(f, "REGISTERED-ROAMING"),
        }
    }
}

/// EPS Mobility Management layer as seen by the procedure layer.
pub trait MobilityLayer {
    /// Prepares the layer; indications are delivered through `indications`.
    fn initialize(&mut self, indications: IndicationSender, imei: &str);

    /// Releases resources held by the layer.
    fn cleanup(&mut self);

    /// Applies a network selection request and returns the index of the PLMN
    /// to register to, if any.
    fn select_plmn(
        &mut self,
        mode: PlmnSelectionMode,
        format: PlmnFormat,
        operator: Option<&OperatorId>,
        act: Option<AccessTechnology>,
    ) -> Option<usize>;

    /// Subscriber IMSI, when a subscriber record is present.
    fn imsi(&self) -> Option<Imsi>;

    /// Subscriber MSISDN, when provisioned.
    fn msisdn(&self) -> Option<Msisdn>;

    /// Current network selection mode.
    fn plmn_selection_mode(&self) -> PlmnSelectionMode;

    /// Selected operator rendered in `format`.
    fn selected_plmn(&self, format: PlmnFormat) -> Option<String>;

    /// Access technology of the selected PLMN.
    fn plmn_rat(&self) -> Option<AccessTechnology>;

    /// Available operators rendered as a +COPS test response.
    fn plmn_list(&self) -> String;

    /// Network registration status.
    fn plmn_status(&self) -> RegistrationStatus;

    /// Tracking area code of the serving cell.
    fn plmn_tac(&self) -> u16;

    /// Identity of the serving cell.
    fn plmn_ci(&self) -> u32;

    /// Returns true once the UE is attached.
    fn is_attached(&self) -> bool;

    /// Returns true when attached for emergency bearer services only.
    fn is_emergency(&self) -> bool;

    /// Hands a primitive to the EMM layer.
    fn send(&mut self, primitive: EmmPrimitive<'_>) -> Result<(), SapError>;
}
