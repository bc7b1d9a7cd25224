//! Core subscriber and network types: PLMN, IMSI, MSISDN, PDN type.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Public Land Mobile Network identifier.
///
/// The `long_mnc` field indicates whether the MNC uses 3 digits (true) or 2 digits (false).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Plmn {
    /// Mobile Country Code (3 digits, range 0-999)
    pub mcc: u16,
    /// Mobile Network Code (2-3 digits, range 0-999)
    pub mnc: u16,
    /// True if MNC is 3 digits, false if 2 digits
    #[serde(default)]
    pub long_mnc: bool,
}

impl Plmn {
    /// Creates a new PLMN with the given MCC and MNC.
    pub const fn new(mcc: u16, mnc: u16, long_mnc: bool) -> Self {
        Self { mcc, mnc, long_mnc }
    }

    /// Returns true if this PLMN has valid values set.
    pub fn has_value(&self) -> bool {
        self.mcc > 0 || self.mnc > 0
    }
}

impl fmt::Debug for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.long_mnc {
            write!(f, "Plmn({:03}-{:03})", self.mcc, self.mnc)
        } else {
            write!(f, "Plmn({:03}-{:02})", self.mcc, self.mnc)
        }
    }
}

impl fmt::Display for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.long_mnc {
            write!(f, "{:03}{:03}", self.mcc, self.mnc)
        } else {
            write!(f, "{:03}{:02}", self.mcc, self.mnc)
        }
    }
}

/// Filler nibble used in BCD-coded identities.
pub const BCD_FILLER: u8 = 0x0F;

/// International Mobile Subscriber Identity.
///
/// Stored as the 15 BCD digit slots of the mobile identity. Slot 6 (third
/// MNC digit) and slot 15 (last MSIN digit) may hold [`BCD_FILLER`], in which
/// case they are not part of the printed IMSI.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Imsi {
    digits: [u8; 15],
}

impl Imsi {
    /// Builds an IMSI from raw digit slots.
    ///
    /// Every slot must be a decimal digit, except slots 6 and 15 which may be
    /// the filler nibble.
    pub fn from_digits(digits: [u8; 15]) -> Result<Self, Error> {
        for (i, &d) in digits.iter().enumerate() {
            let optional = i == 5 || i == 14;
            if d > 9 && !(optional && d == BCD_FILLER) {
                return Err(Error::Identity(format!("IMSI digit {} is 0x{d:X}", i + 1)));
            }
        }
        Ok(Self { digits })
    }

    /// Parses a 14 or 15 digit IMSI string.
    ///
    /// A 14 digit string leaves slot 15 as filler.
    pub fn parse(imsi: &str) -> Result<Self, Error> {
        let imsi = imsi.strip_prefix("imsi-").unwrap_or(imsi);
        if !(14..=15).contains(&imsi.len()) || !imsi.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Identity(format!("IMSI must be 14 or 15 digits: {imsi}")));
        }
        let mut digits = [BCD_FILLER; 15];
        for (slot, b) in digits.iter_mut().zip(imsi.bytes()) {
            *slot = b - b'0';
        }
        Ok(Self { digits })
    }

    /// Raw digit slots.
    pub fn digits(&self) -> &[u8; 15] {
        &self.digits
    }
}

impl fmt::Display for Imsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &d) in self.digits.iter().enumerate() {
            if (i == 5 || i == 14) && d == BCD_FILLER {
                continue;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Imsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Imsi({self})")
    }
}

/// Maximum number of MSISDN digits held by the subscriber record.
pub const MSISDN_MAX_DIGITS: usize = 11;

/// Mobile Station ISDN number.
///
/// Carries the type-of-number / numbering-plan octet next to the digits,
/// 3GPP TS 24.008 Section 10.5.4.7.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Msisdn {
    /// Extension bit
    pub ext: bool,
    /// Type of number (3 bits)
    pub ton: u8,
    /// Numbering plan identification (4 bits)
    pub npi: u8,
    /// Decimal digits
    pub digits: Vec<u8>,
}

impl Msisdn {
    /// Parses an international E.164 number ("+" prefix optional).
    pub fn parse(number: &str) -> Result<Self, Error> {
        let number = number.strip_prefix('+').unwrap_or(number);
        if number.is_empty()
            || number.len() > MSISDN_MAX_DIGITS
            || !number.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::Identity(format!(
                "MSISDN must be 1 to {MSISDN_MAX_DIGITS} digits: {number}"
            )));
        }
        Ok(Self {
            ext: true,
            ton: 0b001,
            npi: 0b0001,
            digits: number.bytes().map(|b| b - b'0').collect(),
        })
    }

    /// Type of address octet: `ext | ton | npi`.
    pub fn type_of_address(&self) -> u8 {
        (u8::from(self.ext) << 7) | ((self.ton & 0x07) << 4) | (self.npi & 0x0F)
    }
}

impl fmt::Display for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.digits.iter().try_for_each(|d| write!(f, "{d}"))
    }
}

impl fmt::Debug for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Msisdn({self}, type=0x{:02X})", self.type_of_address())
    }
}

/// PDN type, 3GPP TS 24.301 Section 9.9.4.10.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
pub enum PdnType {
    /// IPv4
    #[default]
    Ipv4 = 1,
    /// IPv6
    Ipv6 = 2,
    /// IPv4v6
    Ipv4v6 = 3,
}

impl fmt::Display for PdnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdnType::Ipv4 => write!(f, "IP"),
            PdnType::Ipv6 => write!(f, "IPV6"),
            PdnType::Ipv4v6 => write!(f, "IPV4V6"),
        }
    }
}
