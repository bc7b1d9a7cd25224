//! Type 4 Information Elements (variable length, TLV)
//!
//! Authentication parameters exchanged during EPS AKA. Their value parts are
//! opaque octet strings; this layer never interprets them.
//!
//! Based on 3GPP TS 24.301 Section 9.9.3 and TS 24.008 Section 10.5.3.

use nextgsim_common::OctetString;

use crate::codec::OctetStringIe;

/// Information Element Identifiers used when the IEs appear in the optional
/// part of a message.
pub mod iei {
    /// Authentication response parameter (RES)
    pub const AUTHENTICATION_RESPONSE_PARAMETER: u8 = 0x2D;
    /// Authentication failure parameter (AUTS)
    pub const AUTHENTICATION_FAILURE_PARAMETER: u8 = 0x30;
    /// Authentication parameter AUTN
    pub const AUTHENTICATION_PARAMETER_AUTN: u8 = 0x20;
}

// ============================================================================
// Authentication Response Parameter (3GPP TS 24.301 Section 9.9.3.4)
// ============================================================================

/// Authentication Response Parameter IE (RES, 4 to 16 octets)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthenticationResponseParameter {
    /// RES value
    pub res: OctetString,
}

impl AuthenticationResponseParameter {
    /// Create a new Authentication Response Parameter
    pub fn new(res: impl Into<OctetString>) -> Self {
        Self { res: res.into() }
    }
}

impl OctetStringIe for AuthenticationResponseParameter {
    const MIN_LENGTH: usize = 6;

    fn from_value(value: OctetString) -> Self {
        Self { res: value }
    }

    fn value(&self) -> &OctetString {
        &self.res
    }
}

// ============================================================================
// Authentication Failure Parameter (3GPP TS 24.008 Section 10.5.3.2.2)
// ============================================================================

/// Authentication Failure Parameter IE (AUTS, 14 octets)
///
/// Sent on synchronisation failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthenticationFailureParameter {
    /// AUTS value
    pub auts: OctetString,
}

impl AuthenticationFailureParameter {
    /// Create a new Authentication Failure Parameter
    pub fn new(auts: impl Into<OctetString>) -> Self {
        Self { auts: auts.into() }
    }
}

impl OctetStringIe for AuthenticationFailureParameter {
    const MIN_LENGTH: usize = 16;

    fn from_value(value: OctetString) -> Self {
        Self { auts: value }
    }

    fn value(&self) -> &OctetString {
        &self.auts
    }
}

// ============================================================================
// Authentication Parameter AUTN (3GPP TS 24.008 Section 10.5.3.1.1)
// ============================================================================

/// Authentication Parameter AUTN IE (16 octets)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthenticationParameterAutn {
    /// AUTN value
    pub autn: OctetString,
}

impl AuthenticationParameterAutn {
    /// Create a new AUTN parameter
    pub fn new(autn: impl Into<OctetString>) -> Self {
        Self { autn: autn.into() }
    }
}

impl OctetStringIe for AuthenticationParameterAutn {
    const MIN_LENGTH: usize = 18;

    fn from_value(value: OctetString) -> Self {
        Self { autn: value }
    }

    fn value(&self) -> &OctetString {
        &self.autn
    }
}
