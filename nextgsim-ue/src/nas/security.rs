//! Per-UE authentication and security data
//!
//! Both blocks are owned by the procedure context and live exactly as long as
//! it does. They are filled in by the EPS AKA and security mode procedures.

use nextgsim_common::OctetString;
use nextgsim_nas::{
    AuthenticationFailureParameter, AuthenticationParameterAutn, AuthenticationResponseParameter,
};

/// Material of the ongoing or last EPS authentication.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationData {
    /// RAND received from the network
    pub rand: Option<OctetString>,
    /// AUTN received from the network
    pub autn: Option<AuthenticationParameterAutn>,
    /// RES computed by the USIM
    pub res: Option<AuthenticationResponseParameter>,
    /// AUTS returned on synchronisation failure
    pub auts: Option<AuthenticationFailureParameter>,
    /// Key set identifier the challenge belongs to
    pub ksi: Option<u8>,
}

impl AuthenticationData {
    /// Returns true when a challenge has been received.
    pub fn has_challenge(&self) -> bool {
        self.rand.is_some() && self.autn.is_some()
    }

    /// Forgets the current challenge and its response.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Current EPS NAS security context.
#[derive(Debug, Clone, Default)]
pub struct SecurityData {
    /// Key set identifier of the current context
    pub ksi: Option<u8>,
    /// K_ASME
    pub kasme: Option<OctetString>,
    /// Uplink NAS count
    pub ul_count: u32,
    /// Downlink NAS count
    pub dl_count: u32,
}

impl SecurityData {
    /// Returns true once a security context has been established.
    pub fn is_established(&self) -> bool {
        self.ksi.is_some() && self.kasme.is_some()
    }

    /// Deletes the security context.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
