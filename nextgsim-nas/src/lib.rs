//! NAS (Non-Access Stratum) information element codec
//!
//! Encoding/decoding of the NAS Information Elements used by the UE NAS
//! procedure layer, as defined in 3GPP TS 24.007, TS 24.008 and TS 24.301.
//!
//! Every IE here follows the Type 4 pattern (optional IEI, one length octet,
//! value). The shared wire handling lives in [`codec`]; concrete IEs in
//! [`ies`] only describe their value and minimum size.
//!
//! # Example
//!
//! ```rust
//! use nextgsim_nas::codec::OctetStringIe;
//! use nextgsim_nas::ies::AuthenticationResponseParameter;
//!
//! let res = AuthenticationResponseParameter::new(vec![0x01, 0x02, 0x03, 0x04]);
//! let mut buf = [0u8; 16];
//! let written = res.encode(&mut buf, None).unwrap();
//!
//! let (decoded, consumed) = AuthenticationResponseParameter::decode(&buf[..written], None).unwrap();
//! assert_eq!(decoded, res);
//! assert_eq!(consumed, written);
//! ```

pub mod codec;
pub mod ies;

pub use codec::{
    decode_lv_octets, decode_lv_octets_from, encode_lv_octets, encode_lv_octets_to, CodecError,
    CodecResult, OctetStringIe, IE4_MAX_VALUE_LEN,
};
pub use ies::{
    iei, AuthenticationFailureParameter, AuthenticationParameterAutn,
    AuthenticationResponseParameter,
};
