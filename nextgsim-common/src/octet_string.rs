//! `OctetString` type for variable-length byte sequences.
//!
//! Opaque NAS values (RES, AUTS, AUTN, raw NAS PDUs) are carried as
//! `OctetString`. The type never interprets its contents.

use std::fmt;

/// A variable-length sequence of octets (bytes).
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct OctetString {
    data: Vec<u8>,
}

impl OctetString {
    /// Creates an `OctetString` from a `Vec<u8>`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Creates an `OctetString` from a byte slice.
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Creates an `OctetString` from a hex string.
    ///
    /// Whitespace is ignored, so both `"DEADBEEF"` and `"de ad be ef"` parse.
    /// Returns `None` for odd-length or non-hex input.
    pub fn from_hex(hex_str: &str) -> Option<Self> {
        let compact: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
        hex::decode(compact).ok().map(Self::from_vec)
    }

    /// Returns the underlying bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of octets.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if there are no octets.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Upper-case hex representation, no separators.
    pub fn to_hex_string(&self) -> String {
        hex::encode_upper(&self.data)
    }
}

impl fmt::Debug for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OctetString({})", self.to_hex_string())
    }
}

impl fmt::Display for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for OctetString {
    fn from(data: &[u8]) -> Self {
        Self::from_slice(data)
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
