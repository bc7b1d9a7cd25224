//! NAS Information Element encoding/decoding
//!
//! Most NAS message fields are Type 4 IEs (3GPP TS 24.007 Section 11.2.1.1):
//!
//! ```text
//! [IEI: 1 byte, optional] [length: 1 byte] [value: length bytes]
//! ```
//!
//! The IEI is present only when the IE sits in the optional part of a message.
//! The length octet counts value bytes only.
//!
//! Two flavours of every operation are provided:
//! - slice based (`decode_lv_octets` / `encode_lv_octets`): the slice is the
//!   bound, and the number of bytes consumed or written is returned so the
//!   caller can advance a cursor;
//! - `bytes::Buf` / `BufMut` based, for callers streaming through a message.
//!
//! # Example
//!
//! ```rust
//! use nextgsim_nas::codec::{decode_lv_octets, encode_lv_octets};
//!
//! let mut buf = [0u8; 8];
//! let written = encode_lv_octets(&[0xAA, 0xBB], &mut buf, Some(0x2D), 4).unwrap();
//! assert_eq!(&buf[..written], &[0x2D, 0x02, 0xAA, 0xBB]);
//!
//! let (value, consumed) = decode_lv_octets(&buf[..written], Some(0x2D)).unwrap();
//! assert_eq!(value.data(), &[0xAA, 0xBB]);
//! assert_eq!(consumed, written);
//! ```

use bytes::{Buf, BufMut};
use nextgsim_common::OctetString;
use thiserror::Error;

/// Errors that can occur during NAS encoding/decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Buffer does not have enough bytes
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort {
        /// Expected minimum bytes
        expected: usize,
        /// Actual bytes available
        actual: usize,
    },

    /// Information Element Identifier does not match the expected one
    #[error("Invalid IEI: expected 0x{expected:02X}, got 0x{actual:02X}")]
    InvalidIei {
        /// IEI the caller asked for
        expected: u8,
        /// IEI found in the buffer
        actual: u8,
    },

    /// Length field exceeds remaining buffer
    #[error("Length exceeds buffer: length field is {length}, but only {remaining} bytes remain")]
    LengthExceedsBuffer {
        /// Length specified in the length field
        length: usize,
        /// Remaining bytes in buffer
        remaining: usize,
    },

    /// Encoding error
    #[error("Encoding error: {0}")]
    EncodingError(String),
}

/// Result type for NAS codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Largest value a 1-byte length field can describe.
pub const IE4_MAX_VALUE_LEN: usize = 255;

fn present_iei(iei: Option<u8>) -> Option<u8> {
    iei.filter(|&i| i != 0)
}

/// Decode a Type 4 IE whose value is an opaque octet string.
///
/// `buf` starts at the IE and ends at the last byte the caller allows the
/// decoder to read. When `iei` is a non-zero identifier, the first byte must
/// match it. Nothing is copied unless the whole declared value is present.
///
/// # Returns
/// The value and the number of bytes consumed (IEI + length + value).
pub fn decode_lv_octets(buf: &[u8], iei: Option<u8>) -> CodecResult<(OctetString, usize)> {
    let mut decoded = 0;

    if let Some(expected) = present_iei(iei) {
        let actual = *buf.first().ok_or(CodecError::BufferTooShort {
            expected: 1,
            actual: 0,
        })?;
        if actual != expected {
            return Err(CodecError::InvalidIei { expected, actual });
        }
        decoded += 1;
    }

    let length = *buf.get(decoded).ok_or(CodecError::BufferTooShort {
        expected: decoded + 1,
        actual: buf.len(),
    })? as usize;
    decoded += 1;

    let value = buf
        .get(decoded..decoded + length)
        .ok_or(CodecError::LengthExceedsBuffer {
            length,
            remaining: buf.len() - decoded,
        })?;

    Ok((OctetString::from_slice(value), decoded + length))
}

/// Encode a Type 4 IE whose value is an opaque octet string.
///
/// `min_len` is the minimum encoded size of the IE type (IEI included). The
/// buffer is checked against it, and against the full encoding, before any
/// byte is written. The IEI is written only when non-zero.
///
/// # Returns
/// The number of bytes written.
pub fn encode_lv_octets(
    value: &[u8],
    buf: &mut [u8],
    iei: Option<u8>,
    min_len: usize,
) -> CodecResult<usize> {
    if buf.len() < min_len {
        return Err(CodecError::BufferTooShort {
            expected: min_len,
            actual: buf.len(),
        });
    }
    if value.len() > IE4_MAX_VALUE_LEN {
        return Err(CodecError::EncodingError(format!(
            "Type 4 IE length {} exceeds maximum of {IE4_MAX_VALUE_LEN}",
            value.len()
        )));
    }

    let iei = present_iei(iei);
    let header_len = 1 + usize::from(iei.is_some());
    let total = header_len + value.len();
    if buf.len() < total {
        return Err(CodecError::BufferTooShort {
            expected: total,
            actual: buf.len(),
        });
    }

    let mut encoded = 0;
    if let Some(iei) = iei {
        buf[encoded] = iei;
        encoded += 1;
    }

    let len_pos = encoded;
    encoded += 1;

    buf[encoded..encoded + value.len()].copy_from_slice(value);
    encoded += value.len();

    // Length octet excludes the IEI and itself
    buf[len_pos] = (encoded - header_len) as u8;
    Ok(encoded)
}

/// Decode a Type 4 octet-string IE from a `Buf`, advancing it.
///
/// On error the buffer position is unspecified; callers abandon the message.
pub fn decode_lv_octets_from<B: Buf>(buf: &mut B, iei: Option<u8>) -> CodecResult<OctetString> {
    if let Some(expected) = present_iei(iei) {
        if buf.remaining() < 1 {
            return Err(CodecError::BufferTooShort {
                expected: 1,
                actual: 0,
            });
        }
        let actual = buf.chunk()[0];
        if actual != expected {
            return Err(CodecError::InvalidIei { expected, actual });
        }
        buf.advance(1);
    }

    if buf.remaining() < 1 {
        return Err(CodecError::BufferTooShort {
            expected: 1,
            actual: 0,
        });
    }
    let length = buf.get_u8() as usize;
    if buf.remaining() < length {
        return Err(CodecError::LengthExceedsBuffer {
            length,
            remaining: buf.remaining(),
        });
    }

    let mut value = vec![0u8; length];
    buf.copy_to_slice(&mut value);
    Ok(OctetString::from_vec(value))
}

/// Encode a Type 4 octet-string IE into a `BufMut`.
pub fn encode_lv_octets_to<B: BufMut>(value: &[u8], buf: &mut B, iei: Option<u8>) -> CodecResult<()> {
    if value.len() > IE4_MAX_VALUE_LEN {
        return Err(CodecError::EncodingError(format!(
            "Type 4 IE length {} exceeds maximum of {IE4_MAX_VALUE_LEN}",
            value.len()
        )));
    }
    let iei = present_iei(iei);
    let needed = 1 + usize::from(iei.is_some()) + value.len();
    if buf.remaining_mut() < needed {
        return Err(CodecError::BufferTooShort {
            expected: needed,
            actual: buf.remaining_mut(),
        });
    }
    if let Some(iei) = iei {
        buf.put_u8(iei);
    }
    buf.put_u8(value.len() as u8);
    buf.put_slice(value);
    Ok(())
}

/// A Type 4 IE carrying an opaque octet string.
///
/// Implementors supply the value accessors and the minimum encoded length;
/// the wire handling is shared.
pub trait OctetStringIe: Sized {
    /// Minimum encoded length of the IE, IEI and length octet included
    const MIN_LENGTH: usize;

    /// Wraps a decoded value
    fn from_value(value: OctetString) -> Self;

    /// The value carried by the IE
    fn value(&self) -> &OctetString;

    /// Decode from a slice starting at the IE.
    ///
    /// Returns the IE and the number of bytes consumed.
    fn decode(buf: &[u8], iei: Option<u8>) -> CodecResult<(Self, usize)> {
        let (value, consumed) = decode_lv_octets(buf, iei)?;
        Ok((Self::from_value(value), consumed))
    }

    /// Encode into a slice; returns the number of bytes written.
    fn encode(&self, buf: &mut [u8], iei: Option<u8>) -> CodecResult<usize> {
        encode_lv_octets(self.value().data(), buf, iei, Self::MIN_LENGTH)
    }

    /// Decode from a `Buf`, advancing it past the IE.
    fn decode_from<B: Buf>(buf: &mut B, iei: Option<u8>) -> CodecResult<Self> {
        decode_lv_octets_from(buf, iei).map(Self::from_value)
    }

    /// Encode into a `BufMut`.
    fn encode_to<B: BufMut>(&self, buf: &mut B, iei: Option<u8>) -> CodecResult<()> {
        encode_lv_octets_to(self.value().data(), buf, iei)
    }

    /// Encoded size in bytes for the given IEI choice.
    fn encoded_len(&self, iei: Option<u8>) -> usize {
        1 + usize::from(present_iei(iei).is_some()) + self.value().len()
    }
}
