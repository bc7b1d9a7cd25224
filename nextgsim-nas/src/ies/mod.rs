//! NAS Information Elements (IEs)
//!
//! ## IE Types
//!
//! - Type 4: Variable length (TLV / LV) - [`ie4`]

pub mod ie4;

pub use ie4::*;
