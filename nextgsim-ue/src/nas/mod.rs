//! NAS (Non-Access Stratum) Procedure Handling
//!
//! This module implements the UE-side EPS NAS procedure call manager and its
//! boundaries towards the EMM and ESM layers.
//!
//! # Architecture
//!
//! - `procedure`: the procedure call manager ([`UeNas`](procedure::UeNas))
//! - `emm` / `esm`: the traits the mobility and session layers implement
//! - `sap`: primitives exchanged with those layers
//! - `indication`: asynchronous state-change reports to the application
//! - `security`: per-UE authentication and security data
//! - `loopback`: in-memory layers completing procedures immediately
//!
//! # Reference
//!
//! Based on 3GPP TS 24.301 and TS 27.007.

pub mod emm;
pub mod esm;
pub mod indication;
pub mod loopback;
pub mod procedure;
pub mod sap;
pub mod security;
