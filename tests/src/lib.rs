//! Integration test framework for the nextgsim UE NAS layer
//!
//! This crate provides test utilities and fixtures for integration testing
//! of the UE NAS procedure layer over the loopback EMM/ESM layers.
//!
//! # Components
//!
//! - [`test_fixtures`] - Common test fixtures and configuration helpers
//! - [`test_utils`] - Utility functions for test setup and assertions
//!
//! # Test Categories
//!
//! 1. **Attach Tests** - S1 mode, network selection, attach, detach and cleanup
//! 2. **PDN Context Tests** - definition, activation and deactivation of PDN contexts
//! 3. **IE Codec Tests** - authentication parameter IEs inside NAS messages

pub mod test_fixtures;
pub mod test_utils;

pub use test_fixtures::{TestSession, TestUe, TestUeConfig};
pub use test_utils::{drain_indications, init_test_logging, TestResult};
