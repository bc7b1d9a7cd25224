//! Test utility functions for integration tests
//!
//! Provides common utilities for test setup, logging, and assertions.

use nextgsim_ue::{Indication, IndicationReceiver};
use tracing_subscriber::{fmt, EnvFilter};

/// Result type for integration tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Initialize logging for tests
///
/// Uses RUST_LOG environment variable if set, otherwise defaults to "info"
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}

/// Collect every indication already queued on `rx`, oldest first
pub fn drain_indications(rx: &mut IndicationReceiver) -> Vec<Indication> {
    let mut out = Vec::new();
    while let Ok(indication) = rx.try_recv() {
        out.push(indication);
    }
    out
}
