//! Tracing/logging setup shared by binaries and tests.

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Initialize process-wide JSON logging.
///
/// `RUST_LOG` wins when set; otherwise `default_level` is used as the filter.
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(default_level: &str) {
    tracing::init(default_level);
}

/// Human-readable logging captured by the test harness.
pub fn init_for_tests() {
    tracing::init_test();
}
