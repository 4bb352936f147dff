//! Process-wide logging setup shared by the binaries.

pub mod tracing;

pub use self::tracing::{LogFormat, LogSettings};

/// Initialize logging with JSON output and an `info` default filter.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    self::tracing::init(&LogSettings::default());
}

/// Initialize logging with explicit settings. Same idempotence as [`init`].
pub fn init_with(settings: &LogSettings) {
    self::tracing::init(settings);
}
