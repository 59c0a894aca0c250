//! Logging utilities

pub use log::{debug, error, info, trace, warn};

use env_logger::Env;

/// Initialize the logging system, honouring `RUST_LOG`
///
/// Calling it more than once is harmless.
pub fn init() {
    init_with_filter("info");
}

/// Initialize the logging system with a fallback filter for when `RUST_LOG`
/// is unset
pub fn init_with_filter(default_filter: &str) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init();
}
