use std::sync::Once;

use env_logger::Builder;
use log::{LevelFilter, debug};

/// Guards the one-time logger installation
static INIT: Once = Once::new();

/// Installs the `env_logger` backend once per process.
///
/// `level` is the floor for this crate; `RUST_LOG` still overrides it.
pub fn initialize_logger(level: LevelFilter) {
    // Use call_once_force to recover if an earlier initialization attempt panicked.
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("roster", level)
            .filter_module("chain_stats", level)
            .format_timestamp_millis()
            .parse_default_env();

        // Tests and embedding binaries may have installed a logger already.
        if let Err(err) = builder.try_init() {
            debug!("logger already installed: {err}");
        }
    });
}
