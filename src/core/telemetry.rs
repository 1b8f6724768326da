//! Tracing setup for embedders and tests

use tracing::Level;

/// Install a global fmt subscriber at the given level.
///
/// Unknown levels fall back to `info`. Returns `false` if a global
/// subscriber was already installed, which is not an error.
pub fn init_tracing(level: &str) -> bool {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init()
        .is_ok()
}
