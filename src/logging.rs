// Logging setup

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Later calls are no-ops, so test
/// setup may call this repeatedly.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
