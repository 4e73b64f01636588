//! Tracing setup for the sitesift binary.

use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Log output goes to stderr so it never mixes with anything written to
/// stdout. The filter is taken from `RUST_LOG`, defaulting to `info` for this
/// crate when unset.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sitesift=info,tower_http=warn"));

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();
}
