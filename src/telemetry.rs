//! Tracing setup for binaries and tests.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initializes the global tracing subscriber.
///
/// Honors `RUST_LOG`; defaults to `info` with `teller` at `debug`.
/// Calling it twice is a no-op (the second registration fails quietly).
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,teller=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
