//! Tracing bootstrap for binaries, demos, and tests.
//!
//! Library code only emits via `tracing`; installing a subscriber is
//! the host's call. [`init`] wires up the conventional setup: `.env`
//! loading, `RUST_LOG` filtering with a sensible default, and compact
//! console output.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default tracing subscriber.
///
/// Respects `RUST_LOG` when set, otherwise logs `info` globally and
/// `debug` for this crate. Safe to call more than once; later calls
/// are no-ops.
pub fn init() {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,burnish=debug"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .ok();
}
