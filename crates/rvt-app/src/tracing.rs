//! Log output for the terminal client.
//!
//! Screens are drawn on stdout, so every subscriber here writes to stderr.
//! `RUST_LOG` replaces the default filter, e.g. `RUST_LOG=rvt_client=trace`
//! to see each gateway call.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

const DEVELOPMENT_FILTER: &str = "debug,hyper=info,reqwest=info";
const PRODUCTION_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Install the global subscriber: readable multi-line events while
/// developing, one JSON object per event in production.
pub fn init_tracing(env: &Environment) {
    let development = env.is_development();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    if development {
        tracing_subscriber::registry()
            .with(
                layer
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(layer.json().flatten_event(true).with_filter(filter))
            .init();
    }

    tracing::debug!(environment = ?env, "Logging ready");
}

/// Filter used when `RUST_LOG` is unset
fn default_filter(env: &Environment) -> &'static str {
    if env.is_development() {
        DEVELOPMENT_FILTER
    } else {
        PRODUCTION_FILTER
    }
}
