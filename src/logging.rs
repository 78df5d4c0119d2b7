//! Diagnostic logging for the `twig` binary
//!
//! The library only emits `tracing` events. The binary installs a stderr
//! subscriber whose filter comes from the `TWIG_LOG` environment variable,
//! so command output on stdout is never interleaved with diagnostics.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter (e.g. `debug`, `twig=trace`)
pub const LOG_ENV: &str = "TWIG_LOG";

/// Filter used when `TWIG_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Resolve the filter directive from an optional raw value
pub fn filter_directive(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() && EnvFilter::try_new(raw).is_ok() => raw.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Install the global subscriber
///
/// Calling this twice is harmless: the second registration is ignored.
pub fn init_logging() {
    let raw = std::env::var(LOG_ENV).ok();
    let filter = EnvFilter::new(filter_directive(raw.as_deref()));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
