//! Logging bootstrap for Ferrule.
//!
//! The compiler itself only emits `tracing` events; this module installs a
//! subscriber for applications that do not bring their own. It is controlled
//! by environment variables:
//!
//! - `FERRULE_DEBUG=true|1|yes` - Enable debug logging
//! - `FERRULE_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `FERRULE_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use ferrule_query::logging;
//!
//! // Call once at startup; later calls are no-ops.
//! logging::init();
//! ```
//!
//! Dropped conditions are logged at `debug`, every emitted fragment at
//! `trace`, and the final filter at `debug` (or `info` when
//! `debug.log_queries` is set in `ferrule.toml`).

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `FERRULE_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("FERRULE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `FERRULE_LOG_LEVEL`.
///
/// Defaults to "debug" if `FERRULE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("FERRULE_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Get the configured log format from `FERRULE_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    env::var("FERRULE_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Build the filter directive covering every Ferrule crate.
pub fn filter_directive(level: &str) -> String {
    ["ferrule", "ferrule_schema", "ferrule_query", "ferrule_mongodb"]
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the Ferrule logging system.
///
/// Does nothing unless `FERRULE_DEBUG` or `FERRULE_LOG_LEVEL` is set, or when
/// the `tracing-subscriber` feature is disabled.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("FERRULE_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(filter_directive(level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let installed = match get_log_format() {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "Ferrule logging initialized"
                );
            }
        }
    });
}

/// Initialize logging with a specific level.
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call this early in your program before
/// spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: Only called at program startup before threads are spawned.
    unsafe {
        env::set_var("FERRULE_LOG_LEVEL", level);
    }
    init();
}
