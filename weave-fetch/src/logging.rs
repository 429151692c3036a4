//! Logging setup for Weave.
//!
//! The engine emits `tracing` events at every traversal level; this module
//! installs a subscriber for them, controlled by environment variables.
//!
//! # Environment Variables
//!
//! - `WEAVE_DEBUG=true` or `WEAVE_DEBUG=1` - Enable debug logging
//! - `WEAVE_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `WEAVE_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use weave_fetch::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//!
//! // Or with custom settings
//! logging::init_with_level("trace");
//! ```
//!
//! # Events
//!
//! - `resolve_level` spans carry `depth`, `kind` and `values`
//! - `fetch_by_ids` / `fetch_by_parent_ids` debug events carry the batch size
//! - applies, deferrals and missing targets are logged at trace level

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `WEAVE_DEBUG`.
///
/// Returns `true` if `WEAVE_DEBUG` is set to "true", "1", or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("WEAVE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `WEAVE_LOG_LEVEL`.
///
/// Defaults to "debug" if `WEAVE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("WEAVE_LOG_LEVEL") {
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

/// Get the configured log format from `WEAVE_LOG_FORMAT`.
///
/// Defaults to "json" for structured logging.
pub fn get_log_format() -> &'static str {
    env::var("WEAVE_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize the Weave logging system.
///
/// Call once at startup; later calls are no-ops. Without the
/// `tracing-subscriber` feature nothing is installed and events go to
/// whatever subscriber the application sets up.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("WEAVE_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "weave={},weave_fetch={},weave_graph={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            match get_log_format() {
                "json" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json())
                        .init();
                }
                "compact" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().compact())
                        .init();
                }
                _ => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().pretty())
                        .init();
                }
            }

            tracing::info!(
                level = level,
                format = get_log_format(),
                "Weave logging initialized"
            );
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
    // SAFETY: This should only be called at program startup before threads are spawned.
    unsafe {
        env::set_var("WEAVE_LOG_LEVEL", level);
    }
    init();
}
