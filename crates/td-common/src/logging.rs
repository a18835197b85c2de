//! Structured Logging Configuration
//!
//! Provides configurable logging with:
//! - JSON output for log shipping (LOG_FORMAT=json)
//! - Human-readable output for interactive use (default)
//!
//! # Usage
//!
//! ```rust,ignore
//! use td_common::logging::init_logging;
//!
//! fn main() {
//!     init_logging("td-admin");
//!
//!     tracing::info!(tender_id = %id, "Tender deleted");
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: Set to "json" for JSON output, anything else for text (default: text)
//! - `RUST_LOG`: Standard log level filter (default: warn for the console, so table
//!   output stays readable). Example: `RUST_LOG=td_client=debug`

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// Initialize logging for the given service.
///
/// Reads LOG_FORMAT to choose between JSON and text output and RUST_LOG for
/// level filtering. Log lines go to stderr so command output on stdout can be
/// piped.
pub fn init_logging(service_name: &str) {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();

    let env_filter = build_filter(std::env::var("RUST_LOG").ok().as_deref());

    if log_format.eq_ignore_ascii_case("json") {
        init_json_logging(env_filter);
    } else {
        init_text_logging(env_filter);
    }

    tracing::debug!(service = service_name, format = %log_format, "Logging initialized");
}

/// Build the env filter, falling back to [`DEFAULT_FILTER`] on a missing or
/// unparsable directive.
fn build_filter(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn init_json_logging(env_filter: EnvFilter) {
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .flatten_event(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .try_init();
}

fn init_text_logging(env_filter: EnvFilter) {
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(true),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_falls_back_on_garbage() {
        let filter = build_filter(Some("td_client=loudest"));
        assert_eq!(filter.to_string(), DEFAULT_FILTER);
    }

    #[test]
    fn test_filter_uses_directive() {
        let filter = build_filter(Some("td_client=debug"));
        assert_eq!(filter.to_string(), "td_client=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging("test");
        init_logging("test");
    }
}
