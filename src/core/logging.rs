//! Logging utilities with request context support.
//!
//! Request IDs live in task-local storage so that log lines emitted deep in
//! a handler can be correlated without threading the ID through every call.

use chrono::Local;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

tokio::task_local! {
    /// Task-local storage for the current request ID.
    pub static REQUEST_ID: String;
}

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,image_relay_rust=debug";

/// Noise suppression appended to every filter, including a user-supplied `RUST_LOG`.
const NOISE_FILTER: &str = "hyper=warn,hyper::proto=warn,h2=warn,reqwest=warn";

/// Get the current request ID from context, if set.
///
/// Returns an empty string if no request ID is set.
pub fn get_request_id() -> String {
    REQUEST_ID.try_with(|id| id.clone()).unwrap_or_default()
}

/// Generate a new unique request ID using UUID v4.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Custom time formatter that uses local timezone (respects TZ environment variable)
struct LocalTime;

impl tracing_subscriber::fmt::time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Build the filter directive string from an optional `RUST_LOG` value.
fn filter_directives(rust_log: Option<String>) -> String {
    let base = rust_log
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    format!("{},{}", base, NOISE_FILTER)
}

/// Install the global tracing subscriber.
///
/// ANSI colors are disabled when `NO_COLOR` is set (for file logging).
pub fn init_tracing() {
    let filter =
        tracing_subscriber::EnvFilter::new(filter_directives(std::env::var("RUST_LOG").ok()));
    let no_color = std::env::var("NO_COLOR").is_ok();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTime)
                .with_ansi(!no_color),
        )
        .init();
}
