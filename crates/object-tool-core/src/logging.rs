//! Logging integration.
//!
//! Helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating a span around a
//! single tool dispatch.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level`. In debug mode a pretty,
/// human-readable format is used; otherwise a structured JSON format.
/// Calling this more than once is harmless: later calls are ignored.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span covering one object-tool dispatch.
///
/// # Examples
///
/// ```
/// use object_tool_core::logging::dispatch_span;
///
/// let span = dispatch_span("blog.article", "publish_now");
/// let _guard = span.enter();
/// tracing::info!("dispatching");
/// ```
pub fn dispatch_span(model_key: &str, action: &str) -> tracing::Span {
    tracing::info_span!("object_tool", model = model_key, action = action)
}
