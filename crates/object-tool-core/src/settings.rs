//! Configuration for the object-tool subsystem.
//!
//! [`Settings`] replaces the original module-level settings toggles with an
//! explicit configuration object owned by application start-up code. All
//! values have working defaults; [`Settings::from_env`] overrides them from
//! `OBJECT_TOOL_*` environment variables.

use serde::{Deserialize, Serialize};

/// Configuration values consumed by the admin-site component.
///
/// # Examples
///
/// ```
/// use object_tool_core::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.url_prefix, "/admin");
/// assert_eq!(settings.confirm_field, "confirm");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled. Controls the logging format.
    pub debug: bool,
    /// The log level filter (e.g. "debug", "info", "warn").
    pub log_level: String,
    /// The URL prefix under which admin routes are mounted.
    pub url_prefix: String,
    /// The payload field whose presence marks a confirmation submission.
    pub confirm_field: String,
    /// The payload field carrying the URL of the originating admin page.
    pub origin_field: String,
    /// The query/payload parameter carrying preserved changelist filters.
    pub filters_field: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            url_prefix: "/admin".to_string(),
            confirm_field: "confirm".to_string(),
            origin_field: "_objecttool_origin".to_string(),
            filters_field: "_changelist_filters".to_string(),
        }
    }
}

impl Settings {
    /// Builds settings from `OBJECT_TOOL_*` environment variables, falling
    /// back to the defaults for anything unset.
    ///
    /// Recognized variables: `OBJECT_TOOL_DEBUG` (`"1"`/`"true"` enables),
    /// `OBJECT_TOOL_LOG_LEVEL`, `OBJECT_TOOL_URL_PREFIX`,
    /// `OBJECT_TOOL_CONFIRM_FIELD`, `OBJECT_TOOL_ORIGIN_FIELD`,
    /// `OBJECT_TOOL_FILTERS_FIELD`.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(debug) = std::env::var("OBJECT_TOOL_DEBUG") {
            settings.debug = matches!(debug.as_str(), "1" | "true" | "True");
        }
        if let Ok(level) = std::env::var("OBJECT_TOOL_LOG_LEVEL") {
            settings.log_level = level;
        }
        if let Ok(prefix) = std::env::var("OBJECT_TOOL_URL_PREFIX") {
            settings.url_prefix = prefix;
        }
        if let Ok(field) = std::env::var("OBJECT_TOOL_CONFIRM_FIELD") {
            settings.confirm_field = field;
        }
        if let Ok(field) = std::env::var("OBJECT_TOOL_ORIGIN_FIELD") {
            settings.origin_field = field;
        }
        if let Ok(field) = std::env::var("OBJECT_TOOL_FILTERS_FIELD") {
            settings.filters_field = field;
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.url_prefix, "/admin");
        assert_eq!(settings.confirm_field, "confirm");
        assert_eq!(settings.origin_field, "_objecttool_origin");
        assert_eq!(settings.filters_field, "_changelist_filters");
    }

    #[test]
    fn test_from_env_without_vars_matches_defaults() {
        // None of the OBJECT_TOOL_* variables are set in the test
        // environment, so from_env must reproduce the defaults.
        let settings = Settings::from_env();
        assert_eq!(settings.url_prefix, Settings::default().url_prefix);
        assert_eq!(settings.confirm_field, Settings::default().confirm_field);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"url_prefix\":\"/admin\""));
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.origin_field, settings.origin_field);
    }
}
