//! Tracing subscriber setup.
//!
//! The engine and runtime log through `tracing`. Hosts that do not install a
//! subscriber of their own can use [`TracingConfig`]:
//!
//! ```no_run
//! use hot_persist_runtime::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! TracingConfig::default()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .init()
//!     .expect("subscriber installed");
//! ```
//!
//! # Environment
//!
//! [`TracingConfig::from_env`] reads:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `HOT_PERSIST_LOG` | filter directives, e.g. `hot_persist_core=trace` |
//! | `HOT_PERSIST_LOG_FORMAT` | `pretty`, `compact` or `json` |

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::TracingError;

/// Environment variable holding filter directives.
pub const LOG_FILTER_VAR: &str = "HOT_PERSIST_LOG";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_VAR: &str = "HOT_PERSIST_LOG_FORMAT";

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

impl TracingFormat {
    /// Parses a format name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the global tracing subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Maximum log level, used when no filter is set.
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// Filter directives (e.g. `"hot_persist_core=debug"`).
    pub env_filter: Option<String>,
    /// Whether to include span enter/exit events.
    pub span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from [`LOG_FILTER_VAR`] and [`LOG_FORMAT_VAR`].
    ///
    /// Unset variables and unknown format names keep the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(LOG_FILTER_VAR).ok(),
            std::env::var(LOG_FORMAT_VAR).ok(),
        )
    }

    /// Builds a configuration from raw filter and format values.
    #[must_use]
    pub fn from_values(filter: Option<String>, format: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = filter.filter(|f| !f.trim().is_empty()) {
            config.env_filter = Some(filter);
        }
        if let Some(format) = format.as_deref().and_then(TracingFormat::parse) {
            config.format = format;
        }
        config
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets filter directives.
    ///
    /// Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Builds the filter: the directives if set, otherwise the level.
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::InvalidFilter`] for malformed directives.
    pub fn filter(&self) -> Result<EnvFilter, TracingError> {
        match &self.env_filter {
            Some(filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::new(self.level.as_str())),
        }
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::InvalidFilter`] for malformed directives and
    /// [`TracingError::Init`] if a global subscriber is already installed.
    pub fn init(&self) -> Result<(), TracingError> {
        let env_filter = self.filter()?;

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        match self.format {
            TracingFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init()?,
            TracingFormat::Compact => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init()?,
            TracingFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init()?,
        }

        tracing::debug!(
            level = %self.level,
            format = ?self.format,
            "tracing initialized"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_format_default_is_pretty() {
        assert_eq!(TracingFormat::default(), TracingFormat::Pretty);
    }

    #[test]
    fn format_names_parse() {
        assert_eq!(TracingFormat::parse("JSON"), Some(TracingFormat::Json));
        assert_eq!(TracingFormat::parse(" compact "), Some(TracingFormat::Compact));
        assert_eq!(TracingFormat::parse("pretty"), Some(TracingFormat::Pretty));
        assert_eq!(TracingFormat::parse("xml"), None);
    }

    #[test]
    fn default_level_is_info() {
        assert_eq!(TracingConfig::default().level, Level::INFO);
    }

    #[test]
    fn builders_set_fields() {
        let config = TracingConfig::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_env_filter("hot_persist_core=trace")
            .with_span_events(true);

        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, TracingFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("hot_persist_core=trace"));
        assert!(config.span_events);
    }

    #[test]
    fn from_values_applies_known_settings() {
        let config = TracingConfig::from_values(
            Some("hot_persist_runtime=debug".into()),
            Some("compact".into()),
        );
        assert_eq!(config.env_filter.as_deref(), Some("hot_persist_runtime=debug"));
        assert_eq!(config.format, TracingFormat::Compact);
    }

    #[test]
    fn from_values_ignores_blank_and_unknown() {
        let config = TracingConfig::from_values(Some("  ".into()), Some("yaml".into()));
        assert_eq!(config, TracingConfig::default());
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let config = TracingConfig::new().with_env_filter("hot_persist_core=loud");
        assert!(matches!(config.filter(), Err(TracingError::InvalidFilter(_))));
    }
}
