//! Build mode configuration.
//!
//! Values only survive reloads in development. The build mode is read from a
//! process environment variable on every persistence call, or pinned through
//! [`PersistConfig::fixed`].

use std::borrow::Cow;

/// Default environment variable consulted for the build mode.
pub const DEFAULT_MODE_VAR: &str = "HOT_PERSIST_ENV";

/// Value of the mode variable that selects [`BuildMode::Production`].
pub const PRODUCTION: &str = "production";

/// Whether persisted values may be reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Reuse values across reloads.
    #[default]
    Development,
    /// Always create fresh values.
    Production,
}

impl BuildMode {
    /// Maps a mode string to a build mode.
    ///
    /// Only the exact string `"production"` selects production; every other
    /// value, including the empty string, is development.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == PRODUCTION {
            Self::Production
        } else {
            Self::Development
        }
    }

    /// Reads the build mode from the environment variable `var`.
    ///
    /// An unset or non-unicode variable means development.
    #[must_use]
    pub fn from_env_var(var: &str) -> Self {
        std::env::var(var)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    /// Returns `true` for [`BuildMode::Production`].
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Where the persistence engine gets its build mode from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeSource {
    /// Read the named environment variable on every call.
    Env(Cow<'static, str>),
    /// Always use the given mode.
    Fixed(BuildMode),
}

impl ModeSource {
    /// Resolves the current build mode.
    #[must_use]
    pub fn current(&self) -> BuildMode {
        match self {
            Self::Env(var) => BuildMode::from_env_var(var),
            Self::Fixed(mode) => *mode,
        }
    }
}

impl Default for ModeSource {
    fn default() -> Self {
        Self::Env(Cow::Borrowed(DEFAULT_MODE_VAR))
    }
}

/// Persistence engine configuration.
///
/// # Example
///
/// ```
/// use hot_persist_core::{BuildMode, PersistConfig};
///
/// let pinned = PersistConfig::fixed(BuildMode::Production);
/// assert!(pinned.mode().is_production());
///
/// let custom = PersistConfig::from_env_var("MY_APP_ENV");
/// assert_ne!(custom, PersistConfig::default());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistConfig {
    /// Build mode source.
    pub mode: ModeSource,
}

impl PersistConfig {
    /// Pins the build mode.
    #[must_use]
    pub fn fixed(mode: BuildMode) -> Self {
        Self {
            mode: ModeSource::Fixed(mode),
        }
    }

    /// Reads the build mode from a custom environment variable.
    #[must_use]
    pub fn from_env_var(var: impl Into<Cow<'static, str>>) -> Self {
        Self {
            mode: ModeSource::Env(var.into()),
        }
    }

    /// Resolves the current build mode.
    #[must_use]
    pub fn mode(&self) -> BuildMode {
        self.mode.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_production_is_production() {
        assert_eq!(BuildMode::parse("production"), BuildMode::Production);
        assert_eq!(BuildMode::parse("Production"), BuildMode::Development);
        assert_eq!(BuildMode::parse("development"), BuildMode::Development);
        assert_eq!(BuildMode::parse("test"), BuildMode::Development);
        assert_eq!(BuildMode::parse(""), BuildMode::Development);
    }

    #[test]
    fn unset_variable_is_development() {
        let mode = BuildMode::from_env_var("HOT_PERSIST_TEST_VARIABLE_THAT_IS_NEVER_SET");
        assert_eq!(mode, BuildMode::Development);
    }

    #[test]
    fn fixed_source_ignores_environment() {
        let config = PersistConfig::fixed(BuildMode::Production);
        assert!(config.mode().is_production());
        assert_eq!(config.mode, ModeSource::Fixed(BuildMode::Production));
    }

    #[test]
    fn default_reads_default_variable() {
        let config = PersistConfig::default();
        assert_eq!(config.mode, ModeSource::Env(Cow::Borrowed(DEFAULT_MODE_VAR)));
    }

    #[test]
    fn custom_variable() {
        let config = PersistConfig::from_env_var(String::from("APP_ENV"));
        assert_eq!(config.mode, ModeSource::Env(Cow::Owned("APP_ENV".into())));
    }
}
