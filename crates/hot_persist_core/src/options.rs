//! Per-call persistence options.

use core::fmt;

/// Callback invoked with a persisted value that is being replaced.
pub type Cleanup<T> = Box<dyn FnOnce(&T)>;

/// Options for a single persistence call.
///
/// A bare key converts into [`PersistOptions::Key`]:
///
/// ```
/// use hot_persist_core::PersistOptions;
///
/// let options: PersistOptions<u32> = "connection".into();
/// assert_eq!(options.user_key(), Some("connection"));
///
/// let options = PersistOptions::<u32>::cleanup(|old| assert!(*old > 0)).with_key("pool");
/// assert_eq!(options.user_key(), Some("pool"));
///
/// assert_eq!(PersistOptions::<u32>::default().user_key(), None);
/// ```
pub enum PersistOptions<T> {
    /// Store under an explicit key.
    Key(String),
    /// Optional explicit key and optional cleanup.
    Full {
        /// Storage key. `None` falls back to the call index.
        key: Option<String>,
        /// Runs with the previous value when dependencies changed.
        cleanup: Option<Cleanup<T>>,
    },
}

impl<T> PersistOptions<T> {
    /// Options with an explicit key.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// Options with a cleanup callback and no explicit key.
    #[must_use]
    pub fn cleanup(cleanup: impl FnOnce(&T) + 'static) -> Self {
        Self::Full {
            key: None,
            cleanup: Some(Box::new(cleanup)),
        }
    }

    /// Sets the explicit key, keeping any cleanup.
    #[must_use]
    pub fn with_key(self, key: impl Into<String>) -> Self {
        match self {
            Self::Key(_) => Self::Key(key.into()),
            Self::Full { cleanup, .. } => Self::Full {
                key: Some(key.into()),
                cleanup,
            },
        }
    }

    /// Sets the cleanup callback, keeping any key.
    #[must_use]
    pub fn with_cleanup(self, cleanup: impl FnOnce(&T) + 'static) -> Self {
        let key = match self {
            Self::Key(key) => Some(key),
            Self::Full { key, .. } => key,
        };
        Self::Full {
            key,
            cleanup: Some(Box::new(cleanup)),
        }
    }

    /// The caller-supplied key, if any.
    #[must_use]
    pub fn user_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key.as_str()),
            Self::Full { key, .. } => key.as_deref(),
        }
    }

    /// Splits off the cleanup callback.
    pub(crate) fn take_cleanup(self) -> Option<Cleanup<T>> {
        match self {
            Self::Key(_) => None,
            Self::Full { cleanup, .. } => cleanup,
        }
    }
}

impl<T> Default for PersistOptions<T> {
    fn default() -> Self {
        Self::Full {
            key: None,
            cleanup: None,
        }
    }
}

impl<T> From<&str> for PersistOptions<T> {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl<T> From<String> for PersistOptions<T> {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl<T> From<Option<String>> for PersistOptions<T> {
    fn from(key: Option<String>) -> Self {
        Self::Full { key, cleanup: None }
    }
}

impl<T> fmt::Debug for PersistOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Self::Full { key, cleanup } => f
                .debug_struct("Full")
                .field("key", key)
                .field("cleanup", &cleanup.is_some())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn string_is_key_shorthand() {
        let options: PersistOptions<()> = String::from("a").into();
        assert!(matches!(options, PersistOptions::Key(ref key) if key == "a"));
    }

    #[test]
    fn absent_key_falls_through() {
        let options: PersistOptions<()> = None.into();
        assert_eq!(options.user_key(), None);
    }

    #[test]
    fn with_cleanup_keeps_key() {
        let options = PersistOptions::<i32>::key("k").with_cleanup(|_| {});
        assert_eq!(options.user_key(), Some("k"));
        assert!(options.take_cleanup().is_some());
    }

    #[test]
    fn key_only_has_no_cleanup() {
        let options = PersistOptions::<i32>::key("k");
        assert!(options.take_cleanup().is_none());
    }

    #[test]
    fn cleanup_receives_value() {
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        let options = PersistOptions::<i32>::cleanup(move |old| sink.set(*old));

        let cleanup = options.take_cleanup().expect("cleanup set");
        cleanup(&7);
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn debug_hides_callback() {
        let options = PersistOptions::<i32>::cleanup(|_| {}).with_key("k");
        assert_eq!(
            format!("{options:?}"),
            r#"Full { key: Some("k"), cleanup: true }"#
        );
    }
}
