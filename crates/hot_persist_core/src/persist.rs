//! The persistence engine.
//!
//! [`persist`] binds a [`Persistor`] to a [`HotProvider`]. Every
//! [`Persistor::call`] then decides whether to hand back the value the
//! previous instance of the module stored, or to build a new one:
//!
//! 1. Resolve the reload handle. In production, or without a handle, the
//!    factory runs and nothing is stored.
//! 2. Take the next call index for the handle and compute the storage key:
//!    the caller's key if given, otherwise a key derived from the index.
//! 3. Look up the previous [`PersistedItem`] in the handle's inbound bag.
//!    Reuse it if its dependencies are shallow-equal to the new ones;
//!    otherwise run the cleanup on the old value and build a new one.
//! 4. Register a dispose callback that writes the item into the successor's
//!    bag and resets the handle's call counter.
//!
//! Indexed keys are only stable while the number and order of unkeyed calls
//! against a handle stay the same between reloads. Add explicit keys to calls
//! whose position may move.

use std::sync::Arc;

use crate::call_counter::CallCounters;
use crate::hot::{BagValue, DataBag, HotHandle};
use crate::mode::PersistConfig;
use crate::options::{Cleanup, PersistOptions};
use crate::provider::HotProvider;
use crate::shallow::{Dependency, shallow_equal_arrays};

/// Token embedded in indexed keys so that different versions of this crate
/// linked into one host never read each other's entries.
pub const KEY_TOKEN: &str = env!("CARGO_PKG_VERSION");

/// A value stored in a data bag together with the dependencies that
/// produced it.
#[derive(Debug, Clone)]
pub struct PersistedItem<T> {
    /// The persisted value.
    pub instance: T,
    /// Dependencies the value was created with.
    pub dependencies: Option<Vec<Dependency>>,
}

/// Storage key for the unkeyed call with the given index.
///
/// Caller-supplied keys that happen to match this pattern will collide with
/// indexed entries.
#[must_use]
pub fn indexed_key(index: usize) -> String {
    format!("__hot_persist_{KEY_TOKEN}_indexed[{index}]")
}

/// Binds a persistor to a reload handle provider.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hot_persist_core::{persist, HotProvider};
///
/// // Without a reload handle every call builds a fresh value.
/// let persistor = persist(HotProvider::none());
/// let a = persistor.get(|| Arc::new(String::from("pool")));
/// let b = persistor.get(|| Arc::new(String::from("pool")));
/// assert!(!Arc::ptr_eq(&a, &b));
/// ```
#[must_use]
pub fn persist(provider: impl Into<HotProvider>) -> Persistor {
    Persistor::new(provider)
}

/// A persistence entry point bound to one reload handle provider.
#[derive(Debug, Clone)]
pub struct Persistor {
    provider: HotProvider,
    config: PersistConfig,
}

impl Persistor {
    /// Creates a persistor with the default configuration.
    #[must_use]
    pub fn new(provider: impl Into<HotProvider>) -> Self {
        Self {
            provider: provider.into(),
            config: PersistConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PersistConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PersistConfig {
        &self.config
    }

    /// Resolves the reload handle the next call would use.
    #[must_use]
    pub fn resolve_handle(&self) -> Option<HotHandle> {
        self.provider.resolve()
    }

    /// Returns the persisted value for this call site, creating it with
    /// `factory` when there is none or when `dependencies` changed.
    ///
    /// Passing `None` for `dependencies` on both sides of a reload counts as
    /// unchanged. Values are returned by clone, so use a shared handle type
    /// such as `Arc` when identity matters.
    ///
    /// # Panics
    ///
    /// Panics raised by `factory` or by the cleanup callback propagate to the
    /// caller.
    pub fn call<T, F>(
        &self,
        factory: F,
        dependencies: Option<Vec<Dependency>>,
        options: impl Into<PersistOptions<T>>,
    ) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let options = options.into();
        let hot = self.provider.resolve();

        let hot = match hot {
            Some(hot) if !self.config.mode().is_production() => hot,
            _ => return factory(),
        };

        let index = CallCounters::global().next(&hot);
        let key = options
            .user_key()
            .map_or_else(|| indexed_key(index), str::to_owned);

        let previous = hot.data().and_then(|bag| lookup::<T>(&bag, &key));
        let item = get_or_create(
            previous,
            factory,
            options.take_cleanup(),
            dependencies,
            &key,
        );

        let stored = Arc::clone(&item);
        let weak = Arc::downgrade(&hot);
        hot.dispose(Box::new(move |next: &DataBag| {
            let value: BagValue = stored;
            next.insert(key, value);

            if let Some(hot) = weak.upgrade() {
                CallCounters::global().reset(&hot);
            }
        }));

        item.instance.clone()
    }

    /// Shorthand for [`call`](Self::call) without dependencies or options.
    pub fn get<T, F>(&self, factory: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.call(factory, None, PersistOptions::default())
    }
}

/// Reads the item stored at `key`, if it has the expected type.
fn lookup<T>(bag: &DataBag, key: &str) -> Option<Arc<PersistedItem<T>>>
where
    T: Send + Sync + 'static,
{
    let value = bag.get(key)?;
    match value.downcast::<PersistedItem<T>>() {
        Ok(item) => Some(item),
        Err(_) => {
            tracing::warn!(
                key,
                expected = core::any::type_name::<T>(),
                "stored value has a different type, creating a new one"
            );
            None
        }
    }
}

fn get_or_create<T, F>(
    previous: Option<Arc<PersistedItem<T>>>,
    factory: F,
    cleanup: Option<Cleanup<T>>,
    dependencies: Option<Vec<Dependency>>,
    key: &str,
) -> Arc<PersistedItem<T>>
where
    F: FnOnce() -> T,
{
    match previous {
        Some(previous)
            if shallow_equal_arrays(
                previous.dependencies.as_deref(),
                dependencies.as_deref(),
            ) =>
        {
            tracing::debug!(key, "reusing persisted value");
            return previous;
        }
        Some(previous) => {
            tracing::debug!(key, "dependencies changed, replacing persisted value");
            if let Some(cleanup) = cleanup {
                tracing::debug!(key, "running cleanup");
                cleanup(&previous.instance);
            }
        }
        None => tracing::debug!(key, "creating persisted value"),
    }

    Arc::new(PersistedItem {
        instance: factory(),
        dependencies,
    })
}
