//! Keep values alive across hot-module reloads.
//!
//! `hot_persist_core` lets code running inside a hot-reloadable unit keep
//! expensive or stateful values (caches, connections, singletons) when the
//! unit is reloaded during development, while always building fresh values
//! in production.
//!
//! - [`hot`] - The reload handle capability ([`HotApi`]) and its [`DataBag`]
//! - [`provider`] - How a persistor finds its reload handle ([`HotProvider`])
//! - [`persist`](mod@persist) - The persistence engine ([`Persistor`])
//! - [`options`] - Per-call options ([`PersistOptions`])
//! - [`shallow`] - Dependency values and [`shallow_equal_arrays`]
//! - [`call_counter`] - Per-handle call index registry ([`CallCounters`])
//! - [`mode`] - Build mode configuration ([`PersistConfig`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hot_persist_core::{deps, persist, HotProvider, PersistOptions};
//!
//! struct Pool { size: usize }
//!
//! let persistor = persist(HotProvider::none());
//! let pool = persistor.call(
//!     || Arc::new(Pool { size: 4 }),
//!     Some(deps![4]),
//!     PersistOptions::key("pool").with_cleanup(|old: &Arc<Pool>| {
//!         assert!(old.size > 0);
//!     }),
//! );
//! assert_eq!(pool.size, 4);
//! ```

pub mod call_counter;
pub mod hot;
pub mod mode;
pub mod options;
pub mod persist;
pub mod provider;
pub mod shallow;

pub use call_counter::{CallCounters, get_call_counter, reset_call_counter};
pub use hot::{BagValue, DataBag, DisposeCallback, HotApi, HotHandle, ModuleLike};
pub use mode::{BuildMode, DEFAULT_MODE_VAR, ModeSource, PersistConfig};
pub use options::{Cleanup, PersistOptions};
pub use persist::{KEY_TOKEN, PersistedItem, Persistor, indexed_key, persist};
pub use provider::{HandleGetter, HotProvider};
pub use shallow::{Dependency, shallow_equal_arrays};

/// Re-export of the common types.
pub mod prelude {
    pub use crate::deps;
    pub use crate::{
        BuildMode, DataBag, Dependency, HotApi, HotHandle, HotProvider, ModuleLike,
        PersistConfig, PersistOptions, Persistor, persist,
    };
}
