//! Keep values alive across hot module reloads.
//!
//! This crate re-exports the engine ([`hot_persist_core`]) and the in-process
//! reload host ([`hot_persist_runtime`]).

/// Persistence engine: call indices, dependency comparison and the
/// [`Persistor`](hot_persist_core::Persistor).
pub use hot_persist_core;

/// Reload handles, module registry and tracing setup.
pub use hot_persist_runtime;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use hot_persist_core::prelude::*;
    pub use hot_persist_runtime::{HotModule, HotRuntime, ModuleHost, RuntimeError};
}
