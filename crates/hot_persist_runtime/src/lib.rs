//! In-process reload runtime for `hot_persist`.
//!
//! This crate provides a concrete host for the reload handle capability
//! defined in `hot_persist_core`:
//!
//! - [`HotModule`] - A reload handle that fires its dispose callbacks on
//!   [`reload`](HotModule::reload)
//! - [`ModuleHost`] - Module-like wrapper with `hot` / `webpack_hot` slots
//! - [`HotRuntime`] - Registry of named modules, reloaded on demand
//! - [`TracingConfig`] - Subscriber setup for the `tracing` output of both
//!   crates
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hot_persist_core::{deps, persist, BuildMode, PersistConfig};
//! use hot_persist_runtime::{HotModule, ModuleHost};
//!
//! let module = Arc::new(HotModule::new("app"));
//! let host = Arc::new(ModuleHost::new(&module));
//! let persistor = persist(host).with_config(PersistConfig::fixed(BuildMode::Development));
//!
//! let cache = persistor.call(|| Arc::new(Vec::<u8>::new()), Some(deps![1]), "cache");
//! module.reload()?;
//! let again = persistor.call(|| Arc::new(Vec::<u8>::new()), Some(deps![1]), "cache");
//! assert!(Arc::ptr_eq(&cache, &again));
//! # Ok::<(), hot_persist_runtime::RuntimeError>(())
//! ```

mod error;
mod module;
mod runtime;
mod tracing_setup;

pub use error::{RuntimeError, TracingError};
pub use module::{HotModule, ModuleHost};
pub use runtime::HotRuntime;
pub use tracing_setup::{LOG_FILTER_VAR, LOG_FORMAT_VAR, TracingConfig, TracingFormat};
