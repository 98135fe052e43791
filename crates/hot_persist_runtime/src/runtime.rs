//! Multi-module reload registry.
//!
//! [`HotRuntime`] plays the part of a development server: it owns one
//! [`HotModule`] per hot-reloadable unit and reloads them on request.

use std::sync::Arc;

use hashbrown::HashMap;
use hot_persist_core::{HotHandle, HotProvider};
use parking_lot::RwLock;

use crate::error::RuntimeError;
use crate::module::HotModule;

type ModuleMap = HashMap<String, Arc<HotModule>>;

/// Registry of hot-reloadable modules keyed by id.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hot_persist_core::{persist, BuildMode, PersistConfig};
/// use hot_persist_runtime::HotRuntime;
///
/// let runtime = HotRuntime::new();
/// runtime.register("app").unwrap();
///
/// let persistor = persist(runtime.provider("app"))
///     .with_config(PersistConfig::fixed(BuildMode::Development));
///
/// let a = persistor.get(|| Arc::new(1));
/// runtime.reload("app").unwrap();
/// let b = persistor.get(|| Arc::new(1));
///
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Clone, Default)]
pub struct HotRuntime {
    modules: Arc<RwLock<ModuleMap>>,
}

impl HotRuntime {
    /// Creates an empty runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new module.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::DuplicateModule`] if `id` is taken.
    pub fn register(&self, id: impl Into<String>) -> Result<Arc<HotModule>, RuntimeError> {
        let id = id.into();
        let mut modules = self.modules.write();

        if modules.contains_key(&id) {
            return Err(RuntimeError::DuplicateModule(id));
        }

        let module = Arc::new(HotModule::new(id.clone()));
        modules.insert(id.clone(), Arc::clone(&module));
        tracing::debug!(module = %id, "registered module");
        Ok(module)
    }

    /// Removes a module and returns it.
    ///
    /// Once the caller drops the returned module, its call index entry can be
    /// reclaimed.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownModule`] if `id` is not registered.
    pub fn unregister(&self, id: &str) -> Result<Arc<HotModule>, RuntimeError> {
        self.modules
            .write()
            .remove(id)
            .ok_or_else(|| RuntimeError::UnknownModule(id.to_owned()))
    }

    /// Returns the module registered under `id`.
    #[must_use]
    pub fn module(&self, id: &str) -> Option<Arc<HotModule>> {
        self.modules.read().get(id).cloned()
    }

    /// Returns the reload handle of the module registered under `id`.
    #[must_use]
    pub fn handle(&self, id: &str) -> Option<HotHandle> {
        self.module(id).as_ref().map(HotModule::handle)
    }

    /// Returns a provider that looks the module up on every call.
    ///
    /// The provider yields no handle while `id` is unregistered, so
    /// persistence calls fall back to fresh values.
    #[must_use]
    pub fn provider(&self, id: impl Into<String>) -> HotProvider {
        let modules = Arc::clone(&self.modules);
        let id = id.into();
        HotProvider::getter(move || {
            modules.read().get(&id).map(HotModule::handle)
        })
    }

    /// Reloads one module. Returns the number of dispose callbacks fired.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownModule`] if `id` is not registered, or
    /// [`RuntimeError::ReloadInProgress`] on a re-entrant reload.
    pub fn reload(&self, id: &str) -> Result<usize, RuntimeError> {
        let module = self
            .module(id)
            .ok_or_else(|| RuntimeError::UnknownModule(id.to_owned()))?;
        module.reload()
    }

    /// Reloads every module. Returns the total number of dispose callbacks
    /// fired.
    ///
    /// # Errors
    ///
    /// Stops at the first module that fails to reload.
    pub fn reload_all(&self) -> Result<usize, RuntimeError> {
        let modules: Vec<Arc<HotModule>> = self.modules.read().values().cloned().collect();
        let mut fired = 0;
        for module in modules {
            fired += module.reload()?;
        }
        Ok(fired)
    }

    /// Returns `true` if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.modules.read().contains_key(id)
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    /// Returns `true` if no modules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}

impl core::fmt::Debug for HotRuntime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let modules = self.modules.read();
        f.debug_struct("HotRuntime")
            .field("modules", &modules.keys().collect::<Vec<_>>())
            .finish()
    }
}
