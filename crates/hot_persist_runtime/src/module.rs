//! In-process reload handles.
//!
//! [`HotModule`] is a concrete [`HotApi`] for hosts that drive reloads
//! themselves: it keeps the pending dispose callbacks and, on
//! [`reload`](HotModule::reload), fires them into a fresh [`DataBag`] that
//! becomes the next inbound bag. The handle keeps its identity across
//! reloads; only the data is swapped.
//!
//! [`ModuleHost`] is the module-like wrapper exposing a handle through the
//! `hot` and `webpack_hot` slots.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use hot_persist_core::{DataBag, DisposeCallback, HotApi, HotHandle, ModuleLike};
use parking_lot::{Mutex, RwLock};

use crate::error::RuntimeError;

/// A reload handle owned by an in-process host.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hot_persist_core::{persist, BuildMode, PersistConfig};
/// use hot_persist_runtime::HotModule;
///
/// let module = Arc::new(HotModule::new("app"));
/// let persistor = persist(module.handle())
///     .with_config(PersistConfig::fixed(BuildMode::Development));
///
/// let before = persistor.call(|| Arc::new(vec![1, 2, 3]), Some(vec![]), "numbers");
/// module.reload().unwrap();
/// let after = persistor.call(|| Arc::new(vec![1, 2, 3]), Some(vec![]), "numbers");
///
/// assert!(Arc::ptr_eq(&before, &after));
/// ```
pub struct HotModule {
    name: String,
    data: RwLock<Option<DataBag>>,
    pending: Mutex<Vec<DisposeCallback>>,
    reloading: AtomicBool,
    generation: AtomicU64,
}

impl HotModule {
    /// Creates a module with no inbound data.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: RwLock::new(None),
            pending: Mutex::new(Vec::new()),
            reloading: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Creates a module whose inbound bag is already set.
    #[must_use]
    pub fn with_data(name: impl Into<String>, data: DataBag) -> Self {
        let module = Self::new(name);
        *module.data.write() = Some(data);
        module
    }

    /// Returns a type-erased handle to this module.
    #[must_use]
    pub fn handle(self: &Arc<Self>) -> HotHandle {
        self.clone()
    }

    /// Module name, used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of completed reloads.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Number of dispose callbacks waiting for the next reload.
    #[must_use]
    pub fn pending_dispose_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Discards the current instance: fires every pending dispose callback
    /// once with a fresh bag, then installs that bag as the inbound data.
    ///
    /// Returns the number of callbacks fired.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ReloadInProgress`] when called from inside one
    /// of this module's dispose callbacks.
    pub fn reload(&self) -> Result<usize, RuntimeError> {
        if self.reloading.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::ReloadInProgress(self.name.clone()));
        }
        let _guard = ReloadGuard(&self.reloading);

        let next = DataBag::new();
        let callbacks = core::mem::take(&mut *self.pending.lock());
        let fired = callbacks.len();

        tracing::debug!(module = %self.name, callbacks = fired, "running dispose callbacks");
        for callback in callbacks {
            callback(&next);
        }

        *self.data.write() = Some(next);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        tracing::info!(module = %self.name, generation, carried = fired, "module reloaded");
        Ok(fired)
    }
}

/// Clears the reloading flag, even if a dispose callback panics.
struct ReloadGuard<'a>(&'a AtomicBool);

impl Drop for ReloadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl HotApi for HotModule {
    fn data(&self) -> Option<DataBag> {
        self.data.read().clone()
    }

    fn dispose(&self, callback: DisposeCallback) {
        self.pending.lock().push(callback);
    }
}

impl core::fmt::Debug for HotModule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HotModule")
            .field("name", &self.name)
            .field("generation", &self.generation())
            .field("pending", &self.pending_dispose_count())
            .finish_non_exhaustive()
    }
}

/// A module-like object exposing reload handles through named slots.
///
/// ```
/// use std::sync::Arc;
/// use hot_persist_core::{HotProvider, ModuleLike};
/// use hot_persist_runtime::{HotModule, ModuleHost};
///
/// let module = Arc::new(HotModule::new("app"));
/// let host = Arc::new(ModuleHost::detached().with_webpack_hot(module.handle()));
///
/// assert!(host.hot().is_none());
/// assert!(HotProvider::from(host).resolve().is_some());
/// ```
#[derive(Clone, Default)]
pub struct ModuleHost {
    hot: Option<HotHandle>,
    webpack_hot: Option<HotHandle>,
}

impl ModuleHost {
    /// A host with both slots populated by the same module.
    #[must_use]
    pub fn new(module: &Arc<HotModule>) -> Self {
        Self {
            hot: Some(module.handle()),
            webpack_hot: Some(module.handle()),
        }
    }

    /// A host with no reload handle, as in builds without hot reloading.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Sets the primary slot.
    #[must_use]
    pub fn with_hot(mut self, handle: HotHandle) -> Self {
        self.hot = Some(handle);
        self
    }

    /// Sets the alternate slot.
    #[must_use]
    pub fn with_webpack_hot(mut self, handle: HotHandle) -> Self {
        self.webpack_hot = Some(handle);
        self
    }
}

impl ModuleLike for ModuleHost {
    fn hot(&self) -> Option<HotHandle> {
        self.hot.clone()
    }

    fn webpack_hot(&self) -> Option<HotHandle> {
        self.webpack_hot.clone()
    }
}
