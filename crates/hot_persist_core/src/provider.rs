//! Reload handle providers.
//!
//! A persistor is bound to a [`HotProvider`], which says how to find the
//! reload handle each time the persistor runs.

use core::fmt;
use std::sync::Arc;

use crate::hot::{HotHandle, ModuleLike};

/// Function that resolves a reload handle on demand.
pub type HandleGetter = Arc<dyn Fn() -> Option<HotHandle> + Send + Sync>;

/// How a persistor finds its reload handle.
///
/// # Resolution
///
/// | Variant | Handle |
/// |---------|--------|
/// | `Handle` | the stored handle, if any |
/// | `Module` | `webpack_hot()`, else `hot()` |
/// | `Getter` | result of calling the getter, on every call |
///
/// Use `Getter` when the host replaces the handle between reloads and a
/// value captured at bind time would go stale.
#[derive(Clone)]
pub enum HotProvider {
    /// A handle captured at bind time.
    Handle(Option<HotHandle>),
    /// A module-like object exposing the handle through named slots.
    Module(Arc<dyn ModuleLike>),
    /// A function returning the current handle.
    Getter(HandleGetter),
}

impl HotProvider {
    /// Wraps a handle getter.
    #[must_use]
    pub fn getter(getter: impl Fn() -> Option<HotHandle> + Send + Sync + 'static) -> Self {
        Self::Getter(Arc::new(getter))
    }

    /// Wraps a module-like object.
    #[must_use]
    pub fn module(module: Arc<dyn ModuleLike>) -> Self {
        Self::Module(module)
    }

    /// A provider that never yields a handle.
    #[must_use]
    pub fn none() -> Self {
        Self::Handle(None)
    }

    /// Resolves the reload handle.
    #[must_use]
    pub fn resolve(&self) -> Option<HotHandle> {
        match self {
            Self::Handle(handle) => handle.clone(),
            Self::Module(module) => module.webpack_hot().or_else(|| module.hot()),
            Self::Getter(getter) => getter(),
        }
    }
}

impl From<HotHandle> for HotProvider {
    fn from(handle: HotHandle) -> Self {
        Self::Handle(Some(handle))
    }
}

impl From<Option<HotHandle>> for HotProvider {
    fn from(handle: Option<HotHandle>) -> Self {
        Self::Handle(handle)
    }
}

impl<M: ModuleLike + 'static> From<Arc<M>> for HotProvider {
    fn from(module: Arc<M>) -> Self {
        Self::Module(module)
    }
}

impl fmt::Debug for HotProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle(handle) => f
                .debug_tuple("Handle")
                .field(&handle.as_ref().map(|_| ".."))
                .finish(),
            Self::Module(_) => f.write_str("Module(..)"),
            Self::Getter(_) => f.write_str("Getter(..)"),
        }
    }
}
