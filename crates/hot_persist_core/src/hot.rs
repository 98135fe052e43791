//! The reload handle capability and its data bag.
//!
//! A host reload runtime hands each hot-reloadable unit a *reload handle*.
//! The handle offers two things the persistence engine relies on:
//!
//! - an inbound [`DataBag`] written by the previous instance of the unit;
//! - a way to register a [`DisposeCallback`] that fires once, right before the
//!   current instance is discarded, with the bag that becomes the successor's
//!   inbound data.
//!
//! Hosts implement [`HotApi`]. Module-like wrappers that expose a handle
//! through named slots implement [`ModuleLike`].

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

/// Type-erased value stored in a [`DataBag`].
pub type BagValue = Arc<dyn Any + Send + Sync>;

/// Callback fired by the host right before a reload handle is discarded.
///
/// The argument is the bag that becomes the successor's inbound data.
pub type DisposeCallback = Box<dyn FnOnce(&DataBag) + Send>;

/// Shared reference to a reload handle.
///
/// Handle identity is the identity of the `Arc` allocation.
pub type HotHandle = Arc<dyn HotApi>;

/// Capability a host reload runtime provides for one hot-reloadable unit.
///
/// # Contract
///
/// - [`data`](Self::data) returns the bag the previous instance wrote into,
///   or `None` when there is no previous instance.
/// - Every callback registered through [`dispose`](Self::dispose) is invoked
///   at most once, synchronously, with the successor's inbound bag.
///
/// # Example
///
/// ```
/// use hot_persist_core::{DataBag, DisposeCallback, HotApi};
/// use parking_lot::Mutex;
///
/// #[derive(Default)]
/// struct OneShot {
///     inbound: Option<DataBag>,
///     pending: Mutex<Vec<DisposeCallback>>,
/// }
///
/// impl HotApi for OneShot {
///     fn data(&self) -> Option<DataBag> {
///         self.inbound.clone()
///     }
///
///     fn dispose(&self, callback: DisposeCallback) {
///         self.pending.lock().push(callback);
///     }
/// }
/// ```
pub trait HotApi: Send + Sync {
    /// Returns the inbound data bag, if any.
    fn data(&self) -> Option<DataBag>;

    /// Registers a callback to run right before this handle is discarded.
    fn dispose(&self, callback: DisposeCallback);
}

/// An object exposing a reload handle through conventionally named slots.
///
/// `hot` is the primary slot; `webpack_hot` is the alternate slot that some
/// hosts populate instead. When both are present the alternate slot wins.
pub trait ModuleLike: Send + Sync {
    /// Primary handle slot.
    fn hot(&self) -> Option<HotHandle>;

    /// Alternate handle slot.
    fn webpack_hot(&self) -> Option<HotHandle> {
        None
    }
}

/// Shared, string-keyed, type-erased map carried from one instance of a
/// hot-reloadable unit to the next.
///
/// Cloning a `DataBag` yields another reference to the same map.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hot_persist_core::DataBag;
///
/// let bag = DataBag::new();
/// bag.insert("answer", Arc::new(42_u32));
///
/// let alias = bag.clone();
/// assert_eq!(alias.get_as::<u32>("answer").as_deref(), Some(&42));
/// assert!(alias.get_as::<String>("answer").is_none());
/// ```
#[derive(Clone, Default)]
pub struct DataBag {
    entries: Arc<RwLock<HashMap<String, BagValue>>>,
}

impl DataBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value stored at `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<BagValue> {
        self.entries.read().get(key).cloned()
    }

    /// Returns the value stored at `key` if it has type `T`.
    #[must_use]
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.get(key).and_then(|value| value.downcast::<T>().ok())
    }

    /// Stores `value` at `key`, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: BagValue) -> Option<BagValue> {
        self.entries.write().insert(key.into(), value)
    }

    /// Removes and returns the value stored at `key`.
    pub fn remove(&self, key: &str) -> Option<BagValue> {
        self.entries.write().remove(key)
    }

    /// Returns `true` if a value is stored at `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the bag holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns a snapshot of the stored keys, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Returns `true` if both values refer to the same underlying map.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for DataBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBag")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Returns the address identifying a handle.
pub(crate) fn handle_addr(handle: &HotHandle) -> usize {
    Arc::as_ptr(handle).cast::<()>().addr()
}
