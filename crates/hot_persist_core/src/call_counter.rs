//! Per-handle call index registry.
//!
//! Unkeyed persistence calls against the same reload handle are told apart by
//! the order in which they run. [`CallCounters`] hands out that order: the
//! first call for a handle gets index `0`, the next `1`, and so on until the
//! handle's entry is reset by its dispose callback.
//!
//! Entries are keyed by handle identity and hold the handle weakly, so the
//! registry never keeps a handle alive. Entries whose handle has been dropped
//! are pruned the next time a new entry is created.

use std::sync::{Arc, LazyLock, Weak};

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::hot::{HotApi, HotHandle, handle_addr};

static GLOBAL: LazyLock<CallCounters> = LazyLock::new(CallCounters::new);

/// Registry entry for one handle.
struct CounterEntry {
    /// Keeps the allocation address reserved without keeping the handle alive.
    handle: Weak<dyn HotApi>,
    next: usize,
}

impl CounterEntry {
    fn is_live(&self) -> bool {
        self.handle.strong_count() > 0
    }
}

/// Identity-keyed, non-owning call counters.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hot_persist_core::{CallCounters, DataBag, DisposeCallback, HotApi, HotHandle};
///
/// struct Inert;
///
/// impl HotApi for Inert {
///     fn data(&self) -> Option<DataBag> { None }
///     fn dispose(&self, _callback: DisposeCallback) {}
/// }
///
/// let counters = CallCounters::new();
/// let hot: HotHandle = Arc::new(Inert);
///
/// assert_eq!(counters.next(&hot), 0);
/// assert_eq!(counters.next(&hot), 1);
/// counters.reset(&hot);
/// assert_eq!(counters.next(&hot), 0);
/// ```
#[derive(Default)]
pub struct CallCounters {
    entries: Mutex<HashMap<usize, CounterEntry>>,
}

impl CallCounters {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry used by the persistence engine.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the current call index for `handle` and advances it.
    pub fn next(&self, handle: &HotHandle) -> usize {
        let addr = handle_addr(handle);
        let mut entries = self.entries.lock();

        if !entries.contains_key(&addr) {
            entries.retain(|_, entry| entry.is_live());
        }

        // The entry's weak reference pins the allocation, so no other live
        // handle can share this address while the entry exists.
        let entry = entries.entry(addr).or_insert_with(|| CounterEntry {
            handle: Arc::downgrade(handle),
            next: 0,
        });
        let index = entry.next;
        entry.next += 1;

        tracing::trace!(handle = addr, index, "allocated call index");
        index
    }

    /// Returns the index the next call for `handle` would get, without
    /// advancing it.
    #[must_use]
    pub fn peek(&self, handle: &HotHandle) -> usize {
        self.entries
            .lock()
            .get(&handle_addr(handle))
            .map_or(0, |entry| entry.next)
    }

    /// Removes the entry for `handle`; the next call index starts at `0`.
    pub fn reset(&self, handle: &HotHandle) {
        let addr = handle_addr(handle);
        if self.entries.lock().remove(&addr).is_some() {
            tracing::trace!(handle = addr, "reset call counter");
        }
    }

    /// Number of entries currently tracked, including entries whose handle
    /// has been dropped but not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if no entries are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Returns the current call index for `handle` in the global registry and
/// advances it.
pub fn get_call_counter(handle: &HotHandle) -> usize {
    CallCounters::global().next(handle)
}

/// Removes `handle`'s entry from the global registry.
pub fn reset_call_counter(handle: &HotHandle) {
    CallCounters::global().reset(handle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hot::{DataBag, DisposeCallback};

    struct Inert;

    impl HotApi for Inert {
        fn data(&self) -> Option<DataBag> {
            None
        }

        fn dispose(&self, _callback: DisposeCallback) {}
    }

    fn handle() -> HotHandle {
        Arc::new(Inert)
    }

    #[test]
    fn sets_and_resets_call_counter() {
        let counters = CallCounters::new();
        let hot = handle();

        counters.reset(&hot);
        let a = counters.next(&hot);
        let b = counters.next(&hot);
        counters.reset(&hot);
        let c = counters.next(&hot);
        let d = counters.next(&hot);

        assert_eq!((a, b, c, d), (0, 1, 0, 1));
    }

    #[test]
    fn tracks_handles_independently() {
        let counters = CallCounters::new();
        let hot1 = handle();
        let hot2 = handle();

        counters.reset(&hot1);
        counters.reset(&hot2);

        assert_eq!(counters.next(&hot1), 0);
        assert_eq!(counters.next(&hot2), 0);
        assert_eq!(counters.next(&hot1), 1);
        assert_eq!(counters.next(&hot2), 1);

        counters.reset(&hot1);

        assert_eq!(counters.next(&hot1), 0);
        assert_eq!(counters.next(&hot2), 2);
    }

    #[test]
    fn clones_of_a_handle_share_a_counter() {
        let counters = CallCounters::new();
        let hot = handle();
        let alias = Arc::clone(&hot);

        assert_eq!(counters.next(&hot), 0);
        assert_eq!(counters.next(&alias), 1);
    }

    #[test]
    fn peek_does_not_advance() {
        let counters = CallCounters::new();
        let hot = handle();
        assert_eq!(counters.peek(&hot), 0);
        assert!(counters.is_empty());

        counters.next(&hot);
        assert_eq!(counters.peek(&hot), 1);
        assert_eq!(counters.peek(&hot), 1);
        assert_eq!(counters.next(&hot), 1);
    }

    #[test]
    fn does_not_keep_handles_alive() {
        let counters = CallCounters::new();
        let hot = handle();
        counters.next(&hot);

        let weak = Arc::downgrade(&hot);
        drop(hot);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn prunes_dropped_handles() {
        let counters = CallCounters::new();
        for _ in 0..8 {
            let hot = handle();
            counters.next(&hot);
        }

        let survivor = handle();
        counters.next(&survivor);

        assert_eq!(counters.len(), 1);
    }

    #[test]
    fn global_registry_round_trip() {
        let hot = handle();
        assert_eq!(get_call_counter(&hot), 0);
        assert_eq!(get_call_counter(&hot), 1);
        reset_call_counter(&hot);
        assert_eq!(get_call_counter(&hot), 0);
        reset_call_counter(&hot);
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_indices_are_sequential(calls in 1_usize..64) {
                let counters = CallCounters::new();
                let hot = handle();
                let indices: Vec<usize> = (0..calls).map(|_| counters.next(&hot)).collect();
                prop_assert_eq!(indices, (0..calls).collect::<Vec<_>>());
            }
        }
    }
}
