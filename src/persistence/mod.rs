//! Persistence adapter
//!
//! Durable storage of the store's slices under independent keys, plus
//! change notifications from *other* contexts sharing the same storage
//! (another process on the same data dir, another in-process context on the
//! same [`MemoryOrigin`]). A context never hears about its own writes.
//!
//! Backends implement the raw string interface of [`Persistence`]; typed
//! access comes from the [`SliceStore`] extension trait so the
//! fallback-on-corruption policy is defined once for all of them.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::{debug, error, warn};

use crate::constants::keys;
use crate::merge;

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::{MemoryContext, MemoryOrigin};

/// The independently persisted pieces of store state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Sections,
    Theme,
    Global,
}

impl Slice {
    pub const ALL: [Slice; 3] = [Slice::Sections, Slice::Theme, Slice::Global];

    /// Storage key for this slice
    pub fn key(&self) -> &'static str {
        match self {
            Slice::Sections => keys::SECTIONS,
            Slice::Theme => keys::THEME,
            Slice::Global => keys::GLOBAL,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Slice::ALL.into_iter().find(|slice| slice.key() == key)
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A change made by another context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// Raw new value; `None` when the key was removed
    pub new_value: Option<String>,
}

/// Callback invoked for every [`StorageEvent`] delivered to a subscriber
pub type Listener = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

/// Raw key-value storage with cross-context change notification
pub trait Persistence: Send + Sync {
    /// Stored string for `key`, `None` if absent
    fn read_raw(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`. Visible to a subsequent `read_raw` on
    /// return; other contexts are notified, this one is not.
    fn write_raw(&self, key: &str, value: &str) -> Result<()>;

    /// Register a listener for changes made by other contexts
    fn subscribe(&self, listener: Listener) -> Subscription;
}

/// Typed slice access on top of any [`Persistence`] backend
pub trait SliceStore {
    /// Read and heal a slice.
    ///
    /// Missing key, unreadable storage, malformed JSON or a shape that
    /// cannot be healed all yield `default`; this never fails.
    fn read_slice<T>(&self, slice: Slice, default: &T) -> T
    where
        T: Serialize + DeserializeOwned + Clone;

    /// Serialize and store a whole slice. Failures are logged, not returned.
    fn write_slice<T: Serialize>(&self, slice: Slice, value: &T);
}

impl<P: Persistence + ?Sized> SliceStore for P {
    fn read_slice<T>(&self, slice: Slice, default: &T) -> T
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        let raw = match self.read_raw(slice.key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(slice = %slice, "slice not stored yet, using defaults");
                return default.clone();
            }
            Err(e) => {
                warn!(slice = %slice, error = ?e, "failed to read slice, using defaults");
                return default.clone();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => merge::merge_with_defaults(default, value),
            Err(e) => {
                warn!(slice = %slice, error = %e, "stored slice is not valid JSON, using defaults");
                default.clone()
            }
        }
    }

    fn write_slice<T: Serialize>(&self, slice: Slice, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                error!(slice = %slice, error = %e, "failed to serialize slice");
                return;
            }
        };
        if let Err(e) = self.write_raw(slice.key(), &json) {
            error!(slice = %slice, error = ?e, "failed to persist slice");
        }
    }
}

/// Handle for a registered listener; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Identifies which context registered a listener / performed a write
pub(crate) type ContextId = u64;

struct ListenerEntry {
    id: u64,
    context: ContextId,
    listener: Listener,
}

/// Listener registry shared by the backends
#[derive(Default)]
pub(crate) struct ListenerSet {
    next_id: AtomicU64,
    entries: Mutex<Vec<ListenerEntry>>,
}

impl ListenerSet {
    pub(crate) fn add(self: &Arc<Self>, context: ContextId, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push(ListenerEntry {
            id,
            context,
            listener,
        });

        let weak: Weak<Self> = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(set) = weak.upgrade() {
                set.lock().retain(|entry| entry.id != id);
            }
        })
    }

    /// Deliver `event` to every listener not registered by `writer`.
    ///
    /// Listeners are collected first and invoked with the registry unlocked,
    /// so a listener may subscribe or unsubscribe without deadlocking.
    pub(crate) fn notify(&self, writer: Option<ContextId>, event: &StorageEvent) {
        let targets: Vec<Listener> = self
            .lock()
            .iter()
            .filter(|entry| Some(entry.context) != writer)
            .map(|entry| Arc::clone(&entry.listener))
            .collect();

        debug!(key = %event.key, listeners = targets.len(), "dispatching storage event");
        for listener in targets {
            listener(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ListenerEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{GlobalConfig, Section};
    use crate::defaults;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_slice_keys_round_trip() {
        for slice in Slice::ALL {
            assert_eq!(Slice::from_key(slice.key()), Some(slice));
        }
        assert_eq!(Slice::Sections.key(), "portfolio_sections");
        assert_eq!(Slice::from_key("portfolio_css"), None);
    }

    #[test]
    fn test_read_slice_missing_uses_default() {
        let origin = MemoryOrigin::new();
        let ctx = origin.context();
        let sections: Vec<Section> = ctx.read_slice(Slice::Sections, &defaults::sections());
        assert_eq!(sections, defaults::sections());
    }

    #[test]
    fn test_read_slice_corrupt_uses_default() {
        let origin = MemoryOrigin::new();
        origin.seed(Slice::Sections.key(), "{not json");
        let ctx = origin.context();
        let sections: Vec<Section> = ctx.read_slice(Slice::Sections, &defaults::sections());
        assert_eq!(sections, defaults::sections());
    }

    #[test]
    fn test_read_slice_wrong_shape_uses_default() {
        let origin = MemoryOrigin::new();
        origin.seed(Slice::Sections.key(), r#"{"hero": true}"#);
        origin.seed(Slice::Global.key(), "[1, 2, 3]");
        let ctx = origin.context();

        let sections: Vec<Section> = ctx.read_slice(Slice::Sections, &defaults::sections());
        assert_eq!(sections, defaults::sections());
        let global: GlobalConfig = ctx.read_slice(Slice::Global, &defaults::global_config());
        assert_eq!(global, defaults::global_config());
    }

    #[test]
    fn test_write_then_read_same_context() {
        let origin = MemoryOrigin::new();
        let ctx = origin.context();
        let mut sections = defaults::sections();
        sections.truncate(2);
        ctx.write_slice(Slice::Sections, &sections);

        let back: Vec<Section> = ctx.read_slice(Slice::Sections, &defaults::sections());
        assert_eq!(back, sections);
    }

    #[test]
    fn test_subscription_drop_unsubscribes() {
        let set = Arc::new(ListenerSet::default());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let sub = set.add(
            1,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let event = StorageEvent {
            key: "k".to_string(),
            new_value: Some("v".to_string()),
        };

        set.notify(Some(2), &event);
        set.notify(Some(1), &event);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(sub);
        assert_eq!(set.len(), 0);
        set.notify(None, &event);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let set = Arc::new(ListenerSet::default());
        let sub = set.add(1, Arc::new(|_| {}));
        assert_eq!(set.len(), 1);
        sub.unsubscribe();
        assert_eq!(set.len(), 0);
    }
}
