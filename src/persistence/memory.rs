//! In-process storage origin
//!
//! A [`MemoryOrigin`] is one shared key-value store (think: one browser
//! profile). Any number of [`MemoryContext`]s (think: tabs) open on it; a
//! write through one context is delivered to the listeners of every other
//! context, never to its own.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use super::{ContextId, Listener, ListenerSet, Persistence, StorageEvent, Subscription};

#[derive(Default)]
struct OriginInner {
    entries: Mutex<HashMap<String, String>>,
    listeners: Arc<ListenerSet>,
    next_context: AtomicU64,
}

/// Shared in-memory storage
#[derive(Clone, Default)]
pub struct MemoryOrigin {
    inner: Arc<OriginInner>,
}

impl MemoryOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new context on this origin
    pub fn context(&self) -> MemoryContext {
        let id = self.inner.next_context.fetch_add(1, Ordering::Relaxed);
        debug!(context = id, "opened storage context");
        MemoryContext {
            id,
            origin: self.clone(),
        }
    }

    /// Current raw value for `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    /// Store a raw value without notifying anyone (pre-populating storage
    /// before any context loads from it)
    pub fn seed(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    /// Store a raw value as an outside agent: every context is notified
    pub fn write_external(&self, key: &str, value: &str) {
        self.write(None, key, value);
    }

    /// Remove a key as an outside agent: every context is notified
    pub fn remove_external(&self, key: &str) {
        self.entries().remove(key);
        self.inner.listeners.notify(
            None,
            &StorageEvent {
                key: key.to_string(),
                new_value: None,
            },
        );
    }

    /// Number of live listeners across all contexts
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    fn write(&self, writer: Option<ContextId>, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
        self.inner.listeners.notify(
            writer,
            &StorageEvent {
                key: key.to_string(),
                new_value: Some(value.to_string()),
            },
        );
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.inner.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One context on a [`MemoryOrigin`]
pub struct MemoryContext {
    id: ContextId,
    origin: MemoryOrigin,
}

impl Persistence for MemoryContext {
    fn read_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.origin.get(key))
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<()> {
        self.origin.write(Some(self.id), key, value);
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.origin.inner.listeners.add(self.id, listener)
    }
}
