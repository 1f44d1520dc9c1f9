//! File-system storage: one JSON file per key in a data directory
//!
//! Writes go to a temp file that is renamed over the slice file, so readers
//! never observe a half-written slice. With [`FileStorage::watch`] enabled,
//! changes made by other processes on the same directory are turned into
//! [`StorageEvent`]s; this handle's own writes are recognised and not echoed.

use anyhow::{Context, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use super::{ContextId, Listener, ListenerSet, Persistence, StorageEvent, Subscription};
use crate::constants::paths;

/// Every listener on a file handle belongs to the same local context
const LOCAL_CONTEXT: ContextId = 0;

type WriteLog = Arc<Mutex<HashMap<String, String>>>;

/// Directory-backed storage
pub struct FileStorage {
    dir: PathBuf,
    listeners: Arc<ListenerSet>,
    /// Last value this handle wrote per key, not yet seen by the watcher
    own_writes: WriteLog,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl FileStorage {
    /// Platform data directory for the application
    pub fn default_dir() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(paths::APP_DIR);
        path
    }

    /// Open (creating if needed) storage rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory {}", dir.display()))?;
        info!(path = %dir.display(), "opened file storage");

        Ok(Self {
            dir,
            listeners: Arc::new(ListenerSet::default()),
            own_writes: Arc::new(Mutex::new(HashMap::new())),
            watcher: Mutex::new(None),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the value for `key`
    pub fn slice_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{}", paths::SLICE_EXTENSION))
    }

    /// Start delivering changes made by other processes to subscribers.
    ///
    /// Idempotent; the watcher lives as long as this handle.
    pub fn watch(&self) -> Result<()> {
        let mut slot = self.watcher.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Ok(());
        }

        // notify callbacks are sync; bridge them to a dispatch thread
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        })
        .context("Failed to create file watcher")?;
        watcher
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", self.dir.display()))?;

        let mut dispatcher = Dispatcher {
            dir: self.dir.clone(),
            listeners: Arc::clone(&self.listeners),
            own_writes: Arc::clone(&self.own_writes),
            last_seen: HashMap::new(),
        };
        dispatcher.prime();

        std::thread::Builder::new()
            .name("storage-watch".to_string())
            .spawn(move || dispatcher.run(rx))
            .context("Failed to spawn storage watch thread")?;

        info!(path = %self.dir.display(), "watching storage for external changes");
        *slot = Some(watcher);
        Ok(())
    }
}

impl Persistence for FileStorage {
    fn read_raw(&self, key: &str) -> Result<Option<String>> {
        let path = self.slice_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slice_path(key);
        let tmp = path.with_extension(format!("{}.{}", paths::SLICE_EXTENSION, paths::TEMP_SUFFIX));

        // Record before touching disk so the watcher can recognise the echo
        self.own_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());

        fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move {} into place", path.display()))?;

        debug!(key = %key, bytes = value.len(), "wrote slice file");
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.listeners.add(LOCAL_CONTEXT, listener)
    }
}

/// Turns raw notify events into storage events on the watch thread
struct Dispatcher {
    dir: PathBuf,
    listeners: Arc<ListenerSet>,
    own_writes: WriteLog,
    /// Last value delivered (or found at startup) per key
    last_seen: HashMap<String, Option<String>>,
}

impl Dispatcher {
    /// Record what is on disk now so unchanged files don't produce events
    fn prime(&mut self) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(key) = key_for_path(&self.dir, &path) {
                let current = fs::read_to_string(&path).ok();
                self.last_seen.insert(key, current);
            }
        }
    }

    fn run(mut self, rx: mpsc::Receiver<notify::Result<notify::Event>>) {
        // Ends when the watcher (and with it the sender) is dropped
        while let Ok(result) = rx.recv() {
            match result {
                Ok(event) => self.handle(event),
                Err(e) => warn!(error = %e, "file watcher error"),
            }
        }
        debug!(path = %self.dir.display(), "storage watch thread exiting");
    }

    fn handle(&mut self, event: notify::Event) {
        if matches!(event.kind, EventKind::Access(_)) {
            return;
        }

        for path in &event.paths {
            let Some(key) = key_for_path(&self.dir, path) else {
                continue;
            };

            let new_value = match fs::read_to_string(path) {
                Ok(contents) => Some(contents),
                Err(e) if e.kind() == ErrorKind::NotFound => None,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read changed slice file");
                    continue;
                }
            };

            if self.last_seen.get(&key) == Some(&new_value) {
                continue;
            }
            self.last_seen.insert(key.clone(), new_value.clone());

            // A recorded write is matched at most once: after its echo, or
            // after another process has replaced it, the entry is stale
            let is_echo = {
                let mut own = self.own_writes.lock().unwrap_or_else(PoisonError::into_inner);
                let written = own.remove(&key);
                new_value.is_some() && written == new_value
            };
            if is_echo {
                debug!(key = %key, "ignoring echo of own write");
                continue;
            }

            info!(key = %key, removed = new_value.is_none(), "external change detected");
            self.listeners.notify(None, &StorageEvent { key, new_value });
        }
    }
}

/// Storage key for a slice file directly inside `dir`
fn key_for_path(dir: &Path, path: &Path) -> Option<String> {
    if path.parent() != Some(dir) {
        return None;
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some(paths::SLICE_EXTENSION) {
        return None;
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}
