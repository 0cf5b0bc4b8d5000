//! Key-value preference storage with change notification
//!
//! A preference store is shared by every open instance of the client. Each
//! write is published on a broadcast channel tagged with the writer's
//! instance id, which is how other instances learn about it. The file
//! store also publishes writes made by other processes.

use std::collections::HashMap;
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A write observed by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// Instance id of the writer
    pub origin: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preferences I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preferences encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Persist a value and publish the change
    fn set(&self, origin: &str, key: &str, value: &str) -> Result<(), PreferenceError>;

    /// Receive every change written after this call
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

/// Process-local store. Instances sharing one `Arc<MemoryPreferences>`
/// behave like windows sharing browser storage.
pub struct MemoryPreferences {
    values: RwLock<HashMap<String, String>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Write a value without going through a locale store, as another
    /// application sharing the storage might.
    pub fn inject(&self, origin: &str, key: &str, value: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        publish(&self.changes, origin, key, value);
    }
}

impl Default for MemoryPreferences {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, origin: &str, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.inject(origin, key, value);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}

/// Origin tag for changes written by another process
pub const EXTERNAL_ORIGIN: &str = "external";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// JSON file store. The whole map is rewritten on every set via a
/// temporary file and rename, so readers never see a partial file.
///
/// Once subscribed from inside a tokio runtime, the file is polled so that
/// writes by other processes are picked up and published with
/// [`EXTERNAL_ORIGIN`].
pub struct FilePreferences {
    shared: Arc<FileShared>,
    poll_interval: Duration,
    watching: AtomicBool,
}

struct FileShared {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
    changes: broadcast::Sender<StorageChange>,
    /// Modification stamp of the file as last read or written by us
    stamp: Mutex<Option<FileStamp>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok()?,
            len: meta.len(),
        })
    }
}

impl FilePreferences {
    /// Open a preference file. A missing file starts empty; an unreadable
    /// one is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match load(&path) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable preferences");
                HashMap::new()
            }
        };
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let stamp = FileStamp::of(&path);

        Self {
            shared: Arc::new(FileShared {
                path,
                values: RwLock::new(values),
                changes,
                stamp: Mutex::new(stamp),
            }),
            poll_interval: DEFAULT_POLL_INTERVAL,
            watching: AtomicBool::new(false),
        }
    }

    /// How often the file is checked for writes by other processes
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Start polling once; the task stops when the store is dropped
    fn watch(&self) {
        if self.watching.swap(true, Ordering::SeqCst) {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime; external preference changes will not be seen");
            self.watching.store(false, Ordering::SeqCst);
            return;
        };

        let weak: Weak<FileShared> = Arc::downgrade(&self.shared);
        let period = self.poll_interval;
        handle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(shared) = weak.upgrade() else { break };
                shared.reload_if_changed();
            }
        });
    }
}

impl FileShared {
    /// Re-read the file if another process replaced it and publish every
    /// value that differs from what we hold.
    fn reload_if_changed(&self) {
        // Held across the read so a concurrent local set cannot interleave
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let mut stamp = self.stamp.lock().unwrap_or_else(PoisonError::into_inner);

        let current = FileStamp::of(&self.path);
        if current.is_none() || current == *stamp {
            return;
        }
        *stamp = current;

        let on_disk = match load(&self.path) {
            Ok(on_disk) => on_disk,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "Skipping unreadable preferences");
                return;
            }
        };

        for (key, value) in on_disk {
            if values.get(&key) != Some(&value) {
                tracing::debug!(key = %key, value = %value, "External preference change");
                publish(&self.changes, EXTERNAL_ORIGIN, &key, &value);
                values.insert(key, value);
            }
        }
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(values)?;
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        *self.stamp.lock().unwrap_or_else(PoisonError::into_inner) = FileStamp::of(&self.path);
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.shared
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, origin: &str, key: &str, value: &str) -> Result<(), PreferenceError> {
        {
            let mut values = self
                .shared
                .values
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            values.insert(key.to_string(), value.to_string());
            self.shared.save(&values)?;
        }
        publish(&self.shared.changes, origin, key, value);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        let rx = self.shared.changes.subscribe();
        self.watch();
        rx
    }
}

fn load(path: &Path) -> Result<HashMap<String, String>, PreferenceError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn publish(changes: &broadcast::Sender<StorageChange>, origin: &str, key: &str, value: &str) {
    // No subscribers is fine
    let _ = changes.send(StorageChange {
        origin: origin.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    });
}
