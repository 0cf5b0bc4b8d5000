//! Process-wide locale preference

use super::preferences::{PreferenceStore, StorageChange};
use super::{Direction, Locale};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Preference key the locale is stored under
pub const LOCALE_KEY: &str = "language";

type Listener = Arc<dyn Fn(Locale) + Send + Sync>;

/// Handle returned by [`LocaleStore::on_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Current locale plus its observers.
///
/// Create one per client instance and share it by `Arc`. Several stores
/// backed by the same [`PreferenceStore`] converge on the last value
/// written by any of them.
pub struct LocaleStore {
    instance_id: String,
    current: RwLock<Locale>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener_id: AtomicU64,
    prefs: Arc<dyn PreferenceStore>,
}

impl LocaleStore {
    /// Load the stored locale, falling back to the default when nothing
    /// valid is stored.
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Arc<Self> {
        let stored = prefs.get(LOCALE_KEY);
        let current = stored
            .as_deref()
            .and_then(Locale::parse)
            .unwrap_or_default();

        if let Some(value) = stored.filter(|v| Locale::parse(v).is_none()) {
            tracing::debug!(value = %value, "Ignoring invalid stored locale");
        }

        Arc::new(Self {
            instance_id: uuid::Uuid::new_v4().to_string(),
            current: RwLock::new(current),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(0),
            prefs,
        })
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn get(&self) -> Locale {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn direction(&self) -> Direction {
        self.get().direction()
    }

    /// Persist, apply, and notify local listeners before returning.
    ///
    /// Other instances sharing the preference store are notified through
    /// the store's change channel. A persistence failure is logged; the
    /// in-memory value still changes so the display stays consistent with
    /// what the user picked.
    pub fn set(&self, locale: Locale) {
        if let Err(e) = self.prefs.set(&self.instance_id, LOCALE_KEY, locale.code()) {
            tracing::warn!(locale = %locale, error = %e, "Failed to persist locale");
        }
        self.apply(locale);
    }

    /// Set from an untrusted string. Returns false, leaving the locale
    /// unchanged, if the value is not a known locale code.
    pub fn set_raw(&self, value: &str) -> bool {
        match Locale::parse(value) {
            Some(locale) => {
                self.set(locale);
                true
            }
            None => {
                tracing::debug!(value = %value, "Ignoring invalid locale");
                false
            }
        }
    }

    pub fn on_change(&self, listener: impl Fn(Locale) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// React to a change written by another instance. The event is only a
    /// signal: the value applied is the one currently stored, so instances
    /// converge on the last write even when events arrive out of order.
    /// Changes this instance wrote itself, changes to other keys, and an
    /// invalid stored value are ignored. Returns whether the locale changed.
    pub fn apply_storage_change(&self, change: &StorageChange) -> bool {
        if change.origin == self.instance_id || change.key != LOCALE_KEY {
            return false;
        }
        self.resync()
    }

    /// Follow changes made by other instances until the store is dropped
    /// or the preference channel closes.
    pub fn spawn_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.prefs.subscribe();
        let weak: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) => {
                        let Some(store) = weak.upgrade() else { break };
                        store.apply_storage_change(&change);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Re-read the stored value so we still converge
                        tracing::debug!(skipped, "Locale sync lagged");
                        let Some(store) = weak.upgrade() else { break };
                        store.resync();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Adopt the stored value if it is valid and differs from the current one
    fn resync(&self) -> bool {
        let stored = self.prefs.get(LOCALE_KEY);
        match stored.as_deref().map(|v| (v, Locale::parse(v))) {
            Some((_, Some(locale))) if locale != self.get() => {
                self.apply(locale);
                true
            }
            Some((value, None)) => {
                tracing::debug!(value = %value, "Ignoring invalid stored locale");
                false
            }
            _ => false,
        }
    }

    fn apply(&self, locale: Locale) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = locale;

        // Call listeners outside the lock so they may read the store
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(locale);
        }
    }
}
