// Single-flight lazy slot.
// Holds a value loaded on first access; concurrent first readers wait on one load.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

/// A lazily populated value with at-most-one in-flight load.
///
/// The mutex doubles as the pending-load marker: the first reader holds it
/// across the load, later readers queue on it and observe the stored value.
/// A failed load stores nothing, so the next reader retries.
#[derive(Debug)]
pub struct Lazy<T> {
    slot: Mutex<Option<T>>,
    /// Number of successful loads, bumped once per cache generation.
    loads: AtomicU64,
}

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Lazy<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            loads: AtomicU64::new(0),
        }
    }

    /// A slot that starts out populated.
    pub fn with_value(value: T) -> Self {
        Self {
            slot: Mutex::new(Some(value)),
            loads: AtomicU64::new(0),
        }
    }

    /// Return the cached value, running `load` first if the slot is empty.
    pub async fn get_or_try_load<E, F, Fut>(&self, load: F) -> Result<MappedMutexGuard<'_, T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut guard = self.slot.lock().await;
        if guard.is_none() {
            *guard = Some(load().await?);
            self.loads.fetch_add(1, Ordering::Relaxed);
        }

        Ok(MutexGuard::map(guard, |slot| match slot {
            Some(value) => value,
            None => unreachable!("lazy slot populated before mapping"),
        }))
    }

    /// Drop the cached value, re-arming the lazy load.
    pub async fn clear(&self) -> Option<T> {
        self.slot.lock().await.take()
    }

    /// Whether a value is currently cached.
    pub async fn is_loaded(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// Count of loads that populated the slot.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}
