//! Per-key gates that let only one caller at a time compute a missing entry

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};

#[derive(Debug, Default)]
pub(crate) struct InflightGate {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl InflightGate {
    /// Join (or open) the slot for `key`
    pub(crate) fn slot(&self, key: &str) -> InflightSlot<'_> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let lock = slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();

        InflightSlot {
            gate: self,
            key: key.to_string(),
            lock,
        }
    }

    #[cfg(test)]
    pub(crate) fn open_slots(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }
}

pub(crate) struct InflightSlot<'a> {
    gate: &'a InflightGate,
    key: String,
    lock: Arc<AsyncMutex<()>>,
}

impl InflightSlot<'_> {
    pub(crate) async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl Drop for InflightSlot<'_> {
    fn drop(&mut self) {
        let mut slots = self.gate.slots.lock().unwrap_or_else(|e| e.into_inner());
        // Only the map and this slot still hold the lock: nobody is waiting
        let idle = slots
            .get(&self.key)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2);
        if idle {
            slots.remove(&self.key);
        }
    }
}
