//! Per-record exclusive locks held across a transaction's check-then-commit window

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::{
    error::{AppError, AppResult},
    models::{HolderId, ItemId},
};

type LockTable = HashMap<LockKey, Arc<AsyncMutex<()>>>;

/// Lockable record. The derived ordering (holders before items, then by id)
/// is the global acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockKey {
    Holder(HolderId),
    Item(ItemId),
}

/// Guards for a set of records, released on drop
#[derive(Debug)]
pub struct LockSet {
    _guards: Vec<OwnedMutexGuard<()>>,
}

#[cfg(test)]
impl LockSet {
    fn len(&self) -> usize {
        self._guards.len()
    }
}

#[derive(Clone, Default)]
pub struct RecordLocks {
    table: Arc<Mutex<LockTable>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every key, one at a time in `LockKey` order, whatever order they are given in
    pub async fn acquire(&self, keys: impl IntoIterator<Item = LockKey>) -> AppResult<LockSet> {
        let ordered: BTreeSet<LockKey> = keys.into_iter().collect();
        let mut guards = Vec::with_capacity(ordered.len());
        for key in ordered {
            let mutex = self.entry(key)?;
            guards.push(mutex.lock_owned().await);
        }
        Ok(LockSet { _guards: guards })
    }

    /// Number of records currently tracked (held or awaited)
    #[cfg(test)]
    fn tracked(&self) -> AppResult<usize> {
        let mut table = self.lock_table()?;
        Self::prune(&mut table);
        Ok(table.len())
    }

    fn entry(&self, key: LockKey) -> AppResult<Arc<AsyncMutex<()>>> {
        let mut table = self.lock_table()?;
        Self::prune(&mut table);
        Ok(Arc::clone(table.entry(key).or_default()))
    }

    // An entry only referenced by the table is neither held nor awaited
    fn prune(table: &mut LockTable) {
        table.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    fn lock_table(&self) -> AppResult<MutexGuard<'_, LockTable>> {
        self.table
            .lock()
            .map_err(|_| AppError::Internal("lock table poisoned".to_string()))
    }
}
