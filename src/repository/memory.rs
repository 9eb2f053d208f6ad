//! In-memory store implementing every accessor
//!
//! One `RwLock` guards items and holders together, so a batch commit is applied
//! under a single write guard and readers never observe half of it.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{Holder, HolderId, Item, ItemId, LoanBatch},
};

use super::{HolderAccessor, InventoryAccessor, LoanLedger};

#[derive(Debug, Default)]
struct MemoryState {
    items: BTreeMap<ItemId, Item>,
    holders: BTreeMap<HolderId, Holder>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

/// Items and holders to preload, as found in a JSON fixture
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub items: Vec<SeedItem>,
    #[serde(default)]
    pub holders: Vec<SeedHolder>,
}

#[derive(Debug, Deserialize)]
pub struct SeedItem {
    pub id: ItemId,
    pub title: String,
    pub total_copies: i32,
}

#[derive(Debug, Deserialize)]
pub struct SeedHolder {
    pub id: HolderId,
    pub full_name: String,
    pub email: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save every seeded record; items start with no copy on loan, holders with no loans
    pub async fn load_seed(&self, seed: Seed) -> AppResult<()> {
        for item in seed.items {
            self.save_item(&Item::new(item.id, item.title, item.total_copies))
                .await?;
        }
        for holder in seed.holders {
            self.save_holder(&Holder::new(holder.id, holder.full_name, holder.email))
                .await?;
        }
        Ok(())
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl InventoryAccessor for MemoryStore {
    async fn get_item(&self, id: ItemId) -> AppResult<Option<Item>> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    async fn save_item(&self, item: &Item) -> AppResult<Item> {
        if item.total_copies < 0 {
            return Err(AppError::Validation("total_copies must not be negative".to_string()));
        }

        let mut state = self.write()?;
        let on_loan_count = state.items.get(&item.id).map_or(0, |i| i.on_loan_count);
        if on_loan_count > item.total_copies {
            return Err(AppError::Validation(format!(
                "Item {} has more copies on loan than {}",
                item.id, item.total_copies
            )));
        }

        let saved = Item {
            on_loan_count,
            updated_at: Some(Utc::now()),
            ..item.clone()
        };
        state.items.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn conditional_increment(&self, id: ItemId, delta: i32) -> AppResult<bool> {
        let mut state = self.write()?;
        let Some(item) = state.items.get_mut(&id) else {
            return Ok(false);
        };

        match item.shifted_on_loan(delta) {
            Some(next) => {
                item.on_loan_count = next;
                item.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl HolderAccessor for MemoryStore {
    async fn get_holder(&self, id: HolderId) -> AppResult<Option<Holder>> {
        Ok(self.read()?.holders.get(&id).cloned())
    }

    async fn save_holder(&self, holder: &Holder) -> AppResult<Holder> {
        let mut state = self.write()?;
        let loans = state
            .holders
            .get(&holder.id)
            .map(|h| h.loans.clone())
            .unwrap_or_default();

        let saved = Holder {
            loans,
            updated_at: Some(Utc::now()),
            ..holder.clone()
        };
        state.holders.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete_holder_if_idle(&self, id: HolderId) -> AppResult<bool> {
        let mut state = self.write()?;
        let idle = state.holders.get(&id).is_some_and(|h| h.loans.is_empty());
        if idle {
            state.holders.remove(&id);
        }
        Ok(idle)
    }
}

#[async_trait]
impl LoanLedger for MemoryStore {
    async fn commit(&self, batch: &LoanBatch) -> AppResult<DateTime<Utc>> {
        let mut state = self.write()?;

        let holder = state.holders.get(&batch.holder_id).ok_or_else(|| {
            AppError::ConcurrentModification(format!("holder {} no longer exists", batch.holder_id))
        })?;
        if holder.loans != batch.expected_loans {
            return Err(AppError::ConcurrentModification(format!(
                "loans of holder {} changed during the transaction",
                batch.holder_id
            )));
        }

        // Compute every new counter before touching anything
        let mut counters = Vec::with_capacity(batch.deltas.len());
        for delta in &batch.deltas {
            let next = state
                .items
                .get(&delta.item_id)
                .and_then(|item| item.shifted_on_loan(delta.delta));
            let next = next.ok_or_else(|| {
                AppError::ConcurrentModification(format!(
                    "conditional update of item {} was rejected",
                    delta.item_id
                ))
            })?;
            counters.push((delta.item_id, next));
        }

        let now = Utc::now();
        for (item_id, next) in counters {
            if let Some(item) = state.items.get_mut(&item_id) {
                item.on_loan_count = next;
                item.updated_at = Some(now);
            }
        }
        if let Some(holder) = state.holders.get_mut(&batch.holder_id) {
            holder.loans = batch.loans.clone();
            holder.updated_at = Some(now);
        }

        Ok(now)
    }

    async fn ping(&self) -> AppResult<()> {
        self.read().map(|_| ())
    }
}
