//! Repository layer: storage accessors used by the loan transactions
//!
//! The transactions only see the traits below, so the same engine runs against
//! Postgres in production and against [`memory::MemoryStore`] in tests.

pub mod holders;
pub mod items;
pub mod loans;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Holder, HolderId, Item, ItemId, LoanBatch},
};

/// Read/write access to single items
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryAccessor: Send + Sync {
    async fn get_item(&self, id: ItemId) -> AppResult<Option<Item>>;

    /// Insert or update catalog fields. Never writes `on_loan_count`; new items
    /// start with no copy on loan.
    async fn save_item(&self, item: &Item) -> AppResult<Item>;

    /// Add `delta` to `on_loan_count`. A positive delta is applied only if the
    /// result stays within `total_copies`; a negative one is floored at zero.
    /// Returns `false` when rejected or when the item does not exist.
    async fn conditional_increment(&self, id: ItemId, delta: i32) -> AppResult<bool>;
}

/// Read/write access to single holders
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HolderAccessor: Send + Sync {
    async fn get_holder(&self, id: HolderId) -> AppResult<Option<Holder>>;

    /// Insert or update account fields. Never writes `loans`; new holders start
    /// with no loans.
    async fn save_holder(&self, holder: &Holder) -> AppResult<Holder>;

    /// Delete the holder if it has no loans. Returns `false` when it still holds items.
    async fn delete_holder_if_idle(&self, id: HolderId) -> AppResult<bool>;
}

/// Atomic commit of a whole borrow or return
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanLedger: Send + Sync {
    /// Apply every delta and the new loan set, or nothing.
    ///
    /// Fails with `ConcurrentModification` when the holder's loans differ from
    /// `batch.expected_loans` or a positive delta would exceed `total_copies`.
    /// Returns the `updated_at` stored on the holder.
    async fn commit(&self, batch: &LoanBatch) -> AppResult<DateTime<Utc>>;

    /// Check that storage is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Storage accessors shared by all services
#[derive(Clone)]
pub struct Repository {
    pub items: Arc<dyn InventoryAccessor>,
    pub holders: Arc<dyn HolderAccessor>,
    pub loans: Arc<dyn LoanLedger>,
}

impl Repository {
    /// Create a Postgres-backed repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            items: Arc::new(items::ItemsRepository::new(pool.clone())),
            holders: Arc::new(holders::HoldersRepository::new(pool.clone())),
            loans: Arc::new(loans::LoansRepository::new(pool)),
        }
    }

    /// Create a repository backed by one in-memory store
    pub fn in_memory(store: Arc<memory::MemoryStore>) -> Self {
        Self {
            items: store.clone(),
            holders: store.clone(),
            loans: store,
        }
    }
}
