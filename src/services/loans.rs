//! Loan transactions: borrowing and returning items as atomic batches
//!
//! Every transaction locks its records (see [`lock_order`]), re-reads the
//! holder and items inside that critical section, validates the whole request,
//! and hands one [`LoanBatch`] to the ledger. Nothing is written before all
//! checks pass, and the ledger applies the batch as a single unit.

use std::collections::BTreeSet;
use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{Holder, HolderId, Item, ItemId, LoanBatch},
    repository::Repository,
};

use super::locks::{LockKey, RecordLocks};
use super::policy::{admit, ensure_within_limit, lock_order, returnable, LoanPolicy, MAX_LOANS};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    locks: RecordLocks,
    policy: LoanPolicy,
}

impl LoansService {
    pub fn new(repository: Repository, policy: LoanPolicy) -> Self {
        Self {
            repository,
            locks: RecordLocks::new(),
            policy,
        }
    }

    /// Get a holder snapshot
    pub async fn get_holder(&self, holder_id: HolderId) -> AppResult<Holder> {
        self.load_holder(holder_id).await
    }

    /// Get an item snapshot
    pub async fn get_item(&self, item_id: ItemId) -> AppResult<Item> {
        self.load_item(item_id).await
    }

    /// Check that storage answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.loans.ping().await
    }

    /// Borrow one copy of each requested item, in request order, or nothing at all
    pub async fn borrow(&self, holder_id: HolderId, items: Vec<ItemId>) -> AppResult<Holder> {
        let service = self.clone();
        detached(async move {
            service
                .with_conflict_retry("borrow", || service.try_borrow(holder_id, &items))
                .await
        })
        .await
    }

    /// Return items held by the holder
    pub async fn return_items(
        &self,
        holder_id: HolderId,
        items: BTreeSet<ItemId>,
    ) -> AppResult<Holder> {
        let service = self.clone();
        detached(async move {
            service
                .with_conflict_retry("return", || service.try_return(holder_id, &items))
                .await
        })
        .await
    }

    /// Delete a holder that has nothing left to return
    pub async fn delete_holder(&self, holder_id: HolderId) -> AppResult<Holder> {
        let service = self.clone();
        detached(async move { service.try_delete_holder(holder_id).await }).await
    }

    #[tracing::instrument(skip(self))]
    async fn try_borrow(&self, holder_id: HolderId, items: &[ItemId]) -> AppResult<Holder> {
        let _locks = self.locks.acquire(lock_order(holder_id, items)).await?;

        let holder = self.load_holder(holder_id).await?;
        ensure_within_limit(&holder, items.len(), MAX_LOANS)?;

        let mut selected = BTreeSet::new();
        for &item_id in items {
            let item = self.load_item(item_id).await?;
            admit(&holder, &selected, &item)?;
            selected.insert(item_id);
        }

        if selected.is_empty() {
            return Ok(holder);
        }

        let batch = LoanBatch::borrow(&holder, &selected);
        let committed_at = self.repository.loans.commit(&batch).await?;

        tracing::info!(
            "Holder {} borrowed {:?} ({} loan(s) now)",
            holder_id,
            selected,
            batch.loans.len()
        );

        Ok(with_loans(holder, batch, committed_at))
    }

    #[tracing::instrument(skip(self))]
    async fn try_return(&self, holder_id: HolderId, items: &BTreeSet<ItemId>) -> AppResult<Holder> {
        let _locks = self.locks.acquire(lock_order(holder_id, items)).await?;

        let holder = self.load_holder(holder_id).await?;
        let returned = returnable(&holder, items, self.policy.strict_returns)?;

        let ignored = items.len() - returned.len();
        if ignored > 0 {
            tracing::debug!("Ignoring {} item(s) not held by holder {}", ignored, holder_id);
        }

        if returned.is_empty() {
            return Ok(holder);
        }

        let batch = LoanBatch::give_back(&holder, &returned);
        let committed_at = self.repository.loans.commit(&batch).await?;

        tracing::info!(
            "Holder {} returned {:?} ({} loan(s) now)",
            holder_id,
            returned,
            batch.loans.len()
        );

        Ok(with_loans(holder, batch, committed_at))
    }

    #[tracing::instrument(skip(self))]
    async fn try_delete_holder(&self, holder_id: HolderId) -> AppResult<Holder> {
        let _locks = self.locks.acquire([LockKey::Holder(holder_id)]).await?;

        let holder = self.load_holder(holder_id).await?;
        if !holder.loans.is_empty() {
            return Err(AppError::HolderHasLoans(holder_id));
        }

        // Another process may have lent something since the read above
        if !self.repository.holders.delete_holder_if_idle(holder_id).await? {
            return Err(AppError::HolderHasLoans(holder_id));
        }

        tracing::info!("Holder {} deleted", holder_id);
        Ok(holder)
    }

    /// Re-run `attempt` while it fails with `ConcurrentModification`, up to the
    /// configured number of retries. Every other outcome is returned as is.
    async fn with_conflict_retry<T, F, Fut>(&self, operation: &str, mut attempt: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Err(AppError::ConcurrentModification(reason))
                    if retries < self.policy.conflict_retries =>
                {
                    retries += 1;
                    tracing::warn!(
                        "{} lost a race ({}), retrying against fresh state ({}/{})",
                        operation,
                        reason,
                        retries,
                        self.policy.conflict_retries
                    );
                }
                outcome => return outcome,
            }
        }
    }

    async fn load_holder(&self, holder_id: HolderId) -> AppResult<Holder> {
        self.repository
            .holders
            .get_holder(holder_id)
            .await?
            .ok_or(AppError::HolderNotFound(holder_id))
    }

    async fn load_item(&self, item_id: ItemId) -> AppResult<Item> {
        self.repository
            .items
            .get_item(item_id)
            .await?
            .ok_or(AppError::ItemNotFound(item_id))
    }
}

fn with_loans(holder: Holder, batch: LoanBatch, committed_at: DateTime<Utc>) -> Holder {
    Holder {
        loans: batch.loans,
        updated_at: Some(committed_at),
        ..holder
    }
}

/// Run a transaction on its own task so that a caller dropping the future
/// (client disconnect, timeout) cannot interrupt it between check and commit.
async fn detached<T, Fut>(transaction: Fut) -> AppResult<T>
where
    T: Send + 'static,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
{
    tokio::spawn(transaction)
        .await
        .map_err(|e| AppError::Internal(format!("Loan transaction task failed: {}", e)))?
}
