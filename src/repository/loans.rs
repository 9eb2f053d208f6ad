//! Loans repository: commits a loan batch inside one database transaction

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, LoanBatch},
};

use super::{items::shift_on_loan, LoanLedger};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanLedger for LoansRepository {
    async fn commit(&self, batch: &LoanBatch) -> AppResult<DateTime<Utc>> {
        // Dropping `tx` on any early return rolls everything back
        let mut tx = self.pool.begin().await?;

        let current: Vec<i32> =
            sqlx::query_scalar("SELECT loans FROM holders WHERE id = $1 FOR UPDATE")
                .bind(batch.holder_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::ConcurrentModification(format!(
                        "holder {} no longer exists",
                        batch.holder_id
                    ))
                })?;

        if current.into_iter().collect::<BTreeSet<ItemId>>() != batch.expected_loans {
            return Err(AppError::ConcurrentModification(format!(
                "loans of holder {} changed during the transaction",
                batch.holder_id
            )));
        }

        // Deltas are sorted by item id, so row locks are always taken in the same order
        for delta in &batch.deltas {
            if !shift_on_loan(&mut *tx, delta.item_id, delta.delta).await? {
                return Err(AppError::ConcurrentModification(format!(
                    "conditional update of item {} was rejected",
                    delta.item_id
                )));
            }
        }

        let committed_at: DateTime<Utc> = sqlx::query_scalar(
            "UPDATE holders SET loans = $2, updated_at = NOW() WHERE id = $1 RETURNING updated_at",
        )
        .bind(batch.holder_id)
        .bind(batch.loan_ids())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(committed_at)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
