//! Items repository for database operations

use async_trait::async_trait;
use sqlx::{postgres::PgExecutor, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Item, ItemId},
};

use super::InventoryAccessor;

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryAccessor for ItemsRepository {
    async fn get_item(&self, id: ItemId) -> AppResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT id, title, total_copies, on_loan_count, updated_at FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn save_item(&self, item: &Item) -> AppResult<Item> {
        if item.total_copies < 0 {
            return Err(AppError::Validation("total_copies must not be negative".to_string()));
        }

        // The WHERE clause keeps an update from dropping total_copies below the copies on loan
        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (id, title, total_copies, on_loan_count, updated_at)
            VALUES ($1, $2, $3, 0, NOW())
            ON CONFLICT (id) DO UPDATE
               SET title = EXCLUDED.title,
                   total_copies = EXCLUDED.total_copies,
                   updated_at = NOW()
             WHERE items.on_loan_count <= EXCLUDED.total_copies
            RETURNING id, title, total_copies, on_loan_count, updated_at
            "#,
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(item.total_copies)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Item {} has more copies on loan than {}",
                item.id, item.total_copies
            ))
        })
    }

    async fn conditional_increment(&self, id: ItemId, delta: i32) -> AppResult<bool> {
        shift_on_loan(&self.pool, id, delta).await
    }
}

/// Guarded counter update shared by single-item updates and batch commits.
///
/// A lend only matches while a copy is free; a give-back is floored at zero.
/// Returns `false` when no row was updated.
pub(crate) async fn shift_on_loan<'e, E>(executor: E, id: ItemId, delta: i32) -> AppResult<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE items
           SET on_loan_count = GREATEST(on_loan_count + $2, 0), updated_at = NOW()
         WHERE id = $1
           AND on_loan_count + $2 <= total_copies
        "#,
    )
    .bind(id)
    .bind(delta)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}
