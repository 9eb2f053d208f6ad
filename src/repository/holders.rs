//! Holders repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{holder::HolderRow, Holder, HolderId},
};

use super::HolderAccessor;

#[derive(Clone)]
pub struct HoldersRepository {
    pool: Pool<Postgres>,
}

impl HoldersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HolderAccessor for HoldersRepository {
    async fn get_holder(&self, id: HolderId) -> AppResult<Option<Holder>> {
        let row = sqlx::query_as::<_, HolderRow>(
            "SELECT id, full_name, email, loans, updated_at FROM holders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Holder::from))
    }

    async fn save_holder(&self, holder: &Holder) -> AppResult<Holder> {
        let row = sqlx::query_as::<_, HolderRow>(
            r#"
            INSERT INTO holders (id, full_name, email, loans, updated_at)
            VALUES ($1, $2, $3, '{}', NOW())
            ON CONFLICT (id) DO UPDATE
               SET full_name = EXCLUDED.full_name,
                   email = EXCLUDED.email,
                   updated_at = NOW()
            RETURNING id, full_name, email, loans, updated_at
            "#,
        )
        .bind(holder.id)
        .bind(&holder.full_name)
        .bind(&holder.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_holder_if_idle(&self, id: HolderId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM holders WHERE id = $1 AND cardinality(loans) = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
