//! Holder (borrower account) model and related types

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::item::ItemId;

pub type HolderId = i32;

/// Borrower with the set of items currently held
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Holder {
    pub id: HolderId,
    pub full_name: String,
    pub email: String,
    /// Ids of the items currently on loan to this holder
    #[schema(value_type = Vec<i32>)]
    pub loans: BTreeSet<ItemId>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Holder {
    /// New account with no loans
    pub fn new(id: HolderId, full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            email: email.into(),
            loans: BTreeSet::new(),
            updated_at: None,
        }
    }

    pub fn holds(&self, item_id: ItemId) -> bool {
        self.loans.contains(&item_id)
    }

    pub fn loan_count(&self) -> usize {
        self.loans.len()
    }
}

/// Holder row as stored in the database (`loans` is a sorted `INTEGER[]`)
#[derive(Debug, Clone, FromRow)]
pub struct HolderRow {
    pub id: HolderId,
    pub full_name: String,
    pub email: String,
    pub loans: Vec<i32>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<HolderRow> for Holder {
    fn from(row: HolderRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            loans: row.loans.into_iter().collect(),
            updated_at: row.updated_at,
        }
    }
}
