//! Item (lendable title) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

pub type ItemId = i32;

/// Catalog item with its copy inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    /// Physical copies owned
    pub total_copies: i32,
    /// Copies currently lent out
    pub on_loan_count: i32,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    /// New catalog entry with no copy on loan
    pub fn new(id: ItemId, title: impl Into<String>, total_copies: i32) -> Self {
        Self {
            id,
            title: title.into(),
            total_copies,
            on_loan_count: 0,
            updated_at: None,
        }
    }

    pub fn available_copies(&self) -> i32 {
        (self.total_copies - self.on_loan_count).max(0)
    }

    /// `0 <= on_loan_count <= total_copies`
    pub fn is_consistent(&self) -> bool {
        self.on_loan_count >= 0 && self.on_loan_count <= self.total_copies
    }

    /// `on_loan_count + delta`, or `None` when the result would leave `0..=total_copies`
    pub fn checked_on_loan(&self, delta: i32) -> Option<i32> {
        let next = self.on_loan_count.checked_add(delta)?;
        (0..=self.total_copies).contains(&next).then_some(next)
    }

    /// `on_loan_count + delta` floored at zero
    pub fn floored_on_loan(&self, delta: i32) -> i32 {
        self.on_loan_count.saturating_add(delta).max(0)
    }

    /// Counter after a loan delta: lending may not exceed `total_copies`,
    /// giving back never goes below zero. `None` when a lend is rejected.
    pub fn shifted_on_loan(&self, delta: i32) -> Option<i32> {
        if delta > 0 {
            self.checked_on_loan(delta)
        } else {
            Some(self.floored_on_loan(delta))
        }
    }
}

/// Item snapshot returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemAvailability {
    pub id: ItemId,
    pub title: String,
    pub total_copies: i32,
    pub on_loan_count: i32,
    pub available_copies: i32,
}

impl From<Item> for ItemAvailability {
    fn from(item: Item) -> Self {
        Self {
            available_copies: item.available_copies(),
            id: item.id,
            title: item.title,
            total_copies: item.total_copies,
            on_loan_count: item.on_loan_count,
        }
    }
}
