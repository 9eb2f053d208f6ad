//! Loan requests and the atomic loan batch handed to storage

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::holder::{Holder, HolderId};
use super::item::ItemId;

fn default_copies() -> i32 {
    1
}

/// One requested title in a borrow request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BorrowLine {
    /// Item ID
    pub id: ItemId,
    /// Requested copies (must be 1)
    #[serde(default = "default_copies")]
    #[validate(range(min = 1, max = 1, message = "You cannot borrow more than 1 copy of an item"))]
    pub copies: i32,
}

/// Borrow request body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BorrowRequest {
    #[validate(length(min = 1, message = "At least one item must be requested"), nested)]
    pub items: Vec<BorrowLine>,
}

impl BorrowRequest {
    /// Requested item ids in request order
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|line| line.id).collect()
    }
}

/// One returned title
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReturnLine {
    /// Item ID
    pub id: ItemId,
}

/// Return request body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReturnRequest {
    #[validate(length(min = 1, message = "At least one item must be returned"))]
    pub items: Vec<ReturnLine>,
}

impl ReturnRequest {
    pub fn item_ids(&self) -> BTreeSet<ItemId> {
        self.items.iter().map(|line| line.id).collect()
    }
}

/// Borrow/return outcome
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoanResponse {
    pub message: String,
    pub holder: Holder,
}

/// Change applied to one item's `on_loan_count`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDelta {
    pub item_id: ItemId,
    pub delta: i32,
}

/// All mutations of one borrow or return, committed together or not at all.
///
/// `expected_loans` is the holder's loan set as read during validation; storage
/// rejects the batch if it changed since. Deltas are sorted by ascending item id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanBatch {
    pub holder_id: HolderId,
    pub expected_loans: BTreeSet<ItemId>,
    pub loans: BTreeSet<ItemId>,
    pub deltas: Vec<ItemDelta>,
}

impl LoanBatch {
    pub fn borrow(holder: &Holder, items: &BTreeSet<ItemId>) -> Self {
        Self {
            holder_id: holder.id,
            expected_loans: holder.loans.clone(),
            loans: holder.loans.union(items).copied().collect(),
            deltas: items
                .iter()
                .map(|&item_id| ItemDelta { item_id, delta: 1 })
                .collect(),
        }
    }

    pub fn give_back(holder: &Holder, items: &BTreeSet<ItemId>) -> Self {
        Self {
            holder_id: holder.id,
            expected_loans: holder.loans.clone(),
            loans: holder.loans.difference(items).copied().collect(),
            deltas: items
                .iter()
                .map(|&item_id| ItemDelta { item_id, delta: -1 })
                .collect(),
        }
    }

    /// Sorted loan ids, as stored in `holders.loans`
    pub fn loan_ids(&self) -> Vec<ItemId> {
        self.loans.iter().copied().collect()
    }
}
