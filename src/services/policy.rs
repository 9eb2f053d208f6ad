//! Borrowing rules shared by the loan transactions.
//!
//! Everything here is pure: it inspects snapshots already read from storage and
//! never touches the store itself.

use std::collections::BTreeSet;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::{Holder, HolderId, Item, ItemId},
};

use super::locks::LockKey;

/// Maximum number of concurrent loans per holder
pub const MAX_LOANS: usize = 3;

/// Configurable parts of the borrowing rules. The loan limit is not one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    pub strict_returns: bool,
    pub conflict_retries: u32,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            strict_returns: true,
            conflict_retries: 1,
        }
    }
}

impl From<&LoansConfig> for LoanPolicy {
    fn from(config: &LoansConfig) -> Self {
        Self {
            strict_returns: config.strict_returns,
            conflict_retries: config.conflict_retries,
        }
    }
}

/// At least one copy is on the shelf
pub fn can_borrow(item: &Item) -> bool {
    item.available_copies() >= 1
}

pub fn within_limit(holder: &Holder, additional: usize, max_loans: usize) -> bool {
    holder.loan_count().saturating_add(additional) <= max_loans
}

/// Whole-request limit check; a request is never partially admitted
pub fn ensure_within_limit(holder: &Holder, requested: usize, max_loans: usize) -> AppResult<()> {
    if within_limit(holder, requested, max_loans) {
        Ok(())
    } else {
        Err(AppError::LoanLimitExceeded {
            current: holder.loan_count(),
            requested,
            max: max_loans,
        })
    }
}

/// Per-item admission: availability first, then duplicates against both the
/// holder's loans and the items already selected in this request.
pub fn admit(holder: &Holder, selected: &BTreeSet<ItemId>, item: &Item) -> AppResult<()> {
    if !can_borrow(item) {
        return Err(AppError::NoCopiesAvailable(item.id));
    }
    if holder.holds(item.id) || selected.contains(&item.id) {
        return Err(AppError::AlreadyBorrowed(item.id));
    }
    Ok(())
}

/// Items of `requested` that will actually be returned.
///
/// In strict mode the first id (ascending) the holder does not hold is an
/// error; otherwise such ids are dropped.
pub fn returnable(
    holder: &Holder,
    requested: &BTreeSet<ItemId>,
    strict: bool,
) -> AppResult<BTreeSet<ItemId>> {
    if strict {
        if let Some(&unknown) = requested.iter().find(|&&id| !holder.holds(id)) {
            return Err(AppError::NotBorrowedByHolder(unknown));
        }
    }
    Ok(requested.intersection(&holder.loans).copied().collect())
}

/// Locks a transaction must take, in acquisition order: the holder, then each
/// distinct item by ascending id.
pub fn lock_order<'a>(
    holder_id: HolderId,
    items: impl IntoIterator<Item = &'a ItemId>,
) -> Vec<LockKey> {
    let mut keys: BTreeSet<LockKey> = items.into_iter().map(|&id| LockKey::Item(id)).collect();
    keys.insert(LockKey::Holder(holder_id));
    keys.into_iter().collect()
}
