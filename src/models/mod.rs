//! Data models for the circulation server

pub mod holder;
pub mod item;
pub mod loan;

// Re-export commonly used types
pub use holder::{Holder, HolderId};
pub use item::{Item, ItemAvailability, ItemId};
pub use loan::{BorrowRequest, ItemDelta, LoanBatch, ReturnRequest};
