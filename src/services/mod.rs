//! Business logic services

pub mod loans;
pub mod locks;
pub mod policy;

use crate::{config::LoansConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, loans_config: &LoansConfig) -> Self {
        Self {
            loans: loans::LoansService::new(repository, policy::LoanPolicy::from(loans_config)),
        }
    }
}
