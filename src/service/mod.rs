//! The transaction and budget services that sit between the HTTP API and the row store.

mod budgets;
mod transactions;

use std::fmt::{Display, Formatter};

pub use budgets::BudgetService;
pub use transactions::TransactionService;

/// Message for a create request that lacks `amount`, `category` or `type`.
pub const MISSING_FIELDS: &str = "Missing required fields";

/// Why a transaction could not be created.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CreateError {
    /// The input was rejected before anything was written.
    Validation(&'static str),
    /// The spreadsheet rejected the append. Details are logged where the failure happened.
    Upstream,
}

impl Display for CreateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateError::Validation(message) => f.write_str(message),
            CreateError::Upstream => f.write_str("Failed to add expense"),
        }
    }
}

impl std::error::Error for CreateError {}
