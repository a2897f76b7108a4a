//! Types that represent the core data model, such as `Transaction` and `BudgetEntry`.
mod amount;
mod budget;
mod json;
mod kind;
mod transaction;

pub use amount::Amount;
pub(crate) use json::{cell_text, is_truthy, text_or_empty};
pub use budget::{BudgetEntry, Budgets, NewBudget, BUDGET_HEADERS};
pub use kind::{Category, TransactionType};
pub use transaction::{composite_key, NewTransaction, Transaction, TRANSACTION_HEADERS};
