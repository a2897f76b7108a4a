//! Terminal presentation: the dashboard, the transaction entry form and the budget views.
//!
//! Views hold their own state and render to a `String`; they never talk to the network. Commands
//! fetch data with `ApiClient`, hand it to a view and print the result.

mod budgets;
mod dashboard;
mod form;

pub use budgets::{render_budgets, BudgetForm};
pub use dashboard::{current_month, Dashboard};
pub use form::{ExpenseForm, SubCategoryInput};

/// The currency symbol used when none is given.
pub const DEFAULT_CURRENCY: &str = "₹";
