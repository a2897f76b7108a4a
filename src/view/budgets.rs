use crate::model::{BudgetEntry, Category, NewBudget};
use serde_json::Value;
use std::fmt::Write;

/// The state of the add-budget form. Adding a budget for an existing sub-category updates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetForm {
    category: Category,
    sub_category: String,
    budget: String,
}

impl BudgetForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    pub fn set_sub_category(&mut self, sub_category: impl Into<String>) {
        self.sub_category = sub_category.into();
    }

    pub fn set_budget(&mut self, budget: impl Into<String>) {
        self.budget = budget.into();
    }

    /// The request body, or `None` while the sub-category or budget is blank.
    pub fn to_request(&self) -> Option<NewBudget> {
        if self.sub_category.is_empty() || self.budget.is_empty() {
            return None;
        }
        Some(NewBudget {
            category: Some(Value::String(self.category.to_string())),
            sub_category: Some(Value::String(self.sub_category.clone())),
            budget: Some(Value::String(self.budget.clone())),
        })
    }

    /// Clears the sub-category and budget after a successful submit.
    pub fn reset(&mut self) {
        self.sub_category.clear();
        self.budget.clear();
    }
}

/// Renders the flat list of budgets in effect.
pub fn render_budgets(budgets: &[BudgetEntry], currency: &str) -> String {
    let mut out = String::from("Current Budgets\n");
    if budgets.is_empty() {
        out.push_str("  No categories defined yet.\n");
        return out;
    }
    for b in budgets {
        let _ = writeln!(
            out,
            "  {:<20} {:<10} {currency}{} Monthly",
            b.sub_category(),
            b.category(),
            b.budget().normalize()
        );
    }
    out
}
