//! Monthly aggregation of transactions against budgets.
//!
//! Everything here is a pure function of the fetched lists and the selected month. Amounts that
//! did not parse are `NaN` and flow through every total they touch.

use crate::model::{composite_key, Amount, BudgetEntry, Transaction, TransactionType};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A snapshot of one month: totals, spend per sub-category and progress against each budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    month: String,
    total_income: Amount,
    total_expense: Amount,
    spending_by_sub_category: HashMap<String, Amount>,
    groups: Vec<BudgetGroup>,
    transactions: Vec<Transaction>,
}

impl Report {
    /// Builds the report for `month` (`YYYY-MM`). A transaction belongs to the month when its date
    /// text starts with `month`.
    pub fn new(transactions: &[Transaction], budgets: &[BudgetEntry], month: &str) -> Self {
        let transactions: Vec<Transaction> = transactions
            .iter()
            .filter(|t| t.in_month(month))
            .cloned()
            .collect();

        let total_income = sum_of(&transactions, TransactionType::Credit);
        let total_expense = sum_of(&transactions, TransactionType::Debit);

        let mut spending_by_sub_category: HashMap<String, Amount> = HashMap::new();
        for t in transactions
            .iter()
            .filter(|t| t.transaction_type() == Some(TransactionType::Debit))
        {
            let spent = spending_by_sub_category
                .entry(t.key())
                .or_insert(Amount::ZERO);
            *spent = *spent + t.amount();
        }

        let groups = group_budgets(budgets, &spending_by_sub_category);

        Self {
            month: month.to_string(),
            total_income,
            total_expense,
            spending_by_sub_category,
            groups,
            transactions,
        }
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn total_income(&self) -> Amount {
        self.total_income
    }

    pub fn total_expense(&self) -> Amount {
        self.total_expense
    }

    /// Debit spend for a `category|subCategory` key. Keys with no spend in the month are zero.
    pub fn spent(&self, key: &str) -> Amount {
        self.spending_by_sub_category
            .get(key)
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Budget progress grouped by top-level category, in order of first appearance.
    pub fn groups(&self) -> &[BudgetGroup] {
        &self.groups
    }

    /// The month's transactions in sheet order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

fn sum_of(transactions: &[Transaction], kind: TransactionType) -> Amount {
    transactions
        .iter()
        .filter(|t| t.transaction_type() == Some(kind))
        .map(Transaction::amount)
        .sum()
}

fn group_budgets(budgets: &[BudgetEntry], spending: &HashMap<String, Amount>) -> Vec<BudgetGroup> {
    let mut groups: Vec<BudgetGroup> = Vec::new();
    for entry in budgets {
        let spent = spending
            .get(&composite_key(entry.category(), entry.sub_category()))
            .copied()
            .unwrap_or(Amount::ZERO);
        let progress = BudgetProgress::new(entry, spent);
        match groups.iter_mut().find(|g| g.category == entry.category()) {
            Some(group) => group.lines.push(progress),
            None => groups.push(BudgetGroup {
                category: entry.category().to_string(),
                lines: vec![progress],
            }),
        }
    }
    groups
}

/// The budgets of one top-level category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetGroup {
    category: String,
    lines: Vec<BudgetProgress>,
}

impl BudgetGroup {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn lines(&self) -> &[BudgetProgress] {
        &self.lines
    }
}

/// How much of one sub-category's monthly budget has been spent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetProgress {
    sub_category: String,
    #[serde(with = "rust_decimal::serde::float")]
    budget: Decimal,
    spent: Amount,
    percent_used: Amount,
    is_over_budget: bool,
}

impl BudgetProgress {
    fn new(entry: &BudgetEntry, spent: Amount) -> Self {
        let budget = entry.budget();
        let percent_used = if budget > Decimal::ZERO {
            spent
                .value()
                .and_then(|s| s.checked_div(budget))
                .and_then(|ratio| ratio.checked_mul(HUNDRED))
                .map(Amount::new)
                .unwrap_or(Amount::NAN)
        } else {
            Amount::ZERO
        };
        Self {
            sub_category: entry.sub_category().to_string(),
            budget,
            spent,
            percent_used,
            is_over_budget: spent.value().is_some_and(|s| s > budget),
        }
    }

    pub fn sub_category(&self) -> &str {
        &self.sub_category
    }

    pub fn budget(&self) -> Decimal {
        self.budget
    }

    pub fn spent(&self) -> Amount {
        self.spent
    }

    /// `spent / budget * 100`, or zero for a zero budget. Not clamped.
    pub fn percent_used(&self) -> Amount {
        self.percent_used
    }

    pub fn is_over_budget(&self) -> bool {
        self.is_over_budget
    }

    /// The progress bar width in percent: `percent_used` clamped to at most 100.
    pub fn bar_width(&self) -> Amount {
        match self.percent_used.value() {
            Some(p) => Amount::new(p.min(HUNDRED)),
            None => Amount::NAN,
        }
    }

    /// What is left of the budget. Negative when over budget.
    pub fn remaining(&self) -> Amount {
        Amount::new(self.budget) - self.spent
    }
}
