use crate::model::transaction::composite_key;
use crate::model::{cell_text, Amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a single row from the categories range: a monthly budget for a sub-category.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetEntry {
    pub(crate) category: String,
    pub(crate) sub_category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) budget: Decimal,
}

impl BudgetEntry {
    pub fn new(
        category: impl Into<String>,
        sub_category: impl Into<String>,
        budget: Decimal,
    ) -> Self {
        Self {
            category: category.into(),
            sub_category: sub_category.into(),
            budget,
        }
    }

    /// Maps a sheet row positionally. An unparsable budget becomes zero.
    pub fn from_row<S>(row: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        let cell = |ix: usize| row.get(ix).map(|s| s.as_ref().to_string()).unwrap_or_default();
        let budget = Amount::parse(&cell(BUDGET_IDX))
            .value()
            .unwrap_or(Decimal::ZERO);
        Self {
            category: cell(CATEGORY_IDX),
            sub_category: cell(SUB_CATEGORY_IDX),
            budget,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sub_category(&self) -> &str {
        &self.sub_category
    }

    pub fn budget(&self) -> Decimal {
        self.budget
    }

    /// The `category|subCategory` key that identifies this entry.
    pub fn key(&self) -> String {
        composite_key(&self.category, &self.sub_category)
    }
}

/// The budgets that are in effect, deduplicated by `category|subCategory`.
///
/// Rows are applied in sheet order and a later row replaces the entry of an earlier row with the
/// same key. A replaced entry keeps the position at which its key first appeared, so iteration
/// order is the order in which keys were first seen, not the order of the winning rows. This
/// mirrors how a budget is "updated": by appending a newer row for the same key.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Budgets {
    entries: Vec<BudgetEntry>,
    index: HashMap<String, usize>,
}

impl Budgets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry`, replacing any existing entry that has the same key.
    pub fn insert(&mut self, entry: BudgetEntry) {
        let key = entry.key();
        match self.index.get(&key) {
            Some(&ix) => self.entries[ix] = entry,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&BudgetEntry> {
        self.index.get(key).map(|&ix| &self.entries[ix])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<BudgetEntry> {
        self.entries
    }
}

impl FromIterator<BudgetEntry> for Budgets {
    fn from_iter<T: IntoIterator<Item = BudgetEntry>>(iter: T) -> Self {
        let mut budgets = Budgets::new();
        for entry in iter {
            budgets.insert(entry);
        }
        budgets
    }
}

/// The request body for creating a budget. Nothing is validated; absent fields are written as
/// empty cells and `budget` is written exactly as the client sent it.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<serde_json::Value>,
}

impl NewBudget {
    /// The row to append to the categories range.
    pub fn to_row(&self) -> Vec<String> {
        [&self.category, &self.sub_category, &self.budget]
            .into_iter()
            .map(|field| field.as_ref().map(cell_text).unwrap_or_default())
            .collect()
    }
}

pub(super) const CATEGORY_STR: &str = "Category";
pub(super) const CATEGORY_IDX: usize = 0;

pub(super) const SUB_CATEGORY_STR: &str = "SubCategory";
pub(super) const SUB_CATEGORY_IDX: usize = 1;

pub(super) const BUDGET_STR: &str = "MonthlyBudget";
pub(super) const BUDGET_IDX: usize = 2;

/// The header row of the categories range.
pub const BUDGET_HEADERS: [&str; 3] = [CATEGORY_STR, SUB_CATEGORY_STR, BUDGET_STR];
