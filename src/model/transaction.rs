use crate::model::{Amount, Category, TransactionType};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Represents a single row from the transactions range.
///
/// Columns are positional: Date, Amount, Description, Category, Type, SubCategory. Rows read from
/// the sheet are not validated, so `category` and `type` are kept as the text found in the cell.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub(crate) date: String,
    pub(crate) amount: Amount,
    pub(crate) description: String,
    pub(crate) category: String,
    #[serde(rename = "type")]
    pub(crate) kind: String,
    pub(crate) sub_category: String,
}

impl Transaction {
    pub fn new(
        date: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
        category: Category,
        kind: TransactionType,
        sub_category: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            amount,
            description: description.into(),
            category: category.to_string(),
            kind: kind.to_string(),
            sub_category: sub_category.into(),
        }
    }

    /// Maps a sheet row positionally. Missing trailing cells are treated as empty.
    pub fn from_row<S>(row: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        let cell = |ix: usize| row.get(ix).map(|s| s.as_ref().to_string()).unwrap_or_default();
        Self {
            date: cell(DATE_IDX),
            amount: Amount::parse(&cell(AMOUNT_IDX)),
            description: cell(DESCRIPTION_IDX),
            category: cell(CATEGORY_IDX),
            kind: cell(TYPE_IDX),
            sub_category: cell(SUB_CATEGORY_IDX),
        }
    }

    /// The row to append to the sheet, in the same column order that `from_row` reads.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.amount.to_string(),
            self.description.clone(),
            self.category.clone(),
            self.kind.clone(),
            self.sub_category.clone(),
        ]
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sub_category(&self) -> &str {
        &self.sub_category
    }

    /// The raw text of the `Type` column.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The parsed `Type` column, or `None` if the cell holds something other than Credit/Debit.
    pub fn transaction_type(&self) -> Option<TransactionType> {
        TransactionType::from_str(&self.kind).ok()
    }

    /// The `category|subCategory` key used to match spending against budgets.
    pub fn key(&self) -> String {
        composite_key(&self.category, &self.sub_category)
    }

    /// True when the transaction's date falls in `month` (`YYYY-MM`). This is a plain prefix match
    /// on the date text.
    pub fn in_month(&self, month: &str) -> bool {
        self.date.starts_with(month)
    }
}

/// The request body for creating a transaction.
///
/// Every field is optional raw JSON at this level because the body comes straight from a client:
/// `amount` arrives as a number or a string, and any field may be `null`, `false` or `0`.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<serde_json::Value>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<serde_json::Value>,
}

/// Joins a category and sub-category into the `category|subCategory` key.
pub fn composite_key(category: &str, sub_category: &str) -> String {
    format!("{category}|{sub_category}")
}

pub(super) const DATE_STR: &str = "Date";
pub(super) const DATE_IDX: usize = 0;

pub(super) const AMOUNT_STR: &str = "Amount";
pub(super) const AMOUNT_IDX: usize = 1;

pub(super) const DESCRIPTION_STR: &str = "Description";
pub(super) const DESCRIPTION_IDX: usize = 2;

pub(super) const CATEGORY_STR: &str = "Category";
pub(super) const CATEGORY_IDX: usize = 3;

pub(super) const TYPE_STR: &str = "Type";
pub(super) const TYPE_IDX: usize = 4;

pub(super) const SUB_CATEGORY_STR: &str = "SubCategory";
pub(super) const SUB_CATEGORY_IDX: usize = 5;

/// The header row of the transactions range.
pub const TRANSACTION_HEADERS: [&str; 6] = [
    DATE_STR,
    AMOUNT_STR,
    DESCRIPTION_STR,
    CATEGORY_STR,
    TYPE_STR,
    SUB_CATEGORY_STR,
];
