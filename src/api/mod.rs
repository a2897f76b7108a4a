//! Access to the spreadsheet that stores transactions and budgets.
//!
//! The `Sheet` trait is the seam between this program and Google Sheets. `GoogleSheet` implements
//! it against the Sheets API and `TestSheet` implements it in memory so that the whole program can
//! run without touching Google.

mod auth;
mod sheet;
mod sheet_test_client;

use crate::{Config, Result};
use std::sync::Arc;
use tracing::debug;

pub(crate) use auth::TokenProvider;
pub(crate) use sheet::GoogleSheet;
pub use sheet_test_client::TestSheet;

/// OAuth scope required to read and append sheet values.
const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

/// The default range holding transactions: Date, Amount, Description, Category, Type, SubCategory.
pub const TRANSACTIONS_RANGE: &str = "Sheet1!A:F";

/// The default range holding budgets: Category, SubCategory, MonthlyBudget.
pub const CATEGORIES_RANGE: &str = "Categories!A:C";

/// When this environment variable is set to a non-empty value, `Mode::Testing` is used.
pub const TEST_MODE_ENV: &str = "EXPENSES_IN_TEST_MODE";

/// A very small interface over a spreadsheet: read a whole range, or append one row to it.
#[async_trait::async_trait]
pub trait Sheet: Send + Sync {
    /// Get all rows of `range`, e.g. `Sheet1!A:F`. Rows may be shorter than the range is wide
    /// because trailing empty cells are not returned.
    async fn get(&self, range: &str) -> Result<Vec<Vec<String>>>;

    /// Append `row` after the last row of `range`.
    async fn append(&self, range: &str, row: Vec<String>) -> Result<()>;
}

/// Whether the program talks to Google or to an in-memory sheet.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Google,
    Testing,
}

impl Mode {
    /// Returns `Mode::Testing` if the `EXPENSES_IN_TEST_MODE` environment variable is set and
    /// non-empty, otherwise `Mode::Google`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Google,
        }
    }
}

/// Creates the `Sheet` implementation selected by `mode`.
pub async fn sheet(config: &Config, mode: Mode) -> Result<Arc<dyn Sheet>> {
    match mode {
        Mode::Google => {
            anyhow::ensure!(
                !config.spreadsheet_id().is_empty(),
                "No spreadsheet is configured: set sheet_url in {} or {}",
                config.config_path().display(),
                crate::config::SHEET_ID_ENV
            );
            let credentials = config.credentials().await?;
            let token_provider = TokenProvider::new(&credentials).await?;
            debug!("Using Google sheet {}", config.spreadsheet_id());
            Ok(Arc::new(GoogleSheet::new(
                config.spreadsheet_id(),
                token_provider,
            )))
        }
        Mode::Testing => {
            debug!("Using the in-memory test sheet");
            Ok(Arc::new(TestSheet::default()))
        }
    }
}

/// The sheet name part of a range, e.g. `Categories` for `Categories!A:C`. A range without a sheet
/// name refers to the first sheet, which is returned as an empty string.
pub(crate) fn sheet_name(range: &str) -> &str {
    match range.split_once('!') {
        Some((name, _)) => name.trim_matches('\''),
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name() {
        assert_eq!(sheet_name("Sheet1!A:F"), "Sheet1");
        assert_eq!(sheet_name("'My Budget'!A:C"), "My Budget");
        assert_eq!(sheet_name("A:F"), "");
    }
}
