//! Implements the `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets.

use crate::api::{sheet_name, Sheet, CATEGORIES_RANGE, TRANSACTIONS_RANGE};
use crate::Result;
use anyhow::{bail, Context};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// An implementation of the `Sheet` trait that does not use Google sheets. It holds its data in
/// memory, keyed by sheet name, and by default is seeded with some existing data.
///
/// Reads and appends can be made to fail so that callers' error handling can be exercised.
#[derive(Debug)]
pub struct TestSheet {
    data: Mutex<HashMap<String, Vec<Vec<String>>>>,
    fail_reads: AtomicBool,
    fail_appends: AtomicBool,
}

impl TestSheet {
    /// Create a new `TestSheet` using `data`. The map key is sheet name and the map value is the
    /// rows of the sheet.
    pub fn new(data: HashMap<String, Vec<Vec<String>>>) -> Self {
        Self {
            data: Mutex::new(data),
            fail_reads: AtomicBool::new(false),
            fail_appends: AtomicBool::new(false),
        }
    }

    /// Create a `TestSheet` with no sheets at all.
    pub fn empty() -> Self {
        Self::new(HashMap::new())
    }

    /// Create a `TestSheet` where the sheet named by `range` holds `rows`.
    pub fn with_rows<S, R>(range: &str, rows: impl IntoIterator<Item = R>) -> Self
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let mut data = HashMap::new();
        data.insert(sheet_name(range).to_string(), rows);
        Self::new(data)
    }

    /// Makes every subsequent `get` fail when `fail` is true.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `append` fail when `fail` is true.
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Returns a copy of the rows of the sheet named by `range`.
    pub async fn rows(&self, range: &str) -> Vec<Vec<String>> {
        self.data
            .lock()
            .await
            .get(sheet_name(range))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get(&self, range: &str) -> Result<Vec<Vec<String>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("Simulated read failure for '{range}'");
        }
        let name = sheet_name(range);
        self.data
            .lock()
            .await
            .get(name)
            .with_context(|| format!("Unable to parse range: {range}"))
            .cloned()
    }

    async fn append(&self, range: &str, row: Vec<String>) -> Result<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            bail!("Simulated append failure for '{range}'");
        }
        let name = sheet_name(range);
        self.data
            .lock()
            .await
            .entry(name.to_string())
            .or_default()
            .push(row);
        Ok(())
    }
}

impl Default for TestSheet {
    /// Loads seed data from this module.
    fn default() -> Self {
        Self::new(default_data())
    }
}

/// Provides the seed data from this module. The embedded CSV is known to be well formed, so a
/// parse failure would only leave the affected sheet empty.
fn default_data() -> HashMap<String, Vec<Vec<String>>> {
    let mut map = HashMap::new();
    map.insert(
        sheet_name(TRANSACTIONS_RANGE).to_string(),
        load_csv(TRANSACTION_DATA).unwrap_or_default(),
    );
    map.insert(
        sheet_name(CATEGORIES_RANGE).to_string(),
        load_csv(CATEGORY_DATA).unwrap_or_default(),
    );
    map
}

/// Loads data from a CSV-formatted string. Trailing empty cells are dropped the way the Sheets API
/// drops them.
fn load_csv(csv_data: &str) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut row: Vec<String> = record.iter().map(|field| field.to_string()).collect();
        while row.last().is_some_and(|cell| cell.is_empty()) {
            row.pop();
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Seed transaction data.
const TRANSACTION_DATA: &str = r##"Date,Amount,Description,Category,Type,SubCategory
2024-05-01,85000,Salary,Personal,Credit,
2024-05-03,15000,May rent,House,Debit,Rent
2024-05-09,2140.50,Groceries,House,Debit,Groceries
2024-05-21,799,Internet,House,Debit,Wifi
2024-06-01,85000,Salary,Personal,Credit,
2024-06-02,15000,June rent,House,Debit,Rent
2024-06-06,1890.25,Groceries,House,Debit,Groceries
2024-06-11,1200,Gym membership,Personal,Debit,Fitness
2024-06-14,640,Dinner with friends,Personal,Debit,Eating Out
2024-06-18,3500,Freelance payment,Personal,Credit,
2024-06-20,2310.75,Groceries,House,Debit,Groceries
2024-06-23,980,Movie night,Personal,Debit,Eating Out
2024-06-28,799,Internet,House,Debit,Wifi
"##;

/// Seed category data. The second `House,Groceries` row is a budget that was raised mid-year.
const CATEGORY_DATA: &str = r##"Category,SubCategory,MonthlyBudget
House,Rent,15000
House,Groceries,5000
House,Wifi,1000
Personal,Fitness,1500
Personal,Eating Out,1500
House,Groceries,6000
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BUDGET_HEADERS, TRANSACTION_HEADERS};

    #[tokio::test]
    async fn test_seed_data() {
        let sheet = TestSheet::default();
        let transactions = sheet.get(TRANSACTIONS_RANGE).await.unwrap();
        assert_eq!(transactions.len(), 14);
        assert_eq!(transactions[0], TRANSACTION_HEADERS);
        // The trailing empty SubCategory of a Credit row is dropped.
        assert_eq!(transactions[1].len(), 5);

        let categories = sheet.get(CATEGORIES_RANGE).await.unwrap();
        assert_eq!(categories.len(), 7);
        assert_eq!(categories[0], BUDGET_HEADERS);
    }

    #[tokio::test]
    async fn test_append_then_get() {
        let sheet = TestSheet::empty();
        assert!(sheet.get(CATEGORIES_RANGE).await.is_err());
        sheet
            .append(CATEGORIES_RANGE, vec!["House".into(), "Rent".into(), "1".into()])
            .await
            .unwrap();
        let rows = sheet.get(CATEGORIES_RANGE).await.unwrap();
        assert_eq!(rows, vec![vec!["House", "Rent", "1"]]);
    }

    #[tokio::test]
    async fn test_simulated_failures() {
        let sheet = TestSheet::default();
        sheet.fail_reads(true);
        assert!(sheet.get(TRANSACTIONS_RANGE).await.is_err());
        sheet.fail_reads(false);
        assert!(sheet.get(TRANSACTIONS_RANGE).await.is_ok());

        sheet.fail_appends(true);
        assert!(sheet.append(TRANSACTIONS_RANGE, vec![]).await.is_err());
        assert_eq!(sheet.rows(TRANSACTIONS_RANGE).await.len(), 14);
    }
}
