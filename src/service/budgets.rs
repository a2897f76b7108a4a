use crate::model::{BudgetEntry, Budgets, NewBudget};
use crate::store::RowStore;
use tracing::info;

/// Lists and appends budgets in the categories range.
#[derive(Debug, Clone)]
pub struct BudgetService {
    store: RowStore,
    range: String,
}

impl BudgetService {
    pub fn new(store: RowStore, range: impl Into<String>) -> Self {
        Self {
            store,
            range: range.into(),
        }
    }

    /// Returns the budgets in effect. Rows sharing a `category|subCategory` key collapse into the
    /// last one, positioned where the key first appeared.
    pub async fn list(&self) -> Vec<BudgetEntry> {
        let rows = self.store.read(&self.range).await;
        if rows.len() < 2 {
            return Vec::new();
        }
        rows.iter()
            .skip(1)
            .map(|row| BudgetEntry::from_row(row.as_slice()))
            .collect::<Budgets>()
            .into_vec()
    }

    /// Appends `input` as written. Returns `false` if the append fails.
    pub async fn create(&self, input: &NewBudget) -> bool {
        let row = input.to_row();
        let row_key = [row[0].clone(), row[1].clone()];
        let ok = self.store.append(&self.range, row).await;
        if ok {
            info!("Added budget for {}|{}", row_key[0], row_key[1]);
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestSheet, CATEGORIES_RANGE};
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::sync::Arc;

    fn service(sheet: Arc<TestSheet>) -> BudgetService {
        BudgetService::new(RowStore::new(sheet), CATEGORIES_RANGE)
    }

    #[tokio::test]
    async fn test_list_seed_dedups() {
        let budgets = service(Arc::new(TestSheet::default())).list().await;
        let keys: Vec<String> = budgets.iter().map(BudgetEntry::key).collect();
        assert_eq!(
            keys,
            vec![
                "House|Rent",
                "House|Groceries",
                "House|Wifi",
                "Personal|Fitness",
                "Personal|Eating Out"
            ]
        );
        assert_eq!(budgets[1].budget(), Decimal::from(6000));
    }

    #[tokio::test]
    async fn test_list_last_row_wins() {
        let sheet = TestSheet::with_rows(
            CATEGORIES_RANGE,
            vec![
                vec!["Category", "SubCategory", "MonthlyBudget"],
                vec!["Personal", "Rent", "1000"],
                vec!["Personal", "Rent", "1200"],
            ],
        );
        let budgets = service(Arc::new(sheet)).list().await;
        assert_eq!(budgets, vec![BudgetEntry::new("Personal", "Rent", Decimal::from(1200))]);
    }

    #[tokio::test]
    async fn test_list_header_only_and_failure() {
        let header_only = TestSheet::with_rows(
            CATEGORIES_RANGE,
            vec![vec!["Category", "SubCategory", "MonthlyBudget"]],
        );
        assert!(service(Arc::new(header_only)).list().await.is_empty());

        let sheet = Arc::new(TestSheet::default());
        sheet.fail_reads(true);
        assert!(service(sheet).list().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_unparsable_budget_is_zero() {
        let sheet = TestSheet::with_rows(
            CATEGORIES_RANGE,
            vec![
                vec!["Category", "SubCategory", "MonthlyBudget"],
                vec!["House", "Repairs", "lots"],
                vec!["House", "Garden"],
            ],
        );
        let budgets = service(Arc::new(sheet)).list().await;
        assert_eq!(budgets.len(), 2);
        assert!(budgets.iter().all(|b| b.budget().is_zero()));
    }

    #[tokio::test]
    async fn test_create_appends_as_given() {
        let sheet = Arc::new(TestSheet::default());
        let service = service(sheet.clone());
        let input: NewBudget = serde_json::from_value(
            json!({"category": "House", "subCategory": "Water", "budget": 300}),
        )
        .unwrap();
        assert!(service.create(&input).await);
        assert_eq!(
            sheet.rows(CATEGORIES_RANGE).await.last().unwrap(),
            &vec!["House", "Water", "300"]
        );

        // Nothing is validated.
        assert!(service.create(&NewBudget::default()).await);
        assert_eq!(
            sheet.rows(CATEGORIES_RANGE).await.last().unwrap(),
            &vec!["", "", ""]
        );
    }

    #[tokio::test]
    async fn test_create_failure() {
        let sheet = Arc::new(TestSheet::default());
        sheet.fail_appends(true);
        assert!(!service(sheet).create(&NewBudget::default()).await);
    }
}
