use crate::model::{
    cell_text, is_truthy, text_or_empty, Amount, Category, NewTransaction, Transaction,
    TransactionType,
};
use crate::service::{CreateError, MISSING_FIELDS};
use crate::store::RowStore;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, info};

/// Lists and appends transactions in the transactions range.
#[derive(Debug, Clone)]
pub struct TransactionService {
    store: RowStore,
    range: String,
}

impl TransactionService {
    pub fn new(store: RowStore, range: impl Into<String>) -> Self {
        Self {
            store,
            range: range.into(),
        }
    }

    /// Returns every transaction in sheet order. The first row is the header and is skipped. A
    /// range with no data rows, or a failed read, yields an empty list.
    pub async fn list(&self) -> Vec<Transaction> {
        let rows = self.store.read(&self.range).await;
        if rows.len() < 2 {
            return Vec::new();
        }
        rows.iter()
            .skip(1)
            .map(|row| Transaction::from_row(row.as_slice()))
            .collect()
    }

    /// Validates `input`, fills in defaults and appends the transaction, using today's UTC date
    /// when `date` is absent.
    pub async fn create(&self, input: NewTransaction) -> Result<Transaction, CreateError> {
        self.create_on(input, Utc::now().date_naive()).await
    }

    /// Same as `create`, with `today` as the default date.
    pub async fn create_on(
        &self,
        input: NewTransaction,
        today: NaiveDate,
    ) -> Result<Transaction, CreateError> {
        let transaction = build(input, today)?;
        if !self.store.append(&self.range, transaction.to_row()).await {
            return Err(CreateError::Upstream);
        }
        info!(
            "Added {} of {} on {}",
            transaction.kind(),
            transaction.amount(),
            transaction.date()
        );
        Ok(transaction)
    }
}

/// Turns request input into a `Transaction`, or explains why it cannot.
fn build(input: NewTransaction, today: NaiveDate) -> Result<Transaction, CreateError> {
    let amount = input.amount.filter(is_truthy);
    let category = input.category.filter(is_truthy);
    let kind = input.kind.filter(is_truthy);
    let (amount, category, kind) = match (amount, category, kind) {
        (Some(amount), Some(category), Some(kind)) => (amount, category, kind),
        _ => {
            debug!("Rejecting transaction with missing fields");
            return Err(CreateError::Validation(MISSING_FIELDS));
        }
    };
    let category = Category::from_str(&cell_text(&category))
        .map_err(|_| CreateError::Validation("Invalid category"))?;
    let kind = TransactionType::from_str(&cell_text(&kind))
        .map_err(|_| CreateError::Validation("Invalid type"))?;

    let date = match text_or_empty(input.date.as_ref()) {
        date if date.is_empty() => today.format("%Y-%m-%d").to_string(),
        date => date,
    };

    Ok(Transaction::new(
        date,
        amount_from_json(&amount),
        text_or_empty(input.description.as_ref()),
        category,
        kind,
        text_or_empty(input.sub_category.as_ref()),
    ))
}

fn amount_from_json(value: &Value) -> Amount {
    match value {
        Value::Number(n) => Amount::parse(&n.to_string()),
        Value::String(s) => Amount::parse(s),
        _ => Amount::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestSheet, TRANSACTIONS_RANGE};
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::sync::Arc;

    fn service(sheet: Arc<TestSheet>) -> TransactionService {
        TransactionService::new(RowStore::new(sheet), TRANSACTIONS_RANGE)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn input(value: Value) -> NewTransaction {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_list_seed() {
        let transactions = service(Arc::new(TestSheet::default())).list().await;
        assert_eq!(transactions.len(), 13);
        assert_eq!(transactions[0].date(), "2024-05-01");
        assert_eq!(transactions[0].sub_category(), "");
        assert_eq!(transactions[12].description(), "Internet");
    }

    #[tokio::test]
    async fn test_list_header_only_or_empty() {
        let header_only = TestSheet::with_rows(
            TRANSACTIONS_RANGE,
            vec![vec!["Date", "Amount", "Description", "Category", "Type", "SubCategory"]],
        );
        assert!(service(Arc::new(header_only)).list().await.is_empty());

        let empty = TestSheet::with_rows(TRANSACTIONS_RANGE, Vec::<Vec<&str>>::new());
        assert!(service(Arc::new(empty)).list().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_read_failure_is_empty() {
        let sheet = Arc::new(TestSheet::default());
        sheet.fail_reads(true);
        assert!(service(sheet).list().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_unparsable_amount() {
        let sheet = TestSheet::with_rows(
            TRANSACTIONS_RANGE,
            vec![
                vec!["Date", "Amount"],
                vec!["2024-06-01", "oops", "", "House", "Debit", "Rent"],
            ],
        );
        let transactions = service(Arc::new(sheet)).list().await;
        assert!(transactions[0].amount().is_nan());
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let sheet = Arc::new(TestSheet::default());
        let created = service(sheet.clone())
            .create_on(
                input(json!({"amount": 100, "category": "Personal", "type": "Credit"})),
                today(),
            )
            .await
            .unwrap();
        assert_eq!(created.date(), "2024-06-15");
        assert_eq!(created.description(), "");
        assert_eq!(created.sub_category(), "");
        assert_eq!(created.amount().value(), Some(Decimal::from(100)));

        let rows = sheet.rows(TRANSACTIONS_RANGE).await;
        assert_eq!(
            rows.last().unwrap(),
            &vec!["2024-06-15", "100", "", "Personal", "Credit", ""]
        );
    }

    #[tokio::test]
    async fn test_create_today_is_iso_date() {
        let created = service(Arc::new(TestSheet::default()))
            .create(input(json!({"amount": "5", "category": "House", "type": "Debit"})))
            .await
            .unwrap();
        let parsed = NaiveDate::parse_from_str(created.date(), "%Y-%m-%d").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d").to_string(), created.date());
    }

    #[tokio::test]
    async fn test_create_keeps_given_fields() {
        let created = service(Arc::new(TestSheet::default()))
            .create_on(
                input(json!({
                    "amount": "12.50",
                    "description": "Lunch",
                    "category": "Personal",
                    "type": "Debit",
                    "subCategory": "Eating Out",
                    "date": "2024-06-03"
                })),
                today(),
            )
            .await
            .unwrap();
        assert_eq!(created.date(), "2024-06-03");
        assert_eq!(created.description(), "Lunch");
        assert_eq!(created.sub_category(), "Eating Out");
        assert_eq!(created.amount().to_string(), "12.5");
    }

    #[tokio::test]
    async fn test_create_empty_date_defaults() {
        let created = service(Arc::new(TestSheet::default()))
            .create_on(
                input(json!({"amount": 1, "category": "House", "type": "Debit", "date": ""})),
                today(),
            )
            .await
            .unwrap();
        assert_eq!(created.date(), "2024-06-15");
    }

    #[tokio::test]
    async fn test_create_missing_fields() {
        let sheet = Arc::new(TestSheet::default());
        let service = service(sheet.clone());
        let cases = [
            json!({"category": "House", "type": "Debit"}),
            json!({"amount": 10, "type": "Debit"}),
            json!({"amount": 10, "category": "House"}),
            json!({"amount": 0, "category": "House", "type": "Debit"}),
            json!({"amount": "", "category": "House", "type": "Debit"}),
            json!({"amount": null, "category": "House", "type": "Debit"}),
            json!({"amount": 10, "category": "", "type": "Debit"}),
            json!({"amount": 10, "category": false, "type": "Debit"}),
            json!({"amount": 10, "category": "House", "type": 0}),
            json!({}),
        ];
        for case in cases {
            let result = service.create_on(input(case.clone()), today()).await;
            assert_eq!(
                result,
                Err(CreateError::Validation(MISSING_FIELDS)),
                "{case}"
            );
        }
        assert_eq!(sheet.rows(TRANSACTIONS_RANGE).await.len(), 14);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category_and_type() {
        let service = service(Arc::new(TestSheet::default()));
        let bad_category = service
            .create_on(
                input(json!({"amount": 1, "category": "Office", "type": "Debit"})),
                today(),
            )
            .await;
        assert!(matches!(bad_category, Err(CreateError::Validation(_))));

        let bad_type = service
            .create_on(
                input(json!({"amount": 1, "category": "House", "type": "Refund"})),
                today(),
            )
            .await;
        assert!(matches!(bad_type, Err(CreateError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_string_zero_is_present() {
        let created = service(Arc::new(TestSheet::default()))
            .create_on(
                input(json!({"amount": "0", "category": "House", "type": "Debit"})),
                today(),
            )
            .await
            .unwrap();
        assert!(created.amount().is_zero());
    }

    #[tokio::test]
    async fn test_create_upstream_failure() {
        let sheet = Arc::new(TestSheet::default());
        sheet.fail_appends(true);
        let result = service(sheet)
            .create_on(
                input(json!({"amount": 1, "category": "House", "type": "Debit"})),
                today(),
            )
            .await;
        assert_eq!(result, Err(CreateError::Upstream));
    }
}
