//! Insert command handlers.

use crate::args::{InsertBudgetArgs, InsertTransactionArgs};
use crate::client::ApiClient;
use crate::commands::Out;
use crate::model::{BudgetEntry, Transaction};
use crate::view::{render_budgets, BudgetForm, ExpenseForm};
use crate::Result;
use anyhow::Context;
use chrono::Utc;

/// Adds a transaction through the API.
///
/// The budgets are fetched first so that a debit can be checked against the known sub-categories
/// of its category, the same way the entry form offers them.
///
/// # Errors
/// - Returns an error if the input is incomplete or the server rejects it.
pub async fn insert_transaction(args: &InsertTransactionArgs) -> Result<Out<Transaction>> {
    let client = ApiClient::new(args.client().server())?;
    let budgets = client.categories().await?;

    let mut form = ExpenseForm::new(Utc::now().date_naive());
    form.set_kind(args.kind());
    form.set_category(args.category());
    form.set_amount(args.amount());
    if let Some(date) = args.date() {
        form.set_date(date);
    }
    if let Some(sub_category) = args.sub_category() {
        form.set_sub_category(sub_category);
    }
    if let Some(description) = args.description() {
        form.set_description(description);
    }

    let request = form.to_request(&budgets)?;
    let transaction = client
        .add_expense(&request)
        .await
        .context("Failed to add transaction")?;
    Ok(Out::new(
        format!(
            "Transaction added: {} {} on {}",
            transaction.kind(),
            transaction.amount(),
            transaction.date()
        ),
        transaction,
    ))
}

/// Adds a budget row through the API, then lists the budgets again.
///
/// # Errors
/// - Returns an error if the sub-category or budget is blank or the server rejects the row.
pub async fn insert_budget(args: &InsertBudgetArgs) -> Result<Out<Vec<BudgetEntry>>> {
    let client = ApiClient::new(args.client().server())?;

    let mut form = BudgetForm::new();
    form.set_category(args.category());
    form.set_sub_category(args.sub_category());
    form.set_budget(args.budget());
    let request = form
        .to_request()
        .context("A sub-category and a budget are required")?;

    client
        .add_category(&request)
        .await
        .context("Failed to save")?;

    let budgets = client.categories().await?;
    let view = render_budgets(&budgets, args.client().currency());
    Ok(Out::new("Category saved", budgets).with_view(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Sheet, CATEGORIES_RANGE, TRANSACTIONS_RANGE};
    use crate::model::{Category, TransactionType};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_insert_transaction() {
        let env = TestEnv::new().await;
        let args = InsertTransactionArgs::new("450", env.client_args())
            .with_category(Category::House)
            .with_sub_category("Wifi")
            .with_description("Router")
            .with_date("2024-06-30");
        let out = insert_transaction(&args).await.unwrap();
        let transaction = out.structure().unwrap();
        assert_eq!(transaction.sub_category(), "Wifi");

        let rows = env.sheet().get(TRANSACTIONS_RANGE).await.unwrap();
        assert_eq!(
            rows.last().unwrap(),
            &vec!["2024-06-30", "450", "Router", "House", "Debit", "Wifi"]
        );
    }

    #[tokio::test]
    async fn test_insert_transaction_needs_sub_category() {
        let env = TestEnv::new().await;
        let args = InsertTransactionArgs::new("450", env.client_args())
            .with_category(Category::House)
            .with_date("2024-06-30");
        let err = insert_transaction(&args).await.unwrap_err();
        assert!(err.to_string().starts_with("Select a sub-category of House"));
        let rows = env.sheet().get(TRANSACTIONS_RANGE).await.unwrap();
        assert_eq!(rows.len(), 14);
    }

    #[tokio::test]
    async fn test_insert_credit_without_sub_category() {
        let env = TestEnv::new().await;
        let args = InsertTransactionArgs::new("1200.5", env.client_args())
            .with_kind(TransactionType::Credit)
            .with_date("2024-06-30");
        let out = insert_transaction(&args).await.unwrap();
        assert_eq!(out.structure().unwrap().kind(), "Credit");
    }

    #[tokio::test]
    async fn test_insert_transaction_upstream_failure() {
        let env = TestEnv::new().await;
        env.sheet().fail_appends(true);
        let args = InsertTransactionArgs::new("1", env.client_args())
            .with_kind(TransactionType::Credit)
            .with_date("2024-06-30");
        let err = insert_transaction(&args).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to add transaction");
    }

    #[tokio::test]
    async fn test_insert_budget() {
        let env = TestEnv::new().await;
        let args = InsertBudgetArgs::new(Category::Personal, "Books", "800", env.client_args());
        let out = insert_budget(&args).await.unwrap();
        assert_eq!(out.message(), "Category saved");
        let budgets = out.structure().unwrap();
        assert_eq!(budgets.len(), 6);
        assert!(out.view().unwrap().contains("Books"));

        let rows = env.sheet().get(CATEGORIES_RANGE).await.unwrap();
        assert_eq!(rows.last().unwrap(), &vec!["Personal", "Books", "800"]);
    }

    #[tokio::test]
    async fn test_insert_budget_blank() {
        let env = TestEnv::new().await;
        let args = InsertBudgetArgs::new(Category::Personal, "", "800", env.client_args());
        assert!(insert_budget(&args).await.is_err());
    }
}
