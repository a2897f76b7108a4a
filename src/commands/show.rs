use crate::args::{ClientArgs, DashboardArgs};
use crate::client::ApiClient;
use crate::commands::Out;
use crate::model::BudgetEntry;
use crate::report::Report;
use crate::view::{current_month, render_budgets, Dashboard};
use crate::Result;
use chrono::Utc;

/// Fetches transactions and budgets from the API and renders the dashboard for a month.
pub async fn dashboard(args: &DashboardArgs) -> Result<Out<Report>> {
    let client = ApiClient::new(args.client().server())?;
    let month = match args.month() {
        Some(month) => month.to_string(),
        None => current_month(Utc::now()),
    };
    let (transactions, budgets) = tokio::try_join!(client.expenses(), client.categories())?;
    let dashboard = Dashboard::new(&transactions, &budgets, &month, args.client().currency());
    let view = dashboard.render();
    Ok(Out::new(
        format!(
            "Showing {} of {} transactions for {month}",
            dashboard.report().transactions().len(),
            transactions.len()
        ),
        dashboard.report().clone(),
    )
    .with_view(view))
}

/// Fetches and lists the budgets in effect.
pub async fn budgets(args: &ClientArgs) -> Result<Out<Vec<BudgetEntry>>> {
    let client = ApiClient::new(args.server())?;
    let budgets = client.categories().await?;
    let view = render_budgets(&budgets, args.currency());
    Ok(Out::new(format!("Found {} budgets", budgets.len()), budgets).with_view(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_dashboard_for_month() {
        let env = TestEnv::new().await;
        let args = DashboardArgs::new(Some("2024-06".to_string()), env.client_args());
        let out = dashboard(&args).await.unwrap();
        assert_eq!(out.message(), "Showing 9 of 13 transactions for 2024-06");

        let report = out.structure().unwrap();
        assert_eq!(report.total_income().fixed(2), "88500.00");
        assert_eq!(report.total_expense().fixed(2), "22820.00");
        assert_eq!(report.spent("House|Groceries").fixed(2), "4201.00");

        let view = out.view().unwrap();
        assert!(view.contains("Dashboard (2024-06)"));
        assert!(view.contains("Income   $88500.00"));
        assert!(view.contains("HOUSE"));
    }

    #[tokio::test]
    async fn test_dashboard_empty_month() {
        let env = TestEnv::new().await;
        let args = DashboardArgs::new(Some("1999-01".to_string()), env.client_args());
        let out = dashboard(&args).await.unwrap();
        let report = out.structure().unwrap();
        assert!(report.transactions().is_empty());
        assert!(report.total_expense().is_zero());
        assert!(out.view().unwrap().contains("No transactions in this month."));
    }

    #[tokio::test]
    async fn test_budgets() {
        let env = TestEnv::new().await;
        let out = budgets(&env.client_args()).await.unwrap();
        assert_eq!(out.message(), "Found 5 budgets");
        assert!(out.view().unwrap().contains("Current Budgets"));
    }

    #[tokio::test]
    async fn test_no_server() {
        let args = ClientArgs::new("http://127.0.0.1:9", "$");
        assert!(budgets(&args).await.is_err());
    }
}
