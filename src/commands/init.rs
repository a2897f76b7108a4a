use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its secrets directory and:
/// - Creates an initial `config.json` file using `sheet_url` along with default settings
/// - Moves `service_account`, if given, into its default location in the data dir.
///
/// # Arguments
/// - `expenses_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/expenses`
/// - `service_account` - The downloaded service account JSON key.
/// - `sheet_url` - The URL of the Google Sheet that holds the transactions and budgets.
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(
    expenses_home: &Path,
    service_account: Option<&Path>,
    sheet_url: &str,
) -> Result<Out<()>> {
    let config = Config::create(expenses_home, service_account, sheet_url)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the expenses directory and config at {}",
        config.config_path().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses");
        let out = init(&home, None, "https://docs.google.com/spreadsheets/d/abc/edit")
            .await
            .unwrap();
        assert!(out.message().contains("config.json"));
        assert!(home.join("config.json").is_file());
        assert!(Config::load(&home).await.is_ok());
    }
}
