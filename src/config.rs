//! Configuration file handling for the expenses app.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json` and holds the Google Sheet
//! URL, the ranges to read and append, the address the API listens on, and where the service
//! account key lives. Credentials and the spreadsheet id can also be supplied through the
//! environment, which takes precedence over the files.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const SERVICE_ACCOUNT_JSON: &str = "service_account.json";
const CONFIG_JSON: &str = "config.json";

/// The address `expenses serve` binds to unless configured otherwise.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Service account email. Used together with `PRIVATE_KEY_ENV` instead of the key file.
pub const SERVICE_ACCOUNT_EMAIL_ENV: &str = "GOOGLE_SERVICE_ACCOUNT_EMAIL";

/// Service account private key in PEM form. Literal `\n` sequences are turned into newlines.
pub const PRIVATE_KEY_ENV: &str = "GOOGLE_PRIVATE_KEY";

/// Overrides the spreadsheet id found in `sheet_url`.
pub const SHEET_ID_ENV: &str = "GOOGLE_SHEET_ID";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME` and from there it loads `$EXPENSES_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    spreadsheet_id: String,
}

impl Config {
    /// Creates the data directory and its secrets directory, then:
    /// - Creates an initial `config.json` file using `sheet_url` along with default settings
    /// - Moves `service_account_file`, if given, into its default location in the data dir.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/expenses`
    /// - `service_account_file` - The downloaded service account JSON key. Leave it out when the
    ///   credentials come from `GOOGLE_SERVICE_ACCOUNT_EMAIL` and `GOOGLE_PRIVATE_KEY`.
    /// - `sheet_url` - The URL of the Google Sheet, e.g.
    ///   https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or the URL holds no spreadsheet id.
    pub async fn create(
        dir: impl Into<PathBuf>,
        service_account_file: Option<&Path>,
        sheet_url: &str,
    ) -> Result<Self> {
        let spreadsheet_id = extract_spreadsheet_id(sheet_url)
            .context("Failed to extract spreadsheet ID from sheet URL")?
            .to_string();

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expenses home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets_dir = root.join(SECRETS);
        utils::make_dir(&secrets_dir).await?;

        if let Some(source) = service_account_file {
            let destination = secrets_dir.join(SERVICE_ACCOUNT_JSON);
            utils::rename(source, &destination).await?;
            utils::restrict_permissions(&destination)?;
        }

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            sheet_url: sheet_url.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets: secrets_dir,
            config_path,
            config_file,
            spreadsheet_id,
        })
    }

    /// This will
    /// - validate that `expenses_home` and its config file exist
    /// - load the config file
    /// - resolve the spreadsheet id, preferring `GOOGLE_SHEET_ID`
    pub async fn load(expenses_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = expenses_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The expenses home is missing, run `expenses init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let spreadsheet_id = match non_empty_env(SHEET_ID_ENV) {
            Some(id) => {
                debug!("Using the spreadsheet id from {SHEET_ID_ENV}");
                id
            }
            None => extract_spreadsheet_id(&config_file.sheet_url)
                .context("Failed to extract spreadsheet ID from sheet URL")?
                .to_string(),
        };

        Ok(Self {
            secrets: root.join(SECRETS),
            root,
            config_path,
            config_file,
            spreadsheet_id,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn sheet_url(&self) -> &str {
        &self.config_file.sheet_url
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn transactions_range(&self) -> &str {
        &self.config_file.transactions_range
    }

    pub fn categories_range(&self) -> &str {
        &self.config_file.categories_range
    }

    pub fn bind(&self) -> &str {
        &self.config_file.bind
    }

    /// Returns the stored `service_account_path` if it is absolute, otherwise resolves it against
    /// the expenses home.
    pub fn service_account_path(&self) -> PathBuf {
        let p = self.config_file.service_account_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    /// The service account to authenticate as. The environment pair wins over the key file.
    pub async fn credentials(&self) -> Result<ServiceAccount> {
        if let Some(account) = ServiceAccount::from_parts(
            non_empty_env(SERVICE_ACCOUNT_EMAIL_ENV),
            non_empty_env(PRIVATE_KEY_ENV),
        ) {
            debug!("Using service account credentials from the environment");
            return Ok(account);
        }
        let path = self.service_account_path();
        if !path.is_file() {
            bail!(
                "No service account credentials: set {SERVICE_ACCOUNT_EMAIL_ENV} and \
                {PRIVATE_KEY_ENV}, or place the key file at '{}'",
                path.display()
            );
        }
        utils::deserialize(&path).await
    }
}

/// A Google service account: the email it acts as and its PEM private key.
#[derive(Clone, Eq, PartialEq, Deserialize)]
pub struct ServiceAccount {
    client_email: String,
    private_key: String,
}

impl ServiceAccount {
    pub fn new(client_email: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            client_email: client_email.into(),
            private_key: private_key.into(),
        }
    }

    /// Builds an account from an email and a key as found in the environment, where newlines in
    /// the key are commonly written as a literal `\n`. Both parts are required.
    fn from_parts(email: Option<String>, key: Option<String>) -> Option<Self> {
        match (email, key) {
            (Some(email), Some(key)) => Some(Self::new(email, key.replace("\\n", "\n"))),
            _ => None,
        }
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl Debug for ServiceAccount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expenses",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
///   "transactions_range": "Sheet1!A:F",
///   "categories_range": "Categories!A:C",
///   "bind": "127.0.0.1:3000",
///   "service_account_path": ".secrets/service_account.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL to the Google Sheet
    sheet_url: String,

    /// The range holding transactions, header row included
    #[serde(default = "default_transactions_range")]
    transactions_range: String,

    /// The range holding budgets, header row included
    #[serde(default = "default_categories_range")]
    categories_range: String,

    /// The address the API listens on
    #[serde(default = "default_bind")]
    bind: String,

    /// Path to the service account key (optional, relative to the expenses home or absolute).
    /// Defaults to $EXPENSES_HOME/.secrets/service_account.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    service_account_path: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: String::new(),
            transactions_range: default_transactions_range(),
            categories_range: default_categories_range(),
            bind: default_bind(),
            service_account_path: None,
        }
    }
}

fn default_transactions_range() -> String {
    crate::api::TRANSACTIONS_RANGE.to_string()
}

fn default_categories_range() -> String {
    crate::api::CATEGORIES_RANGE.to_string()
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and checks that it belongs to this app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: ConfigFile = utils::deserialize(path.as_ref()).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the service account key path. Relative paths are relative to the expenses home.
    fn service_account_path(&self) -> PathBuf {
        self.service_account_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(SERVICE_ACCOUNT_JSON))
    }
}

/// Extracts the spreadsheet ID from a Google Sheets URL
///
/// # Arguments
/// * `url` - The Google Sheets URL (e.g., "https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...")
///
/// # Returns
/// The spreadsheet ID or an error if the URL format is invalid. Returns an empty string if the URL
/// is empty, which is how a config that relies on `GOOGLE_SHEET_ID` looks.
fn extract_spreadsheet_id(url: &str) -> Result<&str> {
    if url.is_empty() {
        return Ok(url);
    }

    let parts: Vec<&str> = url.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "d" && i + 1 < parts.len() {
            let id_part = parts[i + 1];
            let id = id_part
                .split(['?', '#'])
                .next()
                .unwrap_or(id_part);
            return Ok(id);
        }
    }
    Err(anyhow::anyhow!(
        "Invalid Google Sheets URL format. Expected: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
    ))
}
