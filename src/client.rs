//! An HTTP client for the expenses API, used by the terminal views.

use crate::model::{BudgetEntry, NewBudget, NewTransaction, Transaction};
use crate::server::{CATEGORIES_PATH, EXPENSES_PATH};
use crate::Result;
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

/// The default address of a locally running `expenses serve`.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Created {
    expense: Transaction,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    /// Creates a client for the API served at `base`, e.g. `http://127.0.0.1:3000`.
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("Invalid server URL '{base}'"))?;
        Ok(Self {
            base,
            http: reqwest::Client::new(),
        })
    }

    /// Fetches every transaction, in sheet order.
    pub async fn expenses(&self) -> Result<Vec<Transaction>> {
        self.get(EXPENSES_PATH).await
    }

    /// Fetches the budgets in effect.
    pub async fn categories(&self) -> Result<Vec<BudgetEntry>> {
        self.get(CATEGORIES_PATH).await
    }

    /// Adds a transaction and returns the record the server wrote.
    pub async fn add_expense(&self, input: &NewTransaction) -> Result<Transaction> {
        let created: Created = self.post(EXPENSES_PATH, input).await?;
        info!("Transaction added!");
        Ok(created.expense)
    }

    /// Adds a budget row.
    pub async fn add_category(&self, input: &NewBudget) -> Result<()> {
        let _: serde_json::Value = self.post(CATEGORIES_PATH, input).await?;
        info!("Category saved");
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("Unable to build a URL for {path}"))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        debug!("GET {url}");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Unable to reach {url}"))?;
        read(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path)?;
        debug!("POST {url}");
        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .with_context(|| format!("Unable to reach {url}"))?;
        read(response).await
    }
}

/// Decodes a successful response, or turns the server's `{error}` body into an error.
async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .context("Unable to read the response body")?;
    if !status.is_success() {
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => bail!("{} ({status})", body.error),
            Err(_) => bail!("Request failed ({status})"),
        }
    }
    serde_json::from_str(&text).with_context(|| format!("Unexpected response: {text}"))
}
