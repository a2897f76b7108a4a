//! Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet.

use crate::api::{Sheet, TokenProvider};
use crate::Result;
use anyhow::Context;
use sheets::types::{
    DateTimeRenderOption, Dimension, InsertDataOption, ValueInputOption, ValueRange,
    ValueRenderOption,
};
use sheets::ClientError;
use tracing::trace;

/// Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet. It
/// takes a `TokenProvider` and asks it for a token before each call, which keeps the token fresh.
pub(crate) struct GoogleSheet {
    spreadsheet_id: String,
    token_provider: TokenProvider,
}

impl GoogleSheet {
    pub(crate) fn new(spreadsheet_id: impl Into<String>, token_provider: TokenProvider) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            token_provider,
        }
    }

    /// Creates a sheets client carrying a valid access token.
    async fn client(&self) -> Result<sheets::Client> {
        let access_token = self.token_provider.token().await?;

        // The sheets crate wants OAuth client settings, but API calls only need the access token.
        Ok(sheets::Client::new(
            String::new(), // client_id
            String::new(), // client_secret
            String::new(), // redirect_uri
            access_token,
            String::new(), // refresh_token, the TokenProvider handles refresh
        ))
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn get(&self, range: &str) -> Result<Vec<Vec<String>>> {
        trace!("get for {range}");
        let response = self
            .client()
            .await?
            .spreadsheets()
            .values_get(
                &self.spreadsheet_id,
                range,
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to fetch {range}"))?;
        Ok(response.body.values)
    }

    async fn append(&self, range: &str, row: Vec<String>) -> Result<()> {
        trace!("append to {range}");
        let body = ValueRange {
            major_dimension: Some(Dimension::Rows),
            range: range.to_string(),
            values: vec![row],
        };
        self.client()
            .await?
            .spreadsheets()
            .values_append(
                &self.spreadsheet_id,
                range,
                false,
                InsertDataOption::InsertRows,
                DateTimeRenderOption::FormattedString,
                ValueRenderOption::FormattedValue,
                ValueInputOption::UserEntered,
                &body,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to append a row to {range}"))?;
        Ok(())
    }
}

fn map_client_error(e: ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::Error::new(e).context(error_name)
}
