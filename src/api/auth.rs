//! Service account authentication for the Google Sheets API.
//!
//! The credential pair (client email and private key) is provided out of band. `yup-oauth2` signs
//! the JWT assertion, exchanges it for an access token and refreshes the token when it is close to
//! expiry.

use crate::api::OAUTH_SCOPES;
use crate::config::ServiceAccount;
use crate::Result;
use anyhow::Context;
use tracing::{debug, trace};
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Hands out valid access tokens for the service account.
pub(crate) struct TokenProvider {
    auth: DefaultAuthenticator,
}

impl TokenProvider {
    /// Builds an authenticator for `credentials`. No network traffic happens until the first call
    /// to `token`.
    pub(crate) async fn new(credentials: &ServiceAccount) -> Result<Self> {
        debug!(
            "Creating service account authenticator for {}",
            credentials.client_email()
        );
        let key = ServiceAccountKey {
            key_type: Some(String::from("service_account")),
            project_id: None,
            private_key_id: None,
            private_key: credentials.private_key().to_string(),
            client_email: credentials.client_email().to_string(),
            client_id: None,
            auth_uri: None,
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            auth_provider_x509_cert_url: None,
            client_x509_cert_url: None,
        };
        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .context("Failed to create the service account authenticator")?;
        Ok(Self { auth })
    }

    /// Returns a valid access token, fetching a new one if the cached token is missing or expired.
    pub(crate) async fn token(&self) -> Result<String> {
        trace!("Requesting access token");
        let token = self
            .auth
            .token(OAUTH_SCOPES)
            .await
            .context("Failed to get a service account access token")?;
        token
            .token()
            .map(str::to_string)
            .context("The token response did not contain an access token")
    }
}
