//! OAuth client-credentials token acquisition.

use crate::config::ConfigResolver;
use crate::http::TracedClient;
use crate::result::{VerificarError, VerificarResult};
use uuid::Uuid;

/// Token endpoint path on the auth broker
pub const TOKEN_ENDPOINT: &str = "/attain-auth-broker/v1/token";

const DEFAULT_REALM: &str = "attain-poc";
const DEFAULT_SCOPE: &str = "openid";

/// Credentials for the client-credentials grant.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Broker realm
    pub realm: String,
    /// Requested scope
    pub scope: String,
}

impl ClientCredentials {
    /// Read credentials from configuration.
    ///
    /// `CLIENT_ID` and `CLIENT_SECRET` come from the resolver; realm and
    /// scope fall back to the broker defaults.
    #[must_use]
    pub fn from_config(config: &ConfigResolver) -> Self {
        Self {
            client_id: config.resolve("CLIENT_ID"),
            client_secret: config.resolve("CLIENT_SECRET"),
            realm: config.resolve_or("REALM", DEFAULT_REALM),
            scope: config.resolve_or("SCOPE", DEFAULT_SCOPE),
        }
    }
}

/// Client for the auth broker's token endpoint.
#[derive(Debug, Clone)]
pub struct TokenBroker {
    client: TracedClient,
    base_url: String,
}

impl TokenBroker {
    /// Broker rooted at a base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: TracedClient::new(),
            base_url: base_url.into(),
        }
    }

    /// Exchange client credentials for a bearer header value.
    ///
    /// Each request carries a fresh `x-clientrefid` so broker-side logs can
    /// be correlated with the suite run.
    ///
    /// # Errors
    ///
    /// Returns [`VerificarError::Api`] on a non-2xx broker response and
    /// [`VerificarError::Token`] when the response carries no usable
    /// access token.
    pub async fn bearer_token(&self, credentials: &ClientCredentials) -> VerificarResult<String> {
        let url = format!("{}{TOKEN_ENDPOINT}", self.base_url);
        let reference = Uuid::new_v4().to_string();

        let response = self
            .client
            .post_form(
                &url,
                &[("x-clientrefid", reference.as_str())],
                &[
                    ("client_id", credentials.client_id.as_str()),
                    ("client_secret", credentials.client_secret.as_str()),
                    ("grant_type", "client_credentials"),
                    ("realm", credentials.realm.as_str()),
                    ("protocol", "openid-connect"),
                    ("scope", credentials.scope.as_str()),
                ],
            )
            .await?;

        if !response.is_success() {
            return Err(VerificarError::Api {
                status: response.status(),
                body: response.body().to_string(),
            });
        }

        bearer_from_json(&response.json()?)
    }
}

/// Lift the access token out of a broker response body
pub(crate) fn bearer_from_json(body: &serde_json::Value) -> VerificarResult<String> {
    body.get("access_token")
        .and_then(serde_json::Value::as_str)
        .filter(|token| !token.is_empty())
        .map(|token| format!("Bearer {token}"))
        .ok_or_else(|| VerificarError::Token {
            message: "response carries no access_token".to_string(),
        })
}
