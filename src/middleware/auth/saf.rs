use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SafConfig;
use crate::error::IdentityError;

/// Raw response from the identity service
#[derive(Debug, Clone)]
pub struct SafHttpResponse {
    pub status: u16,
    pub body: String,
}

/// Transport seam for the identity service, mockable in tests.
/// `Err` means a transport-level failure, never an HTTP status.
#[async_trait]
pub trait SafTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<SafHttpResponse, IdentityError>;
}

/// reqwest-backed transport with a bounded timeout
pub struct RestSafTransport {
    client: reqwest::Client,
}

impl RestSafTransport {
    pub fn new(timeout_seconds: u64) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SafTransport for RestSafTransport {
    async fn post_json(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<SafHttpResponse, IdentityError> {
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        Ok(SafHttpResponse { status, body })
    }
}

#[derive(Debug, Serialize)]
struct AuthenticateRequest<'a> {
    username: &'a str,
    pass: &'a str,
    applid: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
    applid: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthenticateResponse {
    token: Option<String>,
}

/// Client of the remote SAF service: exchanges a username/credential for a
/// mainframe identity token and verifies such tokens
pub struct MainframeIdentityProvider {
    config: SafConfig,
    transport: Arc<dyn SafTransport>,
}

impl MainframeIdentityProvider {
    pub fn new(config: SafConfig, transport: Arc<dyn SafTransport>) -> Self {
        Self { config, transport }
    }

    /// Build a provider with the default reqwest transport
    pub fn with_rest_transport(config: SafConfig) -> Result<Self, IdentityError> {
        let transport = Arc::new(RestSafTransport::new(config.timeout_seconds)?);
        Ok(Self::new(config, transport))
    }

    /// Exchange a username and credential for a mainframe identity token
    pub async fn generate(
        &self,
        username: &str,
        credential: &str,
        applid: &str,
    ) -> Result<String, IdentityError> {
        let body = serde_json::to_value(AuthenticateRequest {
            username,
            pass: credential,
            applid,
        })
        .map_err(|e| IdentityError::Integration(e.to_string()))?;

        let response = self
            .transport
            .post_json(&self.config.authenticate_url, body)
            .await
            .map_err(|e| match e {
                IdentityError::Transport(msg) => IdentityError::Integration(msg),
                other => other,
            })?;

        match response.status {
            200 | 201 => {
                let parsed: AuthenticateResponse = serde_json::from_str(&response.body)
                    .map_err(|_| {
                        IdentityError::Integration("unparseable identity response".to_string())
                    })?;
                parsed.token.ok_or_else(|| {
                    IdentityError::Integration("identity response is missing token".to_string())
                })
            }
            401 | 403 => Err(IdentityError::AuthRejected),
            status if status >= 500 => Err(IdentityError::Integration(format!(
                "identity service returned {status}"
            ))),
            status => Err(IdentityError::Integration(format!(
                "unexpected identity service status {status}"
            ))),
        }
    }

    /// Verify a mainframe identity token.
    ///
    /// An empty token is invalid without a network call. 401/403 and
    /// transport failures mean "invalid"; a 5xx means the service itself is
    /// broken and is surfaced as an integration error.
    pub async fn verify(&self, token: &str, applid: &str) -> Result<bool, IdentityError> {
        if token.is_empty() {
            return Ok(false);
        }

        let body = serde_json::to_value(VerifyRequest { token, applid })
            .map_err(|e| IdentityError::Integration(e.to_string()))?;

        let response = match self.transport.post_json(&self.config.verify_url, body).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Identity token verification transport failure: {}", err);
                return Ok(false);
            }
        };

        match response.status {
            status if (200..300).contains(&status) => Ok(true),
            status if status >= 500 => Err(IdentityError::Integration(format!(
                "identity service returned {status}"
            ))),
            _ => Ok(false),
        }
    }
}
