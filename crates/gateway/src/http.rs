//! HTTP implementation of the [`Gateway`] trait.
//!
//! POSTs each procedure call to the configured RPC endpoint with the
//! credential bundle merged into the JSON body. One pooled
//! [`reqwest::Client`] per gateway, one attempt per call.

use async_trait::async_trait;
use atelier_core::config::GatewayConfig;
use atelier_core::types::AppCredentials;

use crate::params::merge_credentials;
use crate::response::RpcResponse;
use crate::{Gateway, GatewayError};

/// Production gateway client.
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
    credentials: AppCredentials,
}

impl HttpGateway {
    /// Build a gateway with a pooled HTTP client honoring the
    /// configured request timeout.
    pub fn new(config: GatewayConfig, credentials: AppCredentials) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GatewayError::Http`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn call(
        &self,
        procedure: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let body = merge_credentials(params, &self.credentials);
        let url = self.config.rpc_url(procedure);

        tracing::debug!(procedure, %url, "Calling gateway procedure");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.credentials.app_user_token)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let rpc: RpcResponse<serde_json::Value> = response.json().await?;
        rpc.into_result()
    }
}
