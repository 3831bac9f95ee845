//! Remote Procedure Gateway client.
//!
//! The backend exposes named procedures over an authenticated HTTP
//! endpoint; every operation of the SDK is one generic
//! [`Gateway::call`] with a fixed procedure name and a parameter
//! mapping. [`http::HttpGateway`] is the production implementation;
//! tests substitute a stub through the same trait.

pub mod http;
pub mod params;
pub mod procedures;
pub mod response;

use async_trait::async_trait;

/// Errors from the gateway layer.
///
/// `Backend` carries the backend's error payload verbatim — the client
/// does not reinterpret backend error codes.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Gateway error ({status}): {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The procedure reported an error in the uniform `(data, error)`
    /// result pair. The payload is forwarded unchanged.
    #[error("Backend error: {0}")]
    Backend(serde_json::Value),

    /// The procedure succeeded but its data payload did not match the
    /// expected shape.
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The procedure returned neither data nor an error.
    #[error("Backend returned an empty result")]
    EmptyResponse,
}

/// Generic remote-procedure call interface.
///
/// One network attempt per call; no retry, backoff, or operation-level
/// timeout beyond the transport's own. Implementations merge the
/// client's credentials into `params` before sending.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Invoke a named procedure with a parameter mapping and return its
    /// data payload.
    async fn call(
        &self,
        procedure: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError>;
}
