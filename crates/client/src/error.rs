use atelier_gateway::GatewayError;

/// Errors surfaced by the client façade.
///
/// Two classes: local validation failures raised before any network
/// call, and gateway failures forwarded as-is.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The requested service name has no exact match in the catalog.
    /// Raised locally; no remote call is made.
    #[error("Invalid model name: {0}")]
    InvalidServiceName(String),

    /// A gateway call failed. Backend error payloads are carried
    /// verbatim inside [`GatewayError::Backend`].
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The job configuration could not be serialized.
    #[error("Failed to serialize job config: {0}")]
    Serialize(#[from] serde_json::Error),
}
