//! Client configuration.
//!
//! Both endpoints are injected at construction rather than compiled
//! into the client, so the backend and relay are replaceable without
//! rebuilding. `from_env()` constructors exist for convenience; all
//! values can equally be supplied directly.

/// Default path of the remote-procedure endpoint under the gateway base
/// URL.
pub const DEFAULT_RPC_PATH: &str = "/rest/v1/rpc";

/// Default HTTP request timeout for gateway calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Domain the relay WebSocket host is derived from when no explicit
/// host override is configured.
pub const DEFAULT_RELAY_DOMAIN: &str = "pusher.com";

/// Configuration for the Remote Procedure Gateway client.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Path of the RPC endpoint under `base_url`.
    pub rpc_path: String,
    /// Publishable API key sent with every request.
    pub anon_key: String,
    /// Per-request timeout in seconds. One attempt per call, no retry.
    pub request_timeout_secs: u64,
}

impl GatewayConfig {
    /// Create a configuration with the default RPC path and timeout.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            rpc_path: DEFAULT_RPC_PATH.to_string(),
            anon_key: anon_key.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                        | Default         |
    /// |--------------------------------|-----------------|
    /// | `ATELIER_GATEWAY_URL`          | (required)      |
    /// | `ATELIER_GATEWAY_KEY`          | (required)      |
    /// | `ATELIER_RPC_PATH`             | `/rest/v1/rpc`  |
    /// | `ATELIER_REQUEST_TIMEOUT_SECS` | `30`            |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("ATELIER_GATEWAY_URL").expect("ATELIER_GATEWAY_URL must be set");
        let anon_key =
            std::env::var("ATELIER_GATEWAY_KEY").expect("ATELIER_GATEWAY_KEY must be set");
        let rpc_path =
            std::env::var("ATELIER_RPC_PATH").unwrap_or_else(|_| DEFAULT_RPC_PATH.into());
        let request_timeout_secs: u64 = std::env::var("ATELIER_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse()
            .expect("ATELIER_REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            rpc_path,
            anon_key,
            request_timeout_secs,
        }
    }

    /// Full URL of a named procedure on the RPC endpoint.
    pub fn rpc_url(&self, procedure: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.rpc_path.trim_matches('/'),
            procedure,
        )
    }
}

/// Configuration for the Push Notification Relay client.
///
/// The application key and geographic cluster are fixed for the whole
/// client, not per subscription.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Relay application key, part of the WebSocket URL.
    pub app_key: String,
    /// Geographic cluster, e.g. `mt1` or `eu`.
    pub cluster: String,
    /// Explicit WebSocket host override. When `None`, the host is
    /// derived as `ws-<cluster>.pusher.com`.
    pub host: Option<String>,
}

impl RelayConfig {
    /// Create a configuration with the host derived from the cluster.
    pub fn new(app_key: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            cluster: cluster.into(),
            host: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Default           |
    /// |-------------------------|-------------------|
    /// | `ATELIER_RELAY_KEY`     | (required)        |
    /// | `ATELIER_RELAY_CLUSTER` | `mt1`             |
    /// | `ATELIER_RELAY_HOST`    | derived from cluster |
    pub fn from_env() -> Self {
        let app_key = std::env::var("ATELIER_RELAY_KEY").expect("ATELIER_RELAY_KEY must be set");
        let cluster = std::env::var("ATELIER_RELAY_CLUSTER").unwrap_or_else(|_| "mt1".into());
        let host = std::env::var("ATELIER_RELAY_HOST").ok();

        Self {
            app_key,
            cluster,
            host,
        }
    }

    /// The WebSocket URL used for the relay connection handshake.
    pub fn ws_url(&self) -> String {
        let host = match &self.host {
            Some(host) => host.clone(),
            None => format!("ws-{}.{}", self.cluster, DEFAULT_RELAY_DOMAIN),
        };
        format!("wss://{}/app/{}?protocol=7", host, self.app_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_url_joins_base_path_and_procedure() {
        let config = GatewayConfig::new("https://api.example.com", "anon");
        assert_eq!(
            config.rpc_url("app_user_echo"),
            "https://api.example.com/rest/v1/rpc/app_user_echo"
        );
    }

    #[test]
    fn rpc_url_tolerates_trailing_slash() {
        let config = GatewayConfig::new("https://api.example.com/", "anon");
        assert_eq!(
            config.rpc_url("app_user_get_services"),
            "https://api.example.com/rest/v1/rpc/app_user_get_services"
        );
    }

    #[test]
    fn ws_url_derives_host_from_cluster() {
        let config = RelayConfig::new("key-1", "eu");
        assert_eq!(config.ws_url(), "wss://ws-eu.pusher.com/app/key-1?protocol=7");
    }

    #[test]
    fn ws_url_honors_host_override() {
        let mut config = RelayConfig::new("key-1", "eu");
        config.host = Some("relay.internal:6001".to_string());
        assert_eq!(
            config.ws_url(),
            "wss://relay.internal:6001/app/key-1?protocol=7"
        );
    }
}
