//! The client façade.
//!
//! [`Client::connect`] establishes the credential context, fetches the
//! service catalog once, and hands back a handle for job submission,
//! result subscription, and the thin account wrappers.

use std::sync::Arc;

use atelier_core::config::{GatewayConfig, RelayConfig};
use atelier_core::job::JobConfig;
use atelier_core::types::{
    AppCredentials, CreditBalance, JobHistoryEntry, JobId, Service, WorkerFilter,
};
use atelier_gateway::http::HttpGateway;
use atelier_gateway::{procedures, Gateway};
use atelier_relay::channels::{job_channel, RESULT_EVENT};
use atelier_relay::subscriber::{RelaySubscriber, Subscription};

use crate::catalog::ServiceCatalog;
use crate::error::ClientError;

/// Endpoint configuration for both external services.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub gateway: GatewayConfig,
    pub relay: RelayConfig,
}

impl ClientConfig {
    /// Load both endpoint configurations from environment variables.
    pub fn from_env() -> Self {
        Self {
            gateway: GatewayConfig::from_env(),
            relay: RelayConfig::from_env(),
        }
    }
}

/// Application-layer client for the hosted job-dispatch API.
pub struct Client {
    gateway: Arc<dyn Gateway>,
    catalog: ServiceCatalog,
    worker_filter: WorkerFilter,
    relay: RelaySubscriber,
}

impl Client {
    /// Construct a client and fetch the service catalog.
    ///
    /// A failed initial fetch is logged and leaves the catalog empty;
    /// it does not fail construction. Call
    /// [`refresh_services`](Self::refresh_services) to retry.
    pub async fn connect(
        config: ClientConfig,
        credentials: AppCredentials,
        worker_filter: Option<WorkerFilter>,
    ) -> Result<Self, ClientError> {
        let gateway = Arc::new(HttpGateway::new(config.gateway, credentials)?);
        Ok(Self::with_gateway(gateway, config.relay, worker_filter).await)
    }

    /// Construct a client over an existing gateway implementation.
    ///
    /// This is the seam tests use to substitute a stub backend; the
    /// gateway is responsible for attaching credentials.
    pub async fn with_gateway(
        gateway: Arc<dyn Gateway>,
        relay: RelayConfig,
        worker_filter: Option<WorkerFilter>,
    ) -> Self {
        let client = Self {
            gateway,
            catalog: ServiceCatalog::new(),
            worker_filter: worker_filter.unwrap_or_else(WorkerFilter::prod),
            relay: RelaySubscriber::new(relay),
        };

        if let Err(e) = client.refresh_services().await {
            tracing::warn!(
                error = %e,
                "Initial service catalog fetch failed; starting with an empty catalog",
            );
        }

        client
    }

    /// Re-fetch the service catalog, replacing the current list.
    pub async fn refresh_services(&self) -> Result<(), ClientError> {
        let services = procedures::get_services(self.gateway.as_ref()).await?;
        tracing::debug!(count = services.len(), "Service catalog refreshed");
        self.catalog.replace(services);
        Ok(())
    }

    /// Snapshot of the current service catalog.
    pub fn services(&self) -> Arc<Vec<Service>> {
        self.catalog.snapshot()
    }

    /// Submit a job against a service named in the catalog.
    ///
    /// The name must exactly match a catalog entry; a miss fails
    /// locally without any remote call. On a hit, the configuration is
    /// serialized and one job-creation call is made with the resolved
    /// service id and the client's worker filter. Backend errors come
    /// back verbatim inside the error.
    pub async fn submit(
        &self,
        service_name: &str,
        config: &JobConfig,
    ) -> Result<JobId, ClientError> {
        let service = self
            .catalog
            .find_by_name(service_name)
            .ok_or_else(|| ClientError::InvalidServiceName(service_name.to_string()))?;

        let wire_config = config.to_wire()?;
        let job_id = procedures::post_job(
            self.gateway.as_ref(),
            &service.id,
            &wire_config,
            &self.worker_filter,
        )
        .await?;

        tracing::info!(service_id = %service.id, job_id = %job_id, "Job submitted");
        Ok(job_id)
    }

    /// Bind `callback` to the `result` event on the job's channel.
    ///
    /// The callback fires on the relay's delivery schedule with
    /// whatever payload the backend published. If no result is ever
    /// published, the callback is never invoked; use the returned
    /// [`Subscription`] (or [`shutdown`](Self::shutdown)) to release
    /// the binding.
    pub fn subscribe_to_result(
        &self,
        job_id: &JobId,
        callback: impl Fn(serde_json::Value) + Send + Sync + 'static,
    ) -> Subscription {
        self.relay
            .subscribe(&job_channel(job_id.as_str()), RESULT_EVENT, callback)
    }

    /// Round-trip a message through the backend.
    pub async fn echo(&self, message: &str) -> Result<String, ClientError> {
        Ok(procedures::echo(self.gateway.as_ref(), message).await?)
    }

    /// Remaining credit balance for the app user.
    pub async fn credits(&self) -> Result<CreditBalance, ClientError> {
        Ok(procedures::get_credits(self.gateway.as_ref()).await?)
    }

    /// One page of the app user's job history.
    pub async fn job_history(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<JobHistoryEntry>, ClientError> {
        Ok(procedures::get_job_history(self.gateway.as_ref(), limit, offset).await?)
    }

    /// Dispose the relay connection and its subscriptions.
    pub async fn shutdown(&self) {
        self.relay.shutdown().await;
    }
}
