//! Known backend procedures and their typed wrappers.
//!
//! Each wrapper is a thin shaping layer over [`Gateway::call`]: it
//! fixes the procedure name, maps its call-specific parameters, and
//! decodes the data payload. Nothing here retries or reinterprets
//! backend errors.

use atelier_core::types::{CreditBalance, JobHistoryEntry, JobId, Service, WorkerFilter};

use crate::{Gateway, GatewayError};

/// List the services the app user is entitled to use.
pub const GET_SERVICES: &str = "app_user_get_services";
/// Round-trip a message through the backend (connectivity test).
pub const ECHO: &str = "app_user_echo";
/// Fetch the app user's remaining credit balance.
pub const GET_CREDITS: &str = "app_user_get_credits";
/// Fetch a page of the app user's job history.
pub const GET_JOB_HISTORY: &str = "app_user_get_job_history_detail";
/// Create a job against a service.
pub const POST_JOB: &str = "app_owner_post_job_admin";

/// Fetch the service catalog.
pub async fn get_services(gateway: &dyn Gateway) -> Result<Vec<Service>, GatewayError> {
    let data = gateway.call(GET_SERVICES, serde_json::json!({})).await?;
    Ok(serde_json::from_value(data)?)
}

/// Echo a message through the backend.
pub async fn echo(gateway: &dyn Gateway, message: &str) -> Result<String, GatewayError> {
    let data = gateway
        .call(ECHO, serde_json::json!({ "message_app_user": message }))
        .await?;
    Ok(serde_json::from_value(data)?)
}

/// Fetch the remaining credit balance.
pub async fn get_credits(gateway: &dyn Gateway) -> Result<CreditBalance, GatewayError> {
    let data = gateway.call(GET_CREDITS, serde_json::json!({})).await?;
    Ok(serde_json::from_value(data)?)
}

/// Fetch one page of job history.
pub async fn get_job_history(
    gateway: &dyn Gateway,
    limit: u32,
    offset: u32,
) -> Result<Vec<JobHistoryEntry>, GatewayError> {
    let data = gateway
        .call(
            GET_JOB_HISTORY,
            serde_json::json!({ "p_limit": limit, "p_offset": offset }),
        )
        .await?;
    Ok(serde_json::from_value(data)?)
}

/// Submit a job for execution.
///
/// `job_config` is the already-serialized configuration string; the
/// service id must come from the catalog. Returns the backend-assigned
/// job identifier.
pub async fn post_job(
    gateway: &dyn Gateway,
    service_id: &str,
    job_config: &str,
    worker_filter: &WorkerFilter,
) -> Result<JobId, GatewayError> {
    let data = gateway
        .call(
            POST_JOB,
            serde_json::json!({
                "p_service_id": service_id,
                "p_job_config": job_config,
                "p_worker_filter": worker_filter,
            }),
        )
        .await?;
    Ok(serde_json::from_value(data)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Records every call and answers each with a canned data payload.
    struct RecordingGateway {
        calls: Mutex<Vec<(String, serde_json::Value)>>,
        reply: serde_json::Value,
    }

    impl RecordingGateway {
        fn new(reply: serde_json::Value) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply,
            }
        }

        fn calls(&self) -> Vec<(String, serde_json::Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Gateway for RecordingGateway {
        async fn call(
            &self,
            procedure: &str,
            params: serde_json::Value,
        ) -> Result<serde_json::Value, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((procedure.to_string(), params));
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn get_services_uses_empty_params() {
        let gateway = RecordingGateway::new(serde_json::json!([
            {"id": "svc-1", "name": "sdxl"},
        ]));
        let services = get_services(&gateway).await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "sdxl");

        let calls = gateway.calls();
        assert_eq!(calls, vec![(GET_SERVICES.to_string(), serde_json::json!({}))]);
    }

    #[tokio::test]
    async fn echo_maps_message_parameter() {
        let gateway = RecordingGateway::new(serde_json::json!("hello"));
        let reply = echo(&gateway, "hello").await.unwrap();
        assert_eq!(reply, "hello");

        let calls = gateway.calls();
        assert_eq!(calls[0].1, serde_json::json!({"message_app_user": "hello"}));
    }

    #[tokio::test]
    async fn job_history_maps_pagination_parameters() {
        let gateway = RecordingGateway::new(serde_json::json!([]));
        get_job_history(&gateway, 25, 50).await.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls[0].0, GET_JOB_HISTORY);
        assert_eq!(calls[0].1, serde_json::json!({"p_limit": 25, "p_offset": 50}));
    }

    #[tokio::test]
    async fn post_job_maps_all_three_parameters() {
        let gateway = RecordingGateway::new(serde_json::json!("job-42"));
        let job_id = post_job(&gateway, "svc-1", r#"{"prompt":"x"}"#, &WorkerFilter::prod())
            .await
            .unwrap();
        assert_eq!(job_id.as_str(), "job-42");

        let calls = gateway.calls();
        assert_eq!(calls[0].0, POST_JOB);
        assert_eq!(
            calls[0].1,
            serde_json::json!({
                "p_service_id": "svc-1",
                "p_job_config": r#"{"prompt":"x"}"#,
                "p_worker_filter": {"branch": "prod"},
            })
        );
    }

    #[tokio::test]
    async fn credits_decode_from_plain_number() {
        let gateway = RecordingGateway::new(serde_json::json!(150));
        let balance = get_credits(&gateway).await.unwrap();
        assert_eq!(balance, CreditBalance(150));
    }
}
