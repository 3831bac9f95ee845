//! Identity, worker selection, and catalog types.
//!
//! Everything here crosses the wire to the job-dispatch backend, so the
//! serde field names match the backend's expectations exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// The four identifiers that authenticate every gateway call.
///
/// Immutable after construction: the client holds one bundle for its
/// whole lifetime and merges it into every remote procedure call as
/// `p_app_id` / `p_key` / `p_app_user_id` / `p_app_user_token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppCredentials {
    /// Identifier of the integrating application (the tenant).
    pub app_id: String,
    /// Application secret key.
    pub key: String,
    /// Identifier of the end user jobs are run on behalf of.
    pub app_user_id: String,
    /// Access token for the end user.
    pub app_user_token: String,
}

/// Selection criterion constraining which backend worker may run a job.
///
/// Passed through to the backend opaquely — the client neither
/// validates nor interprets the fields. Absent fields are omitted from
/// the serialized form entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dirty: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

impl WorkerFilter {
    /// The filter applied when the caller supplies none: production
    /// branch workers only.
    pub fn prod() -> Self {
        Self {
            branch: Some("prod".to_string()),
            ..Self::default()
        }
    }
}

/// One entry of the service catalog: a named backend-executable job
/// type (e.g. an image-generation model) with its backend-assigned id.
///
/// A fixed record rather than an open bag of fields; unknown extra
/// fields returned by the backend are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Backend-assigned service identifier, used in job submission.
    pub id: String,
    /// Human-readable service name, matched exactly on submission.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Opaque identifier of one unit of backend work.
///
/// Returned by job submission; the only correlation between a job and
/// its asynchronously delivered result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Remaining credit balance for the app user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditBalance(pub i64);

/// One row of the paginated job history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHistoryEntry {
    pub job_id: JobId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// The configuration the job was submitted with, as the backend
    /// recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_config: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_serializes_to_empty_object() {
        let filter = WorkerFilter::default();
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn prod_filter_sets_only_branch() {
        let filter = WorkerFilter::prod();
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, serde_json::json!({"branch": "prod"}));
    }

    #[test]
    fn service_ignores_unknown_backend_fields() {
        let json = serde_json::json!({
            "id": "svc-1",
            "name": "sdxl",
            "hardware": "a100",
            "interface": [{"field": "prompt"}],
        });
        let service: Service = serde_json::from_value(json).unwrap();
        assert_eq!(service.id, "svc-1");
        assert_eq!(service.name, "sdxl");
        assert!(service.description.is_none());
    }

    #[test]
    fn job_id_is_a_transparent_string() {
        let id: JobId = serde_json::from_value(serde_json::json!("job-42")).unwrap();
        assert_eq!(id.as_str(), "job-42");
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("job-42"));
    }

    #[test]
    fn history_entry_tolerates_minimal_rows() {
        let entry: JobHistoryEntry =
            serde_json::from_value(serde_json::json!({"job_id": "j-1"})).unwrap();
        assert_eq!(entry.job_id.as_str(), "j-1");
        assert!(entry.created_at.is_none());
        assert!(entry.job_config.is_none());
    }
}
