//! The uniform `(data, error)` result pair.
//!
//! Every procedure returns a body of this shape with exactly one side
//! meaningfully populated. [`RpcResponse::into_result`] converts it to
//! the idiomatic `Result`, keeping the backend error payload verbatim.

use serde::Deserialize;

use crate::GatewayError;

/// Wire form of a procedure result.
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl<T> RpcResponse<T> {
    /// Convert the pair into a `Result`.
    ///
    /// A populated `error` side always wins, even if `data` is also
    /// present; both sides absent is an [`GatewayError::EmptyResponse`].
    pub fn into_result(self) -> Result<T, GatewayError> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(GatewayError::Backend(error)),
            (Some(data), None) => Ok(data),
            (None, None) => Err(GatewayError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn data_side_yields_ok() {
        let response: RpcResponse<String> =
            serde_json::from_str(r#"{"data": "job-42", "error": null}"#).unwrap();
        assert_eq!(response.into_result().unwrap(), "job-42");
    }

    #[test]
    fn error_side_is_forwarded_verbatim() {
        let response: RpcResponse<String> =
            serde_json::from_str(r#"{"data": null, "error": {"message": "quota exceeded"}}"#)
                .unwrap();
        let err = response.into_result().unwrap_err();
        assert_matches!(
            err,
            GatewayError::Backend(payload) if payload == serde_json::json!({"message": "quota exceeded"})
        );
    }

    #[test]
    fn error_wins_when_both_sides_present() {
        let response: RpcResponse<String> =
            serde_json::from_str(r#"{"data": "stale", "error": "boom"}"#).unwrap();
        assert_matches!(response.into_result(), Err(GatewayError::Backend(_)));
    }

    #[test]
    fn missing_keys_default_to_absent() {
        let response: RpcResponse<String> = serde_json::from_str("{}").unwrap();
        assert_matches!(response.into_result(), Err(GatewayError::EmptyResponse));
    }

    #[test]
    fn string_error_payloads_are_kept_as_strings() {
        let response: RpcResponse<i64> =
            serde_json::from_str(r#"{"error": "Invalid token"}"#).unwrap();
        assert_matches!(
            response.into_result(),
            Err(GatewayError::Backend(payload)) if payload == serde_json::json!("Invalid token")
        );
    }
}
