//! Parameter-map construction for gateway calls.

use atelier_core::types::AppCredentials;

/// Merge the credential bundle into a call's parameter mapping.
///
/// The four authentication parameters are attached to every call and
/// always win over caller-supplied keys of the same name. A non-object
/// `params` value is replaced by a fresh object holding only the
/// credentials.
pub fn merge_credentials(
    params: serde_json::Value,
    credentials: &AppCredentials,
) -> serde_json::Value {
    let mut map = match params {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    map.insert("p_app_id".into(), credentials.app_id.clone().into());
    map.insert("p_key".into(), credentials.key.clone().into());
    map.insert("p_app_user_id".into(), credentials.app_user_id.clone().into());
    map.insert(
        "p_app_user_token".into(),
        credentials.app_user_token.clone().into(),
    );

    serde_json::Value::Object(map)
}
