use crate::errors::JwkError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Jwk is a JSON Web Key as a typed mapping.
///
/// Only the members this crate reads are named; anything else lands in
/// `extra` and survives a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(default)]
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Jwk {
    /// from_json parses a JWK from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, JwkError> {
        serde_json::from_str(text).map_err(JwkError::key_parse)
    }

    /// from_value converts an already-parsed JSON object.
    pub fn from_value(value: serde_json::Value) -> Result<Self, JwkError> {
        serde_json::from_value(value).map_err(JwkError::key_parse)
    }

    pub fn to_json(&self) -> Result<String, JwkError> {
        serde_json::to_string(self).map_err(JwkError::key_parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_members_are_kept() {
        let jwk = Jwk::from_json(r#"{"kty":"RSA","n":"AQAB","x5t":"abc"}"#).unwrap();
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.n.as_deref(), Some("AQAB"));
        assert_eq!(jwk.extra.get("x5t"), Some(&serde_json::json!("abc")));

        let text = jwk.to_json().unwrap();
        assert_eq!(Jwk::from_json(&text).unwrap(), jwk);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(Jwk::from_json("{"), Err(JwkError::KeyParse(_))));
    }
}
