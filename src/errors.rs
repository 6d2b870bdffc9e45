use thiserror::Error;

/// JwkError reports key construction, parsing and signing failures.
///
/// Verification never produces one of these: a bad signature is `false`.
#[derive(Debug, Error)]
pub enum JwkError {
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("{0} is not a valid hash algorithm")]
    InvalidHashAlgorithm(String),
    #[error("invalid key type: {0}")]
    InvalidKeyType(String),
    #[error(
        "the specified key is an asymmetric key or x509 certificate and should not be used as an HMAC secret"
    )]
    UnsafeKeyMaterial,
    #[error("key parse error: {0}")]
    KeyParse(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("failed to decode base64 integer: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("base64 integer is empty")]
    EmptyInteger,
}

impl JwkError {
    pub(crate) fn key_parse<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::KeyParse(Box::new(err))
    }

    pub(crate) fn key_parse_msg(msg: impl Into<String>) -> Self {
        Self::KeyParse(msg.into().into())
    }
}
