use crate::algorithm::{Algorithm, HashAlgorithm, KeyFamily};
use crate::ec_key::{EcKey, EcSigningKey, EcVerifyingKey};
use crate::errors::JwkError;
use crate::jwk::Jwk;
use crate::rsa_key::RsaKey;
use crate::signing::{HmacKey, JwkKey};
use rsa::{RsaPrivateKey, RsaPublicKey};

/// KeyMaterial holds key input in any of the accepted encodings.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// UTF-8 text: an HMAC secret or a PEM document.
    Text(String),
    /// Raw bytes: an HMAC secret, PEM or DER.
    Bytes(Vec<u8>),
    Jwk(Jwk),
    RsaPrivate(RsaPrivateKey),
    RsaPublic(RsaPublicKey),
    EcSigning(EcSigningKey),
    EcVerifying(EcVerifyingKey),
}

impl KeyMaterial {
    /// from_bytes wraps a raw payload (HMAC secret, PEM or DER bytes).
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self::Bytes(bytes.as_ref().to_vec())
    }

    /// from_text wraps a textual secret or PEM document.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// from_json parses JSON text into a JWK.
    pub fn from_json(text: &str) -> Result<Self, JwkError> {
        Jwk::from_json(text).map(Self::Jwk)
    }

    /// kind names the input encoding for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Jwk(_) => "a JWK",
            Self::RsaPrivate(_) => "an RSA private key",
            Self::RsaPublic(_) => "an RSA public key",
            Self::EcSigning(_) => "an EC signing key",
            Self::EcVerifying(_) => "an EC verifying key",
        }
    }
}

impl From<&str> for KeyMaterial {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for KeyMaterial {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&[u8]> for KeyMaterial {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Jwk> for KeyMaterial {
    fn from(jwk: Jwk) -> Self {
        Self::Jwk(jwk)
    }
}

impl From<RsaPrivateKey> for KeyMaterial {
    fn from(key: RsaPrivateKey) -> Self {
        Self::RsaPrivate(key)
    }
}

impl From<RsaPublicKey> for KeyMaterial {
    fn from(key: RsaPublicKey) -> Self {
        Self::RsaPublic(key)
    }
}

impl From<EcSigningKey> for KeyMaterial {
    fn from(key: EcSigningKey) -> Self {
        Self::EcSigning(key)
    }
}

impl From<EcVerifyingKey> for KeyMaterial {
    fn from(key: EcVerifyingKey) -> Self {
        Self::EcVerifying(key)
    }
}

impl From<p256::ecdsa::SigningKey> for KeyMaterial {
    fn from(key: p256::ecdsa::SigningKey) -> Self {
        Self::EcSigning(key.into())
    }
}

impl From<p384::ecdsa::SigningKey> for KeyMaterial {
    fn from(key: p384::ecdsa::SigningKey) -> Self {
        Self::EcSigning(key.into())
    }
}

impl From<p521::ecdsa::SigningKey> for KeyMaterial {
    fn from(key: p521::ecdsa::SigningKey) -> Self {
        Self::EcSigning(key.into())
    }
}

impl From<p256::ecdsa::VerifyingKey> for KeyMaterial {
    fn from(key: p256::ecdsa::VerifyingKey) -> Self {
        Self::EcVerifying(key.into())
    }
}

impl From<p384::ecdsa::VerifyingKey> for KeyMaterial {
    fn from(key: p384::ecdsa::VerifyingKey) -> Self {
        Self::EcVerifying(key.into())
    }
}

impl From<p521::ecdsa::VerifyingKey> for KeyMaterial {
    fn from(key: p521::ecdsa::VerifyingKey) -> Self {
        Self::EcVerifying(key.into())
    }
}

/// Key is a constructed signing key of any supported family.
#[derive(Debug, Clone)]
pub enum Key {
    Hmac(HmacKey),
    Rsa(RsaKey),
    Ec(EcKey),
}

impl Key {
    /// new builds the variant `algorithm` dispatches to.
    pub fn new(material: impl Into<KeyMaterial>, algorithm: Algorithm) -> Result<Self, JwkError> {
        let hash = algorithm.hash_algorithm();
        let key = match algorithm.family() {
            KeyFamily::Hmac => Self::Hmac(HmacKey::new(material, hash)?),
            KeyFamily::Rsa => Self::Rsa(RsaKey::new(material, hash)?),
            KeyFamily::Ec => Self::Ec(EcKey::new(material, hash)?),
        };
        tracing::debug!(%algorithm, "constructed key");
        Ok(key)
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Hmac(_) => KeyFamily::Hmac,
            Self::Rsa(_) => KeyFamily::Rsa,
            Self::Ec(_) => KeyFamily::Ec,
        }
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Hmac(key) => key.hash_algorithm(),
            Self::Rsa(key) => key.hash_algorithm(),
            Self::Ec(key) => key.hash_algorithm(),
        }
    }

    /// algorithm returns the JWA identifier this key signs for.
    pub fn algorithm(&self) -> Algorithm {
        Algorithm::from_parts(self.family(), self.hash_algorithm())
    }

    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, JwkError> {
        match self {
            Self::Hmac(key) => key.sign(message),
            Self::Rsa(key) => key.sign(message),
            Self::Ec(key) => key.sign(message),
        }
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self {
            Self::Hmac(key) => key.verify(message, signature),
            Self::Rsa(key) => key.verify(message, signature),
            Self::Ec(key) => key.verify(message, signature),
        }
    }
}

/// construct builds a key for `algorithm`, or for the JWK's own `alg` when
/// no algorithm is given.
pub fn construct(
    material: impl Into<KeyMaterial>,
    algorithm: Option<&str>,
) -> Result<Key, JwkError> {
    let material = material.into();

    let name = match (algorithm, &material) {
        (Some(name), _) if !name.is_empty() => Some(name),
        (_, KeyMaterial::Jwk(jwk)) => jwk.alg.as_deref().filter(|alg| !alg.is_empty()),
        _ => None,
    };
    let Some(name) = name else {
        return Err(JwkError::UnsupportedAlgorithm(format!(
            "unable to find an algorithm for {}",
            material.kind()
        )));
    };

    let algorithm: Algorithm = name.parse()?;
    Key::new(material, algorithm)
}
