use crate::algorithm::{Algorithm, HashAlgorithm, KeyFamily};
use crate::codec::{decode_base64_unsigned_int, encode_base64_unsigned_int};
use crate::errors::JwkError;
use crate::jwk::Jwk;
use crate::key::KeyMaterial;
use crate::signing::JwkKey;
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};

/// Exponent used when a JWK omits `e` (65537).
const DEFAULT_PUBLIC_EXPONENT: &str = "AQAB";

/// RsaHandle is a parsed RSA key, private or public.
#[derive(Debug, Clone)]
pub enum RsaHandle {
    Private(RsaPrivateKey),
    Public(RsaPublicKey),
}

impl RsaHandle {
    fn to_public(&self) -> RsaPublicKey {
        match self {
            Self::Private(key) => RsaPublicKey::from(key),
            Self::Public(key) => key.clone(),
        }
    }
}

/// RsaKey signs with RSASSA-PKCS1-v1_5.
#[derive(Debug, Clone)]
pub struct RsaKey {
    prepared_key: RsaHandle,
    hash_algorithm: HashAlgorithm,
}

impl RsaKey {
    /// new accepts a parsed key, a JWK, or PEM/DER text or bytes.
    pub fn new(material: impl Into<KeyMaterial>, hash: HashAlgorithm) -> Result<Self, JwkError> {
        let prepared_key = match material.into() {
            KeyMaterial::RsaPrivate(key) => RsaHandle::Private(key),
            KeyMaterial::RsaPublic(key) => RsaHandle::Public(key),
            KeyMaterial::Jwk(jwk) => Self::process_jwk(&jwk)?,
            KeyMaterial::Text(text) => parse_rsa_encoded(text.as_bytes())?,
            KeyMaterial::Bytes(bytes) => parse_rsa_encoded(&bytes)?,
            other => {
                return Err(JwkError::InvalidKeyType(format!(
                    "unable to build an RSA key from {}",
                    other.kind()
                )))
            }
        };

        Ok(Self {
            prepared_key,
            hash_algorithm: hash,
        })
    }

    pub fn is_private(&self) -> bool {
        matches!(self.prepared_key, RsaHandle::Private(_))
    }

    /// public_key returns a verify-only copy of this key.
    pub fn public_key(&self) -> Self {
        Self {
            prepared_key: RsaHandle::Public(self.prepared_key.to_public()),
            hash_algorithm: self.hash_algorithm,
        }
    }

    /// public_jwk exports the public half as an RSA JWK.
    pub fn public_jwk(&self) -> Jwk {
        let public_key = self.prepared_key.to_public();
        Jwk {
            kty: "RSA".to_string(),
            alg: Some(Algorithm::from_parts(KeyFamily::Rsa, self.hash_algorithm).to_string()),
            n: Some(encode_base64_unsigned_int(public_key.n())),
            e: Some(encode_base64_unsigned_int(public_key.e())),
            ..Jwk::default()
        }
    }

    fn padding(&self) -> Pkcs1v15Sign {
        match self.hash_algorithm {
            HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        }
    }
}

impl JwkKey for RsaKey {
    type Prepared = RsaHandle;

    fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    fn prepared_key(&self) -> &RsaHandle {
        &self.prepared_key
    }

    fn process_jwk(jwk: &Jwk) -> Result<RsaHandle, JwkError> {
        if jwk.kty != "RSA" {
            return Err(JwkError::InvalidKeyType(format!(
                "incorrect key type, expected 'RSA', received '{}'",
                jwk.kty
            )));
        }

        let n = jwk
            .n
            .as_deref()
            .ok_or_else(|| JwkError::InvalidKeyType("RSA JWK is missing 'n'".to_string()))?;
        let e = jwk.e.as_deref().unwrap_or(DEFAULT_PUBLIC_EXPONENT);

        let n = decode_base64_unsigned_int(n)?;
        let e = decode_base64_unsigned_int(e)?;

        let public_key = RsaPublicKey::new(n, e).map_err(JwkError::key_parse)?;
        Ok(RsaHandle::Public(public_key))
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, JwkError> {
        let RsaHandle::Private(private_key) = &self.prepared_key else {
            return Err(JwkError::Signing(
                "RSA public key cannot be used for signing".to_string(),
            ));
        };

        let digest = self.hash_algorithm.digest(message);
        private_key
            .sign_with_rng(&mut OsRng, self.padding(), &digest)
            .map_err(|err| JwkError::Signing(err.to_string()))
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let digest = self.hash_algorithm.digest(message);
        let result = match &self.prepared_key {
            RsaHandle::Private(key) => key.to_public_key().verify(self.padding(), &digest, signature),
            RsaHandle::Public(key) => key.verify(self.padding(), &digest, signature),
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(?err, hash = %self.hash_algorithm, "RSA signature rejected");
                false
            }
        }
    }
}

/// Prefix of an OpenSSH `authorized_keys` RSA line.
const OPENSSH_RSA_PREFIX: &[u8] = b"ssh-rsa ";

/// parse_rsa_encoded reads OpenSSH or PEM by label, falling back to raw DER.
fn parse_rsa_encoded(bytes: &[u8]) -> Result<RsaHandle, JwkError> {
    if bytes.trim_ascii_start().starts_with(OPENSSH_RSA_PREFIX) {
        return parse_rsa_openssh(bytes).map(RsaHandle::Public);
    }

    let Ok(document) = pem::parse(bytes) else {
        tracing::debug!("RSA key material is not PEM, trying DER");
        return parse_rsa_der(bytes);
    };

    tracing::debug!(label = document.tag(), "parsing RSA PEM key");
    let der = document.contents();
    let handle = match document.tag() {
        "RSA PRIVATE KEY" => {
            RsaHandle::Private(RsaPrivateKey::from_pkcs1_der(der).map_err(JwkError::key_parse)?)
        }
        "PRIVATE KEY" => {
            RsaHandle::Private(RsaPrivateKey::from_pkcs8_der(der).map_err(JwkError::key_parse)?)
        }
        "RSA PUBLIC KEY" => {
            RsaHandle::Public(RsaPublicKey::from_pkcs1_der(der).map_err(JwkError::key_parse)?)
        }
        "PUBLIC KEY" => RsaHandle::Public(
            RsaPublicKey::from_public_key_der(der).map_err(JwkError::key_parse)?,
        ),
        label => {
            return Err(JwkError::key_parse_msg(format!(
                "unsupported PEM label for an RSA key: {label}"
            )))
        }
    };
    Ok(handle)
}

/// parse_rsa_openssh reads a single-line `ssh-rsa AAAA... comment` key.
fn parse_rsa_openssh(bytes: &[u8]) -> Result<RsaPublicKey, JwkError> {
    let text = std::str::from_utf8(bytes).map_err(JwkError::key_parse)?;
    let public_key = ssh_key::PublicKey::from_openssh(text.trim()).map_err(JwkError::key_parse)?;
    tracing::debug!(comment = public_key.comment(), "parsing OpenSSH RSA public key");

    let ssh_key::public::KeyData::Rsa(key) = public_key.key_data() else {
        return Err(JwkError::key_parse_msg(format!(
            "OpenSSH key is {}, not ssh-rsa",
            public_key.algorithm()
        )));
    };

    let n = key
        .n
        .as_positive_bytes()
        .ok_or_else(|| JwkError::key_parse_msg("OpenSSH RSA modulus is not positive"))?;
    let e = key
        .e
        .as_positive_bytes()
        .ok_or_else(|| JwkError::key_parse_msg("OpenSSH RSA exponent is not positive"))?;

    RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
        .map_err(JwkError::key_parse)
}

fn parse_rsa_der(bytes: &[u8]) -> Result<RsaHandle, JwkError> {
    if let Ok(key) = RsaPrivateKey::from_pkcs1_der(bytes) {
        return Ok(RsaHandle::Private(key));
    }

    if let Ok(key) = RsaPrivateKey::from_pkcs8_der(bytes) {
        return Ok(RsaHandle::Private(key));
    }

    if let Ok(key) = RsaPublicKey::from_pkcs1_der(bytes) {
        return Ok(RsaHandle::Public(key));
    }

    RsaPublicKey::from_public_key_der(bytes)
        .map(RsaHandle::Public)
        .map_err(JwkError::key_parse)
}
