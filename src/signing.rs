use crate::algorithm::HashAlgorithm;
use crate::errors::JwkError;
use crate::jwk::Jwk;
use crate::key::KeyMaterial;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;
use zeroize::Zeroizing;

/// JwkKey is the capability every key variant provides.
pub trait JwkKey: Send + Sync {
    /// Prepared is the normalized handle the variant signs with.
    type Prepared;

    fn hash_algorithm(&self) -> HashAlgorithm;

    fn prepared_key(&self) -> &Self::Prepared;

    /// process_jwk turns a JWK mapping into the variant's handle.
    fn process_jwk(jwk: &Jwk) -> Result<Self::Prepared, JwkError>
    where
        Self: Sized,
    {
        Err(JwkError::InvalidKeyType(format!(
            "JWK with kty '{}' is not supported by this key type",
            jwk.kty
        )))
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, JwkError>;

    /// verify reports whether signature is valid for message. It never fails.
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool;
}

/// Byte strings that mark public keys, certificates and SSH keys.
const FORBIDDEN_HMAC_MARKERS: [&[u8]; 3] = [
    b"-----BEGIN PUBLIC KEY-----",
    b"-----BEGIN CERTIFICATE-----",
    b"ssh-rsa",
];

/// HmacKey signs with HMAC over a shared secret.
#[derive(Clone)]
pub struct HmacKey {
    prepared_key: Zeroizing<Vec<u8>>,
    hash_algorithm: HashAlgorithm,
}

impl HmacKey {
    /// new accepts text or raw bytes and rejects asymmetric key material.
    pub fn new(material: impl Into<KeyMaterial>, hash: HashAlgorithm) -> Result<Self, JwkError> {
        let secret = Zeroizing::new(match material.into() {
            KeyMaterial::Text(text) => text.into_bytes(),
            KeyMaterial::Bytes(bytes) => bytes,
            other => {
                return Err(JwkError::InvalidKeyType(format!(
                    "expecting a string- or bytes-formatted HMAC key, got {}",
                    other.kind()
                )))
            }
        });

        if FORBIDDEN_HMAC_MARKERS
            .iter()
            .any(|marker| contains_subslice(&secret, marker))
        {
            tracing::warn!(hash = %hash, "refusing asymmetric key material as an HMAC secret");
            return Err(JwkError::UnsafeKeyMaterial);
        }

        Ok(Self {
            prepared_key: secret,
            hash_algorithm: hash,
        })
    }

    fn mac(&self, message: &[u8]) -> Result<MacState, JwkError> {
        let state = match self.hash_algorithm {
            HashAlgorithm::Sha256 => MacState::Sha256(new_mac(&self.prepared_key, message)?),
            HashAlgorithm::Sha384 => MacState::Sha384(new_mac(&self.prepared_key, message)?),
            HashAlgorithm::Sha512 => MacState::Sha512(new_mac(&self.prepared_key, message)?),
        };
        Ok(state)
    }
}

impl JwkKey for HmacKey {
    type Prepared = Vec<u8>;

    fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    fn prepared_key(&self) -> &Vec<u8> {
        &self.prepared_key
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, JwkError> {
        let digest = match self.mac(message)? {
            MacState::Sha256(mac) => mac.finalize().into_bytes().to_vec(),
            MacState::Sha384(mac) => mac.finalize().into_bytes().to_vec(),
            MacState::Sha512(mac) => mac.finalize().into_bytes().to_vec(),
        };
        Ok(digest)
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(state) = self.mac(message) else {
            return false;
        };
        // verify_slice compares in constant time.
        match state {
            MacState::Sha256(mac) => mac.verify_slice(signature).is_ok(),
            MacState::Sha384(mac) => mac.verify_slice(signature).is_ok(),
            MacState::Sha512(mac) => mac.verify_slice(signature).is_ok(),
        }
    }
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacKey")
            .field("prepared_key", &"[redacted]")
            .field("hash_algorithm", &self.hash_algorithm)
            .finish()
    }
}

enum MacState {
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
}

fn new_mac<M: Mac + hmac::digest::KeyInit>(secret: &[u8], message: &[u8]) -> Result<M, JwkError> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|err| JwkError::Signing(err.to_string()))?;
    mac.update(message);
    Ok(mac)
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_held_in_zeroizing_storage() {
        let key = HmacKey::new("wiped secret", HashAlgorithm::Sha256).unwrap();
        let storage: &Zeroizing<Vec<u8>> = &key.prepared_key;
        assert_eq!(storage.as_slice(), b"wiped secret");
        assert_eq!(key.prepared_key().as_slice(), b"wiped secret");
    }

    #[test]
    fn subslice_search_finds_markers_anywhere() {
        assert!(contains_subslice(b"xx ssh-rsa AAAA", b"ssh-rsa"));
        assert!(!contains_subslice(b"ssh-rs", b"ssh-rsa"));
    }
}
