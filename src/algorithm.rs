use crate::errors::JwkError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// HashAlgorithm is the digest bound to a key for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA256")]
    Sha256,
    #[serde(rename = "SHA384")]
    Sha384,
    #[serde(rename = "SHA512")]
    Sha512,
}

impl HashAlgorithm {
    /// name returns the conventional spelling, e.g. "SHA-256".
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// output_len returns the digest size in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// digest hashes data with this algorithm.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = JwkError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_uppercase().as_str() {
            "SHA256" | "SHA-256" => Ok(Self::Sha256),
            "SHA384" | "SHA-384" => Ok(Self::Sha384),
            "SHA512" | "SHA-512" => Ok(Self::Sha512),
            _ => Err(JwkError::InvalidHashAlgorithm(name.to_string())),
        }
    }
}

/// KeyFamily names the key variant an algorithm dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
}

/// Algorithm is a JWA signature algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "HS256")]
    Hs256,
    #[serde(rename = "HS384")]
    Hs384,
    #[serde(rename = "HS512")]
    Hs512,
    #[serde(rename = "RS256")]
    Rs256,
    #[serde(rename = "RS384")]
    Rs384,
    #[serde(rename = "RS512")]
    Rs512,
    #[serde(rename = "ES256")]
    Es256,
    #[serde(rename = "ES384")]
    Es384,
    #[serde(rename = "ES512")]
    Es512,
}

/// Every algorithm the factory can construct a key for.
pub const SUPPORTED_ALGORITHMS: [Algorithm; 9] = [
    Algorithm::Hs256,
    Algorithm::Hs384,
    Algorithm::Hs512,
    Algorithm::Rs256,
    Algorithm::Rs384,
    Algorithm::Rs512,
    Algorithm::Es256,
    Algorithm::Es384,
    Algorithm::Es512,
];

impl Algorithm {
    /// jwa_name returns the identifier as it appears in a JOSE header.
    pub const fn jwa_name(self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
        }
    }

    pub const fn family(self) -> KeyFamily {
        match self {
            Self::Hs256 | Self::Hs384 | Self::Hs512 => KeyFamily::Hmac,
            Self::Rs256 | Self::Rs384 | Self::Rs512 => KeyFamily::Rsa,
            Self::Es256 | Self::Es384 | Self::Es512 => KeyFamily::Ec,
        }
    }

    pub const fn hash_algorithm(self) -> HashAlgorithm {
        match self {
            Self::Hs256 | Self::Rs256 | Self::Es256 => HashAlgorithm::Sha256,
            Self::Hs384 | Self::Rs384 | Self::Es384 => HashAlgorithm::Sha384,
            Self::Hs512 | Self::Rs512 | Self::Es512 => HashAlgorithm::Sha512,
        }
    }

    /// from_parts is the inverse of (family, hash_algorithm).
    pub const fn from_parts(family: KeyFamily, hash: HashAlgorithm) -> Self {
        match (family, hash) {
            (KeyFamily::Hmac, HashAlgorithm::Sha256) => Self::Hs256,
            (KeyFamily::Hmac, HashAlgorithm::Sha384) => Self::Hs384,
            (KeyFamily::Hmac, HashAlgorithm::Sha512) => Self::Hs512,
            (KeyFamily::Rsa, HashAlgorithm::Sha256) => Self::Rs256,
            (KeyFamily::Rsa, HashAlgorithm::Sha384) => Self::Rs384,
            (KeyFamily::Rsa, HashAlgorithm::Sha512) => Self::Rs512,
            (KeyFamily::Ec, HashAlgorithm::Sha256) => Self::Es256,
            (KeyFamily::Ec, HashAlgorithm::Sha384) => Self::Es384,
            (KeyFamily::Ec, HashAlgorithm::Sha512) => Self::Es512,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jwa_name())
    }
}

impl FromStr for Algorithm {
    type Err = JwkError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        SUPPORTED_ALGORITHMS
            .iter()
            .copied()
            .find(|alg| alg.jwa_name() == name)
            .ok_or_else(|| JwkError::UnsupportedAlgorithm(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_inverts_the_table() {
        for alg in SUPPORTED_ALGORITHMS {
            assert_eq!(Algorithm::from_parts(alg.family(), alg.hash_algorithm()), alg);
        }
    }

    #[test]
    fn identifiers_are_case_sensitive() {
        assert!(matches!(
            "hs256".parse::<Algorithm>(),
            Err(JwkError::UnsupportedAlgorithm(_))
        ));
        assert_eq!("HS256".parse::<Algorithm>().unwrap(), Algorithm::Hs256);
    }

    #[test]
    fn unknown_hash_is_rejected() {
        assert!(matches!(
            "MD5".parse::<HashAlgorithm>(),
            Err(JwkError::InvalidHashAlgorithm(name)) if name == "MD5"
        ));
        assert_eq!("sha-384".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha384);
    }

    #[test]
    fn serde_uses_jwa_names() {
        let json = serde_json::to_string(&Algorithm::Es512).unwrap();
        assert_eq!(json, "\"ES512\"");
        let alg: Algorithm = serde_json::from_str("\"RS384\"").unwrap();
        assert_eq!(alg, Algorithm::Rs384);
    }

    #[test]
    fn digest_lengths_match() {
        for hash in [HashAlgorithm::Sha256, HashAlgorithm::Sha384, HashAlgorithm::Sha512] {
            assert_eq!(hash.digest(b"abc").len(), hash.output_len());
        }
    }
}
