use crate::algorithm::{Algorithm, HashAlgorithm, KeyFamily};
use crate::errors::JwkError;
use crate::jwk::Jwk;
use crate::key::KeyMaterial;
use crate::signing::JwkKey;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::elliptic_curve::ALGORITHM_OID;
use p256::pkcs8::{
    AssociatedOid, DecodePrivateKey, DecodePublicKey, ObjectIdentifier, PrivateKeyInfo,
    SubjectPublicKeyInfoRef,
};
use std::fmt;

/// Field width of P-521 in bytes.
const P521_FIELD_LEN: usize = 66;

/// EcCurve lists the curves EC keys can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcCurve {
    P256,
    P384,
    P521,
}

impl EcCurve {
    /// from_oid maps a named-curve OID onto a supported curve.
    pub fn from_oid(oid: ObjectIdentifier) -> Result<Self, JwkError> {
        if oid == p256::NistP256::OID {
            Ok(Self::P256)
        } else if oid == p384::NistP384::OID {
            Ok(Self::P384)
        } else if oid == p521::NistP521::OID {
            Ok(Self::P521)
        } else {
            Err(JwkError::key_parse_msg(format!(
                "EC curve {oid} is not supported (expected P-256, P-384 or P-521)"
            )))
        }
    }

    /// name returns the JWK `crv` value.
    pub const fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// signature_len is the width of an `r || s` signature.
    pub const fn signature_len(self) -> usize {
        match self {
            Self::P256 => 64,
            Self::P384 => 96,
            Self::P521 => 132,
        }
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// EcSigningKey is a curve-tagged ECDSA private key.
#[derive(Clone)]
pub enum EcSigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
}

impl EcSigningKey {
    pub fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::P384(_) => EcCurve::P384,
            Self::P521(_) => EcCurve::P521,
        }
    }

    pub fn verifying_key(&self) -> EcVerifyingKey {
        match self {
            Self::P256(key) => EcVerifyingKey::P256(p256::ecdsa::VerifyingKey::from(key)),
            Self::P384(key) => EcVerifyingKey::P384(p384::ecdsa::VerifyingKey::from(key)),
            Self::P521(key) => EcVerifyingKey::P521(p521::ecdsa::VerifyingKey::from(key)),
        }
    }

    fn sign_prehash(&self, digest: &[u8]) -> Result<Vec<u8>, JwkError> {
        let signature = match self {
            Self::P256(key) => {
                let signature: p256::ecdsa::Signature = key
                    .sign_prehash(digest)
                    .map_err(|err| JwkError::Signing(err.to_string()))?;
                signature.to_bytes().to_vec()
            }
            Self::P384(key) => {
                let signature: p384::ecdsa::Signature = key
                    .sign_prehash(digest)
                    .map_err(|err| JwkError::Signing(err.to_string()))?;
                signature.to_bytes().to_vec()
            }
            Self::P521(key) => {
                let signature: p521::ecdsa::Signature = key
                    .sign_prehash(&widen_p521_digest(digest))
                    .map_err(|err| JwkError::Signing(err.to_string()))?;
                signature.to_bytes().to_vec()
            }
        };
        Ok(signature)
    }
}

impl From<p256::ecdsa::SigningKey> for EcSigningKey {
    fn from(key: p256::ecdsa::SigningKey) -> Self {
        Self::P256(key)
    }
}

impl From<p384::ecdsa::SigningKey> for EcSigningKey {
    fn from(key: p384::ecdsa::SigningKey) -> Self {
        Self::P384(key)
    }
}

impl From<p521::ecdsa::SigningKey> for EcSigningKey {
    fn from(key: p521::ecdsa::SigningKey) -> Self {
        Self::P521(key)
    }
}

impl fmt::Debug for EcSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcSigningKey")
            .field("curve", &self.curve())
            .finish_non_exhaustive()
    }
}

/// EcVerifyingKey is a curve-tagged ECDSA public key.
#[derive(Clone)]
pub enum EcVerifyingKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
}

impl EcVerifyingKey {
    pub fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::P384(_) => EcCurve::P384,
            Self::P521(_) => EcCurve::P521,
        }
    }

    /// coordinates returns the affine (x, y) of the public point.
    fn coordinates(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        match self {
            Self::P256(key) => {
                let point = p256::PublicKey::from(key).to_encoded_point(false);
                Some((point.x()?.to_vec(), point.y()?.to_vec()))
            }
            Self::P384(key) => {
                let point = p384::PublicKey::from(key).to_encoded_point(false);
                Some((point.x()?.to_vec(), point.y()?.to_vec()))
            }
            Self::P521(key) => {
                let point = key.to_encoded_point(false);
                Some((point.x()?.to_vec(), point.y()?.to_vec()))
            }
        }
    }

    fn verify_prehash(&self, digest: &[u8], signature: &[u8]) -> Result<(), String> {
        match self {
            Self::P256(key) => {
                let signature =
                    p256::ecdsa::Signature::from_slice(signature).map_err(|err| err.to_string())?;
                key.verify_prehash(digest, &signature)
                    .map_err(|err| err.to_string())
            }
            Self::P384(key) => {
                let signature =
                    p384::ecdsa::Signature::from_slice(signature).map_err(|err| err.to_string())?;
                key.verify_prehash(digest, &signature)
                    .map_err(|err| err.to_string())
            }
            Self::P521(key) => {
                let signature =
                    p521::ecdsa::Signature::from_slice(signature).map_err(|err| err.to_string())?;
                key.verify_prehash(&widen_p521_digest(digest), &signature)
                    .map_err(|err| err.to_string())
            }
        }
    }
}

impl From<p256::ecdsa::VerifyingKey> for EcVerifyingKey {
    fn from(key: p256::ecdsa::VerifyingKey) -> Self {
        Self::P256(key)
    }
}

impl From<p384::ecdsa::VerifyingKey> for EcVerifyingKey {
    fn from(key: p384::ecdsa::VerifyingKey) -> Self {
        Self::P384(key)
    }
}

impl From<p521::ecdsa::VerifyingKey> for EcVerifyingKey {
    fn from(key: p521::ecdsa::VerifyingKey) -> Self {
        Self::P521(key)
    }
}

impl fmt::Debug for EcVerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("EcVerifyingKey");
        debug.field("curve", &self.curve());
        if let Some((x, _)) = self.coordinates() {
            debug.field("x", &URL_SAFE_NO_PAD.encode(x));
        }
        debug.finish_non_exhaustive()
    }
}

/// widen_p521_digest left-pads digests shorter than the P-521 field.
///
/// ECDSA rejects prehashes under half the field width, which would rule out
/// SHA-256 on P-521. Zero padding keeps the digest's integer value.
fn widen_p521_digest(digest: &[u8]) -> Vec<u8> {
    if digest.len() >= P521_FIELD_LEN {
        return digest.to_vec();
    }
    let mut widened = vec![0u8; P521_FIELD_LEN - digest.len()];
    widened.extend_from_slice(digest);
    widened
}

/// EcHandle is a parsed EC key able to sign, or only to verify.
#[derive(Debug, Clone)]
pub enum EcHandle {
    Signing(EcSigningKey),
    Verifying(EcVerifyingKey),
}

impl EcHandle {
    fn to_verifying(&self) -> EcVerifyingKey {
        match self {
            Self::Signing(key) => key.verifying_key(),
            Self::Verifying(key) => key.clone(),
        }
    }
}

/// EcKey signs with ECDSA, producing fixed-width `r || s` signatures.
#[derive(Debug, Clone)]
pub struct EcKey {
    prepared_key: EcHandle,
    hash_algorithm: HashAlgorithm,
}

impl EcKey {
    /// new accepts a parsed signing or verifying key, or PEM text or bytes.
    pub fn new(material: impl Into<KeyMaterial>, hash: HashAlgorithm) -> Result<Self, JwkError> {
        let prepared_key = match material.into() {
            KeyMaterial::EcSigning(key) => EcHandle::Signing(key),
            KeyMaterial::EcVerifying(key) => EcHandle::Verifying(key),
            KeyMaterial::Text(text) => parse_ec_pem(text.as_bytes())?,
            KeyMaterial::Bytes(bytes) => parse_ec_pem(&bytes)?,
            other => {
                return Err(JwkError::InvalidKeyType(format!(
                    "unable to build an EC key from {}",
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
        matches!(self.prepared_key, EcHandle::Signing(_))
    }

    pub fn curve(&self) -> EcCurve {
        match &self.prepared_key {
            EcHandle::Signing(key) => key.curve(),
            EcHandle::Verifying(key) => key.curve(),
        }
    }

    /// public_key returns a verify-only copy of this key.
    pub fn public_key(&self) -> Self {
        Self {
            prepared_key: EcHandle::Verifying(self.prepared_key.to_verifying()),
            hash_algorithm: self.hash_algorithm,
        }
    }

    /// public_jwk exports the public point as an EC JWK.
    pub fn public_jwk(&self) -> Result<Jwk, JwkError> {
        let verifying_key = self.prepared_key.to_verifying();
        let (x, y) = verifying_key
            .coordinates()
            .ok_or_else(|| JwkError::key_parse_msg("EC public key is the identity point"))?;

        Ok(Jwk {
            kty: "EC".to_string(),
            alg: Some(Algorithm::from_parts(KeyFamily::Ec, self.hash_algorithm).to_string()),
            crv: Some(verifying_key.curve().name().to_string()),
            x: Some(URL_SAFE_NO_PAD.encode(x)),
            y: Some(URL_SAFE_NO_PAD.encode(y)),
            ..Jwk::default()
        })
    }
}

impl JwkKey for EcKey {
    type Prepared = EcHandle;

    fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    fn prepared_key(&self) -> &EcHandle {
        &self.prepared_key
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, JwkError> {
        let EcHandle::Signing(signing_key) = &self.prepared_key else {
            return Err(JwkError::Signing(
                "EC verifying key cannot be used for signing".to_string(),
            ));
        };

        let digest = self.hash_algorithm.digest(message);
        signing_key.sign_prehash(&digest)
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let digest = self.hash_algorithm.digest(message);
        match self.prepared_key.to_verifying().verify_prehash(&digest, signature) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, curve = %self.curve(), "EC signature rejected");
                false
            }
        }
    }
}

/// Outcome of trying to read a PEM document as an EC public key.
enum PublicKeyParse {
    Parsed(EcVerifyingKey),
    NotPublicKey,
}

/// parse_ec_pem reads a verifying key, retrying as a signing key only when
/// the document is not a public key.
fn parse_ec_pem(bytes: &[u8]) -> Result<EcHandle, JwkError> {
    let document = pem::parse(bytes).map_err(JwkError::key_parse)?;

    match parse_ec_public(&document)? {
        PublicKeyParse::Parsed(key) => Ok(EcHandle::Verifying(key)),
        PublicKeyParse::NotPublicKey => {
            tracing::debug!(label = document.tag(), "EC PEM is not a public key, parsing as private");
            parse_ec_private(&document).map(EcHandle::Signing)
        }
    }
}

fn parse_ec_public(document: &pem::Pem) -> Result<PublicKeyParse, JwkError> {
    if document.tag() != "PUBLIC KEY" {
        return Ok(PublicKeyParse::NotPublicKey);
    }

    let der = document.contents();
    let info = SubjectPublicKeyInfoRef::try_from(der).map_err(JwkError::key_parse)?;
    let curve = curve_of(info.algorithm.oid, info.algorithm.parameters_oid().ok())?;
    tracing::debug!(%curve, "parsing EC public key");

    let key = match curve {
        EcCurve::P256 => {
            let public = p256::PublicKey::from_public_key_der(der).map_err(JwkError::key_parse)?;
            EcVerifyingKey::P256(public.into())
        }
        EcCurve::P384 => {
            let public = p384::PublicKey::from_public_key_der(der).map_err(JwkError::key_parse)?;
            EcVerifyingKey::P384(public.into())
        }
        EcCurve::P521 => {
            let public = p521::PublicKey::from_public_key_der(der).map_err(JwkError::key_parse)?;
            EcVerifyingKey::P521(
                p521::ecdsa::VerifyingKey::from_sec1_bytes(&public.to_sec1_bytes())
                    .map_err(JwkError::key_parse)?,
            )
        }
    };
    Ok(PublicKeyParse::Parsed(key))
}

fn parse_ec_private(document: &pem::Pem) -> Result<EcSigningKey, JwkError> {
    let der = document.contents();
    match document.tag() {
        "EC PRIVATE KEY" => parse_ec_sec1(der),
        "PRIVATE KEY" => {
            let info = PrivateKeyInfo::try_from(der).map_err(JwkError::key_parse)?;
            let curve = curve_of(info.algorithm.oid, info.algorithm.parameters_oid().ok())?;
            tracing::debug!(%curve, "parsing PKCS#8 EC private key");

            let key = match curve {
                EcCurve::P256 => EcSigningKey::P256(
                    p256::SecretKey::from_pkcs8_der(der).map_err(JwkError::key_parse)?.into(),
                ),
                EcCurve::P384 => EcSigningKey::P384(
                    p384::SecretKey::from_pkcs8_der(der).map_err(JwkError::key_parse)?.into(),
                ),
                EcCurve::P521 => EcSigningKey::P521(
                    p521::ecdsa::SigningKey::from_bytes(
                        &p521::SecretKey::from_pkcs8_der(der)
                            .map_err(JwkError::key_parse)?
                            .to_bytes(),
                    )
                    .map_err(JwkError::key_parse)?,
                ),
            };
            Ok(key)
        }
        label => Err(JwkError::key_parse_msg(format!(
            "unsupported PEM label for an EC key: {label}"
        ))),
    }
}

/// parse_ec_sec1 tries each curve in turn, since SEC1 may omit the curve.
fn parse_ec_sec1(der: &[u8]) -> Result<EcSigningKey, JwkError> {
    if let Ok(secret) = p256::SecretKey::from_sec1_der(der) {
        return Ok(EcSigningKey::P256(secret.into()));
    }
    if let Ok(secret) = p384::SecretKey::from_sec1_der(der) {
        return Ok(EcSigningKey::P384(secret.into()));
    }
    if let Ok(secret) = p521::SecretKey::from_sec1_der(der) {
        return Ok(EcSigningKey::P521(
            p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes())
                .map_err(JwkError::key_parse)?,
        ));
    }

    Err(JwkError::key_parse_msg(
        "SEC1 EC private key is malformed or its curve is not supported \
         (expected P-256, P-384 or P-521)",
    ))
}

/// curve_of checks the key is an EC key and resolves its named curve.
fn curve_of(
    algorithm: ObjectIdentifier,
    parameters: Option<ObjectIdentifier>,
) -> Result<EcCurve, JwkError> {
    if algorithm != ALGORITHM_OID {
        return Err(JwkError::key_parse_msg(format!(
            "key algorithm {algorithm} is not an EC key (id-ecPublicKey)"
        )));
    }
    let curve =
        parameters.ok_or_else(|| JwkError::key_parse_msg("EC key does not name its curve"))?;
    EcCurve::from_oid(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_curve_oids_resolve() {
        assert_eq!(EcCurve::from_oid(p256::NistP256::OID).unwrap(), EcCurve::P256);
        assert_eq!(EcCurve::from_oid(p384::NistP384::OID).unwrap(), EcCurve::P384);
        assert_eq!(EcCurve::from_oid(p521::NistP521::OID).unwrap(), EcCurve::P521);
    }

    #[test]
    fn unknown_curve_oid_names_the_curve() {
        // secp256k1
        let oid = ObjectIdentifier::new_unwrap("1.3.132.0.10");
        let err = EcCurve::from_oid(oid).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("1.3.132.0.10"), "{message}");
        assert!(message.contains("not supported"), "{message}");
    }

    #[test]
    fn rsa_algorithm_is_not_an_ec_key() {
        // rsaEncryption
        let rsa = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
        let err = curve_of(rsa, None).unwrap_err();
        assert!(err.to_string().contains("not an EC key"), "{err}");
    }

    #[test]
    fn short_digests_are_widened_for_p521() {
        let digest = [0xabu8; 32];
        let widened = widen_p521_digest(&digest);
        assert_eq!(widened.len(), P521_FIELD_LEN);
        assert!(widened[..P521_FIELD_LEN - 32].iter().all(|&b| b == 0));
        assert_eq!(&widened[P521_FIELD_LEN - 32..], &digest);

        let long = [0x01u8; 70];
        assert_eq!(widen_p521_digest(&long), long.to_vec());
    }

    #[test]
    fn signature_widths_follow_the_field() {
        assert_eq!(EcCurve::P256.signature_len(), 64);
        assert_eq!(EcCurve::P384.signature_len(), 96);
        assert_eq!(EcCurve::P521.signature_len(), 132);
        assert_eq!(EcCurve::P521.to_string(), "P-521");
    }
}
