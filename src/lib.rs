//! Uniform JOSE signing keys.
//!
//! [`construct`] maps a JWA identifier such as `HS256`, `RS384` or `ES512`
//! onto an HMAC, RSA or ECDSA key built from a secret, a PEM or DER
//! document, a JWK, or an already parsed key. Every [`Key`] exposes
//! `sign(message)` and `verify(message, signature)`; verification never
//! returns an error for a bad signature, only `false`.

mod algorithm;
mod codec;
mod ec_key;
mod errors;
mod jwk;
mod key;
mod rsa_key;
mod signing;

pub use algorithm::{Algorithm, HashAlgorithm, KeyFamily, SUPPORTED_ALGORITHMS};
pub use codec::{decode_base64_unsigned_int, encode_base64_unsigned_int};
pub use ec_key::{EcCurve, EcHandle, EcKey, EcSigningKey, EcVerifyingKey};
pub use errors::JwkError;
pub use jwk::Jwk;
pub use key::{construct, Key, KeyMaterial};
pub use rsa_key::{RsaHandle, RsaKey};
pub use signing::{HmacKey, JwkKey};

pub use rsa::BigUint;
