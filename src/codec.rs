use crate::errors::JwkError;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use rsa::BigUint;

/// decode_base64_unsigned_int reads a base64url big-endian unsigned integer.
///
/// Padding is optional; missing `=` characters are restored before decoding.
pub fn decode_base64_unsigned_int(text: &str) -> Result<BigUint, JwkError> {
    let trimmed = text.trim_end_matches('=');
    if trimmed.is_empty() {
        return Err(JwkError::EmptyInteger);
    }

    let mut padded = String::with_capacity(trimmed.len() + 3);
    padded.push_str(trimmed);
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let bytes = URL_SAFE.decode(padded.as_bytes())?;
    Ok(BigUint::from_bytes_be(&bytes))
}

/// encode_base64_unsigned_int writes the minimal unpadded base64url form.
pub fn encode_base64_unsigned_int(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_default_exponent() {
        let e = decode_base64_unsigned_int("AQAB").unwrap();
        assert_eq!(e, BigUint::from(65537u32));
    }

    #[test]
    fn restores_missing_padding() {
        // 0x01 0x00 encodes to "AQA=".
        let value = decode_base64_unsigned_int("AQA").unwrap();
        assert_eq!(value, BigUint::from(256u32));
        assert_eq!(decode_base64_unsigned_int("AQA=").unwrap(), value);
    }

    #[test]
    fn leading_zero_bytes_are_ignored() {
        // 0x00 0x00 0x01 0x02
        let value = decode_base64_unsigned_int("AAABAg").unwrap();
        assert_eq!(value, BigUint::from(0x0102u32));
    }

    #[test]
    fn multi_byte_values_are_big_endian() {
        let expected = BigUint::from(0x0102_0304_0506_0708u64);
        let encoded = URL_SAFE_NO_PAD.encode([1u8, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(decode_base64_unsigned_int(&encoded).unwrap(), expected);
        assert_eq!(encode_base64_unsigned_int(&expected), encoded);
    }

    #[test]
    fn url_safe_alphabet_is_used() {
        // 0xfb 0xff
        assert_eq!(
            decode_base64_unsigned_int("-_8").unwrap(),
            BigUint::from(0xfbffu32)
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(
            decode_base64_unsigned_int("not*base64"),
            Err(JwkError::Decode(_))
        ));
        assert!(matches!(
            decode_base64_unsigned_int("A"),
            Err(JwkError::Decode(_))
        ));
        assert!(matches!(
            decode_base64_unsigned_int(""),
            Err(JwkError::EmptyInteger)
        ));
    }
}
