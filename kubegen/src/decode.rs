use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{Error, Result};

/// Decode standard base64, ignoring any line wrapping in `value`.
pub fn decode_base64(input: &'static str, value: &str) -> Result<Vec<u8>> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|source| Error::Base64 { input, source })
}

pub fn decode_base64_string(input: &'static str, value: &str) -> Result<String> {
    String::from_utf8(decode_base64(input, value)?).map_err(|source| Error::Utf8 { input, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_wrapped_input() {
        let wrapped = "YXBpVmVyc2lvbjog\ndjEKa2luZDog\r\nQ29uZmlnCg==\n";
        assert_eq!(
            decode_base64_string("kubeconfig", wrapped).unwrap(),
            "apiVersion: v1\nkind: Config\n"
        );
    }

    #[test]
    fn test_invalid_base64_names_input() {
        let err = decode_base64("k8s-secret", "not base64!").unwrap_err();
        assert!(err.to_string().starts_with("k8s-secret is not valid base64"));
    }

    #[test]
    fn test_non_utf8() {
        let err = decode_base64_string("kubeconfig", &STANDARD.encode([0xff, 0xfe])).unwrap_err();
        assert!(matches!(err, Error::Utf8 { input: "kubeconfig", .. }));
    }
}
