use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;

/// 256 random bits, hex encoded
pub fn generate_token() -> String {
    random_hex(32)
}

pub fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Constant-time comparison of a supplied token against the stored secret.
/// Empty or missing values never match.
pub fn tokens_match(stored: Option<&str>, supplied: Option<&str>) -> bool {
    match (stored, supplied) {
        (Some(stored), Some(supplied)) if !stored.is_empty() && !supplied.is_empty() => {
            stored.as_bytes().ct_eq(supplied.as_bytes()).into()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn matching_requires_both_sides() {
        assert!(tokens_match(Some("abc"), Some("abc")));
        assert!(!tokens_match(Some("abc"), Some("abd")));
        assert!(!tokens_match(Some("abc"), Some("ab")));
        assert!(!tokens_match(Some("abc"), None));
        assert!(!tokens_match(None, Some("abc")));
        assert!(!tokens_match(Some(""), Some("")));
    }
}
