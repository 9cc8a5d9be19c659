//! Text utilities for diagnostics and credential handling.

/// Upper bound on stored error messages.
///
/// Export tool diagnostics can be arbitrarily verbose; everything written to a
/// job record is truncated to this many characters.
pub const MAX_ERROR_LEN: usize = 1000;

/// Truncate a diagnostic message to [`MAX_ERROR_LEN`] characters.
pub fn truncate_error(s: &str) -> String {
    truncate_to(s, MAX_ERROR_LEN)
}

/// Truncate a string to at most `max_len` characters. The ellipsis marker
/// replaces the tail, so the result never exceeds the bound.
pub fn truncate_to(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept = max_len.saturating_sub(3);
    let mut out = s.chars().take(kept).collect::<String>();
    out.push_str("...");
    out.chars().take(max_len).collect()
}

/// Mask a credential for logging.
///
/// Keeps the first and last four characters of long values; anything eight
/// characters or shorter is fully masked.
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    if value.chars().count() <= 8 {
        return "***".to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}***{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_to("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let long = "x".repeat(1500);
        let out = truncate_error(&long);
        assert_eq!(out.chars().count(), MAX_ERROR_LEN);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_truncate_never_exceeds_bound() {
        for len in [0, 1, 3, 10, MAX_ERROR_LEN, MAX_ERROR_LEN + 1, 5000] {
            let s = "z".repeat(len);
            assert!(truncate_error(&s).chars().count() <= MAX_ERROR_LEN);
            assert!(truncate_to(&s, 10).chars().count() <= 10);
        }
    }

    #[test]
    fn test_truncate_exact_bound() {
        let s = "y".repeat(MAX_ERROR_LEN);
        assert_eq!(truncate_error(&s), s);
    }

    #[test]
    fn test_truncate_tiny_bound() {
        assert_eq!(truncate_to("abcdef", 2), "..");
    }

    #[test]
    fn test_mask_empty() {
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn test_mask_short_value_fully_hidden() {
        assert_eq!(mask_secret("12345678"), "***");
    }

    #[test]
    fn test_mask_long_value_keeps_ends() {
        assert_eq!(mask_secret("abcdefghijkl"), "abcd***ijkl");
        assert!(!mask_secret("abcdefghijkl").contains("efgh"));
    }
}
