use crate::character_sets::is_forbidden_domain_code_point;
use crate::error::{ParseError, Result};

/// Check if 4 bytes match "xn--" (case insensitive)
fn is_punycode_prefix(slice: &[u8]) -> bool {
    slice.len() >= 4
        && matches!(slice[0], b'x' | b'X')
        && matches!(slice[1], b'n' | b'N')
        && slice[2] == b'-'
        && slice[3] == b'-'
}

/// Check if any label of the domain starts with the Punycode prefix
pub fn has_punycode(domain: &str) -> bool {
    let bytes = domain.as_bytes();
    if is_punycode_prefix(bytes) {
        return true;
    }
    memchr::memchr_iter(b'.', bytes).any(|pos| is_punycode_prefix(&bytes[pos + 1..]))
}

/// Convert a domain to its ASCII form (IDNA ToASCII).
///
/// The ASCII fast path only lowercases and validates; anything with
/// non-ASCII, percent signs or Punycode labels goes through the `idna`
/// crate so the full UTS 46 mapping and validation applies.
pub fn domain_to_ascii(domain: &str) -> Result<String> {
    if domain.is_empty() {
        return Err(ParseError::InvalidHost);
    }

    if domain.is_ascii() && !has_punycode(domain) {
        let mut result = String::with_capacity(domain.len());
        for b in domain.bytes() {
            if is_forbidden_domain_code_point(b) {
                return Err(ParseError::InvalidHost);
            }
            result.push(b.to_ascii_lowercase() as char);
        }
        return Ok(result);
    }

    let ascii = idna::domain_to_ascii(domain).map_err(|_| ParseError::IdnaError)?;
    if ascii.is_empty() {
        return Err(ParseError::InvalidHost);
    }
    if ascii.bytes().any(is_forbidden_domain_code_point) {
        return Err(ParseError::InvalidHost);
    }
    Ok(ascii)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ascii_fast_path() {
        assert_eq!(domain_to_ascii("EXAMPLE.com").unwrap(), "example.com");
        assert_eq!(domain_to_ascii("a_b").unwrap(), "a_b");
        assert!(domain_to_ascii("exa mple.com").is_err());
        assert!(domain_to_ascii("").is_err());
    }

    #[test]
    fn unicode_goes_through_idna() {
        let ascii = domain_to_ascii("日本.jp").unwrap();
        assert!(ascii.starts_with("xn--"));
    }

    #[test]
    fn punycode_detection() {
        assert!(has_punycode("xn--bcher-kva.example"));
        assert!(has_punycode("a.XN--b"));
        assert!(!has_punycode("example.com"));
        assert!(!has_punycode("axn--b.com"));
    }
}
