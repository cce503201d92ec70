//! Per-component canonicalizers and `UrlPatternInit` processing.
//!
//! Canonicalizers normalize the fixed text of a component pattern the
//! same way the URL parser would (lowercased schemes, IDNA hostnames,
//! percent-encoded paths); pattern syntax never reaches them.

use crate::checkers::parse_port;
use crate::error::PatternError;
use crate::host::parse_host;
use crate::scheme::get_scheme_type;
use crate::unicode::percent_encode::{
    C0_CONTROL_SET, FRAGMENT_SET, QUERY_SET, USERINFO_SET, percent_encode_with,
};
use crate::url::Url;

use super::UrlPatternInit;
use super::parser::escape_pattern_string;

/// Whether init values are compiled into a pattern or matched as a
/// concrete URL. Pattern processing leaves values untouched (they may
/// contain pattern syntax); URL processing canonicalizes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessKind {
    Pattern,
    Url,
}

fn type_error(message: impl Into<String>) -> PatternError {
    PatternError::TypeError(message.into())
}

pub(crate) fn canonicalize_protocol(input: &str) -> Result<String, PatternError> {
    if input.is_empty() {
        return Ok(String::new());
    }
    // Parse a dummy URL with this scheme; what survives is canonical
    let url = Url::parse(&format!("{input}://dummy.test"), None)
        .map_err(|_| type_error(format!("invalid protocol `{input}`")))?;
    Ok(url.scheme().to_string())
}

pub(crate) fn canonicalize_username(input: &str) -> Result<String, PatternError> {
    Ok(percent_encode_with(input, USERINFO_SET))
}

pub(crate) fn canonicalize_password(input: &str) -> Result<String, PatternError> {
    Ok(percent_encode_with(input, USERINFO_SET))
}

pub(crate) fn canonicalize_hostname(input: &str) -> Result<String, PatternError> {
    if input.is_empty() {
        return Ok(String::new());
    }
    let host = parse_host(input, false)
        .map_err(|_| type_error(format!("invalid hostname `{input}`")))?;
    Ok(host.serialize())
}

/// IPv6 hostnames are validated structurally and lowercased, keeping
/// the bracket form intact
pub(crate) fn canonicalize_ipv6_hostname(input: &str) -> Result<String, PatternError> {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if !matches!(c, '[' | ']' | ':') && !c.is_ascii_hexdigit() {
            return Err(type_error(format!("invalid IPv6 hostname `{input}`")));
        }
        out.push(c.to_ascii_lowercase());
    }
    Ok(out)
}

pub(crate) fn canonicalize_port(
    input: &str,
    protocol: Option<&str>,
) -> Result<String, PatternError> {
    if input.is_empty() {
        return Ok(String::new());
    }
    let port = parse_port(input).ok_or_else(|| type_error(format!("invalid port `{input}`")))?;
    let is_default = protocol
        .is_some_and(|protocol| get_scheme_type(protocol).default_port() == Some(port));
    if is_default {
        return Ok(String::new());
    }
    Ok(port.to_string())
}

pub(crate) fn canonicalize_pathname(input: &str) -> Result<String, PatternError> {
    if input.is_empty() {
        return Ok(String::new());
    }
    // Path parsing needs a leading slash; "/-" marks one we added so it
    // can be stripped back off
    let leading_slash = input.starts_with('/');
    let modified = if leading_slash {
        input.to_string()
    } else {
        format!("/-{input}")
    };
    let mut url = dummy_special_url();
    if !url.set_pathname(&modified) {
        return Err(type_error(format!("invalid pathname `{input}`")));
    }
    let serialized = url.pathname();
    if leading_slash {
        Ok(serialized)
    } else {
        Ok(serialized[2..].to_string())
    }
}

pub(crate) fn canonicalize_opaque_pathname(input: &str) -> Result<String, PatternError> {
    Ok(percent_encode_with(input, C0_CONTROL_SET))
}

pub(crate) fn canonicalize_search(input: &str) -> Result<String, PatternError> {
    let input = input.strip_prefix('?').unwrap_or(input);
    Ok(percent_encode_with(input, QUERY_SET))
}

pub(crate) fn canonicalize_hash(input: &str) -> Result<String, PatternError> {
    let input = input.strip_prefix('#').unwrap_or(input);
    Ok(percent_encode_with(input, FRAGMENT_SET))
}

fn dummy_special_url() -> Url {
    let mut url = Url::new();
    url.scheme = "http".to_string();
    url.scheme_type = get_scheme_type("http");
    url.host = Some(crate::host::Host::Domain("dummy.test".to_string()));
    url.path = crate::url::Path::Segments(vec![String::new()]);
    url
}

// Init-field processing: canonicalize for URL matching, pass through
// (minus the component sigils) for pattern compilation.

pub(crate) fn process_protocol_init(value: &str, kind: ProcessKind) -> Result<String, PatternError> {
    let stripped = value.strip_suffix(':').unwrap_or(value);
    if kind == ProcessKind::Pattern {
        return Ok(stripped.to_string());
    }
    canonicalize_protocol(stripped)
}

pub(crate) fn process_username_init(value: &str, kind: ProcessKind) -> Result<String, PatternError> {
    if kind == ProcessKind::Pattern {
        return Ok(value.to_string());
    }
    canonicalize_username(value)
}

pub(crate) fn process_password_init(value: &str, kind: ProcessKind) -> Result<String, PatternError> {
    if kind == ProcessKind::Pattern {
        return Ok(value.to_string());
    }
    canonicalize_password(value)
}

pub(crate) fn process_hostname_init(value: &str, kind: ProcessKind) -> Result<String, PatternError> {
    if kind == ProcessKind::Pattern {
        return Ok(value.to_string());
    }
    canonicalize_hostname(value)
}

pub(crate) fn process_port_init(
    value: &str,
    protocol: Option<&str>,
    kind: ProcessKind,
) -> Result<String, PatternError> {
    if kind == ProcessKind::Pattern {
        return Ok(value.to_string());
    }
    canonicalize_port(value, protocol)
}

pub(crate) fn process_pathname_init(
    value: &str,
    protocol: Option<&str>,
    kind: ProcessKind,
) -> Result<String, PatternError> {
    if kind == ProcessKind::Pattern {
        return Ok(value.to_string());
    }
    // An empty or special protocol means a standard, slash-delimited
    // path
    let standard = protocol
        .is_none_or(|protocol| protocol.is_empty() || get_scheme_type(protocol).is_special());
    if standard {
        canonicalize_pathname(value)
    } else {
        canonicalize_opaque_pathname(value)
    }
}

pub(crate) fn process_search_init(value: &str, kind: ProcessKind) -> Result<String, PatternError> {
    let stripped = value.strip_prefix('?').unwrap_or(value);
    if kind == ProcessKind::Pattern {
        return Ok(stripped.to_string());
    }
    canonicalize_search(stripped)
}

pub(crate) fn process_hash_init(value: &str, kind: ProcessKind) -> Result<String, PatternError> {
    let stripped = value.strip_prefix('#').unwrap_or(value);
    if kind == ProcessKind::Pattern {
        return Ok(stripped.to_string());
    }
    canonicalize_hash(stripped)
}

/// A value lifted out of a base URL: pattern processing has to escape
/// it so URL text never reads as pattern syntax
fn process_base_value(value: &str, kind: ProcessKind) -> String {
    match kind {
        ProcessKind::Pattern => escape_pattern_string(value),
        ProcessKind::Url => value.to_string(),
    }
}

/// Is the pathname absolute, taking pattern syntax into account
/// (`{/...}` and an escaped `\/` both count in pattern mode)
fn is_absolute_pathname(input: &str, kind: ProcessKind) -> bool {
    if input.is_empty() {
        return false;
    }
    if input.starts_with('/') {
        return true;
    }
    if kind == ProcessKind::Url {
        return false;
    }
    input.starts_with("\\/") || input.starts_with("{/")
}

/// Process a `UrlPatternInit`: resolve against its base URL, then
/// canonicalize or pass through each present component.
///
/// A component is inherited from the base only when no more-specific
/// component was given; username and password are never inherited into
/// a pattern.
pub(crate) fn process_init(
    init: &UrlPatternInit,
    kind: ProcessKind,
) -> Result<UrlPatternInit, PatternError> {
    let mut result = UrlPatternInit::default();

    let base_url = match &init.base_url {
        Some(base) => {
            let base = Url::parse(base, None)
                .map_err(|_| type_error(format!("invalid base URL `{base}`")))?;

            if init.protocol.is_none() {
                result.protocol = Some(process_base_value(base.scheme(), kind));
            }
            let inherit_userinfo = kind != ProcessKind::Pattern
                && init.protocol.is_none()
                && init.hostname.is_none()
                && init.port.is_none();
            if inherit_userinfo && init.username.is_none() {
                result.username = Some(process_base_value(base.username(), kind));
            }
            if inherit_userinfo && init.username.is_none() && init.password.is_none() {
                result.password = Some(process_base_value(base.password(), kind));
            }
            if init.protocol.is_none() && init.hostname.is_none() {
                result.hostname = Some(process_base_value(&base.hostname(), kind));
            }
            if init.protocol.is_none() && init.hostname.is_none() && init.port.is_none() {
                result.port = Some(process_base_value(&base.port(), kind));
            }
            if init.protocol.is_none()
                && init.hostname.is_none()
                && init.port.is_none()
                && init.pathname.is_none()
            {
                result.pathname = Some(process_base_value(&base.pathname(), kind));
            }
            if init.protocol.is_none()
                && init.hostname.is_none()
                && init.port.is_none()
                && init.pathname.is_none()
                && init.search.is_none()
            {
                result.search =
                    Some(process_base_value(base.query().unwrap_or_default(), kind));
            }
            if init.protocol.is_none()
                && init.hostname.is_none()
                && init.port.is_none()
                && init.pathname.is_none()
                && init.search.is_none()
                && init.hash.is_none()
            {
                result.hash =
                    Some(process_base_value(base.fragment().unwrap_or_default(), kind));
            }
            Some(base)
        }
        None => None,
    };

    if let Some(protocol) = &init.protocol {
        result.protocol = Some(process_protocol_init(protocol, kind)?);
    }
    if let Some(username) = &init.username {
        result.username = Some(process_username_init(username, kind)?);
    }
    if let Some(password) = &init.password {
        result.password = Some(process_password_init(password, kind)?);
    }
    if let Some(hostname) = &init.hostname {
        result.hostname = Some(process_hostname_init(hostname, kind)?);
    }
    if let Some(port) = &init.port {
        result.port = Some(process_port_init(port, result.protocol.as_deref(), kind)?);
    }
    if let Some(pathname) = &init.pathname {
        let mut pathname = pathname.clone();
        if let Some(base) = &base_url
            && !base.has_opaque_path()
            && !is_absolute_pathname(&pathname, kind)
        {
            // Resolve a relative pathname against the base directory
            let base_pathname = base.pathname();
            if let Some(slash) = base_pathname.rfind('/') {
                pathname = format!("{}{pathname}", &base_pathname[..=slash]);
            }
        }
        result.pathname = Some(process_pathname_init(
            &pathname,
            result.protocol.as_deref(),
            kind,
        )?);
    }
    if let Some(search) = &init.search {
        result.search = Some(process_search_init(search, kind)?);
    }
    if let Some(hash) = &init.hash {
        result.hash = Some(process_hash_init(hash, kind)?);
    }
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn protocol_canonicalization() {
        assert_eq!(canonicalize_protocol("HTTP").unwrap(), "http");
        assert_eq!(canonicalize_protocol("").unwrap(), "");
        assert!(canonicalize_protocol("a b").is_err());
    }

    #[test]
    fn hostname_canonicalization() {
        assert_eq!(canonicalize_hostname("EXAMPLE.com").unwrap(), "example.com");
        assert_eq!(canonicalize_hostname("").unwrap(), "");
        assert!(canonicalize_hostname("bad host").is_err());
    }

    #[test]
    fn ipv6_hostname_canonicalization() {
        assert_eq!(canonicalize_ipv6_hostname("[::1]").unwrap(), "[::1]");
        assert_eq!(canonicalize_ipv6_hostname("[::AB]").unwrap(), "[::ab]");
        assert!(canonicalize_ipv6_hostname("[::z]").is_err());
    }

    #[test]
    fn port_canonicalization() {
        assert_eq!(canonicalize_port("8080", None).unwrap(), "8080");
        assert_eq!(canonicalize_port("443", Some("https")).unwrap(), "");
        assert_eq!(canonicalize_port("443", Some("http")).unwrap(), "443");
        assert!(canonicalize_port("99999", None).is_err());
        assert!(canonicalize_port("8a", None).is_err());
    }

    #[test]
    fn pathname_canonicalization() {
        assert_eq!(canonicalize_pathname("/a/b/../c").unwrap(), "/a/c");
        assert_eq!(canonicalize_pathname("/a b").unwrap(), "/a%20b");
        assert_eq!(canonicalize_pathname("a/b").unwrap(), "a/b");
        assert_eq!(canonicalize_pathname("").unwrap(), "");
    }

    #[test]
    fn relative_pathname_resolves_against_base() {
        let init = UrlPatternInit {
            pathname: Some("c".to_string()),
            base_url: Some("http://h/a/b".to_string()),
            ..Default::default()
        };
        let processed = process_init(&init, ProcessKind::Url).unwrap();
        assert_eq!(processed.pathname.as_deref(), Some("/a/c"));
    }

    #[test]
    fn base_inheritance_stops_at_more_specific_fields() {
        let init = UrlPatternInit {
            pathname: Some("/p".to_string()),
            base_url: Some("http://h:8080/x?q#f".to_string()),
            ..Default::default()
        };
        let processed = process_init(&init, ProcessKind::Url).unwrap();
        assert_eq!(processed.protocol.as_deref(), Some("http"));
        assert_eq!(processed.hostname.as_deref(), Some("h"));
        assert_eq!(processed.port.as_deref(), Some("8080"));
        assert_eq!(processed.pathname.as_deref(), Some("/p"));
        // search and hash are more specific than pathname: not inherited
        assert_eq!(processed.search, None);
        assert_eq!(processed.hash, None);
    }
}
