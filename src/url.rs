use core::fmt::Write;

use crate::character_sets::is_alnum_plus;
use crate::checkers::parse_port;
use crate::error::{Result, ValidationError};
use crate::host::{Host, parse_host};
use crate::parser::parse_url;
use crate::path::{parse_path_segments, serialize_path};
use crate::scheme::{SchemeType, get_scheme_type};
use crate::unicode::percent_encode::{
    FRAGMENT_SET, QUERY_SET, SPECIAL_QUERY_SET, USERINFO_SET, percent_encode_into,
    percent_encode_with,
};

/// The path of a URL record: a list of segments, or a single opaque
/// string for URLs like `mailto:` and `data:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Path {
    Segments(Vec<String>),
    Opaque(String),
}

impl Path {
    pub(crate) fn serialize(&self) -> String {
        match self {
            Self::Segments(segments) => serialize_path(segments),
            Self::Opaque(path) => path.clone(),
        }
    }
}

/// A parsed, normalized URL record.
///
/// Produced by [`Url::parse`] per the WHATWG URL Standard. All stored
/// strings are ASCII and percent-encoded as required; the record can
/// only be changed through the setters, each of which re-runs the
/// relevant sub-parser and leaves the record untouched on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub(crate) scheme: String,
    pub(crate) scheme_type: SchemeType,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) host: Option<Host>,
    pub(crate) port: Option<u16>,
    pub(crate) path: Path,
    pub(crate) query: Option<String>,
    pub(crate) fragment: Option<String>,
}

impl Url {
    pub(crate) fn new() -> Self {
        Self {
            scheme: String::new(),
            scheme_type: SchemeType::NotSpecial,
            username: String::new(),
            password: String::new(),
            host: None,
            port: None,
            path: Path::Segments(Vec::new()),
            query: None,
            fragment: None,
        }
    }

    /// Parse a URL string with an optional base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the input (or the base) is invalid according
    /// to the WHATWG URL Standard.
    pub fn parse(input: &str, base: Option<&str>) -> Result<Self> {
        let base = base.map(|base| parse_url(base, None, &mut None)).transpose()?;
        parse_url(input, base.as_ref(), &mut None)
    }

    /// Parse while reporting validation errors (spec "warnings") to
    /// `reporter`. Reported warnings never change the outcome.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Url::parse`].
    pub fn parse_with_reporter(
        input: &str,
        base: Option<&str>,
        reporter: &mut dyn FnMut(ValidationError),
    ) -> Result<Self> {
        let base = match base {
            Some(base) => Some(parse_url(base, None, &mut Some(&mut *reporter))?),
            None => None,
        };
        parse_url(input, base.as_ref(), &mut Some(reporter))
    }

    /// Check whether a URL string can be parsed, without keeping the
    /// result
    pub fn can_parse(input: &str, base: Option<&str>) -> bool {
        Self::parse(input, base).is_ok()
    }

    // Getters

    /// The scheme, lowercase, without the trailing `:`
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The scheme with the trailing `:` (e.g. "https:")
    pub fn protocol(&self) -> String {
        format!("{}:", self.scheme)
    }

    /// The scheme discriminant, for fast special-scheme checks
    pub fn scheme_type(&self) -> SchemeType {
        self.scheme_type
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// The serialized host, without the port (e.g. "example.com",
    /// "[::1]"), or an empty string for URLs without a host
    pub fn hostname(&self) -> String {
        match &self.host {
            Some(host) => host.serialize(),
            None => String::new(),
        }
    }

    /// The serialized host including a non-default port
    /// (e.g. "example.com:8080")
    pub fn host(&self) -> String {
        let mut out = self.hostname();
        if let Some(port) = self.port {
            let _ = write!(out, ":{port}");
        }
        out
    }

    /// The port as a string, empty when absent (a default port is
    /// always absent)
    pub fn port(&self) -> String {
        match self.port {
            Some(port) => port.to_string(),
            None => String::new(),
        }
    }

    /// The port as a number, `None` when absent
    pub fn port_number(&self) -> Option<u16> {
        self.port
    }

    /// The serialized path (e.g. "/a/b", or the opaque path itself)
    pub fn pathname(&self) -> String {
        self.path.serialize()
    }

    /// The query with its leading `?`, or an empty string
    pub fn search(&self) -> String {
        match self.query.as_deref() {
            Some("") | None => String::new(),
            Some(query) => format!("?{query}"),
        }
    }

    /// The query without the leading `?`; `None` and `Some("")` are
    /// distinct
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The fragment with its leading `#`, or an empty string
    pub fn hash(&self) -> String {
        match self.fragment.as_deref() {
            Some("") | None => String::new(),
            Some(fragment) => format!("#{fragment}"),
        }
    }

    /// The fragment without the leading `#`
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The origin: a (scheme, host, port) tuple for the tuple-origin
    /// schemes, the inner URL's origin for `blob:`, otherwise "null"
    pub fn origin(&self) -> String {
        match self.scheme_type {
            SchemeType::Http
            | SchemeType::Https
            | SchemeType::Ws
            | SchemeType::Wss
            | SchemeType::Ftp => {
                format!("{}://{}", self.scheme, self.host())
            }
            SchemeType::File => "null".to_string(),
            SchemeType::NotSpecial if self.scheme == "blob" => {
                match Self::parse(&self.pathname(), None) {
                    Ok(inner)
                        if matches!(
                            inner.scheme_type,
                            SchemeType::Http | SchemeType::Https
                        ) =>
                    {
                        inner.origin()
                    }
                    _ => "null".to_string(),
                }
            }
            SchemeType::NotSpecial => "null".to_string(),
        }
    }

    /// Serialize the whole record. `//` appears exactly when the record
    /// has an authority.
    pub fn href(&self) -> String {
        let mut out = String::with_capacity(self.scheme.len() + 24);
        out.push_str(&self.scheme);
        out.push(':');

        if let Some(host) = &self.host {
            out.push_str("//");
            if self.has_credentials() {
                out.push_str(&self.username);
                if !self.password.is_empty() {
                    out.push(':');
                    out.push_str(&self.password);
                }
                out.push('@');
            }
            out.push_str(&host.serialize());
            if let Some(port) = self.port {
                let _ = write!(out, ":{port}");
            }
        } else if let Path::Segments(segments) = &self.path {
            // A host-less path starting with "//" would reparse as an
            // authority; "/." disambiguates
            if segments.len() > 1 && segments[0].is_empty() {
                out.push_str("/.");
            }
        }

        out.push_str(&self.path.serialize());
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }

    // Predicates

    pub fn is_special(&self) -> bool {
        self.scheme_type.is_special()
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() || !self.password.is_empty()
    }

    pub fn has_opaque_path(&self) -> bool {
        matches!(self.path, Path::Opaque(_))
    }

    pub fn has_hostname(&self) -> bool {
        matches!(&self.host, Some(host) if !host.is_empty())
    }

    pub fn has_empty_hostname(&self) -> bool {
        matches!(&self.host, Some(Host::Empty))
    }

    pub fn has_port(&self) -> bool {
        self.port.is_some()
    }

    pub fn has_search(&self) -> bool {
        self.query.is_some()
    }

    pub fn has_hash(&self) -> bool {
        self.fragment.is_some()
    }

    /// Credentials and ports are only representable with a real
    /// authority, and never on `file:`
    fn cannot_have_credentials_or_port(&self) -> bool {
        !self.has_hostname() || self.scheme_type == SchemeType::File
    }

    // Setters

    /// Replace the whole record by re-parsing `href`.
    ///
    /// # Errors
    ///
    /// Returns an error if `href` is invalid; the record is unchanged.
    pub fn set_href(&mut self, href: &str) -> Result<()> {
        *self = Self::parse(href, None)?;
        Ok(())
    }

    /// Change the scheme. A scheme can only change within its family:
    /// special stays special, non-special stays non-special, and
    /// `file:` cannot be entered or left.
    pub fn set_protocol(&mut self, protocol: &str) -> bool {
        let protocol = protocol.strip_suffix(':').unwrap_or(protocol);
        let bytes = protocol.as_bytes();
        let valid_scheme = bytes.first().is_some_and(|b| b.is_ascii_alphabetic())
            && bytes.iter().all(|&b| is_alnum_plus(b));
        if !valid_scheme {
            return false;
        }

        let scheme = protocol.to_ascii_lowercase();
        let scheme_type = get_scheme_type(&scheme);
        if scheme_type.is_special() != self.scheme_type.is_special() {
            return false;
        }
        if scheme_type == SchemeType::File || self.scheme_type == SchemeType::File {
            return false;
        }

        self.scheme = scheme;
        self.scheme_type = scheme_type;
        // The old port may have become the new default
        if let Some(port) = self.port
            && scheme_type.default_port() == Some(port)
        {
            self.port = None;
        }
        true
    }

    pub fn set_username(&mut self, username: &str) -> bool {
        if self.cannot_have_credentials_or_port() {
            return false;
        }
        self.username = percent_encode_with(username, USERINFO_SET);
        true
    }

    pub fn set_password(&mut self, password: &str) -> bool {
        if self.cannot_have_credentials_or_port() {
            return false;
        }
        self.password = percent_encode_with(password, USERINFO_SET);
        true
    }

    /// Set host and, optionally, port from a "host:port" string
    pub fn set_host(&mut self, host: &str) -> bool {
        if self.has_opaque_path() {
            return false;
        }
        let (hostname, port) = split_host_port(host);
        let Ok(parsed) = parse_host(hostname, !self.is_special()) else {
            return false;
        };
        if parsed.is_empty() && self.is_special() && self.scheme_type != SchemeType::File {
            return false;
        }
        let new_port = match port {
            Some("") | None => self.port,
            Some(port) => match parse_port(port) {
                Some(port) => (self.scheme_type.default_port() != Some(port)).then_some(port),
                None => return false,
            },
        };
        self.host = Some(parsed);
        self.port = new_port;
        true
    }

    pub fn set_hostname(&mut self, hostname: &str) -> bool {
        if self.has_opaque_path() {
            return false;
        }
        let Ok(parsed) = parse_host(hostname, !self.is_special()) else {
            return false;
        };
        if parsed.is_empty() && self.is_special() && self.scheme_type != SchemeType::File {
            return false;
        }
        self.host = Some(parsed);
        true
    }

    pub fn set_port(&mut self, port: &str) -> bool {
        if self.cannot_have_credentials_or_port() {
            return false;
        }
        if port.is_empty() {
            self.port = None;
            return true;
        }
        let Some(port) = parse_port(port) else {
            return false;
        };
        self.port = (self.scheme_type.default_port() != Some(port)).then_some(port);
        true
    }

    pub fn set_pathname(&mut self, pathname: &str) -> bool {
        if self.has_opaque_path() {
            return false;
        }
        let mut segments = Vec::new();
        if pathname.is_empty() {
            if self.is_special() {
                segments.push(String::new());
            }
        } else {
            let view = if let Some(stripped) = pathname.strip_prefix('/') {
                stripped
            } else if self.is_special() && pathname.starts_with('\\') {
                &pathname[1..]
            } else {
                pathname
            };
            parse_path_segments(view, self.scheme_type, &mut segments);
        }
        self.path = Path::Segments(segments);
        true
    }

    pub fn set_search(&mut self, search: &str) {
        if search.is_empty() {
            self.query = None;
            return;
        }
        let search = search.strip_prefix('?').unwrap_or(search);
        let set = if self.is_special() {
            SPECIAL_QUERY_SET
        } else {
            QUERY_SET
        };
        let mut encoded = String::new();
        percent_encode_into(&mut encoded, search, set);
        self.query = Some(encoded);
    }

    pub fn set_hash(&mut self, hash: &str) {
        if hash.is_empty() {
            self.fragment = None;
            return;
        }
        let hash = hash.strip_prefix('#').unwrap_or(hash);
        let mut encoded = String::new();
        percent_encode_into(&mut encoded, hash, FRAGMENT_SET);
        self.fragment = Some(encoded);
    }
}

impl core::fmt::Display for Url {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.href())
    }
}

impl core::str::FromStr for Url {
    type Err = crate::error::ParseError;

    fn from_str(input: &str) -> Result<Self> {
        Self::parse(input, None)
    }
}

/// Split a "host:port" string, honoring IPv6 brackets
fn split_host_port(input: &str) -> (&str, Option<&str>) {
    if input.starts_with('[') {
        if let Some(end) = memchr::memchr(b']', input.as_bytes()) {
            let rest = &input[end + 1..];
            return (&input[..=end], rest.strip_prefix(':'));
        }
        return (input, None);
    }
    match memchr::memchr(b':', input.as_bytes()) {
        Some(pos) => (&input[..pos], Some(&input[pos + 1..])),
        None => (input, None),
    }
}
