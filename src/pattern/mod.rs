//! URL pattern compiler and matcher. A pattern holds eight compiled
//! components (protocol, username, password, hostname, port, pathname,
//! search, hash), each matched independently against the corresponding
//! component of a parsed URL.

mod canonicalize;
mod component;
mod constructor;
mod parser;
mod tokenizer;

use crate::error::PatternError;
use crate::scheme::get_scheme_type;
use crate::url::Url;

use canonicalize::{ProcessKind, process_init};
use component::Component;
use parser::CompileOptions;

/// The structured constructor input: eight optional component pattern
/// strings and an optional base URL to resolve against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlPatternInit {
    pub protocol: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub hostname: Option<String>,
    pub port: Option<String>,
    pub pathname: Option<String>,
    pub search: Option<String>,
    pub hash: Option<String>,
    pub base_url: Option<String>,
}

/// Constructor and match input: a combined pattern/URL string or a
/// structured init
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPatternInput {
    String(String),
    Init(UrlPatternInit),
}

impl From<&str> for UrlPatternInput {
    fn from(input: &str) -> Self {
        Self::String(input.to_string())
    }
}

impl From<String> for UrlPatternInput {
    fn from(input: String) -> Self {
        Self::String(input)
    }
}

impl From<UrlPatternInit> for UrlPatternInput {
    fn from(init: UrlPatternInit) -> Self {
        Self::Init(init)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlPatternOptions {
    pub ignore_case: bool,
}

/// The result of a successful [`UrlPattern::exec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPatternResult {
    pub protocol: PatternComponentResult,
    pub username: PatternComponentResult,
    pub password: PatternComponentResult,
    pub hostname: PatternComponentResult,
    pub port: PatternComponentResult,
    pub pathname: PatternComponentResult,
    pub search: PatternComponentResult,
    pub hash: PatternComponentResult,
}

/// Per-component match result: the input that was matched and the
/// captured groups in pattern order. Groups skipped by an optional
/// matcher hold `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternComponentResult {
    pub input: String,
    pub groups: Vec<(String, Option<String>)>,
}

impl PatternComponentResult {
    /// Look up a captured group by name
    pub fn group(&self, name: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .and_then(|(_, value)| value.as_deref())
    }
}

/// A compiled URL pattern.
///
/// ```
/// use urlkit::UrlPattern;
///
/// let pattern = UrlPattern::parse(
///     "https://*.example.com/foo/:bar".into(),
///     None,
///     Default::default(),
/// )
/// .unwrap();
/// assert!(pattern.test("https://a.example.com/foo/42".into(), None).unwrap());
/// ```
#[derive(Debug)]
pub struct UrlPattern {
    protocol: Component,
    username: Component,
    password: Component,
    hostname: Component,
    port: Component,
    pathname: Component,
    search: Component,
    hash: Component,
}

/// The eight component strings a URL contributes to a match
struct MatchInput {
    protocol: String,
    username: String,
    password: String,
    hostname: String,
    port: String,
    pathname: String,
    search: String,
    hash: String,
}

impl UrlPattern {
    /// Compile a pattern from a combined string or an init record.
    ///
    /// # Errors
    ///
    /// `TypeError` for invalid input combinations (an init together
    /// with a base URL, a relative pattern string without one, or a
    /// component failing canonicalization); `CompileError` for
    /// malformed pattern syntax.
    pub fn parse(
        input: UrlPatternInput,
        base_url: Option<&str>,
        options: UrlPatternOptions,
    ) -> Result<Self, PatternError> {
        let init = match input {
            UrlPatternInput::String(pattern) => {
                let mut init = constructor::parse_constructor_string(&pattern)?;
                if base_url.is_none() && init.protocol.is_none() {
                    return Err(PatternError::TypeError(
                        "a relative pattern requires a base URL".to_string(),
                    ));
                }
                init.base_url = base_url.map(str::to_string);
                init
            }
            UrlPatternInput::Init(init) => {
                if base_url.is_some() {
                    return Err(PatternError::TypeError(
                        "a base URL cannot be combined with a structured init".to_string(),
                    ));
                }
                init
            }
        };

        let mut processed = process_init(&init, ProcessKind::Pattern)?;

        // A literal special scheme with its literal default port
        // compiles to the empty port pattern
        if let (Some(protocol), Some(port)) = (&processed.protocol, &processed.port)
            && get_scheme_type(protocol)
                .default_port()
                .is_some_and(|default| default.to_string() == *port)
        {
            processed.port = Some(String::new());
        }

        let protocol = Component::compile(
            processed.protocol.as_deref(),
            &canonicalize::canonicalize_protocol,
            &CompileOptions::default(),
        )?;

        let hostname_input = processed.hostname.as_deref();
        let hostname = if hostname_input.is_some_and(hostname_pattern_is_ipv6) {
            // Colons inside an IPv6 literal would read as group names;
            // escape them before tokenizing
            let escaped = escape_ipv6_colons(hostname_input.unwrap_or_default());
            Component::compile(
                Some(&escaped),
                &canonicalize::canonicalize_ipv6_hostname,
                &CompileOptions::hostname(),
            )?
        } else {
            Component::compile(
                hostname_input,
                &canonicalize::canonicalize_hostname,
                &CompileOptions::hostname(),
            )?
        };

        let case_options = CompileOptions {
            ignore_case: options.ignore_case,
            ..CompileOptions::default()
        };

        let pathname = if protocol.protocol_matches_special_scheme() {
            Component::compile(
                processed.pathname.as_deref(),
                &canonicalize::canonicalize_pathname,
                &CompileOptions {
                    ignore_case: options.ignore_case,
                    ..CompileOptions::pathname()
                },
            )?
        } else {
            Component::compile(
                processed.pathname.as_deref(),
                &canonicalize::canonicalize_opaque_pathname,
                &case_options,
            )?
        };

        Ok(Self {
            protocol,
            username: Component::compile(
                processed.username.as_deref(),
                &canonicalize::canonicalize_username,
                &CompileOptions::default(),
            )?,
            password: Component::compile(
                processed.password.as_deref(),
                &canonicalize::canonicalize_password,
                &CompileOptions::default(),
            )?,
            hostname,
            port: Component::compile(
                processed.port.as_deref(),
                &|port| canonicalize::canonicalize_port(port, None),
                &CompileOptions::default(),
            )?,
            pathname,
            search: Component::compile(
                processed.search.as_deref(),
                &canonicalize::canonicalize_search,
                &case_options,
            )?,
            hash: Component::compile(
                processed.hash.as_deref(),
                &canonicalize::canonicalize_hash,
                &case_options,
            )?,
        })
    }

    // Pattern-string accessors

    pub fn protocol(&self) -> &str {
        &self.protocol.pattern_string
    }

    pub fn username(&self) -> &str {
        &self.username.pattern_string
    }

    pub fn password(&self) -> &str {
        &self.password.pattern_string
    }

    pub fn hostname(&self) -> &str {
        &self.hostname.pattern_string
    }

    pub fn port(&self) -> &str {
        &self.port.pattern_string
    }

    pub fn pathname(&self) -> &str {
        &self.pathname.pattern_string
    }

    pub fn search(&self) -> &str {
        &self.search.pattern_string
    }

    pub fn hash(&self) -> &str {
        &self.hash.pattern_string
    }

    /// Whether any component carries a custom regexp group
    pub fn has_regexp_groups(&self) -> bool {
        self.protocol.has_regexp_groups()
            || self.username.has_regexp_groups()
            || self.password.has_regexp_groups()
            || self.hostname.has_regexp_groups()
            || self.port.has_regexp_groups()
            || self.pathname.has_regexp_groups()
            || self.search.has_regexp_groups()
            || self.hash.has_regexp_groups()
    }

    /// Test an input against the pattern.
    ///
    /// # Errors
    ///
    /// `TypeError` when a structured init input is combined with a
    /// base URL string.
    pub fn test(
        &self,
        input: UrlPatternInput,
        base_url: Option<&str>,
    ) -> Result<bool, PatternError> {
        self.run_match(input, base_url).map(|result| result.is_some())
    }

    /// Execute the pattern against an input, returning per-component
    /// captures, or `None` when the input does not match (or does not
    /// parse as a URL).
    ///
    /// # Errors
    ///
    /// `TypeError` when a structured init input is combined with a
    /// base URL string.
    pub fn exec(
        &self,
        input: UrlPatternInput,
        base_url: Option<&str>,
    ) -> Result<Option<UrlPatternResult>, PatternError> {
        self.run_match(input, base_url)
    }

    fn run_match(
        &self,
        input: UrlPatternInput,
        base_url: Option<&str>,
    ) -> Result<Option<UrlPatternResult>, PatternError> {
        let Some(input) = build_match_input(input, base_url)? else {
            return Ok(None);
        };

        let captures = (
            self.protocol.matches(&input.protocol),
            self.username.matches(&input.username),
            self.password.matches(&input.password),
            self.hostname.matches(&input.hostname),
            self.port.matches(&input.port),
            self.pathname.matches(&input.pathname),
            self.search.matches(&input.search),
            self.hash.matches(&input.hash),
        );

        let (
            Some(protocol),
            Some(username),
            Some(password),
            Some(hostname),
            Some(port),
            Some(pathname),
            Some(search),
            Some(hash),
        ) = captures
        else {
            return Ok(None);
        };

        Ok(Some(UrlPatternResult {
            protocol: self.protocol.create_match_result(input.protocol, protocol),
            username: self.username.create_match_result(input.username, username),
            password: self.password.create_match_result(input.password, password),
            hostname: self.hostname.create_match_result(input.hostname, hostname),
            port: self.port.create_match_result(input.port, port),
            pathname: self.pathname.create_match_result(input.pathname, pathname),
            search: self.search.create_match_result(input.search, search),
            hash: self.hash.create_match_result(input.hash, hash),
        }))
    }
}

/// Turn a match input into the eight component strings. Inputs that
/// fail to parse (or an init that fails processing) yield `Ok(None)`:
/// they simply do not match.
fn build_match_input(
    input: UrlPatternInput,
    base_url: Option<&str>,
) -> Result<Option<MatchInput>, PatternError> {
    match input {
        UrlPatternInput::String(url) => {
            let Ok(url) = Url::parse(&url, base_url) else {
                return Ok(None);
            };
            Ok(Some(MatchInput {
                protocol: url.scheme().to_string(),
                username: url.username().to_string(),
                password: url.password().to_string(),
                hostname: url.hostname(),
                port: url.port(),
                pathname: url.pathname(),
                search: url.query().unwrap_or_default().to_string(),
                hash: url.fragment().unwrap_or_default().to_string(),
            }))
        }
        UrlPatternInput::Init(init) => {
            if base_url.is_some() {
                return Err(PatternError::TypeError(
                    "a base URL cannot be combined with a structured init".to_string(),
                ));
            }
            let Ok(processed) = process_init(&init, ProcessKind::Url) else {
                return Ok(None);
            };
            Ok(Some(MatchInput {
                protocol: processed.protocol.unwrap_or_default(),
                username: processed.username.unwrap_or_default(),
                password: processed.password.unwrap_or_default(),
                hostname: processed.hostname.unwrap_or_default(),
                port: processed.port.unwrap_or_default(),
                pathname: processed.pathname.unwrap_or_default(),
                search: processed.search.unwrap_or_default(),
                hash: processed.hash.unwrap_or_default(),
            }))
        }
    }
}

/// An IPv6 hostname pattern starts with `[`, possibly grouped or
/// escaped
fn hostname_pattern_is_ipv6(input: &str) -> bool {
    input.len() >= 2
        && (input.starts_with('[') || input.starts_with("{[") || input.starts_with("\\["))
}

/// Escape the colons of an IPv6 hostname pattern so they tokenize as
/// literals instead of group names. Already-escaped characters pass
/// through untouched.
fn escape_ipv6_colons(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            ':' => out.push_str("\\:"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ipv6_hostname_detection() {
        assert!(hostname_pattern_is_ipv6("[::1]"));
        assert!(hostname_pattern_is_ipv6("{[::1]}"));
        assert!(hostname_pattern_is_ipv6("\\[::1]"));
        assert!(!hostname_pattern_is_ipv6("example.com"));
        assert!(!hostname_pattern_is_ipv6("["));
    }

    #[test]
    fn ipv6_colon_escaping() {
        assert_eq!(escape_ipv6_colons("[::1]"), "[\\:\\:1]");
        assert_eq!(escape_ipv6_colons("[\\:a]"), "[\\:a]");
    }

    #[test]
    fn ipv6_hostname_pattern_matches() {
        let pattern = UrlPattern::parse(
            UrlPatternInit {
                hostname: Some("[::1]".to_string()),
                ..Default::default()
            }
            .into(),
            None,
            UrlPatternOptions::default(),
        )
        .unwrap();
        assert!(
            pattern
                .test("http://[::1]/anything".into(), None)
                .unwrap()
        );
        assert!(!pattern.test("http://[::2]/".into(), None).unwrap());
    }
}
