use crate::character_sets::is_forbidden_host_code_point;
use crate::checkers::host_ends_in_a_number;
use crate::error::{ParseError, Result};
use crate::ipv4::{parse_ipv4, serialize_ipv4};
use crate::ipv6::{parse_ipv6, serialize_ipv6};
use crate::unicode::idna::domain_to_ascii;
use crate::unicode::percent_encode::{C0_CONTROL_SET, percent_decode, percent_encode_with};

/// A parsed host. The classes are mutually exclusive: a host is exactly
/// one of a domain, an IPv4 address, an IPv6 address, an opaque string
/// or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    /// A registrable domain, ASCII after IDNA processing
    Domain(String),
    Ipv4(u32),
    Ipv6([u16; 8]),
    /// An unvalidated host for non-special schemes, percent-encoded
    Opaque(String),
    Empty,
}

impl Host {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Serialize per the WHATWG host serializer. IPv6 addresses are
    /// bracketed.
    pub fn serialize(&self) -> String {
        match self {
            Self::Domain(domain) => domain.clone(),
            Self::Ipv4(address) => serialize_ipv4(*address),
            Self::Ipv6(pieces) => format!("[{}]", serialize_ipv6(pieces)),
            Self::Opaque(host) => host.clone(),
            Self::Empty => String::new(),
        }
    }
}

impl core::fmt::Display for Host {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// Parse a host string per the WHATWG host parser.
///
/// `is_not_special` selects opaque-host handling (no percent-decoding,
/// no IDNA, forbidden code points rejected but everything else kept).
pub fn parse_host(input: &str, is_not_special: bool) -> Result<Host> {
    if input.starts_with('[') {
        if !input.ends_with(']') {
            return Err(ParseError::InvalidIpv6);
        }
        return parse_ipv6(input).map(Host::Ipv6);
    }
    if is_not_special {
        return parse_opaque_host(input);
    }
    if input.is_empty() {
        return Err(ParseError::InvalidHost);
    }

    let domain = percent_decode(input);
    let ascii = domain_to_ascii(&domain)?;

    if host_ends_in_a_number(&ascii) {
        return parse_ipv4(&ascii).map(Host::Ipv4);
    }
    Ok(Host::Domain(ascii))
}

/// Opaque host parser: validate against forbidden host code points and
/// percent-encode with the C0 control set. `%` is allowed through
/// untouched.
fn parse_opaque_host(input: &str) -> Result<Host> {
    if input.is_empty() {
        return Ok(Host::Empty);
    }
    if input
        .bytes()
        .any(|b| b.is_ascii() && is_forbidden_host_code_point(b))
    {
        return Err(ParseError::InvalidHost);
    }
    Ok(Host::Opaque(percent_encode_with(input, C0_CONTROL_SET)))
}
