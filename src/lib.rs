//! A WHATWG-conformant URL parser and URL pattern matcher.
//!
//! [`Url`] parses byte strings (with optional base-URL resolution) into
//! normalized URL records with JavaScript-style getters and setters;
//! [`UrlSearchParams`] handles `application/x-www-form-urlencoded`
//! query strings; [`UrlPattern`] compiles URL pattern strings or init
//! records into per-component matchers.
//!
//! ```
//! use urlkit::Url;
//!
//! let url = Url::parse("hTTp://EXAMPLE.com:80/a/../b?q#f", None).unwrap();
//! assert_eq!(url.href(), "http://example.com/b?q#f");
//! assert_eq!(url.port(), "");
//! ```

// Internal modules
mod character_sets;
mod checkers;
mod error;
mod helpers;
mod host;
mod ipv4;
mod ipv6;
mod parser;
mod path;
mod pattern;
mod scheme;
mod search_params;
mod unicode;
mod url;

// Public API
pub use error::{ParseError, PatternError, ValidationError};
pub use host::Host;
pub use pattern::{
    PatternComponentResult, UrlPattern, UrlPatternInit, UrlPatternInput, UrlPatternOptions,
    UrlPatternResult,
};
pub use scheme::SchemeType;
pub use search_params::UrlSearchParams;
pub use url::Url;

pub type Result<T> = core::result::Result<T, ParseError>;
