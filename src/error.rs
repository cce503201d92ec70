/// Errors that can occur during URL parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid scheme format
    InvalidScheme,
    /// Invalid host format
    InvalidHost,
    /// Invalid port number
    InvalidPort,
    /// Invalid IPv4 address
    InvalidIpv4,
    /// Invalid IPv6 address
    InvalidIpv6,
    /// IDNA processing error
    IdnaError,
    /// Input exceeds the 2^32 - 1 byte limit
    InputTooLong,
    /// Relative URL without base
    RelativeUrlWithoutBase,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::InvalidScheme => "Invalid scheme",
            Self::InvalidHost => "Invalid host",
            Self::InvalidPort => "Invalid port",
            Self::InvalidIpv4 => "Invalid IPv4 address",
            Self::InvalidIpv6 => "Invalid IPv6 address",
            Self::IdnaError => "IDNA processing error",
            Self::InputTooLong => "Input too long",
            Self::RelativeUrlWithoutBase => "Relative URL without base",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

/// Result type for URL parsing operations
pub type Result<T> = core::result::Result<T, ParseError>;

/// Validation errors reported by the URL parser.
///
/// These correspond to the "validation error" notes in the WHATWG URL
/// Standard. They are warnings only: the parser reports them through an
/// optional callback and keeps going, and they never change the parse
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// A special scheme was not followed by "//"
    SpecialSchemeMissingFollowingSolidus,
    /// The input includes credentials
    EmbeddedCredentials,
    /// A backslash was treated as a forward slash
    InvalidReverseSolidus,
    /// A Windows drive letter was found in a relative file URL
    FileInvalidWindowsDriveLetter,
    /// A file host looked like a Windows drive letter
    FileInvalidWindowsDriveLetterHost,
}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::SpecialSchemeMissingFollowingSolidus => "special scheme not followed by //",
            Self::EmbeddedCredentials => "input includes credentials",
            Self::InvalidReverseSolidus => "backslash treated as slash",
            Self::FileInvalidWindowsDriveLetter => "Windows drive letter in relative file URL",
            Self::FileInvalidWindowsDriveLetterHost => "file host is a Windows drive letter",
        };
        f.write_str(msg)
    }
}

/// Errors produced by the URL pattern compiler and matcher.
///
/// `TypeError` covers invalid inputs (a bad init combination, a base URL
/// combined with an init, or a component value that fails
/// canonicalization); `CompileError` covers malformed pattern syntax and
/// regular expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    TypeError(String),
    CompileError(String),
}

impl core::fmt::Display for PatternError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TypeError(msg) => write!(f, "TypeError: {msg}"),
            Self::CompileError(msg) => write!(f, "pattern compile error: {msg}"),
        }
    }
}

impl std::error::Error for PatternError {}

impl From<ParseError> for PatternError {
    fn from(error: ParseError) -> Self {
        Self::TypeError(error.to_string())
    }
}
