/// URL scheme discriminant. The six special schemes get their own
/// variants so the parser can branch without string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemeType {
    Http,
    Https,
    Ws,
    Wss,
    Ftp,
    File,
    #[default]
    NotSpecial,
}

impl SchemeType {
    /// Check if this is a special scheme
    pub fn is_special(self) -> bool {
        self != Self::NotSpecial
    }

    /// Get the default port for this scheme
    pub fn default_port(self) -> Option<u16> {
        match self {
            Self::Http | Self::Ws => Some(80),
            Self::Https | Self::Wss => Some(443),
            Self::Ftp => Some(21),
            Self::File | Self::NotSpecial => None,
        }
    }
}

/// Get the scheme type from a scheme string (lowercase, without `:`).
/// Filters by length and first byte before the full comparison.
pub fn get_scheme_type(scheme: &str) -> SchemeType {
    let bytes = scheme.as_bytes();
    match (bytes.len(), bytes.first()) {
        (2, Some(b'w')) if bytes == b"ws" => SchemeType::Ws,
        (3, Some(b'w')) if bytes == b"wss" => SchemeType::Wss,
        (3, Some(b'f')) if bytes == b"ftp" => SchemeType::Ftp,
        (4, Some(b'h')) if bytes == b"http" => SchemeType::Http,
        (4, Some(b'f')) if bytes == b"file" => SchemeType::File,
        (5, Some(b'h')) if bytes == b"https" => SchemeType::Https,
        _ => SchemeType::NotSpecial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_types() {
        assert_eq!(get_scheme_type("http"), SchemeType::Http);
        assert_eq!(get_scheme_type("wss"), SchemeType::Wss);
        assert_eq!(get_scheme_type("file"), SchemeType::File);
        assert_eq!(get_scheme_type("data"), SchemeType::NotSpecial);
        assert_eq!(get_scheme_type(""), SchemeType::NotSpecial);
    }

    #[test]
    fn default_ports() {
        assert_eq!(SchemeType::Http.default_port(), Some(80));
        assert_eq!(SchemeType::Https.default_port(), Some(443));
        assert_eq!(SchemeType::Ftp.default_port(), Some(21));
        assert_eq!(SchemeType::Ws.default_port(), Some(80));
        assert_eq!(SchemeType::Wss.default_port(), Some(443));
        assert_eq!(SchemeType::File.default_port(), None);
    }
}
