use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

// Percent-encode sets from the WHATWG URL Standard,
// https://url.spec.whatwg.org/#percent-encoded-bytes
// Non-ASCII bytes are always encoded; the sets list the ASCII additions.

/// C0 control percent-encode set
pub const C0_CONTROL_SET: &AsciiSet = CONTROLS;

/// Fragment percent-encode set: C0 control plus space, `"`, `<`, `>`, `` ` ``
pub const FRAGMENT_SET: &AsciiSet = &C0_CONTROL_SET
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Query percent-encode set (non-special URLs):
/// C0 control plus space, `"`, `#`, `<`, `>`
pub const QUERY_SET: &AsciiSet = &C0_CONTROL_SET
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>');

/// Special-query percent-encode set: query plus `'`
pub const SPECIAL_QUERY_SET: &AsciiSet = &QUERY_SET.add(b'\'');

/// Path percent-encode set: fragment plus `#`, `?`, `^`, `{`, `}`
pub const PATH_SET: &AsciiSet = &FRAGMENT_SET
    .add(b'#')
    .add(b'?')
    .add(b'^')
    .add(b'{')
    .add(b'}');

/// Userinfo percent-encode set:
/// path plus `/`, `:`, `;`, `=`, `@`, `[`, `\`, `]`, `^`, `|`
pub const USERINFO_SET: &AsciiSet = &PATH_SET
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'=')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'|');

/// Component percent-encode set: userinfo plus `$`, `%`, `&`, `+`, `,`
pub const COMPONENT_SET: &AsciiSet = &USERINFO_SET
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',');

/// `application/x-www-form-urlencoded` percent-encode set:
/// component plus `!`, `'`, `(`, `)`, `~`
pub const FORM_URLENCODED_SET: &AsciiSet = &COMPONENT_SET
    .add(b'!')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'~');

/// Append `input` to `buffer`, percent-encoding every byte in `set`
/// (and every non-ASCII byte). Returns whether anything was escaped.
pub fn percent_encode_into(buffer: &mut String, input: &str, set: &'static AsciiSet) -> bool {
    buffer.reserve(input.len());
    let mut escaped = false;
    for chunk in utf8_percent_encode(input, set) {
        if chunk.len() != input.len() {
            escaped = true;
        }
        buffer.push_str(chunk);
    }
    escaped
}

/// Percent-encode `input` with `set` into a fresh string
pub fn percent_encode_with(input: &str, set: &'static AsciiSet) -> String {
    utf8_percent_encode(input, set).to_string()
}

/// Decode percent-encoded bytes. Invalid `%HH` sequences are kept
/// literally; invalid UTF-8 decodes with replacement characters.
pub fn percent_decode(input: &str) -> String {
    percent_encoding::percent_decode_str(input)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_keeps_invalid_sequences() {
        assert_eq!(percent_decode("hello%20world"), "hello world");
        assert_eq!(percent_decode("%2F"), "/");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%X%"), "%X%");
        assert_eq!(percent_decode("%C3%A9"), "é");
    }

    #[test]
    fn encode_round_trip() {
        let input = "a b/c?d#e";
        let encoded = percent_encode_with(input, COMPONENT_SET);
        assert_eq!(encoded, "a%20b%2Fc%3Fd%23e");
        assert_eq!(percent_decode(&encoded), input);
    }

    #[test]
    fn encode_into_reports_escaping() {
        let mut out = String::new();
        assert!(!percent_encode_into(&mut out, "plain", PATH_SET));
        assert!(percent_encode_into(&mut out, "with space", PATH_SET));
        assert_eq!(out, "plainwith%20space");
    }

    #[test]
    fn query_sets_differ_on_single_quote() {
        assert_eq!(percent_encode_with("'", QUERY_SET), "'");
        assert_eq!(percent_encode_with("'", SPECIAL_QUERY_SET), "%27");
    }
}
