use std::borrow::Cow;

use crate::character_sets::{is_ascii_tab_or_newline, is_c0_control_or_space};

/// Fast check if string contains tabs or newlines
pub fn has_tabs_or_newline(input: &str) -> bool {
    memchr::memchr3(b'\t', b'\n', b'\r', input.as_bytes()).is_some()
}

/// Trim leading and trailing C0 controls and spaces (zero-copy)
pub fn trim_c0_and_space(input: &str) -> &str {
    input.trim_matches(|c: char| c.is_ascii() && is_c0_control_or_space(c as u8))
}

/// Trim C0 controls and spaces from the edges and strip internal
/// tabs/newlines, per the WHATWG URL preprocessing steps.
/// Allocates only when a tab or newline survives the trim.
pub fn clean_input(input: &str) -> Cow<'_, str> {
    let trimmed = trim_c0_and_space(input);
    if !has_tabs_or_newline(trimmed) {
        return Cow::Borrowed(trimmed);
    }
    let mut out = String::with_capacity(trimmed.len());
    for part in trimmed.split(|c: char| c.is_ascii() && is_ascii_tab_or_newline(c as u8)) {
        out.push_str(part);
    }
    Cow::Owned(out)
}

/// Split off the fragment at the first `#`.
/// Returns (input without fragment, fragment without the leading `#`).
pub fn split_fragment(input: &str) -> (&str, Option<&str>) {
    memchr::memchr(b'#', input.as_bytes()).map_or((input, None), |pos| {
        (&input[..pos], Some(&input[pos + 1..]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_input_trims_and_filters() {
        assert_eq!(clean_input("\t\nhello\r\n"), "hello");
        assert_eq!(clean_input("hello"), "hello");
        assert_eq!(clean_input("\t\n\r"), "");
        assert_eq!(clean_input("hel\tlo\nworld"), "helloworld");
        // Spaces are trimmed at the edges but kept internally
        assert_eq!(clean_input("  hello world  "), "hello world");
    }

    #[test]
    fn clean_input_is_zero_copy_for_clean_strings() {
        assert!(matches!(clean_input("http://a/b"), Cow::Borrowed(_)));
        assert!(matches!(clean_input("ht\ttp://a/b"), Cow::Owned(_)));
    }

    #[test]
    fn split_fragment_takes_first_hash() {
        assert_eq!(split_fragment("a#b#c"), ("a", Some("b#c")));
        assert_eq!(split_fragment("a"), ("a", None));
        assert_eq!(split_fragment("#x"), ("", Some("x")));
        assert_eq!(split_fragment("a#"), ("a", Some("")));
    }
}
