#![allow(clippy::unwrap_used)]

//! URL pattern compilation and matching tests.

use urlkit::{PatternError, UrlPattern, UrlPatternInit, UrlPatternInput, UrlPatternOptions};

fn compile(pattern: &str) -> UrlPattern {
    UrlPattern::parse(pattern.into(), None, UrlPatternOptions::default()).unwrap()
}

fn pathname_pattern(pathname: &str) -> UrlPattern {
    UrlPattern::parse(
        UrlPatternInit {
            pathname: Some(pathname.to_string()),
            ..Default::default()
        }
        .into(),
        None,
        UrlPatternOptions::default(),
    )
    .unwrap()
}

#[test]
fn wildcard_hostname_with_named_path_group() {
    let pattern = compile("https://*.example.com/foo/:bar");
    assert!(pattern.test("https://a.example.com/foo/42".into(), None).unwrap());

    let result = pattern
        .exec("https://a.example.com/foo/42".into(), None)
        .unwrap()
        .unwrap();
    assert_eq!(result.pathname.group("bar"), Some("42"));
    assert_eq!(result.hostname.group("0"), Some("a"));
    assert_eq!(result.pathname.input, "/foo/42");

    assert!(!pattern.test("https://example.com/foo/42".into(), None).unwrap());
    assert!(!pattern.test("http://a.example.com/foo/42".into(), None).unwrap());
    assert!(!pattern.test("https://a.example.com/foo/42/x".into(), None).unwrap());
}

#[test]
fn optional_group_in_braces() {
    let pattern = pathname_pattern("{/items/:id}?");
    let result = pattern
        .exec(
            UrlPatternInit {
                pathname: Some("/items/7".to_string()),
                ..Default::default()
            }
            .into(),
            None,
        )
        .unwrap()
        .unwrap();
    assert_eq!(result.pathname.group("id"), Some("7"));

    // The whole group is optional
    let empty = pattern
        .exec(
            UrlPatternInit {
                pathname: Some(String::new()),
                ..Default::default()
            }
            .into(),
            None,
        )
        .unwrap();
    assert!(empty.is_some());
}

#[test]
fn braced_optional_scheme_character() {
    let pattern = compile("http{s}?://host/");
    assert!(pattern.test("http://host/".into(), None).unwrap());
    assert!(pattern.test("https://host/".into(), None).unwrap());
    assert!(!pattern.test("ftp://host/".into(), None).unwrap());
    assert_eq!(pattern.protocol(), "http{s}?");
}

#[test]
fn pattern_string_accessors_are_canonical() {
    let pattern = compile("https://example.com/a/:b");
    assert_eq!(pattern.protocol(), "https");
    assert_eq!(pattern.hostname(), "example.com");
    assert_eq!(pattern.pathname(), "/a/:b");
    assert_eq!(pattern.username(), "*");
    assert_eq!(pattern.password(), "*");
    // A concrete hostname pins the port to the default
    assert_eq!(pattern.port(), "");
    assert_eq!(pattern.search(), "*");
    assert_eq!(pattern.hash(), "*");
}

#[test]
fn default_port_is_elided() {
    let pattern = compile("https://example.com:443/");
    assert_eq!(pattern.port(), "");
    assert!(pattern.test("https://example.com/".into(), None).unwrap());
}

#[test]
fn regexp_groups() {
    let pattern = pathname_pattern("/books/:id(\\d+)");
    assert!(pattern.has_regexp_groups());
    let input = |path: &str| {
        UrlPatternInput::Init(UrlPatternInit {
            pathname: Some(path.to_string()),
            ..Default::default()
        })
    };
    assert!(pattern.test(input("/books/123"), None).unwrap());
    assert!(!pattern.test(input("/books/abc"), None).unwrap());

    let result = pattern.exec(input("/books/123"), None).unwrap().unwrap();
    assert_eq!(result.pathname.group("id"), Some("123"));
}

#[test]
fn plus_modifier_repeats_segments() {
    let pattern = pathname_pattern("/a/:rest+");
    let input = |path: &str| {
        UrlPatternInput::Init(UrlPatternInit {
            pathname: Some(path.to_string()),
            ..Default::default()
        })
    };
    let result = pattern.exec(input("/a/b/c/d"), None).unwrap().unwrap();
    assert_eq!(result.pathname.group("rest"), Some("b/c/d"));
    assert!(!pattern.test(input("/a"), None).unwrap());

    let pattern = pathname_pattern("/a/:rest*");
    assert!(pattern.test(input("/a"), None).unwrap());
}

#[test]
fn base_url_fills_missing_components() {
    let pattern =
        UrlPattern::parse("/api/:ver".into(), Some("https://example.com"), Default::default())
            .unwrap();
    assert_eq!(pattern.protocol(), "https");
    assert_eq!(pattern.hostname(), "example.com");
    assert!(pattern.test("https://example.com/api/v2".into(), None).unwrap());
    assert!(!pattern.test("https://other.com/api/v2".into(), None).unwrap());
}

#[test]
fn relative_pattern_without_base_is_a_type_error() {
    let result = UrlPattern::parse("/api/:ver".into(), None, Default::default());
    assert!(matches!(result, Err(PatternError::TypeError(_))));
}

#[test]
fn init_with_base_string_is_a_type_error() {
    let result = UrlPattern::parse(
        UrlPatternInit::default().into(),
        Some("https://example.com"),
        Default::default(),
    );
    assert!(matches!(result, Err(PatternError::TypeError(_))));
}

#[test]
fn malformed_patterns_are_compile_errors() {
    for pattern in ["https://h/(", "https://h/:1bad", "https://h/{a", "https://h/:a/:a"] {
        let result = UrlPattern::parse(pattern.into(), None, UrlPatternOptions::default());
        assert!(
            matches!(result, Err(PatternError::CompileError(_))),
            "`{pattern}` should fail to compile"
        );
    }
}

#[test]
fn unparseable_match_input_is_no_match() {
    let pattern = compile("https://example.com/*");
    assert!(!pattern.test("not a url".into(), None).unwrap());
    assert_eq!(pattern.exec("not a url".into(), None).unwrap(), None);
}

#[test]
fn ignore_case_option() {
    let sensitive = compile("https://example.com/Foo");
    assert!(!sensitive.test("https://example.com/foo".into(), None).unwrap());

    let insensitive = UrlPattern::parse(
        "https://example.com/Foo".into(),
        None,
        UrlPatternOptions { ignore_case: true },
    )
    .unwrap();
    assert!(insensitive.test("https://example.com/foo".into(), None).unwrap());
}

#[test]
fn canonicalization_applies_to_fixed_text() {
    // Uppercase scheme and hostname canonicalize before compilation
    let pattern = compile("HTTPS://EXAMPLE.com/p");
    assert_eq!(pattern.protocol(), "https");
    assert_eq!(pattern.hostname(), "example.com");
    assert!(pattern.test("https://example.com/p".into(), None).unwrap());
}

#[test]
fn non_special_scheme_pathname_is_opaque() {
    let pattern = compile("data:text/plain,*");
    assert!(pattern.test("data:text/plain,anything".into(), None).unwrap());
    assert!(!pattern.test("data:text/html,x".into(), None).unwrap());
}

#[test]
fn match_result_substitution_still_matches() {
    // Substituting captured groups back into the pattern's fixed parts
    // yields a URL that matches again
    let pattern = compile("https://*.example.com/foo/:bar");
    let result = pattern
        .exec("https://sub.example.com/foo/value".into(), None)
        .unwrap()
        .unwrap();
    let rebuilt = format!(
        "https://{}.example.com/foo/{}",
        result.hostname.group("0").unwrap(),
        result.pathname.group("bar").unwrap()
    );
    assert!(pattern.test(rebuilt.as_str().into(), None).unwrap());
}

#[test]
fn exec_against_url_string_with_base() {
    let pattern = compile("https://example.com/a/:x");
    assert!(pattern.test("/a/b".into(), Some("https://example.com")).unwrap());
}

#[test]
fn search_and_hash_components() {
    let pattern = compile("https://example.com/p?q=:val#:frag");
    let result = pattern
        .exec("https://example.com/p?q=7#sec".into(), None)
        .unwrap()
        .unwrap();
    assert_eq!(result.search.group("val"), Some("7"));
    assert_eq!(result.hash.group("frag"), Some("sec"));
}
