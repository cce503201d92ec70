//! Pattern string parser: turns a token stream into a part list, and
//! generates the regular expression and pattern-string forms of a part
//! list.

use crate::error::PatternError;

use super::tokenizer::{
    Token, TokenKind, TokenizePolicy, is_valid_name_code_point, tokenize,
};

/// <https://urlpattern.spec.whatwg.org/#full-wildcard-regexp-value>
pub(crate) const FULL_WILDCARD_REGEXP_VALUE: &str = ".*";

/// Per-component compile options
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CompileOptions {
    pub delimiter_code_point: Option<char>,
    pub prefix_code_point: Option<char>,
    pub ignore_case: bool,
}

impl CompileOptions {
    pub fn hostname() -> Self {
        Self {
            delimiter_code_point: Some('.'),
            prefix_code_point: None,
            ignore_case: false,
        }
    }

    pub fn pathname() -> Self {
        Self {
            delimiter_code_point: Some('/'),
            prefix_code_point: Some('/'),
            ignore_case: false,
        }
    }

    fn prefix_string(&self) -> String {
        self.prefix_code_point.map(String::from).unwrap_or_default()
    }

    /// Regexp matching one segment: any run of characters free of the
    /// delimiter, non-greedy
    pub fn segment_wildcard_regexp(&self) -> String {
        match self.delimiter_code_point {
            Some(delimiter) => {
                format!("[^{}]+?", escape_regexp_string(&delimiter.to_string()))
            }
            None => ".+?".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PartKind {
    FixedText,
    Regexp,
    SegmentWildcard,
    FullWildcard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PartModifier {
    None,
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl PartModifier {
    fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Optional => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        }
    }
}

/// One element of a component's part list
#[derive(Debug, Clone)]
pub(crate) struct Part {
    pub kind: PartKind,
    /// Canonicalized text for fixed parts, the regexp source for regexp
    /// parts, empty for wildcards
    pub value: String,
    pub modifier: PartModifier,
    /// Group name; numeric for unnamed groups
    pub name: String,
    pub prefix: String,
    pub suffix: String,
}

/// The canonicalizer applied to fixed text while parsing a component
/// pattern
pub(crate) type EncodingCallback<'a> = &'a dyn Fn(&str) -> Result<String, PatternError>;

struct PatternParser<'a> {
    tokens: Vec<Token>,
    encoding_callback: EncodingCallback<'a>,
    segment_wildcard_regexp: String,
    prefix_code_point: String,
    parts: Vec<Part>,
    pending_fixed_value: String,
    index: usize,
    next_numeric_name: usize,
}

/// Parse a component pattern string into its part list
pub(crate) fn parse_pattern_string(
    input: &str,
    options: &CompileOptions,
    encoding_callback: EncodingCallback<'_>,
) -> Result<Vec<Part>, PatternError> {
    let mut parser = PatternParser {
        tokens: tokenize(input, TokenizePolicy::Strict)?,
        encoding_callback,
        segment_wildcard_regexp: options.segment_wildcard_regexp(),
        prefix_code_point: options.prefix_string(),
        parts: Vec::new(),
        pending_fixed_value: String::new(),
        index: 0,
        next_numeric_name: 0,
    };

    while parser.index < parser.tokens.len() {
        let char_token = parser.try_consume(TokenKind::Char);
        let name_token = parser.try_consume(TokenKind::Name);
        let mut regexp_or_wildcard = parser.try_consume_regexp_or_wildcard(name_token.is_some());

        if name_token.is_some() || regexp_or_wildcard.is_some() {
            // A matching group with an optional single-char prefix
            let mut prefix = char_token.map(|t| t.value).unwrap_or_default();
            if prefix != parser.prefix_code_point {
                parser.pending_fixed_value.push_str(&prefix);
                prefix = String::new();
            }
            parser.maybe_add_part_from_pending_fixed_value()?;
            let modifier = parser.try_consume_modifier();
            parser.add_part(&prefix, name_token, regexp_or_wildcard, "", modifier)?;
            continue;
        }

        // Plain text
        let fixed_token = char_token.or_else(|| parser.try_consume(TokenKind::EscapedChar));
        if let Some(token) = fixed_token {
            parser.pending_fixed_value.push_str(&token.value);
            continue;
        }

        // A `{ ... }` group
        if parser.try_consume(TokenKind::Open).is_some() {
            let prefix = parser.consume_text();
            let name_token = parser.try_consume(TokenKind::Name);
            regexp_or_wildcard = parser.try_consume_regexp_or_wildcard(name_token.is_some());
            let suffix = parser.consume_text();
            parser.consume_required(TokenKind::Close)?;
            let modifier = parser.try_consume_modifier();
            parser.add_part(&prefix, name_token, regexp_or_wildcard, &suffix, modifier)?;
            continue;
        }

        parser.maybe_add_part_from_pending_fixed_value()?;
        parser.consume_required(TokenKind::End)?;
        break;
    }

    Ok(parser.parts)
}

impl PatternParser<'_> {
    fn try_consume(&mut self, kind: TokenKind) -> Option<Token> {
        if self.tokens[self.index].kind == kind {
            let token = self.tokens[self.index].clone();
            self.index += 1;
            Some(token)
        } else {
            None
        }
    }

    /// A regexp group, or, when there is no name, a bare `*` wildcard
    /// (an asterisk after a name is a modifier instead)
    fn try_consume_regexp_or_wildcard(&mut self, has_name: bool) -> Option<Token> {
        let token = self.try_consume(TokenKind::Regexp);
        if token.is_none() && !has_name {
            return self.try_consume(TokenKind::Asterisk);
        }
        token
    }

    fn try_consume_modifier(&mut self) -> PartModifier {
        if let Some(token) = self.try_consume(TokenKind::OtherModifier) {
            return match token.value.as_str() {
                "?" => PartModifier::Optional,
                _ => PartModifier::OneOrMore,
            };
        }
        if self.try_consume(TokenKind::Asterisk).is_some() {
            return PartModifier::ZeroOrMore;
        }
        PartModifier::None
    }

    fn consume_text(&mut self) -> String {
        let mut value = String::new();
        loop {
            let token = self
                .try_consume(TokenKind::Char)
                .or_else(|| self.try_consume(TokenKind::EscapedChar));
            match token {
                Some(token) => value.push_str(&token.value),
                None => break,
            }
        }
        value
    }

    fn consume_required(&mut self, kind: TokenKind) -> Result<(), PatternError> {
        if self.try_consume(kind).is_none() {
            let token = &self.tokens[self.index];
            return Err(PatternError::CompileError(format!(
                "expected {kind:?} at position {}",
                token.index
            )));
        }
        Ok(())
    }

    fn maybe_add_part_from_pending_fixed_value(&mut self) -> Result<(), PatternError> {
        if self.pending_fixed_value.is_empty() {
            return Ok(());
        }
        let encoded = (self.encoding_callback)(&self.pending_fixed_value)?;
        self.pending_fixed_value.clear();
        self.parts.push(Part {
            kind: PartKind::FixedText,
            value: encoded,
            modifier: PartModifier::None,
            name: String::new(),
            prefix: String::new(),
            suffix: String::new(),
        });
        Ok(())
    }

    fn add_part(
        &mut self,
        prefix: &str,
        name_token: Option<Token>,
        regexp_or_wildcard: Option<Token>,
        suffix: &str,
        modifier: PartModifier,
    ) -> Result<(), PatternError> {
        if name_token.is_none() && regexp_or_wildcard.is_none() && modifier == PartModifier::None {
            // `{abc}` without a matching group is just text
            self.pending_fixed_value.push_str(prefix);
            return Ok(());
        }
        self.maybe_add_part_from_pending_fixed_value()?;

        if name_token.is_none() && regexp_or_wildcard.is_none() {
            // `{abc}?`: fixed text with a modifier
            if prefix.is_empty() {
                return Ok(());
            }
            let encoded = (self.encoding_callback)(prefix)?;
            self.parts.push(Part {
                kind: PartKind::FixedText,
                value: encoded,
                modifier,
                name: String::new(),
                prefix: String::new(),
                suffix: String::new(),
            });
            return Ok(());
        }

        let regexp_value = match &regexp_or_wildcard {
            None => self.segment_wildcard_regexp.clone(),
            Some(token) if token.kind == TokenKind::Asterisk => {
                FULL_WILDCARD_REGEXP_VALUE.to_string()
            }
            Some(token) => token.value.clone(),
        };

        let (kind, value) = if regexp_value == self.segment_wildcard_regexp {
            (PartKind::SegmentWildcard, String::new())
        } else if regexp_value == FULL_WILDCARD_REGEXP_VALUE {
            (PartKind::FullWildcard, String::new())
        } else {
            (PartKind::Regexp, regexp_value)
        };

        let name = match name_token {
            Some(token) => token.value,
            None => {
                let name = self.next_numeric_name.to_string();
                self.next_numeric_name += 1;
                name
            }
        };
        if self.parts.iter().any(|part| part.name == name) {
            return Err(PatternError::CompileError(format!(
                "duplicate group name `{name}`"
            )));
        }

        let encoded_prefix = (self.encoding_callback)(prefix)?;
        let encoded_suffix = (self.encoding_callback)(suffix)?;
        self.parts.push(Part {
            kind,
            value,
            modifier,
            name,
            prefix: encoded_prefix,
            suffix: encoded_suffix,
        });
        Ok(())
    }
}

/// Escape characters that are special in a regular expression
pub(crate) fn escape_regexp_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '.' | '+' | '*' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '[' | ']' | '|' | '/' | '\\'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape characters that are pattern syntax
pub(crate) fn escape_pattern_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '+' | '*' | '?' | ':' | '{' | '}' | '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Generate the anchored regular expression for a part list, together
/// with the ordered capture-group name list
pub(crate) fn generate_regexp_and_name_list(
    parts: &[Part],
    options: &CompileOptions,
) -> (String, Vec<String>) {
    let mut result = String::from("^");
    let mut name_list = Vec::new();

    for part in parts {
        if part.kind == PartKind::FixedText {
            if part.modifier == PartModifier::None {
                result.push_str(&escape_regexp_string(&part.value));
            } else {
                result.push_str("(?:");
                result.push_str(&escape_regexp_string(&part.value));
                result.push(')');
                result.push_str(part.modifier.as_str());
            }
            continue;
        }

        name_list.push(part.name.clone());
        let regexp_value = match part.kind {
            PartKind::SegmentWildcard => options.segment_wildcard_regexp(),
            PartKind::FullWildcard => FULL_WILDCARD_REGEXP_VALUE.to_string(),
            _ => part.value.clone(),
        };

        if part.prefix.is_empty() && part.suffix.is_empty() {
            if matches!(part.modifier, PartModifier::None | PartModifier::Optional) {
                result.push('(');
                result.push_str(&regexp_value);
                result.push(')');
                result.push_str(part.modifier.as_str());
            } else {
                result.push_str("((?:");
                result.push_str(&regexp_value);
                result.push(')');
                result.push_str(part.modifier.as_str());
                result.push(')');
            }
            continue;
        }

        if matches!(part.modifier, PartModifier::None | PartModifier::Optional) {
            result.push_str("(?:");
            result.push_str(&escape_regexp_string(&part.prefix));
            result.push('(');
            result.push_str(&regexp_value);
            result.push(')');
            result.push_str(&escape_regexp_string(&part.suffix));
            result.push(')');
            result.push_str(part.modifier.as_str());
            continue;
        }

        // Repeated group with a prefix or suffix: the delimiter appears
        // between repetitions but not after the last one
        result.push_str("(?:");
        result.push_str(&escape_regexp_string(&part.prefix));
        result.push_str("((?:");
        result.push_str(&regexp_value);
        result.push_str(")(?:");
        result.push_str(&escape_regexp_string(&part.suffix));
        result.push_str(&escape_regexp_string(&part.prefix));
        result.push_str("(?:");
        result.push_str(&regexp_value);
        result.push_str("))*)");
        result.push_str(&escape_regexp_string(&part.suffix));
        result.push(')');
        if part.modifier == PartModifier::ZeroOrMore {
            result.push('?');
        }
    }

    result.push('$');
    (result, name_list)
}

/// Regenerate a canonical pattern string from a part list
pub(crate) fn generate_pattern_string(parts: &[Part], options: &CompileOptions) -> String {
    let mut result = String::new();
    let prefix_string = options.prefix_string();

    for (index, part) in parts.iter().enumerate() {
        let previous = index.checked_sub(1).map(|i| &parts[i]);
        let next = parts.get(index + 1);

        if part.kind == PartKind::FixedText {
            if part.modifier == PartModifier::None {
                result.push_str(&escape_pattern_string(&part.value));
            } else {
                result.push('{');
                result.push_str(&escape_pattern_string(&part.value));
                result.push('}');
                result.push_str(part.modifier.as_str());
            }
            continue;
        }

        let custom_name = !part.name.starts_with(|c: char| c.is_ascii_digit());
        let mut needs_grouping = !part.suffix.is_empty()
            || (!part.prefix.is_empty() && part.prefix != prefix_string);

        // A custom-named segment wildcard merges with a following name
        // character unless braces separate them
        if !needs_grouping
            && custom_name
            && part.kind == PartKind::SegmentWildcard
            && part.modifier == PartModifier::None
            && let Some(next) = next
            && next.prefix.is_empty()
            && next.suffix.is_empty()
        {
            needs_grouping = if next.kind == PartKind::FixedText {
                next.value
                    .chars()
                    .next()
                    .is_some_and(|c| is_valid_name_code_point(c, false))
            } else {
                next.name.starts_with(|c: char| c.is_ascii_digit())
            };
        }

        if !needs_grouping
            && part.prefix.is_empty()
            && !prefix_string.is_empty()
            && let Some(previous) = previous
            && previous.kind == PartKind::FixedText
            && previous.value.ends_with(&prefix_string)
        {
            needs_grouping = true;
        }

        if needs_grouping {
            result.push('{');
        }
        result.push_str(&escape_pattern_string(&part.prefix));
        if custom_name {
            result.push(':');
            result.push_str(&part.name);
        }
        match part.kind {
            PartKind::Regexp => {
                result.push('(');
                result.push_str(&part.value);
                result.push(')');
            }
            PartKind::SegmentWildcard if !custom_name => {
                result.push('(');
                result.push_str(&options.segment_wildcard_regexp());
                result.push(')');
            }
            PartKind::FullWildcard => {
                if !custom_name
                    && (previous.is_none_or(|p| {
                        p.kind == PartKind::FixedText || p.modifier != PartModifier::None
                    }) || needs_grouping
                        || !part.prefix.is_empty())
                {
                    result.push('*');
                } else {
                    result.push('(');
                    result.push_str(FULL_WILDCARD_REGEXP_VALUE);
                    result.push(')');
                }
            }
            _ => {}
        }
        // An unbraced suffix starting with a name character would merge
        // into the group name
        if part.kind == PartKind::SegmentWildcard
            && custom_name
            && !part.suffix.is_empty()
            && part
                .suffix
                .chars()
                .next()
                .is_some_and(|c| is_valid_name_code_point(c, false))
        {
            result.push('\\');
        }
        result.push_str(&escape_pattern_string(&part.suffix));
        if needs_grouping {
            result.push('}');
        }
        result.push_str(part.modifier.as_str());
    }

    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn passthrough(input: &str) -> Result<String, PatternError> {
        Ok(input.to_string())
    }

    #[test]
    fn fixed_text_only() {
        let parts =
            parse_pattern_string("/foo/bar", &CompileOptions::pathname(), &passthrough).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].kind, PartKind::FixedText);
        assert_eq!(parts[0].value, "/foo/bar");
    }

    #[test]
    fn named_group_with_prefix() {
        let parts =
            parse_pattern_string("/foo/:bar", &CompileOptions::pathname(), &passthrough).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].kind, PartKind::FixedText);
        assert_eq!(parts[1].kind, PartKind::SegmentWildcard);
        assert_eq!(parts[1].name, "bar");
        assert_eq!(parts[1].prefix, "/");
    }

    #[test]
    fn wildcard_gets_numeric_name() {
        let parts =
            parse_pattern_string("*/*", &CompileOptions::pathname(), &passthrough).unwrap();
        let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["0", "1"]);
        assert!(parts.iter().all(|p| p.kind == PartKind::FullWildcard));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        assert!(
            parse_pattern_string("/:a/:a", &CompileOptions::pathname(), &passthrough).is_err()
        );
    }

    #[test]
    fn asterisk_after_name_is_a_modifier() {
        let parts =
            parse_pattern_string("/:a*", &CompileOptions::pathname(), &passthrough).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].modifier, PartModifier::ZeroOrMore);
        assert_eq!(parts[0].kind, PartKind::SegmentWildcard);
    }

    #[test]
    fn braced_fixed_text_with_modifier() {
        let parts =
            parse_pattern_string("http{s}?", &CompileOptions::default(), &passthrough).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].value, "http");
        assert_eq!(parts[1].value, "s");
        assert_eq!(parts[1].modifier, PartModifier::Optional);

        let (regexp, names) = generate_regexp_and_name_list(&parts, &CompileOptions::default());
        assert_eq!(regexp, "^http(?:s)?$");
        assert!(names.is_empty());
    }

    #[test]
    fn regexp_for_named_group_with_prefix() {
        let parts =
            parse_pattern_string("/foo/:bar", &CompileOptions::pathname(), &passthrough).unwrap();
        let (regexp, names) = generate_regexp_and_name_list(&parts, &CompileOptions::pathname());
        assert_eq!(regexp, "^\\/foo(?:\\/([^\\/]+?))$");
        assert_eq!(names, vec!["bar"]);
    }

    #[test]
    fn pattern_string_round_trips() {
        for pattern in [
            "/foo/:bar",
            "/foo/*",
            "{/items/:id}?",
            "http{s}?",
            "/:a(\\d+)",
            "/books/{:id}",
        ] {
            let options = CompileOptions::pathname();
            let parts = parse_pattern_string(pattern, &options, &passthrough).unwrap();
            let canonical = generate_pattern_string(&parts, &options);
            let reparsed = parse_pattern_string(&canonical, &options, &passthrough).unwrap();
            let regenerated = generate_pattern_string(&reparsed, &options);
            assert_eq!(canonical, regenerated, "pattern {pattern} did not round-trip");
        }
    }
}
