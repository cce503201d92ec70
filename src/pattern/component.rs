use regex::{Regex, RegexBuilder};

use crate::error::PatternError;

use super::parser::{
    CompileOptions, EncodingCallback, Part, PartKind, generate_pattern_string,
    generate_regexp_and_name_list, parse_pattern_string,
};

/// One compiled pattern component: the canonical pattern string, the
/// anchored matcher, the ordered group names and the part list it was
/// generated from.
#[derive(Debug)]
pub(crate) struct Component {
    pub pattern_string: String,
    pub regexp: Regex,
    pub group_name_list: Vec<String>,
    pub part_list: Vec<Part>,
}

impl Component {
    pub fn compile(
        input: Option<&str>,
        encoding_callback: EncodingCallback<'_>,
        options: &CompileOptions,
    ) -> Result<Self, PatternError> {
        let part_list = parse_pattern_string(input.unwrap_or("*"), options, encoding_callback)?;
        let (regexp_string, group_name_list) =
            generate_regexp_and_name_list(&part_list, options);
        let regexp = RegexBuilder::new(&regexp_string)
            .case_insensitive(options.ignore_case)
            .build()
            .map_err(|error| {
                PatternError::CompileError(format!(
                    "generated regular expression `{regexp_string}` is invalid: {error}"
                ))
            })?;
        let pattern_string = generate_pattern_string(&part_list, options);

        Ok(Self {
            pattern_string,
            regexp,
            group_name_list,
            part_list,
        })
    }

    /// Match an input against this component. Returns the capture
    /// values (one per group name, unmatched optionals are `None`) or
    /// `None` when the component does not match.
    pub fn matches(&self, input: &str) -> Option<Vec<Option<String>>> {
        let captures = self.regexp.captures(input)?;
        Some(
            (1..=self.group_name_list.len())
                .map(|index| captures.get(index).map(|m| m.as_str().to_string()))
                .collect(),
        )
    }

    /// Pair the group names with the captures of a successful match
    pub fn create_match_result(
        &self,
        input: String,
        captures: Vec<Option<String>>,
    ) -> super::PatternComponentResult {
        super::PatternComponentResult {
            input,
            groups: self
                .group_name_list
                .iter()
                .cloned()
                .zip(captures)
                .collect(),
        }
    }

    pub fn has_regexp_groups(&self) -> bool {
        self.part_list
            .iter()
            .any(|part| part.kind == PartKind::Regexp)
    }

    /// Does this protocol component accept one of the special schemes
    pub fn protocol_matches_special_scheme(&self) -> bool {
        ["http", "https", "ws", "wss", "ftp", "file"]
            .iter()
            .any(|scheme| self.regexp.is_match(scheme))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn passthrough(input: &str) -> Result<String, PatternError> {
        Ok(input.to_string())
    }

    #[test]
    fn wildcard_matches_anything() {
        let component =
            Component::compile(None, &passthrough, &CompileOptions::default()).unwrap();
        assert_eq!(component.pattern_string, "*");
        assert!(component.matches("").is_some());
        assert!(component.matches("anything/at all").is_some());
    }

    #[test]
    fn named_groups_capture() {
        let component = Component::compile(
            Some("/users/:id"),
            &passthrough,
            &CompileOptions::pathname(),
        )
        .unwrap();
        let captures = component.matches("/users/123").unwrap();
        assert_eq!(captures, vec![Some("123".to_string())]);
        assert!(component.matches("/users/1/2").is_none());
        assert!(component.matches("/users/").is_none());
    }

    #[test]
    fn optional_group_captures_none() {
        let component = Component::compile(
            Some("/a{/:b}?"),
            &passthrough,
            &CompileOptions::pathname(),
        )
        .unwrap();
        assert_eq!(component.matches("/a").unwrap(), vec![None]);
        assert_eq!(
            component.matches("/a/x").unwrap(),
            vec![Some("x".to_string())]
        );
    }

    #[test]
    fn ignore_case_option() {
        let options = CompileOptions {
            ignore_case: true,
            ..CompileOptions::pathname()
        };
        let component = Component::compile(Some("/Foo"), &passthrough, &options).unwrap();
        assert!(component.matches("/foo").is_some());
        assert!(component.matches("/FOO").is_some());
    }

    #[test]
    fn special_scheme_probe() {
        let component = Component::compile(
            Some("http{s}?"),
            &passthrough,
            &CompileOptions::default(),
        )
        .unwrap();
        assert!(component.protocol_matches_special_scheme());

        let component =
            Component::compile(Some("custom"), &passthrough, &CompileOptions::default())
                .unwrap();
        assert!(!component.protocol_matches_special_scheme());
    }

    #[test]
    fn regexp_group_detection() {
        let component = Component::compile(
            Some("/:a(\\d+)"),
            &passthrough,
            &CompileOptions::pathname(),
        )
        .unwrap();
        assert!(component.has_regexp_groups());
        assert!(component.matches("/42").is_some());
        assert!(component.matches("/x").is_none());
    }
}
