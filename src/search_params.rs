use crate::unicode::percent_encode::FORM_URLENCODED_SET;

/// An ordered list of (name, value) pairs decoded per
/// `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlSearchParams {
    params: Vec<(String, String)>,
}

impl UrlSearchParams {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Parse a query string, with or without the leading `?`.
    /// Empty pairs are dropped; a pair without `=` keeps an empty value.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((name, value)) => (decode_component(name), decode_component(value)),
                None => (decode_component(pair), String::new()),
            })
            .collect();
        Self { params }
    }

    pub fn append(&mut self, name: &str, value: &str) {
        self.params.push((name.to_string(), value.to_string()));
    }

    /// Delete pairs with the given name; with `value` given, only pairs
    /// matching both.
    pub fn delete(&mut self, name: &str, value: Option<&str>) {
        match value {
            Some(value) => self.params.retain(|(n, v)| n != name || v != value),
            None => self.params.retain(|(n, _)| n != name),
        }
    }

    /// First value for a name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values for a name, in insertion order
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn has(&self, name: &str, value: Option<&str>) -> bool {
        match value {
            Some(value) => self.params.iter().any(|(n, v)| n == name && v == value),
            None => self.params.iter().any(|(n, _)| n == name),
        }
    }

    /// Replace the first pair with this name and drop the rest; append
    /// if the name is new
    pub fn set(&mut self, name: &str, value: &str) {
        let mut replaced = false;
        self.params.retain_mut(|(n, v)| {
            if n != name {
                return true;
            }
            if replaced {
                return false;
            }
            replaced = true;
            *v = value.to_string();
            true
        });
        if !replaced {
            self.params.push((name.to_string(), value.to_string()));
        }
    }

    /// Stable sort by name
    pub fn sort(&mut self) {
        self.params.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn size(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(_, v)| v.as_str())
    }

    /// Serialize without the leading `?`
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (index, (name, value)) in self.params.iter().enumerate() {
            if index > 0 {
                out.push('&');
            }
            encode_component(&mut out, name);
            out.push('=');
            encode_component(&mut out, value);
        }
        out
    }
}

impl core::fmt::Display for UrlSearchParams {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl From<&str> for UrlSearchParams {
    fn from(query: &str) -> Self {
        Self::parse(query)
    }
}

impl<'a> IntoIterator for &'a UrlSearchParams {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Serialize one component: space becomes `+`, bytes in the
/// form-urlencoded set become `%XX`
fn encode_component(out: &mut String, input: &str) {
    use core::fmt::Write;
    for byte in input.bytes() {
        match byte {
            b' ' => out.push('+'),
            _ if !byte.is_ascii()
                || percent_encoding::percent_encode(&[byte], FORM_URLENCODED_SET)
                    .next()
                    .is_some_and(|s| s.starts_with('%')) =>
            {
                let _ = write!(out, "%{byte:02X}");
            }
            _ => out.push(byte as char),
        }
    }
}

/// Decode one component: `+` becomes space, valid `%XX` decodes, an
/// invalid `%` stays literal
fn decode_component(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'+' => out.push(b' '),
            b'%' if index + 2 < bytes.len() => {
                match u8::from_str_radix(&input[index + 1..index + 3], 16) {
                    Ok(byte) => {
                        out.push(byte);
                        index += 2;
                    }
                    Err(_) => out.push(b'%'),
                }
            }
            byte => out.push(byte),
        }
        index += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_basics() {
        let params = UrlSearchParams::parse("?a=1&b=2&a=3");
        assert_eq!(params.size(), 3);
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get_all("a"), vec!["1", "3"]);
        assert_eq!(params.get("b"), Some("2"));
        assert_eq!(params.get("c"), None);
    }

    #[test]
    fn pairs_without_values() {
        let params = UrlSearchParams::parse("a&b=2&c");
        assert_eq!(params.get("a"), Some(""));
        assert_eq!(params.get("c"), Some(""));
        assert_eq!(params.size(), 3);
    }

    #[test]
    fn empty_pairs_are_dropped() {
        let params = UrlSearchParams::parse("&&a=1&&");
        assert_eq!(params.size(), 1);
    }

    #[test]
    fn plus_and_percent_round_trip() {
        let params = UrlSearchParams::parse("q=a+b%26c");
        assert_eq!(params.get("q"), Some("a b&c"));
        assert_eq!(params.serialize(), "q=a+b%26c");
    }

    #[test]
    fn invalid_percent_stays_literal() {
        let params = UrlSearchParams::parse("q=100%");
        assert_eq!(params.get("q"), Some("100%"));
        let params = UrlSearchParams::parse("q=%ZZ");
        assert_eq!(params.get("q"), Some("%ZZ"));
    }

    #[test]
    fn set_replaces_all_duplicates() {
        let mut params = UrlSearchParams::parse("a=1&b=2&a=3");
        params.set("a", "9");
        assert_eq!(params.serialize(), "a=9&b=2");
        params.set("c", "4");
        assert_eq!(params.get("c"), Some("4"));
    }

    #[test]
    fn delete_by_name_and_value() {
        let mut params = UrlSearchParams::parse("a=1&a=2&b=3");
        params.delete("a", Some("1"));
        assert_eq!(params.get_all("a"), vec!["2"]);
        params.delete("a", None);
        assert!(!params.has("a", None));
        assert!(params.has("b", Some("3")));
    }

    #[test]
    fn sort_is_stable() {
        let mut params = UrlSearchParams::parse("z=1&a=2&z=3&a=4");
        params.sort();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "2"), ("a", "4"), ("z", "1"), ("z", "3")]);
    }

    #[test]
    fn unicode_values() {
        let mut params = UrlSearchParams::new();
        params.append("name", "François");
        let serialized = params.serialize();
        assert_eq!(serialized, "name=Fran%C3%A7ois");
        assert_eq!(UrlSearchParams::parse(&serialized).get("name"), Some("François"));
    }

    #[test]
    fn serialize_empty() {
        assert_eq!(UrlSearchParams::new().serialize(), "");
    }
}
