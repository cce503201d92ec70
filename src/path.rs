use crate::checkers::{
    is_double_dot_path_segment, is_normalized_windows_drive_letter, is_single_dot_path_segment,
    is_windows_drive_letter,
};
use crate::scheme::SchemeType;
use crate::unicode::percent_encode::{PATH_SET, percent_encode_into};

/// Remove the last path segment, except that a `file:` path consisting
/// of a single normalized Windows drive letter is left alone.
/// Returns whether the path changed.
pub fn shorten_path(path: &mut Vec<String>, scheme_type: SchemeType) -> bool {
    if scheme_type == SchemeType::File
        && path.len() == 1
        && is_normalized_windows_drive_letter(&path[0])
    {
        return false;
    }
    path.pop().is_some()
}

/// Consume a prepared path view into `path` segments.
///
/// The view is everything between the path start and the query or the
/// end of input, with the single leading slash already consumed by the
/// caller. Splits on `/` (and `\` for special schemes), applies the
/// single-dot and double-dot rules, and percent-encodes each remaining
/// segment with the path set. A trailing separator produces a trailing
/// empty segment, which serializes as a trailing slash.
pub fn parse_path_segments(input: &str, scheme_type: SchemeType, path: &mut Vec<String>) {
    let special = scheme_type.is_special();
    let mut rest = input;

    loop {
        let split = rest
            .as_bytes()
            .iter()
            .position(|&b| b == b'/' || (special && b == b'\\'));
        let (segment, remainder) = match split {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };
        let last = remainder.is_none();

        if is_double_dot_path_segment(segment) {
            shorten_path(path, scheme_type);
            if last {
                path.push(String::new());
            }
        } else if is_single_dot_path_segment(segment) {
            if last {
                path.push(String::new());
            }
        } else if scheme_type == SchemeType::File
            && path.is_empty()
            && is_windows_drive_letter(segment)
        {
            // The first file path segment keeps its drive-letter case,
            // with `|` normalized to `:`
            let mut drive = String::with_capacity(2);
            drive.push(segment.as_bytes()[0] as char);
            drive.push(':');
            path.push(drive);
        } else {
            let mut encoded = String::with_capacity(segment.len());
            percent_encode_into(&mut encoded, segment, PATH_SET);
            path.push(encoded);
        }

        match remainder {
            Some(remainder) => rest = remainder,
            None => break,
        }
    }
}

/// Serialize a segment path: `/` before every segment, nothing for an
/// empty list
pub fn serialize_path(path: &[String]) -> String {
    let mut out = String::new();
    for segment in path {
        out.push('/');
        out.push_str(segment);
    }
    out
}
