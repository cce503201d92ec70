//! The URL parsing state machine. The driver keeps a state and a
//! monotonically advancing cursor into the cleaned input and batches
//! work per state (whole scheme, whole authority, whole path) instead
//! of stepping byte by byte.

use super::State;
use crate::character_sets::is_alnum_plus;
use crate::checkers::{is_windows_drive_letter, starts_with_windows_drive_letter};
use crate::error::{ParseError, Result, ValidationError};
use crate::helpers;
use crate::host::{Host, parse_host};
use crate::path::{parse_path_segments, shorten_path};
use crate::scheme::{SchemeType, get_scheme_type};
use crate::unicode::percent_encode::{
    C0_CONTROL_SET, FRAGMENT_SET, QUERY_SET, SPECIAL_QUERY_SET, USERINFO_SET,
    percent_encode_into, percent_encode_with,
};
use crate::url::{Path, Url};

type Reporter<'a, 'b> = &'a mut Option<&'b mut dyn FnMut(ValidationError)>;

fn report(reporter: Reporter<'_, '_>, error: ValidationError) {
    if let Some(callback) = reporter.as_mut() {
        callback(error);
    }
}

/// Run the state machine over `input`, resolving against `base` when
/// given.
pub(crate) fn parse_url(
    input: &str,
    base: Option<&Url>,
    reporter: Reporter<'_, '_>,
) -> Result<Url> {
    if input.len() as u64 > u64::from(u32::MAX) {
        return Err(ParseError::InputTooLong);
    }

    // Strip tabs and newlines, trim C0 controls and spaces, and split
    // off the fragment before the machine runs; it is attached once at
    // the end.
    let cleaned = helpers::clean_input(input);
    let (remaining, fragment) = helpers::split_fragment(cleaned.as_ref());
    let bytes = remaining.as_bytes();

    let mut url = Url::new();
    let mut state = State::SchemeStart;
    let mut i = 0usize;

    loop {
        match state {
            State::SchemeStart => {
                state = if i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    State::Scheme
                } else {
                    State::NoScheme
                };
            }

            State::Scheme => {
                let mut end = i;
                while end < bytes.len() && is_alnum_plus(bytes[end]) {
                    end += 1;
                }
                if end < bytes.len() && bytes[end] == b':' {
                    url.scheme = remaining[i..end].to_ascii_lowercase();
                    url.scheme_type = get_scheme_type(&url.scheme);
                    i = end + 1;

                    if url.scheme_type == SchemeType::File {
                        if !remaining[i..].starts_with("//") {
                            report(reporter, ValidationError::SpecialSchemeMissingFollowingSolidus);
                        }
                        state = State::File;
                    } else if url.scheme_type.is_special() {
                        state = match base {
                            Some(base) if base.scheme == url.scheme => {
                                State::SpecialRelativeOrAuthority
                            }
                            _ => State::SpecialAuthoritySlashes,
                        };
                    } else if bytes.get(i) == Some(&b'/') {
                        i += 1;
                        state = State::PathOrAuthority;
                    } else {
                        url.path = Path::Opaque(String::new());
                        state = State::OpaquePath;
                    }
                } else {
                    // Not a scheme after all; start over without one
                    i = 0;
                    state = State::NoScheme;
                }
            }

            State::NoScheme => {
                let Some(base) = base else {
                    return Err(ParseError::RelativeUrlWithoutBase);
                };
                if base.has_opaque_path() {
                    // Only a fragment can be resolved against an opaque
                    // path
                    if !(i >= bytes.len() && fragment.is_some()) {
                        return Err(ParseError::RelativeUrlWithoutBase);
                    }
                    url = base.clone();
                    url.fragment = None;
                    break;
                }
                state = if base.scheme == "file" {
                    State::File
                } else {
                    State::Relative
                };
            }

            State::SpecialRelativeOrAuthority => {
                if remaining[i..].starts_with("//") {
                    i += 2;
                    state = State::SpecialAuthorityIgnoreSlashes;
                } else {
                    report(reporter, ValidationError::SpecialSchemeMissingFollowingSolidus);
                    state = State::Relative;
                }
            }

            State::PathOrAuthority => {
                if bytes.get(i) == Some(&b'/') {
                    i += 1;
                    state = State::Authority;
                } else {
                    state = State::Path;
                }
            }

            State::Relative => {
                let Some(base) = base else {
                    return Err(ParseError::RelativeUrlWithoutBase);
                };
                url.scheme = base.scheme.clone();
                url.scheme_type = base.scheme_type;

                match bytes.get(i).copied() {
                    Some(b'/') => {
                        i += 1;
                        state = State::RelativeSlash;
                    }
                    Some(b'\\') if url.is_special() => {
                        report(reporter, ValidationError::InvalidReverseSolidus);
                        i += 1;
                        state = State::RelativeSlash;
                    }
                    Some(b'?') => {
                        copy_authority(&mut url, base);
                        url.path = base.path.clone();
                        i += 1;
                        state = State::Query;
                    }
                    Some(_) => {
                        copy_authority(&mut url, base);
                        url.path = base.path.clone();
                        url.query = None;
                        if let Path::Segments(segments) = &mut url.path {
                            shorten_path(segments, url.scheme_type);
                        }
                        state = State::Path;
                    }
                    None => {
                        copy_authority(&mut url, base);
                        url.path = base.path.clone();
                        url.query = base.query.clone();
                        break;
                    }
                }
            }

            State::RelativeSlash => {
                match bytes.get(i).copied() {
                    Some(b'/') if url.is_special() => {
                        i += 1;
                        state = State::SpecialAuthorityIgnoreSlashes;
                    }
                    Some(b'\\') if url.is_special() => {
                        report(reporter, ValidationError::InvalidReverseSolidus);
                        i += 1;
                        state = State::SpecialAuthorityIgnoreSlashes;
                    }
                    Some(b'/') => {
                        i += 1;
                        state = State::Authority;
                    }
                    _ => {
                        let Some(base) = base else {
                            return Err(ParseError::RelativeUrlWithoutBase);
                        };
                        copy_authority(&mut url, base);
                        state = State::Path;
                    }
                }
            }

            State::SpecialAuthoritySlashes => {
                if remaining[i..].starts_with("//") {
                    i += 2;
                } else {
                    report(reporter, ValidationError::SpecialSchemeMissingFollowingSolidus);
                }
                state = State::SpecialAuthorityIgnoreSlashes;
            }

            State::SpecialAuthorityIgnoreSlashes => {
                while matches!(bytes.get(i).copied(), Some(b'/' | b'\\')) {
                    i += 1;
                }
                state = State::Authority;
            }

            State::Authority => {
                let end = authority_end(bytes, i, url.is_special());
                let view = &remaining[i..end];

                // Everything before the last @ is userinfo; earlier @
                // signs get percent-encoded along with the rest
                if let Some(at) = view.rfind('@') {
                    report(reporter, ValidationError::EmbeddedCredentials);
                    if at == view.len() - 1 {
                        return Err(ParseError::InvalidHost);
                    }
                    let credentials = &view[..at];
                    match credentials.split_once(':') {
                        Some((username, password)) => {
                            url.username = percent_encode_with(username, USERINFO_SET);
                            url.password = percent_encode_with(password, USERINFO_SET);
                        }
                        None => {
                            url.username = percent_encode_with(credentials, USERINFO_SET);
                        }
                    }
                    i += at + 1;
                }
                state = State::Host;
            }

            State::Host => {
                let mut inside_brackets = false;
                let mut colon = None;
                let mut end = i;
                while end < bytes.len() {
                    match bytes[end] {
                        b'[' => inside_brackets = true,
                        b']' => inside_brackets = false,
                        b':' if !inside_brackets => {
                            colon = Some(end);
                            break;
                        }
                        b'/' | b'?' => break,
                        b'\\' if url.is_special() => break,
                        _ => {}
                    }
                    end += 1;
                }
                let view = &remaining[i..end];

                if let Some(colon) = colon {
                    // An empty host cannot take a port
                    if view.is_empty() {
                        return Err(ParseError::InvalidHost);
                    }
                    url.host = Some(parse_host(view, !url.is_special())?);
                    i = colon + 1;
                    state = State::Port;
                } else {
                    if view.is_empty() {
                        if url.is_special() {
                            return Err(ParseError::InvalidHost);
                        }
                        url.host = Some(Host::Empty);
                    } else {
                        url.host = Some(parse_host(view, !url.is_special())?);
                    }
                    i = end;
                    state = State::PathStart;
                }
            }

            State::Port => {
                let mut end = i;
                while end < bytes.len() {
                    let b = bytes[end];
                    if b == b'/' || b == b'?' || (url.is_special() && b == b'\\') {
                        break;
                    }
                    if !b.is_ascii_digit() {
                        return Err(ParseError::InvalidPort);
                    }
                    end += 1;
                }
                let digits = &remaining[i..end];
                if !digits.is_empty() {
                    let port: u32 = digits.parse().map_err(|_| ParseError::InvalidPort)?;
                    let port = u16::try_from(port).map_err(|_| ParseError::InvalidPort)?;
                    url.port =
                        (url.scheme_type.default_port() != Some(port)).then_some(port);
                }
                i = end;
                state = State::PathStart;
            }

            State::File => {
                url.scheme = "file".to_string();
                url.scheme_type = SchemeType::File;
                url.host = Some(Host::Empty);

                match bytes.get(i).copied() {
                    Some(b'/' | b'\\') => {
                        if bytes[i] == b'\\' {
                            report(reporter, ValidationError::InvalidReverseSolidus);
                        }
                        i += 1;
                        state = State::FileSlash;
                    }
                    _ => match base {
                        Some(base) if base.scheme == "file" => {
                            url.host = base.host.clone();
                            url.path = base.path.clone();
                            url.query = base.query.clone();
                            match bytes.get(i).copied() {
                                Some(b'?') => {
                                    i += 1;
                                    state = State::Query;
                                }
                                Some(_) => {
                                    url.query = None;
                                    if starts_with_windows_drive_letter(&remaining[i..]) {
                                        report(
                                            reporter,
                                            ValidationError::FileInvalidWindowsDriveLetter,
                                        );
                                        url.path = Path::Segments(Vec::new());
                                    } else if let Path::Segments(segments) = &mut url.path {
                                        shorten_path(segments, SchemeType::File);
                                    }
                                    state = State::Path;
                                }
                                None => break,
                            }
                        }
                        _ => state = State::Path,
                    },
                }
            }

            State::FileSlash => {
                match bytes.get(i).copied() {
                    Some(b'/' | b'\\') => {
                        if bytes[i] == b'\\' {
                            report(reporter, ValidationError::InvalidReverseSolidus);
                        }
                        i += 1;
                        state = State::FileHost;
                    }
                    _ => {
                        if let Some(base) = base
                            && base.scheme == "file"
                        {
                            url.host = base.host.clone();
                            // file:/ keeps the base drive letter unless
                            // the input brings its own
                            if !starts_with_windows_drive_letter(&remaining[i..])
                                && let Path::Segments(base_segments) = &base.path
                                && let Some(first) = base_segments.first()
                                && crate::checkers::is_normalized_windows_drive_letter(first)
                                && let Path::Segments(segments) = &mut url.path
                            {
                                segments.push(first.clone());
                            }
                        }
                        state = State::Path;
                    }
                }
            }

            State::FileHost => {
                let mut end = i;
                while end < bytes.len() && !matches!(bytes[end], b'/' | b'\\' | b'?') {
                    end += 1;
                }
                let view = &remaining[i..end];

                if is_windows_drive_letter(view) {
                    // Not a host; reparse the drive letter as the first
                    // path segment
                    report(reporter, ValidationError::FileInvalidWindowsDriveLetterHost);
                    state = State::Path;
                } else if view.is_empty() {
                    url.host = Some(Host::Empty);
                    i = end;
                    state = State::PathStart;
                } else {
                    let host = parse_host(view, false)?;
                    url.host = Some(match host {
                        Host::Domain(domain) if domain == "localhost" => Host::Empty,
                        other => other,
                    });
                    i = end;
                    state = State::PathStart;
                }
            }

            State::PathStart => {
                if url.is_special() {
                    match bytes.get(i).copied() {
                        Some(b'/') => i += 1,
                        Some(b'\\') => {
                            report(reporter, ValidationError::InvalidReverseSolidus);
                            i += 1;
                        }
                        _ => {}
                    }
                    state = State::Path;
                } else {
                    match bytes.get(i).copied() {
                        Some(b'?') => {
                            i += 1;
                            state = State::Query;
                        }
                        Some(b'/') => {
                            i += 1;
                            state = State::Path;
                        }
                        Some(_) => state = State::Path,
                        None => break,
                    }
                }
            }

            State::Path => {
                let end = memchr::memchr(b'?', &bytes[i..]).map_or(bytes.len(), |pos| i + pos);
                let view = &remaining[i..end];
                let scheme_type = url.scheme_type;
                if let Path::Segments(segments) = &mut url.path {
                    parse_path_segments(view, scheme_type, segments);
                }
                i = end;
                if i < bytes.len() {
                    i += 1;
                    state = State::Query;
                } else {
                    break;
                }
            }

            State::OpaquePath => {
                let end = memchr::memchr(b'?', &bytes[i..]).map_or(bytes.len(), |pos| i + pos);
                let view = &remaining[i..end];
                // Only the final space before a query or fragment is
                // escaped; earlier spaces stay literal
                let escape_trailing_space =
                    view.ends_with(' ') && (end < bytes.len() || fragment.is_some());
                let body = if escape_trailing_space {
                    &view[..view.len() - 1]
                } else {
                    view
                };
                let mut encoded = String::new();
                percent_encode_into(&mut encoded, body, C0_CONTROL_SET);
                if escape_trailing_space {
                    encoded.push_str("%20");
                }
                url.path = Path::Opaque(encoded);
                i = end;
                if i < bytes.len() {
                    i += 1;
                    state = State::Query;
                } else {
                    break;
                }
            }

            State::Query => {
                let set = if url.is_special() {
                    SPECIAL_QUERY_SET
                } else {
                    QUERY_SET
                };
                let mut encoded = String::new();
                percent_encode_into(&mut encoded, &remaining[i..], set);
                url.query = Some(encoded);
                break;
            }
        }
    }

    if let Some(fragment) = fragment {
        let mut encoded = String::new();
        percent_encode_into(&mut encoded, fragment, FRAGMENT_SET);
        url.fragment = Some(encoded);
    }

    Ok(url)
}

/// Copy username, password, host and port from the base URL
fn copy_authority(url: &mut Url, base: &Url) {
    url.username = base.username.clone();
    url.password = base.password.clone();
    url.host = base.host.clone();
    url.port = base.port;
}

/// Find the end of the authority section: the first `/`, `?`, or, for
/// special schemes, `\`
fn authority_end(bytes: &[u8], from: usize, special: bool) -> usize {
    let mut end = from;
    while end < bytes.len() {
        match bytes[end] {
            b'/' | b'?' => break,
            b'\\' if special => break,
            _ => end += 1,
        }
    }
    end
}
