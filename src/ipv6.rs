//! IPv6 address parsing and serialization per the WHATWG URL Standard.
//! Accepts the bracketed form, `::` compression and an embedded IPv4
//! tail; zone identifiers are rejected.

use core::fmt::Write;

use crate::error::{ParseError, Result};

/// Parse an IPv6 address into its eight 16-bit pieces.
/// Brackets are stripped if present.
pub fn parse_ipv6(input: &str) -> Result<[u16; 8]> {
    let input = input
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(input);
    let bytes = input.as_bytes();

    let mut address = [0u16; 8];
    let mut piece_index = 0usize;
    let mut compress: Option<usize> = None;
    let mut pointer = 0usize;

    if bytes.first() == Some(&b':') {
        if bytes.get(1) != Some(&b':') {
            return Err(ParseError::InvalidIpv6);
        }
        pointer = 2;
        piece_index = 1;
        compress = Some(1);
    }

    while pointer < bytes.len() {
        if piece_index == 8 {
            return Err(ParseError::InvalidIpv6);
        }
        if bytes[pointer] == b':' {
            if compress.is_some() {
                return Err(ParseError::InvalidIpv6);
            }
            pointer += 1;
            piece_index += 1;
            compress = Some(piece_index);
            continue;
        }

        let mut value = 0u32;
        let mut length = 0usize;
        while length < 4
            && pointer < bytes.len()
            && bytes[pointer].is_ascii_hexdigit()
        {
            value = value * 0x10 + hex_value(bytes[pointer]);
            pointer += 1;
            length += 1;
        }

        if pointer < bytes.len() && bytes[pointer] == b'.' {
            // Embedded IPv4 tail: rewind the hex digits and read four
            // dot-separated decimal numbers into the last two pieces
            if length == 0 {
                return Err(ParseError::InvalidIpv6);
            }
            pointer -= length;
            if piece_index > 6 {
                return Err(ParseError::InvalidIpv6);
            }
            let mut numbers_seen = 0usize;
            while pointer < bytes.len() {
                if numbers_seen > 0 {
                    if bytes[pointer] == b'.' && numbers_seen < 4 {
                        pointer += 1;
                    } else {
                        return Err(ParseError::InvalidIpv6);
                    }
                }
                if pointer >= bytes.len() || !bytes[pointer].is_ascii_digit() {
                    return Err(ParseError::InvalidIpv6);
                }
                let mut ipv4_piece: Option<u32> = None;
                while pointer < bytes.len() && bytes[pointer].is_ascii_digit() {
                    let digit = u32::from(bytes[pointer] - b'0');
                    ipv4_piece = match ipv4_piece {
                        None => Some(digit),
                        // No leading zeros in the IPv4 tail
                        Some(0) => return Err(ParseError::InvalidIpv6),
                        Some(piece) => Some(piece * 10 + digit),
                    };
                    if ipv4_piece.is_some_and(|piece| piece > 255) {
                        return Err(ParseError::InvalidIpv6);
                    }
                    pointer += 1;
                }
                let piece = ipv4_piece.ok_or(ParseError::InvalidIpv6)?;
                address[piece_index] = (u32::from(address[piece_index]) * 0x100 + piece) as u16;
                numbers_seen += 1;
                if numbers_seen == 2 || numbers_seen == 4 {
                    piece_index += 1;
                }
            }
            if numbers_seen != 4 {
                return Err(ParseError::InvalidIpv6);
            }
            break;
        } else if pointer < bytes.len() {
            if bytes[pointer] == b':' {
                pointer += 1;
                if pointer == bytes.len() {
                    return Err(ParseError::InvalidIpv6);
                }
            } else {
                // Anything else, including `%` zone identifiers
                return Err(ParseError::InvalidIpv6);
            }
        }
        if length == 0 {
            return Err(ParseError::InvalidIpv6);
        }
        address[piece_index] = value as u16;
        piece_index += 1;
    }

    match compress {
        Some(compress) => {
            // Shift everything after the compression to the tail
            let mut swaps = piece_index - compress;
            let mut index = 7;
            while index != 0 && swaps > 0 {
                address.swap(index, compress + swaps - 1);
                index -= 1;
                swaps -= 1;
            }
        }
        None if piece_index != 8 => return Err(ParseError::InvalidIpv6),
        None => {}
    }

    Ok(address)
}

fn hex_value(b: u8) -> u32 {
    match b {
        b'0'..=b'9' => u32::from(b - b'0'),
        b'a'..=b'f' => u32::from(b - b'a' + 10),
        _ => u32::from(b - b'A' + 10),
    }
}

/// Serialize IPv6 pieces without brackets, compressing the longest run
/// of zero pieces (leftmost on ties, runs of one are not compressed)
pub fn serialize_ipv6(address: &[u16; 8]) -> String {
    let compress = longest_zero_run(address);
    let mut result = String::with_capacity(39);

    let mut index = 0;
    while index < 8 {
        if let Some((start, len)) = compress
            && index == start
        {
            result.push_str(if index == 0 { "::" } else { ":" });
            index = start + len;
            continue;
        }
        let _ = write!(&mut result, "{:x}", address[index]);
        if index != 7 {
            result.push(':');
        }
        index += 1;
    }
    result
}

/// Longest run of zero pieces with length at least two
fn longest_zero_run(address: &[u16; 8]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut current: Option<(usize, usize)> = None;

    for (index, &piece) in address.iter().enumerate() {
        if piece == 0 {
            let run = match current {
                Some((start, len)) => (start, len + 1),
                None => (index, 1),
            };
            current = Some(run);
            if best.is_none_or(|(_, best_len)| run.1 > best_len) {
                best = Some(run);
            }
        } else {
            current = None;
        }
    }

    best.filter(|&(_, len)| len > 1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn loopback() {
        assert_eq!(parse_ipv6("[::1]").unwrap(), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(parse_ipv6("::1").unwrap(), [0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn full_and_compressed() {
        assert_eq!(
            parse_ipv6("[2001:db8:0:0:1:0:0:1]").unwrap(),
            [0x2001, 0xdb8, 0, 0, 1, 0, 0, 1]
        );
        assert_eq!(
            parse_ipv6("[2001:db8::1]").unwrap(),
            [0x2001, 0xdb8, 0, 0, 0, 0, 0, 1]
        );
        assert_eq!(parse_ipv6("[1::]").unwrap(), [1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn embedded_ipv4() {
        assert_eq!(
            parse_ipv6("[::127.0.0.1]").unwrap(),
            [0, 0, 0, 0, 0, 0, 0x7f00, 0x0001]
        );
        assert_eq!(
            parse_ipv6("[::ffff:192.168.1.1]").unwrap(),
            [0, 0, 0, 0, 0, 0xffff, 0xc0a8, 0x0101]
        );
    }

    #[test]
    fn rejects_malformed() {
        assert!(parse_ipv6("[1:2:3:4:5:6:7]").is_err());
        assert!(parse_ipv6("[1:2:3:4:5:6:7:8:9]").is_err());
        assert!(parse_ipv6("[1::2::3]").is_err());
        assert!(parse_ipv6("[12345::]").is_err());
        assert!(parse_ipv6("[::1%25eth0]").is_err());
        assert!(parse_ipv6("[::127.0.0.256]").is_err());
        assert!(parse_ipv6("[::01.2.3.4]").is_err());
        assert!(parse_ipv6("[1:]").is_err());
        assert!(parse_ipv6("[:1]").is_err());
    }

    #[test]
    fn serialization_compresses_longest_run() {
        assert_eq!(serialize_ipv6(&[0, 0, 0, 0, 0, 0, 0, 1]), "::1");
        assert_eq!(serialize_ipv6(&[0x2001, 0xdb8, 0, 0, 0, 0, 0, 1]), "2001:db8::1");
        assert_eq!(serialize_ipv6(&[1, 0, 0, 0, 0, 0, 0, 0]), "1::");
        assert_eq!(
            serialize_ipv6(&[1, 0, 0, 2, 0, 0, 0, 3]),
            "1:0:0:2::3"
        );
        assert_eq!(serialize_ipv6(&[0, 1, 0, 1, 0, 1, 0, 1]), "0:1:0:1:0:1:0:1");
        assert_eq!(serialize_ipv6(&[8, 0, 0, 0, 0, 0, 0, 0]), "8::");
    }
}
