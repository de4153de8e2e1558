//! Text strings in DVB-SI tables.
//!
//! A string's first byte may select a character table (see Annex A of
//! ETSI EN 300 468).  Strings starting with a printable byte use the
//! default table, which we treat as Latin-1.

use encoding::{label::encoding_from_whatwg_label, types::DecoderTrap};
use log::trace;
use std::io::{Read, Seek};

use crate::cursor::ByteCursor;
use crate::errors::{ReadError, SiError};

/// Read a string preceded by a one-byte length.
pub(crate) fn read_text<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<String, SiError> {
    let len = c.read_u8()?;
    read_encoded_string(c, usize::from(len))
}

/// Read a string of exactly `len` bytes.
pub(crate) fn read_encoded_string<R: Read + Seek>(
    c: &mut ByteCursor<R>,
    len: usize,
) -> Result<String, SiError> {
    let offset = c.absolute_position();
    let bytes = c.read_bytes(len)?;
    decode_text_at(&bytes, offset)
}

/// Decode a DVB-SI text string, honoring any character table selector at
/// its start.
pub fn decode_text(bytes: &[u8]) -> Result<String, SiError> {
    decode_text_at(bytes, 0)
}

fn decode_text_at(bytes: &[u8], offset: u64) -> Result<String, SiError> {
    let first = match bytes.first() {
        None => return Ok(String::new()),
        Some(&first) => first,
    };
    if first >= 0x20 {
        return Ok(latin1(bytes));
    }

    match first {
        0x01..=0x0b => {
            let part = first + 4;
            let label = iso_8859_label(part)
                .ok_or(SiError::UnsupportedCharacterEncoding { code: first })?;
            decode_with(label, &single_byte_controls(&bytes[1..]), first)
        }
        0x10 => {
            if bytes.len() < 3 {
                return Err(ReadError::Truncated {
                    offset,
                    wanted: 3,
                    available: bytes.len() as u64,
                }
                .into());
            }
            if bytes[1] != 0x00 {
                return Err(SiError::UnsupportedEncodingType { byte: bytes[1] });
            }
            let part = bytes[2];
            let text = single_byte_controls(&bytes[3..]);
            if part == 1 {
                return Ok(latin1(&text));
            }
            let label = iso_8859_label(part).ok_or(SiError::UnsupportedIsoEncoding { table: part })?;
            decode_with(label, &text, first)
        }
        0x11 => decode_with("utf-16be", &bytes[1..], first),
        0x12 => decode_with("euc-kr", &bytes[1..], first),
        0x13 => decode_with("gb2312", &bytes[1..], first),
        0x14 => decode_with("big5", &bytes[1..], first),
        0x15 => decode_with("utf-8", &bytes[1..], first),
        // 0x1f selects an encoding by `encoding_type_id`, which we don't
        // support.  Everything else is reserved.
        code => Err(SiError::UnsupportedCharacterEncoding { code }),
    }
}

/// The `encoding` label for ISO 8859 part `part`, if there is one.  Part 12
/// was never published.
fn iso_8859_label(part: u8) -> Option<&'static str> {
    match part {
        2 => Some("iso-8859-2"),
        3 => Some("iso-8859-3"),
        4 => Some("iso-8859-4"),
        5 => Some("iso-8859-5"),
        6 => Some("iso-8859-6"),
        7 => Some("iso-8859-7"),
        8 => Some("iso-8859-8"),
        // WHATWG maps these to their Windows supersets, which agree with
        // ISO 8859 in the printable range.
        9 => Some("iso-8859-9"),
        10 => Some("iso-8859-10"),
        11 => Some("iso-8859-11"),
        13 => Some("iso-8859-13"),
        14 => Some("iso-8859-14"),
        15 => Some("iso-8859-15"),
        _ => None,
    }
}

fn decode_with(label: &str, bytes: &[u8], code: u8) -> Result<String, SiError> {
    trace!("decoding {} bytes as {}", bytes.len(), label);
    let encoding =
        encoding_from_whatwg_label(label).ok_or(SiError::UnsupportedCharacterEncoding { code })?;
    encoding
        .decode(bytes, DecoderTrap::Replace)
        .map_err(|_| SiError::UnsupportedCharacterEncoding { code })
}

/// Single-byte tables reserve 0x80 to 0x9f for control codes.  Keep the
/// line break and drop the rest, which are emphasis markers.
fn single_byte_controls(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .filter_map(|&b| match b {
            0x8a => Some(b'\n'),
            0x80..=0x9f => None,
            _ => Some(b),
        })
        .collect()
}

fn latin1(bytes: &[u8]) -> String {
    single_byte_controls(bytes).into_iter().map(char::from).collect()
}

#[test]
fn empty_strings_decode_to_nothing() {
    assert_eq!(decode_text(&[]).unwrap(), "");
    let mut c = ByteCursor::from_slice(&[0x00], 0);
    assert_eq!(read_text(&mut c).unwrap(), "");
}

#[test]
fn printable_first_byte_means_latin1() {
    assert_eq!(decode_text(b"Das Boot").unwrap(), "Das Boot");
    assert_eq!(decode_text(&[b'K', 0xf6, b'l', b'n']).unwrap(), "Köln");
    assert_eq!(decode_text(&[b'a', 0x8a, b'b', 0x86, b'c', 0x87]).unwrap(), "a\nbc");
}

#[test]
fn selects_character_tables() {
    // ISO 8859-5, Cyrillic.
    assert_eq!(decode_text(&[0x01, 0xbc, 0xd8, 0xe0]).unwrap(), "Мир");
    // ISO 8859-7, Greek.
    assert_eq!(decode_text(&[0x03, 0xe1]).unwrap(), "α");
    // ISO 8859-15, which has a euro sign.
    assert_eq!(decode_text(&[0x0b, 0xa4]).unwrap(), "€");
    // UCS-2.
    assert_eq!(decode_text(&[0x11, 0x00, 0x41, 0x04, 0x1c]).unwrap(), "AМ");
    // UTF-8.
    let mut bytes = vec![0x15];
    bytes.extend_from_slice("Amélie".as_bytes());
    assert_eq!(decode_text(&bytes).unwrap(), "Amélie");
}

#[test]
fn selects_iso_8859_parts() {
    assert_eq!(decode_text(&[0x10, 0x00, 0x01, 0xe9]).unwrap(), "é");
    assert_eq!(decode_text(&[0x10, 0x00, 0x02, 0xb9]).unwrap(), "š");
    assert!(matches!(
        decode_text(&[0x10, 0x01, 0x02, 0x41]),
        Err(SiError::UnsupportedEncodingType { byte: 0x01 })
    ));
    assert!(matches!(
        decode_text(&[0x10, 0x00, 0x0c, 0x41]),
        Err(SiError::UnsupportedIsoEncoding { table: 0x0c })
    ));
    assert!(matches!(
        decode_text(&[0x10, 0x00, 0x10, 0x41]),
        Err(SiError::UnsupportedIsoEncoding { table: 0x10 })
    ));
    assert!(matches!(
        decode_text(&[0x10, 0x00]),
        Err(SiError::Read(ReadError::Truncated { wanted: 3, available: 2, .. }))
    ));
}

#[test]
fn rejects_unassigned_tables() {
    for &code in &[0x08, 0x0c, 0x16, 0x17, 0x1f] {
        match decode_text(&[code, 0x41]) {
            Err(SiError::UnsupportedCharacterEncoding { code: c }) => assert_eq!(c, code),
            other => panic!("expected an unsupported encoding for {:#x}, got {:?}", code, other),
        }
    }
}

#[test]
fn strings_cannot_read_past_their_length() {
    let mut c = ByteCursor::from_slice(&[0x05, b'a', b'b'], 0x40);
    assert!(matches!(
        read_text(&mut c),
        Err(SiError::Read(ReadError::Truncated { offset: 0x41, wanted: 5, available: 2 }))
    ));
}
