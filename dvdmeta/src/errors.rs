//! Error types for each of our decoders.
//!
//! Low-level read failures are reported as [`ReadError`], and each decoder
//! wraps them in its own error type along with whatever context (file path,
//! title number, descriptor tag) is needed to diagnose a damaged disc or
//! stream.

use std::io;
use std::path::PathBuf;
use std::result;
use thiserror::Error;

/// Errors which can occur while reading raw bytes with a
/// [`ByteCursor`](crate::ByteCursor).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadError {
    /// The underlying reader failed.
    #[error("I/O error at offset {offset:#x}")]
    Io {
        /// The offset we were reading from.
        offset: u64,
        /// The underlying error.
        source: io::Error,
    },

    /// We were asked to seek outside the input.
    #[error("offset {offset:#x} is outside of input of length {len:#x}")]
    OutOfRange {
        /// The requested offset.
        offset: u64,
        /// The length of the input.
        len: u64,
    },

    /// The input ended before we could read everything we needed.
    #[error("input truncated at offset {offset:#x}: wanted {wanted} bytes, {available} available")]
    Truncated {
        /// The offset at which the read started.
        offset: u64,
        /// The number of bytes we wanted.
        wanted: u64,
        /// The number of bytes which were actually left.
        available: u64,
    },

    /// A binary-coded decimal byte contained a nibble greater than 9.
    #[error("invalid BCD byte {byte:#04x} at offset {offset:#x}")]
    InvalidBcd {
        /// The offset of the bad byte.
        offset: u64,
        /// The bad byte.
        byte: u8,
    },

    /// A DVD time stamp used a frame rate selector other than 25 or 29.97 fps.
    #[error("unknown frame rate bits {bits:#04b} at offset {offset:#x}")]
    UnknownFrameRate {
        /// The offset of the frame byte.
        offset: u64,
        /// The two frame rate bits.
        bits: u8,
    },
}

/// Errors which can occur while reading DVD `*.IFO` and `*.BUP` files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IfoError {
    /// A required file does not exist.
    #[error("could not find {}", .path.display())]
    FileNotFound {
        /// The path we looked for.
        path: PathBuf,
    },

    /// We could not read part of a file.
    #[error("could not read {}", .path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        source: ReadError,
    },

    /// The file did not start with the expected identifier.
    #[error("{} is not a {expected:?} file (found {found:?})", .path.display())]
    BadMagic {
        /// The file being read.
        path: PathBuf,
        /// The identifier we wanted.
        expected: &'static str,
        /// The identifier we found, if it was printable at all.
        found: Option<String>,
    },

    /// Two titles in one title set claim the same in-VTS title number.
    #[error("title {title} appears twice in VTS {vts}")]
    DuplicateTitle {
        /// The title set number.
        vts: u8,
        /// The duplicated in-VTS title number.
        title: u8,
    },

    /// A title refers to a program chain (or title entry) which is not in
    /// the title set.
    #[error("title {title} of VTS {vts} refers to missing program chain {pgc}")]
    MissingPgc {
        /// The title set number.
        vts: u8,
        /// The in-VTS title number.
        title: u8,
        /// The program chain number we could not find.
        pgc: u16,
    },
}

/// Errors which can occur while reading DVB-SI event information.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SiError {
    /// We could not read the underlying stream.
    #[error("could not read event information")]
    Read(#[from] ReadError),

    /// We could not open an event information file.
    #[error("could not open {}", .path.display())]
    Io {
        /// The path we tried to open.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// We found a descriptor we don't know how to decode.
    #[error("unknown descriptor tag {tag:#04x} at offset {offset:#x}")]
    UnknownDescriptorTag {
        /// The descriptor tag.
        tag: u8,
        /// The offset of the tag byte.
        offset: u64,
    },

    /// The descriptor lengths do not add up to the descriptor loop length.
    #[error("descriptor at offset {offset:#x} needs {needed} bytes but only {remaining} remain in the descriptor loop")]
    DescriptorLengthMismatch {
        /// The offset of the descriptor.
        offset: u64,
        /// Bytes left in the declared descriptor loop.
        remaining: u64,
        /// Bytes needed by the next descriptor (at least its 2 byte header).
        needed: u64,
    },

    /// A `0x10` encoded string was not followed by a `0x00` byte.
    #[error("unsupported encoding type byte {byte:#04x} after 0x10")]
    UnsupportedEncodingType {
        /// The byte found after `0x10`.
        byte: u8,
    },

    /// A `0x10 0x00` encoded string selected an ISO 8859 part we don't have.
    #[error("unsupported ISO 8859 table {table:#04x}")]
    UnsupportedIsoEncoding {
        /// The requested ISO 8859 part.
        table: u8,
    },

    /// An encoded string selected a character table we don't have.
    #[error("unsupported character encoding {code:#04x}")]
    UnsupportedCharacterEncoding {
        /// The character table selector.
        code: u8,
    },

    /// The start time of an event is not a real date and time.
    #[error("invalid event start time: MJD {mjd} {hour:02}:{minute:02}:{second:02}")]
    InvalidStartTime {
        /// The Modified Julian Date.
        mjd: u16,
        /// The hour.
        hour: u32,
        /// The minute.
        minute: u32,
        /// The second.
        second: u32,
    },
}

/// Errors which can occur while reading or writing VobSub `*.idx` files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IdxError {
    /// We could not read or write a file.
    #[error("I/O error accessing {}", .path.display())]
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The first line of the file was not the VobSub magic line.
    #[error("not a VobSub index file (first line {first_line:?})")]
    NotAVobsubFile {
        /// The first line we found.
        first_line: String,
    },

    /// We found a setting we don't know.
    #[error("illegal setting {key:?} on line {line}")]
    IllegalSetting {
        /// The 1-based line number.
        line: usize,
        /// The unknown key.
        key: String,
    },

    /// A `timestamp:` line did not have the expected format.
    #[error("malformed timestamp {value:?} on line {line}")]
    MalformedTimestamp {
        /// The 1-based line number.
        line: usize,
        /// The value after `timestamp:`.
        value: String,
    },

    /// A line was neither a comment nor a `key: value` pair.
    #[error("could not parse line {line}: {text:?}")]
    MalformedLine {
        /// The 1-based line number.
        line: usize,
        /// The text of the line.
        text: String,
    },

    /// A `palette:` value was not 16 comma-separated RGB hex colors.
    #[error("invalid palette {value:?}")]
    InvalidPalette {
        /// The palette value.
        value: String,
    },
}

/// Result type for [`ByteCursor`](crate::ByteCursor) reads.
pub type ReadResult<T> = result::Result<T, ReadError>;
