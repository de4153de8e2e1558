//! Random-access reading of big-endian binary structures.
//!
//! Both the DVD `*.IFO` files and DVB-SI `*.eit` files are densely packed,
//! big-endian structures which we visit by jumping around between offsets
//! stored in the file itself.  `ByteCursor` wraps any `Read + Seek` source
//! and checks every seek and read against the length of the input, so that
//! a corrupt offset produces an error instead of garbage.

use log::trace;
use std::fs;
use std::io::{self, prelude::*, SeekFrom};
use std::path::Path;

use crate::errors::{ReadError, ReadResult};
use crate::util::BytesFormatter;

/// The size of a DVD logical block, in bytes.
pub const DVD_BLOCK_SIZE: u64 = 2048;

/// Decode a single packed binary-coded decimal byte, returning `None` if
/// either nibble is greater than 9.
pub fn decode_bcd(byte: u8) -> Option<u8> {
    let hi = byte >> 4;
    let lo = byte & 0x0f;
    if hi > 9 || lo > 9 {
        None
    } else {
        Some(hi * 10 + lo)
    }
}

#[test]
fn decode_every_bcd_byte() {
    for byte in 0..=0xffu8 {
        let (hi, lo) = (byte >> 4, byte & 0x0f);
        if hi <= 9 && lo <= 9 {
            assert_eq!(decode_bcd(byte), Some(hi * 10 + lo));
        } else {
            assert_eq!(decode_bcd(byte), None, "accepted {:#04x}", byte);
        }
    }
    assert_eq!(decode_bcd(0x99), Some(99));
    assert_eq!(decode_bcd(0x00), Some(0));
}

/// A bounds-checked reader over a seekable byte source.
#[derive(Debug)]
pub struct ByteCursor<R> {
    reader: R,
    /// Length of the input.
    len: u64,
    /// Our current position, relative to the start of `reader`.
    pos: u64,
    /// Added to every offset we report, so that a cursor over a slice of a
    /// larger file still reports offsets within that file.
    base: u64,
}

impl ByteCursor<io::BufReader<fs::File>> {
    /// Open a file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> ReadResult<Self> {
        let f = fs::File::open(path.as_ref())
            .map_err(|source| ReadError::Io { offset: 0, source })?;
        ByteCursor::new(io::BufReader::new(f))
    }
}

impl<'a> ByteCursor<io::Cursor<&'a [u8]>> {
    /// Read from an in-memory buffer which was found at `base` in some
    /// larger input.
    pub fn from_slice(bytes: &'a [u8], base: u64) -> Self {
        ByteCursor {
            reader: io::Cursor::new(bytes),
            len: bytes.len() as u64,
            pos: 0,
            base,
        }
    }
}

impl<R: Read + Seek> ByteCursor<R> {
    /// Wrap a reader, measuring its length.  The cursor starts at offset 0.
    pub fn new(mut reader: R) -> ReadResult<Self> {
        let len = reader
            .seek(SeekFrom::End(0))
            .and_then(|len| reader.seek(SeekFrom::Start(0)).map(|_| len))
            .map_err(|source| ReadError::Io { offset: 0, source })?;
        Ok(ByteCursor {
            reader,
            len,
            pos: 0,
            base: 0,
        })
    }

    /// The length of our input.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Is our input empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Our current offset within the input.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Our current offset, as it should be reported to a human.
    pub fn absolute_position(&self) -> u64 {
        self.base + self.pos
    }

    /// The number of bytes between our position and the end of the input.
    pub fn remaining(&self) -> u64 {
        self.len - self.pos
    }

    /// Move to `offset`, which must lie inside the input.
    pub fn seek(&mut self, offset: u64) -> ReadResult<()> {
        if offset >= self.len {
            return Err(ReadError::OutOfRange {
                offset: self.base + offset,
                len: self.base + self.len,
            });
        }
        self.seek_unchecked(offset)
    }

    /// Skip over `n` bytes.
    pub fn skip(&mut self, n: u64) -> ReadResult<()> {
        self.check_available(n)?;
        self.seek_unchecked(self.pos + n)
    }

    fn seek_unchecked(&mut self, offset: u64) -> ReadResult<()> {
        self.reader
            .seek(SeekFrom::Start(offset))
            .map_err(|source| ReadError::Io {
                offset: self.base + offset,
                source,
            })?;
        self.pos = offset;
        Ok(())
    }

    fn check_available(&self, wanted: u64) -> ReadResult<()> {
        if wanted > self.remaining() {
            Err(ReadError::Truncated {
                offset: self.absolute_position(),
                wanted,
                available: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> ReadResult<()> {
        let wanted = buf.len() as u64;
        self.check_available(wanted)?;
        let offset = self.absolute_position();
        let available = self.remaining();
        self.reader.read_exact(buf).map_err(|source| {
            // The input shrank underneath us.
            if source.kind() == io::ErrorKind::UnexpectedEof {
                ReadError::Truncated { offset, wanted, available }
            } else {
                ReadError::Io { offset, source }
            }
        })?;
        self.pos += wanted;
        Ok(())
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> ReadResult<Vec<u8>> {
        let mut buf = vec![0; n];
        self.fill(&mut buf)?;
        trace!("read {:?} at {:#x}", BytesFormatter(&buf), self.absolute_position() - n as u64);
        Ok(buf)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> ReadResult<u8> {
        let mut buf = [0; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a big-endian `u16`.
    pub fn read_u16(&mut self) -> ReadResult<u16> {
        let mut buf = [0; 2];
        self.fill(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Read a big-endian `u32`.
    pub fn read_u32(&mut self) -> ReadResult<u32> {
        let mut buf = [0; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Read a `u32` sector number and convert it to a byte offset.
    pub fn read_block_offset(&mut self) -> ReadResult<u64> {
        Ok(u64::from(self.read_u32()?) * DVD_BLOCK_SIZE)
    }

    /// Read an `n`-byte ASCII field, such as a file identifier or a
    /// language code.  Returns `None` if the field starts with a zero byte,
    /// which is how unused language fields are marked.
    pub fn read_ascii_fixed(&mut self, n: usize) -> ReadResult<Option<String>> {
        let bytes = self.read_bytes(n)?;
        if bytes.first().map_or(true, |&b| b == 0) {
            return Ok(None);
        }
        Ok(Some(
            bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { '?' })
                .collect(),
        ))
    }

    /// Read a single packed BCD byte as a number from 0 to 99.
    pub fn read_bcd(&mut self) -> ReadResult<u8> {
        let offset = self.absolute_position();
        let byte = self.read_u8()?;
        decode_bcd(byte).ok_or(ReadError::InvalidBcd { offset, byte })
    }

    /// Read a 4-byte DVD playback time (BCD hours, minutes, seconds and
    /// frames, with the frame rate in the top two bits of the frame byte),
    /// and convert it to milliseconds, rounding down.
    pub fn read_bcd_time_ms(&mut self) -> ReadResult<u64> {
        let hours = u64::from(self.read_bcd()?);
        let minutes = u64::from(self.read_bcd()?);
        let seconds = u64::from(self.read_bcd()?);

        let offset = self.absolute_position();
        let frame_byte = self.read_u8()?;
        let bits = frame_byte >> 6;
        let frames = decode_bcd(frame_byte & 0x3f)
            .ok_or(ReadError::InvalidBcd { offset, byte: frame_byte })?;
        let frames = u64::from(frames);

        // Frame rates in hundredths of a frame per second, so that 29.97 fps
        // stays exact.
        let centi_fps = match bits {
            0b01 => 2500,
            0b11 => 2997,
            _ => return Err(ReadError::UnknownFrameRate { offset, bits }),
        };

        let whole_seconds = (hours * 60 + minutes) * 60 + seconds;
        Ok(whole_seconds * 1000 + frames * 1000 * 100 / centi_fps)
    }
}
