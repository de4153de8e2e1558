//! Try to guess the types of files on disk.

use std::path::Path;

use crate::cursor::ByteCursor;
use crate::errors::ReadResult;
use crate::idx::MAGIC_LINE;

/// Internal helper function which looks for "magic" bytes at the start of
/// a file.  Files too short to hold the magic bytes don't match.
fn has_magic(path: &Path, magic: &[u8]) -> ReadResult<bool> {
    let mut c = ByteCursor::open(path)?;
    if c.len() < magic.len() as u64 {
        return Ok(false);
    }
    Ok(c.read_bytes(magic.len())? == magic)
}

/// Does the specified path appear to point to a DVD `*.IFO` or `*.BUP`
/// file?  This matches both video manager and title set files.
pub fn is_ifo_file<P: AsRef<Path>>(path: P) -> ReadResult<bool> {
    has_magic(path.as_ref(), b"DVDVIDEO-")
}

/// Does the specified path appear to point to an `*.idx` file?
pub fn is_idx_file<P: AsRef<Path>>(path: P) -> ReadResult<bool> {
    // Only the part before the version number.
    has_magic(path.as_ref(), &MAGIC_LINE.as_bytes()[..19])
}

#[test]
fn probe_ifo_files() {
    assert!(is_ifo_file("../fixtures/dvd/VIDEO_TS/VIDEO_TS.IFO").unwrap());
    assert!(is_ifo_file("../fixtures/dvd/VIDEO_TS/VTS_01_0.BUP").unwrap());
    assert!(!is_ifo_file("../fixtures/example.idx").unwrap());
    assert!(!is_ifo_file("../fixtures/example.eit").unwrap());
}

#[test]
fn probe_idx_files() {
    assert!(is_idx_file("../fixtures/example.idx").unwrap());
    assert!(!is_idx_file("../fixtures/dvd/VIDEO_TS/VIDEO_TS.IFO").unwrap());
    assert!(is_idx_file("../fixtures/does-not-exist.idx").is_err());
}
