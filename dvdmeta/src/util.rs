//! Miscellaneous utilities.

use std::fmt;

/// Wrapper to force a `&[u8]` to display as nicely-formatted hexadecimal
/// bytes with only the first line or so of bytes shown.  Descriptor bodies
/// and IFO headers can be long, and we only want a taste of them in logs.
pub struct BytesFormatter<'a>(pub &'a [u8]);

impl<'a> fmt::Debug for BytesFormatter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let BytesFormatter(bytes) = *self;
        for byte in bytes.iter().take(16) {
            write!(f, "{:02x} ", byte)?;
        }
        if bytes.len() > 16 {
            write!(f, "... ")?;
        }
        write!(f, "({} bytes)", bytes.len())
    }
}

#[test]
fn formats_only_the_first_bytes() {
    let short = format!("{:?}", BytesFormatter(&[0x00, 0xab]));
    assert_eq!(short, "00 ab (2 bytes)");
    let long = format!("{:?}", BytesFormatter(&[0x11; 20]));
    assert!(long.ends_with("11 ... (20 bytes)"));
}
