//! The Video Manager (`VIDEO_TS.IFO`), which lists every title on the disc.

use log::{debug, warn};
use std::io::{Read, Seek};
use std::ops::Range;

use crate::cursor::ByteCursor;
use crate::errors::ReadResult;

/// The identifier at the start of `VIDEO_TS.IFO`.
pub(crate) const VMG_MAGIC: &str = "DVDVIDEO-VMG";

/// Where the sector of the title search pointer table is stored.
const TITLE_TABLE_POINTER: u64 = 0xc4;

/// Size of the title table header.
const TITLE_TABLE_HEADER_LEN: u64 = 8;

/// Size of each entry in the title table.
const TITLE_ENTRY_LEN: u64 = 12;

/// One entry from the title search pointer table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TitleEntry {
    pub number: u16,
    pub angles: u8,
    pub chapters: u16,
    pub vts: u8,
    pub vts_title: u8,
}

/// Read the title search pointer table.
pub(crate) fn read_title_entries<R: Read + Seek>(
    c: &mut ByteCursor<R>,
) -> ReadResult<Vec<TitleEntry>> {
    c.seek(TITLE_TABLE_POINTER)?;
    let table = c.read_block_offset()?;

    c.seek(table)?;
    let declared = c.read_u16()?;
    c.skip(2)?;
    let end = u64::from(c.read_u32()?);

    // The end address points at the last byte of the table, and some
    // authoring tools get the title count wrong.  Trust the table size.
    let derived = (end + 1).saturating_sub(TITLE_TABLE_HEADER_LEN) / TITLE_ENTRY_LEN;
    if derived != u64::from(declared) {
        warn!(
            "title table declares {} titles but its size allows {}",
            declared, derived
        );
    }

    let mut entries = vec![];
    for i in 0..derived {
        c.seek(table + TITLE_TABLE_HEADER_LEN + i * TITLE_ENTRY_LEN)?;
        let _playback_type = c.read_u8()?;
        let angles = c.read_u8()?;
        let chapters = c.read_u16()?;
        let _parental_mask = c.read_u16()?;
        let vts = c.read_u8()?;
        let vts_title = c.read_u8()?;
        let entry = TitleEntry {
            // `derived` came from a u32 table size, but 12 byte entries
            // keep it far below u16::MAX.
            number: (i + 1) as u16,
            angles,
            chapters,
            vts,
            vts_title,
        };
        debug!("{:?}", entry);
        entries.push(entry);
    }
    Ok(entries)
}

/// Split titles into runs which share the same title set.
pub(crate) fn vts_groups(entries: &[TitleEntry]) -> Vec<Range<usize>> {
    let mut groups = vec![];
    let mut start = 0;
    for i in 1..=entries.len() {
        if i == entries.len() || entries[i].vts != entries[start].vts {
            if start < i {
                groups.push(start..i);
            }
            start = i;
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(number: u16, vts: u8) -> TitleEntry {
        TitleEntry { number, angles: 1, chapters: 1, vts, vts_title: 1 }
    }

    #[test]
    fn groups_consecutive_title_sets() {
        let entries = vec![entry(1, 1), entry(2, 1), entry(3, 2), entry(4, 1)];
        assert_eq!(vts_groups(&entries), vec![0..2, 2..3, 3..4]);
        assert!(vts_groups(&[]).is_empty());
    }

    /// Build a minimal VMG with a title table in sector 1.
    fn vmg(declared: u16, entries: &[[u8; 12]]) -> Vec<u8> {
        let mut bytes = vec![0u8; 2048];
        bytes[..12].copy_from_slice(VMG_MAGIC.as_bytes());
        bytes[0xc4..0xc8].copy_from_slice(&1u32.to_be_bytes());
        let end = (8 + 12 * entries.len() - 1) as u32;
        bytes.extend_from_slice(&declared.to_be_bytes());
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&end.to_be_bytes());
        for e in entries {
            bytes.extend_from_slice(e);
        }
        bytes.resize(4096, 0);
        bytes
    }

    fn raw_entry(angles: u8, chapters: u16, vts: u8, vts_title: u8) -> [u8; 12] {
        let c = chapters.to_be_bytes();
        [0x3c, angles, c[0], c[1], 0, 0, vts, vts_title, 0, 0, 0, 0]
    }

    #[test]
    fn reads_title_entries() {
        let bytes = vmg(2, &[raw_entry(1, 12, 1, 1), raw_entry(3, 4, 2, 1)]);
        let mut c = ByteCursor::from_slice(&bytes, 0);
        let entries = read_title_entries(&mut c).unwrap();
        assert_eq!(
            entries,
            vec![
                TitleEntry { number: 1, angles: 1, chapters: 12, vts: 1, vts_title: 1 },
                TitleEntry { number: 2, angles: 3, chapters: 4, vts: 2, vts_title: 1 },
            ]
        );
    }

    #[test]
    fn trusts_table_size_over_declared_count() {
        let bytes = vmg(5, &[raw_entry(1, 1, 1, 1), raw_entry(1, 1, 1, 2)]);
        let mut c = ByteCursor::from_slice(&bytes, 0);
        assert_eq!(read_title_entries(&mut c).unwrap().len(), 2);
    }
}
