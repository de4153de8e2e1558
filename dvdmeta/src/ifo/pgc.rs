//! Program chains (PGCs), which describe how a title is played back.
//!
//! A program chain is a list of cells (the smallest playable units), grouped
//! into programs.  Each program normally corresponds to a chapter, so we
//! rebuild chapter times by adding up the playback times of each program's
//! cells.

use log::{debug, trace};
use std::io::{Read, Seek};

use super::types::{AspectRatio, DvdTitle, DvdTitleSet};
use super::vts::{MAX_AUDIO_STREAMS, MAX_SUBTITLE_STREAMS};
use crate::cursor::ByteCursor;
use crate::errors::ReadResult;

const PROGRAM_COUNT: u64 = 0x02;
const AUDIO_CONTROL: u64 = 0x0c;
const SUBTITLE_CONTROL: u64 = 0x1c;
const PALETTE: u64 = 0xa4;
const PROGRAM_MAP_POINTER: u64 = 0xe6;

/// Size of a cell playback information record.
const CELL_PLAYBACK_LEN: u64 = 0x18;

/// Offset of the playback time within a cell playback record.
const CELL_PLAYBACK_TIME: u64 = 4;

/// Subtitle stream IDs start here.
const SUBTITLE_BASE_STREAM_ID: u8 = 0x20;

/// Fill in `title` from the program chain at `pgc`.
pub(crate) fn read_pgc<R: Read + Seek>(
    c: &mut ByteCursor<R>,
    pgc: u64,
    title: &mut DvdTitle,
    set: &DvdTitleSet,
) -> ReadResult<()> {
    c.seek(pgc + PROGRAM_COUNT)?;
    let programs = c.read_u8()?;
    let cells = c.read_u8()?;
    title.total_ms = c.read_bcd_time_ms()?;
    trace!(
        "title {}: {} programs, {} cells, {}ms",
        title.number, programs, cells, title.total_ms
    );

    c.seek(pgc + AUDIO_CONTROL)?;
    title.audio = set.audio.clone();
    for i in 0..MAX_AUDIO_STREAMS {
        let control = c.read_u8()?;
        let _reserved = c.read_u8()?;
        if let Some(audio) = title.audio.get_mut(i) {
            if control & 0x80 != 0 {
                let sub_index = match control & 0b111 {
                    0 => i as u8,
                    n => n,
                };
                audio.stream_id = audio
                    .mode
                    .and_then(|mode| mode.base_stream_id())
                    .map(|base| base + sub_index);
            }
        }
    }

    c.seek(pgc + SUBTITLE_CONTROL)?;
    title.subtitles = set.subtitles.clone();
    let wide = set.aspect_ratio == AspectRatio::Wide;
    for i in 0..MAX_SUBTITLE_STREAMS {
        let control = c.read_bytes(4)?;
        let sub = match title.subtitles.get_mut(i) {
            Some(sub) => sub,
            None => continue,
        };
        if control[0] & 0x80 == 0 {
            continue;
        }
        let id = |b: u8| Some((b & 0x1f) + SUBTITLE_BASE_STREAM_ID);
        sub.stream_id_standard = id(control[0]);
        if wide {
            sub.stream_id_wide = id(control[1]);
            if set.letterbox {
                sub.stream_id_letterbox = id(control[2]);
            }
            if set.pan_scan {
                sub.stream_id_pan_scan = id(control[3]);
            }
        }
    }

    c.seek(pgc + PALETTE)?;
    for entry in title.palette.iter_mut() {
        *entry = c.read_u32()?;
    }

    c.seek(pgc + PROGRAM_MAP_POINTER)?;
    let program_map = pgc + u64::from(c.read_u16()?);
    let cell_playback = pgc + u64::from(c.read_u16()?);
    if programs == 0 {
        debug!("title {} has no programs", title.number);
        return Ok(());
    }

    c.seek(program_map)?;
    let starts = c.read_bytes(usize::from(programs))?;
    read_chapters(c, title, &starts, cells, cell_playback)
}

/// Add up the cell times of each program.  `starts` holds the first cell
/// of each program.
fn read_chapters<R: Read + Seek>(
    c: &mut ByteCursor<R>,
    title: &mut DvdTitle,
    starts: &[u8],
    cells: u8,
    cell_playback: u64,
) -> ReadResult<()> {
    let declared = usize::from(title.chapter_count);
    if declared > starts.len() {
        debug!(
            "title {} declares {} chapters but has only {} programs",
            title.number,
            declared,
            starts.len()
        );
    }

    let mut cumulative = 0;
    for (i, &first) in starts.iter().enumerate() {
        let last = match starts.get(i + 1) {
            Some(&next) => next.saturating_sub(1),
            None => cells,
        };

        let mut ms = 0;
        for cell in first.max(1)..=last {
            c.seek(cell_playback + u64::from(cell - 1) * CELL_PLAYBACK_LEN + CELL_PLAYBACK_TIME)?;
            ms += c.read_bcd_time_ms()?;
        }

        if i < declared {
            if ms == 0 && last < cells {
                debug!("title {}: dropping empty chapter {}", title.number, i + 1);
                continue;
            }
            cumulative += ms;
            title.chapters_ms.push(cumulative);
        } else {
            cumulative += ms;
            title.annex_ms.push(cumulative);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ifo::types::{AudioMode, DvdAudio, DvdSubtitle, VideoFormat};

    const PROGRAM_MAP: usize = 0xec;
    const CELLS: usize = 0xf0;

    /// Build a program chain with the given program start cells and cell
    /// times (BCD minutes at 25 fps).
    fn pgc(starts: &[u8], cell_minutes: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; CELLS + 0x18 * cell_minutes.len()];
        bytes[0x02] = starts.len() as u8;
        bytes[0x03] = cell_minutes.len() as u8;
        bytes[0x04..0x08].copy_from_slice(&[0x01, 0x00, 0x00, 0x40]);
        bytes[0xe6..0xe8].copy_from_slice(&(PROGRAM_MAP as u16).to_be_bytes());
        bytes[0xe8..0xea].copy_from_slice(&(CELLS as u16).to_be_bytes());
        bytes[PROGRAM_MAP..PROGRAM_MAP + starts.len()].copy_from_slice(starts);
        for (i, &m) in cell_minutes.iter().enumerate() {
            let at = CELLS + 0x18 * i + 4;
            bytes[at..at + 4].copy_from_slice(&[0x00, m, 0x00, 0x40]);
        }
        bytes
    }

    fn title_set(aspect_ratio: AspectRatio) -> DvdTitleSet {
        DvdTitleSet {
            vts: 1,
            format: VideoFormat::Pal,
            aspect_ratio,
            resolution_code: 0,
            letterbox: true,
            pan_scan: false,
            audio: vec![
                DvdAudio { mode: Some(AudioMode::Ac3), channels: 6, ..DvdAudio::default() },
                DvdAudio { mode: Some(AudioMode::Lpcm), channels: 2, ..DvdAudio::default() },
                DvdAudio { mode: Some(AudioMode::Dts), channels: 6, ..DvdAudio::default() },
            ],
            subtitles: vec![DvdSubtitle::default(), DvdSubtitle::default()],
        }
    }

    fn read(bytes: &[u8], chapters: u16, set: &DvdTitleSet) -> DvdTitle {
        let mut title = DvdTitle::new(1, 1, chapters, 1, 1);
        read_pgc(&mut ByteCursor::from_slice(bytes, 0), 0, &mut title, set).unwrap();
        title
    }

    #[test]
    fn chapters_are_cumulative() {
        let bytes = pgc(&[1, 2, 4], &[0x10, 0x05, 0x05, 0x01]);
        let title = read(&bytes, 3, &title_set(AspectRatio::Standard));
        assert_eq!(title.total_ms, 3_600_000);
        assert_eq!(title.chapters_ms, vec![600_000, 1_200_000, 1_260_000]);
        assert!(title.annex_ms.is_empty());
    }

    #[test]
    fn empty_chapters_before_the_last_cell_are_dropped() {
        let bytes = pgc(&[1, 2, 3], &[0x10, 0x00, 0x05]);
        let title = read(&bytes, 3, &title_set(AspectRatio::Standard));
        assert_eq!(title.chapters_ms, vec![600_000, 900_000]);
    }

    #[test]
    fn empty_final_chapter_is_kept() {
        let bytes = pgc(&[1, 2], &[0x10, 0x00]);
        let title = read(&bytes, 2, &title_set(AspectRatio::Standard));
        assert_eq!(title.chapters_ms, vec![600_000, 600_000]);
    }

    #[test]
    fn extra_programs_become_annex_entries() {
        let bytes = pgc(&[1, 2, 3], &[0x10, 0x20, 0x01]);
        let title = read(&bytes, 2, &title_set(AspectRatio::Standard));
        assert_eq!(title.chapters_ms, vec![600_000, 1_800_000]);
        assert_eq!(title.annex_ms, vec![1_860_000]);
    }

    #[test]
    fn resolves_audio_stream_ids() {
        let mut bytes = pgc(&[1], &[0x01]);
        // Stream 0 enabled, stream 1 enabled with sub-index 3, stream 2
        // enabled with a zero sub-index, and a control for a stream the
        // title set doesn't have.
        bytes[0x0c..0x14].copy_from_slice(&[0x80, 0, 0x83, 0, 0x80, 0, 0x80, 0]);
        let title = read(&bytes, 1, &title_set(AspectRatio::Standard));
        let ids: Vec<_> = title.audio.iter().map(|a| a.stream_id).collect();
        assert_eq!(ids, vec![Some(0x80), Some(0xa3), Some(0x8a)]);
    }

    #[test]
    fn disabled_audio_has_no_stream_id() {
        let mut bytes = pgc(&[1], &[0x01]);
        bytes[0x0c..0x10].copy_from_slice(&[0x00, 0, 0x01, 0]);
        let title = read(&bytes, 1, &title_set(AspectRatio::Standard));
        assert!(title.audio.iter().all(|a| a.stream_id.is_none()));
        assert_eq!(title.audio[1].mode, Some(AudioMode::Lpcm));
    }

    #[test]
    fn resolves_subtitle_variants() {
        let mut bytes = pgc(&[1], &[0x01]);
        bytes[0x1c..0x24].copy_from_slice(&[0x80, 0x01, 0x02, 0x03, 0x05, 0x06, 0x07, 0x08]);

        let standard = read(&bytes, 1, &title_set(AspectRatio::Standard));
        assert_eq!(standard.subtitles[0].stream_id_standard, Some(0x20));
        assert_eq!(standard.subtitles[0].stream_id_wide, None);
        assert_eq!(standard.subtitles[1], DvdSubtitle::default());

        let set = title_set(AspectRatio::Wide);
        let wide = read(&bytes, 1, &set);
        let sub = &wide.subtitles[0];
        assert_eq!(sub.stream_id_standard, Some(0x20));
        assert_eq!(sub.stream_id_wide, Some(0x21));
        assert_eq!(sub.stream_id_letterbox, Some(0x22));
        // Pan & scan isn't permitted by this title set.
        assert_eq!(sub.stream_id_pan_scan, None);
        assert_eq!(sub.stream_id(set.aspect_ratio), Some(0x21));
    }

    #[test]
    fn reads_palette() {
        let mut bytes = pgc(&[1], &[0x01]);
        for i in 0..16 {
            let at = 0xa4 + 4 * i;
            bytes[at..at + 4].copy_from_slice(&(0x0010_8080 + i as u32).to_be_bytes());
        }
        let title = read(&bytes, 1, &title_set(AspectRatio::Standard));
        assert_eq!(title.palette[0], 0x0010_8080);
        assert_eq!(title.palette[15], 0x0010_808f);
    }

    #[test]
    fn truncated_cell_table_is_an_error() {
        let mut bytes = pgc(&[1, 2], &[0x01, 0x01]);
        bytes.truncate(CELLS + 0x18 + 2);
        let mut title = DvdTitle::new(1, 1, 2, 1, 1);
        let set = title_set(AspectRatio::Standard);
        let result = read_pgc(&mut ByteCursor::from_slice(&bytes, 0), 0, &mut title, &set);
        assert!(result.is_err());
    }
}
