//! Video Title Set information (`VTS_nn_0.IFO`): the attributes shared by
//! a group of titles, and where each title's program chain lives.

use log::{debug, trace};
use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::path::Path;

use super::types::{
    AspectRatio, AudioMode, AudioType, DvdAudio, DvdSubtitle, DvdTitleSet, SubtitleType,
    VideoFormat,
};
use super::vmg::TitleEntry;
use super::ReadResultExt;
use crate::cursor::ByteCursor;
use crate::errors::{IfoError, ReadResult};

/// The identifier at the start of `VTS_nn_0.IFO`.
pub(crate) const VTS_MAGIC: &str = "DVDVIDEO-VTS";

/// Sector of the part-of-title search pointer table, followed by the
/// sector of the program chain information table.
const PTT_TABLE_POINTER: u64 = 0xc8;

const VIDEO_ATTRIBUTES: u64 = 0x200;
const AUDIO_COUNT: u64 = 0x202;
const AUDIO_ATTRIBUTES: u64 = 0x204;
const AUDIO_ATTRIBUTES_LEN: u64 = 8;
const SUBTITLE_COUNT: u64 = 0x254;
const SUBTITLE_ATTRIBUTES: u64 = 0x256;
const SUBTITLE_ATTRIBUTES_LEN: u64 = 6;

/// The most audio streams a title set may have.
pub(crate) const MAX_AUDIO_STREAMS: usize = 8;

/// The most subtitle streams a title set may have.
pub(crate) const MAX_SUBTITLE_STREAMS: usize = 32;

/// Read the video, audio and subtitle attributes of a title set.
pub(crate) fn read_title_set<R: Read + Seek>(
    c: &mut ByteCursor<R>,
    vts: u8,
) -> ReadResult<DvdTitleSet> {
    c.seek(VIDEO_ATTRIBUTES)?;
    let flags = c.read_u8()?;
    let resolution_flags = c.read_u8()?;

    let format = match (flags >> 4) & 0b11 {
        0 => VideoFormat::Ntsc,
        1 => VideoFormat::Pal,
        other => {
            debug!("VTS {}: reserved video format {}, assuming NTSC", vts, other);
            VideoFormat::Ntsc
        }
    };
    let aspect_ratio = match (flags >> 2) & 0b11 {
        3 => AspectRatio::Wide,
        _ => AspectRatio::Standard,
    };

    c.seek(AUDIO_COUNT)?;
    let audio_count = usize::from(c.read_u16()?).min(MAX_AUDIO_STREAMS);
    let mut audio = Vec::with_capacity(audio_count);
    for i in 0..audio_count {
        c.seek(AUDIO_ATTRIBUTES + i as u64 * AUDIO_ATTRIBUTES_LEN)?;
        audio.push(read_audio_attributes(c)?);
    }

    c.seek(SUBTITLE_COUNT)?;
    let subtitle_count = usize::from(c.read_u16()?).min(MAX_SUBTITLE_STREAMS);
    let mut subtitles = Vec::with_capacity(subtitle_count);
    for i in 0..subtitle_count {
        c.seek(SUBTITLE_ATTRIBUTES + i as u64 * SUBTITLE_ATTRIBUTES_LEN)?;
        subtitles.push(read_subtitle_attributes(c)?);
    }

    Ok(DvdTitleSet {
        vts,
        format,
        aspect_ratio,
        resolution_code: (resolution_flags >> 3) & 0b111,
        // These bits forbid rather than permit.
        pan_scan: flags & 0b10 == 0,
        letterbox: flags & 0b01 == 0,
        audio,
        subtitles,
    })
}

/// Read one 8-byte audio attribute block.
fn read_audio_attributes<R: Read + Seek>(c: &mut ByteCursor<R>) -> ReadResult<DvdAudio> {
    let coding = c.read_u8()?;
    let channels = c.read_u8()?;
    let language = c.read_ascii_fixed(2)?;
    let _language_extension = c.read_u8()?;
    let code_extension = c.read_u8()?;

    let mode = AudioMode::from_code(coding >> 5);
    if mode.is_none() {
        debug!("unknown audio coding mode {}", coding >> 5);
    }
    Ok(DvdAudio {
        mode,
        channels: (channels & 0b111) + 1,
        audio_type: AudioType::from_code(code_extension),
        language,
        stream_id: None,
    })
}

/// Read one 6-byte subtitle attribute block.
fn read_subtitle_attributes<R: Read + Seek>(c: &mut ByteCursor<R>) -> ReadResult<DvdSubtitle> {
    c.skip(2)?;
    let language = c.read_ascii_fixed(2)?;
    let _language_extension = c.read_u8()?;
    let code_extension = c.read_u8()?;

    // Unknown codes are harmless: they only affect how we describe the
    // stream.
    let subtitle_type = SubtitleType::from_code(code_extension);
    if subtitle_type.is_none() {
        debug!("unknown subtitle type {}", code_extension);
    }
    Ok(DvdSubtitle {
        subtitle_type,
        language,
        ..DvdSubtitle::default()
    })
}

/// Find the byte offset of the program chain for each title in `titles`,
/// keyed by in-VTS title number.
pub(crate) fn pgc_offsets<R: Read + Seek>(
    c: &mut ByteCursor<R>,
    path: &Path,
    vts: u8,
    titles: &[TitleEntry],
) -> Result<BTreeMap<u8, u64>, IfoError> {
    c.seek(PTT_TABLE_POINTER).in_file(path)?;
    let ptt_table = c.read_block_offset().in_file(path)?;
    let pgc_table = c.read_block_offset().in_file(path)?;

    c.seek(ptt_table).in_file(path)?;
    let ptt_titles = c.read_u16().in_file(path)?;
    c.seek(pgc_table).in_file(path)?;
    let pgc_count = c.read_u16().in_file(path)?;
    trace!("VTS {}: {} titles, {} program chains", vts, ptt_titles, pgc_count);

    let mut offsets = BTreeMap::new();
    for entry in titles {
        let title = entry.vts_title;
        if offsets.contains_key(&title) {
            return Err(IfoError::DuplicateTitle { vts, title });
        }
        if title == 0 || u16::from(title) > ptt_titles {
            return Err(IfoError::MissingPgc { vts, title, pgc: 0 });
        }

        // The first part of the title tells us which program chain it
        // starts in.
        c.seek(ptt_table + 8 + 4 * u64::from(title - 1)).in_file(path)?;
        let ptt_offset = u64::from(c.read_u32().in_file(path)?);
        c.seek(ptt_table + ptt_offset).in_file(path)?;
        let pgc = c.read_u16().in_file(path)?;
        if pgc == 0 || pgc > pgc_count {
            return Err(IfoError::MissingPgc { vts, title, pgc });
        }

        c.seek(pgc_table + 8 + 8 * u64::from(pgc - 1) + 4).in_file(path)?;
        let pgc_offset = pgc_table + u64::from(c.read_u32().in_file(path)?);
        debug!("VTS {} title {}: program chain {} at {:#x}", vts, title, pgc, pgc_offset);
        offsets.insert(title, pgc_offset);
    }
    Ok(offsets)
}
