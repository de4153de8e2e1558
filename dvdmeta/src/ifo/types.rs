//! The records produced by reading a DVD's `*.IFO` files.

use std::collections::BTreeMap;
use std::fmt;

/// The television standard of a title set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoFormat {
    /// 525 lines, 29.97 frames per second.
    Ntsc,
    /// 625 lines, 25 frames per second.
    Pal,
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            VideoFormat::Ntsc => write!(f, "NTSC"),
            VideoFormat::Pal => write!(f, "PAL"),
        }
    }
}

/// The display aspect ratio of a title set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AspectRatio {
    /// 4:3.
    Standard,
    /// 16:9.
    Wide,
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AspectRatio::Standard => write!(f, "4/3"),
            AspectRatio::Wide => write!(f, "16/9"),
        }
    }
}

/// A frame size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// How an audio stream is coded.  This also determines which range of
/// private stream IDs the stream is multiplexed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioMode {
    /// Dolby AC-3.
    Ac3,
    /// MPEG-1 audio.
    Mpeg1,
    /// MPEG-2 audio with extension stream.
    Mpeg2,
    /// Linear PCM.
    Lpcm,
    /// Sony Dynamic Digital Sound.
    Sdds,
    /// DTS.
    Dts,
}

impl AudioMode {
    /// Decode the 3-bit coding mode from an audio attribute block.
    pub fn from_code(code: u8) -> Option<AudioMode> {
        match code {
            0 => Some(AudioMode::Ac3),
            2 => Some(AudioMode::Mpeg1),
            3 => Some(AudioMode::Mpeg2),
            4 => Some(AudioMode::Lpcm),
            5 => Some(AudioMode::Sdds),
            6 => Some(AudioMode::Dts),
            _ => None,
        }
    }

    /// The stream ID of the first stream in this mode.  SDDS has no
    /// assigned range.
    pub fn base_stream_id(self) -> Option<u8> {
        match self {
            AudioMode::Ac3 => Some(0x80),
            AudioMode::Mpeg1 | AudioMode::Mpeg2 => Some(0xc0),
            AudioMode::Lpcm => Some(0xa0),
            AudioMode::Sdds => None,
            AudioMode::Dts => Some(0x88),
        }
    }
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            AudioMode::Ac3 => "ac3",
            AudioMode::Mpeg1 => "mpeg1",
            AudioMode::Mpeg2 => "mpeg2",
            AudioMode::Lpcm => "lpcm",
            AudioMode::Sdds => "sdds",
            AudioMode::Dts => "dts",
        };
        write!(f, "{}", name)
    }
}

/// What an audio stream contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioType {
    /// Ordinary audio.
    Normal,
    /// Audio description for the visually impaired.
    VisuallyImpaired,
    /// Director's comments.
    DirectorsComments,
    /// Alternate director's comments.
    AlternateDirectorsComments,
}

impl AudioType {
    /// Decode an audio code extension.
    pub fn from_code(code: u8) -> Option<AudioType> {
        match code {
            1 => Some(AudioType::Normal),
            2 => Some(AudioType::VisuallyImpaired),
            3 => Some(AudioType::DirectorsComments),
            4 => Some(AudioType::AlternateDirectorsComments),
            _ => None,
        }
    }
}

/// What a subtitle stream contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SubtitleType {
    NotSpecified,
    Normal,
    Large,
    Children,
    NormalCaptions,
    LargeCaptions,
    ChildrensCaptions,
    /// Shown even when subtitles are turned off.
    Forced,
    DirectorsComments,
    LargeDirectorsComments,
    ChildrensDirectorsComments,
}

impl SubtitleType {
    /// Decode a subtitle code extension.  Reserved codes return `None`.
    pub fn from_code(code: u8) -> Option<SubtitleType> {
        match code {
            0 => Some(SubtitleType::NotSpecified),
            1 => Some(SubtitleType::Normal),
            2 => Some(SubtitleType::Large),
            3 => Some(SubtitleType::Children),
            5 => Some(SubtitleType::NormalCaptions),
            6 => Some(SubtitleType::LargeCaptions),
            7 => Some(SubtitleType::ChildrensCaptions),
            9 => Some(SubtitleType::Forced),
            13 => Some(SubtitleType::DirectorsComments),
            14 => Some(SubtitleType::LargeDirectorsComments),
            15 => Some(SubtitleType::ChildrensDirectorsComments),
            _ => None,
        }
    }
}

/// An audio stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DvdAudio {
    /// How the stream is coded, if we recognize it.
    pub mode: Option<AudioMode>,
    /// Number of channels.
    pub channels: u8,
    /// What the stream contains, if specified.
    pub audio_type: Option<AudioType>,
    /// Two-letter language code, if specified.
    pub language: Option<String>,
    /// The stream ID in the multiplexed program stream.  `None` if this
    /// stream isn't used by the title (and always `None` in the attribute
    /// records of a [`DvdTitleSet`]).
    pub stream_id: Option<u8>,
}

/// A subtitle stream.  A subtitle may be multiplexed as up to four
/// separate streams, one for each way of presenting the video.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DvdSubtitle {
    /// What the stream contains, if we recognize the code.
    pub subtitle_type: Option<SubtitleType>,
    /// Two-letter language code, if specified.
    pub language: Option<String>,
    /// Stream ID for 4:3 presentation.
    pub stream_id_standard: Option<u8>,
    /// Stream ID for 16:9 presentation.
    pub stream_id_wide: Option<u8>,
    /// Stream ID for letterboxed presentation.
    pub stream_id_letterbox: Option<u8>,
    /// Stream ID for pan & scan presentation.
    pub stream_id_pan_scan: Option<u8>,
}

impl DvdSubtitle {
    /// The stream to use when playing video with the given aspect ratio.
    pub fn stream_id(&self, aspect_ratio: AspectRatio) -> Option<u8> {
        match aspect_ratio {
            AspectRatio::Wide => self.stream_id_wide,
            AspectRatio::Standard => self.stream_id_standard,
        }
    }
}

/// Attributes shared by all the titles stored in one `VTS_nn_*` file set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DvdTitleSet {
    /// The title set number.
    pub vts: u8,
    /// NTSC or PAL.
    pub format: VideoFormat,
    /// 4:3 or 16:9.
    pub aspect_ratio: AspectRatio,
    /// The 3-bit resolution code, see [`DvdTitleSet::resolution`].
    pub resolution_code: u8,
    /// May a player letterbox this video?
    pub letterbox: bool,
    /// May a player pan & scan this video?
    pub pan_scan: bool,
    /// Up to 8 audio streams, without stream IDs.
    pub audio: Vec<DvdAudio>,
    /// Up to 32 subtitle streams, without stream IDs.
    pub subtitles: Vec<DvdSubtitle>,
}

impl DvdTitleSet {
    /// The frame size, or `None` if the resolution code is reserved.
    pub fn resolution(&self) -> Option<Resolution> {
        let (full, half) = match self.format {
            VideoFormat::Pal => (576, 288),
            VideoFormat::Ntsc => (480, 240),
        };
        let (width, height) = match self.resolution_code {
            0 => (720, full),
            1 => (704, full),
            2 => (352, full),
            3 => (352, half),
            _ => return None,
        };
        Some(Resolution { width, height })
    }
}

/// A title, as listed in `VIDEO_TS.IFO`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DvdTitle {
    /// The title number, starting at 1.
    pub number: u16,
    /// Playback time in milliseconds.
    pub total_ms: u64,
    /// The number of chapters declared for this title.
    pub chapter_count: u16,
    /// The number of camera angles.
    pub angle_count: u8,
    /// The cumulative end time of each chapter, in milliseconds.  Padding
    /// chapters with no playback time are omitted.
    pub chapters_ms: Vec<u64>,
    /// Cumulative end times of any programs found after the declared
    /// chapters.  These usually hold bonus material.
    pub annex_ms: Vec<u64>,
    /// The subtitle palette, as 16 `0x00YYCrCb` entries.
    pub palette: [u32; 16],
    /// The title set holding this title.
    pub vts: u8,
    /// The number of this title within its title set.
    pub vts_title: u8,
    /// The audio streams of the title set, with this title's stream IDs.
    pub audio: Vec<DvdAudio>,
    /// The subtitle streams of the title set, with this title's stream IDs.
    pub subtitles: Vec<DvdSubtitle>,
}

impl DvdTitle {
    /// Create a title with nothing but the information from the title table.
    pub fn new(number: u16, angle_count: u8, chapter_count: u16, vts: u8, vts_title: u8) -> DvdTitle {
        DvdTitle {
            number,
            total_ms: 0,
            chapter_count,
            angle_count,
            chapters_ms: vec![],
            annex_ms: vec![],
            palette: [0; 16],
            vts,
            vts_title,
            audio: vec![],
            subtitles: vec![],
        }
    }
}

/// Everything we know about a DVD's titles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DvdStructure {
    /// All titles, in the order of the disc's title table.
    pub titles: Vec<DvdTitle>,
    /// The title sets we could read, by VTS number.
    pub title_sets: BTreeMap<u8, DvdTitleSet>,
}

impl DvdStructure {
    /// The title set of `title`, or `None` if it could not be read.
    pub fn title_set(&self, title: &DvdTitle) -> Option<&DvdTitleSet> {
        self.title_sets.get(&title.vts)
    }

    /// Look up a title by its 1-based number.
    pub fn title(&self, number: u16) -> Option<&DvdTitle> {
        self.titles.iter().find(|t| t.number == number)
    }

    /// The longest title, which is usually the main feature.  Ties go to the
    /// earlier title.
    pub fn longest_title(&self) -> Option<&DvdTitle> {
        self.titles.iter().fold(None, |best: Option<&DvdTitle>, t| match best {
            Some(b) if b.total_ms >= t.total_ms => Some(b),
            _ => Some(t),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_set(format: VideoFormat, resolution_code: u8) -> DvdTitleSet {
        DvdTitleSet {
            vts: 1,
            format,
            aspect_ratio: AspectRatio::Standard,
            resolution_code,
            letterbox: true,
            pan_scan: true,
            audio: vec![],
            subtitles: vec![],
        }
    }

    #[test]
    fn resolution_depends_on_format() {
        let r = |format, code| title_set(format, code).resolution();
        assert_eq!(r(VideoFormat::Pal, 0), Some(Resolution { width: 720, height: 576 }));
        assert_eq!(r(VideoFormat::Ntsc, 1), Some(Resolution { width: 704, height: 480 }));
        assert_eq!(r(VideoFormat::Ntsc, 2), Some(Resolution { width: 352, height: 480 }));
        assert_eq!(r(VideoFormat::Pal, 3), Some(Resolution { width: 352, height: 288 }));
        assert_eq!(r(VideoFormat::Ntsc, 3), Some(Resolution { width: 352, height: 240 }));
        assert_eq!(r(VideoFormat::Pal, 4), None);
    }

    #[test]
    fn audio_modes_and_stream_ids() {
        assert_eq!(AudioMode::from_code(4), Some(AudioMode::Lpcm));
        assert_eq!(AudioMode::Lpcm.base_stream_id(), Some(0xa0));
        assert_eq!(AudioMode::from_code(0).and_then(AudioMode::base_stream_id), Some(0x80));
        assert_eq!(AudioMode::from_code(6).and_then(AudioMode::base_stream_id), Some(0x88));
        assert_eq!(AudioMode::Sdds.base_stream_id(), None);
        assert_eq!(AudioMode::from_code(1), None);
        assert_eq!(AudioMode::from_code(7), None);
    }

    #[test]
    fn subtitle_types_skip_reserved_codes() {
        let known: Vec<u8> = (0..=0xff).filter(|&c| SubtitleType::from_code(c).is_some()).collect();
        assert_eq!(known, vec![0, 1, 2, 3, 5, 6, 7, 9, 13, 14, 15]);
    }

    #[test]
    fn longest_title_prefers_first_on_ties() {
        let mut a = DvdTitle::new(1, 1, 1, 1, 1);
        let mut b = DvdTitle::new(2, 1, 1, 1, 2);
        let mut c = DvdTitle::new(3, 1, 1, 1, 3);
        a.total_ms = 10;
        b.total_ms = 30;
        c.total_ms = 30;
        let dvd = DvdStructure { titles: vec![a, b, c], title_sets: BTreeMap::new() };
        assert_eq!(dvd.longest_title().map(|t| t.number), Some(2));
        assert_eq!(DvdStructure::default().longest_title(), None);
    }

    #[test]
    fn subtitle_stream_follows_aspect() {
        let sub = DvdSubtitle {
            stream_id_standard: Some(0x20),
            stream_id_wide: Some(0x21),
            ..DvdSubtitle::default()
        };
        assert_eq!(sub.stream_id(AspectRatio::Standard), Some(0x20));
        assert_eq!(sub.stream_id(AspectRatio::Wide), Some(0x21));
    }
}
