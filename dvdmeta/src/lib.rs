//! This crate reads the metadata of DVD rips and DVB recordings: the title,
//! chapter and stream layout of a DVD-Video disc, the event information
//! broadcast alongside a DVB recording, and the `*.idx` half of a VobSub
//! subtitle track.
//!
//! ## Example code
//!
//! ```
//! let dvd = dvdmeta::read_dvd_structure("../fixtures/dvd").unwrap();
//! for title in &dvd.titles {
//!     println!("Title {}: {}ms, {} chapters", title.number, title.total_ms,
//!              title.chapters_ms.len());
//!     if let Some(set) = dvd.title_set(title) {
//!         println!("  {} {}", set.format, set.aspect_ratio);
//!     }
//!     for audio in title.audio.iter().filter(|a| a.stream_id.is_some()) {
//!         println!("  audio {:?} {:?}", audio.language, audio.mode);
//!     }
//! }
//!
//! let longest = dvd.longest_title().unwrap();
//! let mut idx = dvdmeta::VobsubIndex::read("../fixtures/example.idx").unwrap();
//! idx.set_palette_from_ycbcr(&longest.palette);
//! ```
//!
//! ## Limitations
//!
//! We only read the first program chain of each title, and we ignore
//! menus, multi-angle cell layouts and parental management entirely.  DVB
//! event information is read from stand-alone `*.eit` files holding a
//! single event; we don't demultiplex transport streams.
//!
//! ## Background & References
//!
//! DVD-Video navigation data lives in the `*.IFO` files of the `VIDEO_TS`
//! directory, with identical `*.BUP` backups.  Event information is defined
//! by ETSI EN 300 468, which also defines the character tables used by its
//! text strings and the Modified Julian Date format used by its start
//! times.
//!
//! Useful references include:
//!
//! - [DVD-Video information](http://dvd.sourceforge.net/dvdinfo/)
//! - [ETSI EN 300 468](https://www.etsi.org/deliver/etsi_en/300400_300499/300468/)
//! - [DVD subtitles](http://sam.zoy.org/writings/dvd/subtitles/)

#![warn(missing_docs)]

mod cursor;
pub mod dvb;
mod errors;
pub mod idx;
pub mod ifo;
pub mod palette;
mod probe;
mod util;

pub use self::cursor::{decode_bcd, ByteCursor, DVD_BLOCK_SIZE};
pub use self::dvb::{read_event_information, Descriptor, EventInformation, RunningStatus};
pub use self::errors::{IdxError, IfoError, ReadError, ReadResult, SiError};
pub use self::idx::{Setting, Timestamp, VobsubIndex};
pub use self::ifo::{
    read_dvd_structure, AspectRatio, AudioMode, AudioType, DvdAudio, DvdStructure, DvdSubtitle,
    DvdTitle, DvdTitleSet, Resolution, SubtitleType, VideoFormat,
};
pub use self::palette::Palette;
pub use self::probe::{is_idx_file, is_ifo_file};
