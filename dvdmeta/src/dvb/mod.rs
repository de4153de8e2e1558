//! Read DVB-SI event information, as saved alongside DVB recordings in
//! `*.eit` files.
//!
//! An event is one entry of an Event Information Table (see ETSI EN 300
//! 468, section 5.2.4): an event ID, a start time and duration, and a loop
//! of descriptors carrying the title, description, genre and stream
//! information.
//!
//! ```no_run
//! let event = dvdmeta::EventInformation::open("recording.eit").unwrap();
//! if let Some(title) = event.proposed_title() {
//!     println!("{}", title);
//! }
//! ```

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;
use std::result;

use crate::cursor::ByteCursor;
use crate::errors::{ReadError, SiError};

mod descriptor;
mod text;
mod time;

pub use self::descriptor::{
    Component, Content, Descriptor, ExtendedEvent, ExtendedEventItem, ShortEvent,
};
pub use self::text::decode_text;
pub use self::time::mjd_to_ymd;

/// Result type for reading event information.
pub type Result<T, E = SiError> = result::Result<T, E>;

/// Whether an event is currently being broadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunningStatus {
    /// Not specified.
    Undefined,
    /// Not running.
    NotRunning,
    /// Starts in a few seconds, e.g. for a video recorder.
    StartsInAFewSeconds,
    /// Pausing.
    Pausing,
    /// Running.
    Running,
    /// The service is off the air.
    ServiceOffAir,
    /// Reserved value 6.
    Reserved6,
    /// Reserved value 7.
    Reserved7,
}

impl RunningStatus {
    /// Decode the 3-bit running status.  Higher bits are ignored.
    pub fn from_bits(bits: u8) -> RunningStatus {
        match bits & 0b111 {
            0 => RunningStatus::Undefined,
            1 => RunningStatus::NotRunning,
            2 => RunningStatus::StartsInAFewSeconds,
            3 => RunningStatus::Pausing,
            4 => RunningStatus::Running,
            5 => RunningStatus::ServiceOffAir,
            6 => RunningStatus::Reserved6,
            _ => RunningStatus::Reserved7,
        }
    }
}

impl fmt::Display for RunningStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            RunningStatus::Undefined => "undefined",
            RunningStatus::NotRunning => "not running",
            RunningStatus::StartsInAFewSeconds => "starts in a few seconds",
            RunningStatus::Pausing => "pausing",
            RunningStatus::Running => "running",
            RunningStatus::ServiceOffAir => "service off-air",
            RunningStatus::Reserved6 | RunningStatus::Reserved7 => "reserved",
        };
        f.write_str(s)
    }
}

/// A single broadcast event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventInformation {
    /// The event ID, unique within its service.
    pub event_id: u16,
    /// When the event starts.
    pub start_time: DateTime<Utc>,
    /// How long it lasts, in seconds.
    pub duration_secs: u32,
    /// Whether the event is being broadcast.
    pub running_status: RunningStatus,
    /// Whether any stream of the event is scrambled.
    pub free_ca_mode: bool,
    /// The event's descriptors, in stream order.
    pub descriptors: Vec<Descriptor>,
}

impl EventInformation {
    /// Read event information from an `*.eit` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<EventInformation> {
        let path = path.as_ref();
        let mut c = ByteCursor::open(path).map_err(|err| match err {
            ReadError::Io { source, .. } => SiError::Io {
                path: path.to_owned(),
                source,
            },
            other => SiError::Read(other),
        })?;
        read_event_information(&mut c)
    }

    /// The short event descriptors.
    pub fn short_events(&self) -> impl Iterator<Item = &ShortEvent> {
        self.descriptors.iter().filter_map(|d| match d {
            Descriptor::ShortEvent(e) => Some(e),
            _ => None,
        })
    }

    /// The text of all extended event descriptors, joined in order.
    /// Broadcasters split long descriptions at arbitrary points, so we
    /// don't add separators.
    pub fn extended_text(&self) -> String {
        self.descriptors
            .iter()
            .filter_map(|d| match d {
                Descriptor::ExtendedEvent(e) => Some(e.text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Suggest a title for a recording of this event: the event name,
    /// followed by the production year if the extended description
    /// mentions one.
    pub fn proposed_title(&self) -> Option<String> {
        lazy_static! {
            static ref YEAR: Regex = Regex::new(r"\b((?:19|20)\d{2})\b").unwrap();
        }

        let name = self
            .short_events()
            .map(|e| e.event_name.trim())
            .find(|name| !name.is_empty())?;
        let text = self.extended_text();
        match YEAR.captures(&text).and_then(|cap| cap.get(1)) {
            Some(year) => Some(format!("{} ({})", name, year.as_str())),
            None => Some(name.to_owned()),
        }
    }
}

/// Read one event from `c`.
pub fn read_event_information<R: Read + Seek>(
    c: &mut ByteCursor<R>,
) -> Result<EventInformation> {
    let event_id = c.read_u16()?;
    let start_time = time::read_start_time(c)?;
    let duration_secs = time::read_duration(c)?;

    let status = c.read_u16()?;
    let running_status = RunningStatus::from_bits((status >> 13) as u8);
    let free_ca_mode = status & 0x1000 != 0;
    let loop_len = u64::from(status & 0x0fff);
    debug!(
        "event {:#06x} at {}, {}s, {}, {} descriptor bytes",
        event_id, start_time, duration_secs, running_status, loop_len
    );

    let mut descriptors = vec![];
    let mut remaining = loop_len;
    while remaining > 0 {
        let (descriptor, used) = descriptor::read_descriptor(c, remaining)?;
        descriptors.push(descriptor);
        remaining -= used;
    }

    Ok(EventInformation {
        event_id,
        start_time,
        duration_secs,
        running_status,
        free_ca_mode,
        descriptors,
    })
}
