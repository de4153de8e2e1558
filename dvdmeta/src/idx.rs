//! Read and write VobSub `*.idx` files.
//!
//! An `*.idx` file is a text file holding the settings of a VobSub subtitle
//! stream (frame size, palette, language) and a table mapping each
//! subtitle's start time to its position in the matching `*.sub` file.
//! We keep setting values as the strings found in the file, so reading and
//! writing a file doesn't change anything we don't understand.

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::result;
use std::str::FromStr;

use crate::errors::IdxError;
use crate::palette::{format_palette, palette_from_ycbcr, parse_palette, Palette};

/// Result type for reading and writing `*.idx` files.
pub type Result<T, E = IdxError> = result::Result<T, E>;

/// The first line of every `*.idx` file.
pub const MAGIC_LINE: &str = "# VobSub index file, v7 (do not modify this line!)";

/// A known `*.idx` setting.  Settings are written in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Setting {
    /// Delay applied to every subtitle.
    Delay,
    /// Frame size, such as `720x576`.
    Size,
    /// Origin of the subtitles.
    Org,
    /// Horizontal and vertical scaling.
    Scale,
    /// Opacity.
    Alpha,
    /// Anti-aliasing.
    Smooth,
    /// Fade in and fade out times.
    Fade,
    /// Alignment.
    Align,
    /// Time offset.
    TimeOffset,
    /// Whether only forced subtitles are shown.
    ForcedSubs,
    /// The 16-color palette.
    Palette,
    /// Overrides for the four colors of each subtitle.
    CustomColors,
    /// The index of the default language.
    LangIdx,
    /// Language and stream index, such as `en, index: 0`.
    Id,
}

impl Setting {
    /// Every setting, in the order we write them.
    pub const ALL: [Setting; 14] = [
        Setting::Delay,
        Setting::Size,
        Setting::Org,
        Setting::Scale,
        Setting::Alpha,
        Setting::Smooth,
        Setting::Fade,
        Setting::Align,
        Setting::TimeOffset,
        Setting::ForcedSubs,
        Setting::Palette,
        Setting::CustomColors,
        Setting::LangIdx,
        Setting::Id,
    ];

    /// The key used for this setting in `*.idx` files.
    pub fn key(self) -> &'static str {
        match self {
            Setting::Delay => "delay",
            Setting::Size => "size",
            Setting::Org => "org",
            Setting::Scale => "scale",
            Setting::Alpha => "alpha",
            Setting::Smooth => "smooth",
            Setting::Fade => "fadein/out",
            Setting::Align => "align",
            Setting::TimeOffset => "time offset",
            Setting::ForcedSubs => "forced subs",
            Setting::Palette => "palette",
            Setting::CustomColors => "custom colors",
            Setting::LangIdx => "langidx",
            Setting::Id => "id",
        }
    }

    /// Look up a setting by key, ignoring case.
    pub fn from_key(key: &str) -> Option<Setting> {
        Setting::ALL
            .iter()
            .cloned()
            .find(|s| s.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A subtitle start time in `hh:mm:ss:mmm` format.  Since every field has
/// a fixed width, comparing the strings gives chronological order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(String);

impl Timestamp {
    /// The largest time we can represent.
    const MAX_MILLIS: u64 = ((99 * 60 + 59) * 60 + 59) * 1000 + 999;

    /// Construct a timestamp from milliseconds.  Times of 100 hours or
    /// more are clamped to `99:59:59:999`.
    pub fn from_millis(ms: u64) -> Timestamp {
        let ms = ms.min(Timestamp::MAX_MILLIS);
        Timestamp(format!(
            "{:02}:{:02}:{:02}:{:03}",
            ms / 3_600_000,
            ms / 60_000 % 60,
            ms / 1000 % 60,
            ms % 1000
        ))
    }

    /// The time in milliseconds.
    pub fn as_millis(&self) -> u64 {
        let fields: Vec<u64> = self
            .0
            .split(':')
            .map(|f| f.parse().unwrap_or(0))
            .collect();
        match fields[..] {
            [h, m, s, ms] => ((h * 60 + m) * 60 + s) * 1000 + ms,
            _ => 0,
        }
    }

    /// The timestamp as written in the file.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Timestamp {
    type Err = ();

    fn from_str(s: &str) -> result::Result<Timestamp, ()> {
        lazy_static! {
            static ref TIMESTAMP: Regex =
                Regex::new(r"^[0-9]{2}:[0-5][0-9]:[0-5][0-9]:[0-9]{3}$").unwrap();
        }
        if TIMESTAMP.is_match(s) {
            Ok(Timestamp(s.to_owned()))
        } else {
            Err(())
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The contents of an `*.idx` file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VobsubIndex {
    settings: BTreeMap<Setting, String>,
    timestamps: BTreeMap<Timestamp, String>,
}

impl VobsubIndex {
    /// Create an empty index.
    pub fn new() -> VobsubIndex {
        VobsubIndex::default()
    }

    /// Read an `*.idx` file.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<VobsubIndex> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| IdxError::Io {
            path: path.to_owned(),
            source,
        })?;
        text.parse()
    }

    /// Write an `*.idx` file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string()).map_err(|source| IdxError::Io {
            path: path.to_owned(),
            source,
        })
    }

    /// Get the raw value of a setting.
    pub fn setting(&self, setting: Setting) -> Option<&str> {
        self.settings.get(&setting).map(|v| v.as_str())
    }

    /// Set the raw value of a setting.
    pub fn set_setting<S: Into<String>>(&mut self, setting: Setting, value: S) {
        self.settings.insert(setting, value.into());
    }

    /// Remove a setting, returning its old value.
    pub fn remove_setting(&mut self, setting: Setting) -> Option<String> {
        self.settings.remove(&setting)
    }

    /// Iterate over `(timestamp, filepos)` pairs in chronological order.
    pub fn timestamps(&self) -> impl Iterator<Item = (&Timestamp, &str)> {
        self.timestamps.iter().map(|(ts, pos)| (ts, pos.as_str()))
    }

    /// Add a timestamp, unless it would come at or before the last one we
    /// have.  Returns true if it was added.
    pub fn push_timestamp<S: Into<String>>(&mut self, timestamp: Timestamp, filepos: S) -> bool {
        if let Some((last, _)) = self.timestamps.iter().next_back() {
            if &timestamp <= last {
                debug!("dropping out-of-order timestamp {} (after {})", timestamp, last);
                return false;
            }
        }
        self.timestamps.insert(timestamp, filepos.into());
        true
    }

    /// Parse the palette, if there is one.
    pub fn palette(&self) -> Result<Option<Palette>> {
        self.setting(Setting::Palette).map(parse_palette).transpose()
    }

    /// Replace the palette.
    pub fn set_palette(&mut self, palette: &Palette) {
        self.set_setting(Setting::Palette, format_palette(palette));
    }

    /// Replace the palette with one taken from a DVD program chain, which
    /// stores colors as `0x00YYCrCb`.
    pub fn set_palette_from_ycbcr(&mut self, entries: &[u32; 16]) {
        self.set_palette(&palette_from_ycbcr(entries));
    }
}

impl FromStr for VobsubIndex {
    type Err = IdxError;

    fn from_str(text: &str) -> Result<VobsubIndex> {
        lazy_static! {
            static ref KEY_VALUE: Regex = Regex::new("^([A-Za-z/ ]+):[ \t]*(.*)$").unwrap();
            static ref TIMESTAMP_VALUE: Regex =
                Regex::new("^([^,]*), filepos:[ \t]*([0-9A-Fa-f]+)$").unwrap();
        }

        let mut lines = text.lines().map(|l| l.trim_end());
        let first_line = lines.next().unwrap_or("");
        if first_line != MAGIC_LINE {
            return Err(IdxError::NotAVobsubFile {
                first_line: first_line.to_owned(),
            });
        }

        let mut index = VobsubIndex::new();
        for (i, line) in lines.enumerate() {
            // We've already consumed line 1.
            let line_no = i + 2;
            if line.is_empty() || line.starts_with('#') {
                trace!("skipping line {}: {:?}", line_no, line);
                continue;
            }
            let cap = KEY_VALUE.captures(line).ok_or_else(|| IdxError::MalformedLine {
                line: line_no,
                text: line.to_owned(),
            })?;
            let (key, value) = (&cap[1], &cap[2]);

            if key.eq_ignore_ascii_case("timestamp") {
                let malformed = || IdxError::MalformedTimestamp {
                    line: line_no,
                    value: value.to_owned(),
                };
                let cap = TIMESTAMP_VALUE.captures(value).ok_or_else(malformed)?;
                let timestamp = cap[1].parse::<Timestamp>().map_err(|_| malformed())?;
                index.push_timestamp(timestamp, &cap[2]);
            } else {
                let setting = Setting::from_key(key).ok_or_else(|| IdxError::IllegalSetting {
                    line: line_no,
                    key: key.to_owned(),
                })?;
                index.set_setting(setting, value);
            }
        }
        Ok(index)
    }
}

/// Formats the index as the contents of an `*.idx` file.
impl fmt::Display for VobsubIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", MAGIC_LINE)?;
        writeln!(f, "# Settings")?;
        writeln!(f)?;
        for (setting, value) in &self.settings {
            if *setting == Setting::Id {
                writeln!(f)?;
            }
            writeln!(f, "{}: {}", setting, value)?;
        }
        for (timestamp, filepos) in &self.timestamps {
            writeln!(f, "timestamp: {}, filepos: {}", timestamp, filepos)?;
        }
        Ok(())
    }
}
