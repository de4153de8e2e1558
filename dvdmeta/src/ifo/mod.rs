//! Read the title structure of a DVD-Video disc from its `*.IFO` files.
//!
//! A disc's `VIDEO_TS` directory holds a `VIDEO_TS.IFO` file listing every
//! title, and one `VTS_nn_0.IFO` file per title set describing the streams
//! and program chains of its titles.  Each `*.IFO` file has a `*.BUP`
//! backup with identical contents, which we fall back to when the primary
//! copy is damaged.
//!
//! Useful references include:
//!
//! - [IFO file layout](http://dvd.sourceforge.net/dvdinfo/ifo.html)
//! - [VTS attributes](http://dvd.sourceforge.net/dvdinfo/ifo_vts.html)
//! - [Program chains](http://dvd.sourceforge.net/dvdinfo/pgc.html)

use log::{debug, error, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::result;

use crate::cursor::ByteCursor;
use crate::errors::{IfoError, ReadResult};

mod pgc;
mod types;
mod vmg;
mod vts;

pub use self::types::{
    AspectRatio, AudioMode, AudioType, DvdAudio, DvdStructure, DvdSubtitle, DvdTitle,
    DvdTitleSet, Resolution, SubtitleType, VideoFormat,
};
use self::vmg::{TitleEntry, VMG_MAGIC};
use self::vts::VTS_MAGIC;

/// Result type for reading `*.IFO` files.
pub type Result<T, E = IfoError> = result::Result<T, E>;

/// Attach a file name to low-level read errors.
pub(crate) trait ReadResultExt<T> {
    fn in_file(self, path: &Path) -> Result<T>;
}

impl<T> ReadResultExt<T> for ReadResult<T> {
    fn in_file(self, path: &Path) -> Result<T> {
        self.map_err(|source| IfoError::Read {
            path: path.to_owned(),
            source,
        })
    }
}

/// Read every title on the DVD mounted at `mount_dir`.
///
/// If `VIDEO_TS.IFO` and its backup are both unreadable, this fails.  If a
/// title set can't be read from either copy, we log the problem and return
/// its titles with only the information from the title table.
pub fn read_dvd_structure<P: AsRef<Path>>(mount_dir: P) -> Result<DvdStructure> {
    let mount_dir = mount_dir.as_ref();
    let entries = with_backup(mount_dir, "VIDEO_TS", read_vmg)?;

    let mut titles: Vec<DvdTitle> = entries
        .iter()
        .map(|e| DvdTitle::new(e.number, e.angles, e.chapters, e.vts, e.vts_title))
        .collect();
    let mut title_sets = BTreeMap::new();

    for group in vmg::vts_groups(&entries) {
        let vts = entries[group.start].vts;
        let stem = format!("VTS_{:02}_0", vts);
        let group_entries = &entries[group.clone()];
        match with_backup(mount_dir, &stem, |path| read_vts(path, vts, group_entries)) {
            Ok((set, decoded)) => {
                for (slot, title) in titles[group].iter_mut().zip(decoded) {
                    *slot = title;
                }
                title_sets.insert(vts, set);
            }
            Err(err) => error!("could not read title set {}: {}", vts, err),
        }
    }

    Ok(DvdStructure { titles, title_sets })
}

/// Call `read` on `<stem>.IFO`, falling back to `<stem>.BUP` if that fails.
/// If both fail, we return the error from the primary file.
fn with_backup<T, F>(mount_dir: &Path, stem: &str, read: F) -> Result<T>
where
    F: Fn(&Path) -> Result<T>,
{
    let try_ext = |ext: &str| locate(mount_dir, &format!("{}.{}", stem, ext)).and_then(|p| read(&p));
    try_ext("IFO").or_else(|primary| {
        warn!("{}, trying backup", primary);
        try_ext("BUP").map_err(|backup| {
            debug!("backup failed too: {}", backup);
            primary
        })
    })
}

/// Find `file_name` in the `VIDEO_TS` directory, allowing for discs which
/// were copied with lowercase names.
fn locate(mount_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let lower = file_name.to_lowercase();
    for dir in &["VIDEO_TS", "video_ts"] {
        for name in &[file_name, lower.as_str()] {
            let path = mount_dir.join(dir).join(name);
            if path.is_file() {
                return Ok(path);
            }
        }
    }
    Err(IfoError::FileNotFound {
        path: mount_dir.join("VIDEO_TS").join(file_name),
    })
}

/// Open a file and check the 12-byte identifier at its start.
fn open_checked(path: &Path, expected: &'static str) -> Result<ByteCursor<io::BufReader<fs::File>>> {
    let mut c = ByteCursor::open(path).in_file(path)?;
    let found = c.read_ascii_fixed(expected.len()).in_file(path)?;
    if found.as_deref() != Some(expected) {
        return Err(IfoError::BadMagic {
            path: path.to_owned(),
            expected,
            found,
        });
    }
    Ok(c)
}

fn read_vmg(path: &Path) -> Result<Vec<TitleEntry>> {
    let mut c = open_checked(path, VMG_MAGIC)?;
    vmg::read_title_entries(&mut c).in_file(path)
}

/// Read a title set and the titles in `entries`, which all belong to it.
fn read_vts(path: &Path, vts: u8, entries: &[TitleEntry]) -> Result<(DvdTitleSet, Vec<DvdTitle>)> {
    let mut c = open_checked(path, VTS_MAGIC)?;
    let offsets = vts::pgc_offsets(&mut c, path, vts, entries)?;
    let set = vts::read_title_set(&mut c, vts).in_file(path)?;

    let mut titles = Vec::with_capacity(entries.len());
    for e in entries {
        let mut title = DvdTitle::new(e.number, e.angles, e.chapters, e.vts, e.vts_title);
        let offset = *offsets.get(&e.vts_title).ok_or(IfoError::MissingPgc {
            vts,
            title: e.vts_title,
            pgc: 0,
        })?;
        pgc::read_pgc(&mut c, offset, &mut title, &set).in_file(path)?;
        titles.push(title);
    }
    Ok((set, titles))
}
