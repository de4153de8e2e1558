//! Read the sample DVD in `fixtures/dvd`, plus some damaged copies of it.

use std::fs;
use std::path::Path;

use dvdmeta::{
    read_dvd_structure, AspectRatio, AudioMode, AudioType, IfoError, SubtitleType, VideoFormat,
};
use tempfile::TempDir;

const FIXTURE: &str = "../fixtures/dvd";

/// Copy the sample DVD into a scratch directory, renaming files with
/// `rename` and then handing each one to `damage`.
fn scratch_copy<F>(rename: fn(&str) -> String, damage: F) -> TempDir
where
    F: Fn(&str, &mut Vec<u8>),
{
    let dir = tempfile::tempdir().unwrap();
    let video_ts = dir.path().join(rename("VIDEO_TS"));
    fs::create_dir(&video_ts).unwrap();
    for entry in fs::read_dir(Path::new(FIXTURE).join("VIDEO_TS")).unwrap() {
        let entry = entry.unwrap();
        let name = entry.file_name().into_string().unwrap();
        let mut bytes = fs::read(entry.path()).unwrap();
        damage(&name, &mut bytes);
        fs::write(video_ts.join(rename(&name)), bytes).unwrap();
    }
    dir
}

fn same(name: &str) -> String {
    name.to_owned()
}

#[test]
fn reads_every_title() {
    let _ = env_logger::try_init();
    let dvd = read_dvd_structure(FIXTURE).unwrap();

    assert_eq!(dvd.titles.len(), 12);
    assert_eq!(dvd.title_sets.len(), 1);
    for (i, title) in dvd.titles.iter().enumerate() {
        assert_eq!(usize::from(title.number), i + 1);
        assert_eq!(title.vts, 1);
        assert_eq!(usize::from(title.vts_title), i + 1);
        assert!(title.chapters_ms.windows(2).all(|w| w[0] <= w[1]));
    }

    let main = dvd.title(1).unwrap();
    assert_eq!(main.total_ms, 1_890_000);
    assert_eq!(main.chapter_count, 3);
    assert_eq!(main.chapters_ms, vec![600_000, 1_830_000, 1_890_000]);
    assert_eq!(main.palette[2], 0x0051_f05a);
    assert_eq!(dvd.longest_title().map(|t| t.number), Some(1));

    let last = dvd.title(12).unwrap();
    assert_eq!(last.total_ms, 660_000);
    assert_eq!(last.chapters_ms, vec![660_000]);
}

#[test]
fn reads_title_set_attributes() {
    let dvd = read_dvd_structure(FIXTURE).unwrap();
    let main = dvd.title(1).unwrap();
    let set = dvd.title_set(main).unwrap();
    assert_eq!(set.format, VideoFormat::Pal);
    assert_eq!(set.aspect_ratio, AspectRatio::Wide);
    assert_eq!(set.resolution().map(|r| r.to_string()).as_deref(), Some("720x576"));
    assert!(set.letterbox && set.pan_scan);

    let audio = &main.audio;
    assert_eq!(audio.len(), 2);
    assert_eq!(audio[0].mode, Some(AudioMode::Ac3));
    assert_eq!(audio[0].channels, 6);
    assert_eq!(audio[0].language.as_deref(), Some("en"));
    assert_eq!(audio[0].audio_type, Some(AudioType::Normal));
    assert_eq!(audio[0].stream_id, Some(0x80));
    assert_eq!(audio[1].mode, Some(AudioMode::Lpcm));
    assert_eq!(audio[1].audio_type, Some(AudioType::DirectorsComments));
    assert_eq!(audio[1].stream_id, Some(0xa1));
    // The title set itself only has attributes.
    assert!(set.audio.iter().all(|a| a.stream_id.is_none()));

    let subs = &main.subtitles;
    assert_eq!(subs[0].subtitle_type, Some(SubtitleType::Normal));
    assert_eq!(subs[1].subtitle_type, Some(SubtitleType::Forced));
    assert_eq!(subs[1].language.as_deref(), Some("fr"));
    assert_eq!(
        (
            subs[1].stream_id_standard,
            subs[1].stream_id_wide,
            subs[1].stream_id_letterbox,
            subs[1].stream_id_pan_scan
        ),
        (Some(0x24), Some(0x25), Some(0x26), Some(0x27))
    );

    // Later titles only enable the first audio stream.
    let other = dvd.title(5).unwrap();
    assert_eq!(other.audio[0].stream_id, Some(0x80));
    assert_eq!(other.audio[1].stream_id, None);
    assert!(other.subtitles.iter().all(|s| s.stream_id(AspectRatio::Wide).is_none()));
}

#[test]
fn falls_back_to_backups() {
    let _ = env_logger::try_init();
    let dir = scratch_copy(same, |name, bytes| {
        if name.ends_with(".IFO") {
            bytes[..12].copy_from_slice(b"CORRUPTED!!!");
        }
    });
    let dvd = read_dvd_structure(dir.path()).unwrap();
    assert_eq!(dvd, read_dvd_structure(FIXTURE).unwrap());
}

#[test]
fn falls_back_to_backups_of_truncated_files() {
    let dir = scratch_copy(same, |name, bytes| {
        if name == "VTS_01_0.IFO" {
            bytes.truncate(3000);
        }
    });
    let dvd = read_dvd_structure(dir.path()).unwrap();
    assert_eq!(dvd.title(1).unwrap().chapters_ms.len(), 3);
}

#[test]
fn accepts_lowercase_names() {
    let dir = scratch_copy(|name| name.to_lowercase(), |_, _| {});
    let dvd = read_dvd_structure(dir.path()).unwrap();
    assert_eq!(dvd.titles.len(), 12);
    assert_eq!(dvd.title(1).unwrap().total_ms, 1_890_000);
}

#[test]
fn fails_when_both_copies_are_bad() {
    let dir = scratch_copy(same, |name, bytes| {
        if name.starts_with("VIDEO_TS") {
            bytes[0] = b'X';
        }
    });
    match read_dvd_structure(dir.path()) {
        Err(IfoError::BadMagic { path, expected, .. }) => {
            assert!(path.ends_with("VIDEO_TS.IFO"));
            assert_eq!(expected, "DVDVIDEO-VMG");
        }
        other => panic!("expected a bad magic error, got {:?}", other),
    }
}

#[test]
fn missing_disc_is_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        read_dvd_structure(dir.path()),
        Err(IfoError::FileNotFound { .. })
    ));
}

#[test]
fn unreadable_title_sets_give_partial_results() {
    let dir = scratch_copy(same, |name, bytes| {
        if name.starts_with("VTS_01_0") {
            bytes.truncate(100);
        }
    });
    let dvd = read_dvd_structure(dir.path()).unwrap();
    assert_eq!(dvd.titles.len(), 12);
    assert!(dvd.title_sets.is_empty());
    let main = dvd.title(1).unwrap();
    assert_eq!(main.chapter_count, 3);
    assert_eq!(main.total_ms, 0);
    assert!(main.chapters_ms.is_empty());
    assert!(dvd.title_set(main).is_none());
}

#[test]
fn duplicate_titles_give_partial_results() {
    // Point title 2 at the same in-VTS title as title 1.
    let dir = scratch_copy(same, |name, bytes| {
        if name.starts_with("VIDEO_TS") {
            bytes[2048 + 8 + 12 + 7] = 1;
        }
    });
    let dvd = read_dvd_structure(dir.path()).unwrap();
    assert_eq!(dvd.titles.len(), 12);
    assert!(dvd.title_sets.is_empty());
    assert_eq!(dvd.title(2).unwrap().vts_title, 1);
}
