//! List the titles of a DVD, dump the event information of a DVB
//! recording, or patch a VobSub palette with the colors from a DVD title.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use dvdmeta::{
    dvb::Descriptor, read_dvd_structure, DvdStructure, DvdTitle, EventInformation, VobsubIndex,
};
use log::debug;

#[derive(Debug, Parser)]
/// Inspect the metadata of DVD rips and DVB recordings.
#[command(name = "lsdvd", version)]
enum Args {
    /// List the titles, chapters and streams of a mounted DVD.
    #[command(name = "titles")]
    Titles {
        /// The directory containing `VIDEO_TS`.
        mount_dir: PathBuf,
    },

    /// Show the event information saved with a DVB recording.
    #[command(name = "event")]
    Event {
        /// Path to the `*.eit` file.
        eit_file: PathBuf,
    },

    /// Replace the palette of a VobSub `*.idx` file with the subtitle
    /// colors of a DVD title.
    #[command(name = "patch-palette")]
    PatchPalette {
        /// The directory containing `VIDEO_TS`.
        mount_dir: PathBuf,

        /// The title number, starting at 1.
        title: u16,

        /// The `*.idx` file to rewrite.
        idx_file: PathBuf,
    },
}

// Choose and run the appropriate command.
fn main() -> Result<()> {
    env_logger::init();

    let args: Args = Args::parse();
    debug!("{:?}", args);
    match args {
        Args::Titles { mount_dir } => cmd_titles(&mount_dir),
        Args::Event { eit_file } => cmd_event(&eit_file),
        Args::PatchPalette {
            mount_dir,
            title,
            idx_file,
        } => cmd_patch_palette(&mount_dir, title, &idx_file),
    }
}

/// Format milliseconds as `hh:mm:ss.mmm`.
fn format_ms(ms: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        ms / 3_600_000,
        ms / 60_000 % 60,
        ms / 1000 % 60,
        ms % 1000
    )
}

fn read_dvd(mount_dir: &Path) -> Result<DvdStructure> {
    read_dvd_structure(mount_dir)
        .with_context(|| format!("could not read DVD at {}", mount_dir.display()))
}

fn cmd_titles(mount_dir: &Path) -> Result<()> {
    let dvd = read_dvd(mount_dir)?;
    for title in &dvd.titles {
        print_title(&dvd, title);
    }
    if let Some(longest) = dvd.longest_title() {
        println!("Longest track: {:02}", longest.number);
    }
    Ok(())
}

fn print_title(dvd: &DvdStructure, title: &DvdTitle) {
    println!(
        "Title: {:02}, Length: {} Chapters: {:02}, Angles: {:02}, VTS: {:02}/{:02}",
        title.number,
        format_ms(title.total_ms),
        title.chapters_ms.len(),
        title.angle_count,
        title.vts,
        title.vts_title,
    );
    let set = match dvd.title_set(title) {
        Some(set) => set,
        None => {
            println!("  (title set {} is unreadable)", title.vts);
            return;
        }
    };
    let resolution = set
        .resolution()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "?".to_owned());
    println!("  Video: {} {} {}", set.format, set.aspect_ratio, resolution);

    let mut start = 0;
    for (i, &end) in title.chapters_ms.iter().enumerate() {
        println!("  Chapter: {:02}, Start: {}", i + 1, format_ms(start));
        start = end;
    }
    for (i, audio) in title.audio.iter().enumerate() {
        if let Some(id) = audio.stream_id {
            let mode = audio.mode.map(|m| m.to_string()).unwrap_or_else(|| "?".to_owned());
            println!(
                "  Audio: {}, Language: {}, Format: {}, Channels: {}, Stream id: {:#04x}",
                i + 1,
                audio.language.as_deref().unwrap_or("??"),
                mode,
                audio.channels,
                id,
            );
        }
    }
    for (i, sub) in title.subtitles.iter().enumerate() {
        if let Some(id) = sub.stream_id(set.aspect_ratio) {
            println!(
                "  Subtitle: {:02}, Language: {}, Type: {:?}, Stream id: {:#04x}",
                i + 1,
                sub.language.as_deref().unwrap_or("??"),
                sub.subtitle_type,
                id,
            );
        }
    }
}

fn cmd_event(path: &Path) -> Result<()> {
    let event = EventInformation::open(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let duration = u64::from(event.duration_secs) * 1000;
    println!("Event: {:#06x}", event.event_id);
    println!("Start: {}", event.start_time.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Duration: {}", format_ms(duration));
    println!("Status: {}", event.running_status);
    for descriptor in &event.descriptors {
        match descriptor {
            Descriptor::ShortEvent(e) => {
                println!("Name: {}", e.event_name);
                println!("Text: {}", e.text);
            }
            Descriptor::ExtendedEvent(e) => {
                for item in &e.items {
                    println!("Item: {}: {}", item.description, item.item);
                }
            }
            Descriptor::Component(c) => {
                println!("Component: {:#x}/{:#04x} {}", c.stream_content, c.component_type, c.text);
            }
            Descriptor::Content(c) => {
                println!("Genres: {:?}", c.genres().collect::<Vec<_>>());
            }
            other => debug!("not printing {:?}", other),
        }
    }
    let description = event.extended_text();
    if !description.is_empty() {
        println!("Description: {}", description);
    }
    if let Some(title) = event.proposed_title() {
        println!("Proposed title: {}", title);
    }
    Ok(())
}

fn cmd_patch_palette(mount_dir: &Path, title: u16, idx_file: &Path) -> Result<()> {
    let dvd = read_dvd(mount_dir)?;
    let title = dvd
        .title(title)
        .ok_or_else(|| anyhow!("no title {} on {}", title, mount_dir.display()))?;
    let mut idx = VobsubIndex::read(idx_file)?;
    idx.set_palette_from_ycbcr(&title.palette);
    idx.write(idx_file)?;
    println!(
        "Patched palette of {} from title {}",
        idx_file.display(),
        title.number
    );
    Ok(())
}
