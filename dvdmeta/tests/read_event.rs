//! Read the sample event information in `fixtures/example.eit`.

use chrono::{TimeZone, Utc};
use dvdmeta::dvb::{Component, ExtendedEventItem};
use dvdmeta::{is_ifo_file, Descriptor, EventInformation, ReadError, RunningStatus, SiError};
use std::fs;

const FIXTURE: &str = "../fixtures/example.eit";

#[test]
fn reads_example_event() {
    let _ = env_logger::try_init();
    let event = EventInformation::open(FIXTURE).unwrap();
    assert_eq!(event.event_id, 0x1234);
    assert_eq!(event.start_time, Utc.with_ymd_and_hms(2020, 1, 1, 20, 15, 0).unwrap());
    assert_eq!(event.duration_secs, (60 + 45) * 60 + 30);
    assert_eq!(event.running_status, RunningStatus::Running);
    assert!(!event.free_ca_mode);

    let tags: Vec<u8> = event.descriptors.iter().map(|d| d.tag()).collect();
    assert_eq!(tags, vec![0x4d, 0x4e, 0x4e, 0x50, 0x54]);

    let short = event.short_events().next().unwrap();
    assert_eq!(short.language.as_deref(), Some("deu"));
    assert_eq!(short.event_name, "Das Boot");
    assert_eq!(short.text, "Kriegsfilm");

    match &event.descriptors[1] {
        Descriptor::ExtendedEvent(e) => {
            assert_eq!((e.descriptor_number, e.last_descriptor_number), (0, 1));
            assert_eq!(
                e.items,
                vec![ExtendedEventItem {
                    description: "Regie".to_owned(),
                    item: "Wolfgang Petersen".to_owned(),
                }]
            );
        }
        other => panic!("expected an extended event, got {:?}", other),
    }
    match &event.descriptors[3] {
        Descriptor::Component(Component {
            stream_content,
            component_type,
            text,
            ..
        }) => {
            assert_eq!((*stream_content, *component_type), (1, 3));
            assert_eq!(text, "16:9");
        }
        other => panic!("expected a component, got {:?}", other),
    }

    assert_eq!(
        event.extended_text(),
        "U-Boot-Drama nach dem Roman von Lothar-Günther Buchheim, Deutschland 1981."
    );
    assert_eq!(event.proposed_title().as_deref(), Some("Das Boot (1981)"));
    assert!(!is_ifo_file(FIXTURE).unwrap());
}

#[test]
fn truncated_events_are_errors() {
    let bytes = fs::read(FIXTURE).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.eit");
    fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();
    match EventInformation::open(&path) {
        Err(SiError::Read(ReadError::Truncated { wanted: 2, available: 1, .. })) => {}
        other => panic!("expected a truncation error, got {:?}", other),
    }
}

#[test]
fn missing_files_are_io_errors() {
    match EventInformation::open("../fixtures/no-such-file.eit") {
        Err(SiError::Io { path, .. }) => assert!(path.ends_with("no-such-file.eit")),
        other => panic!("expected an I/O error, got {:?}", other),
    }
}
