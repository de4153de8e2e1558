//! Descriptors attached to an event.

use log::trace;
use std::io::{Read, Seek};

use super::text::{read_encoded_string, read_text};
use crate::cursor::ByteCursor;
use crate::errors::SiError;

/// Tag of a short event descriptor.
pub const SHORT_EVENT_TAG: u8 = 0x4d;
/// Tag of an extended event descriptor.
pub const EXTENDED_EVENT_TAG: u8 = 0x4e;
/// Tag of a component descriptor.
pub const COMPONENT_TAG: u8 = 0x50;
/// Tag of a content descriptor.
pub const CONTENT_TAG: u8 = 0x54;

/// A descriptor from an event's descriptor loop.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Descriptor {
    /// The event's name and a short description.
    ShortEvent(ShortEvent),
    /// One part of a longer description.
    ExtendedEvent(ExtendedEvent),
    /// An elementary stream of the event.
    Component(Component),
    /// Genre classification.
    Content(Content),
}

impl Descriptor {
    /// The tag byte which identifies this kind of descriptor.
    pub fn tag(&self) -> u8 {
        match self {
            Descriptor::ShortEvent(_) => SHORT_EVENT_TAG,
            Descriptor::ExtendedEvent(_) => EXTENDED_EVENT_TAG,
            Descriptor::Component(_) => COMPONENT_TAG,
            Descriptor::Content(_) => CONTENT_TAG,
        }
    }
}

/// A short event descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortEvent {
    /// ISO 639-2 language code.
    pub language: Option<String>,
    /// The name of the event.
    pub event_name: String,
    /// A short description.
    pub text: String,
}

/// An extended event descriptor.  Long descriptions are split across
/// several of these, numbered from 0 to `last_descriptor_number`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedEvent {
    /// The position of this descriptor in the sequence.
    pub descriptor_number: u8,
    /// The number of the last descriptor in the sequence.
    pub last_descriptor_number: u8,
    /// ISO 639-2 language code.
    pub language: Option<String>,
    /// Itemized information, such as cast lists.
    pub items: Vec<ExtendedEventItem>,
    /// Free-form text.
    pub text: String,
}

/// An entry in an extended event descriptor, such as `("Director",
/// "Wolfgang Petersen")`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedEventItem {
    /// What this item describes.
    pub description: String,
    /// The item itself.
    pub item: String,
}

/// A component descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    /// The kind of stream (video, audio, subtitles, ...).
    pub stream_content: u8,
    /// The format of the stream, interpreted according to `stream_content`.
    pub component_type: u8,
    /// Links this descriptor to a stream identifier descriptor in the PMT.
    pub component_tag: u8,
    /// ISO 639-2 language code.
    pub language: Option<String>,
    /// A description of the stream.
    pub text: String,
}

/// A content descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Content {
    /// Raw 16-bit content codes: two nibbles of genre followed by a user
    /// byte.
    pub codes: Vec<u16>,
}

impl Content {
    /// The top-level genre nibble of each code, e.g. 0x1 for movies.
    pub fn genres(&self) -> impl Iterator<Item = u8> + '_ {
        self.codes.iter().map(|&code| (code >> 12) as u8)
    }
}

/// The descriptors we know how to decode, picked before we trust the
/// length byte.
#[derive(Clone, Copy)]
enum Kind {
    ShortEvent,
    ExtendedEvent,
    Component,
    Content,
}

/// Read one descriptor, checking that it fits in the `remaining` bytes of
/// the descriptor loop.  Returns the descriptor and the number of bytes it
/// took up, including its 2 byte header.
pub(crate) fn read_descriptor<R: Read + Seek>(
    c: &mut ByteCursor<R>,
    remaining: u64,
) -> Result<(Descriptor, u64), SiError> {
    let offset = c.absolute_position();
    if remaining < 2 {
        return Err(SiError::DescriptorLengthMismatch {
            offset,
            remaining,
            needed: 2,
        });
    }

    let tag = c.read_u8()?;
    let kind = match tag {
        SHORT_EVENT_TAG => Kind::ShortEvent,
        EXTENDED_EVENT_TAG => Kind::ExtendedEvent,
        COMPONENT_TAG => Kind::Component,
        CONTENT_TAG => Kind::Content,
        _ => return Err(SiError::UnknownDescriptorTag { tag, offset }),
    };
    let len = c.read_u8()?;
    let needed = u64::from(len) + 2;
    if needed > remaining {
        return Err(SiError::DescriptorLengthMismatch {
            offset,
            remaining,
            needed,
        });
    }

    let body_offset = c.absolute_position();
    let body = c.read_bytes(usize::from(len))?;
    let mut b = ByteCursor::from_slice(&body, body_offset);
    let descriptor = match kind {
        Kind::ShortEvent => Descriptor::ShortEvent(ShortEvent {
            language: b.read_ascii_fixed(3)?,
            event_name: read_text(&mut b)?,
            text: read_text(&mut b)?,
        }),
        Kind::ExtendedEvent => Descriptor::ExtendedEvent(read_extended_event(&mut b)?),
        Kind::Component => {
            let stream_content = b.read_u8()? & 0x0f;
            let component_type = b.read_u8()?;
            let component_tag = b.read_u8()?;
            let language = b.read_ascii_fixed(3)?;
            let text_len = b.remaining() as usize;
            Descriptor::Component(Component {
                stream_content,
                component_type,
                component_tag,
                language,
                text: read_encoded_string(&mut b, text_len)?,
            })
        }
        Kind::Content => {
            let mut codes = Vec::with_capacity(body.len() / 2);
            while b.remaining() >= 2 {
                codes.push(b.read_u16()?);
            }
            Descriptor::Content(Content { codes })
        }
    };
    if b.remaining() > 0 {
        trace!(
            "ignoring {} trailing bytes in descriptor {:#04x} at {:#x}",
            b.remaining(),
            tag,
            offset
        );
    }
    Ok((descriptor, needed))
}

fn read_extended_event<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<ExtendedEvent, SiError> {
    let numbers = c.read_u8()?;
    let language = c.read_ascii_fixed(3)?;

    let items_len = c.read_u8()?;
    let items_offset = c.absolute_position();
    let items_bytes = c.read_bytes(usize::from(items_len))?;
    let mut items_cursor = ByteCursor::from_slice(&items_bytes, items_offset);
    let mut items = vec![];
    while items_cursor.remaining() > 0 {
        items.push(ExtendedEventItem {
            description: read_text(&mut items_cursor)?,
            item: read_text(&mut items_cursor)?,
        });
    }

    Ok(ExtendedEvent {
        descriptor_number: numbers >> 4,
        last_descriptor_number: numbers & 0x0f,
        language,
        items,
        text: read_text(c)?,
    })
}
