//! The header as an explicit schema.
//!
//! Every field of the header is described by one [`FieldDescriptor`]. A single routine,
//! [`decode_value`], turns a descriptor plus the raw header window into a [`Value`], and
//! [`encode_record`] goes the other way. Nothing else in the crate knows how the header is laid
//! out on disk.
//!
//! The solver writes the header as a sequence of unformatted records,
//! `[len: 4 bytes][tag][payload][len: 4 bytes]`, which is why a string value is delimited by the
//! 4 bytes in front of its tag: the same record length marker closes the record again.

use crate::prelude::*;
use crate::utils::{bytes_to_f32, bytes_to_i32, WORD};

use super::error::HeaderError;

/// how the bytes after a tag are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// sentinel-delimited string
    Text,
    /// `count` native-endian `i32`
    Int,
    /// `count` native-endian `f32`
    Float,
}

impl FieldKind {
    /// bytes per element (for `Text`, the width of the sentinel)
    pub fn width(&self) -> usize {
        WORD
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// literal ascii tag searched for in the header window
    pub tag: &'static str,
    pub kind: FieldKind,
    /// number of elements; ignored for `Text`
    pub count: usize,
}

impl FieldDescriptor {
    const fn new(tag: &'static str, kind: FieldKind, count: usize) -> Self {
        Self { tag, kind, count }
    }

    /// payload bytes of a numeric field
    pub fn payload_len(&self) -> usize {
        self.kind.width() * self.count
    }
}

pub const TITLE: FieldDescriptor = FieldDescriptor::new("load", FieldKind::Text, 1);
pub const WORKING_DIR: FieldDescriptor = FieldDescriptor::new("workingdir", FieldKind::Text, 1);
pub const GEOMETRY: FieldDescriptor = FieldDescriptor::new("geometry", FieldKind::Text, 1);
pub const RESOLUTION: FieldDescriptor = FieldDescriptor::new("resolution", FieldKind::Int, 3);
pub const DIMENSION: FieldDescriptor = FieldDescriptor::new("dimension", FieldKind::Float, 3);
pub const RECORD_SIZE: FieldDescriptor =
    FieldDescriptor::new("materialpoint_sizeResults", FieldKind::Int, 1);
pub const INCREMENTS: FieldDescriptor = FieldDescriptor::new("increments", FieldKind::Int, 1);

/// all header fields in the order the solver writes them
pub const SCHEMA: [FieldDescriptor; 7] = [
    TITLE,
    WORKING_DIR,
    GEOMETRY,
    RESOLUTION,
    DIMENSION,
    RECORD_SIZE,
    INCREMENTS,
];

/// the descriptor of the schema field with literal tag `tag`
pub fn descriptor(tag: &str) -> Option<FieldDescriptor> {
    SCHEMA.iter().copied().find(|field| field.tag == tag)
}

/// marks the end of the header
pub const END_OF_HEADER: &str = "eoh";

/// distance from the start of [`END_OF_HEADER`] to the first payload byte: the marker itself plus
/// the trailing record length of its record
pub const END_OF_HEADER_TRAILER: usize = END_OF_HEADER.len() + WORD;

/// a decoded header value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Ints(Vec<i32>),
    Floats(Vec<f32>),
}

/// all start positions of `needle` in `haystack`
fn find_all<'a>(haystack: &'a [u8], needle: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(move |(_, window)| *window == needle)
        .map(|(position, _)| position)
}

/// Position of the first occurrence of the tag of `field` in `window`.
pub fn find_tag(window: &[u8], field: &FieldDescriptor) -> Option<usize> {
    find(window, field.tag.as_bytes())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    find_all(haystack, needle).next()
}

/// Decode the value described by `field` from the first matching occurrence of its tag.
pub fn decode_value(window: &[u8], field: &FieldDescriptor) -> Result<Value, HeaderError> {
    let tag = field.tag.as_bytes();
    let mut positions = find_all(window, tag).peekable();

    if positions.peek().is_none() {
        return Err(HeaderError::MissingTag {
            tag: field.tag,
            window: window.len(),
        });
    }

    match field.kind {
        FieldKind::Text => {
            let width = field.kind.width();

            for position in positions.filter(|p| *p >= width) {
                let sentinel = &window[position - width..position];
                let start = position + tag.len();

                if let Some(len) = find(&window[start..], sentinel) {
                    let bytes = window[start..start + len].to_vec();
                    let text = String::from_utf8(bytes)
                        .map_err(|_| HeaderError::InvalidUtf8 { tag: field.tag })?;
                    return Ok(Value::Text(text));
                }
            }

            Err(HeaderError::UnterminatedString { tag: field.tag })
        }
        FieldKind::Int | FieldKind::Float => {
            let needed = field.payload_len();
            let mut available = 0;

            for position in positions {
                let start = position + tag.len();
                let rest = &window[start..];

                if rest.len() < needed {
                    available = available.max(rest.len());
                    continue;
                }

                let words = rest[..needed].chunks(field.kind.width());
                let value = match field.kind {
                    FieldKind::Int => Value::Ints(words.map(bytes_to_i32).collect()),
                    _ => Value::Floats(words.map(bytes_to_f32).collect()),
                };
                return Ok(value);
            }

            Err(HeaderError::Truncated {
                tag: field.tag,
                needed,
                available,
            })
        }
    }
}

/// Offset of the first payload byte, `position of "eoh" + 7`.
pub fn find_data_offset(window: &[u8]) -> Result<u64, HeaderError> {
    find(window, END_OF_HEADER.as_bytes())
        .map(|position| (position + END_OF_HEADER_TRAILER) as u64)
        .ok_or(HeaderError::MissingEndOfHeader {
            window: window.len(),
        })
}

/// Write one `[len][tag][payload][len]` record.
pub fn encode_record(buffer: &mut Vec<u8>, tag: &str, payload: &[u8]) {
    let len = (tag.len() + payload.len()) as i32;
    buffer.extend_from_slice(&len.to_ne_bytes());
    buffer.extend_from_slice(tag.as_bytes());
    buffer.extend_from_slice(payload);
    buffer.extend_from_slice(&len.to_ne_bytes());
}

/// Serialize a value in the width its descriptor declares.
pub fn encode_value(value: &Value) -> Vec<u8> {
    match value {
        Value::Text(text) => text.as_bytes().to_vec(),
        Value::Ints(ints) => ints.iter().flat_map(|i| i.to_ne_bytes()).collect(),
        Value::Floats(floats) => floats.iter().flat_map(|f| f.to_ne_bytes()).collect(),
    }
}
