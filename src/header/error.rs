use crate::prelude::*;

/// Reasons a header window can fail to decode. Any of these aborts processing of the file.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeaderError {
    #[error("tag `{tag}` not found in the first {window} bytes")]
    MissingTag { tag: &'static str, window: usize },
    #[error("tag `{tag}` is followed by {available} bytes, {needed} are needed")]
    Truncated {
        tag: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("string value of `{tag}` is not closed by its sentinel")]
    UnterminatedString { tag: &'static str },
    #[error("string value of `{tag}` is not valid utf8")]
    InvalidUtf8 { tag: &'static str },
    #[error("{0}")]
    OutOfRange(OutOfRange),
    #[error("end of header marker `eoh` not found in the first {window} bytes")]
    MissingEndOfHeader { window: usize },
}

#[derive(Display, Debug, Clone, PartialEq, Constructor)]
#[display(fmt = "value of `{tag}` must be {expected}, found {value}")]
pub struct OutOfRange {
    tag: &'static str,
    expected: &'static str,
    value: f64,
}

impl From<OutOfRange> for HeaderError {
    fn from(x: OutOfRange) -> Self {
        HeaderError::OutOfRange(x)
    }
}
