use crate::prelude::*;

use super::event_summary::EventSummary;

use quick_xml::name::QName;

/// Failure to read back a vtk file written by this crate (or a compatible one).
#[derive(Debug, thiserror::Error, From)]
pub enum ParseError {
    #[error("Error parsing legacy vtk file: {0}")]
    Legacy(Legacy),
    #[error("Error parsing rectilinear vtk file: {0}")]
    Rectilinear(Rectilinear),
}

#[derive(Debug, thiserror::Error, From)]
pub enum Legacy {
    #[error("{0}")]
    UnexpectedToken(UnexpectedToken),
    #[error("{0}")]
    MalformedNumber(MalformedNumber),
    #[error("{0}")]
    MissingSection(MissingSection),
}

#[derive(Debug, thiserror::Error, From)]
pub enum Rectilinear {
    #[error("{0}")]
    MalformedXml(MalformedXml),
    #[error("{0}")]
    MalformedAttribute(MalformedAttribute),
    #[error("{0}")]
    MissingAttribute(MissingAttribute),
    #[error("{0}")]
    UnexpectedElement(UnexpectedElement),
    #[error("{0}")]
    UnexpectedAttributeValue(UnexpectedAttributeValue),
    #[error("{0}")]
    MalformedExtent(MalformedExtent),
    #[error("{0}")]
    InlineAsciiArray(InlineAsciiArray),
    #[error("{0}")]
    InlineBase64Array(InlineBase64Array),
    #[error("{0}")]
    MissingArray(MissingArray),
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "line {line}: expected {expected}, got `{actual}`")]
pub struct UnexpectedToken {
    line: usize,
    expected: String,
    actual: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "line {line}: `{token}` is not a valid {kind}")]
pub struct MalformedNumber {
    line: usize,
    token: String,
    kind: &'static str,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "file ended while reading {section}")]
pub struct MissingSection {
    section: String,
}

#[derive(From, Display, Debug)]
#[display(fmt = "failed to parse an xml element: {xml_err}")]
pub struct MalformedXml {
    xml_err: quick_xml::Error,
}

#[derive(From, Display, Debug)]
#[display(fmt = "failed to parse an xml attribute: {att_err}")]
pub struct MalformedAttribute {
    att_err: quick_xml::events::attributes::AttrError,
}

#[derive(Display, Debug)]
#[display(fmt = "unexpected element. Expected `{expected_name}`, got {actual_element}")]
pub struct UnexpectedElement {
    expected_name: String,
    actual_element: EventSummary,
}

impl UnexpectedElement {
    pub(crate) fn new<T: Into<String>>(expected_name: T, actual_element: EventSummary) -> Self {
        Self {
            expected_name: expected_name.into(),
            actual_element,
        }
    }
}

#[derive(Display, Debug, Constructor)]
#[display(
    fmt = "unexpected attribute value for {attribute_name} in {element_name} element: expected {expected_value}, got {actual_value}"
)]
pub struct UnexpectedAttributeValue {
    pub(crate) element_name: String,
    pub(crate) attribute_name: String,
    pub(crate) expected_value: String,
    pub(crate) actual_value: ParsedNameOrBytes,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "missing attribute `{attribute_name}` in {element_name} element")]
pub struct MissingAttribute {
    element_name: String,
    attribute_name: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "missing DataArray `{array_name}` in {section} element")]
pub struct MissingArray {
    section: String,
    array_name: String,
}

#[derive(Display, Debug, Constructor, Clone, PartialEq)]
#[display(fmt = "extent `{extent}` is not six increasing node indices")]
pub struct MalformedExtent {
    extent: String,
}

impl std::error::Error for MalformedExtent {}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "Failed to parse inline ascii array `{array_name}` in DataArray element")]
pub struct InlineAsciiArray {
    array_name: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "Failed to decode inline base64 array `{array_name}` in DataArray element: {reason}")]
pub struct InlineBase64Array {
    array_name: String,
    reason: String,
}

#[derive(From, Display, Debug)]
pub enum ParsedNameOrBytes {
    #[display(fmt = "{_0}")]
    Utf8(String),
    #[display(fmt = "{_0:?} (cannot convert to UTF8 string)")]
    Bytes(Vec<u8>),
}

impl ParsedNameOrBytes {
    fn new(bytes: &[u8]) -> Self {
        let vec = Vec::from(bytes);
        match String::from_utf8(vec) {
            Ok(string) => Self::Utf8(string),
            Err(e) => Self::Bytes(e.into_bytes()),
        }
    }
}

impl<'a> From<QName<'a>> for ParsedNameOrBytes {
    fn from(x: QName) -> Self {
        Self::new(x.as_ref())
    }
}

impl<'a> From<std::borrow::Cow<'a, [u8]>> for ParsedNameOrBytes {
    fn from(x: std::borrow::Cow<'a, [u8]>) -> Self {
        Self::new(x.as_ref())
    }
}
