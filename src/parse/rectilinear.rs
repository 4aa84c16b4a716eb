use super::error::{self, ParseError, Rectilinear};
use super::event_summary::EventSummary;
use crate::prelude::*;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Parse an XML rectilinear grid (`.vtr`) with inline ascii or base64 arrays.
///
/// Cell arrays are returned in file order; point arrays are skipped. Every cell array has to
/// cover all cells of the extent.
pub fn read_vtr<R: BufRead>(reader: R) -> Result<VtkData<Rectilinear3D>, Error> {
    let mut reader = Reader::from_reader(reader);
    reader.trim_text(true);
    let mut buffer = Vec::new();

    let data = parse_xml_document(&mut reader, &mut buffer).map_err(ParseError::from)?;

    data.domain.check_locations()?;
    let n_cells = data.domain.spans.n_cells();
    for array in &data.cell_data {
        if array.values.len() != n_cells * array.components {
            return Err(ShapeMismatch::new(
                format!("{} values in array `{}`", n_cells * array.components, array.name),
                format!("{} values", array.values.len()),
            )
            .into());
        }
    }

    Ok(data)
}

fn parse_xml_document<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
) -> Result<VtkData<Rectilinear3D>, Rectilinear> {
    let vtk_file = read_starting_element_with_name(reader, buffer, "VTKFile")?;
    check_attribute_value(&vtk_file, "VTKFile", "type", "RectilinearGrid")?;
    check_attribute_value(&vtk_file, "VTKFile", "byte_order", "LittleEndian")?;

    let grid = read_starting_element_with_name(reader, buffer, "RectilinearGrid")?;
    let whole_extent = get_attribute_value(&grid, "WholeExtent", "RectilinearGrid")?;
    let spans = Spans3D::from_span_string(&whole_extent)?;

    let piece = read_starting_element_with_name(reader, buffer, "Piece")?;
    let extent = get_attribute_value(&piece, "Extent", "Piece")?;
    if Spans3D::from_span_string(&extent)? != spans {
        // only single piece files covering the whole extent
        return Err(error::UnexpectedAttributeValue::new(
            "Piece".into(),
            "Extent".into(),
            whole_extent,
            error::ParsedNameOrBytes::Utf8(extent),
        )
        .into());
    }

    let mut cell_data = Vec::new();
    let mut coordinates = None;

    loop {
        match next_event(reader, buffer)? {
            Event::Start(section) => match section.name().as_ref() {
                b"CellData" => cell_data = read_arrays(reader, buffer, "CellData")?,
                b"PointData" => {
                    read_arrays(reader, buffer, "PointData")?;
                }
                b"Coordinates" => coordinates = Some(read_arrays(reader, buffer, "Coordinates")?),
                _ => {
                    let summary = EventSummary::start(&section);
                    let unexpected = error::UnexpectedElement::new(
                        "CellData, PointData or Coordinates",
                        summary,
                    );
                    return Err(unexpected.into());
                }
            },
            // an empty section
            Event::Empty(_) => continue,
            Event::End(end) if end.name().as_ref() == b"Piece" => break,
            other => {
                let unexpected = error::UnexpectedElement::new("/Piece", EventSummary::new(&other));
                return Err(unexpected.into());
            }
        }
    }

    read_ending_element(reader, buffer, "RectilinearGrid")?;
    read_ending_element(reader, buffer, "VTKFile")?;

    let mut coordinates = coordinates.unwrap_or_default();
    let mut take = |axis: &str| -> Result<Vec<f64>, Rectilinear> {
        let position = coordinates
            .iter()
            .position(|array: &DataArray| array.name == axis)
            .ok_or_else(|| error::MissingArray::new("Coordinates".into(), axis.into()))?;
        Ok(coordinates.remove(position).values)
    };

    let mesh = Mesh3D::new(take("X")?, take("Y")?, take("Z")?);

    Ok(VtkData {
        domain: Rectilinear3D::new(mesh, spans),
        cell_data,
    })
}

/// Read `DataArray` elements up to the closing tag of `section`.
fn read_arrays<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    section: &str,
) -> Result<Vec<DataArray>, Rectilinear> {
    let mut arrays = Vec::new();

    loop {
        match next_event(reader, buffer)? {
            Event::Start(start) if start.name().as_ref() == b"DataArray" => {
                let header = read_dataarray_header(&start)?;

                let body = match next_event(reader, buffer)? {
                    Event::Text(text) => {
                        let body = text
                            .unescape()
                            .map_err(error::MalformedXml::from)?
                            .into_owned();
                        read_ending_element(reader, buffer, "DataArray")?;
                        body
                    }
                    Event::End(end) if end.name().as_ref() == b"DataArray" => String::new(),
                    other => {
                        let unexpected =
                            error::UnexpectedElement::new("body element", EventSummary::new(&other));
                        return Err(unexpected.into());
                    }
                };

                arrays.push(header.decode(&body)?);
            }
            Event::Empty(start) if start.name().as_ref() == b"DataArray" => {
                arrays.push(read_dataarray_header(&start)?.decode("")?);
            }
            Event::End(end) if end.name().as_ref() == section.as_bytes() => return Ok(arrays),
            other => {
                let unexpected = error::UnexpectedElement::new("DataArray", EventSummary::new(&other));
                return Err(unexpected.into());
            }
        }
    }
}

/// Describes how the values of an inline `DataArray` are stored
#[derive(Debug, Clone, PartialEq)]
struct DataArrayHeader {
    name: String,
    components: usize,
    /// bytes per value in base64 data
    width: usize,
    encoding: Encoding,
}

fn read_dataarray_header(start: &BytesStart<'_>) -> Result<DataArrayHeader, Rectilinear> {
    let name = get_attribute_value(start, "Name", "DataArray")?;

    let components = match find_attribute(start, "NumberOfComponents")? {
        Some(value) => match value.parse::<usize>() {
            Ok(components) if components > 0 => components,
            _ => {
                return Err(error::UnexpectedAttributeValue::new(
                    "DataArray".into(),
                    "NumberOfComponents".into(),
                    "a positive integer".into(),
                    error::ParsedNameOrBytes::Utf8(value),
                )
                .into())
            }
        },
        None => 1,
    };

    let unexpected_value = |attribute: &str, expected: &str, actual: String| {
        error::UnexpectedAttributeValue::new(
            "DataArray".into(),
            attribute.into(),
            expected.into(),
            error::ParsedNameOrBytes::Utf8(actual),
        )
    };

    let data_type = get_attribute_value(start, "type", "DataArray")?;
    let width = match data_type.as_str() {
        "Float64" => 8,
        "Float32" => 4,
        _ => return Err(unexpected_value("type", "Float64 or Float32", data_type.clone()).into()),
    };

    let format = get_attribute_value(start, "format", "DataArray")?;
    let encoding = match format.as_str() {
        "ascii" => Encoding::Ascii,
        "binary" => Encoding::Base64,
        _ => return Err(unexpected_value("format", "ascii or binary", format.clone()).into()),
    };

    Ok(DataArrayHeader {
        name,
        components,
        width,
        encoding,
    })
}

impl DataArrayHeader {
    fn decode(self, body: &str) -> Result<DataArray, Rectilinear> {
        let values = match self.encoding {
            Encoding::Ascii => parse_ascii_inner_dataarray(body, &self.name)?,
            Encoding::Base64 => parse_base64_inner_dataarray(body, &self.name, self.width)?,
        };

        Ok(DataArray::new(self.name, self.components, values))
    }
}

/// parse the values for a single inline ascii encoded array
fn parse_ascii_inner_dataarray(body: &str, array_name: &str) -> Result<Vec<f64>, Rectilinear> {
    body.split_ascii_whitespace()
        .map(|x| x.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| error::InlineAsciiArray::new(array_name.into()).into())
}

/// parse the values for a single inline base64 encoded array
///
/// The decoded bytes start with an 8 byte header (the byte count) that is skipped.
fn parse_base64_inner_dataarray(
    body: &str,
    array_name: &str,
    width: usize,
) -> Result<Vec<f64>, Rectilinear> {
    let failed = |reason: String| error::InlineBase64Array::new(array_name.into(), reason);

    if body.is_empty() {
        return Ok(Vec::new());
    }

    let numerical_bytes = base64::decode(body.trim()).map_err(|e| failed(e.to_string()))?;

    let data = numerical_bytes
        .get(8..)
        .ok_or_else(|| failed("shorter than the 8 byte header".into()))?;

    if data.len() % width != 0 {
        return Err(failed(format!("{} bytes is not a multiple of {width}", data.len())).into());
    }

    let values = data
        .chunks_exact(width)
        .map(|chunk| {
            let mut bytes = [0; 8];
            bytes[..width].copy_from_slice(chunk);
            if width == 8 {
                f64::from_le_bytes(bytes)
            } else {
                f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
            }
        })
        .collect();

    Ok(values)
}

/// next event that is not a declaration, comment or processing instruction
fn next_event<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
) -> Result<Event<'static>, Rectilinear> {
    loop {
        buffer.clear();
        let event = reader
            .read_event_into(buffer)
            .map_err(error::MalformedXml::from)?;

        match event {
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
            event => return Ok(event.into_owned()),
        }
    }
}

fn read_starting_element_with_name<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    expected_name: &str,
) -> Result<BytesStart<'static>, Rectilinear> {
    match next_event(reader, buffer)? {
        Event::Start(event) if event.name().as_ref() == expected_name.as_bytes() => Ok(event),
        Event::Start(event) => {
            let unexpected = error::UnexpectedElement::new(expected_name, EventSummary::start(&event));
            Err(unexpected.into())
        }
        other => {
            let unexpected = error::UnexpectedElement::new(expected_name, EventSummary::new(&other));
            Err(unexpected.into())
        }
    }
}

fn read_ending_element<R: BufRead>(
    reader: &mut Reader<R>,
    buffer: &mut Vec<u8>,
    expected_name: &str,
) -> Result<(), Rectilinear> {
    match next_event(reader, buffer)? {
        Event::End(event) if event.name().as_ref() == expected_name.as_bytes() => Ok(()),
        Event::End(event) => {
            let unexpected =
                error::UnexpectedElement::new(format!("/{expected_name}"), EventSummary::end(&event));
            Err(unexpected.into())
        }
        other => {
            let unexpected =
                error::UnexpectedElement::new(format!("/{expected_name}"), EventSummary::new(&other));
            Err(unexpected.into())
        }
    }
}

/// value of `attribute_key` if the element carries it
fn find_attribute(
    bytes_start: &BytesStart<'_>,
    attribute_key: &str,
) -> Result<Option<String>, Rectilinear> {
    for attribute in bytes_start.attributes() {
        let attribute = attribute.map_err(error::MalformedAttribute::from)?;

        if attribute.key.as_ref() == attribute_key.as_bytes() {
            let value = attribute
                .unescape_value()
                .map_err(error::MalformedXml::from)?;
            return Ok(Some(value.into_owned()));
        }
    }

    Ok(None)
}

fn get_attribute_value(
    bytes_start: &BytesStart<'_>,
    attribute_key: &str,
    element_name: &str,
) -> Result<String, Rectilinear> {
    find_attribute(bytes_start, attribute_key)?.ok_or_else(|| {
        error::MissingAttribute::new(element_name.into(), attribute_key.into()).into()
    })
}

/// ensure that an attribute's value is what we expect it to be, otherwise return an error with
/// some location information
fn check_attribute_value(
    bytes_start: &BytesStart<'_>,
    element_name: &str,
    attribute_name: &str,
    expected_attribute_value: &str,
) -> Result<(), Rectilinear> {
    let value = get_attribute_value(bytes_start, attribute_name, element_name)?;

    if value != expected_attribute_value {
        let unexpected_value = error::UnexpectedAttributeValue {
            element_name: element_name.into(),
            attribute_name: attribute_name.into(),
            expected_value: expected_attribute_value.into(),
            actual_value: error::ParsedNameOrBytes::Utf8(value),
        };

        return Err(unexpected_value.into());
    }

    Ok(())
}
