//! decoding the tagged header of a `*.spectralOut` result file
//!
//! Only the first [`HEADER_WINDOW`] bytes of a file are ever looked at. Inside that window each
//! field of [`schema::SCHEMA`] is located by its literal tag, and the start of the increment
//! payload is found from the `eoh` marker.

mod error;
pub mod schema;

pub use error::{HeaderError, OutOfRange};

use crate::prelude::*;
use num_traits::ToPrimitive;
use schema::{FieldDescriptor, Value};

/// number of leading bytes of a result file scanned for header information
pub const HEADER_WINDOW: usize = 2048;

/// Immutable metadata of a result file.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// name of the load case the simulation ran
    pub title: String,
    pub working_dir: String,
    pub geometry: String,
    /// number of increments of the load case. Blocks `0..=increments` are stored, block 0 being
    /// the initial state.
    pub increments: usize,
    /// number of 4 byte values stored per cell and increment
    pub record_size: usize,
    pub resolution: Resolution,
    pub dimension: Dimension,
    /// byte position of the first increment block
    pub data_offset: u64,
    /// tags of the header records in the order they appear in the window
    pub record_order: Vec<&'static str>,
}

impl Header {
    /// Create a header for a new result stream. The data offset is the length of the encoded
    /// header.
    pub fn new(
        title: impl Into<String>,
        working_dir: impl Into<String>,
        geometry: impl Into<String>,
        increments: usize,
        record_size: usize,
        resolution: Resolution,
        dimension: Dimension,
    ) -> Self {
        let mut header = Self {
            title: title.into(),
            working_dir: working_dir.into(),
            geometry: geometry.into(),
            increments,
            record_size,
            resolution,
            dimension,
            data_offset: 0,
            record_order: schema::SCHEMA.iter().map(|field| field.tag).collect(),
        };
        header.data_offset = header.encode().len() as u64;
        header
    }

    /// Read the header window from the start of `reader` and decode it.
    pub fn scan<R: Read + Seek>(reader: &mut R) -> Result<Self, Error> {
        reader.seek(SeekFrom::Start(0))?;

        let mut window = Vec::with_capacity(HEADER_WINDOW);
        reader
            .by_ref()
            .take(HEADER_WINDOW as u64)
            .read_to_end(&mut window)?;

        let header = Self::decode(&window)?;
        Ok(header)
    }

    /// Decode a header from (at most) the first [`HEADER_WINDOW`] bytes of `window`.
    pub fn decode(window: &[u8]) -> Result<Self, HeaderError> {
        let window = &window[..window.len().min(HEADER_WINDOW)];

        let title = decode_text(window, &schema::TITLE)?;
        let working_dir = decode_text(window, &schema::WORKING_DIR)?;
        let geometry = decode_text(window, &schema::GEOMETRY)?;
        let increments = decode_count(window, &schema::INCREMENTS)?;
        let record_size = decode_count(window, &schema::RECORD_SIZE)?;

        let res = decode_ints(window, &schema::RESOLUTION)?;
        let mut cells = [0; 3];
        for (n, value) in res.iter().enumerate() {
            cells[n] = value
                .to_usize()
                .filter(|v| *v > 0)
                .ok_or_else(|| OutOfRange::new(schema::RESOLUTION.tag, "positive", *value as f64))?;
        }
        // every axis is positive at this point
        let resolution = Resolution {
            nx: cells[0],
            ny: cells[1],
            nz: cells[2],
        };

        let dim = decode_floats(window, &schema::DIMENSION)?;
        for value in dim.iter() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(OutOfRange::new(
                    schema::DIMENSION.tag,
                    "positive and finite",
                    *value as f64,
                )
                .into());
            }
        }
        let dimension = Dimension::new(dim[0] as f64, dim[1] as f64, dim[2] as f64);

        // every tag was found above
        let mut located: Vec<(usize, &'static str)> = schema::SCHEMA
            .iter()
            .filter_map(|field| schema::find_tag(window, field).map(|at| (at, field.tag)))
            .collect();
        located.sort_unstable();
        let record_order = located.into_iter().map(|(_, tag)| tag).collect();

        let data_offset = schema::find_data_offset(window)?;

        log::debug!(
            "decoded header: resolution {resolution}, dimension {dimension}, {record_size} values per cell, payload at byte {data_offset}"
        );

        Ok(Self {
            title,
            working_dir,
            geometry,
            increments,
            record_size,
            resolution,
            dimension,
            data_offset,
            record_order,
        })
    }

    /// Serialize the header as the solver does: one record per schema field in
    /// [`record_order`](Self::record_order), closed by the `eoh` record. The result ends exactly
    /// at `data_offset` for headers produced by this routine.
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::new();

        for field in self.record_order.iter().filter_map(|tag| schema::descriptor(tag)) {
            let payload = schema::encode_value(&self.value(&field));
            schema::encode_record(&mut buffer, field.tag, &payload);
        }

        schema::encode_record(&mut buffer, schema::END_OF_HEADER, &[]);
        buffer
    }

    /// the typed value stored for one schema field
    fn value(&self, field: &FieldDescriptor) -> Value {
        match field.tag {
            t if t == schema::TITLE.tag => Value::Text(self.title.clone()),
            t if t == schema::WORKING_DIR.tag => Value::Text(self.working_dir.clone()),
            t if t == schema::GEOMETRY.tag => Value::Text(self.geometry.clone()),
            t if t == schema::RESOLUTION.tag => Value::Ints(
                self.resolution
                    .as_array()
                    .iter()
                    .map(|n| *n as i32)
                    .collect(),
            ),
            t if t == schema::DIMENSION.tag => {
                Value::Floats(self.dimension.0.iter().map(|d| *d as f32).collect())
            }
            t if t == schema::RECORD_SIZE.tag => Value::Ints(vec![self.record_size as i32]),
            _ => Value::Ints(vec![self.increments as i32]),
        }
    }

    /// number of cells of the grid
    pub fn n_cells(&self) -> usize {
        self.resolution.n_cells()
    }

    /// number of nodes of a mesh on the grid
    pub fn n_nodes(&self) -> usize {
        self.resolution.n_nodes()
    }

    /// bytes of one increment block including its two record markers
    pub fn increment_len(&self) -> u64 {
        (self.record_size * self.n_cells() * utils::WORD + 2 * utils::WORD) as u64
    }

    /// index of the last stored increment block
    pub fn last_increment(&self) -> usize {
        self.increments
    }

    /// Byte position of the leading record marker of increment block `increment`.
    ///
    /// The solver stores the initial state as block 0 in front of the `increments` blocks of the
    /// load case, so `increments + 1` blocks are addressable, one more than the header count
    /// alone suggests.
    pub fn increment_offset(&self, increment: usize) -> Result<u64, Error> {
        if increment > self.last_increment() {
            return Err(Error::IncrementOutOfRange {
                increment,
                last: self.last_increment(),
            });
        }

        Ok(self.data_offset + increment as u64 * self.increment_len())
    }
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "title: {}", self.title)?;
        writeln!(f, "workdir: {}", self.working_dir)?;
        writeln!(f, "geometry: {}", self.geometry)?;
        writeln!(f, "increments: {}", self.increments)?;
        writeln!(f, "nodes: {}", self.n_nodes())?;
        writeln!(f, "resolution: {}", self.resolution)?;
        writeln!(f, "dimension: {}", self.dimension)?;
        writeln!(f, "elements: {}", self.n_cells())?;
        writeln!(f, "elemental scalars: {}", self.record_size)?;
        write!(f, "end of header: {}", self.data_offset)
    }
}

fn decode_text(window: &[u8], field: &FieldDescriptor) -> Result<String, HeaderError> {
    match schema::decode_value(window, field)? {
        Value::Text(text) => Ok(text),
        _ => unreachable!("text descriptor decodes to text"),
    }
}

fn decode_ints(window: &[u8], field: &FieldDescriptor) -> Result<Vec<i32>, HeaderError> {
    match schema::decode_value(window, field)? {
        Value::Ints(ints) => Ok(ints),
        _ => unreachable!("int descriptor decodes to ints"),
    }
}

fn decode_floats(window: &[u8], field: &FieldDescriptor) -> Result<Vec<f32>, HeaderError> {
    match schema::decode_value(window, field)? {
        Value::Floats(floats) => Ok(floats),
        _ => unreachable!("float descriptor decodes to floats"),
    }
}

/// a single non-negative integer
fn decode_count(window: &[u8], field: &FieldDescriptor) -> Result<usize, HeaderError> {
    let value = decode_ints(window, field)?[0];
    value
        .to_usize()
        .ok_or_else(|| OutOfRange::new(field.tag, "non-negative", value as f64).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header::new(
            "shear.load",
            "/scratch/dipl32",
            "dipl32",
            240,
            92,
            Resolution::new(32, 32, 16).unwrap(),
            Dimension::new(1.0, 1.0, 0.5),
        )
    }

    #[test]
    fn encode_then_decode() {
        let header = header();
        let bytes = header.encode();
        assert_eq!(bytes.len() as u64, header.data_offset);

        let decoded = Header::decode(&bytes).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn decode_then_encode_reproduces_window() {
        let window = header().encode();
        let reencoded = Header::decode(&window).unwrap().encode();
        assert_eq!(window, reencoded);
    }

    #[test]
    fn missing_resolution_is_an_error() {
        let header = header();
        let mut bytes = Vec::new();
        for field in schema::SCHEMA.iter().filter(|f| f.tag != "resolution") {
            let payload = schema::encode_value(&header.value(field));
            schema::encode_record(&mut bytes, field.tag, &payload);
        }
        schema::encode_record(&mut bytes, schema::END_OF_HEADER, &[]);

        let err = Header::decode(&bytes).unwrap_err();
        assert!(matches!(err, HeaderError::MissingTag { tag: "resolution", .. }));
    }

    #[test]
    fn record_order_survives_round_trip() {
        let header = header();
        let mut window = Vec::new();
        let order = [
            "increments",
            "load",
            "workingdir",
            "geometry",
            "resolution",
            "dimension",
            "materialpoint_sizeResults",
        ];
        for tag in order {
            let field = schema::descriptor(tag).unwrap();
            schema::encode_record(&mut window, tag, &schema::encode_value(&header.value(&field)));
        }
        schema::encode_record(&mut window, schema::END_OF_HEADER, &[]);

        let decoded = Header::decode(&window).unwrap();
        assert_eq!(decoded.record_order, order.to_vec());
        assert_eq!(decoded.increments, 240);
        assert_eq!(decoded.data_offset, window.len() as u64);
        assert_eq!(decoded.encode(), window);
    }

    #[test]
    fn degenerate_dimension_is_out_of_range() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut header = header();
            header.dimension = Dimension::new(1.0, 1.0, bad);

            let err = Header::decode(&header.encode()).unwrap_err();
            assert!(matches!(err, HeaderError::OutOfRange(_)));
        }
    }

    #[test]
    fn tags_past_the_window_are_not_seen() {
        let header = header();
        let mut bytes = vec![0u8; HEADER_WINDOW];
        bytes.extend(header.encode());

        let err = Header::decode(&bytes).unwrap_err();
        assert!(matches!(err, HeaderError::MissingTag { .. }));
    }

    #[test]
    fn zero_resolution_is_out_of_range() {
        let mut header = header();
        header.resolution.ny = 0;
        let bytes = header.encode();

        let err = Header::decode(&bytes).unwrap_err();
        assert!(matches!(err, HeaderError::OutOfRange(_)));
    }

    #[test]
    fn increment_offsets_are_contiguous() {
        let header = header();
        let block = (92 * 32 * 32 * 16 * 4 + 8) as u64;

        assert_eq!(header.increment_offset(0).unwrap(), header.data_offset);
        assert_eq!(
            header.increment_offset(3).unwrap(),
            header.data_offset + 3 * block
        );
        assert!(header.increment_offset(241).is_err());
    }

    #[test]
    fn display_lists_geometry() {
        let text = header().to_string();
        assert!(text.contains("resolution: 32,32,16"));
        assert!(text.contains("elements: 16384"));
        assert!(text.contains("nodes: 18513"));
    }
}
