//! positional reads of per-cell fields
//!
//! An increment block is `[marker: 4 bytes][record of cell 0]..[record of cell n-1][marker: 4
//! bytes]`, every record holding `record_size` 4 byte floats and the cells stored x fastest. A
//! quantity (say the deformation gradient) sits at a fixed element offset inside every record.
//!
//! The readers seek to the absolute byte position of every cell before reading it, so their
//! result never depends on where a previous read left the stream.

use crate::prelude::*;
use crate::utils::{bytes_to_f32, WORD};
use std::fs::File;
use std::path::Path;

/// Read one scalar per cell.
///
/// * `distance`: stride between two cell records in 4 byte words (the record size)
/// * `start`: byte position of the leading marker of the increment block
/// * `offset`: element offset of the scalar inside a record
pub fn read_scalar<R: Read + Seek>(
    reader: &mut R,
    resolution: &Resolution,
    distance: usize,
    start: u64,
    offset: usize,
) -> Result<ScalarField, Error> {
    let mut field = ScalarField::zeros(resolution);

    read_cells(reader, resolution, distance, start, offset, 1, |(x, y, z), values| {
        field[[x, y, z]] = values[0] as f64;
    })?;

    Ok(field)
}

/// Read one 3 x 3 tensor per cell, stored as 9 consecutive floats starting at `offset`
/// (row by row). See [`read_scalar`] for the arguments.
pub fn read_tensor<R: Read + Seek>(
    reader: &mut R,
    resolution: &Resolution,
    distance: usize,
    start: u64,
    offset: usize,
) -> Result<TensorField, Error> {
    let mut field = TensorField::zeros(resolution);

    read_cells(reader, resolution, distance, start, offset, 9, |(x, y, z), values| {
        for i in 0..3 {
            for j in 0..3 {
                field[[x, y, z, i, j]] = values[3 * i + j] as f64;
            }
        }
    })?;

    Ok(field)
}

/// Walk the cells in file order and hand `width` floats of every record to `store`.
fn read_cells<R, F>(
    reader: &mut R,
    resolution: &Resolution,
    distance: usize,
    start: u64,
    offset: usize,
    width: usize,
    mut store: F,
) -> Result<(), Error>
where
    R: Read + Seek,
    F: FnMut((usize, usize, usize), &[f32]),
{
    check_record_layout(distance, offset, width)?;

    let mut bytes = vec![0u8; width * WORD];
    let mut values = vec![0f32; width];

    for (n, cell) in resolution.cells().enumerate() {
        let position = start + (WORD + (n * distance + offset) * WORD) as u64;

        reader.seek(SeekFrom::Start(position))?;
        reader.read_exact(&mut bytes)?;

        for (value, word) in values.iter_mut().zip(bytes.chunks(WORD)) {
            *value = bytes_to_f32(word);
        }

        store(cell, &values);
    }

    Ok(())
}

/// A quantity of `width` values at `offset` has to fit inside a record of `distance` values.
fn check_record_layout(distance: usize, offset: usize, width: usize) -> Result<(), ShapeMismatch> {
    if distance == 0 {
        return Err(ShapeMismatch::new(
            "at least one value per cell record".into(),
            "a record size of 0".into(),
        ));
    }

    if offset + width > distance {
        return Err(ShapeMismatch::new(
            format!("{width} values at offset {offset} inside the record"),
            format!("a record of {distance} values"),
        ));
    }

    Ok(())
}

/// An open result file: the decoded header plus the stream it was read from.
///
/// Every read takes the increment it refers to, there is no notion of a "current" increment.
#[derive(Debug)]
pub struct ResultFile<R = File> {
    header: Header,
    reader: R,
}

impl ResultFile<File> {
    /// Open a `*.spectralOut` file and decode its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        log::debug!("opening result file {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> ResultFile<R> {
    /// Decode the header at the start of `reader`.
    pub fn from_reader(mut reader: R) -> Result<Self, Error> {
        let header = Header::scan(&mut reader)?;
        Ok(Self { header, reader })
    }

    /// Wrap a stream whose header was already decoded elsewhere (for example a second handle on
    /// the same file).
    pub fn with_header(reader: R, header: Header) -> Self {
        Self { header, reader }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// give back the underlying stream
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// read the scalar at element `offset` of every cell for one increment
    pub fn read_scalar(&mut self, increment: usize, offset: usize) -> Result<ScalarField, Error> {
        let start = self.header.increment_offset(increment)?;
        read_scalar(
            &mut self.reader,
            &self.header.resolution,
            self.header.record_size,
            start,
            offset,
        )
    }

    /// read the tensor starting at element `offset` of every cell for one increment
    pub fn read_tensor(&mut self, increment: usize, offset: usize) -> Result<TensorField, Error> {
        let start = self.header.increment_offset(increment)?;
        read_tensor(
            &mut self.reader,
            &self.header.resolution,
            self.header.record_size,
            start,
            offset,
        )
    }

    /// A single value `index` of the record of `cell` (linear, file order).
    pub fn cell_scalar(&mut self, increment: usize, cell: usize, index: usize) -> Result<f32, Error> {
        self.check_cell(cell)?;
        check_record_layout(self.header.record_size, index, 1)?;

        let start = self.header.increment_offset(increment)?;
        let position =
            start + (WORD + (cell * self.header.record_size + index) * WORD) as u64;

        let mut bytes = [0u8; WORD];
        self.reader.seek(SeekFrom::Start(position))?;
        self.reader.read_exact(&mut bytes)?;

        Ok(f32::from_ne_bytes(bytes))
    }

    /// The complete record of one cell, useful to find out where quantities are stored.
    pub fn cell_record(&mut self, increment: usize, cell: usize) -> Result<Vec<f32>, Error> {
        self.check_cell(cell)?;
        check_record_layout(self.header.record_size, 0, 1)?;

        let start = self.header.increment_offset(increment)?;
        let position = start + (WORD + cell * self.header.record_size * WORD) as u64;

        let mut bytes = vec![0u8; self.header.record_size * WORD];
        self.reader.seek(SeekFrom::Start(position))?;
        self.reader.read_exact(&mut bytes)?;

        Ok(bytes.chunks(WORD).map(bytes_to_f32).collect())
    }

    fn check_cell(&self, cell: usize) -> Result<(), ShapeMismatch> {
        if cell >= self.header.n_cells() {
            return Err(ShapeMismatch::new(
                format!("a cell index below {}", self.header.n_cells()),
                format!("cell {cell}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// a stream with `prefix` junk bytes, then one increment block whose values are
    /// `cell * 100 + element`
    fn block(resolution: &Resolution, record_size: usize, prefix: usize) -> Cursor<Vec<u8>> {
        let mut bytes = vec![0xAB; prefix];
        bytes.extend_from_slice(&[0; WORD]);
        for cell in 0..resolution.n_cells() {
            for element in 0..record_size {
                let value = (cell * 100 + element) as f32;
                bytes.extend_from_slice(&value.to_ne_bytes());
            }
        }
        bytes.extend_from_slice(&[0; WORD]);
        Cursor::new(bytes)
    }

    #[test]
    fn scalar_follows_file_order() {
        let res = Resolution::new(3, 2, 2).unwrap();
        let mut stream = block(&res, 5, 11);

        let field = read_scalar(&mut stream, &res, 5, 11, 4).unwrap();

        for (x, y, z) in res.cells() {
            let cell = res.cell_index(x, y, z);
            assert_eq!(field[[x, y, z]], (cell * 100 + 4) as f64);
        }
    }

    #[test]
    fn tensor_is_read_row_by_row() {
        let res = Resolution::new(2, 2, 1).unwrap();
        let mut stream = block(&res, 12, 0);

        let field = read_tensor(&mut stream, &res, 12, 0, 2).unwrap();

        let t = field.tensor(1, 1, 0);
        assert_eq!(t[(0, 0)], 302.0);
        assert_eq!(t[(0, 2)], 304.0);
        assert_eq!(t[(2, 1)], 309.0);
    }

    #[test]
    fn zero_record_size_is_a_shape_mismatch() {
        let res = Resolution::new(1, 1, 1).unwrap();
        let mut stream = block(&res, 0, 0);

        let err = read_scalar(&mut stream, &res, 0, 0, 0).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn tensor_past_end_of_record_is_a_shape_mismatch() {
        let res = Resolution::new(1, 1, 1).unwrap();
        let mut stream = block(&res, 10, 0);

        let err = read_tensor(&mut stream, &res, 10, 0, 2).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn short_stream_is_an_io_error() {
        let res = Resolution::new(2, 2, 2).unwrap();
        let mut stream = block(&res, 3, 0);
        stream.get_mut().truncate(40);

        let err = read_scalar(&mut stream, &res, 3, 0, 1).unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("expected an io error, got {other}"),
        }
    }
}
