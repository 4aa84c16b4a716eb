//! # Writing vtk files
//!
//! Two flavours are supported:
//!
//! * legacy ASCII unstructured grids (`.vtk`): the reconstructed hexahedral mesh with one scalar
//!   per cell ([`write_legacy_hexahedra`]), a cloud of cell centroids ([`write_legacy_points`]) and
//!   the box spanned by the average deformation gradient ([`write_legacy_box`]).
//! * XML rectilinear grids (`.vtr`) of the undeformed grid with any number of cell arrays, inline
//!   as ascii or base64 ([`write_vtr`]).
//!
//! Writers never clean up after themselves: if a write fails half way the partial output is left
//! for the caller to discard.

use crate::mesh::HEX_CORNERS;
use crate::prelude::*;
use crate::utils::format_float;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

/// first line of every legacy file
pub const LEGACY_VERSION: &str = "# vtk DataFile Version 3.1";

/// VTK cell type of a single point
pub const VTK_VERTEX: u8 = 1;

/// VTK cell type of a linear hexahedron
pub const VTK_HEXAHEDRON: u8 = 12;

/// the encoding to use when writing an inline dataarray
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Base64,
}

impl Encoding {
    pub fn to_str(&self) -> &'static str {
        match &self {
            Self::Ascii => "ascii",
            Self::Base64 => "binary",
        }
    }
}

/// Write a reconstructed mesh with one scalar per cell as a legacy unstructured grid.
///
/// Points are listed in node order (`i` fastest, then `j`, then `k`), cells in cell order, each
/// as a linear hexahedron (type 12), and the scalars follow in the same cell order.
pub fn write_legacy_hexahedra<W: Write>(
    mut writer: W,
    mesh: &Mesh,
    scalars: &ScalarField,
    name: &str,
    title: &str,
) -> Result<(), Error> {
    let resolution = *mesh.resolution();
    scalars.check_resolution(&resolution)?;

    write_legacy_header(&mut writer, title)?;
    write_legacy_points_section(&mut writer, mesh.n_nodes(), mesh.points())?;

    let n_cells = resolution.n_cells();
    writeln!(writer, "CELLS {}\t{}", n_cells, n_cells * (HEX_CORNERS.len() + 1))?;
    for hexahedron in mesh.hexahedra() {
        write!(writer, "{}", HEX_CORNERS.len())?;
        for node in hexahedron {
            write!(writer, "\t{}", node)?;
        }
        writeln!(writer)?;
    }
    writeln!(writer)?;

    write_legacy_cell_types(&mut writer, n_cells, VTK_HEXAHEDRON)?;

    writeln!(writer)?;
    writeln!(writer, "CELL_DATA {}", n_cells)?;
    write_legacy_scalars(&mut writer, name, scalars)?;

    writer.flush()?;
    Ok(())
}

/// Write cell centroids as a point cloud (one vertex cell per centroid) with one scalar per point.
pub fn write_legacy_points<W: Write>(
    mut writer: W,
    centroids: &VectorField,
    scalars: &ScalarField,
    name: &str,
    title: &str,
) -> Result<(), Error> {
    let resolution = centroids.grid();
    scalars.check_resolution(&resolution)?;

    let n_points = resolution.n_cells();
    let points = resolution.cells().map(|(x, y, z)| {
        let point = centroids.vector(x, y, z);
        [point.x, point.y, point.z]
    });

    write_legacy_header(&mut writer, title)?;
    write_legacy_points_section(&mut writer, n_points, points)?;
    write_legacy_vertices(&mut writer, n_points)?;

    writeln!(writer)?;
    writeln!(writer, "POINT_DATA {}", n_points)?;
    write_legacy_scalars(&mut writer, name, scalars)?;

    writer.flush()?;
    Ok(())
}

/// Write the 8 corners of the box `dimension`, mapped by `average`, as vertex cells.
///
/// Opened next to a deformed mesh this shows the homogeneous part of the deformation.
pub fn write_legacy_box<W: Write>(
    mut writer: W,
    dimension: &Dimension,
    average: &Matrix3<f64>,
    title: &str,
) -> Result<(), Error> {
    let corners = HEX_CORNERS.map(|(a, b, c)| {
        let corner = Vector3::new(
            a as f64 * dimension.0[0],
            b as f64 * dimension.0[1],
            c as f64 * dimension.0[2],
        );
        let mapped = average * corner;
        [mapped.x, mapped.y, mapped.z]
    });

    write_legacy_header(&mut writer, title)?;
    write_legacy_points_section(&mut writer, corners.len(), corners)?;
    write_legacy_vertices(&mut writer, corners.len())?;

    writer.flush()?;
    Ok(())
}

fn write_legacy_header<W: Write>(writer: &mut W, title: &str) -> Result<(), Error> {
    // the title has to stay on its own line
    let title: String = title
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    writeln!(writer, "{}", LEGACY_VERSION)?;
    writeln!(writer, "{}", title)?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET UNSTRUCTURED_GRID")?;
    Ok(())
}

fn write_legacy_points_section<W, I>(writer: &mut W, n_points: usize, points: I) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator<Item = [f64; 3]>,
{
    writeln!(writer, "POINTS {} FLOAT", n_points)?;
    for [x, y, z] in points {
        writeln!(
            writer,
            "{}\t{}\t{}",
            format_float(x),
            format_float(y),
            format_float(z)
        )?;
    }
    writeln!(writer)?;
    Ok(())
}

fn write_legacy_vertices<W: Write>(writer: &mut W, n_points: usize) -> Result<(), Error> {
    writeln!(writer, "CELLS {}\t{}", n_points, n_points * 2)?;
    for point in 0..n_points {
        writeln!(writer, "1\t{}", point)?;
    }
    writeln!(writer)?;
    write_legacy_cell_types(writer, n_points, VTK_VERTEX)
}

fn write_legacy_cell_types<W: Write>(writer: &mut W, n_cells: usize, cell_type: u8) -> Result<(), Error> {
    writeln!(writer, "CELL_TYPES {}", n_cells)?;
    for _ in 0..n_cells {
        writeln!(writer, "{}", cell_type)?;
    }
    Ok(())
}

fn write_legacy_scalars<W: Write>(writer: &mut W, name: &str, scalars: &ScalarField) -> Result<(), Error> {
    writeln!(writer, "SCALARS {} float", legacy_name(name))?;
    writeln!(writer, "LOOKUP_TABLE default")?;
    for value in scalars.flat_values() {
        writeln!(writer, "{}", format_float(value))?;
    }
    Ok(())
}

/// array names in legacy files are single tokens
fn legacy_name(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    if name.is_empty() {
        "scalars".into()
    } else {
        name
    }
}

/// Write an undeformed rectilinear grid with its cell arrays as a `.vtr` file.
///
/// Every array has to cover all cells of `data.domain`.
pub fn write_vtr<W: Write>(
    writer: W,
    data: &VtkData<Rectilinear3D>,
    encoding: Encoding,
) -> Result<(), Error> {
    data.domain.check_locations()?;

    let n_cells = data.domain.spans.n_cells();
    for array in &data.cell_data {
        if array.components == 0 || array.values.len() != n_cells * array.components {
            return Err(ShapeMismatch::new(
                format!("{} values with {} components each", n_cells, array.components),
                format!("{} values in array `{}`", array.values.len(), array.name),
            )
            .into());
        }
    }

    let mut writer = Writer::new_with_indent(writer, b' ', 2);
    let span_str = data.domain.spans.to_string();

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

    let vtk_file = BytesStart::new("VTKFile").with_attributes([
        ("type", "RectilinearGrid"),
        ("version", "1.0"),
        ("byte_order", "LittleEndian"),
        ("header_type", "UInt64"),
    ]);
    writer.write_event(Event::Start(vtk_file))?;

    let grid = BytesStart::new("RectilinearGrid").with_attributes([("WholeExtent", span_str.as_str())]);
    writer.write_event(Event::Start(grid))?;

    let piece = BytesStart::new("Piece").with_attributes([("Extent", span_str.as_str())]);
    writer.write_event(Event::Start(piece))?;

    writer.write_event(Event::Start(BytesStart::new("CellData")))?;
    for array in &data.cell_data {
        write_inline_dataarray(&mut writer, &array.name, array.components, &array.values, encoding)?;
    }
    writer.write_event(Event::End(BytesEnd::new("CellData")))?;

    let mesh = &data.domain.mesh;
    writer.write_event(Event::Start(BytesStart::new("Coordinates")))?;
    write_inline_dataarray(&mut writer, "X", 1, &mesh.x_locations, encoding)?;
    write_inline_dataarray(&mut writer, "Y", 1, &mesh.y_locations, encoding)?;
    write_inline_dataarray(&mut writer, "Z", 1, &mesh.z_locations, encoding)?;
    writer.write_event(Event::End(BytesEnd::new("Coordinates")))?;

    writer.write_event(Event::End(BytesEnd::new("Piece")))?;
    writer.write_event(Event::End(BytesEnd::new("RectilinearGrid")))?;
    writer.write_event(Event::End(BytesEnd::new("VTKFile")))?;

    writer.inner().flush()?;
    Ok(())
}

/// write a single (inline) array of data, such as the deformation gradient, to the vtk file.
pub fn write_inline_dataarray<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    components: usize,
    values: &[f64],
    encoding: Encoding,
) -> Result<(), Error> {
    let components = components.to_string();
    let header = BytesStart::new("DataArray").with_attributes([
        ("type", "Float64"),
        ("NumberOfComponents", components.as_str()),
        ("Name", name),
        ("format", encoding.to_str()),
    ]);
    writer.write_event(Event::Start(header))?;

    let data = match encoding {
        Encoding::Ascii => values
            .iter()
            .map(|x| format_float(*x))
            .collect::<Vec<_>>()
            .join(" "),
        Encoding::Base64 => {
            let mut byte_data: Vec<u8> = Vec::with_capacity((values.len() + 1) * 8);

            // UInt64 header holding the number of data bytes
            byte_data.extend_from_slice(&((values.len() * 8) as u64).to_le_bytes());

            for float in values {
                byte_data.extend_from_slice(&float.to_le_bytes());
            }

            base64::encode(byte_data.as_slice())
        }
    };

    writer.write_event(Event::Text(BytesText::new(&data)))?;
    writer.write_event(Event::End(BytesEnd::new("DataArray")))?;

    Ok(())
}
