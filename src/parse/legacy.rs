use super::error::{self, Legacy, ParseError};
use crate::prelude::*;

use std::str::FromStr;

/// Contents of a legacy ASCII unstructured grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyGrid {
    pub title: String,
    pub points: Vec<[f64; 3]>,
    /// point indices of every cell
    pub cells: Vec<Vec<usize>>,
    pub cell_types: Vec<u8>,
    pub cell_scalars: Option<NamedScalars>,
    pub point_scalars: Option<NamedScalars>,
}

/// a `SCALARS` section
#[derive(Debug, Clone, PartialEq)]
pub struct NamedScalars {
    pub name: String,
    pub values: Vec<f64>,
}

/// Parse a legacy ASCII unstructured grid.
pub fn read_legacy<R: BufRead>(reader: R) -> Result<LegacyGrid, Error> {
    let lines = reader.lines().collect::<Result<Vec<String>, _>>()?;
    Ok(parse_lines(&lines)?)
}

fn parse_lines(lines: &[String]) -> Result<LegacyGrid, ParseError> {
    let version = lines.first().ok_or_else(|| missing("file header"))?;
    if !version.starts_with("# vtk DataFile Version") {
        return Err(unexpected(1, "a `# vtk DataFile Version` line", version));
    }

    let title = lines.get(1).ok_or_else(|| missing("title"))?.clone();

    let mut tokens = Tokens::new(lines, 2);
    tokens.keyword("ASCII")?;
    tokens.keyword("DATASET")?;
    tokens.keyword("UNSTRUCTURED_GRID")?;

    tokens.keyword("POINTS")?;
    let n_points: usize = tokens.number("POINTS", "point count")?;
    tokens.next("POINTS")?;

    let mut points = Vec::with_capacity(tokens.capacity_for(n_points));
    for _ in 0..n_points {
        let x = tokens.number("POINTS", "coordinate")?;
        let y = tokens.number("POINTS", "coordinate")?;
        let z = tokens.number("POINTS", "coordinate")?;
        points.push([x, y, z]);
    }

    let cells_line = tokens.keyword("CELLS")?;
    let n_cells: usize = tokens.number("CELLS", "cell count")?;
    let size: usize = tokens.number("CELLS", "cell list size")?;

    let mut cells = Vec::with_capacity(tokens.capacity_for(n_cells));
    let mut read = 0;
    for _ in 0..n_cells {
        let count: usize = tokens.number("CELLS", "point count")?;
        let mut cell = Vec::with_capacity(tokens.capacity_for(count));
        for _ in 0..count {
            let (line, token) = tokens.peek("CELLS")?;
            let index: usize = tokens.number("CELLS", "point index")?;
            if index >= n_points {
                return Err(unexpected(line, &format!("a point index below {n_points}"), token));
            }
            cell.push(index);
        }
        read += count + 1;
        cells.push(cell);
    }

    if read != size {
        return Err(unexpected(
            cells_line,
            &format!("a cell list of {read} entries"),
            &size.to_string(),
        ));
    }

    tokens.keyword("CELL_TYPES")?;
    let n_types: usize = tokens.number("CELL_TYPES", "cell count")?;
    if n_types != n_cells {
        return Err(unexpected(
            tokens.line(),
            &format!("{n_cells} cell types"),
            &n_types.to_string(),
        ));
    }

    let mut cell_types = Vec::with_capacity(tokens.capacity_for(n_types));
    for _ in 0..n_types {
        cell_types.push(tokens.number("CELL_TYPES", "cell type")?);
    }

    let mut grid = LegacyGrid {
        title,
        points,
        cells,
        cell_types,
        cell_scalars: None,
        point_scalars: None,
    };

    while !tokens.is_empty() {
        let (line, attached) = tokens.next("attribute data")?;
        match attached {
            "CELL_DATA" => {
                let scalars = read_scalars(&mut tokens, "CELL_DATA", grid.cells.len())?;
                grid.cell_scalars = Some(scalars);
            }
            "POINT_DATA" => {
                let scalars = read_scalars(&mut tokens, "POINT_DATA", grid.points.len())?;
                grid.point_scalars = Some(scalars);
            }
            other => return Err(unexpected(line, "CELL_DATA or POINT_DATA", other)),
        }
    }

    Ok(grid)
}

fn read_scalars(
    tokens: &mut Tokens<'_>,
    section: &str,
    expected: usize,
) -> Result<NamedScalars, ParseError> {
    let line = tokens.line();
    let count: usize = tokens.number(section, "tuple count")?;
    if count != expected {
        return Err(unexpected(line, &format!("{expected} values"), &count.to_string()));
    }

    tokens.keyword("SCALARS")?;
    let (_, name) = tokens.next(section)?;
    let name = name.to_string();
    // data type
    tokens.next(section)?;

    // optional number of components, only single component scalars are written
    if tokens.peek(section)?.1 != "LOOKUP_TABLE" {
        let (line, components) = tokens.next(section)?;
        if components != "1" {
            return Err(unexpected(line, "1 component", components));
        }
    }

    tokens.keyword("LOOKUP_TABLE")?;
    tokens.next(section)?;

    let mut values = Vec::with_capacity(tokens.capacity_for(count));
    for _ in 0..count {
        values.push(tokens.number(section, "scalar")?);
    }

    Ok(NamedScalars { name, values })
}

/// whitespace separated tokens, remembering their (1 based) line number
struct Tokens<'a> {
    tokens: Vec<(usize, &'a str)>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(lines: &'a [String], skip: usize) -> Self {
        let tokens = lines
            .iter()
            .enumerate()
            .skip(skip)
            .flat_map(|(n, line)| line.split_ascii_whitespace().map(move |token| (n + 1, token)))
            .collect();

        Self {
            tokens,
            position: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Room for `count` entries read from the file, bounded by the tokens left to read them from.
    fn capacity_for(&self, count: usize) -> usize {
        count.min(self.tokens.len().saturating_sub(self.position))
    }

    /// line of the next token (or of the last one at the end of the file)
    fn line(&self) -> usize {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map(|(line, _)| *line)
            .unwrap_or(0)
    }

    fn peek(&self, section: &str) -> Result<(usize, &'a str), ParseError> {
        self.tokens
            .get(self.position)
            .copied()
            .ok_or_else(|| missing(section))
    }

    fn next(&mut self, section: &str) -> Result<(usize, &'a str), ParseError> {
        let token = self.peek(section)?;
        self.position += 1;
        Ok(token)
    }

    /// consume `expected` (case insensitive), returning its line
    fn keyword(&mut self, expected: &str) -> Result<usize, ParseError> {
        let (line, token) = self.next(expected)?;
        if !token.eq_ignore_ascii_case(expected) {
            return Err(unexpected(line, expected, token));
        }
        Ok(line)
    }

    fn number<T: FromStr>(&mut self, section: &str, kind: &'static str) -> Result<T, ParseError> {
        let (line, token) = self.next(section)?;
        token.parse().map_err(|_| {
            ParseError::from(Legacy::from(error::MalformedNumber::new(
                line,
                token.to_string(),
                kind,
            )))
        })
    }
}

fn missing(section: &str) -> ParseError {
    Legacy::from(error::MissingSection::new(section.to_string())).into()
}

fn unexpected(line: usize, expected: &str, actual: &str) -> ParseError {
    Legacy::from(error::UnexpectedToken::new(
        line,
        expected.to_string(),
        actual.to_string(),
    ))
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINT_CLOUD: &str = "# vtk DataFile Version 3.1
two points
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 2 FLOAT
0.0\t0.0\t0.0
1.5\t-2.0\t3.25

CELLS 2\t4
1\t0
1\t1

CELL_TYPES 2
1
1

POINT_DATA 2
SCALARS grain float
LOOKUP_TABLE default
7
8
";

    #[test]
    fn point_cloud() {
        let grid = read_legacy(POINT_CLOUD.as_bytes()).unwrap();

        assert_eq!(grid.title, "two points");
        assert_eq!(grid.points, vec![[0.0, 0.0, 0.0], [1.5, -2.0, 3.25]]);
        assert_eq!(grid.cells, vec![vec![0], vec![1]]);
        assert_eq!(grid.cell_types, vec![1, 1]);
        assert!(grid.cell_scalars.is_none());

        let scalars = grid.point_scalars.unwrap();
        assert_eq!(scalars.name, "grain");
        assert_eq!(scalars.values, vec![7.0, 8.0]);
    }

    #[test]
    fn point_index_out_of_range() {
        let broken = POINT_CLOUD.replace("1\t1\n", "1\t2\n");
        let err = read_legacy(broken.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Legacy(Legacy::UnexpectedToken(_)))));
    }

    #[test]
    fn bad_number() {
        let broken = POINT_CLOUD.replace("3.25", "3.2.5");
        let err = read_legacy(broken.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Legacy(Legacy::MalformedNumber(_)))));
    }

    #[test]
    fn truncated_file() {
        let cut = &POINT_CLOUD[..POINT_CLOUD.find("CELL_TYPES").unwrap()];
        let err = read_legacy(cut.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Legacy(Legacy::MissingSection(_)))));
    }

    #[test]
    fn huge_counts_are_errors() {
        let points = "# vtk DataFile Version 3.1\nhuge\nASCII\nDATASET UNSTRUCTURED_GRID\nPOINTS 18446744073709551615 FLOAT\n";
        let err = read_legacy(points.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Legacy(_))));

        let cells = POINT_CLOUD.replace("CELLS 2", "CELLS 18446744073709551615");
        let err = read_legacy(cells.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Legacy(_))));

        let scalars = POINT_CLOUD.replace("1\t1\n", "18446744073709551615\t1\n");
        let err = read_legacy(scalars.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::Legacy(_))));
    }

    #[test]
    fn not_a_vtk_file() {
        let err = read_legacy("hello\nworld\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
