use crate::{Raster, ReliefError};
use geo::geometry::Coord;
use std::io::{self, BufRead, Write};

/// Cell value written in place of NaN holes.
pub const NODATA_VALUE: f64 = -9999.0;

/// Writes `elevations` as an ESRI ASCII grid.
///
/// Rows are written in order, so `elevations` must already be
/// north-up. The `NODATA_value` header line is only emitted when the
/// raster contains NaN cells.
pub fn write_ascii_grid<W: Write>(
    mut w: W,
    elevations: &Raster<f64>,
    lower_left: Coord<f64>,
    cell_size: f64,
) -> io::Result<()> {
    let has_holes = elevations.as_slice().iter().any(|v| v.is_nan());
    writeln!(w, "ncols {}", elevations.cols())?;
    writeln!(w, "nrows {}", elevations.rows())?;
    writeln!(w, "xllcorner {}", lower_left.x)?;
    writeln!(w, "yllcorner {}", lower_left.y)?;
    writeln!(w, "cellsize {cell_size}")?;
    if has_holes {
        writeln!(w, "NODATA_value {NODATA_VALUE}")?;
    }
    for row in elevations.iter_rows() {
        let mut cells = row.iter();
        if let Some(first) = cells.next() {
            write!(w, "{}", or_nodata(*first))?;
        }
        for cell in cells {
            write!(w, " {}", or_nodata(*cell))?;
        }
        writeln!(w)?;
    }
    w.flush()
}

fn or_nodata(val: f64) -> f64 {
    if val.is_nan() {
        NODATA_VALUE
    } else {
        val
    }
}

/// A decoded ESRI ASCII grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    pub lower_left: Coord<f64>,
    pub cell_size: f64,
    /// North-up, with `NODATA_value` cells replaced by NaN.
    pub elevations: Raster<f64>,
}

/// Reads an ESRI ASCII grid.
pub fn read_ascii_grid<R: BufRead>(reader: R) -> Result<AsciiGrid, ReliefError> {
    let mut header = Header::default();
    let mut values = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        if values.is_empty() && Header::is_key(first) {
            let value = tokens
                .next()
                .ok_or_else(|| ReliefError::AsciiGrid(format!("{first} has no value")))?;
            header.set(first, value)?;
            continue;
        }
        for token in std::iter::once(first).chain(tokens) {
            values.push(number(token)?);
        }
    }

    let cols = required("ncols", header.ncols)?;
    let rows = required("nrows", header.nrows)?;
    let lower_left = Coord {
        x: required("xllcorner", header.xllcorner)?,
        y: required("yllcorner", header.yllcorner)?,
    };
    let cell_size = required("cellsize", header.cellsize)?;
    if values.len() != rows * cols {
        return Err(ReliefError::AsciiGrid(format!(
            "expected {rows}x{cols} cells, found {}",
            values.len()
        )));
    }
    if let Some(nodata) = header.nodata {
        for val in values.iter_mut().filter(|v| **v == nodata) {
            *val = f64::NAN;
        }
    }

    Ok(AsciiGrid {
        lower_left,
        cell_size,
        elevations: Raster::new(rows, cols, values),
    })
}

#[derive(Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xllcorner: Option<f64>,
    yllcorner: Option<f64>,
    cellsize: Option<f64>,
    nodata: Option<f64>,
}

impl Header {
    const KEYS: [&'static str; 6] = [
        "ncols",
        "nrows",
        "xllcorner",
        "yllcorner",
        "cellsize",
        "nodata_value",
    ];

    fn is_key(token: &str) -> bool {
        Self::KEYS.iter().any(|key| key.eq_ignore_ascii_case(token))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ReliefError> {
        match key.to_ascii_lowercase().as_str() {
            "ncols" => self.ncols = Some(count(key, value)?),
            "nrows" => self.nrows = Some(count(key, value)?),
            "xllcorner" => self.xllcorner = Some(number(value)?),
            "yllcorner" => self.yllcorner = Some(number(value)?),
            "cellsize" => self.cellsize = Some(number(value)?),
            "nodata_value" => self.nodata = Some(number(value)?),
            _ => {
                return Err(ReliefError::AsciiGrid(format!(
                    "unsupported header {key:?}"
                )))
            }
        }
        Ok(())
    }
}

fn required<T>(key: &str, value: Option<T>) -> Result<T, ReliefError> {
    value.ok_or_else(|| ReliefError::AsciiGrid(format!("missing {key}")))
}

fn count(key: &str, token: &str) -> Result<usize, ReliefError> {
    match token.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ReliefError::AsciiGrid(format!("bad {key} {token:?}"))),
    }
}

fn number(token: &str) -> Result<f64, ReliefError> {
    token
        .parse::<f64>()
        .map_err(|_| ReliefError::AsciiGrid(format!("bad number {token:?}")))
}

#[cfg(test)]
mod tests {
    use super::{read_ascii_grid, write_ascii_grid};
    use crate::{Raster, ReliefError};
    use approx::assert_relative_eq;
    use geo::geometry::Coord;

    const LOWER_LEFT: Coord<f64> = Coord { x: 1.438, y: 43.56 };

    #[test]
    fn test_write_header_and_rows() {
        let raster = Raster::new(2, 3, vec![150.0, 152.5, 155.0, 140.0, 141.25, 143.0]);
        let mut buf = Vec::new();
        write_ascii_grid(&mut buf, &raster, LOWER_LEFT, 0.001).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "ncols 3\nnrows 2\nxllcorner 1.438\nyllcorner 43.56\ncellsize 0.001\n\
             150 152.5 155\n140 141.25 143\n"
        );
    }

    #[test]
    fn test_holes_round_trip_as_nan() {
        let raster = Raster::new(2, 2, vec![f64::NAN, 160.0, 158.0, 157.5]);
        let mut buf = Vec::new();
        write_ascii_grid(&mut buf, &raster, LOWER_LEFT, 0.002).unwrap();
        let text = std::str::from_utf8(&buf).unwrap();
        assert!(text.contains("NODATA_value -9999\n-9999 160\n"));

        let grid = read_ascii_grid(buf.as_slice()).unwrap();
        assert_eq!(grid.elevations.dimensions(), (2, 2));
        assert!(grid.elevations[(0, 0)].is_nan());
        assert_relative_eq!(grid.elevations[(1, 1)], 157.5);
        assert_relative_eq!(grid.cell_size, 0.002);
        assert_relative_eq!(grid.lower_left.x, LOWER_LEFT.x);
        assert_relative_eq!(grid.lower_left.y, LOWER_LEFT.y);
    }

    #[test]
    fn test_read_rejects_short_body() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2\n3\n";
        assert!(matches!(
            read_ascii_grid(text.as_bytes()),
            Err(ReliefError::AsciiGrid(_))
        ));
    }

    #[test]
    fn test_read_body_starting_with_nan() {
        let text = "NCOLS 2\nNROWS 2\nXLLCORNER 0\nYLLCORNER 0\nCELLSIZE 1\nnan 2\ninf 4\n";
        let grid = read_ascii_grid(text.as_bytes()).unwrap();
        assert!(grid.elevations[(0, 0)].is_nan());
        assert_relative_eq!(grid.elevations[(0, 1)], 2.0);
        assert!(grid.elevations[(1, 0)].is_infinite());
    }

    #[test]
    fn test_read_requires_header() {
        let text = "ncols 1\nnrows 1\nxllcorner 0\nyllcorner 0\n5\n";
        assert!(matches!(
            read_ascii_grid(text.as_bytes()),
            Err(ReliefError::AsciiGrid(msg)) if msg.contains("cellsize")
        ));
    }
}
