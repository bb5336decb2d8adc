//! Loading 1D tables from two-column text.
//!
//! Each data line holds `x` and `f` separated by whitespace and/or commas.
//! Blank lines and lines starting with `#` are skipped, as is anything after
//! a `#` on a data line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use super::{LookupTable, TableOptions};
use crate::error::{Error, Result};

/// Parse two-column text into `(x, f)`.
pub(crate) fn read_columns<R: BufRead>(reader: R) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut xs = Vec::new();
    let mut fs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;
        let data = line.split('#').next().unwrap_or("").trim();
        if data.is_empty() {
            continue;
        }
        let fields: Vec<&str> = data
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        if fields.len() != 2 {
            return Err(Error::Parse {
                line: lineno,
                message: format!("expected 2 columns, found {}", fields.len()),
            });
        }
        let parse = |s: &str| {
            s.parse::<f64>().map_err(|e| Error::Parse {
                line: lineno,
                message: format!("invalid number `{s}`: {e}"),
            })
        };
        xs.push(parse(fields[0])?);
        fs.push(parse(fields[1])?);
    }
    Ok((xs, fs))
}

impl LookupTable {
    /// Build a table from two-column text, scaling every `f` by `amplitude`.
    pub fn from_reader<R: BufRead>(reader: R, options: TableOptions, amplitude: f64) -> Result<Self> {
        let (x, mut f) = read_columns(reader)?;
        if amplitude != 1.0 {
            f.iter_mut().for_each(|v| *v *= amplitude);
        }
        LookupTable::new(x, f, options)
    }

    /// Build a table from a two-column text file; see [`LookupTable::from_reader`].
    pub fn from_file<P: AsRef<Path>>(path: P, options: TableOptions, amplitude: f64) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading lookup table from {}", path.display());
        let file = File::open(path)?;
        LookupTable::from_reader(BufReader::new(file), options, amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Interpolant;
    use std::io::Cursor;

    #[test]
    fn whitespace_and_commas() {
        let text = "# x f\n0 1\n1,2\n\n2 ,  3  # trailing\n   3\t4\n";
        let (x, f) = read_columns(Cursor::new(text)).unwrap();
        assert_eq!(x, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(f, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn wrong_column_count_names_line() {
        let text = "0 1\n1 2 3\n";
        let err = read_columns(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn bad_number_is_a_parse_error() {
        let err = read_columns(Cursor::new("0 one\n")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error on line 1: invalid number `one`: invalid float literal"
        );
    }

    #[test]
    fn amplitude_scales_values() {
        let text = "0 1\n1 2\n2 4\n";
        let t = LookupTable::from_reader(
            Cursor::new(text),
            TableOptions::new(Interpolant::Linear),
            2.5,
        )
        .unwrap();
        assert_eq!(t.f(), &[2.5, 5.0, 10.0]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LookupTable::from_file(
            "/nonexistent/table.dat",
            TableOptions::default(),
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
