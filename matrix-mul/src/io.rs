//! Plain-text matrix files.
//!
//! One row per line, values separated by whitespace. Blank lines are
//! ignored. Output values are printed with 14 decimals.

use std::fmt::Write as _;
use std::io::{BufWriter, Write};
use std::path::Path;

use shm_matmul_types::Matrix;

use crate::Error;

pub fn read_matrix(path: impl AsRef<Path>) -> Result<Matrix, Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_matrix(&text, path)
}

/// Parses matrix text; `path` is only used in error messages.
pub fn parse_matrix(text: &str, path: &Path) -> Result<Matrix, Error> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let row = line
            .split_whitespace()
            .map(|field| {
                field.parse::<f64>().map_err(|_| Error::Parse {
                    path: path.to_path_buf(),
                    line: line_no,
                    value: field.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(Error::RaggedLine {
                    path: path.to_path_buf(),
                    line: line_no,
                    expected: first.len(),
                    found: row.len(),
                });
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(Error::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    Ok(Matrix::from_rows(rows)?)
}

pub fn format_matrix(matrix: &Matrix) -> String {
    let mut out = String::new();
    for row in matrix.iter_rows() {
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{value:.14}");
        }
        out.push('\n');
    }
    out
}

pub fn write_matrix(path: impl AsRef<Path>, matrix: &Matrix) -> Result<(), Error> {
    let path = path.as_ref();
    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(format_matrix(matrix).as_bytes())
        .map_err(write_err)?;
    writer.flush().map_err(write_err)
}
