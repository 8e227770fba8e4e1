//! Loading sample matrices from delimited text.
//!
//! One sample per line, fields separated by commas and/or whitespace. Blank
//! lines and lines starting with `#` are skipped.

use crate::error::{Result, SomError};
use log::debug;
use ndarray::Array2;
use std::fs;
use std::path::Path;

/// Reads a sample matrix from a text file.
pub fn load_samples<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let samples = parse_samples(&text)?;
    debug!(
        "Loaded {} samples with {} features from {}",
        samples.nrows(),
        samples.ncols(),
        path.display()
    );
    Ok(samples)
}

/// Parses a sample matrix from text.
pub fn parse_samples(text: &str) -> Result<Array2<f64>> {
    let mut values = Vec::new();
    let mut n_features: Option<usize> = None;
    let mut n_rows = 0;

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let before = values.len();
        for field in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
        {
            let value: f64 = field.parse().map_err(|_| {
                SomError::Parse(format!("line {}: '{}' is not a number", lineno + 1, field))
            })?;
            if !value.is_finite() {
                return Err(SomError::Parse(format!(
                    "line {}: '{}' is not a finite number",
                    lineno + 1,
                    field
                )));
            }
            values.push(value);
        }

        let width = values.len() - before;
        match n_features {
            None => n_features = Some(width),
            Some(expected) if expected != width => {
                return Err(SomError::Shape(format!(
                    "line {}: expected {} features, found {}",
                    lineno + 1,
                    expected,
                    width
                )));
            }
            Some(_) => {}
        }
        n_rows += 1;
    }

    let n_features = n_features
        .ok_or_else(|| SomError::EmptyInput("no samples found in input".to_string()))?;

    Array2::from_shape_vec((n_rows, n_features), values)
        .map_err(|e| SomError::Shape(e.to_string()))
}
