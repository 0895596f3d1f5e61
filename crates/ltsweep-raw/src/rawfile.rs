//! Parser for the LTspice rawfile format.
//!
//! A rawfile is a text header followed by a data section. The header is
//! UTF-16LE for current LTspice releases and 8-bit text for old ones:
//!
//! - Title: circuit file
//! - Date: run timestamp
//! - Plotname: analysis type
//! - Flags: `real`/`complex` plus `forward`, `log`, `stepped`, `double`, ...
//! - No. Variables / No. Points
//! - Offset, Command
//! - Variables: one `index name type` line per column
//! - `Binary:` or `Values:` marker before data
//!
//! Binary complex data stores every variable as two little-endian f64.
//! Binary real data stores the axis as f64 and the other traces as f32,
//! unless the `double` flag is present.

use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::text::{TextWidth, decode_as};
use crate::types::{AxisKind, RawFile, RawHeader, RawVariable};

/// Parse a rawfile from bytes.
pub fn parse_rawfile(data: &[u8]) -> Result<RawFile> {
    let width = TextWidth::detect(data);
    let (header_text, data_start) = split_header(data, width)?;
    let header = parse_header(&header_text)?;

    if header.is_fastaccess() {
        return Err(Error::UnsupportedRawfile(
            "fastaccess layout; re-run without the FastAccess conversion".to_string(),
        ));
    }

    let mut columns = if header.is_binary {
        parse_binary_data(&data[data_start..], &header)?
    } else {
        let body = decode_as(width, &data[data_start..]);
        parse_ascii_data(&body, &header)?
    };

    // LTspice flags compressed time points with the sign bit
    if matches!(
        header.variables.first().map(|v| AxisKind::from_var_type(&v.var_type)),
        Some(AxisKind::Time)
    ) {
        if let Some(axis) = columns.first_mut() {
            for sample in axis.iter_mut() {
                sample.re = sample.re.abs();
            }
        }
    }

    log::debug!(
        "parsed rawfile '{}': {} variables, {} points",
        header.plotname,
        header.num_variables,
        header.num_points
    );

    Ok(RawFile::from_columns(header, columns))
}

/// Decode header lines up to and including the data marker.
///
/// Returns the header text and the byte offset where the data section starts.
fn split_header(data: &[u8], width: TextWidth) -> Result<(String, usize)> {
    let unit = width.unit();
    let mut pos = if width == TextWidth::Utf16Le && data.starts_with(&[0xFF, 0xFE]) {
        2
    } else {
        0
    };

    let mut header = String::new();
    let mut line = String::new();

    while pos + unit <= data.len() {
        let code = match width {
            TextWidth::Utf16Le => u32::from(u16::from_le_bytes([data[pos], data[pos + 1]])),
            TextWidth::Narrow => u32::from(data[pos]),
        };
        pos += unit;

        let ch = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
        if ch != '\n' {
            line.push(ch);
            continue;
        }

        let trimmed = line.trim_end_matches('\r');
        header.push_str(trimmed);
        header.push('\n');
        if trimmed.starts_with("Binary:") || trimmed.starts_with("Values:") {
            return Ok((header, pos));
        }
        line.clear();
    }

    Err(Error::MissingDataMarker)
}

/// Parse the header section of the rawfile.
fn parse_header(text: &str) -> Result<RawHeader> {
    let mut header = RawHeader::default();
    let mut in_variables = false;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if in_variables {
            if line.starts_with("Binary:") || line.starts_with("Values:") {
                header.is_binary = line.starts_with("Binary:");
                break;
            }
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                let index = parts[0].parse().map_err(|_| Error::InvalidHeader {
                    field: "Variables",
                    value: line.to_string(),
                })?;
                header.variables.push(RawVariable {
                    index,
                    name: parts[1].to_string(),
                    var_type: parts[2].to_string(),
                });
            }
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Title" => header.title = value.to_string(),
            "Date" => header.date = Some(value.to_string()),
            "Plotname" => header.plotname = value.to_string(),
            "Flags" => {
                header.flags = value.split_whitespace().map(str::to_lowercase).collect();
            }
            "No. Variables" => header.num_variables = parse_count("No. Variables", value)?,
            "No. Points" => header.num_points = parse_count("No. Points", value)?,
            "Offset" => {
                header.offset = value.parse().map_err(|_| Error::InvalidHeader {
                    field: "Offset",
                    value: value.to_string(),
                })?;
            }
            "Command" => header.command = Some(value.to_string()),
            "Variables" => in_variables = true,
            "Binary" | "Values" => {
                header.is_binary = key.trim() == "Binary";
                break;
            }
            _ => {}
        }
    }

    if header.variables.len() != header.num_variables {
        return Err(Error::VariableCountMismatch {
            declared: header.num_variables,
            listed: header.variables.len(),
        });
    }

    Ok(header)
}

fn parse_count(field: &'static str, value: &str) -> Result<usize> {
    value.parse().map_err(|_| Error::InvalidHeader {
        field,
        value: value.to_string(),
    })
}

/// Parse binary format data section into per-variable columns.
fn parse_binary_data(data: &[u8], header: &RawHeader) -> Result<Vec<Vec<Complex64>>> {
    let num_vars = header.num_variables;
    let complex = header.is_complex();
    if num_vars == 0 {
        return Ok(Vec::new());
    }

    // Byte width of each variable within one point
    let widths: Vec<usize> = (0..num_vars)
        .map(|i| {
            if complex {
                16
            } else if i == 0 || header.is_double() {
                8
            } else {
                4
            }
        })
        .collect();
    let bytes_per_point: usize = widths.iter().sum();

    let expected = bytes_per_point * header.num_points;
    if data.len() < expected {
        return Err(Error::Truncated {
            expected,
            actual: data.len(),
        });
    }

    let mut columns: Vec<Vec<Complex64>> = (0..num_vars)
        .map(|_| Vec::with_capacity(header.num_points))
        .collect();

    for point in data[..expected].chunks_exact(bytes_per_point) {
        let mut offset = 0;
        for (column, &width) in columns.iter_mut().zip(&widths) {
            let field = &point[offset..offset + width];
            let value = match width {
                16 => Complex64::new(read_f64_le(&field[..8]), read_f64_le(&field[8..])),
                8 => Complex64::new(read_f64_le(field), 0.0),
                _ => Complex64::new(f64::from(read_f32_le(field)), 0.0),
            };
            column.push(value);
            offset += width;
        }
    }

    Ok(columns)
}

/// Parse ASCII format data section.
///
/// Each point is a block starting with the point index (optionally followed
/// by the first value on the same line), then one value line per variable.
fn parse_ascii_data(data: &str, header: &RawHeader) -> Result<Vec<Vec<Complex64>>> {
    let num_vars = header.num_variables;
    let mut columns: Vec<Vec<Complex64>> = (0..num_vars)
        .map(|_| Vec::with_capacity(header.num_points))
        .collect();

    if num_vars == 0 {
        return Ok(columns);
    }

    let mut current: Vec<Complex64> = Vec::with_capacity(num_vars);
    let mut expecting_index = true;
    let mut point = 0;

    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value_str = if expecting_index {
            expecting_index = false;
            match line.split_once(char::is_whitespace) {
                Some((_, rest)) if !rest.trim().is_empty() => Some(rest.trim()),
                _ => None,
            }
        } else {
            Some(line)
        };

        if let Some(value_str) = value_str {
            let value = parse_complex_value(value_str).ok_or_else(|| Error::InvalidValue {
                point,
                value: value_str.to_string(),
            })?;
            current.push(value);
        }

        if current.len() == num_vars {
            for (column, value) in columns.iter_mut().zip(current.drain(..)) {
                column.push(value);
            }
            point += 1;
            expecting_index = true;
            if point == header.num_points {
                break;
            }
        }
    }

    if point < header.num_points {
        return Err(Error::MissingPoints {
            expected: header.num_points,
            actual: point,
        });
    }

    Ok(columns)
}

/// Parse a value written as "real", "real,imag" or "real, imag".
fn parse_complex_value(s: &str) -> Option<Complex64> {
    match s.split_once(',') {
        Some((re, im)) => Some(Complex64::new(
            re.trim().parse().ok()?,
            im.trim().parse().ok()?,
        )),
        None => Some(Complex64::new(s.trim().parse().ok()?, 0.0)),
    }
}

fn read_f64_le(data: &[u8]) -> f64 {
    let bytes: [u8; 8] = data[..8].try_into().unwrap_or([0; 8]);
    f64::from_le_bytes(bytes)
}

fn read_f32_le(data: &[u8]) -> f32 {
    let bytes: [u8; 4] = data[..4].try_into().unwrap_or([0; 4]);
    f32::from_le_bytes(bytes)
}
