//! CSV ingest and normalization.
//!
//! This module turns a shape-analysis export into a clean clast list that is
//! safe to sieve and fit.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Tolerant headers**: the segmentation tool writes `ShapeC (mm)` /
//!   `Volume (mm^3)`, hand-edited files often use `diameter` / `volume`
//! - **Separation of concerns**: no binning or fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Clast, ClastExtras};
use crate::error::AppError;

/// Accepted (normalized) header spellings, in preference order.
const DIAMETER_COLUMNS: &[&str] = &["shapec (mm)", "shapec", "diameter"];
const VOLUME_COLUMNS: &[&str] = &["volume (mm^3)", "volume"];
const A_AXIS_COLUMNS: &[&str] = &["shapea (mm)", "shapea"];
const B_AXIS_COLUMNS: &[&str] = &["shapeb (mm)", "shapeb"];
const SPHERICITY_COLUMNS: &[&str] = &["sphericity"];
const SIDE_CONTACT_COLUMNS: &[&str] = &["side contact", "side_contact"];

/// Summary stats about the clasts actually kept.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_clasts: usize,
    pub diameter_min: f64,
    pub diameter_max: f64,
    pub volume_total: f64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized clasts + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedClasts {
    pub clasts: Vec<Clast>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
    /// Rows dropped because the clast touches the sample boundary.
    pub side_contact_dropped: usize,
}

impl IngestedClasts {
    /// Wrap an in-memory clast list (e.g. a generated sample) as ingest output.
    pub fn from_clasts(clasts: Vec<Clast>) -> Result<Self, AppError> {
        let stats = compute_stats(&clasts).ok_or_else(|| AppError::insufficient_points(0, 1))?;
        let rows = clasts.len();
        Ok(Self {
            clasts,
            stats,
            row_errors: Vec::new(),
            rows_read: rows,
            rows_used: rows,
            side_contact_dropped: 0,
        })
    }
}

/// Load and normalize a clast CSV.
///
/// When `include_side_contact` is false (the default for analysis), clasts
/// flagged as touching the scanned-sample boundary are dropped: their caliper
/// and volume measurements are truncated by the cut.
pub fn load_clasts(path: &Path, include_side_contact: bool) -> Result<IngestedClasts, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_clasts(file, include_side_contact)
}

/// Same as [`load_clasts`] but over any reader, so tests can feed in-memory CSV.
pub fn read_clasts<R: Read>(reader: R, include_side_contact: bool) -> Result<IngestedClasts, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);

    let Some(diameter_idx) = find_column(&header_map, DIAMETER_COLUMNS) else {
        return Err(AppError::invalid_input(
            "Missing required column: `ShapeC (mm)` (or `diameter`).",
        ));
    };
    let Some(volume_idx) = find_column(&header_map, VOLUME_COLUMNS) else {
        return Err(AppError::invalid_input(
            "Missing required column: `Volume (mm^3)` (or `volume`).",
        ));
    };

    let a_axis_idx = find_column(&header_map, A_AXIS_COLUMNS);
    let b_axis_idx = find_column(&header_map, B_AXIS_COLUMNS);
    let sphericity_idx = find_column(&header_map, SPHERICITY_COLUMNS);
    let side_contact_idx = find_column(&header_map, SIDE_CONTACT_COLUMNS);

    let mut clasts = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut side_contact_dropped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, diameter_idx, volume_idx, a_axis_idx, b_axis_idx, sphericity_idx, side_contact_idx) {
            Ok(clast) => {
                if clast.side_contact && !include_side_contact {
                    side_contact_dropped += 1;
                    continue;
                }
                clasts.push(clast);
            }
            Err(e) => row_errors.push(RowError { line, message: e }),
        }
    }

    let rows_used = clasts.len();
    let stats = compute_stats(&clasts).ok_or_else(|| AppError::insufficient_points(0, 1))?;

    Ok(IngestedClasts {
        clasts,
        stats,
        row_errors,
        rows_read,
        rows_used,
        side_contact_dropped,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|name| header_map.get(*name).copied())
}

fn parse_row(
    record: &StringRecord,
    diameter_idx: usize,
    volume_idx: usize,
    a_axis_idx: Option<usize>,
    b_axis_idx: Option<usize>,
    sphericity_idx: Option<usize>,
    side_contact_idx: Option<usize>,
) -> Result<Clast, String> {
    let diameter = parse_required_f64(record, diameter_idx, "ShapeC (mm)")?;
    if diameter <= 0.0 {
        return Err("Non-positive diameter.".to_string());
    }

    let volume = parse_required_f64(record, volume_idx, "Volume (mm^3)")?;
    if volume <= 0.0 {
        return Err("Non-positive volume.".to_string());
    }

    let side_contact = parse_side_contact(get_value(record, side_contact_idx))?;

    let extras = ClastExtras {
        a_axis: parse_opt_f64(get_value(record, a_axis_idx)),
        b_axis: parse_opt_f64(get_value(record, b_axis_idx)),
        sphericity: parse_opt_f64(get_value(record, sphericity_idx)),
    };

    Ok(Clast {
        diameter,
        volume,
        side_contact,
        extras,
    })
}

fn get_value(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    let idx = idx?;
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_required_f64(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{raw}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite `{name}` value."));
    }
    Ok(v)
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn parse_side_contact(s: Option<&str>) -> Result<bool, String> {
    // The segmentation export writes 0/1; missing column means nothing touched
    // the boundary.
    let Some(s) = s else { return Ok(false) };
    if let Ok(v) = s.parse::<f64>() {
        return Ok(v != 0.0);
    }
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        _ => Err(format!("Invalid `Side contact` value '{s}'.")),
    }
}

fn compute_stats(clasts: &[Clast]) -> Option<DatasetStats> {
    let mut diameter_min = f64::INFINITY;
    let mut diameter_max = f64::NEG_INFINITY;
    let mut volume_total = 0.0;

    for c in clasts {
        diameter_min = diameter_min.min(c.diameter);
        diameter_max = diameter_max.max(c.diameter);
        volume_total += c.volume;
    }

    if !diameter_min.is_finite() || !diameter_max.is_finite() {
        return None;
    }

    Some(DatasetStats {
        n_clasts: clasts.len(),
        diameter_min,
        diameter_max,
        volume_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::error::ErrorKind;

    const EXPORT_CSV: &str = "\
ShapeA (mm),ShapeB (mm),ShapeC (mm),Volume (mm^3),Sphericity,Side contact
2.0,1.5,1.0,1.2,0.8,0
3.0,2.0,1.5,3.4,0.7,1
1.0,0.8,0.5,0.2,0.9,0
";

    #[test]
    fn export_headers_parse_and_side_contact_drops() {
        let data = read_clasts(Cursor::new(EXPORT_CSV), false).unwrap();

        assert_eq!(data.rows_read, 3);
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.side_contact_dropped, 1);
        assert!(data.row_errors.is_empty());

        assert!((data.clasts[0].diameter - 1.0).abs() < 1e-12);
        assert!((data.clasts[0].volume - 1.2).abs() < 1e-12);
        assert_eq!(data.clasts[0].extras.a_axis, Some(2.0));
        assert_eq!(data.clasts[0].extras.b_axis, Some(1.5));
        assert_eq!(data.clasts[0].extras.sphericity, Some(0.8));

        assert_eq!(data.stats.n_clasts, 2);
        assert!((data.stats.diameter_min - 0.5).abs() < 1e-12);
        assert!((data.stats.diameter_max - 1.0).abs() < 1e-12);
        assert!((data.stats.volume_total - 1.4).abs() < 1e-12);
    }

    #[test]
    fn include_side_contact_keeps_flagged_rows() {
        let data = read_clasts(Cursor::new(EXPORT_CSV), true).unwrap();
        assert_eq!(data.rows_used, 3);
        assert_eq!(data.side_contact_dropped, 0);
        assert!(data.clasts[1].side_contact);
    }

    #[test]
    fn plain_headers_parse() {
        let csv = "diameter,volume\n0.5,0.1\n1.5,2.0\n";
        let data = read_clasts(Cursor::new(csv), false).unwrap();

        assert_eq!(data.rows_used, 2);
        assert!(!data.clasts[0].side_contact);
        assert_eq!(data.clasts[0].extras.a_axis, None);
    }

    #[test]
    fn bom_on_first_header_is_stripped() {
        let csv = "\u{feff}Diameter,Volume\n0.5,0.1\n";
        let data = read_clasts(Cursor::new(csv), false).unwrap();
        assert_eq!(data.rows_used, 1);
    }

    #[test]
    fn bad_rows_become_row_errors() {
        let csv = "\
diameter,volume
1.0,2.0
oops,2.0
0.5,
-1.0,2.0
0.25,0.5
";
        let data = read_clasts(Cursor::new(csv), false).unwrap();

        assert_eq!(data.rows_read, 5);
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.row_errors.len(), 3);
        assert_eq!(data.row_errors[0].line, 3);
        assert_eq!(data.row_errors[1].line, 4);
        assert_eq!(data.row_errors[2].line, 5);
        assert!(data.row_errors[2].message.contains("diameter") || data.row_errors[2].message.contains("Non-positive"));
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let err = read_clasts(Cursor::new("volume\n1.0\n"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = read_clasts(Cursor::new("diameter\n1.0\n"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn no_usable_rows_is_rejected() {
        let csv = "diameter,volume,side contact\n1.0,2.0,1\n";
        let err = read_clasts(Cursor::new(csv), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientPoints);
    }
}
