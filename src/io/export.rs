//! Export bins, clasts, and shape series to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts. Clast exports use the same headers the segmentation tool writes,
//! so a generated sample file can be fed straight back into `analyze`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Clast, SievedBins};
use crate::error::AppError;
use crate::shape::ShapePoint;

/// Write per-bin aggregates to a CSV file.
pub fn write_bins_csv(path: &Path, bins: &SievedBins) -> Result<(), AppError> {
    let file = create(path)?;
    render_bins(file, bins).map_err(|e| write_error(path, e))
}

/// Write a clast list using the segmentation tool's column names.
pub fn write_clasts_csv(path: &Path, clasts: &[Clast]) -> Result<(), AppError> {
    let file = create(path)?;
    render_clasts(file, clasts).map_err(|e| write_error(path, e))
}

/// Write the per-clast shape-factor series.
pub fn write_shape_csv(path: &Path, points: &[ShapePoint]) -> Result<(), AppError> {
    let file = create(path)?;
    render_shape(file, points).map_err(|e| write_error(path, e))
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create CSV '{}': {e}", path.display())))
}

fn write_error(path: &Path, e: std::io::Error) -> AppError {
    AppError::io(format!("Failed to write CSV '{}': {e}", path.display()))
}

fn render_bins<W: Write>(mut out: W, bins: &SievedBins) -> std::io::Result<()> {
    writeln!(out, "bin_edge_mm,count,volume_mm3,representative_mm")?;
    for i in 0..bins.len() {
        writeln!(
            out,
            "{:.6},{:.4},{:.6},{:.6}",
            bins.bin_edges[i], bins.count[i], bins.volume_sum[i], bins.representative_size[i],
        )?;
    }
    Ok(())
}

fn render_clasts<W: Write>(mut out: W, clasts: &[Clast]) -> std::io::Result<()> {
    writeln!(
        out,
        "ShapeA (mm),ShapeB (mm),ShapeC (mm),Volume (mm^3),Sphericity,Side contact"
    )?;
    for c in clasts {
        writeln!(
            out,
            "{},{},{:.6},{:.6},{},{}",
            c.extras.a_axis.map(|v| format!("{v:.6}")).unwrap_or_default(),
            c.extras.b_axis.map(|v| format!("{v:.6}")).unwrap_or_default(),
            c.diameter,
            c.volume,
            c.extras.sphericity.map(|v| format!("{v:.4}")).unwrap_or_default(),
            u8::from(c.side_contact),
        )?;
    }
    Ok(())
}

fn render_shape<W: Write>(mut out: W, points: &[ShapePoint]) -> std::io::Result<()> {
    writeln!(out, "diameter_mm,shape_factor")?;
    for p in points {
        writeln!(out, "{:.6},{:.6}", p.diameter, p.factor)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::domain::ClastExtras;
    use crate::io::ingest::read_clasts;

    #[test]
    fn bins_csv_layout() {
        let bins = SievedBins {
            bin_edges: vec![0.01, 0.025],
            volume_sum: vec![1.5, 0.0],
            count: vec![2.0, 0.0],
            representative_size: vec![0.02, 0.0],
        };

        let mut buf = Vec::new();
        render_bins(&mut buf, &bins).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("bin_edge_mm,count,volume_mm3,representative_mm"));
        assert_eq!(lines.next(), Some("0.010000,2.0000,1.500000,0.020000"));
        assert_eq!(lines.next(), Some("0.025000,0.0000,0.000000,0.000000"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn clasts_csv_round_trips_through_ingest() {
        let clasts = vec![
            Clast {
                diameter: 1.0,
                volume: 1.2,
                side_contact: false,
                extras: ClastExtras {
                    a_axis: Some(2.0),
                    b_axis: Some(1.5),
                    sphericity: Some(0.8),
                },
            },
            Clast {
                diameter: 0.5,
                volume: 0.2,
                side_contact: true,
                extras: ClastExtras::default(),
            },
        ];

        let mut buf = Vec::new();
        render_clasts(&mut buf, &clasts).unwrap();

        let data = read_clasts(Cursor::new(buf), true).unwrap();
        assert_eq!(data.rows_used, 2);
        assert!((data.clasts[0].diameter - 1.0).abs() < 1e-9);
        assert_eq!(data.clasts[0].extras.b_axis, Some(1.5));
        assert!(!data.clasts[0].side_contact);
        assert!(data.clasts[1].side_contact);
        assert_eq!(data.clasts[1].extras.a_axis, None);
    }

    #[test]
    fn shape_csv_layout() {
        let points = vec![ShapePoint {
            diameter: 2.0,
            factor: 0.625,
        }];

        let mut buf = Vec::new();
        render_shape(&mut buf, &points).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("diameter_mm,shape_factor\n"));
        assert!(text.contains("2.000000,0.625000"));
    }
}
