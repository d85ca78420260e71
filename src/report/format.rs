//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the sieving/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use std::path::Path;

use crate::app::pipeline::AnalysisOutput;
use crate::domain::{AnalysisConfig, DistributionFit, FractalFit, ReportFile};
use crate::io::ingest::IngestedClasts;
use crate::shape::{ShapePoint, ZinggStats};

/// Row errors shown before the listing collapses into a count.
const MAX_ROW_ERRORS_SHOWN: usize = 5;

/// Format the full run summary (dataset stats + fits + fractal dimension).
pub fn format_run_summary(output: &AnalysisOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== fractsed - grain-size distribution analysis ===\n");
    out.push_str(&format!("Source: {}\n", config.csv_path.display()));
    if let Some(secondary) = &config.secondary_csv {
        out.push_str(&format!("Secondary: {}\n", secondary.display()));
    }

    out.push_str(&clast_line("Clasts", &output.ingest));
    if let Some(secondary) = &output.secondary_ingest {
        out.push_str(&clast_line("Secondary clasts", secondary));
    }

    out.push_str(&format!(
        "Sieve: {} bins x {:.3}mm over [{:.3}, {:.3})mm\n",
        output.bins.len(),
        config.bins.step,
        config.bins.min_size,
        config.bins.max_size,
    ));
    if let Some(ratio) = output.merge_ratio {
        out.push_str(&format!(
            "Merge: overlap ratio={ratio:.4} (secondary counts x{:.4})\n",
            1.0 / ratio,
        ));
    }
    out.push_str(&format!(
        "Curve: {} bins with count >= {:.1}\n",
        output.curve.len(),
        config.min_support,
    ));

    out.push_str("\nModel fits:\n");
    for fit in &output.fits {
        out.push_str(&fit_line(fit));
    }

    out.push('\n');
    out.push_str(&fractal_block(&output.fractal));

    push_row_errors(&mut out, &output.ingest);
    if let Some(secondary) = &output.secondary_ingest {
        push_row_errors(&mut out, secondary);
    }

    out
}

/// Format a previously saved report for `fractsed show`.
pub fn format_report_file(report: &ReportFile) -> String {
    let mut out = String::new();

    out.push_str("=== fractsed report ===\n");
    out.push_str(&format!("Generated: {} ({})\n", report.generated, report.tool));
    out.push_str(&format!("Source: {}\n", report.source));
    if let Some(secondary) = &report.secondary_source {
        out.push_str(&format!("Secondary: {secondary}\n"));
    }

    out.push_str(&format!(
        "Sieve: [{:.3}, {:.3})mm step {:.3}mm | min count {:.1}\n",
        report.bins.min_size, report.bins.max_size, report.bins.step, report.min_support,
    ));
    if let Some(ratio) = report.merge_ratio {
        out.push_str(&format!("Merge: overlap ratio={ratio:.4}\n"));
    }

    if !report.curve.is_empty() {
        let last = report.curve.len() - 1;
        out.push_str(&format!(
            "Curve: {} points over [{:.3}, {:.3}]mm\n",
            report.curve.len(),
            report.curve.sizes[0],
            report.curve.sizes[last],
        ));
    }

    out.push_str("\nModel fits:\n");
    for fit in &report.fits {
        out.push_str(&fit_line(fit));
    }

    out.push('\n');
    out.push_str(&fractal_block(&report.fractal));

    out
}

/// Format the `fractsed shape` summary.
pub fn format_shape_summary(
    source: &Path,
    ingest: &IngestedClasts,
    stats: &ZinggStats,
    series: &[ShapePoint],
) -> String {
    let mut out = String::new();

    out.push_str("=== fractsed - clast shape ===\n");
    out.push_str(&format!("Source: {}\n", source.display()));
    out.push_str(&clast_line("Clasts", ingest));

    out.push_str(&format!(
        "Zingg: S/I={:.4} I/L={:.4} (n={} with axes)\n",
        stats.si_mean, stats.il_mean, stats.n_clasts,
    ));

    if series.is_empty() {
        out.push_str("Shape factor (WH79): no clasts with measured axes\n");
    } else {
        let mean = series.iter().map(|p| p.factor).sum::<f64>() / series.len() as f64;
        out.push_str(&format!(
            "Shape factor (WH79): mean={:.4} over n={}\n",
            mean,
            series.len(),
        ));
    }

    push_row_errors(&mut out, ingest);

    out
}

fn clast_line(label: &str, ingest: &IngestedClasts) -> String {
    let mut notes = Vec::new();
    if ingest.side_contact_dropped > 0 {
        notes.push(format!("{} side-contact dropped", ingest.side_contact_dropped));
    }
    if !ingest.row_errors.is_empty() {
        notes.push(format!("{} bad rows", ingest.row_errors.len()));
    }
    let notes = if notes.is_empty() {
        String::new()
    } else {
        format!(" ({})", notes.join(", "))
    };

    format!(
        "{label}: n={}{notes} | d=[{:.3}, {:.3}]mm | total V={:.3}mm^3\n",
        ingest.rows_used, ingest.stats.diameter_min, ingest.stats.diameter_max, ingest.stats.volume_total,
    )
}

fn fit_line(fit: &DistributionFit) -> String {
    format!(
        "  {:<18} params={} SSE={:.6} mean={:.4}mm var={:.4} ({} iters)\n",
        fit.model.display_name(),
        fmt_vec(&fit.params),
        fit.sse,
        fit.mean,
        fit.variance,
        fit.iterations,
    )
}

fn fractal_block(fractal: &FractalFit) -> String {
    let mut out = String::new();
    out.push_str("Fractal dimension:\n");
    out.push_str(&format!(
        "- D = {:.3} (slope={:.3}, intercept={:.4})\n",
        fractal.dimension(),
        fractal.slope,
        fractal.intercept,
    ));
    out.push_str(&format!(
        "- fit: n={} log-log points, centroid=({:.3}, {:.3})\n",
        fractal.n_points, fractal.center_x, fractal.center_y,
    ));
    out
}

fn push_row_errors(out: &mut String, ingest: &IngestedClasts) {
    if ingest.row_errors.is_empty() {
        return;
    }

    out.push_str("\nSkipped rows:\n");
    for err in ingest.row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!("  line {}: {}\n", err.line, err.message));
    }
    if ingest.row_errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!(
            "  ... and {} more\n",
            ingest.row_errors.len() - MAX_ROW_ERRORS_SHOWN
        ));
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}
