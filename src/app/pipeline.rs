//! Shared analysis pipeline behind `fractsed analyze`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> sieve (-> merge) -> cumulative curve -> model fits -> fractal fit
//!
//! The CLI layer can then focus on presentation and exports.

use crate::dist::{build_cumulative, merge_populations, sieve};
use crate::domain::{
    AnalysisConfig, Clast, CumulativeCurve, DistributionFit, FractalFit, SievedBins,
};
use crate::error::AppError;
use crate::fit::{fit_models, fractal_fit};
use crate::io::ingest::{IngestedClasts, load_clasts};

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub ingest: IngestedClasts,
    pub secondary_ingest: Option<IngestedClasts>,
    pub bins: SievedBins,
    /// Overlap-window ratio when a secondary dataset was merged in.
    pub merge_ratio: Option<f64>,
    pub curve: CumulativeCurve,
    pub fits: Vec<DistributionFit>,
    pub fractal: FractalFit,
}

/// Execute the full analysis pipeline for one primary (and optional secondary) CSV.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisOutput, AppError> {
    let ingest = load_clasts(&config.csv_path, config.include_side_contact)?;
    let secondary_ingest = match &config.secondary_csv {
        Some(path) => Some(load_clasts(path, config.include_side_contact)?),
        None => None,
    };

    run_analysis_with_clasts(config, ingest, secondary_ingest)
}

/// Execute the pipeline with already-loaded clasts.
///
/// This is the seam tests use to drive the pipeline with synthetic data.
pub fn run_analysis_with_clasts(
    config: &AnalysisConfig,
    ingest: IngestedClasts,
    secondary_ingest: Option<IngestedClasts>,
) -> Result<AnalysisOutput, AppError> {
    let (diameters, volumes) = extract_arrays(&ingest.clasts);

    let (bins, merge_ratio) = match &secondary_ingest {
        Some(secondary) => {
            let (sec_diameters, sec_volumes) = extract_arrays(&secondary.clasts);
            let merged = merge_populations(
                &diameters,
                &volumes,
                &sec_diameters,
                &sec_volumes,
                &config.merge,
                &config.bins,
            )?;
            let ratio = merged.ratio;
            (merged.bins, Some(ratio))
        }
        None => (sieve(&diameters, &volumes, &config.bins)?, None),
    };

    let curve = build_cumulative(&bins.volume_sum, &bins.count, &bins.bin_edges, config.min_support)?;
    let fits = fit_models(config.model_spec, &curve)?;

    // The count census always runs on the raw primary diameters: merged counts
    // are footprint-rescaled and would bias the log-log regression.
    let fractal = fractal_fit(&diameters, &volumes, &config.fractal)?;

    Ok(AnalysisOutput {
        ingest,
        secondary_ingest,
        bins,
        merge_ratio,
        curve,
        fits,
        fractal,
    })
}

fn extract_arrays(clasts: &[Clast]) -> (Vec<f64>, Vec<f64>) {
    let diameters = clasts.iter().map(|c| c.diameter).collect();
    let volumes = clasts.iter().map(|c| c.volume).collect();
    (diameters, volumes)
}
