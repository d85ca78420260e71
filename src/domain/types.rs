//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during sieving and fitting
//! - exported to JSON/CSV
//! - reloaded later for reporting or comparisons

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One segmented particle as measured by the shape-analysis export.
///
/// `diameter` is the smallest principal caliper dimension (the "sieve size"):
/// a clast passes a square mesh when its two smaller dimensions fit, so the
/// short axis is what a physical sieve actually measures.
#[derive(Debug, Clone)]
pub struct Clast {
    /// Short-axis caliper diameter (mm).
    pub diameter: f64,
    /// Segmented volume (mm^3).
    pub volume: f64,
    /// True when the particle touches the scanned-sample boundary, meaning its
    /// measurements are truncated and untrustworthy.
    pub side_contact: bool,
    /// Optional columns carried for shape statistics.
    pub extras: ClastExtras,
}

#[derive(Debug, Clone, Default)]
pub struct ClastExtras {
    /// Long-axis caliper diameter (mm).
    pub a_axis: Option<f64>,
    /// Intermediate-axis caliper diameter (mm).
    pub b_axis: Option<f64>,
    pub sphericity: Option<f64>,
}

/// Fixed-width binning lattice over `[min_size, max_size)`.
///
/// Bins are half-open `[edge, edge + step)`, identified by their lower edge.
/// The bin count is `floor((max_size - min_size) / step)`; a trailing partial
/// interval is not binned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinConfig {
    pub min_size: f64,
    pub max_size: f64,
    pub step: f64,
}

impl BinConfig {
    /// Lattice used for grain-size distribution work (mm).
    pub fn grain_default() -> Self {
        Self {
            min_size: 0.01,
            max_size: 5.0,
            step: 0.015,
        }
    }

    /// Lattice used for the fractal count regression (mm).
    pub fn fractal_default() -> Self {
        Self {
            min_size: 0.015,
            max_size: 2.0,
            step: 0.015,
        }
    }
}

/// How two partially-overlapping populations are combined.
///
/// The two instruments resolve different size ranges: the primary dataset is
/// trusted at and above `threshold`, the secondary below it. Window membership
/// for the scaling ratio is `overlap_min < d <= overlap_max`, counted on the
/// raw (untruncated) datasets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Size split: primary keeps `d >= threshold`, secondary keeps `d < threshold`.
    pub threshold: f64,
    pub overlap_min: f64,
    pub overlap_max: f64,
}

/// Binning lattice plus log10 regression window for the fractal fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractalConfig {
    pub bins: BinConfig,
    /// Lower window bound in log10 size units (exclusive).
    pub window_min: f64,
    /// Upper window bound in log10 size units (exclusive).
    pub window_max: f64,
}

impl FractalConfig {
    pub fn standard() -> Self {
        Self {
            bins: BinConfig::fractal_default(),
            window_min: -1.0,
            window_max: 0.0,
        }
    }
}

/// Per-bin aggregates produced by the sieve.
///
/// All four sequences are parallel (indexed by bin). Counts are `f64` because
/// merging scales one dataset by a real-valued footprint ratio, which makes
/// merged counts fractional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SievedBins {
    /// Lower edge of each bin (the bin's identity).
    pub bin_edges: Vec<f64>,
    /// Total clast volume accumulated into each bin.
    pub volume_sum: Vec<f64>,
    /// Clast count per bin (fractional after a merge).
    pub count: Vec<f64>,
    /// Diameter of the last clast accumulated into each bin.
    ///
    /// Order-dependent by construction; useful as a quick "what actually landed
    /// here" diagnostic, not as a statistic.
    pub representative_size: Vec<f64>,
}

impl SievedBins {
    pub fn len(&self) -> usize {
        self.bin_edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bin_edges.is_empty()
    }
}

/// Output of merging two sieved populations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedBins {
    pub bins: SievedBins,
    /// `secondary_window_count / primary_window_count` (diagnostic).
    pub ratio: f64,
    /// Factor applied to the secondary bins (`1 / ratio`).
    pub secondary_scale: f64,
}

/// Normalized cumulative volume-fraction curve.
///
/// `sizes` are surviving bin lower edges in increasing order; `fractions` are
/// non-decreasing with `fractions[0] == 0` and `fractions[last] == 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulativeCurve {
    pub sizes: Vec<f64>,
    pub fractions: Vec<f64>,
}

impl CumulativeCurve {
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// Distribution families fitted to the cumulative curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DistModel {
    /// Rosin-Rammler (Weibull CDF): `F(x) = 1 - exp(-(x/n)^k)`.
    Rosin,
    /// Generalized Gamma: `F(x) = P(c/p, (x/a)^p)`.
    Ggamma,
}

impl DistModel {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            DistModel::Rosin => "Rosin-Rammler",
            DistModel::Ggamma => "Generalized Gamma",
        }
    }

    pub fn param_len(self) -> usize {
        match self {
            DistModel::Rosin => 2,
            DistModel::Ggamma => 3,
        }
    }

    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            DistModel::Rosin => &["n", "k"],
            DistModel::Ggamma => &["p", "a", "c"],
        }
    }

    /// Starting point for the nonlinear solver.
    ///
    /// Rosin-Rammler starts from a small size scale with unit spread; the
    /// generalized gamma starts from the all-ones vector.
    pub fn initial_guess(self) -> Vec<f64> {
        match self {
            DistModel::Rosin => vec![0.1, 1.0],
            DistModel::Ggamma => vec![1.0, 1.0, 1.0],
        }
    }
}

/// Which model(s) to fit in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSpec {
    All,
    Rosin,
    Ggamma,
}

impl ModelSpec {
    pub fn models(self) -> Vec<DistModel> {
        match self {
            ModelSpec::All => vec![DistModel::Rosin, DistModel::Ggamma],
            ModelSpec::Rosin => vec![DistModel::Rosin],
            ModelSpec::Ggamma => vec![DistModel::Ggamma],
        }
    }
}

/// Synthetic population families for the sample generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    /// Weibull-distributed diameters (a Rosin-Rammler population).
    Rosin,
    /// Pareto-distributed diameters (`N(>d)` follows a power law).
    Powerlaw,
}

/// Fitted distribution parameters and derived moments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionFit {
    pub model: DistModel,
    /// Parameter vector in `param_names()` order.
    pub params: Vec<f64>,
    /// Sum of squared residuals against the cumulative curve.
    pub sse: f64,
    pub mean: f64,
    pub variance: f64,
    pub n_points: usize,
    /// Solver iterations actually spent.
    pub iterations: usize,
}

/// Log-log cumulative-count regression output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FractalFit {
    /// Regression slope in log10-log10 space.
    pub slope: f64,
    pub intercept: f64,
    /// Fitted line sampled across the window (50 points).
    pub line_x: Vec<f64>,
    pub line_y: Vec<f64>,
    /// Centroid of the sampled line.
    pub center_x: f64,
    pub center_y: f64,
    pub n_points: usize,
}

impl FractalFit {
    /// Fractal dimension `D = -slope`.
    pub fn dimension(&self) -> f64 {
        -self.slope
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub csv_path: PathBuf,
    /// Optional finer-resolution dataset merged into the primary one.
    pub secondary_csv: Option<PathBuf>,
    pub bins: BinConfig,
    pub merge: MergeConfig,
    /// Minimum per-bin clast count for a bin to enter the cumulative curve.
    pub min_support: f64,
    pub model_spec: ModelSpec,
    pub fractal: FractalConfig,
    /// Keep clasts flagged as touching the sample boundary.
    pub include_side_contact: bool,
    pub export_bins: Option<PathBuf>,
    pub export_report: Option<PathBuf>,
}

/// A saved analysis report (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub generated: NaiveDate,
    pub source: String,
    pub secondary_source: Option<String>,
    pub bins: BinConfig,
    pub min_support: f64,
    /// Overlap-window ratio applied during a merge (absent for single runs).
    pub merge_ratio: Option<f64>,
    pub curve: CumulativeCurve,
    pub fits: Vec<DistributionFit>,
    pub fractal: FractalFit,
}
