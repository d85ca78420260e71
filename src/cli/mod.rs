//! Command-line parsing for the clast-size analysis tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the sieving/fitting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{ModelSpec, SampleKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "fractsed",
    version,
    about = "Grain-size distributions and fractal dimension from segmented clasts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sieve clasts into bins, fit size distributions, and compute the fractal dimension.
    Analyze(AnalyzeArgs),
    /// Print Zingg ratios and the Wilson-Huang shape-factor summary.
    Shape(ShapeArgs),
    /// Generate a synthetic clast CSV for fixtures and demos.
    Sample(SampleArgs),
    /// Pretty-print a previously exported report JSON.
    Show(ShowArgs),
}

/// Options for the analysis pipeline.
#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Clast CSV file(s); each file is analyzed independently.
    #[arg(required = true)]
    pub csv: Vec<PathBuf>,

    /// Finer-resolution clast CSV merged into the primary dataset.
    #[arg(long)]
    pub secondary: Option<PathBuf>,

    /// Smallest binned size (mm).
    #[arg(long, default_value_t = 0.01)]
    pub bin_min: f64,

    /// Upper end of the binning lattice (mm, exclusive).
    #[arg(long, default_value_t = 5.0)]
    pub bin_max: f64,

    /// Bin width (mm).
    #[arg(long, default_value_t = 0.015)]
    pub bin_step: f64,

    /// Merge split size (mm): primary keeps d >= threshold, secondary d < threshold.
    #[arg(long, default_value_t = 0.3)]
    pub threshold: f64,

    /// Lower edge of the overlap window used for merge scaling (mm, exclusive).
    #[arg(long, default_value_t = 0.3)]
    pub overlap_min: f64,

    /// Upper edge of the overlap window used for merge scaling (mm, inclusive).
    #[arg(long, default_value_t = 0.5)]
    pub overlap_max: f64,

    /// Minimum clast count for a bin to enter the cumulative curve.
    #[arg(long, default_value_t = 5.0)]
    pub min_support: f64,

    /// Which distribution model(s) to fit.
    #[arg(long, value_enum, default_value_t = ModelSpec::All)]
    pub model: ModelSpec,

    /// Smallest binned size for the fractal count lattice (mm).
    #[arg(long, default_value_t = 0.015)]
    pub fractal_min: f64,

    /// Upper end of the fractal count lattice (mm, exclusive).
    #[arg(long, default_value_t = 2.0)]
    pub fractal_max: f64,

    /// Bin width for the fractal count lattice (mm).
    #[arg(long, default_value_t = 0.015)]
    pub fractal_step: f64,

    /// Lower log10-size bound of the fractal regression window (exclusive).
    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    pub window_min: f64,

    /// Upper log10-size bound of the fractal regression window (exclusive).
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub window_max: f64,

    /// Keep clasts that touch the scanned-sample boundary.
    #[arg(long)]
    pub include_side_contact: bool,

    /// Export per-bin aggregates to CSV.
    #[arg(long = "export-bins")]
    pub export_bins: Option<PathBuf>,

    /// Export the full analysis (curve + fits + fractal) to JSON.
    #[arg(long = "export-report")]
    pub export_report: Option<PathBuf>,
}

/// Options for shape statistics.
#[derive(Debug, Parser)]
pub struct ShapeArgs {
    /// Clast CSV file.
    pub csv: PathBuf,

    /// Ignore clasts smaller than this diameter (mm).
    #[arg(long, default_value_t = 0.0)]
    pub min_diameter: f64,

    /// Keep clasts that touch the scanned-sample boundary.
    #[arg(long)]
    pub include_side_contact: bool,

    /// Export the per-clast shape-factor series to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for synthetic sample generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Output CSV path.
    pub out: PathBuf,

    /// Size law for generated diameters.
    #[arg(long, value_enum, default_value_t = SampleKind::Rosin)]
    pub kind: SampleKind,

    /// Number of clasts to generate.
    #[arg(short = 'n', long, default_value_t = 2000)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Scale parameter (Rosin-Rammler n, or power-law minimum diameter, mm).
    #[arg(long, default_value_t = 0.8)]
    pub scale: f64,

    /// Shape parameter (Rosin-Rammler k, or power-law exponent).
    #[arg(long, default_value_t = 2.0)]
    pub shape: f64,

    /// Fraction of clasts flagged as touching the sample boundary.
    #[arg(long, default_value_t = 0.05)]
    pub side_contact_rate: f64,
}

/// Options for showing a saved report.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Report JSON file produced by `fractsed analyze --export-report`.
    pub report: PathBuf,
}
