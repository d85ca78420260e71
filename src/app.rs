//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the analysis pipeline (in parallel across input files)
//! - prints summaries
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use rayon::prelude::*;

use crate::cli::{AnalyzeArgs, Command, SampleArgs, ShapeArgs, ShowArgs};
use crate::domain::{AnalysisConfig, BinConfig, FractalConfig, MergeConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `fractsed` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Shape(args) => handle_shape(args),
        Command::Sample(args) => handle_sample(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    validate_analyze_args(&args)?;

    let configs: Vec<AnalysisConfig> = args
        .csv
        .iter()
        .map(|path| analysis_config_from_args(&args, path.clone()))
        .collect();

    // Analyze independent files in parallel; print summaries in input order.
    let outputs: Vec<Result<pipeline::AnalysisOutput, AppError>> =
        configs.par_iter().map(pipeline::run_analysis).collect();

    for (config, result) in configs.iter().zip(outputs) {
        let output = result?;
        println!("{}", crate::report::format_run_summary(&output, config));

        if let Some(path) = &config.export_bins {
            crate::io::export::write_bins_csv(path, &output.bins)?;
        }
        if let Some(path) = &config.export_report {
            let report = crate::io::report::build_report(
                config,
                output.merge_ratio,
                &output.curve,
                &output.fits,
                &output.fractal,
            );
            crate::io::report::write_report_json(path, &report)?;
        }
    }

    Ok(())
}

fn handle_shape(args: ShapeArgs) -> Result<(), AppError> {
    let ingest = crate::io::ingest::load_clasts(&args.csv, args.include_side_contact)?;
    let stats = crate::shape::zingg_stats(&ingest.clasts, args.min_diameter)?;
    let series = crate::shape::shape_factor_series(&ingest.clasts);

    println!(
        "{}",
        crate::report::format_shape_summary(&args.csv, &ingest, &stats, &series)
    );

    if let Some(path) = &args.export {
        crate::io::export::write_shape_csv(path, &series)?;
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::sample::SampleConfig {
        kind: args.kind,
        count: args.count,
        seed: args.seed,
        scale: args.scale,
        shape: args.shape,
        side_contact_rate: args.side_contact_rate,
    };

    let clasts = crate::data::sample::generate_clasts(&config)?;
    crate::io::export::write_clasts_csv(&args.out, &clasts)?;

    println!("Wrote {} synthetic clasts to {}", clasts.len(), args.out.display());
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let report = crate::io::report::read_report_json(&args.report)?;
    println!("{}", crate::report::format_report_file(&report));
    Ok(())
}

/// Reject flag combinations that only make sense for a single input file.
fn validate_analyze_args(args: &AnalyzeArgs) -> Result<(), AppError> {
    if args.csv.len() <= 1 {
        return Ok(());
    }
    if args.secondary.is_some() || args.export_bins.is_some() || args.export_report.is_some() {
        return Err(AppError::invalid_input(
            "--secondary, --export-bins and --export-report require a single input CSV.",
        ));
    }
    Ok(())
}

pub fn analysis_config_from_args(args: &AnalyzeArgs, csv_path: PathBuf) -> AnalysisConfig {
    AnalysisConfig {
        csv_path,
        secondary_csv: args.secondary.clone(),
        bins: BinConfig {
            min_size: args.bin_min,
            max_size: args.bin_max,
            step: args.bin_step,
        },
        merge: MergeConfig {
            threshold: args.threshold,
            overlap_min: args.overlap_min,
            overlap_max: args.overlap_max,
        },
        min_support: args.min_support,
        model_spec: args.model,
        fractal: FractalConfig {
            bins: BinConfig {
                min_size: args.fractal_min,
                max_size: args.fractal_max,
                step: args.fractal_step,
            },
            window_min: args.window_min,
            window_max: args.window_max,
        },
        include_side_contact: args.include_side_contact,
        export_bins: args.export_bins.clone(),
        export_report: args.export_report.clone(),
    }
}
