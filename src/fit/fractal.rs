//! Log-log cumulative-count regression (fractal dimension).
//!
//! Fragmented materials commonly show a power-law size census:
//! `N(>= d) ∝ d^-D`, with `D` the fractal dimension. On log-log axes the
//! census is a line of slope `-D`, so the estimate is:
//!
//! 1. sieve the raw population
//! 2. accumulate counts from the largest size class downward
//! 3. take log10 of both axes (empty classes drop out as NaN)
//! 4. fit a degree-1 polynomial over the caller's log-size window
//!
//! The run uses raw per-clast counts. Merged populations carry fractional,
//! rescaled counts that are not a census, so the regression takes raw arrays,
//! not sieved-and-merged bins.

use crate::dist::sieve::sieve;
use crate::domain::{FractalConfig, FractalFit, SievedBins};
use crate::error::AppError;
use crate::math::ols::polyfit_line;

/// Samples taken along the fitted line.
pub const LINE_SAMPLES: usize = 50;

/// Minimum in-window points for the regression.
pub const MIN_REGRESSION_POINTS: usize = 2;

/// Build the `(log10 size, log10 N(>= size))` series from sieved counts.
///
/// Returned in decreasing size order (the accumulation order). Zero edges and
/// zero cumulative counts become NaN rather than `-inf`, so downstream
/// filtering can treat "empty" and "out of window" uniformly.
pub fn log_log_series(bins: &SievedBins) -> (Vec<f64>, Vec<f64>) {
    let mut edges = bins.bin_edges.clone();
    let mut counts = bins.count.clone();
    edges.reverse();
    counts.reverse();

    let mut running = 0.0;
    let cumulative: Vec<f64> = counts
        .iter()
        .map(|c| {
            running += c;
            running
        })
        .collect();

    let log_sizes = edges
        .iter()
        .map(|&e| if e > 0.0 { e.log10() } else { f64::NAN })
        .collect();
    let log_counts = cumulative
        .iter()
        .map(|&c| if c > 0.0 { c.log10() } else { f64::NAN })
        .collect();

    (log_sizes, log_counts)
}

/// Estimate the fractal dimension of a raw clast population.
///
/// Points must fall strictly inside `(window_min, window_max)` (log10 size
/// units) and be finite on both axes to enter the regression. The fitted line
/// is sampled at [`LINE_SAMPLES`] evenly spaced abscissae across the window;
/// the centroid is the mean of those samples.
pub fn fractal_fit(
    diameters: &[f64],
    volumes: &[f64],
    config: &FractalConfig,
) -> Result<FractalFit, AppError> {
    if !(config.window_min.is_finite()
        && config.window_max.is_finite()
        && config.window_min < config.window_max)
    {
        return Err(AppError::invalid_input(format!(
            "Invalid fractal window: ({}, {}).",
            config.window_min, config.window_max
        )));
    }

    let bins = sieve(diameters, volumes, &config.bins)?;
    let (log_sizes, log_counts) = log_log_series(&bins);

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (&x, &y) in log_sizes.iter().zip(log_counts.iter()) {
        if x.is_finite() && y.is_finite() && x > config.window_min && x < config.window_max {
            xs.push(x);
            ys.push(y);
        }
    }

    if xs.len() < MIN_REGRESSION_POINTS {
        return Err(AppError::insufficient_points(xs.len(), MIN_REGRESSION_POINTS));
    }

    let Some((intercept, slope)) = polyfit_line(&xs, &ys) else {
        return Err(AppError::fit_did_not_converge("Log-log census", 1));
    };

    let mut line_x = Vec::with_capacity(LINE_SAMPLES);
    let mut line_y = Vec::with_capacity(LINE_SAMPLES);
    for i in 0..LINE_SAMPLES {
        let u = i as f64 / (LINE_SAMPLES as f64 - 1.0);
        let x = config.window_min + u * (config.window_max - config.window_min);
        line_x.push(x);
        line_y.push(intercept + slope * x);
    }
    let center_x = line_x.iter().sum::<f64>() / LINE_SAMPLES as f64;
    let center_y = line_y.iter().sum::<f64>() / LINE_SAMPLES as f64;

    Ok(FractalFit {
        slope,
        intercept,
        line_x,
        line_y,
        center_x,
        center_y,
        n_points: xs.len(),
    })
}
