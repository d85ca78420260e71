//! Merging two partially-overlapping size populations.
//!
//! A coarse-resolution scan (the primary dataset) and a fine-resolution scan
//! (the secondary) of the same material sample different footprints, so their
//! raw counts are not directly comparable. Both instruments resolve the
//! overlap window reliably, which gives a footprint correction:
//!
//! ```text
//! ratio = secondary_window_count / primary_window_count
//! ```
//!
//! The secondary bins are scaled by `1/ratio` so that, per unit of primary
//! footprint, its overlap-window count matches the primary's. Each dataset is
//! truncated to the size range it is trusted on before sieving, so no bin is
//! fed from both datasets.
//!
//! No renormalization happens here; the cumulative builder owns that.

use crate::dist::sieve::sieve;
use crate::domain::{BinConfig, MergeConfig, MergedBins, SievedBins};
use crate::error::AppError;

/// Count clasts inside the overlap window `c_min < d <= c_max`.
///
/// Membership is evaluated on the raw dataset, before any threshold split.
pub fn overlap_count(diameters: &[f64], c_min: f64, c_max: f64) -> usize {
    diameters.iter().filter(|&&d| d > c_min && d <= c_max).count()
}

/// Merge two raw populations into one per-bin table.
pub fn merge_populations(
    primary_diameters: &[f64],
    primary_volumes: &[f64],
    secondary_diameters: &[f64],
    secondary_volumes: &[f64],
    merge: &MergeConfig,
    bins: &BinConfig,
) -> Result<MergedBins, AppError> {
    if primary_diameters.len() != primary_volumes.len()
        || secondary_diameters.len() != secondary_volumes.len()
    {
        return Err(AppError::invalid_input(
            "Diameter/volume arrays differ in length.",
        ));
    }
    if !(merge.overlap_min.is_finite()
        && merge.overlap_max.is_finite()
        && merge.overlap_min < merge.overlap_max)
    {
        return Err(AppError::invalid_input(format!(
            "Invalid overlap window: ({}, {}].",
            merge.overlap_min, merge.overlap_max
        )));
    }
    if !merge.threshold.is_finite() {
        return Err(AppError::invalid_input("Merge threshold must be finite."));
    }

    // Window counts on the unfiltered datasets. Either side empty makes the
    // footprint correction undefined.
    let primary_window = overlap_count(primary_diameters, merge.overlap_min, merge.overlap_max);
    let secondary_window = overlap_count(secondary_diameters, merge.overlap_min, merge.overlap_max);
    if primary_window == 0 || secondary_window == 0 {
        return Err(AppError::overlap_window_empty(
            merge.overlap_min,
            merge.overlap_max,
        ));
    }
    let ratio = secondary_window as f64 / primary_window as f64;
    let secondary_scale = 1.0 / ratio;

    // Truncate each dataset to the size range it is trusted on.
    let (coarse_d, coarse_v) = split_at(primary_diameters, primary_volumes, |d| {
        d >= merge.threshold
    });
    let (fine_d, fine_v) = split_at(secondary_diameters, secondary_volumes, |d| {
        d < merge.threshold
    });

    let coarse = sieve(&coarse_d, &coarse_v, bins)?;
    let fine = sieve(&fine_d, &fine_v, bins)?;

    let n = coarse.len();
    let mut volume_sum = Vec::with_capacity(n);
    let mut count = Vec::with_capacity(n);
    let mut representative_size = Vec::with_capacity(n);

    for i in 0..n {
        volume_sum.push(coarse.volume_sum[i] + fine.volume_sum[i] * secondary_scale);
        count.push(coarse.count[i] + fine.count[i] * secondary_scale);
        // The threshold split makes the two sides disjoint, so whichever
        // dataset populated the bin owns its representative.
        representative_size.push(if coarse.count[i] > 0.0 {
            coarse.representative_size[i]
        } else {
            fine.representative_size[i]
        });
    }

    Ok(MergedBins {
        bins: SievedBins {
            bin_edges: coarse.bin_edges,
            volume_sum,
            count,
            representative_size,
        },
        ratio,
        secondary_scale,
    })
}

fn split_at<F>(diameters: &[f64], volumes: &[f64], keep: F) -> (Vec<f64>, Vec<f64>)
where
    F: Fn(f64) -> bool,
{
    let mut d_out = Vec::new();
    let mut v_out = Vec::new();
    for (&d, &v) in diameters.iter().zip(volumes.iter()) {
        if keep(d) {
            d_out.push(d);
            v_out.push(v);
        }
    }
    (d_out, v_out)
}
