//! Cumulative volume-fraction curve construction.
//!
//! Bins backed by too few clasts carry more segmentation noise than signal,
//! so they are dropped outright (never smoothed) before accumulation. The
//! surviving volumes are summed in increasing size order and min-max
//! normalized, which pins the first fraction to 0 and the last to 1.

use crate::domain::CumulativeCurve;
use crate::error::AppError;

/// Minimum number of points a cumulative curve must have.
pub const MIN_CURVE_BINS: usize = 2;

/// Build the normalized cumulative curve from per-bin aggregates.
///
/// `min_support` is compared against the (possibly fractional, post-merge)
/// per-bin count; bins with `count < min_support` are removed from all arrays
/// in lock-step. Curve sizes are the surviving bin lower edges.
pub fn build_cumulative(
    volume_sum: &[f64],
    count: &[f64],
    bin_edges: &[f64],
    min_support: f64,
) -> Result<CumulativeCurve, AppError> {
    if volume_sum.len() != count.len() || volume_sum.len() != bin_edges.len() {
        return Err(AppError::invalid_input(format!(
            "Bin arrays differ in length ({}, {}, {}).",
            volume_sum.len(),
            count.len(),
            bin_edges.len()
        )));
    }

    let mut sizes = Vec::new();
    let mut kept_volumes = Vec::new();
    for i in 0..count.len() {
        if count[i] >= min_support {
            sizes.push(bin_edges[i]);
            kept_volumes.push(volume_sum[i]);
        }
    }

    if sizes.len() < MIN_CURVE_BINS {
        return Err(AppError::insufficient_bins(sizes.len(), MIN_CURVE_BINS));
    }

    let mut cumulative = Vec::with_capacity(kept_volumes.len());
    let mut running = 0.0;
    for v in &kept_volumes {
        running += v;
        cumulative.push(running);
    }

    let lo = cumulative[0];
    let hi = cumulative[cumulative.len() - 1];
    let span = hi - lo;
    if !(span.is_finite() && span > 0.0) {
        // All informative volume sits in the first surviving bin (or the
        // volumes are degenerate): there is no curve to normalize.
        return Err(AppError::insufficient_bins(sizes.len(), MIN_CURVE_BINS));
    }

    let fractions = cumulative.iter().map(|c| (c - lo) / span).collect();

    Ok(CumulativeCurve { sizes, fractions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn curve_is_normalized_and_monotone() {
        let volume_sum = [2.0, 3.0, 5.0, 10.0];
        let count = [10.0, 10.0, 10.0, 10.0];
        let edges = [0.1, 0.2, 0.3, 0.4];

        let curve = build_cumulative(&volume_sum, &count, &edges, 5.0).unwrap();

        assert_eq!(curve.sizes, vec![0.1, 0.2, 0.3, 0.4]);
        assert!((curve.fractions[0] - 0.0).abs() < 1e-12);
        assert!((curve.fractions[curve.len() - 1] - 1.0).abs() < 1e-12);
        for w in curve.fractions.windows(2) {
            assert!(w[1] >= w[0]);
        }
        // cumsum = [2, 5, 10, 20]; normalized by (x - 2) / 18.
        assert!((curve.fractions[1] - 3.0 / 18.0).abs() < 1e-12);
        assert!((curve.fractions[2] - 8.0 / 18.0).abs() < 1e-12);
    }

    #[test]
    fn under_supported_bins_are_dropped_in_lock_step() {
        let volume_sum = [2.0, 99.0, 5.0];
        let count = [5.0, 4.0, 5.0]; // middle bin: 4 clasts < min_support 5
        let edges = [0.1, 0.2, 0.3];

        let curve = build_cumulative(&volume_sum, &count, &edges, 5.0).unwrap();

        assert_eq!(curve.sizes, vec![0.1, 0.3]);
        // The dropped bin's volume must not leak into the running sum.
        assert!((curve.fractions[0] - 0.0).abs() < 1e-12);
        assert!((curve.fractions[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn count_equal_to_support_survives() {
        let count = [5.0, 5.0];
        let curve = build_cumulative(&[1.0, 2.0], &count, &[0.1, 0.2], 5.0).unwrap();
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn too_few_surviving_bins_is_an_error() {
        let err = build_cumulative(&[1.0, 2.0, 3.0], &[9.0, 1.0, 1.0], &[0.1, 0.2, 0.3], 5.0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBins);
    }

    #[test]
    fn zero_span_is_an_error() {
        // Second bin adds no volume: cumulative span is zero.
        let err = build_cumulative(&[5.0, 0.0], &[9.0, 9.0], &[0.1, 0.2], 5.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBins);
    }

    #[test]
    fn mismatched_arrays_are_invalid_input() {
        let err = build_cumulative(&[1.0], &[1.0, 2.0], &[0.1], 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
