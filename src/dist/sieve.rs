//! Fixed-width size binning ("sieving").
//!
//! Raw `(diameter, volume)` pairs are accumulated into half-open bins
//! `[edge, edge + step)` over `[min_size, max_size)`. The bin index is
//! computed directly from the diameter, so sieving is O(n) regardless of the
//! lattice resolution.
//!
//! Clasts outside the binned range are silently dropped; the lattice bounds
//! are the caller's statement of which sizes the instrument resolves.

use crate::domain::{BinConfig, SievedBins};
use crate::error::AppError;

/// Number of bins the lattice produces.
///
/// `floor((max - min) / step)`; a trailing partial interval is not binned.
pub fn bin_count(config: &BinConfig) -> Result<usize, AppError> {
    let BinConfig {
        min_size,
        max_size,
        step,
    } = *config;

    if !(min_size.is_finite() && max_size.is_finite() && step.is_finite()) {
        return Err(AppError::invalid_bin_config(min_size, max_size, step));
    }
    if step <= 0.0 || max_size <= min_size {
        return Err(AppError::invalid_bin_config(min_size, max_size, step));
    }

    let n = ((max_size - min_size) / step).floor() as usize;
    if n == 0 {
        return Err(AppError::invalid_bin_config(min_size, max_size, step));
    }
    Ok(n)
}

/// Lower edge of every bin, in increasing order.
pub fn bin_edges(config: &BinConfig) -> Result<Vec<f64>, AppError> {
    let n = bin_count(config)?;
    Ok((0..n)
        .map(|i| config.min_size + i as f64 * config.step)
        .collect())
}

/// Accumulate `(diameter, volume)` pairs into per-bin aggregates.
///
/// Per clast landing in bin `i`: `volume_sum[i] += volume`, `count[i] += 1`,
/// and `representative_size[i]` is overwritten with the diameter (so it holds
/// the last clast accumulated, an accumulation-order diagnostic).
pub fn sieve(diameters: &[f64], volumes: &[f64], config: &BinConfig) -> Result<SievedBins, AppError> {
    if diameters.len() != volumes.len() {
        return Err(AppError::invalid_input(format!(
            "Diameter/volume arrays differ in length ({} vs {}).",
            diameters.len(),
            volumes.len()
        )));
    }

    let n = bin_count(config)?;
    let edges = bin_edges(config)?;

    let mut volume_sum = vec![0.0; n];
    let mut count = vec![0.0; n];
    let mut representative_size = vec![0.0; n];

    for (&d, &v) in diameters.iter().zip(volumes.iter()) {
        // Non-finite diameters must not reach the index cast below (a NaN
        // offset would saturate to bin 0).
        if !d.is_finite() {
            continue;
        }
        let offset = (d - config.min_size) / config.step;
        if offset < 0.0 {
            continue;
        }
        let idx = offset.floor() as usize;
        if idx >= n {
            continue;
        }

        volume_sum[idx] += v;
        count[idx] += 1.0;
        representative_size[idx] = d;
    }

    Ok(SievedBins {
        bin_edges: edges,
        volume_sum,
        count,
        representative_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn config(min: f64, max: f64, step: f64) -> BinConfig {
        BinConfig {
            min_size: min,
            max_size: max,
            step,
        }
    }

    #[test]
    fn bin_count_floors_partial_intervals() {
        assert_eq!(bin_count(&config(0.0, 1.0, 0.25)).unwrap(), 4);
        // 1.1 / 0.25 = 4.4 -> the partial fifth interval is dropped.
        assert_eq!(bin_count(&config(0.0, 1.1, 0.25)).unwrap(), 4);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        for bad in [
            config(1.0, 0.0, 0.1),
            config(0.0, 1.0, 0.0),
            config(0.0, 1.0, -0.1),
            config(0.0, 0.0, 0.1),
            config(0.0, f64::NAN, 0.1),
            config(0.0, 0.05, 0.1), // range smaller than one step
        ] {
            let err = sieve(&[0.5], &[1.0], &bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidBinConfig);
        }
    }

    #[test]
    fn bins_partition_the_range() {
        // Every in-range clast lands in exactly one bin: totals are conserved.
        let cfg = config(0.0, 2.0, 0.5);
        let diameters = [0.0, 0.1, 0.49, 0.5, 0.99, 1.0, 1.5, 1.99];
        let volumes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];

        let bins = sieve(&diameters, &volumes, &cfg).unwrap();

        let total_count: f64 = bins.count.iter().sum();
        let total_volume: f64 = bins.volume_sum.iter().sum();
        assert!((total_count - diameters.len() as f64).abs() < 1e-12);
        assert!((total_volume - volumes.iter().sum::<f64>()).abs() < 1e-12);

        // Lower-inclusive, upper-exclusive membership.
        assert!((bins.count[0] - 3.0).abs() < 1e-12); // 0.0, 0.1, 0.49
        assert!((bins.count[1] - 2.0).abs() < 1e-12); // 0.5, 0.99
        assert!((bins.count[2] - 2.0).abs() < 1e-12); // 1.0, 1.5
        assert!((bins.count[3] - 1.0).abs() < 1e-12); // 1.99
    }

    #[test]
    fn out_of_range_clasts_are_dropped_silently() {
        let cfg = config(1.0, 2.0, 0.5);
        let diameters = [0.5, 2.0, 2.5, 1.5, f64::NAN];
        let volumes = [1.0; 5];

        let bins = sieve(&diameters, &volumes, &cfg).unwrap();
        let total: f64 = bins.count.iter().sum();
        // Only 1.5 is inside [1.0, 2.0); 2.0 sits on the open upper bound.
        assert!((total - 1.0).abs() < 1e-12);
        assert!((bins.count[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn representative_size_is_last_write() {
        let cfg = config(0.0, 1.0, 1.0);
        let bins = sieve(&[0.2, 0.8, 0.4], &[1.0, 1.0, 1.0], &cfg).unwrap();
        assert!((bins.representative_size[0] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn mismatched_arrays_are_invalid_input() {
        let err = sieve(&[0.5, 0.6], &[1.0], &config(0.0, 1.0, 0.5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn edges_are_the_lattice() {
        let edges = bin_edges(&config(0.01, 0.07, 0.02)).unwrap();
        assert_eq!(edges.len(), 3);
        assert!((edges[0] - 0.01).abs() < 1e-12);
        assert!((edges[1] - 0.03).abs() < 1e-12);
        assert!((edges[2] - 0.05).abs() < 1e-12);
    }
}
