//! Clast-shape statistics.
//!
//! Two classic descriptors over the measured caliper axes `a >= b >= c`
//! (long, intermediate, short):
//!
//! - Zingg ratios: per-clast `S/I = c/b` and `I/L = b/a`, summarized by their
//!   means. The pair locates the population on the Zingg diagram
//!   (disc / sphere / blade / rod quadrants).
//! - Wilson & Huang (1979) shape factor: `(b + c) / (2a)` per clast, reported
//!   against diameter.
//!
//! Clasts without measured long/intermediate axes are skipped; the short axis
//! is the `diameter` every record already carries.

use serde::{Deserialize, Serialize};

use crate::domain::Clast;
use crate::error::AppError;

/// Population-level Zingg summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZinggStats {
    /// Mean `c/b` (short over intermediate).
    pub si_mean: f64,
    /// Mean `b/a` (intermediate over long).
    pub il_mean: f64,
    /// Clasts entering the means.
    pub n_clasts: usize,
}

/// One clast's shape factor against its sieve diameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShapePoint {
    pub diameter: f64,
    pub factor: f64,
}

/// Mean Zingg ratios over clasts with all three axes measured.
///
/// `min_diameter` excludes clasts too small for their axes to be resolved
/// reliably; pass 0.0 to keep everything.
pub fn zingg_stats(clasts: &[Clast], min_diameter: f64) -> Result<ZinggStats, AppError> {
    let mut si_sum = 0.0;
    let mut il_sum = 0.0;
    let mut n = 0usize;

    for clast in clasts {
        let (Some(a), Some(b)) = (clast.extras.a_axis, clast.extras.b_axis) else {
            continue;
        };
        let c = clast.diameter;
        if !(a > 0.0 && b > 0.0 && c > 0.0) || c < min_diameter {
            continue;
        }
        si_sum += c / b;
        il_sum += b / a;
        n += 1;
    }

    if n == 0 {
        return Err(AppError::insufficient_points(0, 1));
    }

    Ok(ZinggStats {
        si_mean: si_sum / n as f64,
        il_mean: il_sum / n as f64,
        n_clasts: n,
    })
}

/// Wilson & Huang (1979) shape factor `(b + c) / (2a)` per clast.
///
/// Clasts missing axes (or with non-positive measurements) are skipped; the
/// series is returned in input order.
pub fn shape_factor_series(clasts: &[Clast]) -> Vec<ShapePoint> {
    let mut out = Vec::new();
    for clast in clasts {
        let (Some(a), Some(b)) = (clast.extras.a_axis, clast.extras.b_axis) else {
            continue;
        };
        let c = clast.diameter;
        if !(a > 0.0 && b > 0.0 && c > 0.0) {
            continue;
        }
        out.push(ShapePoint {
            diameter: c,
            factor: (b + c) / (2.0 * a),
        });
    }
    out
}
