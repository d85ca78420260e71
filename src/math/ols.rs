//! Linear least squares solver.
//!
//! Two callers share this kernel:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! - the fractal regression fits a degree-1 polynomial in log-log space
//! - the damped nonlinear solver repeatedly solves augmented linear
//!   sub-problems for its trial steps
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when the
//!   design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Because our parameter dimension is tiny (2–3 columns), SVD performance is
//!   a non-issue.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if a strict solve fails. Log-log
    // count regressions over a narrow window can come out nearly collinear.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = b0 + b1 x` by ordinary least squares.
///
/// Returns `(intercept, slope)`, or `None` when the system is degenerate
/// (fewer than two points, or no spread in `x`).
pub fn polyfit_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let (x_min, x_max) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !(x_max > x_min) {
        return None;
    }

    let n = x.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = xi;
    }
    let rhs = DVector::from_column_slice(y);

    let beta = solve_least_squares(&design, &rhs)?;
    Some((beta[0], beta[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn polyfit_line_recovers_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|&v| -1.5 + 0.75 * v).collect();

        let (b0, b1) = polyfit_line(&x, &y).unwrap();
        assert!((b0 + 1.5).abs() < 1e-10);
        assert!((b1 - 0.75).abs() < 1e-10);
    }

    #[test]
    fn polyfit_line_rejects_degenerate_input() {
        assert!(polyfit_line(&[1.0], &[2.0]).is_none());
        assert!(polyfit_line(&[1.0, 2.0], &[1.0]).is_none());
        assert!(polyfit_line(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
    }
}
