//! Damped nonlinear least squares (Levenberg-Marquardt).
//!
//! The distribution models are nonlinear in their parameters, so unlike a
//! plain regression there is no closed-form solve. We minimize
//!
//! ```text
//! S(θ) = Σ r_i(θ)^2
//! ```
//!
//! by iterating damped Gauss-Newton steps: each step solves the augmented
//! linear problem
//!
//! ```text
//! minimize ‖J δ + r‖^2 + λ ‖δ‖^2
//! ```
//!
//! through the shared SVD kernel, where `J` is a forward-difference Jacobian.
//! A step that lowers `S` is accepted and relaxes the damping; a step that
//! does not is discarded and the damping is tightened.
//!
//! The residual closure returns `false` for parameter vectors outside the
//! model's domain (e.g. non-positive scale); such trial steps are rejected
//! exactly like steps that raise the objective.

use nalgebra::{DMatrix, DVector};

use crate::math::solve_least_squares;

/// Damping bounds. Outside this range the search has either flattened into
/// plain Gauss-Newton or stalled into vanishing steps.
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e10;

/// Solver knobs; `Default` is tuned for the smooth CDF residuals fitted here.
#[derive(Debug, Clone)]
pub struct LmOptions {
    pub max_iters: usize,
    /// Relative SSE decrease below which an accepted step counts as converged.
    pub ftol: f64,
    /// Initial damping.
    pub lambda0: f64,
    /// Damping multiplier after a rejected step.
    pub lambda_up: f64,
    /// Damping multiplier after an accepted step.
    pub lambda_down: f64,
    /// Relative forward-difference step for the Jacobian.
    pub fd_step: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iters: 200,
            ftol: 1e-12,
            lambda0: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            fd_step: 1e-8,
        }
    }
}

/// Converged solve.
#[derive(Debug, Clone)]
pub struct LmFit {
    pub params: Vec<f64>,
    pub sse: f64,
    pub iterations: usize,
}

/// Minimize `Σ r_i(θ)^2` from `guess`.
///
/// `residuals(θ, out)` fills `out` (length `n_residuals`) and returns `false`
/// when `θ` is outside the model's domain. Returns `None` when the guess is
/// outside the domain, the Jacobian cannot be evaluated, or the iteration cap
/// is reached without convergence.
pub fn levenberg_marquardt<F>(
    residuals: &F,
    guess: &[f64],
    n_residuals: usize,
    opts: &LmOptions,
) -> Option<LmFit>
where
    F: Fn(&[f64], &mut [f64]) -> bool,
{
    let p = guess.len();
    if p == 0 || n_residuals == 0 {
        return None;
    }

    let mut theta = guess.to_vec();
    let mut r = vec![0.0; n_residuals];
    if !eval(residuals, &theta, &mut r) {
        return None;
    }
    let mut sse = sum_sq(&r);

    let mut lambda = opts.lambda0;
    let mut r_probe = vec![0.0; n_residuals];
    let mut converged = false;
    let mut iterations = 0;

    for iter in 1..=opts.max_iters {
        iterations = iter;

        // Forward-difference Jacobian at the current accepted point. The
        // parameter domains are open orthants, so a small positive step from a
        // valid point stays valid; failure here means the point itself is on a
        // numerical cliff and the fit cannot proceed.
        let mut jac = DMatrix::<f64>::zeros(n_residuals, p);
        for j in 0..p {
            let h = (theta[j].abs() * opts.fd_step).max(opts.fd_step);
            let mut probe = theta.clone();
            probe[j] += h;
            if !eval(residuals, &probe, &mut r_probe) {
                return None;
            }
            for i in 0..n_residuals {
                jac[(i, j)] = (r_probe[i] - r[i]) / h;
            }
        }

        // Tighten the damping until a step lowers the objective.
        let mut stepped = false;
        while lambda <= LAMBDA_MAX {
            let mut aug = DMatrix::<f64>::zeros(n_residuals + p, p);
            aug.view_mut((0, 0), (n_residuals, p)).copy_from(&jac);
            let sqrt_lambda = lambda.sqrt();
            for j in 0..p {
                aug[(n_residuals + j, j)] = sqrt_lambda;
            }

            let mut rhs = DVector::<f64>::zeros(n_residuals + p);
            for i in 0..n_residuals {
                rhs[i] = -r[i];
            }

            let Some(delta) = solve_least_squares(&aug, &rhs) else {
                lambda *= opts.lambda_up;
                continue;
            };

            let trial: Vec<f64> = theta
                .iter()
                .zip(delta.iter())
                .map(|(t, d)| t + d)
                .collect();

            if eval(residuals, &trial, &mut r_probe) {
                let trial_sse = sum_sq(&r_probe);
                if trial_sse < sse {
                    let drop = sse - trial_sse;
                    theta = trial;
                    r.copy_from_slice(&r_probe);
                    sse = trial_sse;
                    lambda = (lambda * opts.lambda_down).max(LAMBDA_MIN);
                    stepped = true;
                    if drop <= opts.ftol * sse.max(1.0) {
                        converged = true;
                    }
                    break;
                }
            }
            lambda *= opts.lambda_up;
        }

        if converged {
            break;
        }
        if !stepped {
            // No damping level improves the objective: the gradient has
            // vanished to working precision, i.e. a (local) minimum.
            converged = true;
            break;
        }
    }

    if !converged || !sse.is_finite() {
        return None;
    }

    Some(LmFit {
        params: theta,
        sse,
        iterations,
    })
}

fn eval<F>(residuals: &F, theta: &[f64], out: &mut [f64]) -> bool
where
    F: Fn(&[f64], &mut [f64]) -> bool,
{
    residuals(theta, out) && out.iter().all(|v| v.is_finite())
}

fn sum_sq(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}
