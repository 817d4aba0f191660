//! Negative log-likelihood of a measurement set under the P2D density.
//!
//! ```text
//! NLL(μ, σ) = Σ_i -ln p2d(r_i; μ, σ)
//! ```
//!
//! `σ` is the second parameter under [`FitMode::FreeSigma`] and the fixed
//! value otherwise. A measurement with zero density (`r = 0`, or a degenerate
//! `σ` reached at the edge of the search space) contributes
//! [`ZERO_DENSITY_PENALTY`] instead of `+inf`, and no term is allowed to
//! exceed it, so the optimizer always sees a finite, total objective.

use crate::domain::FitMode;
use crate::models::ln_p2d;
use crate::optim::Objective;

/// Largest contribution a single measurement can make to the objective.
pub const ZERO_DENSITY_PENALTY: f64 = 1.0e6;

/// `-ln p2d(r; μ, σ)`, capped at [`ZERO_DENSITY_PENALTY`].
pub fn neg_log_density(r: f64, mu: f64, sigma: f64) -> f64 {
    let ln_p = ln_p2d(r, mu, sigma);
    if ln_p.is_finite() {
        (-ln_p).min(ZERO_DENSITY_PENALTY)
    } else {
        ZERO_DENSITY_PENALTY
    }
}

/// Negative log-likelihood of `measurements` at `params` (`[μ]` or `[μ, σ]`).
///
/// Missing parameters read as `NaN` and therefore hit the penalty; callers
/// that need a length check go through [`crate::fit::P2dFitter`].
pub fn neg_log_likelihood(params: &[f64], measurements: &[f64], mode: FitMode) -> f64 {
    let mu = params.first().copied().unwrap_or(f64::NAN);
    let sigma = match mode {
        FitMode::FixedSigma(sigma) => sigma,
        FitMode::FreeSigma => params.get(1).copied().unwrap_or(f64::NAN),
    };
    measurements
        .iter()
        .map(|&r| neg_log_density(r, mu, sigma))
        .sum()
}

/// The likelihood objective handed to the optimizer.
#[derive(Debug, Clone, Copy)]
pub struct P2dLikelihood<'a> {
    measurements: &'a [f64],
    mode: FitMode,
}

impl<'a> P2dLikelihood<'a> {
    pub fn new(measurements: &'a [f64], mode: FitMode) -> Self {
        Self { measurements, mode }
    }
}

impl Objective for P2dLikelihood<'_> {
    fn value(&self, params: &[f64]) -> f64 {
        neg_log_likelihood(params, self.measurements, self.mode)
    }
}
