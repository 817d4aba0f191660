//! Shared domain types.
//!
//! Configuration and results are serializable so a caller can store a fit
//! configuration next to its data set and export results as-is.

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use crate::optim::SimplexOptions;

/// Default initial guess for `mu`.
pub const DEFAULT_MU_GUESS: f64 = 0.0;
/// Default initial guess for `sigma`, capped by the upper bound
/// (see [`default_sigma_guess`]).
pub const DEFAULT_SIGMA_GUESS: f64 = 10.0;
/// Default upper bound shared by `mu` and `sigma`.
pub const DEFAULT_UPPER_BOUND: f64 = 100.0;

/// Initial `sigma` when the caller gives none: `min(DEFAULT_SIGMA_GUESS, upper)`.
pub fn default_sigma_guess(upper_bound: f64) -> f64 {
    DEFAULT_SIGMA_GUESS.min(upper_bound)
}

/// Whether `sigma` is estimated together with `mu` or held fixed.
///
/// The mode fixes the dimensionality of the problem: one free parameter
/// (`mu`) under `FixedSigma`, two (`mu`, `sigma`) under `FreeSigma`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    FixedSigma(f64),
    #[default]
    FreeSigma,
}

impl FitMode {
    /// Map the boolean "fit sigma?" switch used by callers onto a mode.
    ///
    /// `sigma` is only used when `fit_sigma` is false.
    pub fn from_flag(fit_sigma: bool, sigma: f64) -> Self {
        if fit_sigma {
            FitMode::FreeSigma
        } else {
            FitMode::FixedSigma(sigma)
        }
    }

    /// Number of free parameters.
    pub fn dimension(self) -> usize {
        match self {
            FitMode::FixedSigma(_) => 1,
            FitMode::FreeSigma => 2,
        }
    }

    pub fn fits_sigma(self) -> bool {
        matches!(self, FitMode::FreeSigma)
    }

    /// Reject a non-positive or non-finite fixed sigma.
    pub fn validate(self) -> Result<()> {
        match self {
            FitMode::FixedSigma(sigma) => validate_sigma(sigma),
            FitMode::FreeSigma => Ok(()),
        }
    }

    /// Human-readable label for reports.
    pub fn display_name(self) -> String {
        match self {
            FitMode::FixedSigma(sigma) => format!("fixed sigma = {sigma}"),
            FitMode::FreeSigma => "free sigma".to_string(),
        }
    }
}

pub(crate) fn validate_sigma(sigma: f64) -> Result<()> {
    if sigma.is_finite() && sigma > 0.0 {
        Ok(())
    } else {
        Err(FitError::InvalidSigma { value: sigma })
    }
}

/// Closed interval applied to every free parameter (and to `r` in the
/// confidence-interval searches).
///
/// Deserialization goes through [`Bounds::new`], so a decoded value holds the
/// same invariant as a constructed one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds")]
pub struct Bounds {
    lower: f64,
    upper: f64,
}

#[derive(Deserialize)]
struct RawBounds {
    lower: f64,
    upper: f64,
}

impl TryFrom<RawBounds> for Bounds {
    type Error = FitError;

    fn try_from(raw: RawBounds) -> Result<Self> {
        Bounds::new(raw.lower, raw.upper)
    }
}

impl Bounds {
    /// Requires finite `0 <= lower < upper`.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !(lower.is_finite() && upper.is_finite() && lower >= 0.0 && upper > lower) {
            return Err(FitError::InvalidBounds { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// `[0, upper]`, the bounds every P2D fit uses.
    pub fn up_to(upper: f64) -> Result<Self> {
        Self::new(0.0, upper)
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }

    /// Error unless `value` lies in `[lower, upper]`.
    pub fn check_guess(&self, name: &'static str, value: f64) -> Result<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(FitError::GuessOutOfBounds {
                name,
                value,
                lower: self.lower,
                upper: self.upper,
            })
        }
    }
}

/// Estimated parameters: `[mu]` or `[mu, sigma]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterVector {
    values: Vec<f64>,
}

impl ParameterVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn mu_only(mu: f64) -> Self {
        Self { values: vec![mu] }
    }

    pub fn mu_sigma(mu: f64, sigma: f64) -> Self {
        Self {
            values: vec![mu, sigma],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// First coordinate (`NaN` for an empty vector).
    pub fn mu(&self) -> f64 {
        self.values.first().copied().unwrap_or(f64::NAN)
    }

    /// Second coordinate, present only for free-sigma fits.
    pub fn sigma(&self) -> Option<f64> {
        self.values.get(1).copied()
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Minimize,
    Maximize,
}

/// Distances where the density drops to half its peak value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    /// Distance of the density peak.
    pub peak: f64,
    /// Density value at `peak`.
    pub peak_density: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn as_pair(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }
}

/// Outcome of a full fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub params: ParameterVector,
    pub mode: FitMode,
    /// Negative log-likelihood at `params`.
    pub neg_log_likelihood: f64,
    /// Objective evaluations spent by the optimizer.
    pub evaluations: usize,
    pub n_measurements: usize,
}

impl FitResult {
    pub fn mu(&self) -> f64 {
        self.params.mu()
    }

    /// Fitted sigma under `FreeSigma`, the fixed value otherwise.
    pub fn sigma(&self) -> f64 {
        match self.mode {
            FitMode::FixedSigma(sigma) => sigma,
            FitMode::FreeSigma => self.params.sigma().unwrap_or(f64::NAN),
        }
    }
}

/// Everything a fit session needs besides the measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub mode: FitMode,
    /// Upper bound for `mu` and `sigma` (the lower bound is always 0).
    pub upper_bound: f64,
    pub mu_guess: f64,
    /// Initial `sigma` under `FreeSigma`; ignored under `FixedSigma`.
    /// `None` means [`default_sigma_guess`] for the configured upper bound.
    pub sigma_guess: Option<f64>,
    pub simplex: SimplexOptions,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            mode: FitMode::default(),
            upper_bound: DEFAULT_UPPER_BOUND,
            mu_guess: DEFAULT_MU_GUESS,
            sigma_guess: None,
            simplex: SimplexOptions::default(),
        }
    }
}
