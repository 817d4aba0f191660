//! Fit session: one measurement set, one mode, one set of bounds.
//!
//! Given:
//! - distances `r_i >= 0`
//! - a [`FitMode`] (sigma fixed or free)
//! - an upper bound `U` shared by `mu` and `sigma` (lower bound 0)
//! - initial guesses for the free parameters
//!
//! we minimize the negative log-likelihood with the bounded simplex search
//! and return `[mu]` or `[mu, sigma]`. The same bounds are reused by the
//! half-maximum interval search.
//!
//! Everything is validated when the session is built; afterwards the only
//! possible failure is [`FitError::NonConvergence`].

use tracing::{info, instrument, warn};

use super::interval::half_max_interval;
use super::likelihood::{P2dLikelihood, neg_log_likelihood};
use crate::domain::{
    Bounds, ConfidenceInterval, DEFAULT_MU_GUESS, FitConfig, FitMode, FitResult, Goal,
    ParameterVector, default_sigma_guess,
};
use crate::error::{FitError, Result};
use crate::optim::{BOUNDARY_MARGIN, BoundedSimplex, SimplexOptions};

#[derive(Debug, Clone)]
pub struct P2dFitter {
    measurements: Vec<f64>,
    mode: FitMode,
    bounds: Bounds,
    mu_guess: f64,
    sigma_guess: f64,
    optimizer: BoundedSimplex,
}

impl P2dFitter {
    /// Session with default guesses (`mu = 0`, `sigma = min(10, U)`) and
    /// default optimizer settings.
    pub fn new(measurements: Vec<f64>, mode: FitMode, upper_bound: f64) -> Result<Self> {
        validate_measurements(&measurements)?;
        mode.validate()?;
        let bounds = Bounds::up_to(upper_bound)?;
        Ok(Self {
            measurements,
            mode,
            bounds,
            mu_guess: DEFAULT_MU_GUESS,
            sigma_guess: default_sigma_guess(upper_bound),
            optimizer: BoundedSimplex::default(),
        })
    }

    pub fn from_config(measurements: Vec<f64>, config: &FitConfig) -> Result<Self> {
        let sigma_guess = match config.mode {
            FitMode::FreeSigma => config.sigma_guess,
            FitMode::FixedSigma(_) => None,
        };
        Self::new(measurements, config.mode, config.upper_bound)?
            .with_guesses(config.mu_guess, sigma_guess)?
            .with_options(config.simplex)
    }

    /// Override the initial guesses. `sigma` is ignored under
    /// [`FitMode::FixedSigma`].
    pub fn with_initial_guess(self, mu: f64, sigma: Option<f64>) -> Result<Self> {
        let sigma = if self.mode.fits_sigma() { sigma } else { None };
        self.with_guesses(mu, sigma)
    }

    /// Start from the sample mean (and population standard deviation, when
    /// sigma is free), clamped into the bounds.
    ///
    /// Far from the data the default guesses can leave the search on the
    /// near-Rayleigh ridge at `mu ≈ 0`; moments avoid that for well
    /// separated distances.
    pub fn with_moment_guess(mut self) -> Self {
        let n = self.measurements.len() as f64;
        let mean = self.measurements.iter().sum::<f64>() / n;
        let variance = self
            .measurements
            .iter()
            .map(|r| (r - mean) * (r - mean))
            .sum::<f64>()
            / n;
        let bounds = self.bounds;
        let clamp = |x: f64| x.clamp(bounds.lower(), bounds.upper());
        self.mu_guess = clamp(mean);
        if self.mode.fits_sigma() {
            self.sigma_guess = clamp(variance.sqrt());
        }
        self
    }

    pub fn with_options(mut self, options: SimplexOptions) -> Result<Self> {
        self.optimizer = BoundedSimplex::new(options)?;
        Ok(self)
    }

    fn with_guesses(mut self, mu: f64, sigma: Option<f64>) -> Result<Self> {
        self.bounds.check_guess("mu", mu)?;
        if let Some(sigma) = sigma {
            self.bounds.check_guess("sigma", sigma)?;
            self.sigma_guess = sigma;
        }
        self.mu_guess = mu;
        Ok(self)
    }

    pub fn measurements(&self) -> &[f64] {
        &self.measurements
    }

    pub fn mode(&self) -> FitMode {
        self.mode
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn options(&self) -> &SimplexOptions {
        self.optimizer.options()
    }

    /// Start point handed to the optimizer: `[mu]` or `[mu, sigma]`.
    pub fn initial_guess(&self) -> ParameterVector {
        match self.mode {
            FitMode::FixedSigma(_) => ParameterVector::mu_only(self.mu_guess),
            FitMode::FreeSigma => ParameterVector::mu_sigma(self.mu_guess, self.sigma_guess),
        }
    }

    /// Maximum-likelihood fit with evaluation bookkeeping.
    #[instrument(skip_all, name = "p2d_fit", fields(n = self.measurements.len(), mode = %self.mode.display_name()))]
    pub fn fit(&self) -> Result<FitResult> {
        let stage = match self.mode {
            FitMode::FixedSigma(_) => "mu fit",
            FitMode::FreeSigma => "likelihood fit",
        };
        let guess = self.initial_guess();
        info!(guess = ?guess.as_slice(), upper_bound = self.bounds.upper(), "Starting P2D fit.");

        let objective = P2dLikelihood::new(&self.measurements, self.mode);
        let outcome = self
            .optimizer
            .optimize(&objective, guess.as_slice(), self.bounds, Goal::Minimize)
            .map_err(|e| e.in_stage(stage))?;

        info!(
            params = ?outcome.point.as_slice(),
            neg_log_likelihood = outcome.value,
            evaluations = outcome.evaluations,
            "P2D fit converged."
        );
        if self.mu_pinned_low(&outcome.point) {
            warn!(
                params = ?outcome.point.as_slice(),
                "Fitted mu sits on the lower bound; likely the mu = 0 ridge. Try with_moment_guess."
            );
        }
        Ok(FitResult {
            params: outcome.point,
            mode: self.mode,
            neg_log_likelihood: outcome.value,
            evaluations: outcome.evaluations,
            n_measurements: self.measurements.len(),
        })
    }

    /// Free-sigma fits that stall on the near-Rayleigh ridge end with `mu`
    /// within the start-point margin of the lower bound.
    fn mu_pinned_low(&self, params: &ParameterVector) -> bool {
        self.mode.fits_sigma()
            && params.mu() - self.bounds.lower() <= BOUNDARY_MARGIN * self.bounds.width()
    }

    /// `[mu]` under `FixedSigma`, `[mu, sigma]` under `FreeSigma`.
    pub fn solve(&self) -> Result<ParameterVector> {
        self.fit().map(|result| result.params)
    }

    /// Negative log-likelihood of the session's measurements at `params`.
    pub fn neg_log_likelihood(&self, params: &[f64]) -> Result<f64> {
        let expected = self.mode.dimension();
        if params.len() != expected {
            return Err(FitError::DimensionMismatch {
                expected,
                found: params.len(),
            });
        }
        Ok(neg_log_likelihood(params, &self.measurements, self.mode))
    }

    /// Half-maximum interval of `p2d(·; mu, sigma)` within the session bounds.
    pub fn confidence_interval(&self, mu: f64, sigma: f64) -> Result<ConfidenceInterval> {
        half_max_interval(&self.optimizer, self.bounds, mu, sigma)
    }
}

fn validate_measurements(measurements: &[f64]) -> Result<()> {
    if measurements.is_empty() {
        return Err(FitError::EmptyMeasurements);
    }
    if let Some((index, &value)) = measurements
        .iter()
        .enumerate()
        .find(|(_, r)| !(r.is_finite() && **r >= 0.0))
    {
        return Err(FitError::InvalidMeasurement { index, value });
    }
    Ok(())
}
