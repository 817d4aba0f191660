use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FitError>;

/// Every failure the fitting core can report.
///
/// Input problems are caught when a session (or an optimizer call) is set up.
/// While solving, the only possible failure is [`FitError::NonConvergence`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("No measurements to fit.")]
    EmptyMeasurements,

    #[error("Measurement {index} is invalid ({value}); distances must be finite and >= 0.")]
    InvalidMeasurement { index: usize, value: f64 },

    #[error("Invalid sigma {value}; sigma must be finite and > 0.")]
    InvalidSigma { value: f64 },

    #[error("Invalid {name} = {value}; expected a finite, non-negative value.")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Invalid bounds [{lower}, {upper}]; need finite 0 <= lower < upper.")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("Initial {name} = {value} lies outside the bounds [{lower}, {upper}].")]
    GuessOutOfBounds {
        name: &'static str,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("Expected {expected} parameter(s), got {found}.")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Invalid optimizer option {name} = {value}.")]
    InvalidOption { name: &'static str, value: f64 },

    #[error("P2D fit failed during {stage}: no convergence within {evaluations} evaluations.")]
    NonConvergence {
        stage: &'static str,
        evaluations: usize,
    },
}

impl FitError {
    /// True when the failure came from an exhausted evaluation budget.
    ///
    /// Callers typically retry with different initial guesses in that case.
    pub fn is_non_convergence(&self) -> bool {
        matches!(self, FitError::NonConvergence { .. })
    }

    /// Relabel a non-convergence failure with the stage that produced it.
    pub fn in_stage(self, stage: &'static str) -> Self {
        match self {
            FitError::NonConvergence { evaluations, .. } => {
                FitError::NonConvergence { stage, evaluations }
            }
            other => other,
        }
    }
}
