//! `p2d-fit` library crate.
//!
//! Maximum-likelihood estimation for the P2D pairwise-distance distribution:
//! given measured distances, estimate the true separation `mu` (and
//! optionally the localization spread `sigma`), and compute the half-maximum
//! interval of the fitted density.
//!
//! Layout:
//!
//! - `math`: modified Bessel function `I0` (plain, scaled and logarithmic)
//! - `models`: the P2D density
//! - `optim`: bounded Nelder-Mead search
//! - `fit`: likelihood objective, fit session, half-maximum interval
//! - `data`: seeded synthetic distance samples
//! - `report`: plain-text summaries
//!
//! ```no_run
//! use p2d_fit::{FitMode, P2dFitter};
//!
//! let fitter = P2dFitter::new(vec![5.0, 6.0, 7.0, 5.5, 6.5], FitMode::FixedSigma(2.0), 100.0)?;
//! let params = fitter.solve()?;
//! let interval = fitter.confidence_interval(params.mu(), 2.0)?;
//! # Ok::<(), p2d_fit::FitError>(())
//! ```

pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod optim;
pub mod report;

pub use domain::{Bounds, ConfidenceInterval, FitConfig, FitMode, FitResult, ParameterVector};
pub use error::{FitError, Result};
pub use fit::P2dFitter;
pub use optim::{BoundedSimplex, SimplexOptions};
