//! P2D fitting orchestration.
//!
//! Responsibilities:
//!
//! - build the negative log-likelihood objective for a measurement set
//! - run the bounded simplex search for `[mu]` or `[mu, sigma]`
//! - locate the half-maximum interval for a known `(mu, sigma)`

pub mod fitter;
pub mod interval;
pub mod likelihood;

pub use fitter::*;
pub use interval::*;
pub use likelihood::*;
