//! Probability density models.
//!
//! Densities are implemented as small, pure functions so the likelihood and
//! interval code can stay generic over parameters.

pub mod p2d;

pub use p2d::*;
