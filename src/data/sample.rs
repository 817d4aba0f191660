//! Synthetic pairwise-distance samples.
//!
//! Two points scatter around a true separation `mu` with an isotropic 2-D
//! Gaussian of width `sigma`; the measured distance is
//!
//! ```text
//! r = hypot(mu + dx, dy),   dx, dy ~ N(0, sigma²)
//! ```
//!
//! which is exactly P2D-distributed. Samples are seeded so tests and
//! benchmarks are reproducible.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::types::validate_sigma;
use crate::error::{FitError, Result};

/// Draw `n` distances from `P2D(mu, sigma)` with a fixed seed.
pub fn generate_distances(mu: f64, sigma: f64, n: usize, seed: u64) -> Result<Vec<f64>> {
    if n == 0 {
        return Err(FitError::EmptyMeasurements);
    }
    validate_sigma(sigma)?;
    if !(mu.is_finite() && mu >= 0.0) {
        return Err(FitError::InvalidParameter { name: "mu", value: mu });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, sigma).map_err(|_| FitError::InvalidSigma { value: sigma })?;

    let distances = (0..n)
        .map(|_| {
            let dx = normal.sample(&mut rng);
            let dy = normal.sample(&mut rng);
            (mu + dx).hypot(dy)
        })
        .collect();
    Ok(distances)
}
