//! The P2D pairwise-distance density.
//!
//! The distance between two points whose positions scatter with an isotropic
//! 2-D Gaussian of width `σ` around a true separation `μ` follows
//!
//! ```text
//! p2d(r) = (r / σ²) · exp(-(μ² + r²) / (2σ²)) · I0(r·μ / σ²)
//! ```
//!
//! Numerical notes:
//! - `exp(-(μ² + r²)/(2σ²))` underflows while `I0(rμ/σ²)` overflows for well
//!   separated points, so we fold the exponential growth of `I0` into the
//!   Gaussian factor: `exp(-(r - |μ|)²/(2σ²)) · I0e(r|μ|/σ²)`. Both factors
//!   stay in `[0, 1]`.
//! - `I0` is even, so a negative `μ` gives the same density as `|μ|`.

use crate::math::{bessel_i0e, ln_bessel_i0};

/// `p2d(r; μ, σ)`.
///
/// Returns `0.0` for `r <= 0` and for a degenerate `σ` (non-positive or not
/// finite), never `NaN` for finite inputs.
pub fn p2d(r: f64, mu: f64, sigma: f64) -> f64 {
    if !(r > 0.0) || !(sigma > 0.0) || !sigma.is_finite() {
        return 0.0;
    }
    let s2 = sigma * sigma;
    let mu = mu.abs();
    let d = r - mu;
    let value = (r / s2) * (-(d * d) / (2.0 * s2)).exp() * bessel_i0e(r * mu / s2);
    if value.is_nan() { 0.0 } else { value }
}

/// `ln p2d(r; μ, σ)`, `-inf` wherever [`p2d`] is zero.
///
/// Computed directly in log space so points far out in the tail keep a
/// finite log-density even where the density itself underflows.
pub fn ln_p2d(r: f64, mu: f64, sigma: f64) -> f64 {
    if !(r > 0.0) || !(sigma > 0.0) || !sigma.is_finite() {
        return f64::NEG_INFINITY;
    }
    let s2 = sigma * sigma;
    let mu = mu.abs();
    let value = r.ln() - s2.ln() - (mu * mu + r * r) / (2.0 * s2) + ln_bessel_i0(r * mu / s2);
    if value.is_nan() {
        f64::NEG_INFINITY
    } else {
        value
    }
}
