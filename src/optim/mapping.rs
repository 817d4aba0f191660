//! Bounded ↔ unbounded parameter mapping.
//!
//! The simplex search runs in `ℝⁿ`; every coordinate is pushed through a
//! scaled logistic so the objective is only ever evaluated inside the bounds:
//!
//! - `unbounded_to_bounded(y) = lo + (hi - lo) / (1 + e^{-y})`
//! - `bounded_to_unbounded(x) = ln((x - lo) / (hi - x))`
//!
//! `y → ±∞` as `x → hi / lo`. Both functions are pure, so the same pair serves
//! the likelihood fit and every confidence-interval search.

use nalgebra::DVector;

use crate::domain::Bounds;

/// Start points are kept at least this fraction of the bound width away from
/// either bound; the logit of a bound itself is infinite.
pub const BOUNDARY_MARGIN: f64 = 1e-3;

/// Map `x ∈ (lo, hi)` to `ℝ`. Infinite at the bounds, `NaN` outside them.
pub fn bounded_to_unbounded(x: f64, bounds: Bounds) -> f64 {
    ((x - bounds.lower()) / (bounds.upper() - x)).ln()
}

/// Map `y ∈ ℝ` back into `[lo, hi]`.
pub fn unbounded_to_bounded(y: f64, bounds: Bounds) -> f64 {
    bounds.lower() + bounds.width() / (1.0 + (-y).exp())
}

/// Clamp `x` into `[lo + m, hi - m]` with `m = BOUNDARY_MARGIN · (hi - lo)`.
pub fn clamp_to_interior(x: f64, bounds: Bounds) -> f64 {
    let margin = BOUNDARY_MARGIN * bounds.width();
    x.clamp(bounds.lower() + margin, bounds.upper() - margin)
}

/// Map a start point into unbounded space, clamping it off the bounds first.
pub fn start_point(guess: &[f64], bounds: Bounds) -> DVector<f64> {
    DVector::from_iterator(
        guess.len(),
        guess
            .iter()
            .map(|&x| bounded_to_unbounded(clamp_to_interior(x, bounds), bounds)),
    )
}

/// Map an unbounded point back to parameter space.
pub fn to_bounded(y: &DVector<f64>, bounds: Bounds) -> Vec<f64> {
    y.iter().map(|&v| unbounded_to_bounded(v, bounds)).collect()
}
