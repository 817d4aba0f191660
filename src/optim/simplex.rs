//! Nelder-Mead simplex search over bounded parameters.
//!
//! Given:
//! - a scalar objective `f(x)` (no derivatives)
//! - an initial guess and a [`Bounds`] shared by every coordinate
//! - a goal (minimize or maximize)
//!
//! we map the guess into unbounded space (see [`super::mapping`]), run a
//! Nelder-Mead search there and map the best vertex back.
//!
//! Implementation choices:
//! - Coefficients: reflection 1, expansion 2, contraction 0.5, shrink 0.5.
//! - Initial simplex: the start point plus, for vertex `i`, the start point
//!   offset by `initial_step` in coordinates `0..i`.
//! - Maximization flips the sign of the objective; reported values are
//!   unflipped.
//! - Convergence: every vertex value moved by at most
//!   `max(rel_tol · max(|prev|, |cur|), abs_tol)` over one iteration.
//! - The evaluation budget is hard: the evaluation that would exceed
//!   `max_evaluations` is never made, and the search fails with
//!   [`FitError::NonConvergence`].

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::mapping::{start_point, to_bounded};
use crate::domain::{Bounds, Goal, ParameterVector};
use crate::error::{FitError, Result};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Stage label used when the caller does not tag the search.
const DEFAULT_STAGE: &str = "simplex search";

/// Scalar objective evaluated at a point in (bounded) parameter space.
pub trait Objective {
    fn value(&self, params: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64,
{
    fn value(&self, params: &[f64]) -> f64 {
        self(params)
    }
}

/// Search settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplexOptions {
    /// Initial simplex edge, in unbounded units.
    pub initial_step: f64,
    pub rel_tol: f64,
    pub abs_tol: f64,
    /// Hard cap on objective evaluations per search.
    pub max_evaluations: usize,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            initial_step: 0.2,
            rel_tol: 1e-9,
            abs_tol: 1e-12,
            max_evaluations: 500,
        }
    }
}

impl SimplexOptions {
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(FitError::InvalidOption { name, value })
            }
        };
        positive("initial_step", self.initial_step)?;
        positive("rel_tol", self.rel_tol)?;
        positive("abs_tol", self.abs_tol)?;
        if self.max_evaluations == 0 {
            return Err(FitError::InvalidOption {
                name: "max_evaluations",
                value: 0.0,
            });
        }
        Ok(())
    }

    fn converged(&self, previous: f64, current: f64) -> bool {
        let difference = (previous - current).abs();
        let size = previous.abs().max(current.abs());
        difference <= size * self.rel_tol || difference <= self.abs_tol
    }
}

/// Result of a successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    /// Best point, in bounded parameter space.
    pub point: ParameterVector,
    /// Objective value at `point` (not sign-flipped).
    pub value: f64,
    pub evaluations: usize,
    pub iterations: usize,
}

/// Bounded Nelder-Mead optimizer.
#[derive(Debug, Clone, Default)]
pub struct BoundedSimplex {
    options: SimplexOptions,
}

impl BoundedSimplex {
    pub fn new(options: SimplexOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &SimplexOptions {
        &self.options
    }

    /// Optimize `objective` starting from `initial_guess`.
    ///
    /// Guesses on or outside the bounds are pulled inside by
    /// [`super::mapping::BOUNDARY_MARGIN`] before the search starts.
    pub fn optimize<O>(
        &self,
        objective: &O,
        initial_guess: &[f64],
        bounds: Bounds,
        goal: Goal,
    ) -> Result<OptimOutcome>
    where
        O: Objective + ?Sized,
    {
        if initial_guess.is_empty() {
            return Err(FitError::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }
        if let Some(&bad) = initial_guess.iter().find(|x| !x.is_finite()) {
            return Err(FitError::GuessOutOfBounds {
                name: "initial guess",
                value: bad,
                lower: bounds.lower(),
                upper: bounds.upper(),
            });
        }

        let mut evaluator = Evaluator {
            objective,
            bounds,
            sign: match goal {
                Goal::Minimize => 1.0,
                Goal::Maximize => -1.0,
            },
            evaluations: 0,
            max_evaluations: self.options.max_evaluations,
        };

        let result = self.search(&mut evaluator, start_point(initial_guess, bounds));
        match result {
            Ok((best, iterations)) => {
                let outcome = OptimOutcome {
                    point: ParameterVector::new(to_bounded(&best.point, bounds)),
                    value: evaluator.sign * best.value,
                    evaluations: evaluator.evaluations,
                    iterations,
                };
                debug!(
                    evaluations = outcome.evaluations,
                    iterations,
                    value = outcome.value,
                    "Simplex search converged."
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    evaluations = evaluator.evaluations,
                    "Simplex search hit its evaluation cap."
                );
                Err(err)
            }
        }
    }

    fn search<O>(&self, evaluator: &mut Evaluator<'_, O>, start: DVector<f64>) -> Result<(Vertex, usize)>
    where
        O: Objective + ?Sized,
    {
        let dim = start.len();
        let mut simplex = Vec::with_capacity(dim + 1);
        for i in 0..=dim {
            let mut point = start.clone();
            for coord in point.iter_mut().take(i) {
                *coord += self.options.initial_step;
            }
            let value = evaluator.eval(&point)?;
            simplex.push(Vertex { point, value });
        }
        sort_vertices(&mut simplex);

        let mut previous: Option<Vec<f64>> = None;
        let mut iterations = 0;
        loop {
            if let Some(prev) = &previous {
                let converged = prev
                    .iter()
                    .zip(&simplex)
                    .all(|(&p, v)| self.options.converged(p, v.value));
                if converged {
                    let best = simplex.swap_remove(0);
                    return Ok((best, iterations));
                }
            }
            previous = Some(simplex.iter().map(|v| v.value).collect());
            iterate(&mut simplex, evaluator)?;
            iterations += 1;
        }
    }
}

#[derive(Debug, Clone)]
struct Vertex {
    point: DVector<f64>,
    value: f64,
}

/// Counts evaluations and applies the bound mapping and goal sign.
struct Evaluator<'a, O: ?Sized> {
    objective: &'a O,
    bounds: Bounds,
    sign: f64,
    evaluations: usize,
    max_evaluations: usize,
}

impl<O> Evaluator<'_, O>
where
    O: Objective + ?Sized,
{
    fn eval(&mut self, y: &DVector<f64>) -> Result<f64> {
        if self.evaluations >= self.max_evaluations {
            return Err(FitError::NonConvergence {
                stage: DEFAULT_STAGE,
                evaluations: self.evaluations,
            });
        }
        self.evaluations += 1;
        let value = self.sign * self.objective.value(&to_bounded(y, self.bounds));
        // NaN ranks behind every real value, including +inf.
        Ok(if value.is_nan() { f64::INFINITY } else { value })
    }
}

/// Stable sort by value, best first.
fn sort_vertices(simplex: &mut [Vertex]) {
    simplex.sort_by(|a, b| a.value.total_cmp(&b.value));
}

/// Drop the worst vertex and insert `vertex` at its sorted position.
///
/// On ties the existing vertices keep precedence.
fn replace_worst(simplex: &mut [Vertex], mut vertex: Vertex) {
    let n = simplex.len() - 1;
    for slot in simplex.iter_mut().take(n) {
        if slot.value > vertex.value {
            std::mem::swap(slot, &mut vertex);
        }
    }
    simplex[n] = vertex;
}

/// One Nelder-Mead step on a sorted simplex.
fn iterate<O>(simplex: &mut [Vertex], evaluator: &mut Evaluator<'_, O>) -> Result<()>
where
    O: Objective + ?Sized,
{
    let n = simplex.len() - 1;
    let best = simplex[0].value;
    let second_best = simplex[n - 1].value;
    let worst = simplex[n].value;

    let mut centroid = DVector::<f64>::zeros(simplex[0].point.len());
    for vertex in &simplex[..n] {
        centroid += &vertex.point;
    }
    centroid /= n as f64;

    let x_worst = simplex[n].point.clone();
    let x_reflected = &centroid + (&centroid - &x_worst) * REFLECTION;
    let reflected = Vertex {
        value: evaluator.eval(&x_reflected)?,
        point: x_reflected,
    };

    if best <= reflected.value && reflected.value < second_best {
        replace_worst(simplex, reflected);
        return Ok(());
    }

    if reflected.value < best {
        let x_expanded = &centroid + (&reflected.point - &centroid) * EXPANSION;
        let expanded = Vertex {
            value: evaluator.eval(&x_expanded)?,
            point: x_expanded,
        };
        if expanded.value < reflected.value {
            replace_worst(simplex, expanded);
        } else {
            replace_worst(simplex, reflected);
        }
        return Ok(());
    }

    if reflected.value < worst {
        let x_contracted = &centroid + (&reflected.point - &centroid) * CONTRACTION;
        let value = evaluator.eval(&x_contracted)?;
        if value <= reflected.value {
            replace_worst(
                simplex,
                Vertex {
                    point: x_contracted,
                    value,
                },
            );
            return Ok(());
        }
    } else {
        let x_contracted = &centroid - (&centroid - &x_worst) * CONTRACTION;
        let value = evaluator.eval(&x_contracted)?;
        if value < worst {
            replace_worst(
                simplex,
                Vertex {
                    point: x_contracted,
                    value,
                },
            );
            return Ok(());
        }
    }

    // Shrink towards the best vertex.
    let x_best = simplex[0].point.clone();
    for vertex in simplex.iter_mut().skip(1) {
        vertex.point = &x_best + (&vertex.point - &x_best) * SHRINK;
        vertex.value = evaluator.eval(&vertex.point)?;
    }
    sort_vertices(simplex);
    Ok(())
}
