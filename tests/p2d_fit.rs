//! Integration tests for P2D fitting.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path from a measurement set, through a fit
//!   session and the bounded simplex search, to fitted parameters and a
//!   half-maximum interval.
//! - Exercise realistic regimes: a handful of hand-entered distances and a
//!   large synthetic sample with a known truth.
//!
//! Coverage
//! --------
//! - `fit::P2dFitter`: construction from arguments and from `FitConfig`,
//!   `solve`, `fit`, `neg_log_likelihood`, `confidence_interval`.
//! - `optim::BoundedSimplex`: evaluation cap on a pathological objective.
//! - `data::generate_distances`: seeded synthetic samples.
//! - `report::format_fit_summary`: end-to-end summary text.
//!
//! Exclusions
//! ----------
//! - Special-function accuracy and density normalization; these are covered
//!   by unit tests in `math` and `models`.
use std::cell::Cell;

use p2d_fit::data::generate_distances;
use p2d_fit::domain::{Bounds, Goal};
use p2d_fit::models::p2d;
use p2d_fit::report::format_fit_summary;
use p2d_fit::{BoundedSimplex, FitConfig, FitError, FitMode, P2dFitter, SimplexOptions};

const FIVE_POINTS: [f64; 5] = [5.0, 6.0, 7.0, 5.5, 6.5];

#[test]
fn five_points_with_fixed_sigma() {
    let fitter = P2dFitter::new(FIVE_POINTS.to_vec(), FitMode::FixedSigma(2.0), 100.0).unwrap();
    let params = fitter.solve().unwrap();

    assert_eq!(params.len(), 1);
    let mu = params.mu();
    // The likelihood maximum sits below the sample mean: with sigma = 2 part
    // of the spread is attributed to the radial bias of the distance.
    assert!((mu - 5.6326).abs() < 1e-3, "mu = {mu}");
    assert!((mu - 6.0).abs() < 0.4, "mu = {mu}");

    let at_fit = fitter.neg_log_likelihood(params.as_slice()).unwrap();
    for probe in [mu - 0.05, mu + 0.05, 6.0] {
        assert!(at_fit < fitter.neg_log_likelihood(&[probe]).unwrap());
    }
}

#[test]
fn recovers_parameters_from_a_synthetic_sample() {
    let (mu, sigma) = (6.0, 1.5);
    let distances = generate_distances(mu, sigma, 5000, 2024).unwrap();
    let fitter = P2dFitter::new(distances, FitMode::FreeSigma, 100.0)
        .unwrap()
        .with_moment_guess();
    let result = fitter.fit().unwrap();

    assert_eq!(result.params.len(), 2);
    assert!((result.mu() - mu).abs() < 0.05 * mu, "mu = {}", result.mu());
    assert!(
        (result.sigma() - sigma).abs() < 0.05 * sigma,
        "sigma = {}",
        result.sigma()
    );
    assert!(result.evaluations < 500);
}

#[test]
fn half_maximum_interval_around_a_known_peak() {
    let fitter = P2dFitter::new(FIVE_POINTS.to_vec(), FitMode::FixedSigma(1.5), 10.0).unwrap();
    let ci = fitter.confidence_interval(6.0, 1.5).unwrap();

    let (lower, upper) = ci.as_pair();
    assert!(lower < 6.0 && 6.0 < upper, "{ci:?}");
    let half = 0.5 * ci.peak_density;
    for r in [ci.lower, ci.upper] {
        let miss = (p2d(r, 6.0, 1.5) - half).abs() / half;
        assert!(miss < 0.01, "r = {r}, miss = {miss}");
    }
}

#[test]
fn pathological_objective_stops_at_the_cap() {
    let calls = Cell::new(0usize);
    // Keeps improving on every call, so the simplex never settles.
    let sliding = |_: &[f64]| {
        calls.set(calls.get() + 1);
        -(calls.get() as f64)
    };
    let optimizer = BoundedSimplex::new(SimplexOptions {
        max_evaluations: 120,
        ..SimplexOptions::default()
    })
    .unwrap();
    let bounds = Bounds::up_to(100.0).unwrap();

    let err = optimizer
        .optimize(&sliding, &[5.0, 5.0], bounds, Goal::Minimize)
        .unwrap_err();
    assert!(err.is_non_convergence());
    assert_eq!(
        err,
        FitError::NonConvergence {
            stage: "simplex search",
            evaluations: 120
        }
    );
    assert_eq!(calls.get(), 120);
}

#[test]
fn solve_fails_cleanly_when_the_budget_is_too_small() {
    let config = FitConfig {
        mode: FitMode::FixedSigma(2.0),
        simplex: SimplexOptions {
            max_evaluations: 10,
            ..SimplexOptions::default()
        },
        ..FitConfig::default()
    };
    let fitter = P2dFitter::from_config(FIVE_POINTS.to_vec(), &config).unwrap();
    let err = fitter.solve().unwrap_err();
    assert_eq!(
        err,
        FitError::NonConvergence {
            stage: "mu fit",
            evaluations: 10
        }
    );
    assert!(err.to_string().contains("mu fit"));
}

#[test]
fn config_round_trips_through_json() {
    let config = FitConfig {
        mode: FitMode::FixedSigma(2.0),
        upper_bound: 50.0,
        mu_guess: 5.0,
        sigma_guess: Some(3.0),
        ..FitConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: FitConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let fitter = P2dFitter::from_config(FIVE_POINTS.to_vec(), &back).unwrap();
    assert_eq!(fitter.bounds().upper(), 50.0);
    assert!((fitter.solve().unwrap().mu() - 5.6326).abs() < 1e-3);
}

#[test]
fn summary_reports_fit_and_interval() {
    let fitter = P2dFitter::new(FIVE_POINTS.to_vec(), FitMode::FixedSigma(2.0), 12.0).unwrap();
    let result = fitter.fit().unwrap();
    let ci = fitter.confidence_interval(result.mu(), result.sigma()).unwrap();
    let text = format_fit_summary(&result, Some(&ci));

    assert!(text.contains("fixed sigma = 2"), "{text}");
    assert!(text.contains("n=5"), "{text}");
    assert!(text.contains("Half-maximum interval"), "{text}");
}
