//! Plain-text fit summaries.
//!
//! Formatting lives here so the fitting code stays free of presentation
//! concerns and output changes stay in one file.

use crate::domain::{ConfidenceInterval, FitResult};

/// Format a fit result, optionally with its half-maximum interval.
pub fn format_fit_summary(result: &FitResult, interval: Option<&ConfidenceInterval>) -> String {
    let mut out = String::new();

    out.push_str("=== P2D fit ===\n");
    out.push_str(&format!("Mode: {}\n", result.mode.display_name()));
    out.push_str(&format!("Measurements: n={}\n", result.n_measurements));
    out.push_str(&format!("Params: {}\n", fmt_vec(result.params.as_slice())));
    out.push_str(&format!("- mu    = {:.6}\n", result.mu()));
    out.push_str(&format!("- sigma = {:.6}\n", result.sigma()));
    out.push_str(&format!(
        "NLL={:.6} | evaluations={}\n",
        result.neg_log_likelihood, result.evaluations
    ));

    if let Some(ci) = interval {
        out.push_str("\nHalf-maximum interval:\n");
        out.push_str(&format!(
            "- peak  = {:.6} (density {:.6})\n",
            ci.peak, ci.peak_density
        ));
        out.push_str(&format!(
            "- range = [{:.6}, {:.6}] (width {:.6})\n",
            ci.lower,
            ci.upper,
            ci.width()
        ));
    }

    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitMode, ParameterVector};

    fn result(mode: FitMode, params: ParameterVector) -> FitResult {
        FitResult {
            params,
            mode,
            neg_log_likelihood: 8.236_55,
            evaluations: 44,
            n_measurements: 5,
        }
    }

    #[test]
    fn summary_lists_fixed_sigma_fit() {
        let r = result(FitMode::FixedSigma(2.0), ParameterVector::mu_only(5.632_62));
        let text = format_fit_summary(&r, None);
        assert!(text.contains("Mode: fixed sigma = 2"), "{text}");
        assert!(text.contains("Params: [5.632620]"), "{text}");
        assert!(text.contains("- sigma = 2.000000"), "{text}");
        assert!(text.contains("evaluations=44"), "{text}");
        assert!(!text.contains("Half-maximum"), "{text}");
    }

    #[test]
    fn summary_includes_interval_when_given() {
        let r = result(FitMode::FreeSigma, ParameterVector::mu_sigma(6.0, 1.5));
        let ci = ConfidenceInterval {
            lower: 4.4432,
            upper: 7.9243,
            peak: 6.1791,
            peak_density: 0.2701,
        };
        let text = format_fit_summary(&r, Some(&ci));
        assert!(text.contains("Params: [6.000000, 1.500000]"), "{text}");
        assert!(text.contains("- range = [4.443200, 7.924300]"), "{text}");
        assert!(text.contains("width 3.481100"), "{text}");
    }
}
