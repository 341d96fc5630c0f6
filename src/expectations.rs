//! Closed-form expectation terms entering the deterministic utility.
//!
//! Everything here is a pure function of λ, covariates, and config
//! parameters — no draws. The realized counterparts live in `realization`
//! and `renewal`.

use crate::config::{RenewalParams, ScoreParams, SeverityParams};
use crate::risk::Covariates;

/// Mean of the log monitoring score:
/// μ_s = θ₁ + θ₂·ln λ + θ₃x₁ + θ₄x₂.
///
/// Only defined for the monitored period-0 cell; callers pass that cell's λ
/// (strictly positive by construction, so the log is finite).
pub fn mu_score(params: &ScoreParams, lambda: f64, x: &Covariates) -> f64 {
    let t = &params.theta;
    t[0] + t[1] * lambda.ln() + t[2] * x.0[0] + t[3] * x.0[1]
}

/// Expected monitoring score via the log-normal moment formula:
/// E[s] = exp(μ_s + σ²/2). Collapses to exp(μ_s) exactly when σ = 0.
pub fn expected_score(params: &ScoreParams, lambda: f64, x: &Covariates) -> f64 {
    (mu_score(params, lambda, x) + params.sigma * params.sigma / 2.0).exp()
}

/// Expected out-of-pocket cost under an at-most-one-claim approximation with
/// Pareto severity above the policy limit:
///
/// E[oop] = λ·exp(−λ) · l₀^{a_l}/(a_l − 1) · y₀^{1 − a_l}
///
/// where λ·exp(−λ) approximates Pr(exactly one claim). Requires a_l > 1
/// (config precondition, not checked here).
pub fn expected_oop(params: &SeverityParams, lambda: f64) -> f64 {
    let a = params.shape;
    let tail = params.scale.powf(a) / (a - 1.0) * params.policy_limit.powf(1.0 - a);
    lambda * (-lambda).exp() * tail
}

/// Expected claims-experience renewal factor: the no-claim discount and the
/// claim surcharge weighted by the Poisson no-claim probability exp(−λ).
pub fn expected_claims_factor(params: &RenewalParams, lambda: f64) -> f64 {
    let p_no_claim = (-lambda).exp();
    params.no_claim_factor * p_no_claim + params.claim_factor * (1.0 - p_no_claim)
}

/// Expected systematic renewal factor E[R_s] = shape/β (gamma mean).
///
/// Unmonitored options use the base shape α₀; the monitored option's shape
/// is α₁ times the score, so its expectation passes through E[s].
pub fn expected_rate_factor(params: &RenewalParams, expected_score: Option<f64>) -> f64 {
    match expected_score {
        Some(s) => params.alpha_score * s / params.beta,
        None => params.alpha_base / params.beta,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::config::SimulationConfig;

    fn config() -> SimulationConfig {
        SimulationConfig::canonical()
    }

    // ── Score ─────────────────────────────────────────────────────────────

    #[test]
    fn zero_sigma_collapses_expected_score_to_exp_mu() {
        let mut params = config().score;
        params.sigma = 0.0;
        let x = Covariates([0.3, -0.2, 0.0, 0.0]);
        let lambda = 0.05;
        let expected = mu_score(&params, lambda, &x).exp();
        assert_eq!(expected_score(&params, lambda, &x), expected);
    }

    #[test]
    fn positive_sigma_inflates_expected_score() {
        let params = config().score;
        let x = Covariates([0.0, 0.0, 0.0, 0.0]);
        let lambda = 0.05;
        assert!(
            expected_score(&params, lambda, &x) > mu_score(&params, lambda, &x).exp()
        );
    }

    #[test]
    fn riskier_consumers_score_higher() {
        // θ₂ > 0 in the canonical calibration.
        let params = config().score;
        let x = Covariates([0.0, 0.0, 0.0, 0.0]);
        assert!(expected_score(&params, 0.10, &x) > expected_score(&params, 0.02, &x));
    }

    // ── Out-of-pocket ─────────────────────────────────────────────────────

    #[test]
    fn expected_oop_matches_hand_computation() {
        // a = 3, l₀ = 2, y₀ = 2: tail term = 8/2 · 2⁻² = 1, so
        // E[oop] = λ·exp(−λ).
        let params = config().severity;
        let lambda = 0.05_f64;
        let expected = lambda * (-lambda).exp();
        assert!((expected_oop(&params, lambda) - expected).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn expected_oop_non_negative(lambda in 1e-6_f64..5.0) {
            prop_assert!(expected_oop(&config().severity, lambda) >= 0.0);
        }

        #[test]
        fn expected_oop_decreasing_in_policy_limit(
            lambda in 1e-3_f64..2.0,
            limit in 0.5_f64..10.0,
            bump in 0.1_f64..5.0,
        ) {
            let mut lo = config().severity;
            lo.policy_limit = limit;
            let mut hi = lo.clone();
            hi.policy_limit = limit + bump;
            prop_assert!(
                expected_oop(&hi, lambda) < expected_oop(&lo, lambda),
                "raising the policy limit must lower E[oop]"
            );
        }
    }

    // ── Renewal factors ───────────────────────────────────────────────────

    #[test]
    fn claims_factor_blends_discount_and_surcharge() {
        let params = config().renewal;
        // λ → 0: certain no-claim, factor → 0.95.
        assert!((expected_claims_factor(&params, 1e-9) - 0.95).abs() < 1e-6);
        // λ large: claim near-certain, factor → 1.10.
        assert!((expected_claims_factor(&params, 20.0) - 1.10).abs() < 1e-6);
        // In between, strictly inside the bracket.
        let mid = expected_claims_factor(&params, 0.5);
        assert!(mid > 0.95 && mid < 1.10);
    }

    #[test]
    fn rate_factor_is_gamma_mean() {
        let params = config().renewal;
        assert_eq!(expected_rate_factor(&params, None), params.alpha_base / params.beta);
        let e_score = 0.8;
        assert_eq!(
            expected_rate_factor(&params, Some(e_score)),
            params.alpha_score * e_score / params.beta
        );
    }
}
