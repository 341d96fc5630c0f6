use rand::Rng;
use rand_distr::{Distribution, Gamma};
use serde::Serialize;

use crate::config::RenewalParams;
use crate::types::Firm;

/// Per-consumer state carried from period 0 into period 1, replacing the
/// original join-based re-derivation: the firm renewed with, the renewal
/// price basis, and the period's realized claims and score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorState {
    pub firm: Firm,
    /// The prior firm's unmonitored base price from period 0. For a
    /// consumer who chose the monitored option this is the sibling
    /// (unmonitored) price — renewal always rebases off the firm's base
    /// price, even for monitored customers.
    pub price: f64,
    pub monitored: bool,
    pub claims: u64,
    pub score: f64,
}

/// Realized renewal pricing for one consumer: the Gamma rate factor, the
/// claims step factor, and the resulting offered price
/// prior_price · R_s · R_C.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenewalDraw {
    pub rate_factor: f64,
    pub claims_factor: f64,
    pub price: f64,
}

/// Gamma shape for the systematic renewal factor: the base shape for
/// unmonitored consumers, the score-scaled shape for monitored ones. This is
/// the realized-score pass-through into pricing — the expectation-side
/// counterpart lives in `expectations::expected_rate_factor`.
pub fn gamma_alpha(params: &RenewalParams, monitored: bool, score: f64) -> f64 {
    if monitored { params.alpha_score * score } else { params.alpha_base }
}

/// Draw the realized systematic factor R_s ~ Gamma(shape, rate β).
/// `rand_distr::Gamma` is shape/scale parameterized, so the scale is 1/β.
pub fn draw_rate_factor(params: &RenewalParams, shape: f64, rng: &mut impl Rng) -> f64 {
    Gamma::new(shape, 1.0 / params.beta).expect("invalid Gamma params").sample(rng)
}

/// Realized claims-experience factor: a step on the realized claim count,
/// mirroring the expected blend in `expectations::expected_claims_factor`.
pub fn claims_factor(params: &RenewalParams, claims: u64) -> f64 {
    if claims == 0 { params.no_claim_factor } else { params.claim_factor }
}

/// Renewal price offered by the prior firm at period 1.
pub fn renewal_price(prior_price: f64, rate_factor: f64, claims_factor: f64) -> f64 {
    prior_price * rate_factor * claims_factor
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::config::SimulationConfig;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    fn params() -> RenewalParams {
        SimulationConfig::canonical().renewal
    }

    // ── Shape rule ────────────────────────────────────────────────────────

    #[test]
    fn unmonitored_shape_ignores_score() {
        let p = params();
        assert_eq!(gamma_alpha(&p, false, 0.3), p.alpha_base);
        assert_eq!(gamma_alpha(&p, false, 2.0), p.alpha_base);
    }

    #[test]
    fn monitored_shape_scales_with_realized_score() {
        let p = params();
        assert_eq!(gamma_alpha(&p, true, 0.5), p.alpha_score * 0.5);
        assert!(gamma_alpha(&p, true, 1.5) > gamma_alpha(&p, true, 0.7));
    }

    // ── Rate factor ───────────────────────────────────────────────────────

    #[test]
    fn rate_factor_mean_is_shape_over_beta() {
        // Gamma(shape, rate β) has mean shape/β; 20k draws within ±3 %.
        let p = params();
        let shape = 2.0;
        let mut r = rng();
        let n = 20_000;
        let mean: f64 =
            (0..n).map(|_| draw_rate_factor(&p, shape, &mut r)).sum::<f64>() / n as f64;
        let expected = shape / p.beta;
        assert!(
            (mean / expected - 1.0).abs() < 0.03,
            "R_s mean {mean:.4} vs {expected:.4}"
        );
    }

    #[test]
    fn rate_factor_strictly_positive() {
        let p = params();
        let mut r = rng();
        for _ in 0..1_000 {
            assert!(draw_rate_factor(&p, 0.5, &mut r) > 0.0);
        }
    }

    // ── Claims factor and price ───────────────────────────────────────────

    #[test]
    fn claims_factor_is_a_step_on_realized_claims() {
        let p = params();
        assert_eq!(claims_factor(&p, 0), 0.95);
        assert_eq!(claims_factor(&p, 1), 1.10);
        assert_eq!(claims_factor(&p, 7), 1.10);
    }

    #[test]
    fn renewal_price_composes_both_factors() {
        assert!((renewal_price(6.0, 1.1, 0.95) - 6.0 * 1.1 * 0.95).abs() < 1e-12);
    }
}
