use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::RiskParams;
use crate::types::{ConsumerId, Period};

/// Exogenous consumer covariates (x₁..x₄).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Covariates(pub [f64; 4]);

/// Per-consumer latent risk: covariates for both periods, the persistent
/// risk shock, and the λ grid over {monitored} × {period}.
///
/// λ is defined for every cell of the grid even where monitoring is not on
/// the menu (the monitoring offset θ₆ only loads on the (m=1, t=0) cell, so
/// the two period-1 cells coincide).
#[derive(Debug, Clone)]
pub struct ConsumerRisk {
    pub id: ConsumerId,
    pub x_t0: Covariates,
    pub x_t1: Covariates,
    /// Persistent log-normal risk shock ε_i, shared across all four cells.
    pub eps: f64,
    /// λ indexed by [period][monitored].
    lambda: [[f64; 2]; 2],
}

impl ConsumerRisk {
    pub fn lambda(&self, period: Period, monitored: bool) -> f64 {
        self.lambda[period.0 as usize][monitored as usize]
    }

    pub fn covariates(&self, period: Period) -> &Covariates {
        match period {
            Period::T0 => &self.x_t0,
            _ => &self.x_t1,
        }
    }
}

/// Linear index of the λ mean function for one (m, t) cell.
pub fn mu_lambda(params: &RiskParams, x: &Covariates, monitored: bool, period: Period) -> f64 {
    let t = &params.theta;
    let Covariates([x1, x2, x3, x4]) = *x;
    let monitoring_offset =
        if monitored && period == Period::T0 { t[5] } else { 0.0 };
    t[0] + t[1] * x1 + t[2] * x2 + t[3] * x3 + t[4] * x4 + monitoring_offset
}

/// Stage 1: draw covariates and the λ grid for `n` consumers.
///
/// Draw order per consumer (fixed for reproducibility): the four period-0
/// covariates, the four period-1 innovation draws, then ε_i. Consumers are
/// drawn in id order.
pub fn draw_consumers(params: &RiskParams, n: u64, rng: &mut impl Rng) -> Vec<ConsumerRisk> {
    let covariate = Normal::new(0.0, params.covariate_sd).expect("invalid covariate sd");
    let shock = Normal::new(0.0, params.sigma).expect("invalid risk sigma");
    let w = params.ar_weight;

    let mut consumers = Vec::with_capacity(n as usize);
    for i in 1..=n {
        let x_t0 = Covariates(std::array::from_fn(|_| covariate.sample(rng)));
        let x_t1 =
            Covariates(std::array::from_fn(|j| w * x_t0.0[j] + w * covariate.sample(rng)));
        let eps = shock.sample(rng);

        let mut lambda = [[0.0; 2]; 2];
        for (t, x) in [(Period::T0, &x_t0), (Period::T1, &x_t1)] {
            for monitored in [false, true] {
                lambda[t.0 as usize][monitored as usize] =
                    (mu_lambda(params, x, monitored, t) + eps).exp();
            }
        }

        consumers.push(ConsumerRisk { id: ConsumerId(i), x_t0, x_t1, eps, lambda });
    }
    consumers
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

    fn params() -> RiskParams {
        SimulationConfig::canonical().risk
    }

    // ── λ grid ────────────────────────────────────────────────────────────

    #[test]
    fn lambda_strictly_positive_for_every_cell() {
        let consumers = draw_consumers(&params(), 500, &mut rng());
        for c in &consumers {
            for t in [Period::T0, Period::T1] {
                for monitored in [false, true] {
                    assert!(
                        c.lambda(t, monitored) > 0.0,
                        "λ must be positive for consumer {:?} cell ({t:?}, m={monitored})",
                        c.id
                    );
                }
            }
        }
    }

    #[test]
    fn monitoring_offset_applies_only_to_initial_period() {
        let consumers = draw_consumers(&params(), 100, &mut rng());
        for c in &consumers {
            // θ₆ = −0.5 < 0: the monitored t=0 cell is strictly safer.
            assert!(c.lambda(Period::T0, true) < c.lambda(Period::T0, false));
            // No monitoring term at t=1, so the two cells coincide.
            assert_eq!(c.lambda(Period::T1, true), c.lambda(Period::T1, false));
        }
    }

    #[test]
    fn monitored_lambda_scaled_by_exact_offset() {
        let consumers = draw_consumers(&params(), 50, &mut rng());
        let offset = params().theta[5];
        for c in &consumers {
            let ratio = c.lambda(Period::T0, true) / c.lambda(Period::T0, false);
            assert!((ratio - offset.exp()).abs() < 1e-12);
        }
    }

    #[test]
    fn shock_is_shared_within_consumer() {
        // Holding covariates fixed across cells, λ ratios are deterministic
        // functions of the mean index — ε cancels. Verify via the identity
        // λ = exp(μ + ε).
        let consumers = draw_consumers(&params(), 50, &mut rng());
        let p = params();
        for c in &consumers {
            for t in [Period::T0, Period::T1] {
                let expected =
                    (mu_lambda(&p, c.covariates(t), false, t) + c.eps).exp();
                assert!((c.lambda(t, false) - expected).abs() < 1e-12);
            }
        }
    }

    // ── Covariates ────────────────────────────────────────────────────────

    #[test]
    fn covariates_have_expected_spread() {
        // x_j ~ N(0, 0.25): sample sd over 4 × 10⁴ draws within ±10 %.
        let consumers = draw_consumers(&params(), 10_000, &mut rng());
        let values: Vec<f64> =
            consumers.iter().flat_map(|c| c.x_t0.0.iter().copied()).collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let sd = (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
        assert!(mean.abs() < 0.02, "mean {mean:.4} too far from 0");
        assert!((sd - 0.5).abs() < 0.05, "sd {sd:.4} too far from 0.5");
    }

    #[test]
    fn period1_covariates_correlate_with_period0() {
        let consumers = draw_consumers(&params(), 10_000, &mut rng());
        // Corr(x_t0, x_t1) = w / sqrt(2w²) = 1/√2 ≈ 0.707 with w = 0.5.
        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for c in &consumers {
            for j in 0..4 {
                sxy += c.x_t0.0[j] * c.x_t1.0[j];
                sxx += c.x_t0.0[j] * c.x_t0.0[j];
                syy += c.x_t1.0[j] * c.x_t1.0[j];
            }
        }
        let corr = sxy / (sxx * syy).sqrt();
        assert!(
            (corr - std::f64::consts::FRAC_1_SQRT_2).abs() < 0.03,
            "corr {corr:.4} outside expected band"
        );
    }

    #[test]
    fn consumer_ids_are_sequential_from_one() {
        let consumers = draw_consumers(&params(), 10, &mut rng());
        let ids: Vec<u64> = consumers.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }
}
