use rand::Rng;
use rand_distr::{Distribution, LogNormal, Poisson};
use serde::Serialize;

use crate::config::ScoreParams;
use crate::expectations::mu_score;
use crate::risk::Covariates;
use crate::types::{ConsumerId, OptionId};

/// Period-0 cost realization, tied to the chosen option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRealization {
    pub consumer: ConsumerId,
    /// The chosen period-0 option.
    pub option: OptionId,
    pub monitored: bool,
    /// Realized claim count over the period.
    pub claims: u64,
    /// Realized monitoring score; censored to 1 when unmonitored.
    pub score: f64,
    pub log_score: f64,
}

/// Stage 4: draw the claim count and (for monitored consumers) the
/// monitoring score for one consumer's chosen option.
///
/// `lambda` is the λ of the chosen option's (m, t=0) cell; `x` the period-0
/// covariates. Unmonitored consumers consume no score draw — their score is
/// the censoring constant 1 (log_score 0), keeping the stream position a
/// deterministic function of the choice pattern.
pub fn realize_costs(
    params: &ScoreParams,
    consumer: ConsumerId,
    option: OptionId,
    monitored: bool,
    lambda: f64,
    x: &Covariates,
    rng: &mut impl Rng,
) -> CostRealization {
    let claims = Poisson::new(lambda).expect("invalid Poisson lambda").sample(rng) as u64;

    let (score, log_score) = if monitored {
        let mu = mu_score(params, lambda, x);
        let score: f64 =
            LogNormal::new(mu, params.sigma).expect("invalid score params").sample(rng);
        (score, score.ln())
    } else {
        (1.0, 0.0)
    };

    CostRealization { consumer, option, monitored, claims, score, log_score }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::expectations::expected_score;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    fn params() -> ScoreParams {
        SimulationConfig::canonical().score
    }

    #[test]
    fn unmonitored_score_is_censored_to_one() {
        let mut r = rng();
        for i in 1..=100 {
            let real = realize_costs(
                &params(),
                ConsumerId(i),
                OptionId(3),
                false,
                0.05,
                &Covariates([0.0; 4]),
                &mut r,
            );
            assert_eq!(real.score, 1.0);
            assert_eq!(real.log_score, 0.0);
        }
    }

    #[test]
    fn monitored_score_positive_with_consistent_log() {
        let mut r = rng();
        for i in 1..=100 {
            let real = realize_costs(
                &params(),
                ConsumerId(i),
                OptionId(1),
                true,
                0.05,
                &Covariates([0.1, -0.1, 0.0, 0.0]),
                &mut r,
            );
            assert!(real.score > 0.0);
            assert!((real.log_score - real.score.ln()).abs() < 1e-12);
        }
    }

    #[test]
    fn claim_count_mean_tracks_lambda() {
        // Poisson(0.5): mean claim count over 20k draws within ±10 %.
        let mut r = rng();
        let lambda = 0.5;
        let n: u64 = 20_000;
        let total: u64 = (0..n)
            .map(|i| {
                realize_costs(
                    &params(),
                    ConsumerId(i),
                    OptionId(2),
                    false,
                    lambda,
                    &Covariates([0.0; 4]),
                    &mut r,
                )
                .claims
            })
            .sum();
        let mean = total as f64 / n as f64;
        assert!((mean - lambda).abs() < 0.05, "claims mean {mean:.3} off λ={lambda}");
    }

    #[test]
    fn score_sample_mean_matches_lognormal_moment() {
        // E[s] = exp(μ_s + σ²/2); 20k samples within ±5 %.
        let p = params();
        let x = Covariates([0.2, -0.3, 0.0, 0.0]);
        let lambda = 0.05;
        let mut r = rng();
        let n: u64 = 20_000;
        let mean: f64 = (0..n)
            .map(|i| {
                realize_costs(&p, ConsumerId(i), OptionId(1), true, lambda, &x, &mut r).score
            })
            .sum::<f64>()
            / n as f64;
        let expected = expected_score(&p, lambda, &x);
        assert!(
            (mean / expected - 1.0).abs() < 0.05,
            "score mean {mean:.4} vs E[s] {expected:.4}"
        );
    }
}
