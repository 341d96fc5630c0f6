use rand::Rng;
use rand_distr::{Distribution, Gumbel};
use serde::Serialize;

use crate::config::{InertiaParams, PriceCoefs, PriceParams};
use crate::risk::Covariates;
use crate::types::{ConsumerId, Firm, OptionId, Period};

/// One option row of the choice panel: all utility components plus the
/// resolved choice flag. One row per (consumer, option, period).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceRow {
    pub consumer: ConsumerId,
    pub option: OptionId,
    pub period: Period,
    pub firm: Firm,
    pub monitored: bool,
    pub price: f64,
    /// Switching cost plus (for the monitored option) monitoring disutility.
    pub friction: f64,
    pub e_oop: f64,
    pub e_rate_factor: f64,
    pub e_claims_factor: f64,
    /// Deterministic utility h.
    pub utility: f64,
    /// h plus the Gumbel shock; the argmax of this resolves the choice.
    pub shocked_utility: f64,
    pub choice: bool,
}

/// Deterministic utility:
/// h = −price − friction − E[oop] − price·E[R_s]·E[R_C].
///
/// The last term is the expected renewal premium: today's price scaled by
/// the expected systematic and claims-experience factors.
pub fn deterministic_utility(
    price: f64,
    friction: f64,
    e_oop: f64,
    e_rate_factor: f64,
    e_claims_factor: f64,
) -> f64 {
    -price - friction - e_oop - price * e_rate_factor * e_claims_factor
}

/// Base price for one option: coefficient index on (x₁, x₂, x₃), the
/// monitored loading, and an additive N(noise_mean, noise_sd) draw.
pub fn draw_price(
    params: &PriceParams,
    coefs: &PriceCoefs,
    x: &Covariates,
    monitored: bool,
    rng: &mut impl Rng,
) -> f64 {
    let noise = rand_distr::Normal::new(params.noise_mean, params.noise_sd)
        .expect("invalid price noise params")
        .sample(rng);
    let mut price = coefs.base + noise;
    for (b, xj) in coefs.x.iter().zip(&x.0[..3]) {
        price += b * xj;
    }
    if monitored {
        price += coefs.monitored;
    }
    price
}

/// Switching cost η₀ + η₁x₁ + η₂x₂ + η₃x₃, charged when an option's firm
/// differs from the prior firm.
pub fn switching_cost(params: &InertiaParams, x: &Covariates) -> f64 {
    let e = &params.eta;
    e[0] + e[1] * x.0[0] + e[2] * x.0[1] + e[3] * x.0[2]
}

/// Monitoring disutility ξ₀ + ξ₁·ln λ, charged on the monitored option.
/// Stacks with the switching cost when the prior firm is not firm 1.
pub fn monitoring_disutility(params: &InertiaParams, lambda: f64) -> f64 {
    params.xi[0] + params.xi[1] * lambda.ln()
}

/// Total friction for one option given the prior firm.
pub fn friction(
    params: &InertiaParams,
    x: &Covariates,
    firm: Firm,
    prior_firm: Firm,
    monitored: bool,
    lambda: f64,
) -> f64 {
    let mut cost = 0.0;
    if firm != prior_firm {
        cost += switching_cost(params, x);
    }
    if monitored {
        cost += monitoring_disutility(params, lambda);
    }
    cost
}

/// Draw the i.i.d. standard Gumbel (extreme-value) utility shock.
pub fn draw_shock(rng: &mut impl Rng) -> f64 {
    Gumbel::new(0.0, 1.0).expect("invalid Gumbel params").sample(rng)
}

/// Resolve the choice among one consumer-period's rows: flag the row with
/// the highest shocked utility. Ties resolve to the lowest option index
/// (strict-greater scan keeps the first maximum), so exactly one row wins.
/// Returns the winning index.
pub fn resolve(rows: &mut [ChoiceRow]) -> usize {
    debug_assert!(!rows.is_empty());
    let mut best = 0;
    for (i, row) in rows.iter().enumerate().skip(1) {
        if row.shocked_utility > rows[best].shocked_utility {
            best = i;
        }
    }
    for (i, row) in rows.iter_mut().enumerate() {
        row.choice = i == best;
    }
    best
}
