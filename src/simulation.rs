use rand::SeedableRng;
use rand::distr::weighted::WeightedIndex;
use rand_chacha::ChaCha20Rng;
use rand_distr::Distribution;

use crate::choice::{self, ChoiceRow};
use crate::config::SimulationConfig;
use crate::expectations::{
    expected_claims_factor, expected_oop, expected_rate_factor, expected_score,
};
use crate::panel::{Panel, PanelRow};
use crate::realization::{CostRealization, realize_costs};
use crate::renewal::{self, PriorState, RenewalDraw};
use crate::risk::{ConsumerRisk, draw_consumers};
use crate::types::{Firm, PERIOD0_OPTIONS, PERIOD1_OPTIONS, Period};

/// The five-stage generator. Owns the single seeded random stream; every
/// stage draws from it in a fixed, documented order so that equal seeds
/// reproduce bit-identical panels.
///
/// Draw order, per consumer in id order:
///   stage 1 — four period-0 covariates, four period-1 innovations, ε;
///   stage 3 — prior-firm category, four price noises, four Gumbel shocks;
///   stage 4 — claim count, then the score iff the chosen option was
///             monitored;
///   stage 5 — one Gamma rate factor, price noises for the two non-prior
///             firms, three Gumbel shocks.
pub struct Simulation {
    rng: ChaCha20Rng,
    config: SimulationConfig,
    /// Stage-1 output, kept for analysis and tests.
    pub consumers: Vec<ConsumerRisk>,
    /// Initial prior-firm assignment per consumer (period-0 inertia base).
    pub initial_prior_firms: Vec<Firm>,
    /// Stage-4 output per consumer.
    pub realizations: Vec<CostRealization>,
    /// Period-0 state carried into period 1 per consumer.
    pub prior_states: Vec<PriorState>,
    /// Realized renewal pricing per consumer.
    pub renewal_draws: Vec<RenewalDraw>,
}

impl Simulation {
    pub fn from_config(config: SimulationConfig) -> Self {
        Simulation {
            rng: ChaCha20Rng::seed_from_u64(config.seed),
            config,
            consumers: Vec::new(),
            initial_prior_firms: Vec::new(),
            realizations: Vec::new(),
            prior_states: Vec::new(),
            renewal_draws: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run all five stages and return the concatenated panel,
    /// row-ordered by (t, i, d).
    pub fn run(&mut self) -> Panel {
        let config = self.config.clone();
        let rng = &mut self.rng;

        // ── Stage 1: covariates and the λ grid ────────────────────────────
        let consumers = draw_consumers(&config.risk, config.n_consumers, rng);

        // ── Stage 3: period-0 choice (stage-2 closed forms computed per
        // row as utility components) ──────────────────────────────────────
        let prior_dist = WeightedIndex::new(config.prior_firm_weights)
            .expect("invalid prior-firm weights");

        let mut initial_prior_firms = Vec::with_capacity(consumers.len());
        let mut t0_rows: Vec<Vec<ChoiceRow>> = Vec::with_capacity(consumers.len());
        let mut chosen_t0: Vec<usize> = Vec::with_capacity(consumers.len());

        for c in &consumers {
            let prior_firm = PERIOD0_OPTIONS[prior_dist.sample(rng)].firm;
            let x = &c.x_t0;

            let mut rows: Vec<ChoiceRow> = PERIOD0_OPTIONS
                .iter()
                .enumerate()
                .map(|(idx, spec)| {
                    let lambda = c.lambda(Period::T0, spec.monitored);
                    let price = choice::draw_price(
                        &config.price,
                        &config.price.coefs[idx],
                        x,
                        spec.monitored,
                        rng,
                    );
                    let friction = choice::friction(
                        &config.inertia,
                        x,
                        spec.firm,
                        prior_firm,
                        spec.monitored,
                        lambda,
                    );
                    let e_oop = expected_oop(&config.severity, lambda);
                    let e_score = spec
                        .monitored
                        .then(|| expected_score(&config.score, lambda, x));
                    let e_rate_factor = expected_rate_factor(&config.renewal, e_score);
                    let e_claims_factor = expected_claims_factor(&config.renewal, lambda);
                    let utility = choice::deterministic_utility(
                        price,
                        friction,
                        e_oop,
                        e_rate_factor,
                        e_claims_factor,
                    );
                    ChoiceRow {
                        consumer: c.id,
                        option: spec.option,
                        period: Period::T0,
                        firm: spec.firm,
                        monitored: spec.monitored,
                        price,
                        friction,
                        e_oop,
                        e_rate_factor,
                        e_claims_factor,
                        utility,
                        shocked_utility: utility,
                        choice: false,
                    }
                })
                .collect();

            for row in &mut rows {
                row.shocked_utility = row.utility + choice::draw_shock(rng);
            }
            chosen_t0.push(choice::resolve(&mut rows));
            initial_prior_firms.push(prior_firm);
            t0_rows.push(rows);
        }

        // ── Stage 4: cost realizations on the chosen option ───────────────
        let mut realizations = Vec::with_capacity(consumers.len());
        for (c, (rows, &best)) in consumers.iter().zip(t0_rows.iter().zip(&chosen_t0)) {
            let chosen = &rows[best];
            realizations.push(realize_costs(
                &config.score,
                c.id,
                chosen.option,
                chosen.monitored,
                c.lambda(Period::T0, chosen.monitored),
                &c.x_t0,
                rng,
            ));
        }

        // ── Stage 5: prior state, renewal pricing, period-1 choice ────────
        let mut prior_states = Vec::with_capacity(consumers.len());
        for ((rows, &best), real) in t0_rows.iter().zip(&chosen_t0).zip(&realizations) {
            let chosen = &rows[best];
            // The renewal basis is the prior firm's unmonitored base price:
            // the sibling option-2 price when the monitored option won.
            let price = if chosen.monitored { rows[1].price } else { chosen.price };
            prior_states.push(PriorState {
                firm: chosen.firm,
                price,
                monitored: chosen.monitored,
                claims: real.claims,
                score: real.score,
            });
        }

        let mut renewal_draws = Vec::with_capacity(consumers.len());
        let mut t1_rows: Vec<Vec<ChoiceRow>> = Vec::with_capacity(consumers.len());

        for (c, state) in consumers.iter().zip(&prior_states) {
            let shape = renewal::gamma_alpha(&config.renewal, state.monitored, state.score);
            let rate_factor = renewal::draw_rate_factor(&config.renewal, shape, rng);
            let claims_factor = renewal::claims_factor(&config.renewal, state.claims);
            let offered = renewal::renewal_price(state.price, rate_factor, claims_factor);
            renewal_draws.push(RenewalDraw { rate_factor, claims_factor, price: offered });

            let x = &c.x_t1;
            let lambda = c.lambda(Period::T1, false);
            let e_oop = expected_oop(&config.severity, lambda);
            let e_rate_factor = expected_rate_factor(&config.renewal, None);
            let e_claims_factor = expected_claims_factor(&config.renewal, lambda);

            let mut rows: Vec<ChoiceRow> = PERIOD1_OPTIONS
                .iter()
                .enumerate()
                .map(|(idx, spec)| {
                    let price = if spec.firm == state.firm {
                        offered
                    } else {
                        // Firm f's base-price vector is its unmonitored
                        // period-0 column.
                        choice::draw_price(
                            &config.price,
                            &config.price.coefs[idx + 1],
                            x,
                            false,
                            rng,
                        )
                    };
                    let friction = choice::friction(
                        &config.inertia,
                        x,
                        spec.firm,
                        state.firm,
                        false,
                        lambda,
                    );
                    let utility = choice::deterministic_utility(
                        price,
                        friction,
                        e_oop,
                        e_rate_factor,
                        e_claims_factor,
                    );
                    ChoiceRow {
                        consumer: c.id,
                        option: spec.option,
                        period: Period::T1,
                        firm: spec.firm,
                        monitored: false,
                        price,
                        friction,
                        e_oop,
                        e_rate_factor,
                        e_claims_factor,
                        utility,
                        shocked_utility: utility,
                        choice: false,
                    }
                })
                .collect();

            for row in &mut rows {
                row.shocked_utility = row.utility + choice::draw_shock(rng);
            }
            choice::resolve(&mut rows);
            t1_rows.push(rows);
        }

        // ── Concatenate into the (t, i, d)-ordered panel ──────────────────
        let mut panel_rows =
            Vec::with_capacity(consumers.len() * (PERIOD0_OPTIONS.len() + PERIOD1_OPTIONS.len()));
        for ((c, rows), &prior_firm) in
            consumers.iter().zip(&t0_rows).zip(&initial_prior_firms)
        {
            for row in rows {
                panel_rows.push(PanelRow::from_choice(row, prior_firm, &c.x_t0));
            }
        }
        for ((c, rows), state) in consumers.iter().zip(&t1_rows).zip(&prior_states) {
            for row in rows {
                panel_rows.push(PanelRow::from_choice(row, state.firm, &c.x_t1));
            }
        }

        self.consumers = consumers;
        self.initial_prior_firms = initial_prior_firms;
        self.realizations = realizations;
        self.prior_states = prior_states;
        self.renewal_draws = renewal_draws;

        Panel::new(panel_rows)
    }
}
