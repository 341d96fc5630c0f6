/// Latent-risk (λ) generator parameters.
///
/// λ = exp(θ₁ + θ₂x₁ + θ₃x₂ + θ₄x₃ + θ₅x₄ + θ₆·1[monitored ∧ t=0] + ε_i)
/// with a persistent consumer-level shock ε_i ~ N(0, σ²).
#[derive(Debug, Clone)]
pub struct RiskParams {
    pub theta: [f64; 6],
    pub sigma: f64,
    /// Standard deviation of each period-0 covariate (variance 0.25).
    pub covariate_sd: f64,
    /// AR blend weight: x_t1 = w·x_t0 + w·fresh noise.
    pub ar_weight: f64,
}

/// Monitoring-score parameters. Observable only for the monitored
/// period-0 option.
///
/// μ_s = θ₁ + θ₂·ln λ + θ₃x₁ + θ₄x₂; the realized score is
/// LogNormal(μ_s, σ), so E[s] = exp(μ_s + σ²/2).
#[derive(Debug, Clone)]
pub struct ScoreParams {
    pub theta: [f64; 4],
    pub sigma: f64,
}

/// Claim-severity tail used by the out-of-pocket expectation: Pareto with
/// tail index `shape` above the policy limit.
#[derive(Debug, Clone)]
pub struct SeverityParams {
    /// Pareto tail index a_l. Precondition: > 1 (the closed form divides
    /// by a_l − 1).
    pub shape: f64,
    /// Pareto scale l₀.
    pub scale: f64,
    /// Policy limit y₀: losses below it are covered in full.
    pub policy_limit: f64,
}

/// Base-price coefficients for one option:
/// price = base + x·(x₁, x₂, x₃) + monitored·1[m=1] + N(noise_mean, noise_sd).
#[derive(Debug, Clone)]
pub struct PriceCoefs {
    pub base: f64,
    pub x: [f64; 3],
    pub monitored: f64,
}

#[derive(Debug, Clone)]
pub struct PriceParams {
    /// One coefficient vector per period-0 option, in option order. The
    /// monitored loading is only non-zero for option 1.
    pub coefs: [PriceCoefs; 4],
    pub noise_mean: f64,
    pub noise_sd: f64,
}

/// Switching-cost ("inertia") and monitoring-disutility parameters.
#[derive(Debug, Clone)]
pub struct InertiaParams {
    /// η₀ + η₁x₁ + η₂x₂ + η₃x₃, charged when the option's firm differs
    /// from the prior firm.
    pub eta: [f64; 4],
    /// ξ₀ + ξ₁·ln λ, charged on the monitored option regardless of firm.
    pub xi: [f64; 2],
}

/// Renewal-price decomposition R = R_s · R_C.
///
/// R_s ~ Gamma(shape, rate β): shape is `alpha_base` for unmonitored
/// consumers and `alpha_score`·score for monitored ones, so a score of
/// `beta / alpha_score` is renewal-neutral in expectation.
#[derive(Debug, Clone)]
pub struct RenewalParams {
    pub beta: f64,
    pub alpha_base: f64,
    pub alpha_score: f64,
    /// R_C with no claims in the period.
    pub no_claim_factor: f64,
    /// R_C with one or more claims.
    pub claim_factor: f64,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub seed: u64,
    pub n_consumers: u64,
    pub risk: RiskParams,
    pub score: ScoreParams,
    pub severity: SeverityParams,
    pub price: PriceParams,
    pub inertia: InertiaParams,
    pub renewal: RenewalParams,
    /// Categorical weights of the initial prior-firm assignment over the
    /// period-0 options. The monitored option has weight 0 by construction:
    /// nobody starts out already enrolled in monitoring.
    pub prior_firm_weights: [f64; 4],
}

impl SimulationConfig {
    pub fn canonical() -> Self {
        SimulationConfig {
            seed: 1,
            n_consumers: 10_000,

            // ── Latent risk ───────────────────────────────────────────────
            // Baseline λ ≈ exp(−3) ≈ 0.05 claims/term; the monitoring offset
            // θ₆ = −0.5 reflects selection of safer drivers into the program.
            risk: RiskParams {
                theta: [-3.0, -0.5, 1.0, -1.0, 1.0, -0.5],
                sigma: 0.1,
                covariate_sd: 0.5,
                ar_weight: 0.5,
            },

            // ── Monitoring score ──────────────────────────────────────────
            // Weak positive loading on ln λ keeps scores centred near 1
            // (score 1 = renewal-neutral) while riskier drivers score higher.
            score: ScoreParams { theta: [0.1, 0.05, 0.2, -0.1], sigma: 0.25 },

            // ── Severity tail ─────────────────────────────────────────────
            // Monetary units are thousands of dollars throughout.
            severity: SeverityParams { shape: 3.0, scale: 2.0, policy_limit: 2.0 },

            // ── Base prices ───────────────────────────────────────────────
            // Firm 1 prices its monitored option at a −0.5 discount; firms 2
            // and 3 are progressively dearer on average.
            price: PriceParams {
                coefs: [
                    PriceCoefs { base: 6.0, x: [0.5, -0.3, 0.2], monitored: -0.5 },
                    PriceCoefs { base: 6.0, x: [0.5, -0.3, 0.2], monitored: 0.0 },
                    PriceCoefs { base: 6.2, x: [0.4, -0.2, 0.3], monitored: 0.0 },
                    PriceCoefs { base: 6.4, x: [0.3, -0.4, 0.1], monitored: 0.0 },
                ],
                noise_mean: 1.0,
                noise_sd: 1.0,
            },

            // ── Frictions ─────────────────────────────────────────────────
            inertia: InertiaParams { eta: [2.0, 0.3, 0.2, -0.1], xi: [1.0, 0.3] },

            // ── Renewal pricing ───────────────────────────────────────────
            // Unmonitored E[R_s] = α₀/β = 1; monitored E[R_s] = α₁·E[s]/β.
            renewal: RenewalParams {
                beta: 2.0,
                alpha_base: 2.0,
                alpha_score: 2.0,
                no_claim_factor: 0.95,
                claim_factor: 1.10,
            },

            // ── Prior firm ────────────────────────────────────────────────
            // Support {options 1..4} with weights (0, 0.40, 0.35, 0.25).
            prior_firm_weights: [0.0, 0.40, 0.35, 0.25],
        }
    }
}
