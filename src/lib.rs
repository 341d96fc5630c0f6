//! Monte Carlo generator for a two-period insurance-choice panel with
//! telematics monitoring: latent Poisson risk, closed-form cost
//! expectations, Gumbel-shock discrete choice, realized claims and scores,
//! and gamma-distributed renewal pricing. One seeded random stream drives
//! the whole pipeline, so a (seed, config) pair identifies a panel exactly.

pub mod analysis;
pub mod choice;
pub mod config;
pub mod expectations;
pub mod panel;
pub mod realization;
pub mod renewal;
pub mod risk;
pub mod simulation;
pub mod types;
