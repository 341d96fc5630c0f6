use std::env;

use panelgen::analysis;
use panelgen::config::SimulationConfig;
use panelgen::simulation::Simulation;

/// Regenerate the canonical panel and print per-period option shares —
/// the regression surface for the documented run. Usage:
/// `shares [n_consumers] [seed]`.
fn main() {
    let mut config = SimulationConfig::canonical();

    if let Some(n) = env::args().nth(1).and_then(|s| s.parse().ok()) {
        config.n_consumers = n;
    }
    if let Some(seed) = env::args().nth(2).and_then(|s| s.parse().ok()) {
        config.seed = seed;
    }

    let n_consumers = config.n_consumers;
    let seed = config.seed;

    let mut sim = Simulation::from_config(config);
    let panel = sim.run();

    // NDJSON shares to stdout.
    for shares in analysis::choice_shares(&panel) {
        for (d, share) in &shares.shares {
            println!(
                "{}",
                serde_json::json!({ "t": shares.period.0, "d": d.0, "share": share })
            );
        }
    }

    // Summary to stderr.
    let violations = analysis::verify_panel(&panel);
    eprintln!(
        "shares: n={n_consumers} seed={seed} rows={} violations={}",
        panel.len(),
        violations.len()
    );
    for s in analysis::period_summaries(&panel) {
        eprintln!(
            "  t={}  mean_price={:.3}  monitored={:.1}%",
            s.period.0,
            s.mean_chosen_price,
            s.monitored_share * 100.0
        );
    }
}
