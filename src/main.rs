use std::fs::File;
use std::io::{BufWriter, Write};

use panelgen::analysis::{self, ChoiceShares, PanelViolation};
use panelgen::config::SimulationConfig;
use panelgen::panel::Panel;
use panelgen::simulation::Simulation;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut seed_override: Option<u64> = None;
    let mut consumers_override: Option<u64> = None;
    let mut output_path = "panel.ndjson".to_string();
    let mut quiet = false;
    let mut runs: Option<u64> = None;
    let mut output_dir_opt: Option<String> = None;
    let mut csv_path_opt: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                seed_override = Some(args[i].parse().expect("--seed requires a u64"));
            }
            "--consumers" => {
                i += 1;
                consumers_override =
                    Some(args[i].parse().expect("--consumers requires a positive integer"));
            }
            "--output" => {
                i += 1;
                output_path = args[i].clone();
            }
            "--quiet" => quiet = true,
            "--runs" => {
                i += 1;
                runs = Some(args[i].parse().expect("--runs requires a positive integer"));
            }
            "--output-dir" => {
                i += 1;
                output_dir_opt = Some(args[i].clone());
            }
            "--csv" => {
                i += 1;
                csv_path_opt = Some(args[i].clone());
            }
            _ => {}
        }
        i += 1;
    }

    let mut base_config = SimulationConfig::canonical();
    let start_seed = seed_override.unwrap_or(base_config.seed);
    if let Some(n) = consumers_override {
        base_config.n_consumers = n;
    }

    if let Some(n) = runs {
        use rayon::prelude::*;

        if let Some(ref dir) = output_dir_opt {
            std::fs::create_dir_all(dir).expect("failed to create output directory");
        }

        let all_shares: Vec<Vec<ChoiceShares>> = (0u64..n)
            .into_par_iter()
            .map(|i| {
                let seed = start_seed + i;
                let mut config = base_config.clone();
                config.seed = seed;
                let mut sim = Simulation::from_config(config);
                let panel = sim.run();

                if let Some(ref dir) = output_dir_opt {
                    let path = format!("{dir}/panel_seed_{seed}.ndjson");
                    write_ndjson(&panel, &path);
                    if !quiet {
                        println!("Seed {seed}: {} rows → {path}", panel.len());
                    }
                }

                analysis::choice_shares(&panel)
            })
            .collect();

        if let Some(ref csv_path) = csv_path_opt {
            write_runs_csv(&all_shares, start_seed, csv_path);
        }

        if !quiet {
            print_all_run_shares(&all_shares, start_seed);
            if n < 2 {
                eprintln!("Warning: Distribution requires >= 2 runs");
            } else {
                print_distributions(&analysis::share_distributions(&all_shares), n);
            }
        }
    } else {
        let mut config = base_config;
        config.seed = start_seed;

        let mut sim = Simulation::from_config(config);
        let panel = sim.run();

        write_ndjson(&panel, &output_path);

        if !quiet {
            println!(
                "Seed {}, {} consumers, {} rows → {output_path}",
                sim.config().seed,
                sim.config().n_consumers,
                panel.len()
            );
            print_report(&panel);
        }
    }
}

fn write_ndjson(panel: &Panel, path: &str) {
    let file = File::create(path).unwrap_or_else(|e| panic!("failed to create {path}: {e}"));
    let mut writer = BufWriter::new(file);
    for row in panel {
        serde_json::to_writer(&mut writer, row).expect("failed to serialize row");
        writeln!(writer).expect("failed to write newline");
    }
}

fn print_report(panel: &Panel) {
    // ── Panel invariants ──────────────────────────────────────────────────
    let violations = analysis::verify_panel(panel);

    let inv = |variant: fn(&PanelViolation) -> bool| {
        if violations.iter().any(variant) { "FAIL" } else { "PASS" }
    };

    println!("\n=== Panel invariants ===");
    println!("  [1] One choice per (consumer, period): {}", inv(|v| {
        matches!(v, PanelViolation::NoChoice { .. } | PanelViolation::MultipleChoices { .. })
    }));
    println!("  [2] Full option menu per block:        {}", inv(|v| matches!(v, PanelViolation::WrongRowCount { .. })));
    println!("  [3] Finite prices:                     {}", inv(|v| matches!(v, PanelViolation::NonFinitePrice { .. })));
    println!("  [4] (t, i, d) row ordering:            {}", inv(|v| matches!(v, PanelViolation::RowOrder { .. })));
    println!("  [5] Shares sum to 1 per period:        {}", inv(|v| matches!(v, PanelViolation::ShareSum { .. })));

    if violations.is_empty() {
        println!("  All panel invariants: PASS");
    } else {
        println!("\n  {} violation(s):", violations.len());
        for v in &violations {
            println!("    {v}");
        }
    }

    // ── Option shares ─────────────────────────────────────────────────────
    println!("\n=== Option shares ===");
    for shares in analysis::choice_shares(panel) {
        let cells: Vec<String> = shares
            .shares
            .iter()
            .map(|(d, s)| format!("d={}: {:>6.2}%", d.0, s * 100.0))
            .collect();
        println!("  t={}  {}", shares.period.0, cells.join("  "));
    }

    // ── Chosen-row summary ────────────────────────────────────────────────
    println!("\n=== Chosen-row summary ===");
    println!(
        "{:>4} | {:>9} | {:>10} | {:>10} | {:>10}",
        "t", "Consumers", "MeanPrice", "Monitored%", "MeanFrict"
    );
    for s in analysis::period_summaries(panel) {
        println!(
            "{:>4} | {:>9} | {:>10.3} | {:>9.1}% | {:>10.3}",
            s.period.0,
            s.consumers,
            s.mean_chosen_price,
            s.monitored_share * 100.0,
            s.mean_chosen_friction,
        );
    }
}

fn write_runs_csv(all_shares: &[Vec<ChoiceShares>], start_seed: u64, path: &str) {
    let file = File::create(path).unwrap_or_else(|e| panic!("failed to create {path}: {e}"));
    let mut w = BufWriter::new(file);
    writeln!(w, "seed,t,d,share").expect("write");
    for (i, run) in all_shares.iter().enumerate() {
        let seed = start_seed + i as u64;
        for shares in run {
            for (d, share) in &shares.shares {
                writeln!(w, "{},{},{},{:.6}", seed, shares.period.0, d.0, share)
                    .expect("write");
            }
        }
    }
}

fn print_all_run_shares(all_shares: &[Vec<ChoiceShares>], start_seed: u64) {
    println!("\n=== Per-Run Option Shares ===");
    for (i, run) in all_shares.iter().enumerate() {
        let seed = start_seed + i as u64;
        for shares in run {
            let cells: Vec<String> = shares
                .shares
                .iter()
                .map(|(d, s)| format!("d={}: {:>6.2}%", d.0, s * 100.0))
                .collect();
            println!("{:>6} | t={} | {}", seed, shares.period.0, cells.join("  "));
        }
    }
}

fn print_distributions(dists: &[analysis::ShareDist], n_runs: u64) {
    println!("\n=== Multi-Run Share Distribution (N={n_runs} runs) ===");
    println!(
        "{:>3} {:>3} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7}",
        "t", "d", "min", "p5", "p25", "p50", "p75", "p95", "max", "mean", "stddev"
    );
    for d in dists {
        let s = &d.stats;
        println!(
            "{:>3} {:>3} | {:>6.2}% | {:>6.2}% | {:>6.2}% | {:>6.2}% | {:>6.2}% | {:>6.2}% | {:>6.2}% | {:>6.2}% | {:>6.2}%",
            d.period.0,
            d.option.0,
            s.min * 100.0,
            s.p5 * 100.0,
            s.p25 * 100.0,
            s.p50 * 100.0,
            s.p75 * 100.0,
            s.p95 * 100.0,
            s.max * 100.0,
            s.mean * 100.0,
            s.std_dev * 100.0,
        );
    }
}
