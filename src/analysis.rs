use std::collections::BTreeMap;
use std::fmt;

use crate::panel::Panel;
use crate::types::{ConsumerId, OptionId, Period};

/// A violated panel invariant. An empty violation list is the contract the
/// generator must uphold for every seed and config.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelViolation {
    /// A (consumer, period) block has no chosen row.
    NoChoice { consumer: ConsumerId, period: Period },
    /// A (consumer, period) block has more than one chosen row.
    MultipleChoices { consumer: ConsumerId, period: Period, count: usize },
    /// A (consumer, period) block has the wrong number of option rows
    /// (4 at t=0, 3 at t=1).
    WrongRowCount { consumer: ConsumerId, period: Period, count: usize },
    /// A price is NaN or infinite.
    NonFinitePrice { consumer: ConsumerId, period: Period, option: OptionId },
    /// Rows are not sorted by (t, i, d) at this index.
    RowOrder { index: usize },
    /// Option shares within a period do not sum to 1.
    ShareSum { period: Period, sum: f64 },
}

impl fmt::Display for PanelViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelViolation::NoChoice { consumer, period } => {
                write!(f, "consumer {} period {} has no chosen row", consumer.0, period.0)
            }
            PanelViolation::MultipleChoices { consumer, period, count } => write!(
                f,
                "consumer {} period {} has {count} chosen rows",
                consumer.0, period.0
            ),
            PanelViolation::WrongRowCount { consumer, period, count } => write!(
                f,
                "consumer {} period {} has {count} option rows",
                consumer.0, period.0
            ),
            PanelViolation::NonFinitePrice { consumer, period, option } => write!(
                f,
                "consumer {} period {} option {} has a non-finite price",
                consumer.0, period.0, option.0
            ),
            PanelViolation::RowOrder { index } => {
                write!(f, "row {index} breaks (t, i, d) ordering")
            }
            PanelViolation::ShareSum { period, sum } => {
                write!(f, "period {} option shares sum to {sum} (expected 1)", period.0)
            }
        }
    }
}

fn expected_rows(period: Period) -> usize {
    if period == Period::T0 { 4 } else { 3 }
}

/// Check every panel invariant, returning all violations found.
pub fn verify_panel(panel: &Panel) -> Vec<PanelViolation> {
    let mut violations = Vec::new();

    // (t, i, d) ordering.
    for (index, pair) in panel.rows.windows(2).enumerate() {
        let a = (pair[0].t.0, pair[0].i.0, pair[0].d.0);
        let b = (pair[1].t.0, pair[1].i.0, pair[1].d.0);
        if a >= b {
            violations.push(PanelViolation::RowOrder { index: index + 1 });
        }
    }

    // Per-(consumer, period) block shape and choice uniqueness.
    let mut blocks: BTreeMap<(u8, u64), (usize, usize)> = BTreeMap::new();
    for r in panel {
        if !r.price.is_finite() {
            violations.push(PanelViolation::NonFinitePrice {
                consumer: r.i,
                period: r.t,
                option: r.d,
            });
        }
        let entry = blocks.entry((r.t.0, r.i.0)).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += r.choice as usize;
    }
    for (&(t, i), &(rows, chosen)) in &blocks {
        let period = Period(t);
        let consumer = ConsumerId(i);
        if rows != expected_rows(period) {
            violations.push(PanelViolation::WrongRowCount { consumer, period, count: rows });
        }
        match chosen {
            0 => violations.push(PanelViolation::NoChoice { consumer, period }),
            1 => {}
            count => {
                violations.push(PanelViolation::MultipleChoices { consumer, period, count })
            }
        }
    }

    // Share sums.
    for shares in choice_shares(panel) {
        let sum: f64 = shares.shares.iter().map(|(_, s)| s).sum();
        if (sum - 1.0).abs() > 1e-9 {
            violations.push(PanelViolation::ShareSum { period: shares.period, sum });
        }
    }

    violations
}

/// Aggregate option shares for one period: mean of `choice` by option.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceShares {
    pub period: Period,
    /// (option, share) pairs in option order.
    pub shares: Vec<(OptionId, f64)>,
}

impl ChoiceShares {
    pub fn share(&self, option: OptionId) -> Option<f64> {
        self.shares.iter().find(|(d, _)| *d == option).map(|(_, s)| *s)
    }
}

/// Option shares per period, in period order.
pub fn choice_shares(panel: &Panel) -> Vec<ChoiceShares> {
    let mut chosen: BTreeMap<u8, BTreeMap<u8, usize>> = BTreeMap::new();
    let mut consumers: BTreeMap<u8, usize> = BTreeMap::new();
    for r in panel {
        let per_option = chosen.entry(r.t.0).or_default();
        per_option.entry(r.d.0).or_insert(0);
        if r.choice == 1 {
            *per_option.entry(r.d.0).or_insert(0) += 1;
            *consumers.entry(r.t.0).or_insert(0) += 1;
        }
    }

    chosen
        .into_iter()
        .map(|(t, per_option)| {
            let n = consumers.get(&t).copied().unwrap_or(0).max(1) as f64;
            ChoiceShares {
                period: Period(t),
                shares: per_option
                    .into_iter()
                    .map(|(d, count)| (OptionId(d), count as f64 / n))
                    .collect(),
            }
        })
        .collect()
}

/// Per-period summary of the chosen rows, for the report table.
#[derive(Debug, Clone)]
pub struct PeriodSummary {
    pub period: Period,
    pub consumers: usize,
    /// Mean price among chosen rows.
    pub mean_chosen_price: f64,
    /// Share of consumers whose chosen option was monitored.
    pub monitored_share: f64,
    /// Mean friction among chosen rows.
    pub mean_chosen_friction: f64,
}

pub fn period_summaries(panel: &Panel) -> Vec<PeriodSummary> {
    [Period::T0, Period::T1]
        .into_iter()
        .filter_map(|period| {
            let chosen: Vec<_> = panel.chosen_rows(period).collect();
            if chosen.is_empty() {
                return None;
            }
            let n = chosen.len() as f64;
            Some(PeriodSummary {
                period,
                consumers: chosen.len(),
                mean_chosen_price: chosen.iter().map(|r| r.price).sum::<f64>() / n,
                monitored_share: chosen.iter().filter(|r| r.m == 1).count() as f64 / n,
                mean_chosen_friction: chosen.iter().map(|r| r.friction).sum::<f64>() / n,
            })
        })
        .collect()
}

/// How a choice share varies across a multi-seed sweep.
#[derive(Debug, Clone)]
pub struct DistStats {
    pub n: usize,
    pub min: f64,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl DistStats {
    /// Summarise a set of share samples. Percentiles interpolate linearly
    /// between adjacent order statistics.
    fn from_samples(mut samples: Vec<f64>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_by(f64::total_cmp);
        let n = samples.len();

        let quantile = |q: f64| {
            let pos = q * (n - 1) as f64;
            let idx = pos as usize;
            let below = samples[idx];
            let above = samples[(idx + 1).min(n - 1)];
            below + (pos - idx as f64) * (above - below)
        };

        let mean = samples.iter().sum::<f64>() / n as f64;
        let sum_sq: f64 = samples.iter().map(|s| (s - mean) * (s - mean)).sum();
        let std_dev = if n > 1 { (sum_sq / (n - 1) as f64).sqrt() } else { 0.0 };

        Some(DistStats {
            n,
            min: samples[0],
            p5: quantile(0.05),
            p25: quantile(0.25),
            p50: quantile(0.50),
            p75: quantile(0.75),
            p95: quantile(0.95),
            max: samples[n - 1],
            mean,
            std_dev,
        })
    }
}

/// Cross-run distribution of one option's share.
#[derive(Debug, Clone)]
pub struct ShareDist {
    pub period: Period,
    pub option: OptionId,
    pub stats: DistStats,
}

/// Per-(period, option) cross-run share distributions for a multi-seed
/// sweep. Requires at least 2 runs per cell to be meaningful; cells present
/// in fewer runs are excluded.
pub fn share_distributions(all_runs: &[Vec<ChoiceShares>]) -> Vec<ShareDist> {
    let mut by_cell: BTreeMap<(u8, u8), Vec<f64>> = BTreeMap::new();
    for run in all_runs {
        for shares in run {
            for (option, share) in &shares.shares {
                by_cell.entry((shares.period.0, option.0)).or_default().push(*share);
            }
        }
    }

    by_cell
        .into_iter()
        .filter(|(_, values)| values.len() >= 2)
        .filter_map(|((t, d), values)| {
            DistStats::from_samples(values).map(|stats| ShareDist {
                period: Period(t),
                option: OptionId(d),
                stats,
            })
        })
        .collect()
}
