use serde::Serialize;

use crate::choice::ChoiceRow;
use crate::risk::Covariates;
use crate::types::{ConsumerId, Firm, OptionId, Period};

/// One row of the final long-format panel: (consumer, option, period) with
/// the covariates, price, prior firm, and resolved choice flag, plus the
/// utility components retained for the downstream estimator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow {
    pub i: ConsumerId,
    pub d: OptionId,
    pub t: Period,
    /// Monitoring flag of the option (0/1).
    pub m: u8,
    pub f: Firm,
    pub x_1: f64,
    pub x_2: f64,
    pub x_3: f64,
    pub x_4: f64,
    pub price: f64,
    pub prior_firm: Firm,
    pub choice: u8,
    pub friction: f64,
    pub e_oop: f64,
    pub e_rate_factor: f64,
    pub e_claims_factor: f64,
    pub utility: f64,
    pub shocked_utility: f64,
}

impl PanelRow {
    /// Flatten a resolved choice row with its period's covariates and the
    /// prior firm in effect for that period.
    pub fn from_choice(row: &ChoiceRow, prior_firm: Firm, x: &Covariates) -> Self {
        PanelRow {
            i: row.consumer,
            d: row.option,
            t: row.period,
            m: row.monitored as u8,
            f: row.firm,
            x_1: x.0[0],
            x_2: x.0[1],
            x_3: x.0[2],
            x_4: x.0[3],
            price: row.price,
            prior_firm,
            choice: row.choice as u8,
            friction: row.friction,
            e_oop: row.e_oop,
            e_rate_factor: row.e_rate_factor,
            e_claims_factor: row.e_claims_factor,
            utility: row.utility,
            shocked_utility: row.shocked_utility,
        }
    }
}

/// The concatenated two-period panel, row-ordered by (t, i, d).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panel {
    pub rows: Vec<PanelRow>,
}

impl Panel {
    pub fn new(rows: Vec<PanelRow>) -> Self {
        Panel { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PanelRow> {
        self.rows.iter()
    }

    /// Rows of one period, in (i, d) order.
    pub fn period_rows(&self, period: Period) -> impl Iterator<Item = &PanelRow> {
        self.rows.iter().filter(move |r| r.t == period)
    }

    /// Chosen rows of one period, one per consumer in id order.
    pub fn chosen_rows(&self, period: Period) -> impl Iterator<Item = &PanelRow> {
        self.period_rows(period).filter(|r| r.choice == 1)
    }
}

impl<'a> IntoIterator for &'a Panel {
    type Item = &'a PanelRow;
    type IntoIter = std::slice::Iter<'a, PanelRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
