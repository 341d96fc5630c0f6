use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConsumerId(pub u64);

/// Insurance carrier. Firm 1 offers the telematics monitoring program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Firm(pub u8);

/// Discrete choice alternative within a period. Period 0 has options 1..=4,
/// period 1 collapses to 1..=3 (monitoring is only offered up front).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OptionId(pub u8);

/// Model period: 0 = initial enrolment, 1 = renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Period(pub u8);

impl Period {
    pub const T0: Period = Period(0);
    pub const T1: Period = Period(1);
}

/// One entry of the static option menu: which firm the option buys from and
/// whether it enrols the consumer in the monitoring program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub option: OptionId,
    pub firm: Firm,
    pub monitored: bool,
}

/// Period-0 menu: monitored firm 1, unmonitored firm 1, firm 2, firm 3.
pub const PERIOD0_OPTIONS: [OptionSpec; 4] = [
    OptionSpec { option: OptionId(1), firm: Firm(1), monitored: true },
    OptionSpec { option: OptionId(2), firm: Firm(1), monitored: false },
    OptionSpec { option: OptionId(3), firm: Firm(2), monitored: false },
    OptionSpec { option: OptionId(4), firm: Firm(3), monitored: false },
];

/// Period-1 menu: one unmonitored option per firm.
pub const PERIOD1_OPTIONS: [OptionSpec; 3] = [
    OptionSpec { option: OptionId(1), firm: Firm(1), monitored: false },
    OptionSpec { option: OptionId(2), firm: Firm(2), monitored: false },
    OptionSpec { option: OptionId(3), firm: Firm(3), monitored: false },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period0_menu_has_one_monitored_option() {
        let monitored: Vec<_> = PERIOD0_OPTIONS.iter().filter(|o| o.monitored).collect();
        assert_eq!(monitored.len(), 1);
        assert_eq!(monitored[0].option, OptionId(1));
        assert_eq!(monitored[0].firm, Firm(1));
    }

    #[test]
    fn period0_firm1_has_monitored_and_unmonitored_siblings() {
        let firm1: Vec<_> = PERIOD0_OPTIONS.iter().filter(|o| o.firm == Firm(1)).collect();
        assert_eq!(firm1.len(), 2);
        assert_ne!(firm1[0].monitored, firm1[1].monitored);
    }

    #[test]
    fn period1_menu_is_unmonitored_and_covers_all_firms() {
        assert!(PERIOD1_OPTIONS.iter().all(|o| !o.monitored));
        let firms: Vec<u8> = PERIOD1_OPTIONS.iter().map(|o| o.firm.0).collect();
        assert_eq!(firms, vec![1, 2, 3]);
    }
}
