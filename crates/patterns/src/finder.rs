use crate::condition::{build_catalog, Condition};
use crate::error::PatternError;
use crate::evaluator::matching_indices;
use analytics::{SessionCalendar, Timeline};
use analytics::stats::ratio;
use configuration::{AnalysisConfig, EmotionalTradingRules, Thresholds};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

/// How trades matching one condition performed against the whole history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionResult {
    pub condition: Condition,
    pub label: String,
    pub total_trades: usize,
    pub wins: usize,
    pub win_rate: Option<Decimal>,
    pub baseline_win_rate: Option<Decimal>,
    /// `win_rate - baseline_win_rate`.
    pub deviation: Option<Decimal>,
    pub total_pnl: Decimal,
    pub average_pnl: Option<Decimal>,
}

/// Finds the conditions under which the trader does unusually well or badly.
pub struct PatternFinder<'a> {
    timeline: &'a Timeline,
    calendar: &'a SessionCalendar,
    catalog: Vec<Condition>,
    thresholds: Thresholds,
    pub(crate) rules: EmotionalTradingRules,
}

impl<'a> PatternFinder<'a> {
    /// A finder over the standard catalog built from the configuration.
    pub fn new(timeline: &'a Timeline, calendar: &'a SessionCalendar, config: &AnalysisConfig) -> Self {
        let catalog = build_catalog(&config.conditions, calendar);
        tracing::debug!(conditions = catalog.len(), "Built condition catalog");
        Self {
            timeline,
            calendar,
            catalog,
            thresholds: config.thresholds.clone(),
            rules: config.emotional.clone(),
        }
    }

    /// A finder over a caller-supplied catalog. Every condition is validated
    /// against the calendar first.
    pub fn with_catalog(
        timeline: &'a Timeline,
        calendar: &'a SessionCalendar,
        config: &AnalysisConfig,
        catalog: Vec<Condition>,
    ) -> Result<Self, PatternError> {
        for condition in &catalog {
            condition.validate(calendar)?;
        }
        Ok(Self {
            timeline,
            calendar,
            catalog,
            thresholds: config.thresholds.clone(),
            rules: config.emotional.clone(),
        })
    }

    pub fn catalog(&self) -> &[Condition] {
        &self.catalog
    }

    pub(crate) fn timeline(&self) -> &'a Timeline {
        self.timeline
    }

    pub fn evaluate(&self, condition: &Condition) -> ConditionResult {
        let members = matching_indices(condition, self.timeline, self.calendar);
        let trades = self.timeline.trades();

        let wins = members.iter().filter(|i| trades[**i].is_win()).count();
        let total_pnl: Decimal = members.iter().map(|i| trades[*i].pnl).sum();
        let count = Decimal::from(members.len());
        let win_rate = ratio(Decimal::from(wins), count);
        let baseline_win_rate = self.baseline_win_rate();

        ConditionResult {
            condition: condition.clone(),
            label: condition.label(),
            total_trades: members.len(),
            wins,
            win_rate,
            baseline_win_rate,
            deviation: win_rate.zip(baseline_win_rate).map(|(wr, base)| wr - base),
            total_pnl,
            average_pnl: ratio(total_pnl, count),
        }
    }

    /// Conditions whose win rate beats the baseline by more than the margin.
    pub fn find_winning_conditions(&self) -> Vec<ConditionResult> {
        let margin = self.thresholds.pattern_win_rate_margin;
        self.significant(|deviation| deviation > margin)
    }

    /// Conditions whose win rate trails the baseline by more than the margin.
    pub fn find_losing_conditions(&self) -> Vec<ConditionResult> {
        let margin = self.thresholds.pattern_win_rate_margin;
        self.significant(|deviation| deviation < -margin)
    }

    fn significant(&self, keep: impl Fn(Decimal) -> bool) -> Vec<ConditionResult> {
        let min_trades = self.thresholds.min_trades_for_pattern;
        let mut results: Vec<ConditionResult> = self
            .catalog
            .iter()
            .map(|c| self.evaluate(c))
            .filter(|r| r.total_trades > 0 && r.total_trades >= min_trades)
            .filter(|r| r.deviation.is_some_and(&keep))
            .collect();

        results.sort_by(|a, b| {
            let by_size = match (a.deviation, b.deviation) {
                (Some(x), Some(y)) => y.abs().cmp(&x.abs()),
                _ => Ordering::Equal,
            };
            by_size.then_with(|| a.label.cmp(&b.label))
        });
        results
    }

    fn baseline_win_rate(&self) -> Option<Decimal> {
        let trades = self.timeline.trades();
        let wins = trades.iter().filter(|t| t.is_win()).count();
        ratio(Decimal::from(wins), Decimal::from(trades.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::hourly_trades;
    use rust_decimal_macros::dec;

    fn config(min_trades: usize) -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        config.thresholds.min_trades_for_pattern = min_trades;
        config
    }

    /// Four days of 24 hourly trades. Trades entered at 13:00-15:00 always
    /// win, trades at 02:00-04:00 always lose, the rest alternate.
    fn history() -> Timeline {
        let pnls: Vec<Decimal> = (0..96)
            .map(|i| match i % 24 {
                13..=15 => dec!(40),
                2..=4 => dec!(-40),
                h if h % 2 == 0 => dec!(10),
                _ => dec!(-10),
            })
            .collect();
        Timeline::new(hourly_trades(&pnls))
    }

    #[test]
    fn winning_conditions_beat_the_baseline_by_the_margin() {
        let timeline = history();
        let calendar = SessionCalendar::from_config(&AnalysisConfig::default()).unwrap();
        let finder = PatternFinder::new(&timeline, &calendar, &config(4));

        let winners = finder.find_winning_conditions();
        assert!(!winners.is_empty());
        for w in &winners {
            assert!(w.total_trades >= 4);
            assert!(w.deviation.unwrap() > dec!(0.10));
        }
        assert!(winners.iter().any(|w| w.condition == Condition::AtHour(14)));
        assert!(!winners.iter().any(|w| w.condition == Condition::AtHour(3)));

        let deviations: Vec<Decimal> = winners.iter().map(|w| w.deviation.unwrap()).collect();
        assert!(deviations.windows(2).all(|d| d[0] >= d[1]));
    }

    #[test]
    fn losing_conditions_trail_the_baseline() {
        let timeline = history();
        let calendar = SessionCalendar::from_config(&AnalysisConfig::default()).unwrap();
        let finder = PatternFinder::new(&timeline, &calendar, &config(4));

        let losers = finder.find_losing_conditions();
        assert!(losers.iter().any(|l| l.condition == Condition::AtHour(3)));
        assert!(losers.iter().all(|l| l.deviation.unwrap() < dec!(-0.10)));
    }

    #[test]
    fn small_subsets_are_ignored() {
        let timeline = history();
        let calendar = SessionCalendar::from_config(&AnalysisConfig::default()).unwrap();
        let finder = PatternFinder::new(&timeline, &calendar, &config(5));

        // Every hour bucket has only four trades.
        let winners = finder.find_winning_conditions();
        assert!(!winners.iter().any(|w| matches!(w.condition, Condition::AtHour(_))));
    }

    #[test]
    fn empty_history_finds_nothing() {
        let timeline = Timeline::default();
        let calendar = SessionCalendar::from_config(&AnalysisConfig::default()).unwrap();
        let finder = PatternFinder::new(&timeline, &calendar, &config(0));

        assert!(finder.find_winning_conditions().is_empty());
        assert!(finder.find_losing_conditions().is_empty());
    }

    #[test]
    fn custom_catalog_is_validated() {
        let timeline = Timeline::default();
        let calendar = SessionCalendar::from_config(&AnalysisConfig::default()).unwrap();
        let result = PatternFinder::with_catalog(
            &timeline,
            &calendar,
            &AnalysisConfig::default(),
            vec![Condition::InOverlap("Nowhere".into())],
        );
        assert!(matches!(result, Err(PatternError::UnknownOverlap(_))));
    }
}
