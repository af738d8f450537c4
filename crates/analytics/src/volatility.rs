use crate::aggregator::TimeAggregator;
use crate::stats::{linear_percentile, mean, population_std_dev};
use core_types::Outcome;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

const CONSISTENCY_EPSILON: Decimal = dec!(0.000000001);

/// PnL dispersion of the trades entered during one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionVolatility {
    pub session: String,
    pub total_trades: usize,
    /// Largest minus smallest PnL.
    pub profit_range: Option<Decimal>,
    pub std_dev: Option<Decimal>,
    pub interquartile_range: Option<Decimal>,
    /// `1 - stdev / (|mean| + 1e-9)`, clamped to `[0, 1]`.
    pub consistency_score: Option<Decimal>,
    pub max_win_streak: usize,
    pub max_loss_streak: usize,
}

/// Dispersion statistics of a PnL sample. All `None` below two samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dispersion {
    pub range: Option<Decimal>,
    pub std_dev: Option<Decimal>,
    pub interquartile_range: Option<Decimal>,
    pub consistency: Option<Decimal>,
}

impl Dispersion {
    pub fn of(pnls: &[Decimal]) -> Self {
        if pnls.len() < 2 {
            return Self::default();
        }
        let mut sorted = pnls.to_vec();
        sorted.sort();

        let range = sorted
            .last()
            .zip(sorted.first())
            .and_then(|(max, min)| max.checked_sub(*min));
        let std_dev = population_std_dev(&sorted);
        let interquartile_range = linear_percentile(&sorted, dec!(0.75))
            .zip(linear_percentile(&sorted, dec!(0.25)))
            .and_then(|(q3, q1)| q3.checked_sub(q1));
        let consistency = std_dev.zip(mean(&sorted)).and_then(|(sd, m)| {
            let relative = sd.checked_div(m.abs().checked_add(CONSISTENCY_EPSILON)?)?;
            let score = Decimal::ONE - relative;
            Some(score.max(Decimal::ZERO).min(Decimal::ONE))
        });

        Self {
            range,
            std_dev,
            interquartile_range,
            consistency,
        }
    }
}

impl TimeAggregator<'_> {
    /// Volatility profile of every configured session.
    pub fn session_volatility(&self) -> Vec<SessionVolatility> {
        let timeline = self.timeline();
        self.calendar()
            .sessions()
            .iter()
            .zip(self.session_buckets())
            .map(|(session, bucket)| {
                let dispersion = Dispersion::of(&timeline.pnls(&bucket));
                SessionVolatility {
                    session: session.name.clone(),
                    total_trades: bucket.len(),
                    profit_range: dispersion.range,
                    std_dev: dispersion.std_dev,
                    interquartile_range: dispersion.interquartile_range,
                    consistency_score: dispersion.consistency,
                    max_win_streak: timeline.streaks().longest_within(&bucket.members, Outcome::Win),
                    max_loss_streak: timeline.streaks().longest_within(&bucket.members, Outcome::Loss),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::SessionCalendar;
    use crate::test_support::trade_at;
    use crate::timeline::Timeline;
    use configuration::{AnalysisConfig, OverlapScoring};

    #[test]
    fn single_trade_has_no_dispersion() {
        assert_eq!(Dispersion::of(&[dec!(10)]), Dispersion::default());
    }

    #[test]
    fn identical_pnls_are_perfectly_consistent() {
        let dispersion = Dispersion::of(&[dec!(20), dec!(20), dec!(20)]);
        assert_eq!(dispersion.range, Some(dec!(0)));
        assert_eq!(dispersion.std_dev, Some(dec!(0)));
        assert_eq!(dispersion.interquartile_range, Some(dec!(0)));
        assert_eq!(dispersion.consistency, Some(dec!(1)));
    }

    #[test]
    fn wild_swings_clamp_consistency_to_zero() {
        let dispersion = Dispersion::of(&[dec!(-100), dec!(100)]);
        assert_eq!(dispersion.range, Some(dec!(200)));
        assert_eq!(dispersion.std_dev, Some(dec!(100)));
        assert_eq!(dispersion.interquartile_range, Some(dec!(100)));
        assert_eq!(dispersion.consistency, Some(dec!(0)));
    }

    #[test]
    fn huge_pnls_leave_overflowing_statistics_undefined() {
        let dispersion = Dispersion::of(&[dec!(-500000000000000), dec!(500000000000000)]);
        assert_eq!(dispersion.range, Some(dec!(1000000000000000)));
        assert_eq!(dispersion.interquartile_range, Some(dec!(500000000000000)));
        assert_eq!(dispersion.std_dev, None);
        assert_eq!(dispersion.consistency, None);
    }

    #[test]
    fn session_profile_uses_global_streaks() {
        // London trades at 10:00 on three days with a Tokyo loss at 03:00
        // between the second and third, which breaks the win run.
        let trades = vec![
            trade_at(1, 2024, 1, 8, 10, dec!(10)),
            trade_at(2, 2024, 1, 9, 10, dec!(30)),
            trade_at(3, 2024, 1, 10, 3, dec!(-15)),
            trade_at(4, 2024, 1, 10, 10, dec!(20)),
        ];
        let timeline = Timeline::new(trades);
        let calendar = SessionCalendar::from_config(&AnalysisConfig::default()).unwrap();
        let aggregator = TimeAggregator::new(&timeline, &calendar, OverlapScoring::default());

        let profiles = aggregator.session_volatility();
        let london = profiles.iter().find(|p| p.session == "London").unwrap();
        assert_eq!(london.total_trades, 3);
        assert_eq!(london.max_win_streak, 2);
        assert_eq!(london.max_loss_streak, 0);
        assert_eq!(london.profit_range, Some(dec!(20)));

        let new_york = profiles.iter().find(|p| p.session == "New_York").unwrap();
        assert_eq!(new_york.total_trades, 0);
        assert_eq!(new_york.std_dev, None);
    }
}
