use crate::condition::Condition;
use analytics::{SessionCalendar, Timeline};
use core_types::Outcome;

/// The single dispatcher for every condition kind.
///
/// `index` is the trade's position in the timeline. Streak conditions look at
/// the global run ending right before it.
pub fn matches(condition: &Condition, index: usize, timeline: &Timeline, calendar: &SessionCalendar) -> bool {
    let Some(trade) = timeline.trades().get(index) else {
        return false;
    };

    match condition {
        Condition::AfterWinStreak(n) => preceded_by(timeline, index, Outcome::Win, *n),
        Condition::AfterLossStreak(n) => preceded_by(timeline, index, Outcome::Loss, *n),
        Condition::InSession(name) => calendar
            .sessions()
            .iter()
            .any(|s| &s.name == name && s.contains(trade.entry_hour())),
        Condition::InOverlap(name) => calendar
            .overlaps()
            .iter()
            .any(|o| &o.name == name && o.contains(trade.entry_hour())),
        Condition::OnDay(day) => trade.entry_weekday() == *day,
        Condition::AtHour(hour) => trade.entry_hour() == *hour,
        Condition::Direction(direction) => trade.direction == *direction,
        Condition::RMultipleAbove(threshold) => trade.r_multiple.is_some_and(|r| r > *threshold),
        Condition::HeldLongerThan(minutes) => {
            trade.holding_period().num_minutes() > i64::from(*minutes)
        }
    }
}

fn preceded_by(timeline: &Timeline, index: usize, outcome: Outcome, min_len: usize) -> bool {
    timeline
        .streaks()
        .preceding(index)
        .is_some_and(|(run_outcome, len)| run_outcome == outcome && len >= min_len)
}

/// Timeline indices of every trade matching `condition`, in chronological order.
pub fn matching_indices(condition: &Condition, timeline: &Timeline, calendar: &SessionCalendar) -> Vec<usize> {
    (0..timeline.len())
        .filter(|i| matches(condition, *i, timeline, calendar))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::hourly_trades;
    use configuration::AnalysisConfig;
    use core_types::Direction;
    use rust_decimal_macros::dec;

    #[test]
    fn streak_conditions_use_the_run_before_the_trade() {
        let timeline = Timeline::new(hourly_trades(&[dec!(5), dec!(5), dec!(-3), dec!(5), dec!(-3), dec!(-3), dec!(8)]));
        let calendar = SessionCalendar::from_config(&AnalysisConfig::default()).unwrap();

        assert_eq!(
            matching_indices(&Condition::AfterWinStreak(2), &timeline, &calendar),
            vec![2]
        );
        assert_eq!(
            matching_indices(&Condition::AfterLossStreak(2), &timeline, &calendar),
            vec![6]
        );
        assert_eq!(
            matching_indices(&Condition::AfterLossStreak(1), &timeline, &calendar),
            vec![3, 5, 6]
        );
    }

    #[test]
    fn trade_attribute_conditions() {
        let mut trades = hourly_trades(&[dec!(5), dec!(-5)]);
        trades[0].direction = Direction::Short;
        trades[0].r_multiple = Some(dec!(2.5));
        trades[1].close_time = trades[1].open_time + chrono::Duration::hours(5);
        let timeline = Timeline::new(trades);
        let calendar = SessionCalendar::from_config(&AnalysisConfig::default()).unwrap();

        assert!(matches(&Condition::Direction(Direction::Short), 0, &timeline, &calendar));
        assert!(matches(&Condition::RMultipleAbove(dec!(2)), 0, &timeline, &calendar));
        assert!(!matches(&Condition::RMultipleAbove(dec!(2)), 1, &timeline, &calendar));
        assert!(matches(&Condition::HeldLongerThan(240), 1, &timeline, &calendar));
        assert!(!matches(&Condition::HeldLongerThan(240), 0, &timeline, &calendar));
        assert!(!matches(&Condition::AtHour(0), 99, &timeline, &calendar));
    }

    #[test]
    fn session_and_overlap_conditions_follow_the_calendar() {
        // Trades open at 00:00 and 01:00 UTC: Sydney and Tokyo.
        let timeline = Timeline::new(hourly_trades(&[dec!(1), dec!(1)]));
        let calendar = SessionCalendar::from_config(&AnalysisConfig::default()).unwrap();

        assert!(matches(&Condition::InSession("Tokyo".into()), 0, &timeline, &calendar));
        assert!(!matches(&Condition::InSession("London".into()), 0, &timeline, &calendar));
        assert!(matches(&Condition::InOverlap("Sydney/Tokyo".into()), 1, &timeline, &calendar));
    }
}
