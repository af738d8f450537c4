use crate::error::PatternError;
use analytics::SessionCalendar;
use chrono::Weekday;
use configuration::ConditionCatalogSettings;
use core_types::Direction;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A predicate over a trade and its position in the timeline.
///
/// Adding a condition means adding a variant here, a label in `Display` and
/// an arm in `evaluator::matches`. The compiler enforces the latter two.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Condition {
    /// Preceded by at least `n` consecutive wins.
    AfterWinStreak(usize),
    /// Preceded by at least `n` consecutive losses.
    AfterLossStreak(usize),
    InSession(String),
    InOverlap(String),
    OnDay(Weekday),
    AtHour(u32),
    Direction(Direction),
    RMultipleAbove(Decimal),
    /// Held for more than the given number of minutes.
    HeldLongerThan(u32),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::AfterWinStreak(n) => write!(f, "after {n}+ consecutive wins"),
            Condition::AfterLossStreak(n) => write!(f, "after {n}+ consecutive losses"),
            Condition::InSession(name) => write!(f, "during {name} session"),
            Condition::InOverlap(name) => write!(f, "during {name} overlap"),
            Condition::OnDay(day) => write!(f, "on {day:?}"),
            Condition::AtHour(hour) => write!(f, "entered at {hour:02}:00 UTC"),
            Condition::Direction(Direction::Long) => write!(f, "long trades"),
            Condition::Direction(Direction::Short) => write!(f, "short trades"),
            Condition::RMultipleAbove(r) => write!(f, "R-multiple above {r}"),
            Condition::HeldLongerThan(minutes) => write!(f, "held longer than {minutes} minutes"),
        }
    }
}

impl Condition {
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// True for conditions that only restate a calendar or session bucket.
    pub fn is_time_slot(&self) -> bool {
        matches!(
            self,
            Condition::InSession(_) | Condition::InOverlap(_) | Condition::OnDay(_) | Condition::AtHour(_)
        )
    }

    /// Checks that the condition can be evaluated against `calendar`.
    pub fn validate(&self, calendar: &SessionCalendar) -> Result<(), PatternError> {
        match self {
            Condition::AfterWinStreak(0) | Condition::AfterLossStreak(0) => Err(
                PatternError::InvalidParameters(self.label(), "streak length must be at least 1".into()),
            ),
            Condition::AtHour(hour) if *hour > 23 => Err(PatternError::InvalidParameters(
                self.label(),
                "hour must be between 0 and 23".into(),
            )),
            Condition::InSession(name) if !calendar.sessions().iter().any(|s| &s.name == name) => {
                Err(PatternError::UnknownSession(self.label()))
            }
            Condition::InOverlap(name) if !calendar.overlaps().iter().any(|o| &o.name == name) => {
                Err(PatternError::UnknownOverlap(self.label()))
            }
            _ => Ok(()),
        }
    }
}

/// Builds the standard condition catalog for a calendar.
///
/// Streak lengths, R-multiple thresholds and the long-hold cut-off come from
/// the settings. Every session, overlap, weekday, hour and direction gets its
/// own condition.
pub fn build_catalog(settings: &ConditionCatalogSettings, calendar: &SessionCalendar) -> Vec<Condition> {
    let mut catalog = Vec::new();

    for n in &settings.streak_lengths {
        catalog.push(Condition::AfterWinStreak(*n));
        catalog.push(Condition::AfterLossStreak(*n));
    }
    catalog.extend(calendar.sessions().iter().map(|s| Condition::InSession(s.name.clone())));
    catalog.extend(calendar.overlaps().iter().map(|o| Condition::InOverlap(o.name.clone())));
    catalog.extend(WEEKDAYS.iter().map(|d| Condition::OnDay(*d)));
    catalog.extend((0..24).map(Condition::AtHour));
    catalog.push(Condition::Direction(Direction::Long));
    catalog.push(Condition::Direction(Direction::Short));
    catalog.extend(settings.r_multiple_thresholds.iter().map(|r| Condition::RMultipleAbove(*r)));
    catalog.push(Condition::HeldLongerThan(settings.long_hold_minutes));

    catalog
}
