use chrono::Weekday;
use serde::Serialize;
use std::fmt;

/// Identifies one partition of the trade history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum BucketKey {
    All,
    DayOfWeek(Weekday),
    /// UTC hour of day, 0-23.
    Hour(u32),
    /// Calendar month, 1-12.
    Month(u32),
    Period(DayPeriod),
    Session(String),
    Overlap(String),
}

/// Fixed parts of the UTC trading day, independent of the session calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    /// 00:00-08:00
    PreMarket,
    /// 08:00-12:00
    MarketOpen,
    /// 12:00-16:00
    Midday,
    /// 16:00-20:00
    Afternoon,
    /// 20:00-24:00
    Evening,
}

impl DayPeriod {
    pub const ALL: [DayPeriod; 5] = [
        DayPeriod::PreMarket,
        DayPeriod::MarketOpen,
        DayPeriod::Midday,
        DayPeriod::Afternoon,
        DayPeriod::Evening,
    ];

    pub fn of_hour(hour: u32) -> Self {
        match hour {
            0..=7 => DayPeriod::PreMarket,
            8..=11 => DayPeriod::MarketOpen,
            12..=15 => DayPeriod::Midday,
            16..=19 => DayPeriod::Afternoon,
            _ => DayPeriod::Evening,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DayPeriod::PreMarket => "pre-market",
            DayPeriod::MarketOpen => "market open",
            DayPeriod::Midday => "midday",
            DayPeriod::Afternoon => "afternoon",
            DayPeriod::Evening => "evening",
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::All => write!(f, "All trades"),
            BucketKey::DayOfWeek(day) => write!(f, "{}", weekday_name(*day)),
            BucketKey::Hour(hour) => write!(f, "{hour:02}:00 UTC"),
            BucketKey::Month(month) => {
                let name = (*month as usize)
                    .checked_sub(1)
                    .and_then(|i| MONTH_NAMES.get(i))
                    .copied()
                    .unwrap_or("Unknown month");
                write!(f, "{name}")
            }
            BucketKey::Period(period) => write!(f, "{} (UTC)", period.name()),
            BucketKey::Session(name) => write!(f, "{name} session"),
            BucketKey::Overlap(name) => write!(f, "{name} overlap"),
        }
    }
}

/// A named subset of the timeline, stored as chronological timeline indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub key: BucketKey,
    pub members: Vec<usize>,
}

impl Bucket {
    pub fn new(key: BucketKey) -> Self {
        Self {
            key,
            members: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_render_human_readable_labels() {
        assert_eq!(BucketKey::DayOfWeek(Weekday::Wed).to_string(), "Wednesday");
        assert_eq!(BucketKey::Hour(7).to_string(), "07:00 UTC");
        assert_eq!(BucketKey::Month(12).to_string(), "December");
        assert_eq!(BucketKey::Session("London".into()).to_string(), "London session");
        assert_eq!(BucketKey::Period(DayPeriod::MarketOpen).to_string(), "market open (UTC)");
    }

    #[test]
    fn every_hour_falls_in_one_period() {
        assert_eq!(DayPeriod::of_hour(0), DayPeriod::PreMarket);
        assert_eq!(DayPeriod::of_hour(7), DayPeriod::PreMarket);
        assert_eq!(DayPeriod::of_hour(8), DayPeriod::MarketOpen);
        assert_eq!(DayPeriod::of_hour(15), DayPeriod::Midday);
        assert_eq!(DayPeriod::of_hour(16), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::of_hour(20), DayPeriod::Evening);
        assert_eq!(DayPeriod::of_hour(23), DayPeriod::Evening);
    }
}
