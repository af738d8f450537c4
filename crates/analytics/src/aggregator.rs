use crate::bucket::{Bucket, BucketKey, DayPeriod};
use crate::sessions::SessionCalendar;
use crate::summary::BucketSummary;
use crate::timeline::Timeline;
use chrono::Weekday;
use configuration::OverlapScoring;
use core_types::Trade;

pub(crate) const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Partitions a timeline into calendar and session buckets.
///
/// Day, hour and month buckets are single-membership and always complete
/// (empty buckets are kept). Session and overlap buckets are multi-membership:
/// a trade belongs to every session whose window contains its entry hour.
#[derive(Debug, Clone, Copy)]
pub struct TimeAggregator<'a> {
    timeline: &'a Timeline,
    calendar: &'a SessionCalendar,
    scoring: OverlapScoring,
}

impl<'a> TimeAggregator<'a> {
    pub fn new(timeline: &'a Timeline, calendar: &'a SessionCalendar, scoring: OverlapScoring) -> Self {
        Self {
            timeline,
            calendar,
            scoring,
        }
    }

    pub fn timeline(&self) -> &'a Timeline {
        self.timeline
    }

    pub fn calendar(&self) -> &'a SessionCalendar {
        self.calendar
    }

    pub(crate) fn scoring(&self) -> OverlapScoring {
        self.scoring
    }

    /// Monday to Sunday.
    pub fn day_of_week_buckets(&self) -> Vec<Bucket> {
        self.partition(
            WEEKDAYS.iter().map(|d| BucketKey::DayOfWeek(*d)).collect(),
            |t| t.entry_weekday().num_days_from_monday() as usize,
        )
    }

    pub fn hour_buckets(&self) -> Vec<Bucket> {
        self.partition((0..24).map(BucketKey::Hour).collect(), |t| t.entry_hour() as usize)
    }

    pub fn month_buckets(&self) -> Vec<Bucket> {
        self.partition((1..=12).map(BucketKey::Month).collect(), |t| t.entry_month() as usize - 1)
    }

    /// Pre-market to evening.
    pub fn period_buckets(&self) -> Vec<Bucket> {
        self.partition(
            DayPeriod::ALL.iter().map(|p| BucketKey::Period(*p)).collect(),
            |t| DayPeriod::of_hour(t.entry_hour()) as usize,
        )
    }

    /// One bucket per configured session, in configuration order.
    pub fn session_buckets(&self) -> Vec<Bucket> {
        let mut buckets: Vec<Bucket> = self
            .calendar
            .sessions()
            .iter()
            .map(|s| Bucket::new(BucketKey::Session(s.name.clone())))
            .collect();

        for (index, trade) in self.timeline.trades().iter().enumerate() {
            let hour = trade.entry_hour();
            for (session, bucket) in self.calendar.sessions().iter().zip(buckets.iter_mut()) {
                if session.contains(hour) {
                    bucket.members.push(index);
                }
            }
        }
        buckets
    }

    /// One bucket per computed overlap, in calendar order.
    pub fn overlap_buckets(&self) -> Vec<Bucket> {
        let mut buckets: Vec<Bucket> = self
            .calendar
            .overlaps()
            .iter()
            .map(|o| Bucket::new(BucketKey::Overlap(o.name.clone())))
            .collect();

        for (index, trade) in self.timeline.trades().iter().enumerate() {
            let hour = trade.entry_hour();
            for (overlap, bucket) in self.calendar.overlaps().iter().zip(buckets.iter_mut()) {
                if overlap.contains(hour) {
                    bucket.members.push(index);
                }
            }
        }
        buckets
    }

    pub fn summarize(&self, bucket: &Bucket) -> BucketSummary {
        BucketSummary::from_trades(bucket.key.clone(), self.timeline.members(bucket))
    }

    pub fn overall(&self) -> BucketSummary {
        self.summarize(&self.timeline.all())
    }

    pub fn by_day_of_week(&self) -> Vec<BucketSummary> {
        self.summarize_all(&self.day_of_week_buckets())
    }

    pub fn by_hour(&self) -> Vec<BucketSummary> {
        self.summarize_all(&self.hour_buckets())
    }

    pub fn by_month(&self) -> Vec<BucketSummary> {
        self.summarize_all(&self.month_buckets())
    }

    pub fn by_period(&self) -> Vec<BucketSummary> {
        self.summarize_all(&self.period_buckets())
    }

    pub fn by_session(&self) -> Vec<BucketSummary> {
        self.summarize_all(&self.session_buckets())
    }

    pub fn by_overlap(&self) -> Vec<BucketSummary> {
        self.summarize_all(&self.overlap_buckets())
    }

    fn summarize_all(&self, buckets: &[Bucket]) -> Vec<BucketSummary> {
        buckets.iter().map(|b| self.summarize(b)).collect()
    }

    /// Assigns every trade to exactly one of `keys` by position.
    fn partition(
        &self,
        keys: Vec<BucketKey>,
        slot: impl Fn(&Trade) -> usize,
    ) -> Vec<Bucket> {
        let mut buckets: Vec<Bucket> = keys.into_iter().map(Bucket::new).collect();
        for (index, trade) in self.timeline.trades().iter().enumerate() {
            if let Some(bucket) = buckets.get_mut(slot(trade)) {
                bucket.members.push(index);
            }
        }
        buckets
    }
}
