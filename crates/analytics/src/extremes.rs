use crate::aggregator::TimeAggregator;
use crate::summary::BucketSummary;
use configuration::Thresholds;
use serde::Serialize;
use std::cmp::Ordering;

/// Best and worst calendar slots of the history.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TimeExtremes {
    pub peak_hours: Vec<BucketSummary>,
    /// Hours that lose money on average, worst first.
    pub worst_hours: Vec<BucketSummary>,
    pub best_weekday: Option<BucketSummary>,
    pub worst_weekday: Option<BucketSummary>,
    pub best_month: Option<BucketSummary>,
    pub worst_month: Option<BucketSummary>,
}

impl TimeAggregator<'_> {
    /// Up to `limit` hours with at least `min_trades` trades, best first.
    ///
    /// Hours are ranked by win rate, then by average PnL. Equal hours keep
    /// clock order.
    pub fn get_peak_hours(&self, limit: usize, min_trades: usize) -> Vec<BucketSummary> {
        let mut hours = qualifying(self.by_hour(), min_trades);
        hours.sort_by(|a, b| performance_order(b, a));
        hours.truncate(limit);
        hours
    }

    /// Up to `limit` money-losing hours with at least `min_trades` trades, worst first.
    pub fn get_worst_hours(&self, limit: usize, min_trades: usize) -> Vec<BucketSummary> {
        let mut hours: Vec<BucketSummary> = qualifying(self.by_hour(), min_trades)
            .into_iter()
            .filter(|h| h.average_pnl.is_some_and(|avg| avg.is_sign_negative() && !avg.is_zero()))
            .collect();
        hours.sort_by(performance_order);
        hours.truncate(limit);
        hours
    }

    pub fn get_best_weekday(&self, min_trades: usize) -> Option<BucketSummary> {
        best_of(qualifying(self.by_day_of_week(), min_trades))
    }

    pub fn get_worst_weekday(&self, min_trades: usize) -> Option<BucketSummary> {
        worst_of(qualifying(self.by_day_of_week(), min_trades))
    }

    pub fn get_best_month(&self, min_trades: usize) -> Option<BucketSummary> {
        best_of(qualifying(self.by_month(), min_trades))
    }

    pub fn get_worst_month(&self, min_trades: usize) -> Option<BucketSummary> {
        worst_of(qualifying(self.by_month(), min_trades))
    }

    pub fn time_extremes(&self, thresholds: &Thresholds) -> TimeExtremes {
        let hour_min = thresholds.peak_hour_min_trades;
        let calendar_min = thresholds.extreme_min_trades;
        TimeExtremes {
            peak_hours: self.get_peak_hours(thresholds.peak_hours_limit, hour_min),
            worst_hours: self.get_worst_hours(thresholds.peak_hours_limit, hour_min),
            best_weekday: self.get_best_weekday(calendar_min),
            worst_weekday: self.get_worst_weekday(calendar_min),
            best_month: self.get_best_month(calendar_min),
            worst_month: self.get_worst_month(calendar_min),
        }
    }
}

fn qualifying(summaries: Vec<BucketSummary>, min_trades: usize) -> Vec<BucketSummary> {
    summaries
        .into_iter()
        .filter(|s| s.is_significant(min_trades))
        .collect()
}

fn performance_order(a: &BucketSummary, b: &BucketSummary) -> Ordering {
    (a.win_rate, a.average_pnl).cmp(&(b.win_rate, b.average_pnl))
}

/// The first of the best-performing summaries.
fn best_of(summaries: Vec<BucketSummary>) -> Option<BucketSummary> {
    summaries.into_iter().reduce(|best, s| {
        if performance_order(&s, &best) == Ordering::Greater {
            s
        } else {
            best
        }
    })
}

/// The first of the worst-performing summaries.
fn worst_of(summaries: Vec<BucketSummary>) -> Option<BucketSummary> {
    summaries.into_iter().reduce(|worst, s| {
        if performance_order(&s, &worst) == Ordering::Less {
            s
        } else {
            worst
        }
    })
}
