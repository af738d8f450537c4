use crate::bucket::{Bucket, BucketKey};
use crate::streaks::StreakIndex;
use core_types::Trade;
use rust_decimal::Decimal;

/// The validated trades of one analysis call in chronological order.
///
/// Trades are ordered by `close_time` (the moment their PnL is realised),
/// then `open_time`, then ticket. Every bucket refers to trades by their
/// index in this order, which keeps bucket members chronological too.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    trades: Vec<Trade>,
    streaks: StreakIndex,
}

impl Timeline {
    pub fn new(mut trades: Vec<Trade>) -> Self {
        trades.sort_by(|a, b| {
            a.close_time
                .cmp(&b.close_time)
                .then(a.open_time.cmp(&b.open_time))
                .then(a.ticket.cmp(&b.ticket))
        });
        let streaks = StreakIndex::build(&trades);
        Self { trades, streaks }
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn streaks(&self) -> &StreakIndex {
        &self.streaks
    }

    /// A bucket holding the whole history.
    pub fn all(&self) -> Bucket {
        Bucket {
            key: BucketKey::All,
            members: (0..self.trades.len()).collect(),
        }
    }

    /// Members of `bucket`, in chronological order.
    pub fn members<'a>(&'a self, bucket: &'a Bucket) -> impl Iterator<Item = &'a Trade> + 'a {
        bucket.members.iter().map(move |&i| &self.trades[i])
    }

    pub fn pnls(&self, bucket: &Bucket) -> Vec<Decimal> {
        self.members(bucket).map(|t| t.pnl).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::trade_at;
    use rust_decimal_macros::dec;

    #[test]
    fn trades_are_ordered_by_close_time() {
        let late = trade_at(1, 2024, 1, 8, 9, dec!(10));
        let mut early = trade_at(2, 2024, 1, 8, 10, dec!(-5));
        early.close_time = late.close_time - chrono::Duration::minutes(5);

        let timeline = Timeline::new(vec![late, early]);
        let tickets: Vec<u64> = timeline.trades().iter().map(|t| t.ticket).collect();
        assert_eq!(tickets, vec![2, 1]);
    }

    #[test]
    fn all_bucket_contains_every_index() {
        let timeline = Timeline::new(vec![
            trade_at(1, 2024, 1, 8, 9, dec!(10)),
            trade_at(2, 2024, 1, 8, 11, dec!(-5)),
        ]);
        assert_eq!(timeline.all().members, vec![0, 1]);
        assert_eq!(timeline.pnls(&timeline.all()), vec![dec!(10), dec!(-5)]);
    }
}
