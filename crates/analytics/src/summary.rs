use crate::bucket::BucketKey;
use crate::stats::ratio;
use core_types::{Outcome, Trade};
use rust_decimal::Decimal;
use serde::Serialize;

/// Aggregate statistics of one bucket.
///
/// Statistics that are undefined for an empty bucket are `None`, never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub bucket: BucketKey,
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    /// Fraction of winning trades, 0 to 1.
    pub win_rate: Option<Decimal>,
    pub total_pnl: Option<Decimal>,
    pub average_pnl: Option<Decimal>,
}

impl BucketSummary {
    pub fn from_trades<'a>(bucket: BucketKey, trades: impl IntoIterator<Item = &'a Trade>) -> Self {
        let mut summary = Self {
            bucket,
            total_trades: 0,
            wins: 0,
            losses: 0,
            breakeven: 0,
            win_rate: None,
            total_pnl: None,
            average_pnl: None,
        };

        let mut total_pnl = Decimal::ZERO;
        for trade in trades {
            summary.total_trades += 1;
            total_pnl += trade.pnl;
            match trade.outcome() {
                Outcome::Win => summary.wins += 1,
                Outcome::Loss => summary.losses += 1,
                Outcome::Breakeven => summary.breakeven += 1,
            }
        }

        if summary.total_trades > 0 {
            let count = Decimal::from(summary.total_trades);
            summary.win_rate = ratio(Decimal::from(summary.wins), count);
            summary.total_pnl = Some(total_pnl);
            summary.average_pnl = ratio(total_pnl, count);
        }

        summary
    }

    pub fn has_data(&self) -> bool {
        self.total_trades > 0
    }

    /// True when the bucket holds enough trades to support a conclusion.
    pub fn is_significant(&self, min_trades: usize) -> bool {
        self.has_data() && self.total_trades >= min_trades
    }
}
