use crate::finder::PatternFinder;
use analytics::stats::median;
use chrono::{Duration, NaiveDate};
use core_types::{Direction, Trade};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts and aggregate PnL of trades that look emotionally driven.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EmotionalTradingSummary {
    pub revenge_trades: usize,
    pub revenge_pnl: Decimal,
    pub fomo_trades: usize,
    pub fomo_pnl: Decimal,
    pub overtrading_days: usize,
    pub overtrading_trades: usize,
    pub overtrading_pnl: Decimal,
    pub median_daily_trades: Option<Decimal>,
}

impl PatternFinder<'_> {
    /// Flags revenge trades, FOMO entries and overtraded days.
    ///
    /// - Revenge: the most recently closed trade before this entry was a loss,
    ///   it closed no more than `revenge_window_minutes` earlier, and this
    ///   trade is at least as large.
    /// - FOMO: a trade without a setup, entered within `fomo_window_minutes`
    ///   after a same-symbol trade closed on a price move of at least
    ///   `fomo_min_move` in this trade's direction.
    /// - Overtrading: a UTC day with more than `overtrading_multiple` times
    ///   the median number of trades per trading day.
    pub fn detect_emotional_trading(&self) -> EmotionalTradingSummary {
        let trades = self.timeline().trades();
        let mut summary = EmotionalTradingSummary::default();

        for (index, trade) in trades.iter().enumerate() {
            if self.is_revenge(trades, index) {
                summary.revenge_trades += 1;
                summary.revenge_pnl += trade.pnl;
            }
            if self.is_fomo(trades, index) {
                summary.fomo_trades += 1;
                summary.fomo_pnl += trade.pnl;
            }
        }

        let mut per_day: BTreeMap<NaiveDate, (usize, Decimal)> = BTreeMap::new();
        for trade in trades {
            let day = per_day.entry(trade.entry_date()).or_default();
            day.0 += 1;
            day.1 += trade.pnl;
        }
        let counts: Vec<Decimal> = per_day.values().map(|(n, _)| Decimal::from(*n)).collect();
        summary.median_daily_trades = median(&counts);

        if let Some(median) = summary.median_daily_trades {
            let limit = median * self.rules.overtrading_multiple;
            for (count, pnl) in per_day.values().filter(|(n, _)| Decimal::from(*n) > limit) {
                summary.overtrading_days += 1;
                summary.overtrading_trades += count;
                summary.overtrading_pnl += pnl;
            }
        }

        if summary.revenge_trades + summary.fomo_trades + summary.overtrading_days > 0 {
            tracing::info!(
                revenge = summary.revenge_trades,
                fomo = summary.fomo_trades,
                overtrading_days = summary.overtrading_days,
                "Detected emotional trading"
            );
        }
        summary
    }

    fn is_revenge(&self, trades: &[Trade], index: usize) -> bool {
        let trade = &trades[index];
        let window = Duration::minutes(i64::from(self.rules.revenge_window_minutes));

        let Some(previous) = closed_before(trades, index).next() else {
            return false;
        };
        previous.is_loss()
            && trade.open_time - previous.close_time <= window
            && trade.size >= previous.size
    }

    fn is_fomo(&self, trades: &[Trade], index: usize) -> bool {
        let trade = &trades[index];
        if trade.has_setup() {
            return false;
        }
        let window = Duration::minutes(i64::from(self.rules.fomo_window_minutes));
        let min_move = self.rules.fomo_min_move;

        closed_before(trades, index)
            .take_while(|prior| trade.open_time - prior.close_time <= window)
            .filter(|prior| prior.symbol == trade.symbol)
            .filter_map(|prior| prior.price_move())
            .any(|moved| match trade.direction {
                Direction::Long => moved >= min_move,
                Direction::Short => -moved >= min_move,
            })
    }
}

/// Trades that closed at or before `trades[index]` opened, most recent first.
/// `trades` is in close-time order.
fn closed_before(trades: &[Trade], index: usize) -> impl Iterator<Item = &Trade> {
    let opened = trades[index].open_time;
    let end = trades.partition_point(|t| t.close_time <= opened);
    trades[..end]
        .iter()
        .enumerate()
        .rev()
        .filter(move |(i, _)| *i != index)
        .map(|(_, t)| t)
}
