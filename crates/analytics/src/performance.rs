use crate::stats::ratio;
use crate::timeline::Timeline;
use core_types::Trade;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Whole-history profitability statistics.
///
/// Every ratio that would divide by zero is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    // I. Core Profitability Metrics
    pub total_net_profit: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub profit_factor: Option<Decimal>, // None when there are no losing trades

    // II. Trade-Level Statistics
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub win_rate: Option<Decimal>,
    pub average_win: Option<Decimal>,
    pub average_loss: Option<Decimal>,
    pub payoff_ratio: Option<Decimal>,
    /// `win_rate * average_win - loss_rate * average_loss`.
    pub expectancy: Option<Decimal>,
    pub largest_win: Option<Decimal>,
    pub largest_loss: Option<Decimal>,

    // III. Time-Based Metrics
    pub trading_days: usize,
    pub profit_per_day: Option<Decimal>,
    #[serde(with = "humantime_serde")]
    pub average_holding_period: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub average_winning_hold: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub average_losing_hold: Option<Duration>,

    // IV. Breakdown
    pub pnl_by_symbol: BTreeMap<String, Decimal>,
}

impl PerformanceReport {
    /// Creates a report with every counter at zero, ready to be filled.
    pub fn new() -> Self {
        Self {
            total_net_profit: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            profit_factor: None,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            breakeven_trades: 0,
            win_rate: None,
            average_win: None,
            average_loss: None,
            payoff_ratio: None,
            expectancy: None,
            largest_win: None,
            largest_loss: None,
            trading_days: 0,
            profit_per_day: None,
            average_holding_period: None,
            average_winning_hold: None,
            average_losing_hold: None,
            pnl_by_symbol: BTreeMap::new(),
        }
    }

    /// `None` for an empty history, where no profit figure is meaningful.
    pub fn calculate(timeline: &Timeline) -> Option<Self> {
        let trades = timeline.trades();
        if trades.is_empty() {
            return None;
        }

        let mut report = Self::new();
        report.calculate_profitability(trades);
        report.calculate_time_metrics(trades);

        tracing::debug!(
            trades = report.total_trades,
            net = %report.total_net_profit,
            "Calculated performance overview"
        );
        Some(report)
    }

    fn calculate_profitability(&mut self, trades: &[Trade]) {
        self.total_trades = trades.len();

        for trade in trades {
            self.total_net_profit += trade.pnl;
            *self.pnl_by_symbol.entry(trade.symbol.clone()).or_default() += trade.pnl;

            if trade.is_win() {
                self.gross_profit += trade.pnl;
                self.winning_trades += 1;
                self.largest_win = Some(self.largest_win.map_or(trade.pnl, |w| w.max(trade.pnl)));
            } else if trade.is_loss() {
                self.gross_loss += trade.pnl.abs();
                self.losing_trades += 1;
                self.largest_loss = Some(self.largest_loss.map_or(trade.pnl, |l| l.min(trade.pnl)));
            } else {
                self.breakeven_trades += 1;
            }
        }

        let total = Decimal::from(self.total_trades);
        self.profit_factor = ratio(self.gross_profit, self.gross_loss);
        self.win_rate = ratio(Decimal::from(self.winning_trades), total);
        self.average_win = ratio(self.gross_profit, Decimal::from(self.winning_trades));
        self.average_loss = ratio(self.gross_loss, Decimal::from(self.losing_trades));
        self.payoff_ratio = self
            .average_win
            .zip(self.average_loss)
            .and_then(|(win, loss)| ratio(win, loss));

        let loss_rate = ratio(Decimal::from(self.losing_trades), total);
        self.expectancy = self.win_rate.zip(loss_rate).map(|(wr, lr)| {
            wr * self.average_win.unwrap_or(Decimal::ZERO)
                - lr * self.average_loss.unwrap_or(Decimal::ZERO)
        });
    }

    fn calculate_time_metrics(&mut self, trades: &[Trade]) {
        let days: BTreeSet<_> = trades.iter().map(|t| t.entry_date()).collect();
        self.trading_days = days.len();
        self.profit_per_day = ratio(self.total_net_profit, Decimal::from(self.trading_days));

        self.average_holding_period = average_hold(trades.iter());
        self.average_winning_hold = average_hold(trades.iter().filter(|t| t.is_win()));
        self.average_losing_hold = average_hold(trades.iter().filter(|t| t.is_loss()));
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}

fn average_hold<'a>(trades: impl Iterator<Item = &'a Trade>) -> Option<Duration> {
    let (count, total_secs) = trades.fold((0u64, 0u64), |(n, secs), t| {
        let held = t.holding_period().num_seconds().max(0) as u64;
        (n + 1, secs + held)
    });
    (count > 0).then(|| Duration::from_secs(total_secs / count))
}
