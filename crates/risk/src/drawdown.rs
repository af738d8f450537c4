use analytics::stats::{mean, ratio};
use chrono::{DateTime, Utc};
use core_types::Trade;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;

/// One peak-to-recovery excursion of the equity curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPeriod {
    /// Time of the peak the decline started from.
    pub started_at: DateTime<Utc>,
    /// First time equity rose above the peak again. `None` while still in drawdown.
    pub recovered_at: Option<DateTime<Utc>>,
    pub peak_equity: Decimal,
    pub trough_equity: Decimal,
    pub depth: Decimal,
    pub depth_pct: Decimal,
    /// Until recovery, or until the last trade for an open period.
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

/// Drawdown history of the whole equity curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownAnalysis {
    pub periods: Vec<DrawdownPeriod>,
    pub max_drawdown: Decimal,
    pub max_drawdown_pct: Decimal,
    pub current_drawdown: Decimal,
    pub current_drawdown_pct: Decimal,
    pub average_depth: Option<Decimal>,
    pub average_depth_pct: Option<Decimal>,
    #[serde(with = "humantime_serde")]
    pub longest_duration: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub average_recovery_time: Option<Duration>,
    pub in_drawdown: bool,
}

struct OpenPeriod {
    started_at: DateTime<Utc>,
    trough: Decimal,
}

impl DrawdownAnalysis {
    /// `trades` must be in chronological (close time) order. `None` for an
    /// empty history.
    pub fn analyze(trades: &[Trade], initial_balance: Decimal) -> Option<Self> {
        let first = trades.first()?;

        let mut peak = initial_balance;
        let mut peak_time = first.open_time;
        let mut equity = initial_balance;
        let mut open: Option<OpenPeriod> = None;
        let mut periods = Vec::new();

        for trade in trades {
            equity = (equity + trade.pnl).max(Decimal::ZERO);
            let time = trade.close_time;

            if equity > peak {
                if let Some(period) = open.take() {
                    periods.push(close_period(period, peak, Some(time), time));
                }
                peak = equity;
                peak_time = time;
            } else if equity < peak {
                match open.as_mut() {
                    Some(period) => period.trough = period.trough.min(equity),
                    None => {
                        open = Some(OpenPeriod {
                            started_at: peak_time,
                            trough: equity,
                        })
                    }
                }
            }
        }

        let last_time = trades.last().map_or(first.close_time, |t| t.close_time);
        if let Some(period) = open {
            periods.push(close_period(period, peak, None, last_time));
        }

        let current = peak - equity;
        let current_pct = pct_of(current, peak);
        Some(Self::flat(periods, current, current_pct))
    }

    fn flat(periods: Vec<DrawdownPeriod>, current: Decimal, current_pct: Decimal) -> Self {
        let deepest = periods.iter().max_by(|a, b| a.depth.cmp(&b.depth));
        let depths: Vec<Decimal> = periods.iter().map(|p| p.depth).collect();
        let depth_pcts: Vec<Decimal> = periods.iter().map(|p| p.depth_pct).collect();
        let recoveries: Vec<Duration> = periods
            .iter()
            .filter(|p| p.recovered_at.is_some())
            .map(|p| p.duration)
            .collect();
        let average_recovery_time = (!recoveries.is_empty())
            .then(|| recoveries.iter().sum::<Duration>() / recoveries.len() as u32);

        Self {
            max_drawdown: deepest.map_or(Decimal::ZERO, |p| p.depth),
            max_drawdown_pct: deepest.map_or(Decimal::ZERO, |p| p.depth_pct),
            current_drawdown: current,
            current_drawdown_pct: current_pct,
            average_depth: mean(&depths),
            average_depth_pct: mean(&depth_pcts),
            longest_duration: periods.iter().map(|p| p.duration).max(),
            average_recovery_time,
            in_drawdown: current > Decimal::ZERO,
            periods,
        }
    }
}

fn close_period(
    period: OpenPeriod,
    peak: Decimal,
    recovered_at: Option<DateTime<Utc>>,
    end: DateTime<Utc>,
) -> DrawdownPeriod {
    let depth = peak - period.trough;
    DrawdownPeriod {
        started_at: period.started_at,
        recovered_at,
        peak_equity: peak,
        trough_equity: period.trough,
        depth,
        depth_pct: pct_of(depth, peak),
        duration: (end - period.started_at).to_std().unwrap_or_default(),
    }
}

fn pct_of(amount: Decimal, peak: Decimal) -> Decimal {
    ratio(amount * Decimal::ONE_HUNDRED, peak).unwrap_or(Decimal::ZERO)
}
