//! The individual time-based risk metrics.
//!
//! Each function takes the PnL values (or trades) of one bucket in
//! chronological order and returns `None` when the metric is undefined.

use analytics::stats::{empirical_quantile, mean, population_std_dev, ratio};
use configuration::Granularity;
use core_types::Trade;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Peak-to-trough decline of an equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Drawdown {
    /// Absolute decline, never negative.
    pub amount: Decimal,
    /// Decline as a percentage of the peak it started from.
    pub pct: Decimal,
}

/// Annualised Sharpe ratio of per-trade PnL with a zero risk-free rate.
///
/// `mean / population stdev * sqrt(periods per year)`. `None` below two
/// trades or when every PnL is identical.
pub fn sharpe_ratio(pnls: &[Decimal], granularity: Granularity) -> Option<Decimal> {
    if pnls.len() < 2 {
        return None;
    }
    let std_dev = population_std_dev(pnls)?;
    let per_period = ratio(mean(pnls)?, std_dev)?;
    let annualisation = Decimal::from(granularity.periods_per_year()).sqrt()?;
    per_period.checked_mul(annualisation)
}

/// Equity after each trade, starting from `initial_balance`. Equity is
/// floored at zero.
pub fn equity_curve(pnls: &[Decimal], initial_balance: Decimal) -> Vec<Decimal> {
    pnls.iter()
        .scan(initial_balance, |equity, pnl| {
            *equity = (*equity + *pnl).max(Decimal::ZERO);
            Some(*equity)
        })
        .collect()
}

/// Largest peak-to-trough decline of the equity curve. `None` for an empty bucket.
pub fn max_drawdown(pnls: &[Decimal], initial_balance: Decimal) -> Option<Drawdown> {
    if pnls.is_empty() {
        return None;
    }

    let mut peak = initial_balance;
    let mut worst = Drawdown {
        amount: Decimal::ZERO,
        pct: Decimal::ZERO,
    };

    for equity in equity_curve(pnls, initial_balance) {
        if equity > peak {
            peak = equity;
        }
        let drawdown = peak - equity;
        if drawdown > worst.amount {
            worst.amount = drawdown;
            worst.pct = ratio(drawdown * Decimal::ONE_HUNDRED, peak).unwrap_or(Decimal::ZERO);
        }
    }

    Some(worst)
}

/// Gross winning PnL over the magnitude of gross losing PnL.
pub fn profit_factor(pnls: &[Decimal]) -> Option<Decimal> {
    let gross_profit: Decimal = pnls.iter().filter(|p| p.is_sign_positive()).sum();
    let gross_loss: Decimal = pnls.iter().filter(|p| **p < Decimal::ZERO).map(|p| p.abs()).sum();
    ratio(gross_profit, gross_loss)
}

/// Historical Value-at-Risk at `confidence`, as a non-negative loss magnitude.
///
/// `None` below two trades or when all PnL values are equal.
pub fn historical_var(pnls: &[Decimal], confidence: Decimal) -> Option<Decimal> {
    if pnls.len() < 2 {
        return None;
    }
    let mut sorted = pnls.to_vec();
    sorted.sort();
    if sorted.first() == sorted.last() {
        return None;
    }
    let quantile = empirical_quantile(&sorted, Decimal::ONE - confidence)?;
    Some((-quantile).max(Decimal::ZERO))
}

/// Mean over trading days (UTC entry date) of `sum(|pnl| * size)`.
pub fn average_daily_exposure<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Option<Decimal> {
    let mut per_day: BTreeMap<_, Decimal> = BTreeMap::new();
    for trade in trades {
        *per_day.entry(trade.entry_date()).or_default() += trade.pnl.abs() * trade.size;
    }
    let days: Vec<Decimal> = per_day.into_values().collect();
    mean(&days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.0001)
    }

    #[test]
    fn sharpe_is_annualised_by_granularity() {
        let pnls = [dec!(10), dec!(-5), dec!(20), dec!(-10)];
        // mean 3.75, population stdev 11.9242...
        let daily = sharpe_ratio(&pnls, Granularity::Daily).unwrap();
        let monthly = sharpe_ratio(&pnls, Granularity::Monthly).unwrap();
        assert!(close(daily, dec!(4.99230)), "{daily}");
        assert!(close(monthly, dec!(1.08941)), "{monthly}");
    }

    #[test]
    fn sharpe_is_undefined_for_flat_or_tiny_samples() {
        assert_eq!(sharpe_ratio(&[dec!(5)], Granularity::Daily), None);
        assert_eq!(sharpe_ratio(&[dec!(5), dec!(5)], Granularity::Daily), None);
    }

    #[test]
    fn sharpe_of_huge_pnls_is_undefined_instead_of_panicking() {
        let pnls = [dec!(-500000000000000), dec!(500000000000000)];
        assert_eq!(sharpe_ratio(&pnls, Granularity::Daily), None);
    }

    #[test]
    fn drawdown_tracks_peak_to_trough() {
        let pnls = [dec!(500), dec!(-300), dec!(-400), dec!(600), dec!(-100)];
        let dd = max_drawdown(&pnls, dec!(10000)).unwrap();
        assert_eq!(dd.amount, dec!(700));
        assert!(close(dd.pct, dec!(6.6667)), "{}", dd.pct);
    }

    #[test]
    fn drawdown_cannot_exceed_peak_equity() {
        let pnls = [dec!(-6000), dec!(-9000)];
        let dd = max_drawdown(&pnls, dec!(10000)).unwrap();
        assert_eq!(dd.amount, dec!(10000));
        assert_eq!(dd.pct, dec!(100));
        assert_eq!(equity_curve(&pnls, dec!(10000)), vec![dec!(4000), dec!(0)]);
    }

    #[test]
    fn drawdown_of_empty_bucket_is_none_and_of_winners_is_zero() {
        assert_eq!(max_drawdown(&[], dec!(10000)), None);
        assert_eq!(max_drawdown(&[dec!(5), dec!(5)], dec!(10000)).unwrap().amount, dec!(0));
    }

    #[test]
    fn profit_factor_needs_a_loss() {
        assert_eq!(profit_factor(&[dec!(300), dec!(-100), dec!(-50)]), Some(dec!(2)));
        assert_eq!(profit_factor(&[dec!(300), dec!(0)]), None);
    }

    #[test]
    fn var_interpolates_lower_tail() {
        // 20 trades: -100, -90, ..., 90. h = 0.05 * 20 = 1 -> second smallest.
        let pnls: Vec<Decimal> = (0..20).map(|i| Decimal::from(i * 10 - 100)).collect();
        assert_eq!(historical_var(&pnls, dec!(0.95)), Some(dec!(90)));

        // h = 0.05 * 10 = 0.5 -> halfway between the two smallest.
        let pnls: Vec<Decimal> = (0..10).map(|i| Decimal::from(i * 10 - 40)).collect();
        assert_eq!(historical_var(&pnls, dec!(0.95)), Some(dec!(35)));
    }

    #[test]
    fn var_is_zero_when_tail_is_profitable_and_none_when_flat() {
        assert_eq!(historical_var(&[dec!(10), dec!(20), dec!(30)], dec!(0.95)), Some(dec!(0)));
        assert_eq!(historical_var(&[dec!(10), dec!(10)], dec!(0.95)), None);
        assert_eq!(historical_var(&[dec!(-10)], dec!(0.95)), None);
    }
}
