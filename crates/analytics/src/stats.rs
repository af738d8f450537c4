//! Small descriptive statistics over `Decimal` samples.
//!
//! Every function returns `None` instead of dividing by zero or overflowing
//! the 96-bit `Decimal` range.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum = checked_sum(values.iter().copied())?;
    sum.checked_div(Decimal::from(values.len()))
}

/// Population standard deviation (divides by `n`).
pub fn population_std_dev(values: &[Decimal]) -> Option<Decimal> {
    let mean = mean(values)?;
    let squares = values
        .iter()
        .map(|v| {
            let deviation = v.checked_sub(mean)?;
            deviation.checked_mul(deviation)
        })
        .collect::<Option<Vec<_>>>()?;
    let variance = checked_sum(squares)?.checked_div(Decimal::from(values.len()))?;
    variance.sqrt()
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, v| total.checked_add(v))
}

/// `q`-quantile of an ascending sample, interpolating linearly between the
/// order statistics at `q * (n - 1)`.
pub fn linear_percentile(sorted: &[Decimal], q: Decimal) -> Option<Decimal> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * Decimal::from(sorted.len() - 1);
    interpolate(sorted, position)
}

/// Empirical lower-tail quantile used by historical VaR.
///
/// The position is `tail * n`; its integer part selects the base order
/// statistic (clamped to the last one) and the fractional part interpolates
/// towards the next.
pub fn empirical_quantile(sorted: &[Decimal], tail: Decimal) -> Option<Decimal> {
    if sorted.is_empty() {
        return None;
    }
    let position = tail * Decimal::from(sorted.len());
    interpolate(sorted, position)
}

fn interpolate(sorted: &[Decimal], position: Decimal) -> Option<Decimal> {
    let last = sorted.len() - 1;
    let base = position.floor();
    let index = base.to_usize()?.min(last);
    let fraction = position - base;
    let next = (index + 1).min(last);
    let step = sorted[next].checked_sub(sorted[index])?.checked_mul(fraction)?;
    sorted[index].checked_add(step)
}

pub fn median(values: &[Decimal]) -> Option<Decimal> {
    let mut sorted = values.to_vec();
    sorted.sort();
    linear_percentile(&sorted, Decimal::new(5, 1))
}

/// `numerator / denominator`, or `None` when the denominator is zero or the
/// quotient does not fit.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    numerator.checked_div(denominator)
}

/// Finds the min and max values across a set of samples.
pub fn find_min_max(values: impl IntoIterator<Item = Decimal>) -> Option<(Decimal, Decimal)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

/// Min-max normalisation into `[0, 1]`. A degenerate range maps to 1.
pub fn normalize(value: Decimal, min: Decimal, max: Decimal) -> Decimal {
    if max == min {
        return Decimal::ONE;
    }
    (value - min) / (max - min)
}
