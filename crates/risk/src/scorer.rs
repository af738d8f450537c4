use crate::drawdown::DrawdownAnalysis;
use analytics::stats::ratio;
use analytics::{PerformanceReport, Timeline};
use configuration::ScoringWeights;
use core_types::{Outcome, Trade};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

/// Letter grade of a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: Decimal) -> Self {
        if score >= dec!(90) {
            Grade::A
        } else if score >= dec!(80) {
            Grade::B
        } else if score >= dec!(70) {
            Grade::C
        } else if score >= dec!(60) {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{letter}")
    }
}

/// Overall 0-100 rating of a trading history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceScore {
    pub overall_score: Decimal,
    pub grade: Grade,
    pub win_rate_score: Decimal,
    pub risk_management_score: Decimal,
    pub profit_factor_score: Decimal,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl PerformanceScore {
    /// Weighted mean of the three component scores, each clamped to 0-100.
    ///
    /// `None` when the weights sum to zero.
    pub fn calculate(
        performance: &PerformanceReport,
        drawdown: &DrawdownAnalysis,
        weights: &ScoringWeights,
    ) -> Option<Self> {
        let win_rate_score = win_rate_score(performance.win_rate.unwrap_or(Decimal::ZERO));
        let risk_management_score = risk_management_score(performance);
        let profit_factor_score = profit_factor_score(performance);

        let weighted = weights.win_rate * win_rate_score
            + weights.risk_management * risk_management_score
            + weights.profit_factor * profit_factor_score;
        let total_weight = weights.win_rate + weights.risk_management + weights.profit_factor;
        let overall_score = ratio(weighted, total_weight)?.round_dp(2);

        let (strengths, weaknesses) = insights(performance, drawdown);
        tracing::debug!(score = %overall_score, "Scored trading performance");

        Some(Self {
            overall_score,
            grade: Grade::from_score(overall_score),
            win_rate_score: win_rate_score.round_dp(2),
            risk_management_score: risk_management_score.round_dp(2),
            profit_factor_score: profit_factor_score.round_dp(2),
            strengths,
            weaknesses,
        })
    }
}

fn win_rate_score(win_rate: Decimal) -> Decimal {
    let score = if win_rate >= dec!(0.6) {
        dec!(90) + (win_rate - dec!(0.6)) * dec!(100)
    } else if win_rate >= dec!(0.5) {
        dec!(70) + (win_rate - dec!(0.5)) * dec!(200)
    } else if win_rate >= dec!(0.4) {
        dec!(50) + (win_rate - dec!(0.4)) * dec!(200)
    } else {
        dec!(30) + win_rate * dec!(50)
    };
    clamp_score(score)
}

/// Expectancy sets the base and the payoff ratio adds a bonus or a penalty.
/// A history without losses has an unbounded payoff ratio.
fn risk_management_score(performance: &PerformanceReport) -> Decimal {
    let expectancy = performance.expectancy.unwrap_or(Decimal::ZERO);
    let base = if expectancy > Decimal::ZERO {
        dec!(50) + (expectancy / Decimal::ONE_HUNDRED).min(Decimal::ONE) * dec!(50)
    } else if expectancy < Decimal::ZERO {
        (dec!(50) + expectancy * dec!(0.1)).max(dec!(10))
    } else {
        dec!(50)
    };

    let bonus = match performance.payoff_ratio {
        Some(rr) if rr >= dec!(2) => dec!(20),
        Some(rr) if rr >= dec!(1.5) => dec!(10),
        Some(rr) if rr >= Decimal::ONE => dec!(5),
        None if performance.winning_trades > 0 && performance.losing_trades == 0 => dec!(20),
        _ => dec!(-10),
    };
    clamp_score(base + bonus)
}

fn profit_factor_score(performance: &PerformanceReport) -> Decimal {
    let Some(pf) = performance.profit_factor else {
        return if performance.winning_trades > 0 { Decimal::ONE_HUNDRED } else { dec!(10) };
    };
    let score = if pf >= dec!(2) {
        dec!(90) + (pf.min(dec!(4)) - dec!(2)) * dec!(5)
    } else if pf >= dec!(1.5) {
        dec!(70) + (pf - dec!(1.5)) * dec!(40)
    } else if pf >= dec!(1.2) {
        dec!(50) + (pf - dec!(1.2)) / dec!(0.3) * dec!(20)
    } else {
        (pf * dec!(30)).max(dec!(10))
    };
    clamp_score(score)
}

fn insights(performance: &PerformanceReport, drawdown: &DrawdownAnalysis) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    match performance.win_rate {
        Some(wr) if wr >= dec!(0.6) => strengths.push("Excellent win rate (60% or more)".to_string()),
        Some(wr) if wr >= dec!(0.5) => strengths.push("Good win rate (50% or more)".to_string()),
        Some(wr) if wr >= dec!(0.4) => weaknesses.push("Win rate below 50%".to_string()),
        _ => weaknesses.push("Low win rate (under 40%)".to_string()),
    }

    match performance.profit_factor {
        Some(pf) if pf >= dec!(2) => strengths.push("Strong profit factor (2.0 or more)".to_string()),
        Some(pf) if pf >= dec!(1.5) => strengths.push("Decent profit factor".to_string()),
        Some(_) => weaknesses.push("Low profit factor (under 1.5)".to_string()),
        None if performance.winning_trades > 0 => strengths.push("No losing trades".to_string()),
        None => {}
    }

    match performance.expectancy {
        Some(e) if e > Decimal::ZERO => strengths.push("Positive expectancy".to_string()),
        Some(e) if e < Decimal::ZERO => weaknesses.push("Negative expectancy".to_string()),
        _ => {}
    }

    if let Some(rr) = performance.payoff_ratio {
        let rr_label = format!("{}:1", rr.round_dp(2));
        if rr >= dec!(2) {
            strengths.push(format!("Excellent reward to risk ({rr_label})"));
        } else if rr >= dec!(1.5) {
            strengths.push(format!("Good reward to risk ({rr_label})"));
        } else {
            weaknesses.push(format!("Reward to risk could improve ({rr_label})"));
        }
    }

    let dd = drawdown.max_drawdown_pct;
    if dd <= dec!(10) {
        strengths.push("Well-controlled drawdown".to_string());
    } else if dd <= dec!(20) {
        weaknesses.push("Moderate drawdown".to_string());
    } else {
        weaknesses.push(format!("High drawdown ({}%)", dd.round_dp(1)));
    }

    (strengths, weaknesses)
}

fn clamp_score(score: Decimal) -> Decimal {
    score.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

// ==============================================================================
// Trade Grading
// ==============================================================================

/// Score of one closed trade: profitability (up to 100), holding time (up
/// to 10) and realized R multiple (up to 15), capped at 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeGrade {
    pub ticket: u64,
    pub symbol: String,
    pub grade: Grade,
    pub score: Decimal,
    pub profitability: Decimal,
    pub duration: Decimal,
    pub risk_reward: Decimal,
}

/// Grades every trade of the timeline against its largest win and largest loss.
pub fn grade_trades(timeline: &Timeline) -> Vec<TradeGrade> {
    let trades = timeline.trades();
    let largest_win = trades.iter().map(|t| t.pnl).filter(|p| *p > Decimal::ZERO).max();
    let largest_loss = trades.iter().filter(|t| t.is_loss()).map(|t| t.pnl.abs()).max();
    trades
        .iter()
        .map(|t| {
            grade_trade(
                t,
                largest_win.unwrap_or(Decimal::ONE),
                largest_loss.unwrap_or(Decimal::ONE),
            )
        })
        .collect()
}

/// `largest_win` and `largest_loss` are positive magnitudes used to scale
/// the profitability component.
pub fn grade_trade(trade: &Trade, largest_win: Decimal, largest_loss: Decimal) -> TradeGrade {
    let hours = Decimal::from(trade.holding_period().num_seconds().max(0)) / dec!(3600);
    let (profitability, duration) = match trade.outcome() {
        Outcome::Win => {
            let share = ratio(trade.pnl, largest_win).unwrap_or(Decimal::ONE).min(Decimal::ONE);
            (share * dec!(70) + dec!(30), winning_hold_score(hours))
        }
        Outcome::Loss => {
            let share = ratio(trade.pnl.abs(), largest_loss).unwrap_or(Decimal::ONE).min(Decimal::ONE);
            (dec!(50) - share * dec!(50), losing_hold_score(hours))
        }
        Outcome::Breakeven => (dec!(50), losing_hold_score(hours)),
    };
    let risk_reward = match trade.r_multiple {
        Some(r) if r >= dec!(2) => dec!(15),
        Some(r) if r >= dec!(1.5) => dec!(10),
        Some(r) if r >= Decimal::ONE => dec!(5),
        _ => Decimal::ZERO,
    };

    let score = (profitability + duration + risk_reward).min(Decimal::ONE_HUNDRED).round_dp(2);
    TradeGrade {
        ticket: trade.ticket,
        symbol: trade.symbol.clone(),
        grade: Grade::from_score(score),
        score,
        profitability: profitability.round_dp(2),
        duration,
        risk_reward,
    }
}

/// Winners held one to eight hours score best.
fn winning_hold_score(hours: Decimal) -> Decimal {
    if hours >= Decimal::ONE && hours <= dec!(8) {
        dec!(10)
    } else if (hours >= dec!(0.5) && hours < Decimal::ONE) || (hours > dec!(8) && hours <= dec!(24)) {
        dec!(5)
    } else {
        Decimal::ZERO
    }
}

/// Losers cut quickly score best.
fn losing_hold_score(hours: Decimal) -> Decimal {
    if hours <= dec!(2) {
        dec!(5)
    } else if hours <= dec!(8) {
        dec!(2)
    } else {
        Decimal::ZERO
    }
}
