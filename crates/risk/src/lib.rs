//! # Tradelens Risk
//!
//! Time-aware risk metrics for any bucket of a trade timeline: annualised
//! Sharpe ratio, maximum drawdown, profit factor, historical Value-at-Risk,
//! average daily exposure and a composite 0-100 risk score measured against
//! the whole history. Also provides the drawdown-period analysis of the full
//! equity curve, an overall 0-100 performance score with an A-F grade and
//! per-trade grades.
//!
//! All metrics are pure functions of a bucket's trades. Undefined values are
//! `None`; nothing here divides by zero or returns an infinity.

pub mod analyzer;
pub mod drawdown;
pub mod error;
pub mod metrics;
pub mod score;
pub mod scorer;

pub use analyzer::{RiskMetrics, TimeRiskAnalyzer};
pub use drawdown::{DrawdownAnalysis, DrawdownPeriod};
pub use error::RiskError;
pub use metrics::Drawdown;
pub use score::{risk_score, RiskBaseline, ScoreInputs};
pub use scorer::{grade_trade, grade_trades, Grade, PerformanceScore, TradeGrade};
