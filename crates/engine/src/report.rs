use analytics::{
    BucketSummary, OverlapSummary, PerformanceReport, RankedOverlap, SessionVolatility, Streak,
    TimeExtremes,
};
use analyzer::Recommendation;
use core_types::CoreError;
use patterns::{ConditionResult, EmotionalTradingSummary};
use risk::{DrawdownAnalysis, PerformanceScore, RiskBaseline, RiskMetrics, TradeGrade};
use serde::Serialize;

/// A trade record that was excluded from the analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataWarning {
    pub ticket: u64,
    pub reason: String,
}

impl From<&CoreError> for DataWarning {
    fn from(error: &CoreError) -> Self {
        Self {
            ticket: error.ticket(),
            reason: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakSummary {
    pub max_win_streak: usize,
    pub max_loss_streak: usize,
    /// The run the most recent trade belongs to.
    pub current: Option<Streak>,
}

/// Risk metrics of the whole history and of every bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub baseline: RiskBaseline,
    pub overall: RiskMetrics,
    pub by_day_of_week: Vec<RiskMetrics>,
    pub by_hour: Vec<RiskMetrics>,
    pub by_session: Vec<RiskMetrics>,
    pub by_overlap: Vec<RiskMetrics>,
}

/// The complete result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub records_received: usize,
    pub trades_analyzed: usize,
    pub warnings: Vec<DataWarning>,

    // I. Time Aggregation
    pub overall: BucketSummary,
    pub by_day_of_week: Vec<BucketSummary>,
    pub by_hour: Vec<BucketSummary>,
    pub by_month: Vec<BucketSummary>,
    /// Pre-market, market open, midday, afternoon and evening, by UTC entry hour.
    pub by_period: Vec<BucketSummary>,
    pub by_session: Vec<BucketSummary>,
    pub by_overlap: Vec<BucketSummary>,

    // II. Sessions
    pub session_overlaps: Vec<OverlapSummary>,
    pub best_overlap: Option<RankedOverlap>,
    pub session_volatility: Vec<SessionVolatility>,
    pub time_extremes: TimeExtremes,

    // III. Whole-History Performance
    /// `None` when no trade survived sanitizing.
    pub performance: Option<PerformanceReport>,
    pub streaks: StreakSummary,
    /// `None` when no trade survived sanitizing.
    pub drawdown: Option<DrawdownAnalysis>,
    /// `None` when no trade survived sanitizing.
    pub score: Option<PerformanceScore>,
    pub trade_grades: Vec<TradeGrade>,

    // IV. Risk
    pub risk: RiskReport,

    // V. Patterns
    pub winning_conditions: Vec<ConditionResult>,
    pub losing_conditions: Vec<ConditionResult>,
    pub emotional: EmotionalTradingSummary,

    // VI. Recommendations
    pub recommendations: Vec<Recommendation>,
}
