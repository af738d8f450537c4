//! # Tradelens Analysis Engine
//!
//! The orchestrator of one analysis call. It validates the configuration up
//! front, sanitizes the raw trade records, builds the chronological
//! `Timeline` and then wires the analytics, risk, pattern and recommendation
//! crates together into a single `AnalysisReport`.
//!
//! The engine holds no mutable state. Per-bucket risk metrics are computed in
//! parallel on the rayon pool; the result is identical to sequential
//! evaluation because every bucket is independent and rayon preserves the
//! bucket order on collect.

use analytics::{Bucket, SessionCalendar, TimeAggregator, Timeline};
use analyzer::{RecommendationSynthesizer, SynthesisInput};
use configuration::AnalysisConfig;
use core_types::{Outcome, Trade, TradeRecord};
use patterns::{Condition, PatternFinder};
use rayon::prelude::*;
use risk::{grade_trades, DrawdownAnalysis, PerformanceScore, RiskBaseline, RiskMetrics, TimeRiskAnalyzer};

pub mod error;
pub mod report;

pub use error::EngineError;
pub use report::{AnalysisReport, DataWarning, RiskReport, StreakSummary};

/// Runs the full trade analysis for a fixed configuration.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
    calendar: SessionCalendar,
    risk: TimeRiskAnalyzer,
    catalog: Option<Vec<Condition>>,
}

impl AnalysisEngine {
    /// Validates `config` and builds the session calendar. Any configuration
    /// problem is reported here, before a single trade is looked at.
    pub fn new(config: AnalysisConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let calendar = SessionCalendar::from_config(&config)?;
        let risk = TimeRiskAnalyzer::new(config.risk.clone())?;

        tracing::info!(
            sessions = calendar.sessions().len(),
            overlaps = calendar.overlaps().len(),
            "Analysis engine ready"
        );

        Ok(Self {
            config,
            calendar,
            risk,
            catalog: None,
        })
    }

    /// Replaces the standard condition catalog of the pattern finder.
    pub fn with_catalog(mut self, catalog: Vec<Condition>) -> Result<Self, EngineError> {
        for condition in &catalog {
            condition.validate(&self.calendar)?;
        }
        self.catalog = Some(catalog);
        Ok(self)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn calendar(&self) -> &SessionCalendar {
        &self.calendar
    }

    /// Splits raw records into valid trades and warnings for the rest.
    pub fn sanitize(records: &[TradeRecord]) -> (Vec<Trade>, Vec<DataWarning>) {
        let mut trades = Vec::with_capacity(records.len());
        let mut warnings = Vec::new();

        for record in records {
            match Trade::try_from(record.clone()) {
                Ok(trade) => trades.push(trade),
                Err(e) => {
                    tracing::warn!(ticket = e.ticket(), "Excluding trade record: {}", e);
                    warnings.push(DataWarning::from(&e));
                }
            }
        }

        (trades, warnings)
    }

    /// The main entry point: analyses `records` end to end.
    pub fn run(&self, records: &[TradeRecord]) -> Result<AnalysisReport, EngineError> {
        let (trades, warnings) = Self::sanitize(records);
        let timeline = Timeline::new(trades);
        tracing::info!(
            records = records.len(),
            trades = timeline.len(),
            excluded = warnings.len(),
            "Starting analysis"
        );

        // --- 1. Time Aggregation ---
        let aggregator = TimeAggregator::new(&timeline, &self.calendar, self.config.overlap_scoring);
        let overall = aggregator.overall();
        let by_day_of_week = aggregator.by_day_of_week();
        let by_hour = aggregator.by_hour();
        let by_month = aggregator.by_month();
        let by_period = aggregator.by_period();
        let by_session = aggregator.by_session();
        let by_overlap = aggregator.by_overlap();
        let session_overlaps = aggregator.get_session_overlaps();
        let best_overlap = aggregator.get_best_session_overlap(self.config.thresholds.overlap_min_trades);
        let session_volatility = aggregator.session_volatility();
        let time_extremes = aggregator.time_extremes(&self.config.thresholds);

        // --- 2. Whole-History Performance ---
        let performance = analytics::PerformanceReport::calculate(&timeline);
        let drawdown = DrawdownAnalysis::analyze(timeline.trades(), self.config.risk.initial_balance);
        let streaks = StreakSummary {
            max_win_streak: timeline.streaks().longest(Outcome::Win),
            max_loss_streak: timeline.streaks().longest(Outcome::Loss),
            current: timeline.streaks().current(),
        };
        let score = performance
            .as_ref()
            .zip(drawdown.as_ref())
            .and_then(|(p, d)| PerformanceScore::calculate(p, d, &self.config.scoring));
        let trade_grades = grade_trades(&timeline);

        // --- 3. Risk ---
        let risk = self.risk_report(&timeline, &aggregator);

        // --- 4. Patterns ---
        let finder = match &self.catalog {
            Some(catalog) => PatternFinder::with_catalog(&timeline, &self.calendar, &self.config, catalog.clone())?,
            None => PatternFinder::new(&timeline, &self.calendar, &self.config),
        };
        let winning_conditions = finder.find_winning_conditions();
        let losing_conditions = finder.find_losing_conditions();
        let emotional = finder.detect_emotional_trading();

        // --- 5. Recommendations ---
        let timing: Vec<_> = by_day_of_week
            .iter()
            .chain(&by_hour)
            .chain(&by_month)
            .cloned()
            .collect();
        let bucket_risk: Vec<RiskMetrics> = risk
            .by_day_of_week
            .iter()
            .chain(&risk.by_hour)
            .chain(&risk.by_session)
            .chain(&risk.by_overlap)
            .cloned()
            .collect();
        let input = SynthesisInput {
            overall: &overall,
            performance: performance.as_ref(),
            timing: &timing,
            sessions: &by_session,
            best_overlap: best_overlap.as_ref(),
            risk: &bucket_risk,
            winning_conditions: &winning_conditions,
            losing_conditions: &losing_conditions,
            emotional: &emotional,
        };
        let recommendations = RecommendationSynthesizer::new(self.config.thresholds.clone()).run(&input);

        tracing::info!(
            winning = winning_conditions.len(),
            losing = losing_conditions.len(),
            recommendations = recommendations.len(),
            "Analysis complete"
        );

        Ok(AnalysisReport {
            records_received: records.len(),
            trades_analyzed: timeline.len(),
            warnings,
            overall,
            by_day_of_week,
            by_hour,
            by_month,
            by_period,
            by_session,
            by_overlap,
            session_overlaps,
            best_overlap,
            session_volatility,
            time_extremes,
            performance,
            streaks,
            drawdown,
            score,
            trade_grades,
            risk,
            winning_conditions,
            losing_conditions,
            emotional,
            recommendations,
        })
    }

    fn risk_report(&self, timeline: &Timeline, aggregator: &TimeAggregator<'_>) -> RiskReport {
        let baseline: RiskBaseline = self.risk.baseline(timeline);
        let days = aggregator.day_of_week_buckets();
        let hours = aggregator.hour_buckets();
        let sessions = aggregator.session_buckets();
        let overlaps = aggregator.overlap_buckets();

        let all = timeline.all();
        let buckets: Vec<&Bucket> = std::iter::once(&all)
            .chain(&days)
            .chain(&hours)
            .chain(&sessions)
            .chain(&overlaps)
            .collect();

        let mut metrics: Vec<RiskMetrics> = buckets
            .par_iter()
            .map(|bucket| self.risk.analyze(timeline, bucket, &baseline))
            .collect();

        // Split back into groups, preserving order.
        let by_overlap = metrics.split_off(metrics.len() - overlaps.len());
        let by_session = metrics.split_off(metrics.len() - sessions.len());
        let by_hour = metrics.split_off(metrics.len() - hours.len());
        let by_day_of_week = metrics.split_off(metrics.len() - days.len());
        let overall = metrics
            .pop()
            .unwrap_or_else(|| self.risk.analyze(timeline, &all, &baseline));

        RiskReport {
            baseline,
            overall,
            by_day_of_week,
            by_hour,
            by_session,
            by_overlap,
        }
    }
}
