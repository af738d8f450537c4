use crate::error::RiskError;
use crate::metrics::{average_daily_exposure, historical_var, max_drawdown, profit_factor, sharpe_ratio};
use crate::score::{risk_score, RiskBaseline, ScoreInputs};
use analytics::{Bucket, BucketKey, Timeline};
use configuration::{ConfigError, RiskSettings};
use core_types::Outcome;
use rust_decimal::Decimal;
use serde::Serialize;

/// The complete risk profile of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub bucket: BucketKey,
    pub total_trades: usize,
    pub total_pnl: Option<Decimal>,
    pub sharpe_ratio: Option<Decimal>,
    pub max_drawdown: Option<Decimal>,
    pub max_drawdown_pct: Option<Decimal>,
    pub profit_factor: Option<Decimal>,
    /// Historical VaR as a positive loss magnitude.
    pub value_at_risk: Option<Decimal>,
    pub average_daily_exposure: Option<Decimal>,
    pub max_loss_streak: usize,
    /// 0 (safest) to 100 (riskiest), relative to the whole history.
    pub risk_score: Option<Decimal>,
}

/// Computes time-based risk metrics for buckets of a timeline.
///
/// The analyzer is stateless apart from its settings. It can be shared across
/// threads and evaluated per bucket in any order.
#[derive(Debug, Clone)]
pub struct TimeRiskAnalyzer {
    settings: RiskSettings,
}

impl TimeRiskAnalyzer {
    /// Creates a new `TimeRiskAnalyzer` with the given configuration parameters.
    pub fn new(settings: RiskSettings) -> Result<Self, RiskError> {
        settings.validate().map_err(|e| match e {
            ConfigError::ValidationError(reason) => RiskError::InvalidParameters(reason),
            other => RiskError::InvalidParameters(other.to_string()),
        })?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &RiskSettings {
        &self.settings
    }

    /// Full-history reference values for the risk score.
    pub fn baseline(&self, timeline: &Timeline) -> RiskBaseline {
        let pnls = timeline.pnls(&timeline.all());
        RiskBaseline {
            sharpe_ratio: sharpe_ratio(&pnls, self.settings.granularity),
            max_drawdown_pct: max_drawdown(&pnls, self.settings.initial_balance).map(|d| d.pct),
            value_at_risk: historical_var(&pnls, self.settings.var_confidence),
            max_loss_streak: timeline.streaks().longest(Outcome::Loss),
        }
    }

    pub fn analyze(&self, timeline: &Timeline, bucket: &Bucket, baseline: &RiskBaseline) -> RiskMetrics {
        let pnls = timeline.pnls(bucket);
        let drawdown = max_drawdown(&pnls, self.settings.initial_balance);

        let mut metrics = RiskMetrics {
            bucket: bucket.key.clone(),
            total_trades: bucket.len(),
            total_pnl: (!pnls.is_empty()).then(|| pnls.iter().sum()),
            sharpe_ratio: sharpe_ratio(&pnls, self.settings.granularity),
            max_drawdown: drawdown.map(|d| d.amount),
            max_drawdown_pct: drawdown.map(|d| d.pct),
            profit_factor: profit_factor(&pnls),
            value_at_risk: historical_var(&pnls, self.settings.var_confidence),
            average_daily_exposure: average_daily_exposure(timeline.members(bucket)),
            max_loss_streak: timeline.streaks().longest_within(&bucket.members, Outcome::Loss),
            risk_score: None,
        };

        if !bucket.is_empty() {
            let inputs = ScoreInputs {
                sharpe_ratio: metrics.sharpe_ratio,
                max_drawdown_pct: metrics.max_drawdown_pct,
                value_at_risk: metrics.value_at_risk,
                max_loss_streak: metrics.max_loss_streak,
            };
            metrics.risk_score = risk_score(&inputs, baseline, &self.settings.weights);
        }

        tracing::debug!(
            bucket = %metrics.bucket,
            trades = metrics.total_trades,
            score = ?metrics.risk_score,
            "Computed bucket risk metrics"
        );
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use core_types::{Direction, Trade};
    use rust_decimal_macros::dec;

    fn timeline(pnls: &[Decimal]) -> Timeline {
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
        let trades = pnls
            .iter()
            .enumerate()
            .map(|(i, pnl)| Trade {
                ticket: i as u64 + 1,
                symbol: "EURUSD".to_string(),
                direction: Direction::Long,
                open_time: start + Duration::hours(i as i64),
                close_time: start + Duration::hours(i as i64) + Duration::minutes(20),
                pnl: *pnl,
                size: dec!(2),
                r_multiple: None,
                entry_price: None,
                exit_price: None,
                setup: None,
            })
            .collect();
        Timeline::new(trades)
    }

    #[test]
    fn invalid_confidence_is_rejected() {
        let mut settings = RiskSettings::default();
        settings.var_confidence = dec!(1);
        assert!(TimeRiskAnalyzer::new(settings).is_err());
    }

    #[test]
    fn settings_errors_carry_the_configuration_reason() {
        let mut settings = RiskSettings::default();
        settings.initial_balance = dec!(0);
        assert_eq!(
            TimeRiskAnalyzer::new(settings).unwrap_err(),
            RiskError::InvalidParameters("initial_balance must be greater than 0".to_string())
        );

        let mut settings = RiskSettings::default();
        settings.weights.var = dec!(-0.1);
        assert!(matches!(
            TimeRiskAnalyzer::new(settings),
            Err(RiskError::InvalidParameters(_))
        ));
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let mut settings = RiskSettings::default();
        settings.weights.sharpe = dec!(0);
        settings.weights.drawdown = dec!(0);
        settings.weights.var = dec!(0);
        settings.weights.streak = dec!(0);
        assert!(TimeRiskAnalyzer::new(settings).is_err());
    }

    #[test]
    fn whole_history_scores_fifty_against_itself() {
        let timeline = timeline(&[dec!(100), dec!(-40), dec!(-60), dec!(80), dec!(-20), dec!(72)]);
        let analyzer = TimeRiskAnalyzer::new(RiskSettings::default()).unwrap();
        let baseline = analyzer.baseline(&timeline);

        let metrics = analyzer.analyze(&timeline, &timeline.all(), &baseline);
        assert_eq!(metrics.risk_score, Some(dec!(50)));
        assert_eq!(metrics.max_loss_streak, 2);
        assert_eq!(metrics.max_drawdown, Some(dec!(100)));
        assert_eq!(metrics.profit_factor, Some(dec!(2.1)));
        // All six trades fall on the same day: (100+40+60+80+20+72) * 2.
        assert_eq!(metrics.average_daily_exposure, Some(dec!(744)));
    }

    #[test]
    fn empty_bucket_has_no_metrics() {
        let timeline = timeline(&[dec!(10), dec!(-10)]);
        let analyzer = TimeRiskAnalyzer::new(RiskSettings::default()).unwrap();
        let baseline = analyzer.baseline(&timeline);
        let empty = Bucket::new(BucketKey::Hour(23));

        let metrics = analyzer.analyze(&timeline, &empty, &baseline);
        assert_eq!(metrics.total_trades, 0);
        assert_eq!(metrics.total_pnl, None);
        assert_eq!(metrics.sharpe_ratio, None);
        assert_eq!(metrics.max_drawdown, None);
        assert_eq!(metrics.value_at_risk, None);
        assert_eq!(metrics.average_daily_exposure, None);
        assert_eq!(metrics.risk_score, None);
    }

    #[test]
    fn identical_pnl_bucket_has_no_sharpe_or_var() {
        let timeline = timeline(&[dec!(25), dec!(25), dec!(25)]);
        let analyzer = TimeRiskAnalyzer::new(RiskSettings::default()).unwrap();
        let baseline = analyzer.baseline(&timeline);

        let metrics = analyzer.analyze(&timeline, &timeline.all(), &baseline);
        assert_eq!(metrics.sharpe_ratio, None);
        assert_eq!(metrics.value_at_risk, None);
        assert_eq!(metrics.profit_factor, None);
        assert_eq!(metrics.max_drawdown, Some(dec!(0)));
    }
}
