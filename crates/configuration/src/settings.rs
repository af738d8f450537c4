use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The root configuration structure for one analysis run.
///
/// Every section falls back to its `Default` when omitted from the toml, so
/// an empty file is a valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Named trading sessions, in the order they should be reported.
    pub sessions: Vec<SessionDefinition>,
    /// Explicitly declared session combinations (e.g. `London_NY_Overlap`).
    pub named_overlaps: Vec<NamedOverlap>,
    pub thresholds: Thresholds,
    pub risk: RiskSettings,
    pub overlap_scoring: OverlapScoring,
    pub scoring: ScoringWeights,
    pub emotional: EmotionalTradingRules,
    pub conditions: ConditionCatalogSettings,
}

/// A named time-of-day window, in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionDefinition {
    pub name: String,
    pub windows: Vec<HourWindow>,
}

/// A half-open `[start_hour, end_hour)` range. When `start_hour > end_hour`
/// the window wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HourWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

/// A pre-declared combination of two or more sessions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedOverlap {
    pub name: String,
    pub sessions: Vec<String>,
}

/// Statistical-significance gates and deviation margins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum subset size for a bucket or condition to feed patterns and recommendations.
    pub min_trades_for_pattern: usize,
    /// Default `min_trades` for picking the best session overlap.
    pub overlap_min_trades: usize,
    /// How far (as a fraction, 0.10 = 10 points) a win rate must move away
    /// from the baseline before a condition is reported.
    pub pattern_win_rate_margin: Decimal,
    /// Risk score (0-100) at or above which a bucket is flagged.
    pub high_risk_score: Decimal,
    /// Minimum trades for an hour to be ranked as a peak or worst hour.
    pub peak_hour_min_trades: usize,
    /// How many peak and worst hours are reported.
    pub peak_hours_limit: usize,
    /// Minimum trades for a weekday or month to be named best or worst.
    pub extreme_min_trades: usize,
}

/// The sampling granularity the PnL series represents. Drives the Sharpe
/// annualisation factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Granularity {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// Trading periods per year, using the 252 trading days convention.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Granularity::Hourly => 252 * 24,
            Granularity::Daily => 252,
            Granularity::Weekly => 52,
            Granularity::Monthly => 12,
        }
    }
}

/// Contains parameters for the time-based risk metrics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Confidence level for historical VaR (e.g., 0.95 for 95%).
    pub var_confidence: Decimal,
    pub granularity: Granularity,
    /// Starting equity of the drawdown curve.
    pub initial_balance: Decimal,
    pub weights: RiskWeights,
}

/// Weights of the composite risk score. They do not need to sum to one;
/// the score divides by the sum of the weights that were applicable.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub sharpe: Decimal,
    pub drawdown: Decimal,
    pub var: Decimal,
    pub streak: Decimal,
}

/// Weights of the composite score used to rank session overlaps.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct OverlapScoring {
    pub win_rate_weight: Decimal,
    pub avg_pnl_weight: Decimal,
}

/// Weights of the overall performance score (0-100).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub win_rate: Decimal,
    pub risk_management: Decimal,
    pub profit_factor: Decimal,
}

/// Detection windows for revenge trading, FOMO and overtrading.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmotionalTradingRules {
    pub revenge_window_minutes: u32,
    pub fomo_window_minutes: u32,
    /// Minimum relative price move (0.01 = 1%) that counts as a chase-worthy move.
    pub fomo_min_move: Decimal,
    /// A day is overtraded when its trade count exceeds this multiple of the median.
    pub overtrading_multiple: Decimal,
}

/// Parameters used to build the pattern finder's condition catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConditionCatalogSettings {
    pub streak_lengths: Vec<usize>,
    pub r_multiple_thresholds: Vec<Decimal>,
    pub long_hold_minutes: u32,
}

// --- Default Implementations ---
// This allows a user to omit any section from their toml
// and still have it work with sensible defaults.

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sessions: vec![
                SessionDefinition::new("Sydney", 21, 6),
                SessionDefinition::new("Tokyo", 0, 9),
                SessionDefinition::new("London", 7, 16),
                SessionDefinition::new("New_York", 12, 21),
            ],
            named_overlaps: vec![NamedOverlap {
                name: "London_NY_Overlap".to_string(),
                sessions: vec!["London".to_string(), "New_York".to_string()],
            }],
            thresholds: Thresholds::default(),
            risk: RiskSettings::default(),
            overlap_scoring: OverlapScoring::default(),
            scoring: ScoringWeights::default(),
            emotional: EmotionalTradingRules::default(),
            conditions: ConditionCatalogSettings::default(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_trades_for_pattern: 20,
            overlap_min_trades: 20,
            pattern_win_rate_margin: dec!(0.10),
            high_risk_score: dec!(70),
            peak_hour_min_trades: 3,
            peak_hours_limit: 5,
            extreme_min_trades: 5,
        }
    }
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            var_confidence: dec!(0.95),
            granularity: Granularity::Daily,
            initial_balance: dec!(10000),
            weights: RiskWeights::default(),
        }
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            sharpe: dec!(0.3),
            drawdown: dec!(0.3),
            var: dec!(0.2),
            streak: dec!(0.2),
        }
    }
}

impl Default for OverlapScoring {
    fn default() -> Self {
        Self {
            win_rate_weight: dec!(0.5),
            avg_pnl_weight: dec!(0.5),
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            win_rate: dec!(0.4),
            risk_management: dec!(0.3),
            profit_factor: dec!(0.3),
        }
    }
}

impl Default for EmotionalTradingRules {
    fn default() -> Self {
        Self {
            revenge_window_minutes: 10,
            fomo_window_minutes: 15,
            fomo_min_move: dec!(0.01),
            overtrading_multiple: dec!(2),
        }
    }
}

impl Default for ConditionCatalogSettings {
    fn default() -> Self {
        Self {
            streak_lengths: vec![2, 3],
            r_multiple_thresholds: vec![dec!(1), dec!(2)],
            long_hold_minutes: 240,
        }
    }
}

impl SessionDefinition {
    /// A session made of a single window.
    pub fn new(name: &str, start_hour: u32, end_hour: u32) -> Self {
        Self {
            name: name.to_string(),
            windows: vec![HourWindow {
                start_hour,
                end_hour,
            }],
        }
    }
}

// --- Validation ---

impl AnalysisConfig {
    /// Rejects configurations that would make the analysis meaningless.
    ///
    /// Nothing is clamped or replaced: the first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_sessions()?;
        self.validate_named_overlaps()?;
        self.thresholds.validate()?;
        self.risk.validate()?;
        self.overlap_scoring.validate()?;
        self.scoring.validate()?;
        self.emotional.validate()?;
        self.conditions.validate()?;
        Ok(())
    }

    fn validate_sessions(&self) -> Result<(), ConfigError> {
        if self.sessions.is_empty() {
            return invalid("at least one session must be defined");
        }
        let mut seen = HashSet::new();
        for session in &self.sessions {
            if session.name.trim().is_empty() {
                return invalid("session names cannot be empty");
            }
            if !seen.insert(session.name.as_str()) {
                return invalid(format!("session '{}' is defined twice", session.name));
            }
            if session.windows.is_empty() {
                return invalid(format!("session '{}' has no windows", session.name));
            }
            for window in &session.windows {
                window.validate(&session.name)?;
            }
        }
        Ok(())
    }

    fn validate_named_overlaps(&self) -> Result<(), ConfigError> {
        let session_names: HashSet<&str> = self.sessions.iter().map(|s| s.name.as_str()).collect();
        let mut seen = HashSet::new();
        for overlap in &self.named_overlaps {
            if overlap.name.trim().is_empty() {
                return invalid("named overlaps need a name");
            }
            if session_names.contains(overlap.name.as_str()) {
                return invalid(format!(
                    "overlap '{}' reuses the name of a session",
                    overlap.name
                ));
            }
            if !seen.insert(overlap.name.as_str()) {
                return invalid(format!("overlap '{}' is declared twice", overlap.name));
            }
            let members: HashSet<&str> = overlap.sessions.iter().map(String::as_str).collect();
            if members.len() < 2 || members.len() != overlap.sessions.len() {
                return invalid(format!(
                    "overlap '{}' must combine at least two distinct sessions",
                    overlap.name
                ));
            }
            if let Some(unknown) = members.iter().find(|m| !session_names.contains(*m)) {
                return invalid(format!(
                    "overlap '{}' refers to unknown session '{}'",
                    overlap.name, unknown
                ));
            }
        }
        Ok(())
    }
}

impl HourWindow {
    fn validate(&self, session: &str) -> Result<(), ConfigError> {
        if self.start_hour > 23 || self.end_hour > 24 {
            return invalid(format!(
                "session '{}' has a window outside 0-24h ({}-{})",
                session, self.start_hour, self.end_hour
            ));
        }
        if self.start_hour == self.end_hour {
            return invalid(format!(
                "session '{}' has an empty window starting and ending at {}h",
                session, self.start_hour
            ));
        }
        Ok(())
    }
}

impl Thresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        let minimums = [
            self.min_trades_for_pattern,
            self.overlap_min_trades,
            self.peak_hour_min_trades,
            self.extreme_min_trades,
        ];
        if minimums.contains(&0) {
            return invalid("minimum trade thresholds must be at least 1");
        }
        if !in_range(self.pattern_win_rate_margin, Decimal::ZERO, Decimal::ONE) {
            return invalid("pattern_win_rate_margin must be between 0 and 1");
        }
        if !in_range(self.high_risk_score, Decimal::ZERO, dec!(100)) {
            return invalid("high_risk_score must be between 0 and 100");
        }
        if self.peak_hours_limit == 0 {
            return invalid("peak_hours_limit must be at least 1");
        }
        Ok(())
    }
}

impl RiskSettings {
    /// Checks the VaR confidence, the starting balance and the score weights.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.var_confidence <= Decimal::ZERO || self.var_confidence >= Decimal::ONE {
            return invalid("var_confidence must be strictly between 0 and 1");
        }
        if self.initial_balance <= Decimal::ZERO {
            return invalid("initial_balance must be greater than 0");
        }
        let w = &self.weights;
        validate_weights("risk.weights", &[w.sharpe, w.drawdown, w.var, w.streak])
    }
}

impl OverlapScoring {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_weights(
            "overlap_scoring",
            &[self.win_rate_weight, self.avg_pnl_weight],
        )
    }
}

impl ScoringWeights {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_weights(
            "scoring",
            &[self.win_rate, self.risk_management, self.profit_factor],
        )
    }
}

impl EmotionalTradingRules {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.revenge_window_minutes == 0 || self.fomo_window_minutes == 0 {
            return invalid("revenge and FOMO windows must be at least one minute");
        }
        if self.fomo_min_move <= Decimal::ZERO {
            return invalid("fomo_min_move must be greater than 0");
        }
        if self.overtrading_multiple <= Decimal::ZERO {
            return invalid("overtrading_multiple must be greater than 0");
        }
        Ok(())
    }
}

impl ConditionCatalogSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.streak_lengths.contains(&0) {
            return invalid("streak lengths must be at least 1");
        }
        if self.long_hold_minutes == 0 {
            return invalid("long_hold_minutes must be at least 1");
        }
        Ok(())
    }
}

fn validate_weights(section: &str, weights: &[Decimal]) -> Result<(), ConfigError> {
    if weights.iter().any(|w| *w < Decimal::ZERO) {
        return invalid(format!("{} cannot contain negative weights", section));
    }
    if weights.iter().sum::<Decimal>() <= Decimal::ZERO {
        return invalid(format!("{} weights cannot all be zero", section));
    }
    Ok(())
}

fn in_range(value: Decimal, min: Decimal, max: Decimal) -> bool {
    value >= min && value <= max
}

fn invalid<T>(message: impl Into<String>) -> Result<T, ConfigError> {
    Err(ConfigError::ValidationError(message.into()))
}
