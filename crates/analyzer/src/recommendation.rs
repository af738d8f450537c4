use analytics::BucketKey;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Recommendation families. The declaration order is the tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Risk,
    Pattern,
    Timing,
    Session,
}

/// What the trader is advised to do, and about what.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum RecommendationKind {
    /// Trade smaller in a bucket whose risk score is high.
    ReduceExposure { bucket: BucketKey },
    /// Stop taking trades under a condition with a poor win rate.
    AvoidCondition { condition: String },
    /// Lean into a condition with a strong win rate.
    FavorCondition { condition: String },
    StopRevengeTrading,
    AvoidFomoEntries,
    LimitDailyTrades,
    AvoidTimeSlot { bucket: BucketKey },
    FocusTimeSlot { bucket: BucketKey },
    AvoidSession { session: String },
    FocusSession { session: String },
    FocusOverlap { overlap: String },
}

impl RecommendationKind {
    pub fn category(&self) -> Category {
        match self {
            RecommendationKind::ReduceExposure { .. } => Category::Risk,
            RecommendationKind::AvoidCondition { .. }
            | RecommendationKind::FavorCondition { .. }
            | RecommendationKind::StopRevengeTrading
            | RecommendationKind::AvoidFomoEntries
            | RecommendationKind::LimitDailyTrades => Category::Pattern,
            RecommendationKind::AvoidTimeSlot { .. } | RecommendationKind::FocusTimeSlot { .. } => {
                Category::Timing
            }
            RecommendationKind::AvoidSession { .. }
            | RecommendationKind::FocusSession { .. }
            | RecommendationKind::FocusOverlap { .. } => Category::Session,
        }
    }

    /// The bucket, condition or behaviour the recommendation is about.
    pub fn subject(&self) -> String {
        match self {
            RecommendationKind::ReduceExposure { bucket }
            | RecommendationKind::AvoidTimeSlot { bucket }
            | RecommendationKind::FocusTimeSlot { bucket } => bucket.to_string(),
            RecommendationKind::AvoidCondition { condition }
            | RecommendationKind::FavorCondition { condition } => condition.clone(),
            RecommendationKind::StopRevengeTrading => "revenge trading".to_string(),
            RecommendationKind::AvoidFomoEntries => "FOMO entries".to_string(),
            RecommendationKind::LimitDailyTrades => "overtrading".to_string(),
            RecommendationKind::AvoidSession { session } | RecommendationKind::FocusSession { session } => {
                session.clone()
            }
            RecommendationKind::FocusOverlap { overlap } => overlap.clone(),
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = self.subject();
        match self {
            RecommendationKind::ReduceExposure { .. } => write!(f, "Reduce exposure: {subject}"),
            RecommendationKind::AvoidCondition { .. } => write!(f, "Avoid trading {subject}"),
            RecommendationKind::FavorCondition { .. } => write!(f, "Favor trades {subject}"),
            RecommendationKind::StopRevengeTrading => write!(f, "Stop revenge trading"),
            RecommendationKind::AvoidFomoEntries => write!(f, "Avoid FOMO entries"),
            RecommendationKind::LimitDailyTrades => write!(f, "Limit daily trade count"),
            RecommendationKind::AvoidTimeSlot { .. } => write!(f, "Avoid {subject}"),
            RecommendationKind::FocusTimeSlot { .. } => write!(f, "Focus on {subject}"),
            RecommendationKind::AvoidSession { .. } => write!(f, "Avoid the {subject} session"),
            RecommendationKind::FocusSession { .. } => write!(f, "Focus on the {subject} session"),
            RecommendationKind::FocusOverlap { .. } => write!(f, "Focus on the {subject} overlap"),
        }
    }
}

/// One structured, ranked piece of advice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub category: Category,
    pub kind: RecommendationKind,
    pub subject: String,
    /// How bad (or how good) the underlying finding is, 0 to 1.
    pub severity: Decimal,
    /// How much data backs the finding, 0 to 1.
    pub confidence: Decimal,
    /// PnL that following the advice would have changed over the analysed history.
    pub estimated_pnl_impact: Decimal,
    pub evidence: BTreeMap<&'static str, Decimal>,
}

impl Recommendation {
    pub fn new(
        kind: RecommendationKind,
        severity: Decimal,
        confidence: Decimal,
        estimated_pnl_impact: Decimal,
    ) -> Self {
        Self {
            category: kind.category(),
            subject: kind.subject(),
            kind,
            severity: clamp_unit(severity),
            confidence: clamp_unit(confidence),
            estimated_pnl_impact,
            evidence: BTreeMap::new(),
        }
    }

    pub fn with_evidence(mut self, name: &'static str, value: Option<Decimal>) -> Self {
        if let Some(value) = value {
            self.evidence.insert(name, value);
        }
        self
    }
}

fn clamp_unit(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::ONE)
}
