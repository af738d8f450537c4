use crate::recommendation::{Recommendation, RecommendationKind};
use analytics::{BucketKey, BucketSummary, PerformanceReport, RankedOverlap};
use configuration::Thresholds;
use patterns::{ConditionResult, EmotionalTradingSummary};
use risk::RiskMetrics;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Everything the synthesizer reads. All of it comes from one analysis call.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    pub overall: &'a BucketSummary,
    /// `None` for an empty history.
    pub performance: Option<&'a PerformanceReport>,
    /// Day-of-week, hour and month summaries.
    pub timing: &'a [BucketSummary],
    pub sessions: &'a [BucketSummary],
    pub best_overlap: Option<&'a RankedOverlap>,
    pub risk: &'a [RiskMetrics],
    pub winning_conditions: &'a [ConditionResult],
    pub losing_conditions: &'a [ConditionResult],
    pub emotional: &'a EmotionalTradingSummary,
}

/// Turns bucket summaries, risk metrics and patterns into ranked advice.
#[derive(Debug, Clone)]
pub struct RecommendationSynthesizer {
    thresholds: Thresholds,
}

impl RecommendationSynthesizer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Collects, scores and ranks every recommendation.
    ///
    /// Ranking: largest absolute PnL impact first, then category priority
    /// (risk, pattern, timing, session), then subject.
    pub fn run(&self, input: &SynthesisInput<'_>) -> Vec<Recommendation> {
        // 1. Collect
        let mut recommendations = Vec::new();
        recommendations.extend(self.risk_recommendations(input));
        recommendations.extend(self.pattern_recommendations(input));
        recommendations.extend(self.emotional_recommendations(input));
        recommendations.extend(self.timing_recommendations(input));
        recommendations.extend(self.session_recommendations(input));

        // 2. Rank
        recommendations.sort_by(|a, b| {
            b.estimated_pnl_impact
                .abs()
                .cmp(&a.estimated_pnl_impact.abs())
                .then(a.category.cmp(&b.category))
                .then_with(|| a.subject.cmp(&b.subject))
        });

        tracing::info!(count = recommendations.len(), "Synthesized recommendations");
        recommendations
    }

    fn risk_recommendations(&self, input: &SynthesisInput<'_>) -> Vec<Recommendation> {
        input
            .risk
            .iter()
            .filter(|m| m.bucket != BucketKey::All && self.is_significant(m.total_trades))
            .filter_map(|m| {
                let score = m.risk_score?;
                if score < self.thresholds.high_risk_score {
                    return None;
                }
                // Halving position size halves the bucket's PnL.
                let impact = -m.total_pnl.unwrap_or(Decimal::ZERO) / dec!(2);
                Some(
                    Recommendation::new(
                        RecommendationKind::ReduceExposure {
                            bucket: m.bucket.clone(),
                        },
                        score / Decimal::ONE_HUNDRED,
                        self.confidence(m.total_trades),
                        impact,
                    )
                    .with_evidence("risk_score", Some(score))
                    .with_evidence("max_drawdown", m.max_drawdown)
                    .with_evidence("value_at_risk", m.value_at_risk)
                    .with_evidence("sharpe_ratio", m.sharpe_ratio)
                    .with_evidence("trades", Some(Decimal::from(m.total_trades))),
                )
            })
            .collect()
    }

    fn pattern_recommendations(&self, input: &SynthesisInput<'_>) -> Vec<Recommendation> {
        let losing = input.losing_conditions.iter().map(|c| {
            let kind = RecommendationKind::AvoidCondition {
                condition: c.label.clone(),
            };
            (kind, c, -c.total_pnl)
        });
        let winning = input.winning_conditions.iter().map(|c| {
            let kind = RecommendationKind::FavorCondition {
                condition: c.label.clone(),
            };
            let excess = excess_pnl(c.average_pnl, input.overall.average_pnl, c.total_trades);
            (kind, c, excess)
        });

        losing
            .chain(winning)
            .filter(|(_, c, _)| !c.condition.is_time_slot() && self.is_significant(c.total_trades))
            .map(|(kind, c, impact)| {
                Recommendation::new(
                    kind,
                    deviation_severity(c.deviation),
                    self.confidence(c.total_trades),
                    impact,
                )
                .with_evidence("win_rate", c.win_rate)
                .with_evidence("baseline_win_rate", c.baseline_win_rate)
                .with_evidence("total_pnl", Some(c.total_pnl))
                .with_evidence("trades", Some(Decimal::from(c.total_trades)))
            })
            .collect()
    }

    fn emotional_recommendations(&self, input: &SynthesisInput<'_>) -> Vec<Recommendation> {
        let emotional = input.emotional;
        let groups = [
            (
                RecommendationKind::StopRevengeTrading,
                emotional.revenge_trades,
                emotional.revenge_pnl,
            ),
            (
                RecommendationKind::AvoidFomoEntries,
                emotional.fomo_trades,
                emotional.fomo_pnl,
            ),
            (
                RecommendationKind::LimitDailyTrades,
                emotional.overtrading_trades,
                emotional.overtrading_pnl,
            ),
        ];

        groups
            .into_iter()
            .filter(|(_, count, pnl)| *count > 0 && *pnl < Decimal::ZERO)
            .map(|(kind, count, pnl)| {
                // Share of all losses that the behaviour accounts for.
                let gross_loss = input.performance.map_or(Decimal::ZERO, |p| p.gross_loss);
                let severity = ratio_or_one(pnl.abs(), gross_loss);
                Recommendation::new(kind, severity, self.confidence(count), -pnl)
                    .with_evidence("trades", Some(Decimal::from(count)))
                    .with_evidence("total_pnl", Some(pnl))
                    .with_evidence("median_daily_trades", emotional.median_daily_trades)
            })
            .collect()
    }

    fn timing_recommendations(&self, input: &SynthesisInput<'_>) -> Vec<Recommendation> {
        input
            .timing
            .iter()
            .filter_map(|s| {
                let kind = match self.classify(s, input.overall)? {
                    Verdict::Avoid => RecommendationKind::AvoidTimeSlot {
                        bucket: s.bucket.clone(),
                    },
                    Verdict::Focus => RecommendationKind::FocusTimeSlot {
                        bucket: s.bucket.clone(),
                    },
                };
                Some(self.bucket_recommendation(kind, s, input.overall))
            })
            .collect()
    }

    fn session_recommendations(&self, input: &SynthesisInput<'_>) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = input
            .sessions
            .iter()
            .filter_map(|s| {
                let BucketKey::Session(name) = &s.bucket else {
                    return None;
                };
                let kind = match self.classify(s, input.overall)? {
                    Verdict::Avoid => RecommendationKind::AvoidSession {
                        session: name.clone(),
                    },
                    Verdict::Focus => RecommendationKind::FocusSession {
                        session: name.clone(),
                    },
                };
                Some(self.bucket_recommendation(kind, s, input.overall))
            })
            .collect();

        if let Some(best) = input.best_overlap {
            let beats_baseline = best
                .summary
                .win_rate
                .zip(input.overall.win_rate)
                .is_some_and(|(wr, base)| wr > base);
            if beats_baseline && self.is_significant(best.summary.total_trades) {
                let kind = RecommendationKind::FocusOverlap {
                    overlap: best.overlap.name.clone(),
                };
                recommendations.push(
                    self.bucket_recommendation(kind, &best.summary, input.overall)
                        .with_evidence("overlap_score", Some(best.score)),
                );
            }
        }

        recommendations
    }

    /// A bucket is worth avoiding when it trails the baseline win rate by
    /// more than the margin and loses money on average, and worth focusing
    /// on in the mirrored case.
    fn classify(&self, summary: &BucketSummary, overall: &BucketSummary) -> Option<Verdict> {
        if !summary.is_significant(self.thresholds.min_trades_for_pattern) {
            return None;
        }
        let deviation = summary.win_rate? - overall.win_rate?;
        let average = summary.average_pnl?;
        let margin = self.thresholds.pattern_win_rate_margin;

        if deviation < -margin && average < Decimal::ZERO {
            Some(Verdict::Avoid)
        } else if deviation > margin && average > Decimal::ZERO {
            Some(Verdict::Focus)
        } else {
            None
        }
    }

    fn bucket_recommendation(
        &self,
        kind: RecommendationKind,
        summary: &BucketSummary,
        overall: &BucketSummary,
    ) -> Recommendation {
        let deviation = summary.win_rate.zip(overall.win_rate).map(|(wr, base)| wr - base);
        let impact = match kind {
            RecommendationKind::AvoidTimeSlot { .. } | RecommendationKind::AvoidSession { .. } => {
                -summary.total_pnl.unwrap_or(Decimal::ZERO)
            }
            _ => excess_pnl(summary.average_pnl, overall.average_pnl, summary.total_trades),
        };

        Recommendation::new(
            kind,
            deviation_severity(deviation),
            self.confidence(summary.total_trades),
            impact,
        )
        .with_evidence("win_rate", summary.win_rate)
        .with_evidence("baseline_win_rate", overall.win_rate)
        .with_evidence("average_pnl", summary.average_pnl)
        .with_evidence("trades", Some(Decimal::from(summary.total_trades)))
    }

    fn is_significant(&self, trades: usize) -> bool {
        trades > 0 && trades >= self.thresholds.min_trades_for_pattern
    }

    /// Grows linearly with sample size and saturates at twice the
    /// significance threshold.
    fn confidence(&self, trades: usize) -> Decimal {
        let saturation = Decimal::from(self.thresholds.min_trades_for_pattern * 2);
        ratio_or_one(Decimal::from(trades), saturation)
    }
}

enum Verdict {
    Avoid,
    Focus,
}

/// PnL the subset made beyond what the same number of average trades would have.
fn excess_pnl(average: Option<Decimal>, baseline: Option<Decimal>, trades: usize) -> Decimal {
    average
        .zip(baseline)
        .map_or(Decimal::ZERO, |(avg, base)| (avg - base) * Decimal::from(trades))
}

/// A 50 point win-rate gap is maximal severity.
fn deviation_severity(deviation: Option<Decimal>) -> Decimal {
    deviation.map_or(Decimal::ZERO, |d| (d.abs() * dec!(2)).min(Decimal::ONE))
}

fn ratio_or_one(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ONE;
    }
    (numerator / denominator).min(Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::Category;
    use analytics::{HourInterval, SessionOverlap};
    use patterns::Condition;

    fn summary(bucket: BucketKey, trades: usize, wins: usize, total_pnl: Decimal) -> BucketSummary {
        let n = Decimal::from(trades);
        BucketSummary {
            bucket,
            total_trades: trades,
            wins,
            losses: trades - wins,
            breakeven: 0,
            win_rate: Some(Decimal::from(wins) / n),
            total_pnl: Some(total_pnl),
            average_pnl: Some(total_pnl / n),
        }
    }

    fn risk_metrics(bucket: BucketKey, trades: usize, score: Decimal, total_pnl: Decimal) -> RiskMetrics {
        RiskMetrics {
            bucket,
            total_trades: trades,
            total_pnl: Some(total_pnl),
            sharpe_ratio: None,
            max_drawdown: Some(dec!(500)),
            max_drawdown_pct: Some(dec!(5)),
            profit_factor: None,
            value_at_risk: Some(dec!(80)),
            average_daily_exposure: None,
            max_loss_streak: 3,
            risk_score: Some(score),
        }
    }

    fn condition(condition: Condition, trades: usize, win_rate: Decimal, total_pnl: Decimal) -> ConditionResult {
        ConditionResult {
            label: condition.label(),
            condition,
            total_trades: trades,
            wins: 0,
            win_rate: Some(win_rate),
            baseline_win_rate: Some(dec!(0.5)),
            deviation: Some(win_rate - dec!(0.5)),
            total_pnl,
            average_pnl: Some(total_pnl / Decimal::from(trades)),
        }
    }

    struct Fixture {
        overall: BucketSummary,
        performance: PerformanceReport,
        timing: Vec<BucketSummary>,
        sessions: Vec<BucketSummary>,
        best_overlap: Option<RankedOverlap>,
        risk: Vec<RiskMetrics>,
        winning: Vec<ConditionResult>,
        losing: Vec<ConditionResult>,
        emotional: EmotionalTradingSummary,
    }

    impl Fixture {
        fn new() -> Self {
            let mut performance = PerformanceReport::new();
            performance.gross_loss = dec!(4000);
            Self {
                overall: summary(BucketKey::All, 200, 100, dec!(2000)),
                performance,
                timing: Vec::new(),
                sessions: Vec::new(),
                best_overlap: None,
                risk: Vec::new(),
                winning: Vec::new(),
                losing: Vec::new(),
                emotional: EmotionalTradingSummary::default(),
            }
        }

        fn run(&self) -> Vec<Recommendation> {
            let input = SynthesisInput {
                overall: &self.overall,
                performance: Some(&self.performance),
                timing: &self.timing,
                sessions: &self.sessions,
                best_overlap: self.best_overlap.as_ref(),
                risk: &self.risk,
                winning_conditions: &self.winning,
                losing_conditions: &self.losing,
                emotional: &self.emotional,
            };
            RecommendationSynthesizer::new(Thresholds::default()).run(&input)
        }
    }

    #[test]
    fn weak_losing_time_slot_is_avoided() {
        let mut fixture = Fixture::new();
        fixture.timing.push(summary(BucketKey::Hour(3), 30, 6, dec!(-900)));
        fixture.timing.push(summary(BucketKey::Hour(4), 10, 0, dec!(-900)));

        let recs = fixture.run();
        assert_eq!(recs.len(), 1);
        let rec = &recs[0];
        assert_eq!(rec.kind, RecommendationKind::AvoidTimeSlot { bucket: BucketKey::Hour(3) });
        assert_eq!(rec.category, Category::Timing);
        assert_eq!(rec.estimated_pnl_impact, dec!(900));
        assert_eq!(rec.severity, dec!(0.6));
        assert_eq!(rec.confidence, dec!(0.75));
    }

    #[test]
    fn high_risk_bucket_is_flagged_but_whole_history_is_not() {
        let mut fixture = Fixture::new();
        fixture.risk.push(risk_metrics(BucketKey::All, 200, dec!(90), dec!(2000)));
        fixture.risk.push(risk_metrics(BucketKey::Session("Tokyo".into()), 40, dec!(82), dec!(-600)));
        fixture.risk.push(risk_metrics(BucketKey::Session("London".into()), 40, dec!(40), dec!(-600)));

        let recs = fixture.run();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, Category::Risk);
        assert_eq!(recs[0].severity, dec!(0.82));
        assert_eq!(recs[0].estimated_pnl_impact, dec!(300));
        assert_eq!(recs[0].confidence, dec!(1));
    }

    #[test]
    fn time_slot_conditions_do_not_duplicate_bucket_advice() {
        let mut fixture = Fixture::new();
        fixture.losing.push(condition(Condition::AtHour(3), 30, dec!(0.2), dec!(-900)));
        fixture.losing.push(condition(Condition::AfterLossStreak(2), 25, dec!(0.2), dec!(-700)));

        let recs = fixture.run();
        assert_eq!(recs.len(), 1);
        assert_eq!(
            recs[0].kind,
            RecommendationKind::AvoidCondition { condition: "after 2+ consecutive losses".into() }
        );
        assert_eq!(recs[0].estimated_pnl_impact, dec!(700));
    }

    #[test]
    fn ranking_uses_impact_then_category_then_subject() {
        let mut fixture = Fixture::new();
        fixture.emotional.revenge_trades = 4;
        fixture.emotional.revenge_pnl = dec!(-500);
        fixture.timing.push(summary(BucketKey::DayOfWeek(chrono::Weekday::Fri), 30, 6, dec!(-500)));
        fixture.risk.push(risk_metrics(BucketKey::Hour(9), 40, dec!(75), dec!(-1000)));
        fixture.losing.push(condition(Condition::RMultipleAbove(dec!(2)), 20, dec!(0.1), dec!(-1200)));

        let recs = fixture.run();
        let order: Vec<(Category, Decimal)> = recs.iter().map(|r| (r.category, r.estimated_pnl_impact)).collect();
        assert_eq!(
            order,
            vec![
                (Category::Pattern, dec!(1200)),
                (Category::Risk, dec!(500)),
                (Category::Pattern, dec!(500)),
                (Category::Timing, dec!(500)),
            ]
        );
        assert!(recs.iter().all(|r| r.severity >= dec!(0) && r.severity <= dec!(1)));
        assert!(recs.iter().all(|r| r.confidence >= dec!(0) && r.confidence <= dec!(1)));
    }

    #[test]
    fn best_overlap_is_recommended_only_when_it_beats_the_baseline() {
        let mut fixture = Fixture::new();
        let overlap = SessionOverlap {
            name: "London_NY_Overlap".to_string(),
            sessions: vec!["London".to_string(), "New_York".to_string()],
            intervals: vec![HourInterval { start: 12, end: 16 }],
            declared: true,
        };
        fixture.best_overlap = Some(RankedOverlap {
            overlap: overlap.clone(),
            summary: summary(BucketKey::Overlap(overlap.name.clone()), 25, 18, dec!(750)),
            score: dec!(1),
        });

        let recs = fixture.run();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, Category::Session);
        // (30 - 10) * 25
        assert_eq!(recs[0].estimated_pnl_impact, dec!(500));

        fixture.best_overlap.as_mut().unwrap().summary = summary(BucketKey::Overlap(overlap.name), 25, 10, dec!(750));
        assert!(fixture.run().is_empty());
    }

    #[test]
    fn nothing_to_say_about_an_empty_history() {
        let mut fixture = Fixture::new();
        fixture.overall = BucketSummary::from_trades(BucketKey::All, std::iter::empty());
        assert!(fixture.run().is_empty());
    }
}
