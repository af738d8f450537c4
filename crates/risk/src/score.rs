use configuration::RiskWeights;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// The full-history values every bucket's risk score is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RiskBaseline {
    pub sharpe_ratio: Option<Decimal>,
    pub max_drawdown_pct: Option<Decimal>,
    pub value_at_risk: Option<Decimal>,
    pub max_loss_streak: usize,
}

/// The raw inputs of one bucket's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub sharpe_ratio: Option<Decimal>,
    pub max_drawdown_pct: Option<Decimal>,
    pub value_at_risk: Option<Decimal>,
    pub max_loss_streak: usize,
}

/// Composite 0-100 risk score.
///
/// Each component is turned into a severity in `[0, 1]` relative to the
/// baseline, where exactly matching the baseline gives 0.5:
///
/// - Sharpe (higher is safer): `0.5 + 0.5 * d / (|d| + max(|baseline|, 1))`
///   with `d = baseline - sharpe`.
/// - Drawdown %, VaR and loss streak (higher is riskier): `x / (x + baseline)`,
///   or 0.5 when both are zero.
///
/// The score is `100 * sum(weight * severity) / sum(weight)` over the
/// components defined for both the bucket and the baseline. `None` when no
/// component is defined or the applicable weights sum to zero.
pub fn risk_score(inputs: &ScoreInputs, baseline: &RiskBaseline, weights: &RiskWeights) -> Option<Decimal> {
    let components = [
        (
            weights.sharpe,
            inputs.sharpe_ratio.zip(baseline.sharpe_ratio).map(|(x, b)| sharpe_severity(x, b)),
        ),
        (
            weights.drawdown,
            inputs
                .max_drawdown_pct
                .zip(baseline.max_drawdown_pct)
                .map(|(x, b)| relative_severity(x, b)),
        ),
        (
            weights.var,
            inputs.value_at_risk.zip(baseline.value_at_risk).map(|(x, b)| relative_severity(x, b)),
        ),
        (
            weights.streak,
            Some(relative_severity(
                Decimal::from(inputs.max_loss_streak),
                Decimal::from(baseline.max_loss_streak),
            )),
        ),
    ];

    let (weighted, total_weight) = components
        .iter()
        .filter_map(|(weight, severity)| severity.map(|s| (*weight, s)))
        .fold((Decimal::ZERO, Decimal::ZERO), |(sum, total), (w, s)| (sum + w * s, total + w));

    if total_weight.is_zero() {
        return None;
    }
    Some((weighted / total_weight * Decimal::ONE_HUNDRED).round_dp(2))
}

fn sharpe_severity(sharpe: Decimal, baseline: Decimal) -> Decimal {
    let gap = baseline - sharpe;
    let scale = baseline.abs().max(Decimal::ONE);
    dec!(0.5) + dec!(0.5) * gap / (gap.abs() + scale)
}

fn relative_severity(value: Decimal, baseline: Decimal) -> Decimal {
    let value = value.max(Decimal::ZERO);
    let baseline = baseline.max(Decimal::ZERO);
    let total = value + baseline;
    if total.is_zero() {
        return dec!(0.5);
    }
    value / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> RiskBaseline {
        RiskBaseline {
            sharpe_ratio: Some(dec!(1.5)),
            max_drawdown_pct: Some(dec!(8)),
            value_at_risk: Some(dec!(120)),
            max_loss_streak: 4,
        }
    }

    fn same_as_baseline() -> ScoreInputs {
        ScoreInputs {
            sharpe_ratio: Some(dec!(1.5)),
            max_drawdown_pct: Some(dec!(8)),
            value_at_risk: Some(dec!(120)),
            max_loss_streak: 4,
        }
    }

    #[test]
    fn matching_the_baseline_scores_fifty() {
        let score = risk_score(&same_as_baseline(), &baseline(), &RiskWeights::default());
        assert_eq!(score, Some(dec!(50)));
    }

    #[test]
    fn worse_components_raise_the_score() {
        let mut inputs = same_as_baseline();
        inputs.sharpe_ratio = Some(dec!(-1));
        inputs.max_drawdown_pct = Some(dec!(24));
        inputs.value_at_risk = Some(dec!(360));
        inputs.max_loss_streak = 12;

        let score = risk_score(&inputs, &baseline(), &RiskWeights::default()).unwrap();
        assert!(score > dec!(70), "{score}");
        assert!(score <= dec!(100));
    }

    #[test]
    fn undefined_components_renormalise_the_weights() {
        let mut inputs = same_as_baseline();
        inputs.sharpe_ratio = None;
        inputs.value_at_risk = None;
        inputs.max_drawdown_pct = Some(dec!(0));
        inputs.max_loss_streak = 0;

        // Drawdown and streak severities are both zero.
        let score = risk_score(&inputs, &baseline(), &RiskWeights::default());
        assert_eq!(score, Some(dec!(0)));
    }

    #[test]
    fn zero_weights_on_defined_components_is_none() {
        let weights = RiskWeights {
            sharpe: dec!(1),
            drawdown: dec!(0),
            var: dec!(0),
            streak: dec!(0),
        };
        let mut inputs = same_as_baseline();
        inputs.sharpe_ratio = None;
        assert_eq!(risk_score(&inputs, &baseline(), &weights), None);
    }
}
