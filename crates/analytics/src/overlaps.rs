use crate::aggregator::TimeAggregator;
use crate::sessions::SessionOverlap;
use crate::stats::{find_min_max, normalize};
use crate::summary::BucketSummary;
use rust_decimal::Decimal;
use serde::Serialize;

/// An overlap together with the summary of the trades entered inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapSummary {
    pub overlap: SessionOverlap,
    pub summary: BucketSummary,
}

/// The winner of `get_best_session_overlap` and its composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedOverlap {
    pub overlap: SessionOverlap,
    pub summary: BucketSummary,
    pub score: Decimal,
}

impl TimeAggregator<'_> {
    /// Every overlap that saw at least one trade, in calendar order.
    pub fn get_session_overlaps(&self) -> Vec<OverlapSummary> {
        self.calendar()
            .overlaps()
            .iter()
            .zip(self.overlap_buckets())
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(overlap, bucket)| OverlapSummary {
                overlap: overlap.clone(),
                summary: self.summarize(&bucket),
            })
            .collect()
    }

    /// Picks the overlap with the best weighted mix of win rate and average
    /// PnL among those with at least `min_trades` trades.
    ///
    /// Both factors are min-max normalised across the qualifying overlaps.
    /// Ties go to the overlap with more trades, then to the lexically
    /// smaller name.
    pub fn get_best_session_overlap(&self, min_trades: usize) -> Option<RankedOverlap> {
        let candidates: Vec<OverlapSummary> = self
            .get_session_overlaps()
            .into_iter()
            .filter(|o| o.summary.is_significant(min_trades))
            .collect();

        let (min_wr, max_wr) = find_min_max(candidates.iter().filter_map(|c| c.summary.win_rate))?;
        let (min_pnl, max_pnl) =
            find_min_max(candidates.iter().filter_map(|c| c.summary.average_pnl))?;
        let weights = self.scoring();

        let mut ranked: Vec<RankedOverlap> = candidates
            .into_iter()
            .map(|c| {
                let win_rate = c.summary.win_rate.unwrap_or(Decimal::ZERO);
                let avg_pnl = c.summary.average_pnl.unwrap_or(Decimal::ZERO);
                let score = weights.win_rate_weight * normalize(win_rate, min_wr, max_wr)
                    + weights.avg_pnl_weight * normalize(avg_pnl, min_pnl, max_pnl);
                RankedOverlap {
                    overlap: c.overlap,
                    summary: c.summary,
                    score,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.summary.total_trades.cmp(&a.summary.total_trades))
                .then(a.overlap.name.cmp(&b.overlap.name))
        });

        let best = ranked.into_iter().next()?;
        tracing::debug!(
            overlap = %best.overlap.name,
            score = %best.score,
            trades = best.summary.total_trades,
            "Selected best session overlap"
        );
        Some(best)
    }
}
