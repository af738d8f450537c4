use core_types::{Outcome, Trade};
use serde::Serialize;

/// A maximal run of consecutive wins or consecutive losses in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub outcome: Outcome,
    /// Timeline index of the first trade of the run.
    pub start: usize,
    pub len: usize,
}

impl Streak {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Streak runs of the whole chronological history.
///
/// Runs are found once on the global sequence. Bucket-level streak
/// statistics restrict those runs to the bucket's members; they are never
/// recomputed on the bucket itself. A breakeven trade ends the current run
/// and starts none.
#[derive(Debug, Clone, Default)]
pub struct StreakIndex {
    runs: Vec<Streak>,
    run_of: Vec<Option<usize>>,
}

impl StreakIndex {
    pub fn build(trades: &[Trade]) -> Self {
        let mut runs: Vec<Streak> = Vec::new();
        let mut run_of = Vec::with_capacity(trades.len());

        for (index, trade) in trades.iter().enumerate() {
            let outcome = trade.outcome();
            if outcome == Outcome::Breakeven {
                run_of.push(None);
                continue;
            }
            match runs.last_mut() {
                Some(run) if run.outcome == outcome && run.end() == index => run.len += 1,
                _ => runs.push(Streak {
                    outcome,
                    start: index,
                    len: 1,
                }),
            }
            run_of.push(Some(runs.len() - 1));
        }

        Self { runs, run_of }
    }

    pub fn runs(&self) -> &[Streak] {
        &self.runs
    }

    /// Longest run of `outcome` over the whole history.
    pub fn longest(&self, outcome: Outcome) -> usize {
        self.runs
            .iter()
            .filter(|r| r.outcome == outcome)
            .map(|r| r.len)
            .max()
            .unwrap_or(0)
    }

    /// Longest run of `outcome` counting only the given timeline indices.
    pub fn longest_within(&self, members: &[usize], outcome: Outcome) -> usize {
        let mut counts = vec![0usize; self.runs.len()];
        for &member in members {
            if let Some(Some(run)) = self.run_of.get(member) {
                if self.runs[*run].outcome == outcome {
                    counts[*run] += 1;
                }
            }
        }
        counts.into_iter().max().unwrap_or(0)
    }

    /// Outcome and length of the run that ends right before `index`.
    ///
    /// `None` for the first trade or when the previous trade was breakeven.
    pub fn preceding(&self, index: usize) -> Option<(Outcome, usize)> {
        let previous = index.checked_sub(1)?;
        let run = self.runs[(*self.run_of.get(previous)?)?];
        Some((run.outcome, previous - run.start + 1))
    }

    /// The run the most recent trade belongs to.
    pub fn current(&self) -> Option<Streak> {
        let last = self.run_of.len().checked_sub(1)?;
        self.run_of[last].map(|run| self.runs[run])
    }
}
