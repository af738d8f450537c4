//! # Tradelens Recommendation Synthesizer
//!
//! The last stage of an analysis. It reads bucket summaries, risk metrics and
//! pattern findings and turns them into a ranked list of structured
//! `Recommendation` records. It produces no prose beyond short labels;
//! explaining the advice is left to the caller.
//!
//! Only buckets and conditions with at least `min_trades_for_pattern` trades
//! take part. Each record carries a severity and a confidence in `[0, 1]`,
//! an estimated PnL impact over the analysed history and the numbers that
//! back it.

pub mod recommendation;
pub mod synthesizer;

pub use recommendation::{Category, Recommendation, RecommendationKind};
pub use synthesizer::{RecommendationSynthesizer, SynthesisInput};
