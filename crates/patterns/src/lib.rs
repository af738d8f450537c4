//! # Tradelens Pattern Finder
//!
//! This crate looks for behavioural patterns in a trade timeline: the
//! conditions under which a trader wins or loses noticeably more often than
//! usual, and trades that look emotionally driven (revenge trading, FOMO,
//! overtrading).
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It depends only on `core-types`,
//!   `configuration` and `analytics`.
//! - **Closed Condition Set:** Conditions are a tagged `Condition` enum evaluated by a
//!   single dispatcher, `evaluator::matches`. A new condition is a new variant plus a
//!   new match arm.
//!
//! ## Public API
//!
//! - `PatternFinder`: Evaluates the catalog and detects emotional trading.
//! - `Condition` / `build_catalog`: The condition vocabulary and the standard catalog.
//! - `ConditionResult` / `EmotionalTradingSummary`: The findings.
//! - `PatternError`: Returned when a caller-supplied catalog does not fit the calendar.

pub mod condition;
pub mod emotional;
pub mod error;
pub mod evaluator;
pub mod finder;

#[cfg(test)]
pub(crate) mod test_support;

pub use condition::{build_catalog, Condition};
pub use emotional::EmotionalTradingSummary;
pub use error::PatternError;
pub use finder::{ConditionResult, PatternFinder};
