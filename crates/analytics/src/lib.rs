//! # Tradelens Analytics
//!
//! This crate turns a validated trade history into time-bucketed statistics.
//! It answers "when do I trade well?" by slicing the history by weekday,
//! hour, month, period of the day, trading session and session overlap.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files, brokers
//!   or terminals. It depends only on `core-types` and `configuration`.
//! - **One Snapshot:** A `Timeline` owns the trades of one analysis call in chronological
//!   order. Buckets are lists of timeline indices, so a trade can sit in many buckets
//!   without being copied.
//! - **Sentinels, not Errors:** Statistics that are undefined for a bucket (empty, a
//!   single trade, a zero denominator) are `None`. The only fallible operation is building
//!   the `SessionCalendar`.
//!
//! ## Public API
//!
//! - `SessionCalendar`: Maps entry hours to sessions and computes session overlaps.
//! - `Timeline` / `StreakIndex`: The chronological snapshot and its global win/loss runs.
//! - `TimeAggregator`: Builds buckets and `BucketSummary`s, ranks overlaps, profiles
//!   session volatility and picks the best and worst hours, weekdays and months
//!   (`TimeExtremes`).
//! - `PerformanceReport`: Whole-history profitability overview.
//! - `stats`: The descriptive statistics shared with the risk and pattern crates.

// Declare the modules that constitute this crate.
pub mod aggregator;
pub mod bucket;
pub mod error;
pub mod extremes;
pub mod overlaps;
pub mod performance;
pub mod sessions;
pub mod stats;
pub mod streaks;
pub mod summary;
pub mod timeline;
pub mod volatility;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export the key components to create a clean, public-facing API.
pub use aggregator::TimeAggregator;
pub use bucket::{Bucket, BucketKey, DayPeriod};
pub use error::AnalyticsError;
pub use extremes::TimeExtremes;
pub use overlaps::{OverlapSummary, RankedOverlap};
pub use performance::PerformanceReport;
pub use sessions::{HourInterval, Session, SessionCalendar, SessionOverlap};
pub use streaks::{Streak, StreakIndex};
pub use summary::BucketSummary;
pub use timeline::Timeline;
pub use volatility::{Dispersion, SessionVolatility};
