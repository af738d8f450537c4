//! Trade builders shared by the unit tests of this crate.

use chrono::{Duration, TimeZone, Utc};
use core_types::{Direction, Trade};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Hourly one-lot long EURUSD trades from Monday 2024-01-08 00:00 UTC,
/// each held for 30 minutes.
pub fn hourly_trades(pnls: &[Decimal]) -> Vec<Trade> {
    let start = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
    pnls.iter()
        .enumerate()
        .map(|(i, pnl)| {
            let open_time = start + Duration::hours(i as i64);
            Trade {
                ticket: i as u64 + 1,
                symbol: "EURUSD".to_string(),
                direction: Direction::Long,
                open_time,
                close_time: open_time + Duration::minutes(30),
                pnl: *pnl,
                size: dec!(1),
                r_multiple: None,
                entry_price: None,
                exit_price: None,
                setup: None,
            }
        })
        .collect()
}
