//! Trade builders shared by the unit tests of this crate.

use chrono::{Duration, TimeZone, Utc};
use core_types::{Direction, Trade};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A one-lot long EURUSD trade opened on the hour and held for 30 minutes.
pub fn trade_at(ticket: u64, year: i32, month: u32, day: u32, hour: u32, pnl: Decimal) -> Trade {
    let open_time = Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap();
    Trade {
        ticket,
        symbol: "EURUSD".to_string(),
        direction: Direction::Long,
        open_time,
        close_time: open_time + Duration::minutes(30),
        pnl,
        size: dec!(1),
        r_multiple: None,
        entry_price: None,
        exit_price: None,
        setup: None,
    }
}

/// Consecutive hourly trades starting Monday 2024-01-08 00:00 UTC.
pub fn trades_with_pnls(pnls: &[Decimal]) -> Vec<Trade> {
    let start = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
    pnls.iter()
        .enumerate()
        .map(|(i, pnl)| {
            let mut trade = trade_at(i as u64 + 1, 2024, 1, 8, 0, *pnl);
            trade.open_time = start + Duration::hours(i as i64);
            trade.close_time = trade.open_time + Duration::minutes(30);
            trade
        })
        .collect()
}
