use crate::enums::{Direction, Outcome};
use crate::error::CoreError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A closed trade exactly as the import layer delivers it.
///
/// Nothing about a `TradeRecord` is trusted: timestamps may be missing and
/// sizes may be nonsense. Use `Trade::try_from` to obtain a validated trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub ticket: u64,
    pub symbol: String,
    pub direction: Direction,
    pub open_time: Option<DateTime<Utc>>,
    pub close_time: Option<DateTime<Utc>>,
    pub pnl: Decimal,
    pub size: Decimal,
    #[serde(default)]
    pub r_multiple: Option<Decimal>,
    #[serde(default)]
    pub entry_price: Option<Decimal>,
    #[serde(default)]
    pub exit_price: Option<Decimal>,
    /// Name of the pre-planned setup this trade was taken from, if any.
    #[serde(default)]
    pub setup: Option<String>,
}

/// A validated, closed trade. The analytics crates only ever see this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub ticket: u64,
    pub symbol: String,
    pub direction: Direction,
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub pnl: Decimal,
    pub size: Decimal,
    pub r_multiple: Option<Decimal>,
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub setup: Option<String>,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < Decimal::ZERO
    }

    pub fn outcome(&self) -> Outcome {
        if self.is_win() {
            Outcome::Win
        } else if self.is_loss() {
            Outcome::Loss
        } else {
            Outcome::Breakeven
        }
    }

    pub fn holding_period(&self) -> Duration {
        self.close_time - self.open_time
    }

    /// UTC hour of day (0-23) at which the trade was opened.
    pub fn entry_hour(&self) -> u32 {
        self.open_time.hour()
    }

    pub fn entry_weekday(&self) -> Weekday {
        self.open_time.weekday()
    }

    /// Calendar month (1-12) in which the trade was opened.
    pub fn entry_month(&self) -> u32 {
        self.open_time.month()
    }

    pub fn entry_date(&self) -> NaiveDate {
        self.open_time.date_naive()
    }

    /// True when the trader tagged this trade with a pre-planned setup.
    pub fn has_setup(&self) -> bool {
        self.setup.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// Relative price change from entry to exit, if both prices are known.
    pub fn price_move(&self) -> Option<Decimal> {
        let entry = self.entry_price?;
        let exit = self.exit_price?;
        if entry.is_zero() {
            return None;
        }
        Some((exit - entry) / entry)
    }
}

impl TryFrom<TradeRecord> for Trade {
    type Error = CoreError;

    fn try_from(record: TradeRecord) -> Result<Self, Self::Error> {
        let ticket = record.ticket;

        if record.symbol.trim().is_empty() {
            return Err(CoreError::EmptySymbol(ticket));
        }
        let open_time = record.open_time.ok_or(CoreError::MissingOpenTime(ticket))?;
        let close_time = record
            .close_time
            .ok_or(CoreError::MissingCloseTime(ticket))?;
        if close_time < open_time {
            return Err(CoreError::CloseBeforeOpen {
                ticket,
                open: open_time,
                close: close_time,
            });
        }
        if record.size <= Decimal::ZERO {
            return Err(CoreError::NonPositiveSize(ticket, record.size));
        }

        Ok(Self {
            ticket,
            symbol: record.symbol,
            direction: record.direction,
            open_time,
            close_time,
            pnl: record.pnl,
            size: record.size,
            r_multiple: record.r_multiple,
            entry_price: record.entry_price,
            exit_price: record.exit_price,
            setup: record.setup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn record() -> TradeRecord {
        TradeRecord {
            ticket: 7,
            symbol: "EURUSD".to_string(),
            direction: Direction::Long,
            open_time: Some(Utc.with_ymd_and_hms(2024, 1, 8, 14, 5, 0).unwrap()),
            close_time: Some(Utc.with_ymd_and_hms(2024, 1, 8, 14, 40, 0).unwrap()),
            pnl: dec!(100),
            size: dec!(1),
            r_multiple: Some(dec!(2)),
            entry_price: Some(dec!(1.1000)),
            exit_price: Some(dec!(1.1100)),
            setup: None,
        }
    }

    #[test]
    fn valid_record_becomes_trade() {
        let trade = Trade::try_from(record()).unwrap();
        assert!(trade.is_win());
        assert_eq!(trade.outcome(), Outcome::Win);
        assert_eq!(trade.entry_hour(), 14);
        assert_eq!(trade.entry_weekday(), Weekday::Mon);
        assert_eq!(trade.holding_period(), Duration::minutes(35));
    }

    #[test]
    fn missing_close_time_is_rejected() {
        let mut r = record();
        r.close_time = None;
        assert_eq!(Trade::try_from(r), Err(CoreError::MissingCloseTime(7)));
    }

    #[test]
    fn close_before_open_is_rejected() {
        let mut r = record();
        r.close_time = Some(Utc.with_ymd_and_hms(2024, 1, 8, 13, 0, 0).unwrap());
        let err = Trade::try_from(r).unwrap_err();
        assert!(matches!(err, CoreError::CloseBeforeOpen { ticket: 7, .. }));
    }

    #[test]
    fn non_positive_size_is_rejected() {
        let mut r = record();
        r.size = dec!(0);
        assert_eq!(
            Trade::try_from(r),
            Err(CoreError::NonPositiveSize(7, dec!(0)))
        );
    }

    #[test]
    fn breakeven_is_neither_win_nor_loss() {
        let mut r = record();
        r.pnl = dec!(0);
        let trade = Trade::try_from(r).unwrap();
        assert_eq!(trade.outcome(), Outcome::Breakeven);
        assert!(!trade.is_win());
        assert!(!trade.is_loss());
    }

    #[test]
    fn price_move_is_relative_to_entry() {
        let trade = Trade::try_from(record()).unwrap();
        let moved = trade.price_move().unwrap();
        assert!(moved > dec!(0.0090) && moved < dec!(0.0091));
    }

    #[test]
    fn blank_setup_is_not_a_setup() {
        let mut r = record();
        r.setup = Some("  ".to_string());
        assert!(!Trade::try_from(r).unwrap().has_setup());
    }
}
