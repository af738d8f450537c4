use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons a raw trade record cannot become a `Trade`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Trade {0} has no open timestamp")]
    MissingOpenTime(u64),

    #[error("Trade {0} has no close timestamp (still open?)")]
    MissingCloseTime(u64),

    #[error("Trade {ticket} closes at {close} before it opens at {open}")]
    CloseBeforeOpen {
        ticket: u64,
        open: DateTime<Utc>,
        close: DateTime<Utc>,
    },

    #[error("Trade {0} has a non-positive size ({1})")]
    NonPositiveSize(u64, Decimal),

    #[error("Trade {0} has an empty symbol")]
    EmptySymbol(u64),
}

impl CoreError {
    /// The ticket of the record that failed validation.
    pub fn ticket(&self) -> u64 {
        match self {
            CoreError::MissingOpenTime(ticket)
            | CoreError::MissingCloseTime(ticket)
            | CoreError::NonPositiveSize(ticket, _)
            | CoreError::EmptySymbol(ticket) => *ticket,
            CoreError::CloseBeforeOpen { ticket, .. } => *ticket,
        }
    }
}
