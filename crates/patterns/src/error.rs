use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    #[error("Condition '{0}' refers to a session that is not in the calendar")]
    UnknownSession(String),

    #[error("Condition '{0}' refers to an overlap that is not in the calendar")]
    UnknownOverlap(String),

    #[error("Condition '{0}' has invalid parameters: {1}")]
    InvalidParameters(String, String),
}
