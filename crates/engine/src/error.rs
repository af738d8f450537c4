use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] configuration::ConfigError),

    #[error("Session calendar error: {0}")]
    Calendar(#[from] analytics::AnalyticsError),

    #[error("Risk parameter error: {0}")]
    Risk(#[from] risk::RiskError),

    #[error("Pattern catalog error: {0}")]
    Pattern(#[from] patterns::PatternError),
}
