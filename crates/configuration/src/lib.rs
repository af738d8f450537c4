use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{
    AnalysisConfig, ConditionCatalogSettings, EmotionalTradingRules, Granularity, HourWindow, NamedOverlap,
    OverlapScoring, RiskSettings, RiskWeights, ScoringWeights, SessionDefinition, Thresholds,
};

/// Loads the analysis configuration from a toml file.
///
/// Values can be overridden with environment variables using the `TRADELENS`
/// prefix and `__` as separator, e.g. `TRADELENS__RISK__VAR_CONFIDENCE=0.99`.
/// The result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("TRADELENS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `AnalysisConfig` struct
    let config = builder.try_deserialize::<AnalysisConfig>()?;
    config.validate()?;

    tracing::debug!(
        sessions = config.sessions.len(),
        named_overlaps = config.named_overlaps.len(),
        "Loaded analysis configuration from {}",
        path.display()
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    #[test]
    fn partial_toml_keeps_defaults_for_missing_sections() {
        let path = std::env::temp_dir().join("tradelens-partial-config.toml");
        fs::write(
            &path,
            r#"
[[sessions]]
name = "London"
windows = [{ start_hour = 7, end_hour = 16 }]

[[sessions]]
name = "New_York"
windows = [{ start_hour = 12, end_hour = 20 }]

[[named_overlaps]]
name = "London_NY_Overlap"
sessions = ["London", "New_York"]

[risk]
var_confidence = 0.99
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.sessions.len(), 2);
        assert_eq!(config.risk.var_confidence, dec!(0.99));
        assert_eq!(config.risk.granularity, Granularity::Daily);
        assert_eq!(config.thresholds.min_trades_for_pattern, 20);
    }

    #[test]
    fn invalid_file_values_fail_validation() {
        let path = std::env::temp_dir().join("tradelens-invalid-config.toml");
        fs::write(&path, "[thresholds]\npattern_win_rate_margin = 1.5\n").unwrap();

        let result = load_config(&path);
        fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
