//! Defines configuration structures for the repair pipeline.
//!
//! [`RepairConfig`] carries every tunable of a repair run. All parameters
//! have working defaults, so `RepairConfig::default()` is a valid starting
//! point; the builder exists for programmatic construction with validation,
//! and [`RepairConfig::load`] reads the same structure from a TOML file
//! (kebab-case keys, unknown keys rejected).

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// The default number of usable decoys a run tries to collect.
pub const DEFAULT_TARGET_SUCCESS_COUNT: usize = 5;

/// The default weight applied to the statistical score when combining it
/// with the physical energy.
pub const DEFAULT_STATISTICAL_WEIGHT: f64 = 0.1;

/// Attempt budget per requested decoy when `max-attempts` is unset.
pub const ATTEMPT_BUDGET_FACTOR: usize = 10;

/// Error representing an invalid pipeline configuration.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    /// A parameter value fails validation.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// The kebab-case parameter name, as it appears in TOML.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Error representing a failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// Occurs when the file cannot be read.
    #[error("File read error for configuration '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Occurs when the file is not valid TOML for a [`RepairConfig`].
    #[error("TOML parsing error in configuration '{path}': {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// Occurs when the file parses but fails validation.
    #[error("Invalid configuration '{path}': {source}")]
    Invalid {
        path: String,
        #[source]
        source: ConfigError,
    },
}

/// Configuration for a structure repair run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RepairConfig {
    /// How many usable decoys to collect before stopping early. Must be at
    /// least 1.
    pub target_success_count: usize,
    /// Hard cap on modeling attempts. When unset, the budget is
    /// [`ATTEMPT_BUDGET_FACTOR`] times the target.
    pub max_attempts: Option<usize>,
    /// Weight applied to the statistical score in the combined decoy score.
    pub statistical_weight: f64,
    /// Whether to renumber residues contiguously after a successful repair.
    pub renumber: bool,
    /// Whether heteroatoms get their own 1-based numbering during
    /// renumbering, or keep their deposited numbers.
    pub renumber_heteroatoms_independently: bool,
    /// Optional wall-clock budget per modeling attempt, in seconds.
    pub attempt_timeout_secs: Option<f64>,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            target_success_count: DEFAULT_TARGET_SUCCESS_COUNT,
            max_attempts: None,
            statistical_weight: DEFAULT_STATISTICAL_WEIGHT,
            renumber: true,
            renumber_heteroatoms_independently: true,
            attempt_timeout_secs: None,
        }
    }
}

impl RepairConfig {
    /// Creates a new builder for constructing a validated configuration.
    pub fn builder() -> RepairConfigBuilder {
        RepairConfigBuilder::default()
    }

    /// Returns the effective attempt budget: the explicit `max-attempts`
    /// value, or [`ATTEMPT_BUDGET_FACTOR`] times the target when unset.
    pub fn attempt_budget(&self) -> usize {
        self.max_attempts
            .unwrap_or(self.target_success_count * ATTEMPT_BUDGET_FACTOR)
    }

    /// Returns the per-attempt wall-clock budget, if one is configured.
    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_secs
            .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
            .map(Duration::from_secs_f64)
    }

    /// Checks the configuration's internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_success_count == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "target-success-count",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(max_attempts) = self.max_attempts {
            if max_attempts < self.target_success_count {
                return Err(ConfigError::InvalidParameter {
                    name: "max-attempts",
                    reason: format!(
                        "must be at least the target success count ({})",
                        self.target_success_count
                    ),
                });
            }
        }
        if !self.statistical_weight.is_finite() || self.statistical_weight < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "statistical-weight",
                reason: "must be a finite, non-negative number".to_string(),
            });
        }
        if let Some(seconds) = self.attempt_timeout_secs {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(ConfigError::InvalidParameter {
                    name: "attempt-timeout-secs",
                    reason: "must be a positive number of seconds".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Loads and validates a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: RepairConfig =
            toml::from_str(&content).map_err(|source| ConfigLoadError::Toml {
                path: path.display().to_string(),
                source,
            })?;
        config
            .validate()
            .map_err(|source| ConfigLoadError::Invalid {
                path: path.display().to_string(),
                source,
            })?;
        Ok(config)
    }
}

/// A builder for constructing [`RepairConfig`] instances.
#[derive(Debug, Default, Clone)]
pub struct RepairConfigBuilder {
    target_success_count: Option<usize>,
    max_attempts: Option<usize>,
    statistical_weight: Option<f64>,
    renumber: Option<bool>,
    renumber_heteroatoms_independently: Option<bool>,
    attempt_timeout_secs: Option<f64>,
}

impl RepairConfigBuilder {
    /// Sets how many usable decoys to collect before stopping early.
    pub fn target_success_count(mut self, count: usize) -> Self {
        self.target_success_count = Some(count);
        self
    }

    /// Sets the hard cap on modeling attempts.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Sets the weight applied to the statistical score.
    pub fn statistical_weight(mut self, weight: f64) -> Self {
        self.statistical_weight = Some(weight);
        self
    }

    /// Enables or disables post-repair renumbering.
    pub fn renumber(mut self, enabled: bool) -> Self {
        self.renumber = Some(enabled);
        self
    }

    /// Chooses between independent and preserved heteroatom numbering.
    pub fn renumber_heteroatoms_independently(mut self, independent: bool) -> Self {
        self.renumber_heteroatoms_independently = Some(independent);
        self
    }

    /// Sets the per-attempt wall-clock budget in seconds.
    pub fn attempt_timeout_secs(mut self, seconds: f64) -> Self {
        self.attempt_timeout_secs = Some(seconds);
        self
    }

    /// Builds the configuration, filling defaults and validating.
    pub fn build(self) -> Result<RepairConfig, ConfigError> {
        let defaults = RepairConfig::default();
        let config = RepairConfig {
            target_success_count: self
                .target_success_count
                .unwrap_or(defaults.target_success_count),
            max_attempts: self.max_attempts,
            statistical_weight: self
                .statistical_weight
                .unwrap_or(defaults.statistical_weight),
            renumber: self.renumber.unwrap_or(defaults.renumber),
            renumber_heteroatoms_independently: self
                .renumber_heteroatoms_independently
                .unwrap_or(defaults.renumber_heteroatoms_independently),
            attempt_timeout_secs: self.attempt_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let config = RepairConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.target_success_count, 5);
        assert_eq!(config.attempt_budget(), 50);
        assert_eq!(config.statistical_weight, 0.1);
        assert!(config.renumber);
        assert!(config.renumber_heteroatoms_independently);
        assert!(config.attempt_timeout().is_none());
    }

    #[test]
    fn builder_overrides_and_derives_budget() {
        let config = RepairConfig::builder()
            .target_success_count(3)
            .statistical_weight(0.25)
            .renumber(false)
            .build()
            .unwrap();

        assert_eq!(config.target_success_count, 3);
        assert_eq!(config.attempt_budget(), 30);
        assert_eq!(config.statistical_weight, 0.25);
        assert!(!config.renumber);
    }

    #[test]
    fn explicit_max_attempts_wins_over_derivation() {
        let config = RepairConfig::builder()
            .target_success_count(3)
            .max_attempts(7)
            .build()
            .unwrap();

        assert_eq!(config.attempt_budget(), 7);
    }

    #[test]
    fn rejects_zero_target() {
        let error = RepairConfig::builder()
            .target_success_count(0)
            .build()
            .unwrap_err();

        assert!(matches!(
            error,
            ConfigError::InvalidParameter {
                name: "target-success-count",
                ..
            }
        ));
    }

    #[test]
    fn rejects_budget_below_target() {
        let error = RepairConfig::builder()
            .target_success_count(5)
            .max_attempts(4)
            .build()
            .unwrap_err();

        assert!(matches!(
            error,
            ConfigError::InvalidParameter {
                name: "max-attempts",
                ..
            }
        ));
    }

    #[test]
    fn rejects_negative_statistical_weight() {
        let error = RepairConfig::builder()
            .statistical_weight(-0.5)
            .build()
            .unwrap_err();

        assert!(matches!(
            error,
            ConfigError::InvalidParameter {
                name: "statistical-weight",
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_positive_timeout() {
        let error = RepairConfig::builder()
            .attempt_timeout_secs(0.0)
            .build()
            .unwrap_err();

        assert!(matches!(
            error,
            ConfigError::InvalidParameter {
                name: "attempt-timeout-secs",
                ..
            }
        ));
    }

    #[test]
    fn parses_kebab_case_toml() {
        let config: RepairConfig = toml::from_str(
            r#"
            target-success-count = 8
            max-attempts = 100
            statistical-weight = 0.2
            renumber = false
            renumber-heteroatoms-independently = false
            attempt-timeout-secs = 30.0
            "#,
        )
        .unwrap();

        assert_eq!(config.target_success_count, 8);
        assert_eq!(config.max_attempts, Some(100));
        assert_eq!(config.attempt_budget(), 100);
        assert_eq!(config.statistical_weight, 0.2);
        assert!(!config.renumber);
        assert!(!config.renumber_heteroatoms_independently);
        assert_eq!(config.attempt_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_unknown_toml_keys() {
        let result: Result<RepairConfig, _> = toml::from_str("dope-weight = 0.1");

        assert!(result.is_err());
    }

    #[test]
    fn loads_and_validates_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "target-success-count = 2").unwrap();

        let config = RepairConfig::load(file.path()).unwrap();

        assert_eq!(config.target_success_count, 2);
        assert_eq!(config.attempt_budget(), 20);
    }

    #[test]
    fn load_reports_invalid_values_with_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "target-success-count = 0").unwrap();

        let error = RepairConfig::load(file.path()).unwrap_err();

        match error {
            ConfigLoadError::Invalid { path, source } => {
                assert!(path.contains(file.path().file_name().unwrap().to_str().unwrap()));
                assert!(matches!(source, ConfigError::InvalidParameter { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_reports_missing_file() {
        let error = RepairConfig::load("/nonexistent/repair.toml").unwrap_err();

        assert!(matches!(error, ConfigLoadError::Io { .. }));
    }
}
