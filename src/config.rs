// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{ProgressError, Result};
use crate::monitor::PassMultipliers;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    pub batch_size: u64,
    pub primary_passes: u64,
    pub secondary_passes: u64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    pub primary_count: u64,
    pub secondary_count: u64,
    pub steps_per_stage: usize,
    pub batch_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    Bar,
    Dots,
    Log,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub style: OutputStyle,
    pub dots: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            style: OutputStyle::Bar,
            dots: 100,
        }
    }
}

impl MonitorConfig {
    pub fn passes(&self) -> PassMultipliers {
        PassMultipliers {
            primary: self.primary_passes,
            secondary: self.secondary_passes,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Layers the TOML file at `path` (or `config/default.toml`) and
    /// `STAGE_PROGRESS__*` environment variables over the built-in defaults.
    /// A missing file leaves the defaults in place.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let environment = config::Environment::with_prefix("STAGE_PROGRESS")
            .separator("__")
            .try_parsing(true);
        Self::load_with_environment(path, environment)
    }

    fn load_with_environment(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new("config/default.toml"));

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default_config())?)
            .add_source(config::File::from(path).required(false))
            .add_source(environment)
            .build()?;

        let config: Config = settings.try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        let passes = PassMultipliers::default();
        Self {
            monitor: MonitorConfig {
                batch_size: 10_000,
                primary_passes: passes.primary,
                secondary_passes: passes.secondary,
                poll_interval_ms: 1_000,
            },
            simulation: SimulationConfig {
                primary_count: 1_000_000,
                secondary_count: 2_500_000,
                steps_per_stage: 4,
                batch_delay_ms: 20,
            },
            output: OutputConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.monitor.batch_size == 0 {
            return Err(ProgressError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        if self.monitor.poll_interval_ms == 0 {
            return Err(ProgressError::Config(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.simulation.steps_per_stage == 0 {
            return Err(ProgressError::Config(
                "steps_per_stage must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.monitor.passes(), PassMultipliers::default());
        assert_eq!(config.monitor.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
            [monitor]
            batch_size = 100
            primary_passes = 2
            secondary_passes = 5
            poll_interval_ms = 250

            [simulation]
            primary_count = 300
            secondary_count = 200
            steps_per_stage = 3
            batch_delay_ms = 0

            [output]
            style = "dots"
            dots = 50
            "#,
        );

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.monitor.batch_size, 100);
        assert_eq!(
            config.monitor.passes(),
            PassMultipliers {
                primary: 2,
                secondary: 5
            }
        );
        assert_eq!(config.output.style, OutputStyle::Dots);
        assert_eq!(config.output.dots, 50);
    }

    #[test]
    fn test_output_section_is_optional() {
        let file = write_config(
            r#"
            [monitor]
            batch_size = 100
            primary_passes = 3
            secondary_passes = 4
            poll_interval_ms = 1000

            [simulation]
            primary_count = 0
            secondary_count = 0
            steps_per_stage = 1
            batch_delay_ms = 0
            "#,
        );

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.output.style, OutputStyle::Bar);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let mut config = Config::default_config();
        config.monitor.batch_size = 0;
        assert!(matches!(config.validate(), Err(ProgressError::Config(_))));
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let mut config = Config::default_config();
        config.monitor.poll_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ProgressError::Config(_))));
    }

    fn test_environment(vars: &[(&str, &str)]) -> config::Environment {
        let source = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        config::Environment::with_prefix("STAGE_PROGRESS")
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_missing_file_keeps_environment_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let config = Config::load_with_environment(
            Some(&missing),
            test_environment(&[
                ("STAGE_PROGRESS__MONITOR__BATCH_SIZE", "250"),
                ("STAGE_PROGRESS__OUTPUT__STYLE", "log"),
            ]),
        )
        .unwrap();

        assert_eq!(config.monitor.batch_size, 250);
        assert_eq!(config.output.style, OutputStyle::Log);
        assert_eq!(
            config.simulation.primary_count,
            Config::default_config().simulation.primary_count
        );
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let file = write_config(
            r#"
            [monitor]
            batch_size = 500
            "#,
        );

        let config =
            Config::load_with_environment(Some(file.path()), test_environment(&[])).unwrap();
        assert_eq!(config.monitor.batch_size, 500);
        assert_eq!(config.monitor.poll_interval_ms, 1_000);
        assert_eq!(config.simulation.steps_per_stage, 4);
    }

    #[test]
    fn test_environment_is_validated() {
        let result = Config::load_with_environment(
            Some(Path::new("does/not/exist.toml")),
            test_environment(&[("STAGE_PROGRESS__MONITOR__BATCH_SIZE", "0")]),
        );
        assert!(matches!(result, Err(ProgressError::Config(_))));
    }
}
