// Configuration loader with environment variable substitution

use super::types::*;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file with environment variable substitution
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RecorderConfig> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        // Substitute environment variables
        let content = Self::substitute_env_vars(&content);

        // Parse YAML
        let config: RecorderConfig =
            serde_yaml::from_str(&content).context("Failed to parse YAML configuration")?;

        // Validate configuration
        Self::validate(&config)?;

        Ok(config)
    }

    /// Substitute ${VAR} and ${VAR:-default} patterns with environment variables
    ///
    /// Examples:
    /// - ${HOME} -> /home/user
    /// - ${RECORDING_DIR:-/data/recordings} -> /data/recordings (if RECORDING_DIR not set)
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]+))?\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str());

            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if let Some(default) = default_value {
                        default.to_string()
                    } else {
                        // Keep original if no default and var not found
                        format!("${{{}}}", var_name)
                    }
                }
            }
        })
        .to_string()
    }

    /// Validate configuration
    pub(super) fn validate(config: &RecorderConfig) -> Result<()> {
        if config.sink.queue_capacity == 0 {
            bail!("sink.queue_capacity must be > 0");
        }

        if config.synchronizer.interpolation_resolution_ns < 0 {
            bail!("synchronizer.interpolation_resolution_ns must be >= 0");
        }

        if config.frame_matching.tolerance_ns <= 0 {
            bail!("frame_matching.tolerance_ns must be > 0");
        }

        if config.frame_matching.pending_capacity == 0 {
            bail!("frame_matching.pending_capacity must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_substitution() {
        // Set test environment variable
        std::env::set_var("TEST_VAR", "test_value");

        let input = "path: ${TEST_VAR}";
        let output = ConfigLoader::substitute_env_vars(input);
        assert_eq!(output, "path: test_value");

        std::env::remove_var("TEST_VAR");
    }

    #[test]
    fn test_env_var_with_default() {
        // Don't set TEST_VAR2
        std::env::remove_var("TEST_VAR2");

        let input = "level: ${TEST_VAR2:-debug}";
        let output = ConfigLoader::substitute_env_vars(input);
        assert_eq!(output, "level: debug");
    }

    #[test]
    fn test_validation_zero_queue_capacity() {
        let mut config = RecorderConfig::default();
        config.sink.queue_capacity = 0;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("queue_capacity"));
    }

    #[test]
    fn test_validation_negative_tolerance() {
        let mut config = RecorderConfig::default();
        config.frame_matching.tolerance_ns = -1;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("tolerance_ns"));
    }
}
