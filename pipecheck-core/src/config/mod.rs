//! Configuration structures and constants for the pipecheck harness.
//!
//! A `HarnessConfig` starts from built-in defaults, may be overlaid by a JSON
//! file, and is finally adjusted by the CLI flags.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

// Default constants

/// Directory holding the pipeline scripts, relative to the working directory.
pub const DEFAULT_PIPELINES_DIR: &str = "basic_pipelines";

/// Directory holding test fixtures such as the non-media text file.
pub const DEFAULT_RESOURCES_DIR: &str = "tests/test_resources";

/// Program used to launch the pipeline scripts.
pub const DEFAULT_INTERPRETER: &str = "python";

/// Per-invocation timeout in seconds. Zero disables the timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Input path that must not exist when the invalid-input case runs.
pub const DEFAULT_INVALID_INPUT_PATH: &str = "invalid_path.mp4";

/// Name of the non-media fixture inside the resources directory.
pub const DEFAULT_UNSUPPORTED_INPUT_FILE: &str = "dummy_text.txt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub pipelines_dir: PathBuf,

    pub resources_dir: PathBuf,

    /// `None` executes the scripts directly.
    pub interpreter: Option<PathBuf>,

    pub timeout_secs: u64,

    pub invalid_input_path: PathBuf,

    pub unsupported_input_file: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            pipelines_dir: PathBuf::from(DEFAULT_PIPELINES_DIR),
            resources_dir: PathBuf::from(DEFAULT_RESOURCES_DIR),
            interpreter: Some(PathBuf::from(DEFAULT_INTERPRETER)),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            invalid_input_path: PathBuf::from(DEFAULT_INVALID_INPUT_PATH),
            unsupported_input_file: DEFAULT_UNSUPPORTED_INPUT_FILE.to_string(),
        }
    }
}

impl HarnessConfig {
    /// Loads a JSON config file. Missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        debug!("Loading harness config from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: HarnessConfig = serde_json::from_str(&contents).map_err(|e| {
            CoreError::JsonParse(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The runner timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Full path of the non-media fixture.
    pub fn unsupported_input_path(&self) -> PathBuf {
        self.resources_dir.join(&self.unsupported_input_file)
    }

    /// Rejects values that would make every case fail for the wrong reason.
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(interpreter) = &self.interpreter {
            if interpreter.as_os_str().is_empty() {
                return Err(CoreError::Config(
                    "interpreter must not be empty; omit it to run scripts directly".to_string(),
                ));
            }
        }

        if self.unsupported_input_file.trim().is_empty() {
            return Err(CoreError::Config(
                "unsupported_input_file must not be empty".to_string(),
            ));
        }

        if self.invalid_input_path.as_os_str().is_empty() {
            return Err(CoreError::Config(
                "invalid_input_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();

        assert_eq!(config.pipelines_dir, PathBuf::from(DEFAULT_PIPELINES_DIR));
        assert_eq!(config.resources_dir, PathBuf::from(DEFAULT_RESOURCES_DIR));
        assert_eq!(config.interpreter, Some(PathBuf::from("python")));
        assert_eq!(config.timeout(), Some(Duration::from_secs(120)));
        assert_eq!(
            config.unsupported_input_path(),
            PathBuf::from("tests/test_resources/dummy_text.txt")
        );

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_disables_timeout() {
        let config = HarnessConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_validate_rejects_empty_values() {
        let config = HarnessConfig {
            interpreter: Some(PathBuf::new()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = HarnessConfig {
            unsupported_input_file: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipecheck.json");
        fs::write(
            &path,
            r#"{ "pipelines_dir": "/opt/pipelines", "interpreter": null, "timeout_secs": 5 }"#,
        )
        .unwrap();

        let config = HarnessConfig::load_from_file(&path).unwrap();
        assert_eq!(config.pipelines_dir, PathBuf::from("/opt/pipelines"));
        assert_eq!(config.interpreter, None);
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.resources_dir, PathBuf::from(DEFAULT_RESOURCES_DIR));
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipecheck.json");
        fs::write(&path, r#"{ "pipeline_dir": "typo" }"#).unwrap();

        let err = HarnessConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::JsonParse(_)));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = HarnessConfig::load_from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
