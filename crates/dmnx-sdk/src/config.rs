//! Executor configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Defaults applied to every invocation unless a command-line flag overrides them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Load sibling model files next to the main model
    pub auto_import: bool,

    /// Check inputs and results against declared types
    pub typecheck: bool,

    /// File extension of model documents, without the dot
    pub model_extension: String,

    /// Default log filter
    pub log_level: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            auto_import: true,
            typecheck: true,
            model_extension: "dmn".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl ExecutorConfig {
    /// Load configuration from `.env`, `dmnx.toml` and `DMNX_*` variables
    pub fn load() -> Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        Self::load_from(Path::new("dmnx"))
    }

    /// Load configuration from an optional file (extension inferred) and the environment
    pub fn load_from(file: &Path) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&file.to_string_lossy()).required(false))
            .add_source(config::Environment::with_prefix("DMNX"))
            .build()?;
        let loaded: Self = config.try_deserialize()?;
        tracing::debug!(?loaded, "configuration loaded");
        Ok(loaded)
    }

    /// Per-invocation options seeded with these defaults
    pub fn run_options(&self, model_path: impl Into<PathBuf>) -> RunOptions {
        RunOptions {
            auto_import: self.auto_import,
            typecheck: self.typecheck,
            ..RunOptions::new(model_path)
        }
    }
}

/// One command invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Main model document
    pub model_path: PathBuf,

    /// Extra model files or directories
    pub imports: Vec<PathBuf>,

    pub auto_import: bool,
    pub typecheck: bool,

    /// Explicit model name, overriding file-name based selection
    pub model_name: Option<String>,

    /// Evaluate only this decision
    pub decision: Option<String>,

    /// Evaluate through this decision service
    pub service: Option<String>,

    /// Input document text; `None` means an empty object
    pub input: Option<String>,
}

impl RunOptions {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            imports: Vec::new(),
            auto_import: true,
            typecheck: true,
            model_name: None,
            decision: None,
            service: None,
            input: None,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_import(mut self, path: impl Into<PathBuf>) -> Self {
        self.imports.push(path.into());
        self
    }

    pub fn with_decision(mut self, name: impl Into<String>) -> Self {
        self.decision = Some(name.into());
        self
    }

    pub fn with_service(mut self, name: impl Into<String>) -> Self {
        self.service = Some(name.into());
        self
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_executor_config_default() {
        let config = ExecutorConfig::default();

        assert!(config.auto_import);
        assert!(config.typecheck);
        assert_eq!(config.model_extension, "dmn");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("dmnx.toml"),
            "auto_import = false\nmodel_extension = \"xml\"\n",
        )
        .unwrap();

        let config = ExecutorConfig::load_from(&dir.path().join("dmnx")).unwrap();
        assert!(!config.auto_import);
        assert_eq!(config.model_extension, "xml");
        // unset keys keep their defaults
        assert!(config.typecheck);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ExecutorConfig::load_from(&dir.path().join("absent")).unwrap();
        assert_eq!(config.model_extension, "dmn");
    }

    #[test]
    fn test_run_options_seeded_from_config() {
        let config = ExecutorConfig {
            typecheck: false,
            ..ExecutorConfig::default()
        };
        let options = config.run_options("model.dmn").with_decision("Eligible");

        assert_eq!(options.model_path, PathBuf::from("model.dmn"));
        assert!(!options.typecheck);
        assert!(options.auto_import);
        assert_eq!(options.decision.as_deref(), Some("Eligible"));
        assert!(options.input.is_none());
    }
}
