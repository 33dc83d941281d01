use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PatchError;

/// Template patched when nothing else is configured
pub const DEFAULT_TEMPLATE_PATH: &str = "nginx/conf.d/default.conf.template";

/// Container restarted after a successful patch
pub const DEFAULT_CONTAINER_NAME: &str = "docker-nginx-1";

/// Lines of unified diff shown before writing
pub const DEFAULT_PREVIEW_LINES: usize = 20;

/// Backend used to reach the container engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Docker Engine API over the local socket
    Api,
    /// The `docker` command line client
    Cli,
}

impl EngineKind {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "api" => Some(EngineKind::Api),
            "cli" => Some(EngineKind::Cli),
            _ => None,
        }
    }
}

/// A single literal substitution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

impl Replacement {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Everything a patch run needs to know
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchConfig {
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,
    #[serde(default = "default_container_name")]
    pub container_name: String,
    #[serde(default = "default_replacements")]
    pub replacements: Vec<Replacement>,
    #[serde(default = "default_preview_lines")]
    pub preview_lines: usize,
    #[serde(default = "default_engine")]
    pub engine: EngineKind,
    #[serde(default)]
    pub disable_restart: bool,
}

// Default function implementations
fn default_template_path() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATE_PATH)
}

fn default_container_name() -> String {
    DEFAULT_CONTAINER_NAME.to_string()
}

fn default_replacements() -> Vec<Replacement> {
    vec![
        Replacement::new("http://api:5001", "http://docker-api-1:5004"),
        Replacement::new("http://web:3000", "http://docker-web-1:3000"),
    ]
}

fn default_preview_lines() -> usize {
    DEFAULT_PREVIEW_LINES
}

fn default_engine() -> EngineKind {
    if cfg!(feature = "docker-api") {
        EngineKind::Api
    } else {
        EngineKind::Cli
    }
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            container_name: default_container_name(),
            replacements: default_replacements(),
            preview_lines: default_preview_lines(),
            engine: default_engine(),
            disable_restart: false,
        }
    }
}

impl PatchConfig {
    /// Load configuration from a JSON file when one is given, then apply environment overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) if path.exists() => {
                info!("Loading patch configuration from {}", path.display());
                Self::load_from_json(path)?
            }
            Some(path) => {
                warn!("Config file {} not found, using built-in defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a JSON config file; absent fields take their defaults
    pub fn load_from_json(path: &Path) -> Result<Self> {
        let file_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: PatchConfig = serde_json::from_str(&file_content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Override settings from environment variables
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("TEMPLATE_PATH") {
            self.template_path = PathBuf::from(value);
        }

        if let Ok(value) = env::var("CONTAINER_NAME") {
            self.container_name = value;
        }

        if let Ok(value) = env::var("DISABLE_RESTART") {
            self.disable_restart = value.to_lowercase() == "true";
        }

        if let Ok(value) = env::var("PREVIEW_LINES") {
            match value.parse::<usize>() {
                Ok(lines) => self.preview_lines = lines,
                Err(_) => warn!("Ignoring invalid PREVIEW_LINES value: {}", value),
            }
        }

        if let Ok(value) = env::var("CONTAINER_ENGINE") {
            match EngineKind::parse(&value) {
                Some(engine) => self.engine = engine,
                None => warn!("Ignoring unknown CONTAINER_ENGINE value: {}", value),
            }
        }
    }

    /// Reject tables that could not be applied idempotently
    pub fn validate(&self) -> std::result::Result<(), PatchError> {
        if self.container_name.trim().is_empty() {
            return Err(PatchError::InvalidConfig("container name is empty".to_string()));
        }

        for replacement in &self.replacements {
            if replacement.from.is_empty() {
                return Err(PatchError::InvalidConfig("replacement token is empty".to_string()));
            }
        }

        // A second run must find nothing left to replace
        for replacement in &self.replacements {
            if let Some(other) = self
                .replacements
                .iter()
                .find(|other| replacement.to.contains(other.from.as_str()))
            {
                return Err(PatchError::InvalidConfig(format!(
                    "replacement value {} reintroduces token {}",
                    replacement.to, other.from
                )));
            }
        }

        Ok(())
    }

    /// Display configuration in a human-readable format
    pub fn display(&self) {
        info!("== Patch Configuration ==");
        info!("Template: {}", self.template_path.display());
        info!("Container: {}", self.container_name);
        info!("Engine: {:?}", self.engine);
        info!("Disable Restart: {}", self.disable_restart);
        info!("Preview Lines: {}", self.preview_lines);
        info!("Replacements:");
        for replacement in &self.replacements {
            info!("  {} -> {}", replacement.from, replacement.to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_local_deployment() {
        let config = PatchConfig::default();

        assert_eq!(config.template_path, PathBuf::from("nginx/conf.d/default.conf.template"));
        assert_eq!(config.container_name, "docker-nginx-1");
        assert_eq!(config.preview_lines, 20);
        assert_eq!(config.replacements[0], Replacement::new("http://api:5001", "http://docker-api-1:5004"));
        assert_eq!(config.replacements[1], Replacement::new("http://web:3000", "http://docker-web-1:3000"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_config_fills_missing_fields_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patch.json");
        fs::write(
            &path,
            r#"{
                "container_name": "edge-proxy",
                "engine": "cli",
                "replacements": [{ "from": "http://old:1", "to": "http://new:2" }]
            }"#,
        )
        .unwrap();

        let config = PatchConfig::load_from_json(&path).unwrap();

        assert_eq!(config.container_name, "edge-proxy");
        assert_eq!(config.engine, EngineKind::Cli);
        assert_eq!(config.replacements, vec![Replacement::new("http://old:1", "http://new:2")]);
        assert_eq!(config.template_path, PathBuf::from(DEFAULT_TEMPLATE_PATH));
        assert_eq!(config.preview_lines, DEFAULT_PREVIEW_LINES);
        assert!(!config.disable_restart);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patch.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(PatchConfig::load_from_json(&path).is_err());
    }

    #[test]
    fn replacement_that_reintroduces_a_token_is_rejected() {
        let config = PatchConfig {
            replacements: vec![Replacement::new("http://api", "http://api-internal")],
            ..PatchConfig::default()
        };

        assert!(matches!(config.validate(), Err(PatchError::InvalidConfig(_))));
    }

    #[test]
    fn empty_token_is_rejected() {
        let config = PatchConfig {
            replacements: vec![Replacement::new("", "x")],
            ..PatchConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_container_name_is_rejected() {
        let config = PatchConfig {
            container_name: "  ".to_string(),
            ..PatchConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn engine_names_parse_case_insensitively() {
        assert_eq!(EngineKind::parse("API"), Some(EngineKind::Api));
        assert_eq!(EngineKind::parse("cli"), Some(EngineKind::Cli));
        assert_eq!(EngineKind::parse("podman"), None);
    }
}
