//! Configuration — optional ~/.nutrilens/config.yaml plus command-line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Classification endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/v1/nutrition/";

/// The NutriLens data directory (`~/.nutrilens`).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".nutrilens")
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_store_path() -> PathBuf {
    config_dir().join("storage.yaml")
}

fn default_log_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Settings loaded from ~/.nutrilens/config.yaml.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Classification service URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Where the metric snapshot is stored.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Directory for rolling log files.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Request timeout. Unset leaves it to the transport.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            store_path: default_store_path(),
            log_dir: default_log_dir(),
            timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Default config file path.
    pub fn default_path() -> PathBuf {
        config_dir().join("config.yaml")
    }

    /// Load from `path`. A missing or malformed file yields defaults.
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_yaml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Apply command-line overrides on top of file settings.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(endpoint) = &cli.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(store) = &cli.store {
            self.store_path = store.clone();
        }
        if let Some(log_dir) = &cli.log_dir {
            self.log_dir = log_dir.clone();
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Track meal nutrition from photos against daily goals.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "nutrilens", version)]
pub struct Cli {
    /// Config file (defaults to ~/.nutrilens/config.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Classification service URL.
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Metric storage file.
    #[arg(long)]
    pub store: Option<PathBuf>,
    /// Log directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
    /// Upload this image right after start-up.
    #[arg(long)]
    pub image: Option<PathBuf>,
}

impl Cli {
    /// Resolve the effective configuration.
    pub fn resolve(&self) -> AppConfig {
        let path = self.config.clone().unwrap_or_else(AppConfig::default_path);
        AppConfig::load(&path).with_overrides(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.store_path.ends_with(".nutrilens/storage.yaml"));
        assert!(config.timeout().is_none());
    }

    #[test]
    fn parse_yaml_config() {
        let yaml = r#"
endpoint: http://classifier.local/api
store_path: /tmp/nl/storage.yaml
timeout_secs: 30
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.endpoint, "http://classifier.local/api");
        assert_eq!(config.store_path, PathBuf::from("/tmp/nl/storage.yaml"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.log_dir, default_log_dir());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.yaml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "endpoint: [unterminated").unwrap();
        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }

    #[test]
    fn cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "endpoint: http://from-file/\ntimeout_secs: 5\n").unwrap();

        let cli = Cli::parse_from([
            "nutrilens",
            "--config",
            path.to_str().unwrap(),
            "--endpoint",
            "http://from-cli/",
            "--store",
            "/tmp/s.yaml",
        ]);
        let config = cli.resolve();
        assert_eq!(config.endpoint, "http://from-cli/");
        assert_eq!(config.store_path, PathBuf::from("/tmp/s.yaml"));
        assert_eq!(config.timeout_secs, Some(5));
    }

    #[test]
    fn cli_image_flag() {
        let cli = Cli::parse_from(["nutrilens", "--image", "meal.jpg"]);
        assert_eq!(cli.image, Some(PathBuf::from("meal.jpg")));
    }
}
