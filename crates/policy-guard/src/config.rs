use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_policies_dir")]
    pub policies_dir: PathBuf,
    /// Extra directories searched when a policy is not in `policies_dir`.
    #[serde(default = "default_search_dirs")]
    pub search_dirs: Vec<PathBuf>,
    /// Optional YAML rule set replacing the built-in action lists.
    #[serde(default)]
    pub rules_file: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policies_dir: default_policies_dir(),
            search_dirs: default_search_dirs(),
            rules_file: None,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default-value functions used by serde
// ---------------------------------------------------------------------------

fn default_policies_dir() -> PathBuf {
    PathBuf::from("saved_policies")
}

fn default_search_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("example_policies")]
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Load configuration from a YAML file.
///
/// A missing file yields the default configuration. Nothing is logged here
/// because the subscriber is configured from the result; the caller reports
/// the fallback once logging is up.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

    let config: Config = serde_yml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))?;

    Ok(config)
}

/// Emit the missing-config warning once tracing is initialised.
pub fn warn_if_missing(path: &Path) {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "configuration file not found; using defaults"
        );
    }
}
