//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::InputPolicy;

/// Top-level clinscore configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinscoreConfig {
    /// How missing numeric inputs are handled.
    #[serde(default)]
    pub input_policy: InputPolicy,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report format used by `run` when none is given.
    #[serde(default = "default_format")]
    pub default_format: String,
    /// Minimum band-rank increase reported as an escalation.
    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: u8,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./clinscore-results")
}
fn default_format() -> String {
    "json".to_string()
}
fn default_escalation_threshold() -> u8 {
    1
}

impl Default for ClinscoreConfig {
    fn default() -> Self {
        Self {
            input_policy: InputPolicy::default(),
            output_dir: default_output_dir(),
            default_format: default_format(),
            escalation_threshold: default_escalation_threshold(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `clinscore.toml` in the current directory
/// 2. `~/.config/clinscore/config.toml`
///
/// Environment variable overrides: `CLINSCORE_INPUT_POLICY`, `CLINSCORE_OUTPUT_DIR`.
pub fn load_config() -> Result<ClinscoreConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ClinscoreConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("clinscore.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClinscoreConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));

    Ok(config)
}

/// Parse a config document.
pub fn parse_config(content: &str) -> Result<ClinscoreConfig> {
    Ok(toml::from_str(content)?)
}

fn apply_env_overrides(config: &mut ClinscoreConfig) -> Result<()> {
    if let Ok(policy) = std::env::var("CLINSCORE_INPUT_POLICY") {
        config.input_policy = policy
            .parse()
            .map_err(anyhow::Error::msg)
            .context("invalid CLINSCORE_INPUT_POLICY")?;
    }
    if let Ok(dir) = std::env::var("CLINSCORE_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("clinscore"))
}

/// The config file `clinscore init` writes.
pub const DEFAULT_CONFIG_TOML: &str = r#"# clinscore configuration

# "strict" rejects cases with missing required inputs; "lenient" fills
# baselines and records a warning per defaulted field.
input_policy = "strict"

output_dir = "./clinscore-results"

# json, html or all
default_format = "json"

# Minimum band-rank increase reported by `clinscore compare`.
escalation_threshold = 1
"#;
