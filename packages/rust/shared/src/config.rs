//! Application configuration for ContentSynth.
//!
//! User config lives at `~/.contentsynth/contentsynth.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::types::{Channel, RewriteOptions, Voice};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "contentsynth.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".contentsynth";

// ---------------------------------------------------------------------------
// Config structs (matching contentsynth.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generative model settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Content proxy settings.
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Process monitor settings.
    #[serde(default)]
    pub process: ProcessConfig,

    /// Rewrite defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// REST API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Thinking budget for deconstruction requests (0 disables thinking).
    #[serde(default)]
    pub thinking_budget: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            api_base: default_api_base(),
            thinking_budget: 0,
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

/// `[proxy]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Base URL of the CORS relay; requests go to `<base_url>/get?url=...`.
    #[serde(default = "default_proxy_base")]
    pub base_url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: default_proxy_base(),
        }
    }
}

fn default_proxy_base() -> String {
    "https://api.allorigins.win".into()
}

/// `[process]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Elapsed seconds after which the advisory "paused" banner appears.
    #[serde(default = "default_pause_after")]
    pub pause_after_secs: u64,

    /// Interval between monitor ticks.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            pause_after_secs: default_pause_after(),
            tick_millis: default_tick_millis(),
        }
    }
}

fn default_pause_after() -> u64 {
    35
}
fn default_tick_millis() -> u64 {
    1000
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub channel: Channel,
    #[serde(default)]
    pub voice: Voice,
}

impl From<&AppConfig> for RewriteOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            channel: config.defaults.channel,
            voice: config.defaults.voice,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.contentsynth/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| SynthError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.contentsynth/contentsynth.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SynthError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SynthError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SynthError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SynthError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SynthError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the Gemini API key from the configured env var.
///
/// A missing key is fatal at startup.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.gemini.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(SynthError::config(format!(
            "Gemini API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://aistudio.google.com/apikey"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("GEMINI_API_KEY"));
        assert!(toml_str.contains("api.allorigins.win"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.process.pause_after_secs, 35);
        assert_eq!(parsed.gemini.model, "gemini-2.5-flash");
        assert_eq!(parsed.defaults.channel, Channel::BlogPost);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[proxy]
base_url = "http://localhost:8080"

[defaults]
channel = "LinkedIn"
voice = "Creative"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.proxy.base_url, "http://localhost:8080");
        assert_eq!(config.process.tick_millis, 1000);

        let opts = RewriteOptions::from(&config);
        assert_eq!(opts.channel, Channel::LinkedIn);
        assert_eq!(opts.voice, Voice::Creative);
    }

    #[test]
    fn api_key_resolution_fails_when_unset() {
        let mut config = AppConfig::default();
        // Unique env var name to avoid interfering with other tests
        config.gemini.api_key_env = "CS_TEST_NONEXISTENT_KEY_12345".into();
        let result = resolve_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }

    #[test]
    fn load_config_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[gemini\nmodel = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, SynthError::Config { .. }));
    }

    #[test]
    fn load_config_from_reads_a_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contentsynth.toml");
        std::fs::write(&path, "[process]\npause_after_secs = 10\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.process.pause_after_secs, 10);
        assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
    }
}
