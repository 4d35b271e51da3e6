use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use sa_backend::{anthropic, openai, AnthropicClient, Backend, OpenAiClient, DEFAULT_SYSTEM_PROMPT};

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub runner: RunnerConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Which backend to use: "openai" or "anthropic".
    pub default: String,
    /// System instruction sent with every chat request. Empty disables it.
    pub system_prompt: String,
    pub openai: OpenAiConfig,
    pub anthropic: AnthropicConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            default: "openai".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            openai: OpenAiConfig::default(),
            anthropic: AnthropicConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Command to run to get the API key. Run via `sh -c`.
    pub api_key_cmd: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_cmd: None,
            model: openai::DEFAULT_MODEL.to_string(),
            base_url: openai::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl OpenAiConfig {
    /// Resolve the API key from api_key_cmd or OPENAI_API_KEY.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        resolve_api_key(self.api_key_cmd.as_deref(), "OPENAI_API_KEY")
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnthropicConfig {
    /// Command to run to get the API key. Run via `sh -c`.
    pub api_key_cmd: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_cmd: None,
            model: anthropic::DEFAULT_MODEL.to_string(),
            base_url: anthropic::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AnthropicConfig {
    /// Resolve the API key from api_key_cmd or ANTHROPIC_API_KEY.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        resolve_api_key(self.api_key_cmd.as_deref(), "ANTHROPIC_API_KEY")
    }
}

impl BackendConfig {
    /// Build the configured chat backend. Fails when the credential is absent.
    pub fn build(&self) -> Result<Backend, ConfigError> {
        match self.default.as_str() {
            "openai" => {
                let key = self.openai.resolve_api_key()?;
                let client = OpenAiClient::new(key)?
                    .with_model(&self.openai.model)
                    .with_base_url(&self.openai.base_url)
                    .with_system_prompt(&self.system_prompt);
                Ok(Backend::OpenAi(client))
            }
            "anthropic" => {
                let key = self.anthropic.resolve_api_key()?;
                let client = AnthropicClient::new(key)?
                    .with_model(&self.anthropic.model)
                    .with_base_url(&self.anthropic.base_url)
                    .with_system_prompt(&self.system_prompt);
                Ok(Backend::Anthropic(client))
            }
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }

    /// Model name of the selected backend, for the startup banner.
    pub fn model(&self) -> &str {
        match self.default.as_str() {
            "anthropic" => &self.anthropic.model,
            _ => &self.openai.model,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Program that interprets the fetched source.
    pub interpreter: String,
    /// Suffix of the temporary script file.
    pub file_suffix: String,
    /// Wall-clock limit for one script run.
    pub timeout_secs: u64,
    /// Arguments for a syntax check run before the script. Empty disables it.
    pub check_args: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            file_suffix: ".py".to_string(),
            timeout_secs: 30,
            check_args: vec!["-m".to_string(), "py_compile".to_string()],
        }
    }
}

impl RunnerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    /// Limit for one remote fetch, independent of the execution timeout.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn load_or_default() -> Self {
        Self::load_from(&config_path())
    }

    /// Read the TOML file at `path`. A missing file yields defaults; a
    /// malformed one yields defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "config_loaded");
                    config
                }
                Err(e) => {
                    eprintln!("warning: failed to parse {}: {e}", path.display());
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }
}

/// Run `cmd` and return its trimmed stdout if it succeeded with output,
/// otherwise read `env_var`.
fn resolve_api_key(cmd: Option<&str>, env_var: &'static str) -> Result<String, ConfigError> {
    if let Some(cmd) = cmd {
        match Command::new("sh").arg("-c").arg(cmd).output() {
            Ok(output) if output.status.success() => {
                let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !key.is_empty() {
                    return Ok(key);
                }
            }
            Ok(output) => {
                tracing::warn!(status = %output.status, "api_key_cmd_failed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "api_key_cmd_spawn_failed");
            }
        }
    }

    std::env::var(env_var)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or(ConfigError::MissingCredential { env_var })
}

pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("scriptagent").join("config.toml")
}
