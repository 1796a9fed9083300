use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

use crate::fs_util::home_dir;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Top-level configuration loaded from TOML.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FlexConfig {
    pub server: ServerConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Where uploaded files are written and served from.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    /// Pre-built browser bundle. Served as the fallback when it exists.
    #[serde(default = "default_client_dist")]
    pub client_dist: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            uploads_dir: default_uploads_dir(),
            client_dist: default_client_dist(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_port() -> u16 {
    5173
}
fn default_bind() -> String {
    "127.0.0.1".into()
}
fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_client_dist() -> PathBuf {
    PathBuf::from("client").join("dist")
}
fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
}

impl ChatConfig {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base().trim_end_matches('/'))
    }
}

/// Load configuration from file or use defaults.
///
/// Search order:
/// 1. `FLEXCHAT_CONFIG` env var
/// 2. `~/.flexchat/config.toml`
/// 3. Zero-config defaults (no file needed)
///
/// Unset chat values are then filled from `OPENAI_API_KEY`, `OPENAI_MODEL`
/// and `OPENAI_BASE_URL`.
pub fn load() -> anyhow::Result<FlexConfig> {
    let path = config_path();

    let mut config = if path.exists() {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        let config: FlexConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config at {}: {e}", path.display()))?;
        info!("loaded config from {}", path.display());
        config
    } else {
        info!("no config file found, using zero-config defaults");
        FlexConfig::default()
    };

    resolve_env(&mut config);
    validate(&config)?;
    Ok(config)
}

fn config_path() -> PathBuf {
    if let Some(path) = env_value("FLEXCHAT_CONFIG") {
        return PathBuf::from(path);
    }
    home_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".flexchat")
        .join("config.toml")
}

/// Non-empty value of an environment variable.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Fill chat settings the config file left unset from the environment.
pub fn resolve_env(config: &mut FlexConfig) {
    if config.chat.api_key.is_none() {
        config.chat.api_key = env_value("OPENAI_API_KEY");
    }
    if config.chat.model.is_none() {
        config.chat.model = env_value("OPENAI_MODEL");
    }
    if config.chat.api_base.is_none() {
        config.chat.api_base = env_value("OPENAI_BASE_URL");
    }
}

/// Validate the config and return clear error messages.
pub fn validate(config: &FlexConfig) -> anyhow::Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("server.port must be > 0");
    }

    if config.server.max_upload_bytes == 0 {
        anyhow::bail!("server.max_upload_bytes must be > 0");
    }

    if config.chat.model().trim().is_empty() {
        anyhow::bail!("chat.model cannot be empty");
    }

    let base = config.chat.api_base();
    let parsed = url::Url::parse(base)
        .map_err(|e| anyhow::anyhow!("invalid chat.api_base '{base}': {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!(
            "invalid chat.api_base '{base}': scheme must be http or https, got '{}'",
            parsed.scheme()
        );
    }

    Ok(())
}
