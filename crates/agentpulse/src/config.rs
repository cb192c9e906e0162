//! Layered server configuration.
//!
//! Built-in defaults, then the TOML file, then `AGENTPULSE__SECTION__KEY`
//! environment variables. CLI flags are applied by the binary on top.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use agentpulse_protocol::AgentId;
use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::providers::{self, DEFAULT_MAX_TOKENS};
use crate::session::{AgentModels, DEFAULT_LOG_CAPACITY};

pub const APP_NAME: &str = "agentpulse";
const ENV_PREFIX: &str = "AGENTPULSE";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub sessions: SessionsConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the dashboard's static files, served as the fallback route.
    pub static_dir: Option<PathBuf>,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Activity log entries kept per session.
    pub log_capacity: usize,
    /// Sessions with no agent activity for this long are evicted.
    pub idle_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    /// Output token ceiling sent with every completion request.
    pub max_tokens: u32,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            idle_ttl_secs: 3600,
            sweep_interval_secs: 3600,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl SessionsConfig {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub request_timeout_secs: u64,
    pub anthropic: ProviderEndpoint,
    pub openai: ProviderEndpoint,
    pub google: ProviderEndpoint,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            anthropic: ProviderEndpoint::new(providers::anthropic::DEFAULT_BASE_URL, AgentId::Claude),
            openai: ProviderEndpoint::new(providers::openai::DEFAULT_BASE_URL, AgentId::Gpt4),
            google: ProviderEndpoint::new(providers::gemini::DEFAULT_BASE_URL, AgentId::Gemini),
        }
    }
}

impl ProvidersConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Model used for each agent in new sessions.
    pub fn agent_models(&self) -> AgentModels {
        AgentModels::default()
            .with_model(AgentId::Claude, &self.anthropic.model)
            .with_model(AgentId::Gpt4, &self.openai.model)
            .with_model(AgentId::Gemini, &self.google.model)
    }
}

/// Where a vendor lives and which model its agent uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub model: String,
}

impl ProviderEndpoint {
    fn new(base_url: &str, agent: AgentId) -> Self {
        Self {
            base_url: base_url.to_string(),
            model: agent.default_model().to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` and the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load configuration with an explicit environment instead of the
    /// process environment.
    pub fn load_with_env(path: &Path, env: Option<HashMap<String, String>>) -> Result<Self> {
        let port = match &env {
            Some(vars) => vars.get("PORT").cloned(),
            None => env::var("PORT").ok(),
        }
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

        let defaults = ProvidersConfig::default();
        let built = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("server.port", i64::from(port))?
            .set_default("providers.anthropic.base_url", defaults.anthropic.base_url)?
            .set_default("providers.anthropic.model", defaults.anthropic.model)?
            .set_default("providers.openai.base_url", defaults.openai.base_url)?
            .set_default("providers.openai.model", defaults.openai.model)?
            .set_default("providers.google.base_url", defaults.google.base_url)?
            .set_default("providers.google.model", defaults.google.model)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(env),
            )
            .build()
            .with_context(|| format!("reading configuration from {}", path.display()))?;

        built
            .try_deserialize()
            .context("deserializing configuration")
    }

    /// Load `path`, writing the defaults there first if it does not exist.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            write_default_config(path)?;
        }
        Self::load(path)
    }
}

pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }

    let toml = toml::to_string_pretty(&AppConfig::default())
        .context("serializing default config to TOML")?;
    let body = format!(
        "# Configuration for {APP_NAME}\n# File: {}\n\n{toml}",
        path.display()
    );
    fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))
}

/// `$XDG_CONFIG_HOME/agentpulse/config.toml`, falling back to the platform
/// config directory.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(default_config_dir()?.join("config.toml"))
}

fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(dir) = dirs::config_dir() {
        return Ok(dir.join(APP_NAME));
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}
