use anyhow::Context;
use scrub_core::{SourceId, Strategy};
use scrub_security::OverlapPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for scrub
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub redaction: RedactionConfig,

    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default = "default_connectors")]
    pub connectors: Vec<ConnectorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Value expected in the `x-api-key` header. Unset means every guarded
    /// request is refused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedactionConfig {
    #[serde(default)]
    pub strategy: Strategy,

    #[serde(default)]
    pub overlap: OverlapPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    #[default]
    Pattern,
    Llm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default)]
    pub kind: DetectorKind,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the model API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-call limit; 0 disables the limit
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    Memory,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub source: SourceId,

    pub kind: ConnectorKind,

    /// Required for `http` connectors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Environment variable holding a bearer token for `http` connectors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            redaction: RedactionConfig::default(),
            detector: DetectorConfig::default(),
            connectors: default_connectors(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            allowed_origins: default_origins(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            kind: DetectorKind::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connectors() -> Vec<ConnectorConfig> {
    vec![ConnectorConfig {
        source: SourceId::Demo,
        kind: ConnectorKind::Memory,
        base_url: None,
        token_env: None,
        timeout_secs: default_timeout_secs(),
    }]
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(&path, content)?;
            Ok(config)
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "scrub", "scrub") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.scrub/config.toml")
        }
    }

    /// Apply `SCRUB_*` environment variables on top of the file values
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("SCRUB_API_KEY") {
            self.server.api_key = Some(key);
        }
        // A blank key is no key
        if self.server.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.server.api_key = None;
        }
        if let Some(strategy) = lookup("SCRUB_STRATEGY") {
            self.redaction.strategy = strategy
                .parse::<Strategy>()
                .with_context(|| "SCRUB_STRATEGY must be one of mask, tokenize, hash")?;
        }
        if let Some(origins) = lookup("SCRUB_ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(host) = lookup("SCRUB_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SCRUB_PORT") {
            self.server.port = port
                .parse::<u16>()
                .with_context(|| format!("SCRUB_PORT is not a port number: {}", port))?;
        }
        Ok(())
    }
}
