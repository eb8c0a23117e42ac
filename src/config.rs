//! Configuration management
//!
//! Defaults, then an optional YAML file, then `STUDY_BUDDY_*` environment
//! variables, then CLI flags. Credentials never live in the file; the file
//! only names the environment variable that holds them.

use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,

    /// Adds `Secure` to the session cookie
    #[serde(default)]
    pub secure_cookies: bool,

    /// Sessions untouched for this long are torn down
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,

    /// Upper bound on live sessions; the least recently seen one is
    /// dropped to make room
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_session_idle_minutes() -> u64 {
    30
}

fn default_max_sessions() -> usize {
    10_000
}

impl ServerConfig {
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes.saturating_mul(60))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            secure_cookies: false,
            session_idle_minutes: default_session_idle_minutes(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Which completion API to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-1.5-flash",
        }
    }

    pub fn default_api_base(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    pub fn default_api_key_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(ConfigError::Invalid(format!(
                "Invalid provider type: {}. Must be one of: openai, gemini",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default)]
    pub provider: ProviderKind,

    /// Falls back to the provider's default model when unset
    #[serde(default)]
    pub model: Option<String>,

    /// Override for the API base URL (useful for tests and proxies)
    #[serde(default)]
    pub api_base: Option<String>,

    /// Name of the environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            api_base: None,
            api_key_env: None,
            timeout_seconds: default_timeout_seconds(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl CompletionConfig {
    /// Switches provider. When the provider actually changes, any model,
    /// base URL or key variable set for the old one is dropped so the new
    /// provider's defaults apply.
    pub fn set_provider(&mut self, provider: ProviderKind) {
        if provider == self.provider {
            return;
        }
        if self.model.is_some() || self.api_base.is_some() || self.api_key_env.is_some() {
            tracing::info!(
                from = ?self.provider,
                to = ?provider,
                "Provider overridden; using the new provider's model, base URL and key variable"
            );
        }
        self.provider = provider;
        self.model = None;
        self.api_base = None;
        self.api_key_env = None;
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn api_base(&self) -> String {
        self.api_base
            .as_deref()
            .unwrap_or(self.provider.default_api_base())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn api_key_env(&self) -> String {
        self.api_key_env
            .clone()
            .unwrap_or_else(|| self.provider.default_api_key_env().to_string())
    }

    /// Reads the credential from the environment; `None` when absent or blank.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(self.api_key_env())
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// How many of the most recent journal entries go into the prompt
    #[serde(default = "default_journal_context_entries")]
    pub journal_context_entries: usize,
}

fn default_journal_context_entries() -> usize {
    5
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            journal_context_entries: default_journal_context_entries(),
        }
    }
}

impl Config {
    /// Loads configuration from `path` (if it exists) and applies overrides.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed, or if
    /// a CLI override is malformed.
    pub fn load(path: &str, cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli)?;

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(address) = std::env::var("STUDY_BUDDY_ADDRESS") {
            self.server.address = address;
        }

        if let Ok(provider) = std::env::var("STUDY_BUDDY_PROVIDER") {
            match provider.parse() {
                Ok(kind) => self.completion.set_provider(kind),
                Err(_) => tracing::warn!("Invalid STUDY_BUDDY_PROVIDER: {}", provider),
            }
        }

        if let Ok(model) = std::env::var("STUDY_BUDDY_MODEL") {
            self.completion.model = Some(model);
        }

        if let Ok(api_base) = std::env::var("STUDY_BUDDY_API_BASE") {
            self.completion.api_base = Some(api_base);
        }

        if let Ok(minutes) = std::env::var("STUDY_BUDDY_SESSION_IDLE_MINUTES") {
            match minutes.parse() {
                Ok(value) => self.server.session_idle_minutes = value,
                Err(_) => tracing::warn!("Invalid STUDY_BUDDY_SESSION_IDLE_MINUTES: {}", minutes),
            }
        }

        if let Ok(timeout) = std::env::var("STUDY_BUDDY_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.completion.timeout_seconds = value,
                Err(_) => tracing::warn!("Invalid STUDY_BUDDY_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(entries) = std::env::var("STUDY_BUDDY_JOURNAL_CONTEXT_ENTRIES") {
            match entries.parse() {
                Ok(value) => self.feedback.journal_context_entries = value,
                Err(_) => tracing::warn!(
                    "Invalid STUDY_BUDDY_JOURNAL_CONTEXT_ENTRIES: {}",
                    entries
                ),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) -> Result<(), ConfigError> {
        if let Some(address) = &cli.address {
            self.server.address = address.clone();
        }
        if let Some(provider) = &cli.provider {
            self.completion.set_provider(provider.parse()?);
        }
        if let Some(model) = &cli.model {
            self.completion.model = Some(model.clone());
        }
        Ok(())
    }

    /// Ensures values are usable before the server starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.completion.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "completion.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.completion.model().trim().is_empty() {
            return Err(ConfigError::Invalid(
                "completion.model cannot be empty".to_string(),
            ));
        }

        if self.server.session_idle_minutes == 0 {
            return Err(ConfigError::Invalid(
                "server.session_idle_minutes must be greater than 0".to_string(),
            ));
        }

        if self.server.max_sessions == 0 {
            return Err(ConfigError::Invalid(
                "server.max_sessions must be greater than 0".to_string(),
            ));
        }

        if self.feedback.journal_context_entries == 0 {
            return Err(ConfigError::Invalid(
                "feedback.journal_context_entries must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.address.parse().map_err(|_| {
            ConfigError::Invalid(format!("Invalid server address: {}", self.server.address))
        })
    }
}
