//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Summarization provider settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Outgoing email settings
    #[serde(default)]
    pub email: EmailSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Data directory for the summaries database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin allowed by CORS
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (groq)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key
    #[serde(default)]
    pub api_key: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API endpoint (empty = provider default)
    #[serde(default)]
    pub endpoint: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSettings {
    /// SMTP relay host (empty = email sharing disabled)
    #[serde(default)]
    pub host: String,

    /// SMTP relay port
    #[serde(default = "default_email_port")]
    pub port: u16,

    /// Use implicit TLS instead of STARTTLS
    #[serde(default)]
    pub secure: bool,

    /// SMTP username
    #[serde(default)]
    pub user: String,

    /// SMTP password
    #[serde(default)]
    pub pass: String,

    /// Sender address (empty = use `user`)
    #[serde(default)]
    pub from: String,
}

// Default value functions

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "precis", "precis")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/precis"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_llm_provider() -> String {
    "groq".to_string()
}

fn default_llm_model() -> String {
    "mixtral-8x7b-32768".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_email_port() -> u16 {
    587
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_url: default_frontend_url(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: String::new(),
            model: default_llm_model(),
            endpoint: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_email_port(),
            secure: false,
            user: String::new(),
            pass: String::new(),
            from: String::new(),
        }
    }
}

impl EmailSettings {
    /// Whether enough is set to talk to a relay
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty() && !self.user.trim().is_empty() && !self.pass.is_empty()
    }

    /// Sender address, falling back to the SMTP user
    pub fn sender(&self) -> &str {
        if self.from.trim().is_empty() {
            self.user.trim()
        } else {
            self.from.trim()
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::debug!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides(|key| std::env::var(key).ok());
            return Ok(settings);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut settings = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        settings.apply_env_overrides(|key| std::env::var(key).ok());

        Ok(settings)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment variable overrides.
    ///
    /// The API key and email credentials only fill in blanks; `PORT` and
    /// `FRONTEND_URL` always win so deployments can move the listener.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.llm.api_key.trim().is_empty() {
            if let Some(key) = non_empty("GROQ_API_KEY") {
                self.llm.api_key = key;
            }
        }

        if let Some(port) = non_empty("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(url) = non_empty("FRONTEND_URL") {
            self.server.frontend_url = url;
        }

        if self.email.host.trim().is_empty() {
            if let Some(host) = non_empty("EMAIL_HOST") {
                self.email.host = host;
            }
        }
        if let Some(port) = non_empty("EMAIL_PORT").and_then(|p| p.trim().parse().ok()) {
            self.email.port = port;
        }
        if self.email.user.trim().is_empty() {
            if let Some(user) = non_empty("EMAIL_USER") {
                self.email.user = user;
            }
        }
        if self.email.pass.is_empty() {
            if let Some(pass) = non_empty("EMAIL_PASS") {
                self.email.pass = pass;
            }
        }
        if self.email.from.trim().is_empty() {
            if let Some(from) = non_empty("EMAIL_FROM") {
                self.email.from = from;
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "precis", "precis")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the database path
    pub fn database_path(&self) -> PathBuf {
        self.general.data_dir.join("precis.db")
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .with_context(|| format!("Invalid server address: {}", addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_groq_mixtral() {
        let settings = Settings::default();
        assert_eq!(settings.llm.provider, "groq");
        assert_eq!(settings.llm.model, "mixtral-8x7b-32768");
        assert_eq!(settings.llm.max_tokens, 2048);
        assert_eq!(settings.server.port, 5000);
        assert!(!settings.email.is_configured());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings = Settings::from_toml("[server]\nport = 8080\n").unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.llm.provider, "groq");
    }

    #[test]
    fn env_fills_missing_credentials() {
        let mut settings = Settings::default();
        settings.apply_env_overrides(env(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("PORT", "7000"),
            ("EMAIL_HOST", "smtp.example.com"),
            ("EMAIL_USER", "bot@example.com"),
            ("EMAIL_PASS", "secret"),
        ]));

        assert_eq!(settings.llm.api_key, "gsk_test");
        assert_eq!(settings.server.port, 7000);
        assert!(settings.email.is_configured());
        assert_eq!(settings.email.sender(), "bot@example.com");
    }

    #[test]
    fn env_does_not_replace_configured_key() {
        let mut settings = Settings::default();
        settings.llm.api_key = "from-file".to_string();
        settings.apply_env_overrides(env(&[("GROQ_API_KEY", "from-env"), ("PORT", "nope")]));

        assert_eq!(settings.llm.api_key, "from-file");
        assert_eq!(settings.server.port, 5000);
    }
}
