//! `frazeo.toml` loading and environment overrides.

use frazeo_bot::SearchSettings;
use frazeo_channels::DEFAULT_API_BASE;
use frazeo_core::{FrazeoError, FrazeoResult};
use frazeo_session::{Salt, SessionLimits};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG: &str = "frazeo.toml";

#[derive(Debug, Default, Deserialize)]
pub struct FrazeoConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Asset locations. Relative paths are resolved against the config file's
/// directory.
#[derive(Debug, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_corpus")]
    pub corpus: PathBuf,
    #[serde(default = "default_model")]
    pub model: PathBuf,
    #[serde(default = "default_index")]
    pub index: PathBuf,
    /// `tokenizer.json`; the whitespace tokenizer is used when unset.
    #[serde(default)]
    pub tokenizer: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            corpus: default_corpus(),
            model: default_model(),
            index: default_index(),
            tokenizer: None,
        }
    }
}

impl DataConfig {
    fn resolve(&mut self, base: &Path) {
        for path in [&mut self.corpus, &mut self.model, &mut self.index] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if let Some(path) = self.tokenizer.as_mut().filter(|p| p.is_relative()) {
            *path = base.join(&*path);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Token secret. A random one is generated per process when unset.
    #[serde(default)]
    pub salt: Option<String>,
    #[serde(default = "default_capacity")]
    pub snapshot_capacity: usize,
    #[serde(default = "default_capacity")]
    pub conversation_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            salt: None,
            snapshot_capacity: default_capacity(),
            conversation_capacity: default_capacity(),
        }
    }
}

impl SessionConfig {
    pub fn limits(&self) -> SessionLimits {
        SessionLimits {
            snapshot_capacity: self.snapshot_capacity,
            conversation_capacity: self.conversation_capacity,
        }
    }

    pub fn salt(&self) -> Salt {
        match self.salt.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => Salt::new(secret),
            None => {
                warn!("No salt configured; back buttons will expire on restart");
                Salt::random()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: Option<String>,
    /// Public base URL; the webhook is registered at `<app_url>/<token>`.
    #[serde(default)]
    pub app_url: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            app_url: None,
            webhook_secret: None,
            api_base_url: default_api_base_url(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

impl TelegramConfig {
    /// The bot token, required by every mode that talks to Telegram.
    pub fn require_token(&self) -> FrazeoResult<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                FrazeoError::Config("bot token missing: set TG_TOKEN or [telegram] token".into())
            })
    }
}

fn default_corpus() -> PathBuf {
    PathBuf::from("data/idioms.tsv")
}
fn default_model() -> PathBuf {
    PathBuf::from("data/model.json")
}
fn default_index() -> PathBuf {
    PathBuf::from("data/index.jsonl")
}
fn default_capacity() -> usize {
    1000
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_api_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}
fn default_poll_timeout() -> u64 {
    30
}

impl FrazeoConfig {
    /// Parse a config document. Relative data paths stay as written.
    pub fn parse(data: &str) -> FrazeoResult<Self> {
        toml::from_str(data).map_err(|e| FrazeoError::Config(e.to_string()))
    }

    /// Load `path`, or [`DEFAULT_CONFIG`] if present, or built-in defaults.
    ///
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> FrazeoResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None if Path::new(DEFAULT_CONFIG).exists() => PathBuf::from(DEFAULT_CONFIG),
            None => {
                info!("No config file, using defaults");
                return Ok(Self::default());
            }
        };

        let data = std::fs::read_to_string(&path).map_err(|e| {
            FrazeoError::Config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        let mut config = Self::parse(&data)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.data.resolve(base);
        info!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Apply `TG_TOKEN`, `APP_URL`, `SALT`, `PORT`, and `WEBHOOK_SECRET`
    /// from `lookup`, which wins over the file.
    pub fn apply_env<F>(&mut self, lookup: F) -> FrazeoResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TG_TOKEN") {
            self.telegram.token = Some(token);
        }
        if let Some(url) = lookup("APP_URL") {
            self.telegram.app_url = Some(url);
        }
        if let Some(secret) = lookup("WEBHOOK_SECRET") {
            self.telegram.webhook_secret = Some(secret);
        }
        if let Some(salt) = lookup("SALT") {
            self.session.salt = Some(salt);
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| FrazeoError::Config(format!("invalid PORT '{port}': {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
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
    fn test_defaults() {
        let config = FrazeoConfig::parse("").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.search.results, 10);
        assert_eq!(config.search.neighbors, 5);
        assert_eq!(config.search.cache_capacity, 100);
        assert_eq!(config.session.snapshot_capacity, 1000);
        assert_eq!(config.session.conversation_capacity, 1000);
        assert_eq!(config.telegram.api_base_url, DEFAULT_API_BASE);
        assert!(config.telegram.token.is_none());
        assert!(config.data.tokenizer.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = FrazeoConfig::parse(
            r#"
[search]
results = 3

[session]
salt = "pepper"
snapshot_capacity = 7

[telegram]
token = "123:abc"
"#,
        )
        .unwrap();
        assert_eq!(config.search.results, 3);
        assert_eq!(config.search.neighbors, 5);
        assert_eq!(config.session.limits().snapshot_capacity, 7);
        assert_eq!(config.session.limits().conversation_capacity, 1000);
        assert_eq!(config.session.salt.as_deref(), Some("pepper"));
        assert_eq!(config.telegram.require_token().unwrap(), "123:abc");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = FrazeoConfig::parse("[server]\nport = \"eighty\"").unwrap_err();
        assert!(matches!(err, FrazeoError::Config(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = FrazeoConfig::parse("[server]\nport = 8080\n[telegram]\ntoken = \"file\"").unwrap();
        config
            .apply_env(env(&[
                ("TG_TOKEN", "env-token"),
                ("APP_URL", "https://bot.example"),
                ("SALT", "-"),
                ("PORT", "9000"),
                ("WEBHOOK_SECRET", "s3cret"),
            ]))
            .unwrap();
        assert_eq!(config.telegram.token.as_deref(), Some("env-token"));
        assert_eq!(config.telegram.app_url.as_deref(), Some("https://bot.example"));
        assert_eq!(config.telegram.webhook_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.session.salt.as_deref(), Some("-"));
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_env_leaves_unset_values() {
        let mut config = FrazeoConfig::parse("[server]\nport = 8080").unwrap();
        config.apply_env(env(&[])).unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.telegram.token.is_none());
    }

    #[test]
    fn test_bad_port_rejected() {
        let mut config = FrazeoConfig::default();
        let err = config.apply_env(env(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_missing_token() {
        let mut config = FrazeoConfig::default();
        assert!(config.telegram.require_token().is_err());
        config.telegram.token = Some(String::new());
        assert!(config.telegram.require_token().is_err());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frazeo.toml");
        std::fs::write(
            &path,
            "[data]\ncorpus = \"idioms.tsv\"\nindex = \"/srv/index.jsonl\"\ntokenizer = \"tok.json\"\n",
        )
        .unwrap();

        let config = FrazeoConfig::load(Some(&path)).unwrap();
        assert_eq!(config.data.corpus, dir.path().join("idioms.tsv"));
        assert_eq!(config.data.model, dir.path().join("data/model.json"));
        assert_eq!(config.data.index, PathBuf::from("/srv/index.jsonl"));
        assert_eq!(config.data.tokenizer, Some(dir.path().join("tok.json")));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = FrazeoConfig::load(Some(Path::new("/nonexistent/frazeo.toml"))).unwrap_err();
        assert!(matches!(err, FrazeoError::Config(_)));
    }

    #[test]
    fn test_configured_salt_is_stable() {
        let config = FrazeoConfig::parse("[session]\nsalt = \"-\"").unwrap();
        let a = frazeo_session::TokenRegistry::for_corpus(&config.session.salt(), 2).unwrap();
        let b = frazeo_session::TokenRegistry::for_corpus(&config.session.salt(), 2).unwrap();
        assert_eq!(a.id_token(0), b.id_token(0));
    }
}
