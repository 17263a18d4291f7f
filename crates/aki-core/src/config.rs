//! Configuration management for AKI.
//!
//! Loads configuration from ${AKI_HOME}/config.toml with sensible defaults.
//! Firebase settings can be overridden from the environment.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_TOKEN_BASE_URL: &str = "https://securetoken.googleapis.com";
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for AKI configuration and data directories.
    //!
    //! AKI_HOME resolution order:
    //! 1. AKI_HOME environment variable (if set)
    //! 2. ~/.config/aki (default)
    //! 3. ./.aki when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the AKI home directory.
    pub fn aki_home() -> PathBuf {
        if let Ok(home) = std::env::var("AKI_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".aki"),
            |h| h.join(".config").join("aki"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        aki_home().join("config.toml")
    }

    /// Returns the path of the persisted provider session.
    pub fn session_path() -> PathBuf {
        aki_home().join("session.json")
    }

    /// Returns the log directory.
    pub fn logs_dir() -> PathBuf {
        aki_home().join("logs")
    }
}

/// Firebase project settings (same fields as the web SDK config object).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    pub measurement_id: Option<String>,
    /// Identity Toolkit endpoint override.
    pub identity_base_url: Option<String>,
    /// Secure Token endpoint override.
    pub token_base_url: Option<String>,
    /// Firestore endpoint override.
    pub firestore_base_url: Option<String>,
}

impl FirebaseConfig {
    /// API key from `AKI_FIREBASE_API_KEY`, else the config value.
    pub fn effective_api_key(&self) -> Option<String> {
        env_or("AKI_FIREBASE_API_KEY", self.api_key.as_deref())
    }

    /// Project id from `AKI_FIREBASE_PROJECT_ID`, else the config value.
    pub fn effective_project_id(&self) -> Option<String> {
        env_or("AKI_FIREBASE_PROJECT_ID", self.project_id.as_deref())
    }

    pub fn effective_identity_base_url(&self) -> String {
        base_url(
            "AKI_IDENTITY_BASE_URL",
            self.identity_base_url.as_deref(),
            DEFAULT_IDENTITY_BASE_URL,
        )
    }

    pub fn effective_token_base_url(&self) -> String {
        base_url(
            "AKI_TOKEN_BASE_URL",
            self.token_base_url.as_deref(),
            DEFAULT_TOKEN_BASE_URL,
        )
    }

    pub fn effective_firestore_base_url(&self) -> String {
        base_url(
            "AKI_FIRESTORE_BASE_URL",
            self.firestore_base_url.as_deref(),
            DEFAULT_FIRESTORE_BASE_URL,
        )
    }
}

/// Reads a non-empty env var, falling back to a non-empty config value.
fn env_or(var: &str, configured: Option<&str>) -> Option<String> {
    prefer_non_empty(std::env::var(var).ok().as_deref(), configured)
}

/// An empty or blank override never hides the configured value.
fn prefer_non_empty(value: Option<&str>, fallback: Option<&str>) -> Option<String> {
    let non_empty = |v: &str| {
        let v = v.trim();
        (!v.is_empty()).then(|| v.to_string())
    };
    value.and_then(non_empty).or_else(|| fallback.and_then(non_empty))
}

fn base_url(var: &str, configured: Option<&str>, default: &str) -> String {
    env_or(var, configured)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timeout for identity provider calls in seconds (0 disables)
    pub request_timeout_secs: u32,

    /// Persist the provider session between runs
    pub persist_session: bool,

    /// Firestore collection searched by username
    pub collection: String,

    /// Page opened by "Add New Data"
    pub add_data_url: Option<String>,

    /// Firebase project settings
    pub firebase: FirebaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            persist_session: true,
            collection: Self::DEFAULT_COLLECTION.to_string(),
            add_data_url: None,
            firebase: FirebaseConfig::default(),
        }
    }
}

impl Config {
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 30;
    const DEFAULT_COLLECTION: &'static str = "users";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.request_timeout_secs)))
        }
    }

    /// Returns the add-data page, derived from the auth domain when unset.
    pub fn effective_add_data_url(&self) -> Option<String> {
        if let Some(url) = self.add_data_url.as_deref().map(str::trim)
            && !url.is_empty()
        {
            return Some(url.to_string());
        }
        self.firebase
            .auth_domain
            .as_deref()
            .map(str::trim)
            .filter(|domain| !domain.is_empty())
            .and_then(|domain| url::Url::parse(&format!("https://{domain}/")).ok())
            .and_then(|base| base.join("add-data.html").ok())
            .map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_empty_env_value_falls_back_to_configured() {
        assert_eq!(
            prefer_non_empty(Some(""), Some("from-file")).as_deref(),
            Some("from-file")
        );
        assert_eq!(
            prefer_non_empty(Some("  "), Some(" from-file ")).as_deref(),
            Some("from-file")
        );
        assert_eq!(
            prefer_non_empty(Some("from-env"), Some("from-file")).as_deref(),
            Some("from-env")
        );
        assert_eq!(prefer_non_empty(None, Some("")), None);
        assert_eq!(prefer_non_empty(None, None), None);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.collection, "users");
        assert!(config.persist_session);
        assert!(config.firebase.api_key.is_none());
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "collection = \"accounts\"\n[firebase]\nproject_id = \"aki-sql\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.collection, "accounts");
        assert_eq!(config.firebase.project_id.as_deref(), Some("aki-sql"));
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "request_timeout_secs = \"soon\"\n").unwrap();

        assert!(Config::load_from(&config_path).is_err());
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("request_timeout_secs = 30"));
        assert!(contents.contains("# api_key ="));

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.collection, "users");
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_request_timeout_zero_disables() {
        let config = Config {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), None);
        assert_eq!(
            Config::default().request_timeout(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_add_data_url_derived_from_auth_domain() {
        let config = Config {
            firebase: FirebaseConfig {
                auth_domain: Some("aki-sql.firebaseapp.com".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            config.effective_add_data_url().as_deref(),
            Some("https://aki-sql.firebaseapp.com/add-data.html")
        );
    }

    #[test]
    fn test_explicit_add_data_url_wins() {
        let config = Config {
            add_data_url: Some("https://example.com/new".to_string()),
            firebase: FirebaseConfig {
                auth_domain: Some("aki-sql.firebaseapp.com".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            config.effective_add_data_url().as_deref(),
            Some("https://example.com/new")
        );
        assert_eq!(Config::default().effective_add_data_url(), None);
    }

    #[test]
    fn test_base_url_override_from_config_trims_slash() {
        let firebase = FirebaseConfig {
            firestore_base_url: Some("http://localhost:8080/".to_string()),
            ..Default::default()
        };
        // Env overrides are exercised by the CLI integration tests.
        if std::env::var("AKI_FIRESTORE_BASE_URL").is_err() {
            assert_eq!(
                firebase.effective_firestore_base_url(),
                "http://localhost:8080"
            );
        }
    }
}
