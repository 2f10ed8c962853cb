use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const FINNHUB_API_KEY_VAR: &str = "FINNHUB_API_KEY";
pub const ALPHA_VANTAGE_API_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";

const DEFAULT_SYMBOLS: [&str; 4] = ["AAPL", "GOOGL", "MSFT", "TSLA"];
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FinnhubProviderConfig {
    pub base_url: String,
}

impl Default for FinnhubProviderConfig {
    fn default() -> Self {
        FinnhubProviderConfig {
            base_url: "https://finnhub.io".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AlphaVantageProviderConfig {
    pub base_url: String,
}

impl Default for AlphaVantageProviderConfig {
    fn default() -> Self {
        AlphaVantageProviderConfig {
            base_url: "https://www.alphavantage.co".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub finnhub: FinnhubProviderConfig,
    #[serde(default)]
    pub alpha_vantage: AlphaVantageProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

fn default_refresh_interval_secs() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            symbols: default_symbols(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            providers: ProvidersConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or the built-in defaults if there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "tickerboard", "tickerboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        if config.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be greater than zero");
        }
        debug!("Successfully loaded config");
        Ok(config)
    }
}

/// Provider credentials, resolved once at startup and read-only afterwards.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiCredentials {
    pub finnhub: Option<String>,
    pub alpha_vantage: Option<String>,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("finnhub", &self.finnhub.as_ref().map(|_| "<redacted>"))
            .field("alpha_vantage", &self.alpha_vantage.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ApiCredentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds credentials from any variable source. Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        ApiCredentials {
            finnhub: read(FINNHUB_API_KEY_VAR),
            alpha_vantage: read(ALPHA_VANTAGE_API_KEY_VAR),
        }
    }

    pub fn has_any(&self) -> bool {
        self.finnhub.is_some() || self.alpha_vantage.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
symbols:
  - "AAPL"
  - "NVDA"
refresh_interval_secs: 60
providers:
  finnhub:
    base_url: "http://example.com/finnhub"
  alpha_vantage:
    base_url: "http://example.com/av"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.symbols, vec!["AAPL", "NVDA"]);
        assert_eq!(config.refresh_interval_secs, 60);
        assert_eq!(config.providers.finnhub.base_url, "http://example.com/finnhub");
        assert_eq!(config.providers.alpha_vantage.base_url, "http://example.com/av");
    }

    #[test]
    fn test_config_defaults_when_fields_missing() {
        let config: AppConfig = serde_yaml::from_str("symbols: [\"IBM\"]\n").unwrap();
        assert_eq!(config.symbols, vec!["IBM"]);
        assert_eq!(config.refresh_interval_secs, 30);
        assert_eq!(config.providers.finnhub.base_url, "https://finnhub.io");
        assert_eq!(
            config.providers.alpha_vantage.base_url,
            "https://www.alphavantage.co"
        );

        let config = AppConfig::default();
        assert_eq!(config.symbols, vec!["AAPL", "GOOGL", "MSFT", "TSLA"]);
    }

    #[test]
    fn test_load_from_path_rejects_zero_interval() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "refresh_interval_secs: 0\n").unwrap();
        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("nope.yaml"));
        assert!(result.unwrap_err().to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_credentials_from_lookup() {
        let vars = HashMap::from([
            (FINNHUB_API_KEY_VAR, "fh-key".to_string()),
            (ALPHA_VANTAGE_API_KEY_VAR, "   ".to_string()),
        ]);
        let creds = ApiCredentials::from_lookup(|name| vars.get(name).cloned());
        assert_eq!(creds.finnhub.as_deref(), Some("fh-key"));
        assert!(creds.alpha_vantage.is_none());

        assert!(creds.has_any());

        let empty = ApiCredentials::from_lookup(|_| None);
        assert!(!empty.has_any());
    }

    #[test]
    fn test_credentials_debug_redacts_keys() {
        let creds = ApiCredentials {
            finnhub: Some("secret".to_string()),
            alpha_vantage: None,
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
