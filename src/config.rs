//! Runtime configuration for provider endpoints, credentials and paging.
//!
//! Configuration is resolved once at startup and handed to adapter
//! constructors as plain values; nothing reads the environment afterwards.
//! Resolution order, lowest to highest precedence:
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. An optional YAML file ([`Settings::load`])
//! 3. API keys from CLI flags or their environment variables
//!
//! # File format
//!
//! ```yaml
//! timeout_secs: 10
//! page_size: 20
//! generic_headline:
//!   base_url: https://newsapi.org/v2/everything
//!   api_key: "..."
//! publisher_a:
//!   api_key: "..."
//! ```
//!
//! Every key is optional.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

pub const GENERIC_HEADLINE_URL: &str = "https://newsapi.org/v2/everything";
pub const PUBLISHER_A_URL: &str = "https://content.guardianapis.com/search";
pub const PUBLISHER_B_URL: &str = "https://api.nytimes.com/svc/topstories/v2/home.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Endpoint and credential for one provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

// Keys must never end up in logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub generic_headline: ProviderConfig,
    pub publisher_a: ProviderConfig,
    pub publisher_b: ProviderConfig,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generic_headline: ProviderConfig::new(GENERIC_HEADLINE_URL, ""),
            publisher_a: ProviderConfig::new(PUBLISHER_A_URL, ""),
            publisher_b: ProviderConfig::new(PUBLISHER_B_URL, ""),
            timeout_secs: 10,
            page_size: crate::models::DEFAULT_PAGE_SIZE,
            user_agent: concat!("tri_source_news/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    generic_headline: Option<ProviderOverride>,
    publisher_a: Option<ProviderOverride>,
    publisher_b: Option<ProviderOverride>,
    timeout_secs: Option<u64>,
    page_size: Option<u32>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderOverride {
    base_url: Option<String>,
    api_key: Option<String>,
}

impl ProviderOverride {
    fn apply(self, target: &mut ProviderConfig) {
        if let Some(base_url) = self.base_url {
            target.base_url = base_url;
        }
        if let Some(api_key) = self.api_key {
            target.api_key = api_key;
        }
    }
}

impl Settings {
    /// Load settings from a YAML file layered over the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        let settings = Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: shown.clone(),
            source,
        })?;
        info!(path = %shown, "Loaded configuration");
        Ok(settings)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        // Empty and comment-only documents are null, not a map.
        let file = if text.trim().is_empty() {
            SettingsFile::default()
        } else {
            serde_yaml::from_str::<Option<SettingsFile>>(text)?.unwrap_or_default()
        };

        let mut settings = Settings::default();
        if let Some(o) = file.generic_headline {
            o.apply(&mut settings.generic_headline);
        }
        if let Some(o) = file.publisher_a {
            o.apply(&mut settings.publisher_a);
        }
        if let Some(o) = file.publisher_b {
            o.apply(&mut settings.publisher_b);
        }
        if let Some(timeout_secs) = file.timeout_secs {
            settings.timeout_secs = timeout_secs;
        }
        if let Some(page_size) = file.page_size {
            settings.page_size = page_size;
        }
        if let Some(user_agent) = file.user_agent {
            settings.user_agent = user_agent;
        }
        Ok(settings)
    }

    /// Override API keys with values from the command line or environment.
    pub fn with_api_keys(
        mut self,
        generic_headline: Option<String>,
        publisher_a: Option<String>,
        publisher_b: Option<String>,
    ) -> Self {
        for (key, target) in [
            (generic_headline, &mut self.generic_headline),
            (publisher_a, &mut self.publisher_a),
            (publisher_b, &mut self.publisher_b),
        ] {
            if let Some(key) = key {
                target.api_key = key;
            }
        }
        self
    }

    /// Log a warning for every provider without a credential.
    ///
    /// Such providers will be rejected upstream and contribute nothing.
    pub fn warn_missing_keys(&self) {
        for (name, provider) in [
            ("generic_headline", &self.generic_headline),
            ("publisher_a", &self.publisher_a),
            ("publisher_b", &self.publisher_b),
        ] {
            if provider.api_key.is_empty() {
                warn!(provider = name, "No API key configured; provider will return no articles");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.generic_headline.base_url, GENERIC_HEADLINE_URL);
        assert_eq!(settings.publisher_a.base_url, PUBLISHER_A_URL);
        assert_eq!(settings.publisher_b.base_url, PUBLISHER_B_URL);
        assert_eq!(settings.page_size, 20);
        assert!(settings.user_agent.starts_with("tri_source_news/"));
    }

    #[test]
    fn test_partial_yaml_layers_over_defaults() {
        let settings = Settings::from_yaml(
            r#"
page_size: 5
publisher_a:
  api_key: guardian-key
publisher_b:
  base_url: http://localhost:9000/home.json
"#,
        )
        .unwrap();

        assert_eq!(settings.page_size, 5);
        assert_eq!(settings.timeout_secs, 10);
        assert_eq!(settings.publisher_a.api_key, "guardian-key");
        assert_eq!(settings.publisher_a.base_url, PUBLISHER_A_URL);
        assert_eq!(settings.publisher_b.base_url, "http://localhost:9000/home.json");
        assert_eq!(settings.generic_headline, Settings::default().generic_headline);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Settings::from_yaml("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn test_comment_only_yaml_is_default() {
        let text = "# provider overrides go here\n# page_size: 5\n";
        assert_eq!(Settings::from_yaml(text).unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Settings::from_yaml("page_sise: 5").is_err());
    }

    #[test]
    fn test_api_keys_override_file() {
        let settings = Settings::from_yaml("publisher_a:\n  api_key: from-file\n")
            .unwrap()
            .with_api_keys(Some("news".to_string()), None, Some("nyt".to_string()));

        assert_eq!(settings.generic_headline.api_key, "news");
        assert_eq!(settings.publisher_a.api_key, "from-file");
        assert_eq!(settings.publisher_b.api_key, "nyt");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", ProviderConfig::new("https://example.com", "s3cret"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs: 3").unwrap();
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.timeout_secs, 3);
        assert_eq!(settings.page_size, 20);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
