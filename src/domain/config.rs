use std::{fmt, io, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

/// Where the client goes after a review was saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfterSave {
    /// Start a fresh blank draft.
    #[default]
    Blank,
    /// Return to the review list.
    List,
}

impl FromStr for AfterSave {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blank" => Ok(Self::Blank),
            "list" => Ok(Self::List),
            other => Err(ConfigError::InvalidValue {
                key: "after_save",
                value: other.to_string(),
                reason: "expected 'blank' or 'list'".to_string(),
            }),
        }
    }
}

impl fmt::Display for AfterSave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Blank => "blank",
            Self::List => "list",
        })
    }
}

/// Errors raised while reading, writing or editing the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read config file: {0}")]
    Read(#[source] io::Error),

    /// The file is not a valid configuration.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The file could not be written.
    #[error("Failed to write config file: {0}")]
    Write(#[source] io::Error),

    /// `set` was called with a key that does not exist.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    /// `set` was called with a value the key does not accept.
    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        /// The key being set.
        key: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Client configuration.
///
/// Stored as a versioned TOML file so the format can evolve without breaking
/// existing files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Base URL of the extraction backend, without a trailing slash.
    base_url: String,

    /// Timeout applied to every backend request, in seconds.
    timeout_secs: u64,

    /// Where to go after a successful save.
    pub after_save: AfterSave,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            after_save: AfterSave::default(),
        }
    }
}

impl Config {
    /// The keys accepted by [`Config::set`].
    pub const KEYS: &'static [&'static str] = &["base_url", "timeout_secs", "after_save"];

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the configuration, falling back to the defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::Write)
    }

    /// Returns the backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Overrides the backend base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an absolute http(s) URL.
    pub fn set_base_url(&mut self, url: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: "base_url",
            value: url.to_string(),
            reason,
        };
        let parsed = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("expected an http or https URL".to_string()));
        }
        url.trim_end_matches('/').clone_into(&mut self.base_url);
        Ok(())
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sets a configuration key from its textual value.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys and for values the key does not
    /// accept.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "base_url" => self.set_base_url(value),
            "timeout_secs" => {
                self.timeout_secs = value
                    .parse()
                    .ok()
                    .filter(|&secs| secs > 0)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: "timeout_secs",
                        value: value.to_string(),
                        reason: "expected a positive number of seconds".to_string(),
                    })?;
                Ok(())
            }
            "after_save" => {
                self.after_save = value.parse()?;
                Ok(())
            }
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    /// Returns the textual value of a key, as accepted by [`Config::set`].
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "base_url" => Some(self.base_url.clone()),
            "timeout_secs" => Some(self.timeout_secs.to_string()),
            "after_save" => Some(self.after_save.to_string()),
            _ => None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_base_url")]
        base_url: String,

        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,

        #[serde(default)]
        after_save: AfterSave,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                base_url,
                timeout_secs,
                after_save,
            } => Self {
                base_url,
                timeout_secs,
                after_save,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            base_url: config.base_url,
            timeout_secs: config.timeout_secs,
            after_save: config.after_save,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nbase_url = \"https://extraction.example.org\"\ntimeout_secs = 5\nafter_save = \"list\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.base_url(), "https://extraction.example.org");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.after_save, AfterSave::List);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.to_string().starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default());
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ntimeout_secs = \"soon\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.to_string().starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(actual.base_url(), "http://localhost:5000");
        assert_eq!(actual.after_save, AfterSave::Blank);
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("extraction.toml");
        let mut config = Config::default();
        config.set("after_save", "list").unwrap();
        config.set("timeout_secs", "12").unwrap();

        config.save(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        assert!(written.contains("_version = \"1\""));
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn set_normalises_base_url() {
        let mut config = Config::default();
        config.set("base_url", "http://10.0.0.2:8080/").unwrap();
        assert_eq!(config.get("base_url").as_deref(), Some("http://10.0.0.2:8080"));
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut config = Config::default();

        assert!(matches!(
            config.set("base_url", "ftp://example.org"),
            Err(ConfigError::InvalidValue { key: "base_url", .. })
        ));
        assert!(matches!(
            config.set("timeout_secs", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("after_save", "nowhere"),
            Err(ConfigError::InvalidValue { key: "after_save", .. })
        ));
        assert!(matches!(
            config.set("colour", "blue"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert_eq!(config, Config::default());
    }
}
