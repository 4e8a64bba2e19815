//! Configuration for scraping and download operations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default prefix used to filter scraped anchor links.
pub const DEFAULT_LINK_PREFIX: &str = "https://fuckingfast.co/";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Application configuration.
///
/// Values come from the optional TOML config file and can be overridden
/// per-run through the builder methods (the CLI maps its flags onto them).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory where downloaded files and session state are saved.
    pub download_dir: PathBuf,
    /// Only anchor links starting with this prefix are collected.
    pub link_prefix: String,
    /// Timeout for each HTTP request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            link_prefix: DEFAULT_LINK_PREFIX.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the download directory.
    #[must_use]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Sets the link filter prefix.
    #[must_use]
    pub fn with_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.link_prefix = prefix.into();
        self
    }

    /// Sets the per-request timeout in seconds.
    #[must_use]
    pub const fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Returns the path of the user config file, if a config directory exists.
    #[must_use]
    pub fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fastget").join("config.toml"))
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Loads the user config file, falling back to defaults.
    ///
    /// A missing file is the normal first-run case and is silent; a file
    /// that exists but cannot be read or parsed is logged and ignored.
    #[must_use]
    pub fn load_or_default() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring unreadable config file {}: {e}", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Config {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.link_prefix, DEFAULT_LINK_PREFIX);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .with_download_dir("/tmp/dl")
            .with_link_prefix("https://example.com/")
            .with_request_timeout_secs(30);

        assert_eq!(config.download_dir, PathBuf::from("/tmp/dl"));
        assert_eq!(config.link_prefix, "https://example.com/");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn serializes_to_toml() {
        let config = Config::default().with_download_dir("/data");
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized = parse(&toml_str);
        assert_eq!(deserialized.download_dir, PathBuf::from("/data"));
        assert_eq!(deserialized.link_prefix, config.link_prefix);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config = parse("link_prefix = \"https://mirror.test/\"\n");
        assert_eq!(config.link_prefix, "https://mirror.test/");
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "request_timeout_secs = 10\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn load_from_garbage_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
