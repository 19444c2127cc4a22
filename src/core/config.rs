//! Configuration management
//!
//! Settings are layered: built-in defaults, then the YAML config file
//! (`$FERRE_CONFIG` or `<config dir>/ferre/config.yaml`), then environment
//! variables, then command-line overrides applied by the caller.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use crate::core::error::ClientError;
use crate::core::pagination::{DEFAULT_PAGE_SIZE, TABLE_PAGE_SIZES};

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "FERRE_CONFIG";

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every request path is joined to
    pub base_url: String,

    /// Optional request timeout; the HTTP client default applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: None,
        }
    }
}

/// List and table display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Default page size for list commands
    pub page_size: u32,

    /// Currency symbol prefixed to prices
    pub currency: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            currency: "S/".to_string(),
        }
    }
}

/// Proforma report settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Where PDF downloads land (current directory when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,

    /// Command used to open HTML previews
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
}

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub reports: ReportsConfig,
}

impl Config {
    /// Load configuration from the config file and environment
    ///
    /// An unreadable or malformed file is reported and ignored so that the
    /// client still starts with defaults.
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => {
                    debug!(path = %path.display(), "loaded config file");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "ignoring config file");
                    Config::default()
                }
            },
            _ => Config::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Parse a config file
    pub fn load_from(path: &Path) -> Result<Self, ClientError> {
        let content = fs::read_to_string(path).map_err(|e| ClientError::io(path, e))?;
        serde_yml::from_str(&content).map_err(|e| ClientError::io(path, e))
    }

    /// Location of the config file
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "ferre").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Apply `FERRE_*` environment overrides
    ///
    /// Takes a lookup function so tests can supply variables without
    /// touching the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FERRE_API_URL").filter(|s| !s.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(size) = lookup("FERRE_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(n) if TABLE_PAGE_SIZES.contains(&n) => self.display.page_size = n,
                _ => warn!(value = %size, "ignoring FERRE_PAGE_SIZE (allowed: 5, 10, 20, 50)"),
            }
        }
        if let Some(dir) = lookup("FERRE_DOWNLOAD_DIR").filter(|s| !s.trim().is_empty()) {
            self.reports.download_dir = Some(PathBuf::from(dir));
        }
        if let Some(browser) = lookup("FERRE_BROWSER").filter(|s| !s.trim().is_empty()) {
            self.reports.browser = Some(browser);
        }
    }

    /// Override the API base URL (from `--api-url`)
    pub fn with_api_url(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url {
            self.api.base_url = url.to_string();
        }
        self
    }

    /// Page size for list commands, falling back to the default when the
    /// configured value is not an allowed size
    pub fn page_size(&self) -> u32 {
        if TABLE_PAGE_SIZES.contains(&self.display.page_size) {
            self.display.page_size
        } else {
            DEFAULT_PAGE_SIZE
        }
    }

    pub fn download_dir(&self) -> PathBuf {
        self.reports
            .download_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Command used to open HTML previews
    pub fn browser(&self) -> String {
        self.reports
            .browser
            .clone()
            .or_else(|| std::env::var("BROWSER").ok())
            .unwrap_or_else(|| {
                if cfg!(target_os = "macos") {
                    "open".to_string()
                } else if cfg!(windows) {
                    "explorer".to_string()
                } else {
                    "xdg-open".to_string()
                }
            })
    }

    /// Open a file with the configured browser
    pub fn run_browser(&self, path: &Path) -> std::io::Result<()> {
        let browser = self.browser();
        debug!(%browser, path = %path.display(), "opening preview");
        Command::new(&browser).arg(path).spawn()?;
        Ok(())
    }

    /// Render as YAML for `ferre config show`
    pub fn to_yaml(&self) -> String {
        serde_yml::to_string(self).unwrap_or_default()
    }
}
