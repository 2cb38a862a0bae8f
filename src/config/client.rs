use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REPO_NAME: &str = "prompt-library";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the GitHub REST API (e.g., "https://api.github.com").
    pub api_url: String,
    /// Name of the repository holding the prompt library, owned by the signed-in user.
    pub repo_name: String,
    /// Branch to read and commit to. The repository default branch when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Request timeout. The transport default applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Reads a TOML config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Applies command-line overrides on top of the loaded values.
    #[must_use]
    pub fn with_overrides(mut self, api_url: Option<String>, repo_name: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(name) = repo_name {
            self.repo_name = name;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api_url must start with http:// or https:// (got '{}')",
                self.api_url
            )));
        }
        crate::store::path::validate_repo_name(&self.repo_name)
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(())
    }

    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            repo_name: DEFAULT_REPO_NAME.to_string(),
            branch: None,
            timeout_secs: None,
        }
    }
}
