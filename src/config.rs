use serde::Deserialize;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub github: Option<GitHubConfig>,
}

#[derive(Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Manual Debug impl to avoid leaking the API key
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Where the launch workflow looks up the user's repositories.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DirectorySource {
    #[default]
    Backend,
    Github,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub source: DirectorySource,
}

#[derive(Deserialize, Clone)]
pub struct GitHubConfig {
    pub token: String,
}

// Manual Debug impl to avoid leaking the token
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("launchpad").required(false));
        }

        // Environment variable overrides with LAUNCHPAD_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("LAUNCHPAD")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(AppError::Config("backend.base_url must not be empty".to_string()));
        }

        if self.backend.timeout_secs == 0 {
            return Err(AppError::Config(
                "backend.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.directory.source == DirectorySource::Github && self.github.is_none() {
            return Err(AppError::Config(
                "directory.source = \"github\" requires a [github] section with a token"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// The GitHub section, required when repositories come from GitHub.
    pub fn github(&self) -> Result<&GitHubConfig> {
        self.github
            .as_ref()
            .ok_or_else(|| AppError::Config("Missing [github] section".to_string()))
    }
}
