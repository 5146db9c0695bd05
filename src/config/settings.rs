use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// User configuration, read from `~/.config/gg/config.toml`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub github: GithubConfig,
    #[serde(default)]
    pub git: GitConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GithubConfig {
    pub auth_token_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GitConfig {
    pub program: String,
    pub remote: String,
    pub main_branch: String,
    /// Prefix segment of managed stacked branches; empty for none
    pub branch_prefix: String,
    /// Separator between stacked branch name segments
    pub branch_split: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            program: "git".to_string(),
            remote: "origin".to_string(),
            main_branch: "master".to_string(),
            branch_prefix: String::new(),
            branch_split: "/".to_string(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("gg"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path()?)
    }

    /// Load configuration from an explicit path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::config_path()?)
    }

    /// Save configuration to an explicit path, readable by the owner only
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;

        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    pub fn default_config() -> Self {
        Config {
            github: GithubConfig {
                auth_token_env: "GITHUB_TOKEN".to_string(),
                auth_token: None,
            },
            git: GitConfig::default(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.github.auth_token_env.is_empty() {
            return Err(ConfigError::InvalidValue(
                "auth_token_env must not be empty".to_string(),
            ));
        }

        for (key, value) in [
            ("program", &self.git.program),
            ("remote", &self.git.remote),
            ("main_branch", &self.git.main_branch),
            ("branch_split", &self.git.branch_split),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "git.{} must not be empty",
                    key
                )));
            }
        }

        Ok(())
    }

    /// Get the GitHub token from the environment or the config file
    pub fn auth_token(&self) -> Option<String> {
        if let Ok(token) = std::env::var(&self.github.auth_token_env) {
            if !token.is_empty() {
                return Some(token);
            }
        }

        self.github.auth_token.clone()
    }
}
