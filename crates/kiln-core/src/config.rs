use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use kiln_util::errors::{KilnError, KilnResult};

use crate::dependency::Scope;

/// Maven Central base URL.
pub const MAVEN_CENTRAL_URL: &str = "https://repo1.maven.org/maven2/";

/// User configuration loaded from `~/.kiln/config.toml`.
///
/// ```toml
/// [[repository]]
/// name = "central"
/// url = "https://repo1.maven.org/maven2/"
///
/// [network]
/// timeout-secs = 60
///
/// [resolve]
/// scopes = ["compile", "runtime"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KilnConfig {
    /// Repositories in probe order.
    #[serde(default = "default_repositories", rename = "repository")]
    pub repositories: Vec<RepositoryEntry>,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub resolve: ResolveConfig,
}

impl Default for KilnConfig {
    fn default() -> Self {
        Self {
            repositories: default_repositories(),
            network: NetworkConfig::default(),
            resolve: ResolveConfig::default(),
        }
    }
}

/// One `[[repository]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
}

fn default_repositories() -> Vec<RepositoryEntry> {
    vec![RepositoryEntry {
        name: Some("central".to_string()),
        url: MAVEN_CENTRAL_URL.to_string(),
    }]
}

/// Network settings from `[network]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Overall budget for one resolution, in seconds. `0` disables the deadline.
    #[serde(default = "default_timeout_secs", rename = "timeout-secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent", rename = "user-agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_user_agent() -> String {
    format!("kiln/{}", env!("CARGO_PKG_VERSION"))
}

/// Resolution defaults from `[resolve]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default = "default_scopes")]
    pub scopes: Vec<Scope>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            scopes: default_scopes(),
        }
    }
}

fn default_scopes() -> Vec<Scope> {
    vec![Scope::Compile]
}

impl KilnConfig {
    /// Load `~/.kiln/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> KilnResult<Self> {
        let path = Self::default_path();
        if path.is_file() {
            Self::load_from(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> KilnResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| KilnError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content).map_err(|e| match e {
            KilnError::Config { message } => KilnError::Config {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })
    }

    pub fn parse_toml(content: &str) -> KilnResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| KilnError::Config {
            message: format!("Failed to parse config: {e}"),
        })?;
        if config.repositories.is_empty() {
            return Err(KilnError::Config {
                message: "at least one [[repository]] is required".to_string(),
            });
        }
        Ok(config)
    }

    /// Returns the default path to the config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the kiln data directory (`~/.kiln/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".kiln")
}
