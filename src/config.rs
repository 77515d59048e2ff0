use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Release index constants
// =============================================================================

/// Terraform release listing of the HashiCorp releases API
pub const DEFAULT_RELEASES_ENDPOINT: &str =
    "https://api.releases.hashicorp.com/v1/releases/terraform";

/// Number of releases requested per page
pub const RELEASE_LIST_LIMIT: usize = 20;

/// Content type every release index response must carry
pub const RESPONSE_CONTENT_TYPE: &str = "application/json";

// =============================================================================
// Image constants
// =============================================================================

/// Repository namespace of the runtime image
pub const IMAGE_NAMESPACE: &str = "hashicorp";

/// Repository name of the runtime image
pub const IMAGE_NAME: &str = "terraform";

/// User agent sent with every HTTP request
pub const USER_AGENT: &str = concat!("tf-version-inspect/", env!("CARGO_PKG_VERSION"));

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Inspector configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct InspectConfig {
    pub releases: ReleasesConfig,
    pub image: ImageConfig,
    /// Accept prerelease versions whose core satisfies the constraint
    pub prerelease: bool,
    /// Deadline for the whole resolution in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Release index configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleasesConfig {
    pub endpoint: String,
    pub page_limit: usize,
}

impl Default for ReleasesConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RELEASES_ENDPOINT.to_string(),
            page_limit: RELEASE_LIST_LIMIT,
        }
    }
}

/// Runtime image configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    /// Registry the image must be published to; no check when unset
    pub registry: Option<String>,
    pub namespace: String,
    pub name: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            registry: None,
            namespace: IMAGE_NAMESPACE.to_string(),
            name: IMAGE_NAME.to_string(),
        }
    }
}

impl InspectConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.releases.page_limit == 0 {
            return Err(ConfigError::Invalid(
                "releases.pageLimit must be greater than zero".to_string(),
            ));
        }
        if self.image.namespace.is_empty() || self.image.name.is_empty() {
            return Err(ConfigError::Invalid(
                "image.namespace and image.name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read a configuration file
pub fn load(path: &Path) -> Result<InspectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the explicitly given file, or the default file when it exists.
///
/// Falls back to [`InspectConfig::default`] only when no path was given and
/// the default file is absent.
pub fn load_or_default(path: Option<&Path>) -> Result<InspectConfig, ConfigError> {
    match path {
        Some(path) => load(path),
        None => {
            let path = config_path();
            if path.is_file() {
                load(&path)
            } else {
                Ok(InspectConfig::default())
            }
        }
    }
}

/// Returns the path to the config directory for tf-version-inspect.
/// Uses $XDG_CONFIG_HOME/tf-version-inspect if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/tf-version-inspect,
/// or ./tf-version-inspect if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("tf-version-inspect")
}

/// HTTP client shared by the release index and the registry checker
pub fn http_client() -> Result<reqwest::Client, ConfigError> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}
