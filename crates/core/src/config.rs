//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable request tracing.
    #[serde(default)]
    pub enable_tracing: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            enable_tracing: false,
        }
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
        /// Advisory query timeout in seconds. SQLite cannot force-cancel
        /// queries; exceeding this only logs a warning.
        #[serde(default = "default_sqlite_query_timeout_secs")]
        query_timeout_secs: Option<u64>,
    },
}

fn default_sqlite_query_timeout_secs() -> Option<u64> {
    Some(600)
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/metadata.db"),
            query_timeout_secs: default_sqlite_query_timeout_secs(),
        }
    }
}

/// Remote repository coordinates for the git backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Access token used in the push URL.
    /// WARNING: Prefer the RELINK_REPO__REMOTE__TOKEN env var over storing
    /// the token in a config file.
    pub token: String,
    /// CDN prefix the published files are served from.
    #[serde(default = "default_cdn_base")]
    pub cdn_base: String,
}

fn default_cdn_base() -> String {
    "https://cdn.jsdelivr.net/gh".to_string()
}

impl RemoteConfig {
    /// The authenticated push URL for this remote.
    pub fn push_url(&self) -> String {
        format!(
            "https://{}@github.com/{}/{}.git",
            self.token, self.owner, self.repo
        )
    }

    /// The public URL of a published file on the given branch.
    pub fn public_url(&self, branch_name: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}@{}/{}",
            self.cdn_base, self.owner, self.repo, branch_name, filename
        )
    }
}

/// Git backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Local clone directory.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Staging directory for fetched files awaiting publish.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    /// Remote repository coordinates.
    pub remote: RemoteConfig,
    /// Poll interval of the upload scheduler in milliseconds.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    /// Capacity ceiling of a single branch in bytes.
    #[serde(default = "default_max_branch_size")]
    pub max_branch_size: u64,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("./data/repo")
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("./data/staging")
}

fn default_flush_interval_ms() -> u64 {
    crate::DEFAULT_FLUSH_INTERVAL_MS
}

fn default_max_branch_size() -> u64 {
    crate::DEFAULT_MAX_BRANCH_SIZE
}

impl RepoConfig {
    /// Get the flush interval as a Duration.
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Validate repository configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.remote.owner.is_empty() || self.remote.repo.is_empty() {
            return Err("repo config requires remote.owner and remote.repo".to_string());
        }
        if self.remote.token.is_empty() {
            return Err("repo config requires remote.token".to_string());
        }
        if self.max_branch_size == 0 {
            return Err("repo.max_branch_size must be greater than zero".to_string());
        }
        if self.flush_interval_ms == 0 {
            return Err(
                "repo.flush_interval_ms cannot be 0; this would spin the scheduler loop"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Source fetch configuration for the content analyzer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum size of a single fetched file in bytes.
    #[serde(default = "default_max_fetch_size")]
    pub max_size: u64,
    /// Fetch timeout in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub timeout_ms: u64,
    /// URL prefixes that are already durable and are returned unchanged
    /// without re-hosting.
    #[serde(default)]
    pub whitelist: Vec<String>,
}

fn default_max_fetch_size() -> u64 {
    crate::DEFAULT_MAX_FETCH_SIZE
}

fn default_fetch_timeout_ms() -> u64 {
    30_000
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_fetch_size(),
            timeout_ms: default_fetch_timeout_ms(),
            whitelist: Vec::new(),
        }
    }
}

impl FetchConfig {
    /// Get the fetch timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Git backend configuration (required).
    pub repo: RepoConfig,
    /// Source fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl AppConfig {
    /// Validate all configuration sections.
    pub fn validate(&self) -> Result<(), String> {
        self.repo.validate()
    }

    /// Create a test configuration rooted at the given directory.
    ///
    /// **For testing only.** Uses SQLite metadata and dummy remote
    /// coordinates.
    pub fn for_testing(root: &std::path::Path) -> Self {
        Self {
            server: ServerConfig::default(),
            metadata: MetadataConfig::Sqlite {
                path: root.join("metadata.db"),
                query_timeout_secs: default_sqlite_query_timeout_secs(),
            },
            repo: RepoConfig {
                base_dir: root.join("repo"),
                temp_dir: root.join("staging"),
                remote: RemoteConfig {
                    owner: "test-owner".to_string(),
                    repo: "test-repo".to_string(),
                    token: "test-token".to_string(),
                    cdn_base: default_cdn_base(),
                },
                flush_interval_ms: 20,
                max_branch_size: default_max_branch_size(),
            },
            fetch: FetchConfig::default(),
        }
    }
}
