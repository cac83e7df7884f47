use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::orchestrator::IngestionConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub repository: RepositoryConfig,
    pub principal: PrincipalConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for any request body, multipart and batch uploads included.
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_max_request_bytes() -> usize {
    64 * 1024 * 1024
}

/// Inbound caller authentication
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Expected key when `method = "api_key"`
    #[serde(default)]
    pub api_key: Option<String>,
    /// Header carrying the caller's key (a `Bearer` authorization header is also accepted)
    #[serde(default = "default_api_key_header")]
    pub header: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

/// Remote document repository
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    /// Base URL (e.g., "https://dms.example.com/api")
    pub url: String,
    /// Service API key sent on every repository call
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    /// Timeout for store/list/fetch calls (default: 30)
    #[serde(default = "default_repository_timeout")]
    pub timeout_secs: u32,
    /// Timeout for ticket issuance (default: 20)
    #[serde(default = "default_login_timeout")]
    pub login_timeout_secs: u32,
}

fn default_repository_timeout() -> u32 {
    30
}

fn default_login_timeout() -> u32 {
    20
}

/// Service identity used to obtain repository tickets.
#[derive(Clone, Deserialize, Serialize)]
pub struct PrincipalConfig {
    pub user_id: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for PrincipalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalConfig")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Local metadata index
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    #[serde(default = "default_index_path")]
    pub path: PathBuf,
    /// Table holding index records
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
            collection: default_collection(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

fn default_index_path() -> PathBuf {
    PathBuf::from("docvault.db")
}

fn default_collection() -> String {
    "documents".to_string()
}

fn default_busy_timeout() -> u64 {
    5000
}

/// Logging configuration. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub repository: SanitizedRepositoryConfig,
    pub principal: SanitizedPrincipalConfig,
    pub index: IndexConfig,
    pub ingestion: IngestionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: AuthMethod,
    pub header: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRepositoryConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub api_key_header: String,
    pub timeout_secs: u32,
    pub login_timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedPrincipalConfig {
    pub user_id: String,
    pub password_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: config.auth.method,
                header: config.auth.header.clone(),
            },
            server: config.server.clone(),
            repository: SanitizedRepositoryConfig {
                url: config.repository.url.clone(),
                api_key_configured: !config.repository.api_key.is_empty(),
                api_key_header: config.repository.api_key_header.clone(),
                timeout_secs: config.repository.timeout_secs,
                login_timeout_secs: config.repository.login_timeout_secs,
            },
            principal: SanitizedPrincipalConfig {
                user_id: config.principal.user_id.clone(),
                password_configured: !config.principal.password.is_empty(),
            },
            index: config.index.clone(),
            ingestion: config.ingestion.clone(),
            logging: config.logging.clone(),
        }
    }
}
