//! Configuration loading and constants.
//!
//! Loads application configuration from an optional TOML file and defines
//! constants for HTTP cache TTLs, openFDA retry behavior, result limits, and
//! default paths. `AppConfig` is the root configuration struct containing all
//! settings. The `PORT` environment variable, when set, overrides the
//! configured listen port so the binary satisfies the container platform's
//! port convention without any config file present.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================
// These constants control Cache-Control headers for upstream caches (CDNs,
// reverse proxies). All values are in seconds. Directives used:
// - max-age: How long the response is considered fresh
// - stale-while-revalidate: Serve stale while fetching fresh in background
// - stale-if-error: Serve stale content if origin returns 5xx

/// Label data - FDA labels change rarely, long cache is safe
pub const HTTP_CACHE_LABELS_MAX_AGE: u32 = 3600;
pub const HTTP_CACHE_LABELS_SWR: u32 = 300;

/// Service index - static per build
pub const HTTP_CACHE_INDEX_MAX_AGE: u32 = 300;

/// Error responses - short TTL to prevent thundering herd while allowing quick recovery
pub const HTTP_CACHE_ERROR_MAX_AGE: u32 = 5;

/// Stale-if-error duration - serve stale content during upstream failures
pub const HTTP_CACHE_STALE_IF_ERROR: u32 = 600;

// Pre-formatted Cache-Control header values (compile-time string concatenation)
pub const CACHE_CONTROL_LABELS: &str = formatcp!(
    "public, max-age={}, stale-while-revalidate={}, stale-if-error={}",
    HTTP_CACHE_LABELS_MAX_AGE,
    HTTP_CACHE_LABELS_SWR,
    HTTP_CACHE_STALE_IF_ERROR
);

pub const CACHE_CONTROL_INDEX: &str =
    formatcp!("public, max-age={}", HTTP_CACHE_INDEX_MAX_AGE);

pub const CACHE_CONTROL_ERROR: &str = formatcp!("public, max-age={}", HTTP_CACHE_ERROR_MAX_AGE);

/// Health responses must never be satisfied by an intermediary cache
pub const CACHE_CONTROL_HEALTH: &str = "no-store";

// =============================================================================
// openFDA Query Constants
// =============================================================================

/// Default number of label records returned per query
pub const DEFAULT_RESULT_LIMIT: usize = 3;

/// Maximum number of label records returned per query
pub const MAX_RESULT_LIMIT: usize = 10;

/// Maximum normalized NDC forms tried per query
pub const MAX_NDC_FORMS: usize = 3;

/// openFDA search expression that matches every label
pub const MATCH_ALL_EXPRESSION: &str = "*:*";

// =============================================================================
// openFDA Retry and Coalescing Constants
// =============================================================================

/// Pause in milliseconds between retried openFDA requests
pub const OPENFDA_RETRY_PAUSE_MS: u64 = 250;

/// TTL in seconds for the negative cache (queries that matched nothing)
pub const NEGATIVE_CACHE_TTL_SECS: u64 = 30;

/// Divisor for negative cache size (relative to the label cache)
pub const NEGATIVE_CACHE_SIZE_DIVISOR: u64 = 4;

/// Capacity of broadcast channels for request coalescing
pub const BROADCAST_CHANNEL_CAPACITY: usize = 16;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "apothecary=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Environment variable the container platform uses to assign the listen port
pub const PORT_ENV_VAR: &str = "PORT";

/// Default listen port when neither config nor PORT provide one
pub const DEFAULT_PORT: u16 = 8080;

/// The openFDA drug label endpoint
pub const OPENFDA_LABEL_URL: &str = "https://api.fda.gov/drug/label.json";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// openFDA upstream settings
    #[serde(default)]
    pub openfda: OpenFdaSettings,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
    /// Upper bound on label-route handling time, so a wedged upstream cannot
    /// pin every connection (health probes stay responsive regardless)
    #[serde(default = "HttpServerConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// How long in-flight requests may drain after SIGTERM/SIGINT
    #[serde(default = "HttpServerConfig::default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl HttpServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }

    fn default_request_timeout() -> u64 {
        20
    }

    fn default_shutdown_grace() -> u64 {
        30
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_seconds: Self::default_request_timeout(),
            shutdown_grace_seconds: Self::default_shutdown_grace(),
        }
    }
}

/// openFDA upstream settings
#[derive(Debug, Clone, Deserialize)]
pub struct OpenFdaSettings {
    /// Base URL of the drug label endpoint (overridable for tests)
    #[serde(default = "OpenFdaSettings::default_base_url")]
    pub base_url: String,
    /// Per-attempt request timeout in seconds
    #[serde(default = "OpenFdaSettings::default_timeout")]
    pub timeout_seconds: u64,
    /// Attempts per query before the error is surfaced to the caller
    #[serde(default = "OpenFdaSettings::default_max_retries")]
    pub max_retries: u32,
}

impl OpenFdaSettings {
    fn default_base_url() -> String {
        OPENFDA_LABEL_URL.to_string()
    }

    fn default_timeout() -> u64 {
        30
    }

    fn default_max_retries() -> u32 {
        3
    }
}

impl Default for OpenFdaSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_seconds: Self::default_timeout(),
            max_retries: Self::default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL for cached label sets in seconds (default: 1 hour)
    #[serde(default = "CacheConfig::default_label_ttl")]
    pub label_ttl_seconds: u64,
    /// Maximum number of cached label sets (default: 1000)
    #[serde(default = "CacheConfig::default_max_label_sets")]
    pub max_label_sets: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            label_ttl_seconds: Self::default_label_ttl(),
            max_label_sets: Self::default_max_label_sets(),
        }
    }
}

impl CacheConfig {
    fn default_label_ttl() -> u64 {
        3600
    }

    fn default_max_label_sets() -> u64 {
        1000
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// A missing file is not an error: the container deployment carries no
    /// config file and runs entirely on defaults plus the `PORT` variable.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            AppConfig::default()
        };

        config.apply_port_override(std::env::var(PORT_ENV_VAR).ok().as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the `PORT` environment override, if present.
    ///
    /// Split out from `load` so the parsing rules are testable without
    /// touching process environment.
    pub fn apply_port_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        if let Some(raw) = value {
            let port: u16 = raw.parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "{} must be a port number between 1 and 65535, got '{}'",
                    PORT_ENV_VAR, raw
                ))
            })?;
            if port == 0 {
                return Err(ConfigError::Validation(format!(
                    "{} must be between 1 and 65535",
                    PORT_ENV_VAR
                )));
            }
            self.http.port = port;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.openfda.base_url).map_err(|e| {
            ConfigError::Validation(format!(
                "openfda.base_url '{}' is not a valid URL: {}",
                self.openfda.base_url, e
            ))
        })?;
        if self.openfda.max_retries == 0 {
            return Err(ConfigError::Validation(
                "openfda.max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
