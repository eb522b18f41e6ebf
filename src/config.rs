//! Configuration for probe-server.
//!
//! Everything is read from environment variables once at startup and frozen
//! into a [`Config`] that is shared with every handler. Unset or empty
//! variables fall back to fixed defaults; only values that cannot be used at
//! all (a non-numeric `PORT`, an unknown `LOG_FORMAT`) are rejected.
//!
//! | Variable                     | Default          |
//! |------------------------------|------------------|
//! | `PORT`                       | `3000`           |
//! | `APP_VERSION`                | `3.0.0`          |
//! | `APP_ENV` / `NODE_ENV`       | `production`     |
//! | `KUBERNETES_NAMESPACE`       | `default`        |
//! | `HOSTNAME`                   | OS hostname      |
//! | `KUBERNETES_SERVICE_ACCOUNT` | `default`        |
//! | `KUBERNETES_NODE_NAME`       | `unknown`        |
//! | `LOG_FORMAT`                 | `text`           |

/// Startup configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be an integer in 0..=65535, got `{0}`")]
    InvalidPort(String),
    #[error("LOG_FORMAT must be `text` or `json`, got `{0}`")]
    InvalidLogFormat(String),
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// One JSON object per event, for log shippers.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// Immutable service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port to listen on (bound on `0.0.0.0`).
    pub port: u16,
    /// Reported application version.
    pub version: String,
    /// Runtime environment name, e.g. `production` or `staging`.
    pub environment: String,
    pub kubernetes: KubernetesConfig,
    pub log_format: LogFormat,
}

/// Pod metadata injected by the orchestrator (usually via the downward API).
#[derive(Debug, Clone)]
pub struct KubernetesConfig {
    pub namespace: String,
    /// `HOSTNAME` as set by the kubelet; falls back to the OS hostname.
    pub pod_name: String,
    pub service_account: String,
    pub node_name: String,
}

impl Config {
    /// Load from the process environment.
    ///
    /// `os_hostname` is used as the pod name when `HOSTNAME` is unset.
    pub fn from_env(os_hostname: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), os_hostname)
    }

    /// Load using an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F, os_hostname: &str) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults::PORT,
        };

        let log_format = match var("LOG_FORMAT") {
            Some(raw) => raw.trim().parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            port,
            version: or("APP_VERSION", defaults::VERSION),
            environment: var("APP_ENV")
                .or_else(|| var("NODE_ENV"))
                .unwrap_or_else(|| defaults::ENVIRONMENT.to_string()),
            kubernetes: KubernetesConfig {
                namespace: or("KUBERNETES_NAMESPACE", defaults::NAMESPACE),
                pod_name: or("HOSTNAME", os_hostname),
                service_account: or("KUBERNETES_SERVICE_ACCOUNT", defaults::SERVICE_ACCOUNT),
                node_name: or("KUBERNETES_NODE_NAME", defaults::NODE_NAME),
            },
            log_format,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: defaults::PORT,
            version: defaults::VERSION.into(),
            environment: defaults::ENVIRONMENT.into(),
            kubernetes: KubernetesConfig {
                namespace: defaults::NAMESPACE.into(),
                pod_name: "localhost".into(),
                service_account: defaults::SERVICE_ACCOUNT.into(),
                node_name: defaults::NODE_NAME.into(),
            },
            log_format: LogFormat::Text,
        }
    }
}

pub mod defaults {
    pub const PORT: u16 = 3000;
    pub const VERSION: &str = "3.0.0";
    pub const ENVIRONMENT: &str = "production";
    pub const NAMESPACE: &str = "default";
    pub const SERVICE_ACCOUNT: &str = "default";
    pub const NODE_NAME: &str = "unknown";
}
