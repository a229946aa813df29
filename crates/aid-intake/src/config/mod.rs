use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the intake service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub assist: AssistConfig,
    pub submission: SubmissionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let draft_dir = env::var("APP_DRAFT_DIR").ok().map(PathBuf::from);
        let locations_path = env::var("APP_LOCATIONS_PATH").ok().map(PathBuf::from);

        let mut assist = AssistConfig::default();
        if let Ok(endpoint) = env::var("APP_ASSIST_ENDPOINT") {
            assist.endpoint = endpoint;
        }
        if let Ok(model) = env::var("APP_ASSIST_MODEL") {
            assist.model = model;
        }
        if let Ok(var) = env::var("APP_ASSIST_API_KEY_VAR") {
            assist.api_key_var = var;
        }
        if let Ok(raw) = env::var("APP_ASSIST_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    variable: "APP_ASSIST_TIMEOUT_SECS",
                })?;
            assist.timeout = Duration::from_secs(secs);
        }

        let mut submission = SubmissionConfig::default();
        if let Ok(raw) = env::var("APP_SUBMISSION_DELAY_MS") {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    variable: "APP_SUBMISSION_DELAY_MS",
                })?;
            submission.delay = Duration::from_millis(millis);
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                draft_dir,
                locations_path,
            },
            assist,
            submission,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where drafts are persisted and where the location dataset is read from.
///
/// A missing `draft_dir` keeps drafts in memory; a missing `locations_path`
/// falls back to the bundled dataset.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub draft_dir: Option<PathBuf>,
    pub locations_path: Option<PathBuf>,
}

/// Text-generation collaborator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    /// Name of the environment variable holding the bearer credential.
    pub api_key_var: String,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(15),
            api_key_var: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Mock submission backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionConfig {
    pub delay: Duration,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(800),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
