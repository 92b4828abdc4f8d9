use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Copy recipient for every emailed report unless overridden.
pub const DEFAULT_REPORT_CC_EMAIL: &str = "support@qse-academy.com";
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 2 * 60 * 60;
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Deployment stage, from `APP_ENV`. Unrecognised values fall back to development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the readiness service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub delivery: DeliveryConfig,
    pub sessions: SessionLimits,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = non_empty_var("APP_ENV")
            .map(|value| AppEnvironment::parse(&value))
            .unwrap_or(AppEnvironment::Development);

        let host = non_empty_var("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match non_empty_var("APP_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            None => 3000,
        };

        let log_level = non_empty_var("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            delivery: DeliveryConfig::from_env()?,
            sessions: SessionLimits::from_env()?,
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

/// Where completed reports go besides the participant's inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub cc_email: String,
    /// CRM relay is disabled when unset.
    pub crm_webhook_url: Option<String>,
    /// Completed reports are also written here as `<assessment-id>.html`.
    pub report_dir: Option<PathBuf>,
}

impl DeliveryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let cc_email = non_empty_var("ISO_REPORT_CC_EMAIL")
            .unwrap_or_else(|| DEFAULT_REPORT_CC_EMAIL.to_string());
        if !cc_email.contains('@') {
            return Err(ConfigError::InvalidCcEmail);
        }

        let crm_webhook_url = non_empty_var("ISO_CRM_WEBHOOK_URL");
        if let Some(url) = &crm_webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidWebhookUrl);
            }
        }

        Ok(Self {
            cc_email,
            crm_webhook_url,
            report_dir: non_empty_var("ISO_REPORT_DIR").map(PathBuf::from),
        })
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            cc_email: DEFAULT_REPORT_CC_EMAIL.to_string(),
            crm_webhook_url: None,
            report_dir: None,
        }
    }
}

/// Bounds on the in-memory session map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Sessions untouched for longer than this are dropped.
    pub idle_ttl: Duration,
    /// Starting a session beyond this evicts the least recently touched one.
    pub max_sessions: usize,
}

impl SessionLimits {
    fn from_env() -> Result<Self, ConfigError> {
        let idle_secs = match non_empty_var("ISO_SESSION_TTL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSessionLimit("ISO_SESSION_TTL_SECS"))?,
            None => DEFAULT_SESSION_IDLE_SECS,
        };
        let max_sessions = match non_empty_var("ISO_MAX_SESSIONS") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|max| *max > 0)
                .ok_or(ConfigError::InvalidSessionLimit("ISO_MAX_SESSIONS"))?,
            None => DEFAULT_MAX_SESSIONS,
        };

        Ok(Self {
            idle_ttl: Duration::from_secs(idle_secs),
            max_sessions,
        })
    }
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCcEmail,
    InvalidWebhookUrl,
    InvalidSessionLimit(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCcEmail => {
                write!(f, "ISO_REPORT_CC_EMAIL must be an email address")
            }
            ConfigError::InvalidWebhookUrl => {
                write!(f, "ISO_CRM_WEBHOOK_URL must be an http(s) URL")
            }
            ConfigError::InvalidSessionLimit(name) => {
                write!(f, "{name} must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCcEmail
            | ConfigError::InvalidWebhookUrl
            | ConfigError::InvalidSessionLimit(_) => None,
        }
    }
}
