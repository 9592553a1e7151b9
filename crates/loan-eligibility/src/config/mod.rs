use crate::encoder::CreditPolicy;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
    pub chat: ChatConfig,
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

        let model_path = env::var("LOAN_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH));

        let credit_policy = match env::var("LOAN_CREDIT_SCORE_FLOOR") {
            Ok(raw) => {
                let floor = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidCreditFloor { value: raw.clone() })?;
                CreditPolicy::with_floor(floor)
                    .ok_or(ConfigError::InvalidCreditFloor { value: raw })?
            }
            Err(_) => CreditPolicy::default(),
        };

        let session_ttl = env::var("CHAT_SESSION_TTL_MINUTES")
            .unwrap_or_else(|_| DEFAULT_SESSION_TTL_MINUTES.to_string())
            .parse::<i64>()
            .ok()
            .filter(|minutes| *minutes > 0)
            .and_then(chrono::Duration::try_minutes)
            .ok_or(ConfigError::InvalidSessionTtl)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig {
                model_path,
                credit_policy,
            },
            chat: ChatConfig {
                session_ttl,
            },
        })
    }
}

const DEFAULT_MODEL_PATH: &str = "models/loan_model.json";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;

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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Classifier artifact location and feature encoding policy.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub model_path: PathBuf,
    pub credit_policy: CreditPolicy,
}

/// Chat session lifetime.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub session_ttl: chrono::Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCreditFloor { value: String },
    InvalidSessionTtl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCreditFloor { value } => write!(
                f,
                "LOAN_CREDIT_SCORE_FLOOR must be a number between 0 and 1000 (found '{value}')"
            ),
            ConfigError::InvalidSessionTtl => {
                write!(f, "CHAT_SESSION_TTL_MINUTES must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCreditFloor { .. }
            | ConfigError::InvalidSessionTtl => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("LOAN_MODEL_PATH");
        env::remove_var("LOAN_CREDIT_SCORE_FLOOR");
        env::remove_var("CHAT_SESSION_TTL_MINUTES");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(
            config.scoring.model_path,
            PathBuf::from("models/loan_model.json")
        );
        assert_eq!(config.scoring.credit_policy, CreditPolicy::default());
        assert_eq!(config.chat.session_ttl, chrono::Duration::minutes(30));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn credit_floor_override_is_applied() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOAN_CREDIT_SCORE_FLOOR", "800");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.scoring.credit_policy.floor(), 800.0);
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_credit_floor() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOAN_CREDIT_SCORE_FLOOR", "1200");
        let err = AppConfig::load().expect_err("floor above 1000 is rejected");
        assert!(matches!(err, ConfigError::InvalidCreditFloor { .. }));
        reset_env();
    }

    #[test]
    fn rejects_zero_session_ttl() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CHAT_SESSION_TTL_MINUTES", "0");
        let err = AppConfig::load().expect_err("zero ttl is rejected");
        assert!(matches!(err, ConfigError::InvalidSessionTtl));
        reset_env();
    }

    #[test]
    fn rejects_session_ttl_beyond_duration_range() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CHAT_SESSION_TTL_MINUTES", i64::MAX.to_string());
        let err = AppConfig::load().expect_err("oversized ttl is rejected");
        assert!(matches!(err, ConfigError::InvalidSessionTtl));
        reset_env();
    }
}
