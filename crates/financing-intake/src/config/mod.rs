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

/// Top-level configuration for the intake service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

pub const DEFAULT_REFER_THRESHOLD: f64 = 0.5;

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

        let scoring = ScoringConfig::from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring,
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

/// Location of the optional fraud classifier and the threshold applied to its output.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub model_path: Option<PathBuf>,
    pub reference_path: Option<PathBuf>,
    pub refer_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            reference_path: None,
            refer_threshold: DEFAULT_REFER_THRESHOLD,
        }
    }
}

impl ScoringConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let model_path = non_empty_var("SCORING_MODEL_PATH").map(PathBuf::from);
        let reference_path = non_empty_var("SCORING_REFERENCE_PATH").map(PathBuf::from);

        if model_path.is_some() && reference_path.is_none() {
            return Err(ConfigError::MissingReferenceDataset);
        }

        let refer_threshold = match non_empty_var("SCORING_THRESHOLD") {
            Some(raw) => parse_threshold(&raw)?,
            None => DEFAULT_REFER_THRESHOLD,
        };

        Ok(Self {
            model_path,
            reference_path,
            refer_threshold,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_threshold(raw: &str) -> Result<f64, ConfigError> {
    let value = raw
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidThreshold(raw.to_string()))?;
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidThreshold(raw.to_string()))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidThreshold(String),
    MissingReferenceDataset,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold(value) => write!(
                f,
                "SCORING_THRESHOLD must be a number between 0 and 1 (found '{value}')"
            ),
            ConfigError::MissingReferenceDataset => write!(
                f,
                "SCORING_REFERENCE_PATH is required when SCORING_MODEL_PATH is set"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidThreshold(_)
            | ConfigError::MissingReferenceDataset => None,
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "SCORING_MODEL_PATH",
            "SCORING_REFERENCE_PATH",
            "SCORING_THRESHOLD",
        ] {
            env::remove_var(key);
        }
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
        assert_eq!(config.scoring, ScoringConfig::default());
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
    fn reads_scoring_paths_and_threshold() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_MODEL_PATH", "/srv/models/fraud.json");
        env::set_var("SCORING_REFERENCE_PATH", "/srv/models/reference.csv");
        env::set_var("SCORING_THRESHOLD", "0.65");

        let config = AppConfig::load().expect("config loads");

        assert_eq!(
            config.scoring.model_path,
            Some(PathBuf::from("/srv/models/fraud.json"))
        );
        assert_eq!(config.scoring.refer_threshold, 0.65);
        reset_env();
    }

    #[test]
    fn rejects_threshold_outside_unit_interval() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_THRESHOLD", "1.5");

        match AppConfig::load() {
            Err(ConfigError::InvalidThreshold(value)) => assert_eq!(value, "1.5"),
            other => panic!("expected invalid threshold, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn model_without_reference_dataset_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_MODEL_PATH", "/srv/models/fraud.json");

        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::MissingReferenceDataset)
        ));
        reset_env();
    }
}
