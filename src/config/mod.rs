use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("FATAL ERROR: jwtPrivateKey is not defined.")]
    MissingJwtPrivateKey,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub rentals: RentalsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_private_key: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalsConfig {
    /// Insert the rental and decrement stock inside one store transaction.
    /// When false the two writes run back to back with no rollback.
    pub atomic_issue: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Plain-text copy of every log line. `None` logs to stdout only.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("logfile.log")),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment. The token
    /// signing key has no default and must be provided.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        if config.security.jwt_private_key.is_empty() {
            return Err(ConfigError::MissingJwtPrivateKey);
        }

        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("VIDLY_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = parse_var("PORT", &v)?;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT") {
            self.database.connect_timeout_secs = parse_var("DATABASE_CONNECT_TIMEOUT", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = parse_var("DATABASE_RUN_MIGRATIONS", &v)?;
        }

        // API overrides
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = parse_var("API_DEFAULT_PAGE_SIZE", &v)?;
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = parse_var("API_MAX_PAGE_SIZE", &v)?;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = parse_var("API_ENABLE_REQUEST_LOGGING", &v)?;
        }

        // Security overrides
        if let Ok(v) = env::var("VIDLY_JWT_PRIVATE_KEY") {
            self.security.jwt_private_key = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_var("SECURITY_JWT_EXPIRY_HOURS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = parse_var("SECURITY_BCRYPT_COST", &v)?;
        }

        // Rental overrides
        if let Ok(v) = env::var("RENTALS_ATOMIC_ISSUE") {
            self.rentals.atomic_issue = parse_var("RENTALS_ATOMIC_ISSUE", &v)?;
        }

        // Logging overrides, an empty value disables the file
        if let Ok(v) = env::var("LOG_FILE") {
            self.logging.file = log_file(&v);
        }

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connect_timeout_secs: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                default_page_size: 10,
                max_page_size: 1000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_private_key: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                bcrypt_cost: 10,
            },
            rentals: RentalsConfig { atomic_issue: true },
            logging: LoggingConfig::default(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connect_timeout_secs: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                default_page_size: 10,
                max_page_size: 500,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_private_key: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: 10,
            },
            rentals: RentalsConfig { atomic_issue: true },
            logging: LoggingConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connect_timeout_secs: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                default_page_size: 10,
                max_page_size: 100,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                jwt_private_key: String::new(),
                jwt_expiry_hours: 4,
                bcrypt_cost: 12,
            },
            rentals: RentalsConfig { atomic_issue: true },
            logging: LoggingConfig::default(),
        }
    }

    /// Development defaults with a fixed signing key and the cheapest bcrypt cost.
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.security.jwt_private_key = "test-private-key".to_string();
        config.security.bcrypt_cost = 4;
        config.api.enable_request_logging = false;
        config.logging.file = None;
        config
    }
}

fn log_file(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
