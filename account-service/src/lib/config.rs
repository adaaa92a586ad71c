use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub reset: ResetConfig,
    pub mailer: MailerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub secret: String,
    /// Sets the `Secure` attribute on the session cookie. On in production.
    #[serde(default)]
    pub secure_cookie: bool,
}

impl SessionConfig {
    /// Lifetime of a session token and of its cookie. Fixed, not configurable.
    pub fn validity(&self) -> chrono::Duration {
        chrono::Duration::hours(auth::Authenticator::DEFAULT_SESSION_VALIDITY_HOURS)
    }
}

/// Argon2 cost parameters for password hashing
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let cost = auth::HashingCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
        }
    }
}

impl From<&PasswordConfig> for auth::HashingCost {
    fn from(config: &PasswordConfig) -> Self {
        auth::HashingCost {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResetConfig {
    pub token_ttl_minutes: i64,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            token_ttl_minutes: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailerConfig {
    /// HTTP endpoint of the transactional mail provider
    pub endpoint: String,
    pub api_key: String,
    pub sender: String,
    /// Frontend page that receives `token` and `user` query parameters
    pub reset_url: String,
    #[serde(default = "default_mailer_timeout")]
    pub timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_mailer_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, SESSION__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: MAILER__API_KEY=... overrides mailer.api_key
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        if config.session.secret.len() < 32 {
            return Err(ConfigError::Message(
                "session.secret must be at least 32 bytes".to_string(),
            ));
        }

        Ok(config)
    }
}
