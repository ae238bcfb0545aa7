//! For reading application configuration.

use serde::Deserialize;

/// Application configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server address.
    pub http_address: String,
    /// Server http port.
    pub http_port: u16,
}

impl ServerConfig {
    /// The address to bind the listener to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.http_address, self.http_port)
    }
}

/// Database configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// The database username.
    pub username: String,
    /// The database password.
    pub password: String,
    /// The database port.
    pub port: u16,
    /// The database name.
    pub database_name: String,
    /// The database host.
    pub host: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("port", &self.port)
            .field("database_name", &self.database_name)
            .field("host", &self.host)
            .finish()
    }
}

/// How log lines are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// The output format.
    pub format: LogFormat,
}

/// The flat set of variables the process environment provides.
#[derive(Deserialize)]
struct EnvConfig {
    host: String,
    port: u16,
    db_host: String,
    db_port: u16,
    db_user: String,
    db_password: String,
    db_name: String,
    log_format: LogFormat,
}

impl From<EnvConfig> for Config {
    fn from(env: EnvConfig) -> Self {
        Config {
            server: ServerConfig {
                http_address: env.host,
                http_port: env.port,
            },
            database: DatabaseConfig {
                username: env.db_user,
                password: env.db_password,
                port: env.db_port,
                database_name: env.db_name,
                host: env.db_host,
            },
            logging: LoggingConfig {
                format: env.log_format,
            },
        }
    }
}

/// Retrieve [`Config`] from the optional configuration file and the process environment.
#[tracing::instrument]
pub fn load_config() -> Result<Config, config::ConfigError> {
    load_config_from(None)
}

/// Retrieve [`Config`], reading environment variables from `env` instead of the process if given.
pub fn load_config_from(
    env: Option<config::Map<String, String>>,
) -> Result<Config, config::ConfigError> {
    let config: EnvConfig = config::Config::builder()
        .set_default("host", "0.0.0.0")?
        .set_default("port", 3000)?
        .set_default("db_port", 3306)?
        .set_default("log_format", "pretty")?
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::Environment::default().source(env))
        .build()?
        .try_deserialize()?;
    Ok(config.into())
}
