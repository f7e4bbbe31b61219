//! Configuration module
//!
//! Process settings for the HTTP service, read from the environment. The
//! upload routing tables live in a separate mapping file whose path is part
//! of this configuration.

use std::env;
use std::path::PathBuf;

const SERVER_PORT: u16 = 4000;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Output format of the log subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Settings shared by every process of the workspace.
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    /// Authored mapping file (YAML or JSON).
    pub mapping_config_path: PathBuf,
    /// Seed for the in-memory host. `None` starts with an empty host.
    pub host_fixture_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            log_format: LogFormat::parse(&lookup("LOG_FORMAT").unwrap_or_default()),
        };

        let mapping_config_path = lookup("MAPPING_CONFIG_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| anyhow::anyhow!("MAPPING_CONFIG_PATH must be set"))?;

        let host_fixture_path = lookup("HOST_FIXTURE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Config {
            base,
            mapping_config_path,
            host_fixture_path,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be greater than 0"));
        }
        if !self.mapping_config_path.exists() {
            return Err(anyhow::anyhow!(
                "MAPPING_CONFIG_PATH {} does not exist",
                self.mapping_config_path.display()
            ));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.base.request_timeout_secs
    }

    pub fn log_format(&self) -> LogFormat {
        self.base.log_format
    }

    pub fn mapping_config_path(&self) -> &std::path::Path {
        &self.mapping_config_path
    }

    pub fn host_fixture_path(&self) -> Option<&std::path::Path> {
        self.host_fixture_path.as_deref()
    }
}

fn is_production_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}
