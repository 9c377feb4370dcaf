use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use s3commander_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Runtime configuration loaded from the process environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub storage_gateway_url: Url,
    pub storage_gateway_token: String,
    pub directory_url: Url,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let storage_gateway_url = parse_url_env("STORAGE_GATEWAY_URL")?;
        let storage_gateway_token = required_non_empty_env("STORAGE_GATEWAY_TOKEN")?;
        let directory_url = parse_url_env("DIRECTORY_URL")?;

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            storage_gateway_url,
            storage_gateway_token,
            directory_url,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_url_env(name: &str) -> Result<Url, AppError> {
    let value = required_non_empty_env(name)?;
    // A trailing slash keeps Url::join from swallowing the last path segment.
    let value = if value.ends_with('/') {
        value
    } else {
        format!("{value}/")
    };

    Url::parse(&value).map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
}
