use std::net::SocketAddr;

use anyhow::{Context, Result};

pub const APP_NAME: &str = "shopgen";
pub const DEFAULT_V0_API_URL: &str = "https://api.v0.dev/v1";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;

pub const ENV_V0_API_KEY: &str = "V0_API_KEY";
pub const ENV_V0_API_URL: &str = "V0_API_URL";
pub const ENV_HOST: &str = "SHOPGEN_HOST";
pub const ENV_PORT: &str = "SHOPGEN_PORT";
pub const ENV_CORS_PERMISSIVE: &str = "SHOPGEN_CORS_PERMISSIVE";

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub v0_api_key: Option<String>,
    pub v0_api_url: String,
    pub cors_permissive: bool,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("v0_api_key", &self.v0_api_key.as_ref().map(|_| "***"))
            .field("v0_api_url", &self.v0_api_url)
            .field("cors_permissive", &self.cors_permissive)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            v0_api_key: None,
            v0_api_url: DEFAULT_V0_API_URL.to_string(),
            cors_permissive: false,
        }
    }
}

impl ServerConfig {
    /// Read the server configuration from the process environment.
    ///
    /// A missing `V0_API_KEY` is not an error here: the proxy still starts and
    /// answers every chat request with a configuration error instead.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup(ENV_PORT) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {}", ENV_PORT, raw))?,
            None => defaults.port,
        };

        let cors_permissive = lookup(ENV_CORS_PERMISSIVE)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.cors_permissive);

        Ok(Self {
            host: non_blank(lookup(ENV_HOST)).unwrap_or(defaults.host),
            port,
            v0_api_key: non_blank(lookup(ENV_V0_API_KEY)),
            v0_api_url: non_blank(lookup(ENV_V0_API_URL)).unwrap_or(defaults.v0_api_url),
            cors_permissive,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
