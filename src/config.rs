//! Portal configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::time::Duration;

use crate::session::RoutePolicy;

/// Portal configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin, e.g. `https://portal.example.com`
    pub backend_url: String,
    /// Path prefix of the REST API on the backend
    pub api_prefix: String,
    /// Public URL of the frontend, prefixed to routes by [`Config::page_url`]
    pub frontend_url: String,
    /// Per-request timeout for backend calls
    pub http_timeout: Duration,
    /// Optional `name=value` cookie seeding the client's cookie jar
    pub session_cookie: Option<String>,
    /// Login route the gate redirects anonymous visitors to
    pub login_path: String,
    /// Authenticated landing route
    pub home_path: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            api_prefix: "/api/v1".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            http_timeout: Duration::from_secs(10),
            session_cookie: None,
            login_path: "/login".to_string(),
            home_path: "/".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let backend_url = env::var("BACKEND_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .map_err(|_| ConfigError::Missing("BACKEND_URL"))?;
        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(ConfigError::Invalid("BACKEND_URL", backend_url));
        }

        let http_timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid("HTTP_TIMEOUT_SECS", raw))?,
            Err(_) => Duration::from_secs(10),
        };

        Ok(Self {
            backend_url,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            http_timeout,
            session_cookie: env::var("SESSION_COOKIE")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            login_path: env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".to_string()),
            home_path: env::var("HOME_PATH").unwrap_or_else(|_| "/".to_string()),
        })
    }

    /// Absolute frontend URL of an in-app route.
    pub fn page_url(&self, route: &str) -> String {
        format!("{}/{}", self.frontend_url, route.trim_start_matches('/'))
    }

    /// Config pointing at a local fake backend.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Full base URL of the REST API.
    pub fn api_base_url(&self) -> String {
        format!(
            "{}/{}",
            self.backend_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
    }

    /// Redirect policy using the configured login and home routes.
    pub fn route_policy(&self) -> RoutePolicy {
        RoutePolicy {
            home_path: self.home_path.clone(),
            login_path: self.login_path.clone(),
            ..RoutePolicy::default()
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
