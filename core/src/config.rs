//! Credential resolution and client configuration.
//!
//! Explicit values always win. Anything left unset falls back to the
//! environment, read through a lookup function so callers (and tests) can
//! substitute their own source.

use std::fmt;

use crate::error::ApiError;

pub const TOKEN_ENV: &str = "MVP_API_TOKEN";
pub const EMAIL_ENV: &str = "MVP_API_EMAIL";
pub const BASE_URL_ENV: &str = "MVP_API_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://mavenapi-prod.azurewebsites.net/api";

/// Auth token and account email used for every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub auth_token: String,
    pub email: String,
}

// Keeps the bearer token out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("auth_token", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials from explicit values, then the process environment.
    pub fn resolve(auth_token: Option<&str>, email: Option<&str>) -> Result<Self, ApiError> {
        Self::resolve_with(auth_token, email, |key| std::env::var(key).ok())
    }

    /// Same as `resolve`, with `lookup` standing in for the environment.
    pub fn resolve_with<F>(auth_token: Option<&str>, email: Option<&str>, lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_token = pick(auth_token, TOKEN_ENV, &lookup)
            .ok_or_else(|| ApiError::config(format!("{TOKEN_ENV} is required")))?;
        let email = pick(email, EMAIL_ENV, &lookup)
            .ok_or_else(|| ApiError::config(format!("{EMAIL_ENV} is required")))?;
        Ok(Self { auth_token, email })
    }
}

/// Empty strings count as missing, both for explicit values and env vars.
fn pick<F>(explicit: Option<&str>, key: &str, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| lookup(key).filter(|v| !v.is_empty()))
}

/// Everything `MvpActivitiesClient` needs besides a transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
}

impl ClientConfig {
    pub fn new(base_url: &str, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Resolve credentials and base URL from explicit values and the environment.
    pub fn from_env(auth_token: Option<&str>, email: Option<&str>) -> Result<Self, ApiError> {
        Self::from_lookup(auth_token, email, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(auth_token: Option<&str>, email: Option<&str>, lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::resolve_with(auth_token, email, &lookup)?;
        let base_url = lookup(BASE_URL_ENV)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(&base_url, credentials))
    }
}
