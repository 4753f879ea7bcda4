//! Credential splitting, environment fallback and Basic encoding

use std::env;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::constants::env as env_constants;
use crate::errors::{AuthError, AuthResult};

/// A `username:password` pair for HTTP Basic authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials from separate parts
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Split a `username:password` string on its first ':'
    ///
    /// Passwords may themselves contain ':'.
    pub fn parse(raw: &str) -> AuthResult<Self> {
        let (username, password) = raw.split_once(':').ok_or(AuthError::MissingSeparator)?;
        Ok(Self::new(username, password))
    }

    /// Load credentials from `CLOUD_DOWNLOADER_USERNAME` / `CLOUD_DOWNLOADER_PASSWORD`
    pub fn from_env() -> AuthResult<Self> {
        match (
            env::var(env_constants::USERNAME),
            env::var(env_constants::PASSWORD),
        ) {
            (Ok(username), Ok(password)) => Ok(Self::new(username, password)),
            _ => Err(AuthError::MissingCredentials),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The raw `username:password` form, as carried in index documents
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.username, self.password)
    }

    /// Value for the `Authorization` header
    pub fn basic_header_value(&self) -> String {
        basic_header_value(&self.to_raw())
    }
}

// Keep passwords out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Encode a raw `username:password` string as a Basic authorization value
pub fn basic_header_value(raw: &str) -> String {
    format!("Basic {}", STANDARD.encode(raw.as_bytes()))
}

/// Use explicit credentials when given, otherwise fall back to the environment
pub fn resolve_credentials(explicit: Option<&str>) -> AuthResult<Credentials> {
    match explicit {
        Some(raw) => Credentials::parse(raw),
        None => {
            tracing::debug!("No credentials on the command line, checking environment");
            Credentials::from_env()
        }
    }
}
