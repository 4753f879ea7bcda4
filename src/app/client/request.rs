//! Request target parsing and request serialization
//!
//! URLs in index documents are scheme-less: everything before the first `/`
//! is the host (optionally `host:port`), everything after it is the path.

use crate::auth::basic_header_value;
use crate::errors::{FetchError, FetchResult};

/// Where a request goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Host name or address, without port
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Request path, always starting with `/`
    pub path: String,
    /// Value of the Host header (host with any explicit port)
    pub authority: String,
}

impl Target {
    /// Parse a scheme-less `host[:port]/path` URL
    ///
    /// A leading `http://` is tolerated. `https://` is rejected since TLS is
    /// not spoken.
    pub fn parse(url: &str, default_port: u16) -> FetchResult<Self> {
        let invalid = |reason: &str| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = url.trim();
        if trimmed.starts_with("https://") {
            return Err(invalid("HTTPS is not supported"));
        }
        let trimmed = trimmed.trim_start_matches("http://");

        let (authority, path) = match trimmed.split_once('/') {
            Some((authority, rest)) => (authority, format!("/{}", rest)),
            None => (trimmed, "/".to_string()),
        };

        if authority.is_empty() {
            return Err(invalid("missing host"));
        }

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| invalid("invalid port"))?;
                (host, port)
            }
            None => (authority, default_port),
        };

        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            path,
            authority: authority.to_string(),
        })
    }
}

/// Serialize a GET request for `target`
///
/// The Authorization header is omitted when `credentials` is empty.
pub fn build_get_request(target: &Target, credentials: &str, user_agent: &str) -> String {
    let mut request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\n",
        target.path, target.authority
    );
    if !credentials.is_empty() {
        request.push_str(&format!(
            "Authorization: {}\r\n",
            basic_header_value(credentials)
        ));
    }
    request.push_str(&format!("User-Agent: {}\r\n", user_agent));
    request.push_str("Connection: close\r\n\r\n");
    request
}
