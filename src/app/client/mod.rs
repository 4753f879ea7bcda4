//! Socket-level HTTP client for index and partial-source servers
//!
//! Every fetch opens its own TCP connection, sends a single `GET` with Basic
//! authorization, reads the response with [`ResponseReader`] and closes the
//! socket. There is no connection reuse, TLS, redirect handling or retrying.
//!
//! The module is organized into specialized components:
//! - `config`: wire-level configuration
//! - `request`: URL target parsing and request serialization
//! - `http`: the raw response reader

use std::time::Instant;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

use crate::app::index::SourceDescriptor;
use crate::app::plan::FetchPlan;
use crate::constants::http as http_constants;
use crate::errors::{FetchError, FetchResult};

// Module declarations
pub mod config;
pub mod http;
pub mod request;

pub use config::ClientConfig;
pub use http::{RawResponse, ResponseHead, ResponseReader};
pub use request::{build_get_request, Target};

/// HTTP client issuing one connection per fetch
#[derive(Debug, Clone, Default)]
pub struct RangeClient {
    config: ClientConfig,
}

impl RangeClient {
    /// Creates a new client with the given configuration
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch `url` and return the full response
    ///
    /// Fails with [`FetchError::UnexpectedStatus`] before reading the body if
    /// the server does not answer 200.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if:
    /// - The URL has no host or an invalid port
    /// - The connection cannot be established or the request cannot be sent
    /// - The status line is missing or not 200
    pub async fn fetch(&self, url: &str, credentials: &str) -> FetchResult<RawResponse> {
        let started = Instant::now();
        let target = Target::parse(url, self.config.default_port)?;
        let mut stream = self.connect(&target).await?;

        let request = build_get_request(&target, credentials, &self.config.user_agent);
        stream
            .write_all(request.as_bytes())
            .await
            .map_err(|source| FetchError::Send {
                host: target.authority.clone(),
                source,
            })?;

        let mut reader =
            ResponseReader::new(&mut stream, self.config.buffer_size, self.config.read_timeout);
        let head = reader.read_head().await?;
        if head.status != http_constants::STATUS_OK {
            return Err(FetchError::UnexpectedStatus {
                status: head.status,
                url: url.to_string(),
            });
        }

        let response = reader.read_body(head).await?;
        debug!(
            "Fetched {} ({} body bytes) in {:?}",
            url,
            response.body.len(),
            started.elapsed()
        );
        Ok(response)
    }

    /// Fetch one source and keep only the slice its plan selects
    pub async fn fetch_range(
        &self,
        source: &SourceDescriptor,
        plan: &FetchPlan,
    ) -> FetchResult<Vec<u8>> {
        let response = self.fetch(&source.url, &source.credentials).await?;

        let declared = source.range.len();
        if (response.body.len() as i64) < declared {
            debug!(
                "Source {} returned {} bytes for declared range {} ({} bytes)",
                source.url,
                response.body.len(),
                source.range,
                declared
            );
        }

        Ok(plan.apply(&response.body).to_vec())
    }

    async fn connect(&self, target: &Target) -> FetchResult<TcpStream> {
        let address = (target.host.as_str(), target.port);
        let stream = tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| FetchError::ConnectTimeout {
                host: target.authority.clone(),
                seconds: self.config.connect_timeout.as_secs(),
            })?
            .map_err(|source| FetchError::Connect {
                host: target.authority.clone(),
                source,
            })?;

        // Nagle only matters for the request write; failure here is harmless
        if let Err(e) = stream.set_nodelay(self.config.tcp_nodelay) {
            debug!("Could not set TCP_NODELAY on {}: {}", target.authority, e);
        }
        Ok(stream)
    }
}
