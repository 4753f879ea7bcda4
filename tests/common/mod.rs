//! Shared fixtures for integration tests
//!
//! Stands up local HTTP/1.1 servers that check Basic credentials and serve
//! fixed bodies, optionally after a delay.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use cloud_downloader::auth::basic_header_value;

/// What a server returns for one path
#[derive(Debug, Clone)]
pub struct Route {
    pub body: Vec<u8>,
    /// Raw `user:pass` the request must carry
    pub credentials: String,
    /// Wait this long before answering
    pub delay: Duration,
    /// Send a Content-Length header
    pub content_length: bool,
}

impl Route {
    pub fn new(body: impl Into<Vec<u8>>, credentials: &str) -> Self {
        Self {
            body: body.into(),
            credentials: credentials.to_string(),
            delay: Duration::ZERO,
            content_length: true,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn without_content_length(mut self) -> Self {
        self.content_length = false;
        self
    }
}

/// A local server answering every connection from a fixed route table
pub struct MockServer {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(routes: HashMap<String, Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let routes = Arc::new(routes);

        let counter = Arc::clone(&connections);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let routes = Arc::clone(&routes);
                tokio::spawn(async move {
                    let _ = answer(socket, &routes).await;
                });
            }
        });

        Self {
            addr,
            connections,
            handle,
        }
    }

    /// Serve a single path
    pub async fn single(path: &str, route: Route) -> Self {
        Self::start(HashMap::from([(path.to_string(), route)])).await
    }

    /// Scheme-less URL for `path` on this server
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Number of connections accepted so far
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn answer(mut socket: TcpStream, routes: &HashMap<String, Route>) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..n]);
    }

    let request = String::from_utf8_lossy(&request).to_string();
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let authorization = request
        .lines()
        .find_map(|line| line.strip_prefix("Authorization: "))
        .map(str::to_string);

    let response = match routes.get(&path) {
        None => status_only(404, "Not Found"),
        Some(route)
            if authorization.as_deref()
                != Some(basic_header_value(&route.credentials).as_str()) =>
        {
            status_only(401, "Unauthorized")
        }
        Some(route) => {
            tokio::time::sleep(route.delay).await;
            let mut response = b"HTTP/1.1 200 OK\r\n".to_vec();
            if route.content_length {
                response.extend_from_slice(format!("Content-Length: {}\r\n", route.body.len()).as_bytes());
            }
            response.extend_from_slice(b"Connection: close\r\n\r\n");
            response.extend_from_slice(&route.body);
            response
        }
    };

    socket.write_all(&response).await?;
    socket.shutdown().await
}

fn status_only(status: u16, reason: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status, reason
    )
    .into_bytes()
}

/// Deterministic test payload
pub fn sample_file(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}

/// One partial copy: inclusive range, credentials and answer delay
pub struct Part {
    pub start: i64,
    pub end: i64,
    pub credentials: &'static str,
    pub delay: Duration,
}

impl Part {
    pub fn new(start: i64, end: i64, credentials: &'static str) -> Self {
        Self {
            start,
            end,
            credentials,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Index and part servers for a file split into `parts`
pub struct Cloud {
    pub index: MockServer,
    pub parts: Vec<MockServer>,
}

impl Cloud {
    pub const INDEX_PATH: &'static str = "/index";

    /// Serve each part of `original` from its own server, plus an index server
    pub async fn start(
        filename: &str,
        original: &[u8],
        parts: &[Part],
        index_credentials: &str,
    ) -> Self {
        let mut servers = Vec::with_capacity(parts.len());
        let mut index = format!("{}\n{}\n", filename, original.len());

        for (i, part) in parts.iter().enumerate() {
            let path = format!("/{}.part{}", filename, i);
            let body = original[part.start as usize..=part.end as usize].to_vec();
            let route = Route::new(body, part.credentials).with_delay(part.delay);
            let server = MockServer::single(&path, route).await;

            index.push_str(&format!(
                "{}\n{}\n{}-{}\n",
                server.url(&path),
                part.credentials,
                part.start,
                part.end
            ));
            servers.push(server);
        }

        let index = MockServer::single(
            Self::INDEX_PATH,
            Route::new(index.into_bytes(), index_credentials),
        )
        .await;

        Self {
            index,
            parts: servers,
        }
    }

    pub fn index_url(&self) -> String {
        self.index.url(Self::INDEX_PATH)
    }

    /// Connections accepted by all part servers
    pub fn part_connections(&self) -> usize {
        self.parts.iter().map(MockServer::connections).sum()
    }
}
