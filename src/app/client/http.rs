//! Minimal HTTP/1.1 response reader over a raw byte stream
//!
//! The reader frames the header block by scanning for `\r\n\r\n`, parses the
//! status code and `Content-Length`, then reads the body until the declared
//! length is reached or the peer stops sending. A read that stalls past the
//! configured timeout is treated exactly like the peer closing the
//! connection: it ends the response, it is not an error.
//!
//! The reader is generic over [`AsyncRead`] so it runs against sockets in
//! production and in-memory streams in tests.

use std::io::ErrorKind;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

use crate::constants::http;
use crate::errors::{FetchError, FetchResult};

/// Result of reading a response head
#[derive(Debug, Clone)]
pub struct ResponseHead {
    /// Header bytes, including the terminator when it was seen
    pub header: Vec<u8>,
    /// Numeric status code from the status line
    pub status: u16,
    /// Declared body length, `None` when unbounded
    pub content_length: Option<usize>,
    /// Body bytes that arrived together with the header
    pub body_prefix: Vec<u8>,
    /// The stream already signalled end of input while reading the header
    pub exhausted: bool,
}

/// A complete response as read from the wire
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub header: Vec<u8>,
    pub status: u16,
    pub content_length: Option<usize>,
    /// Body bytes; may exceed `content_length` by up to one read
    pub body: Vec<u8>,
}

/// Outcome of one bounded read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadOutcome {
    Data(usize),
    Closed,
    TimedOut,
}

/// Reads one HTTP response from a stream
pub struct ResponseReader<'a, S> {
    stream: &'a mut S,
    buffer: Vec<u8>,
    read_timeout: Duration,
}

impl<'a, S> ResponseReader<'a, S>
where
    S: AsyncRead + Unpin,
{
    /// Create a reader issuing reads of `buffer_size` bytes
    pub fn new(stream: &'a mut S, buffer_size: usize, read_timeout: Duration) -> Self {
        Self {
            stream,
            buffer: vec![0; buffer_size.max(1)],
            read_timeout,
        }
    }

    async fn read_chunk(&mut self) -> FetchResult<ReadOutcome> {
        match tokio::time::timeout(self.read_timeout, self.stream.read(&mut self.buffer)).await {
            Err(_) => Ok(ReadOutcome::TimedOut),
            Ok(Ok(0)) => Ok(ReadOutcome::Closed),
            Ok(Ok(n)) => Ok(ReadOutcome::Data(n)),
            Ok(Err(e)) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                Ok(ReadOutcome::TimedOut)
            }
            Ok(Err(e)) => Err(FetchError::Read(e)),
        }
    }

    /// Read until the header terminator, then parse the status and length
    ///
    /// If the stream ends before the terminator, the whole accumulation is
    /// taken as the header.
    pub async fn read_head(&mut self) -> FetchResult<ResponseHead> {
        let mut accumulated = Vec::new();
        let mut exhausted = false;

        let split_at = loop {
            // Only the tail can complete a terminator that was split across reads
            let search_from = accumulated
                .len()
                .saturating_sub(http::HEADER_TERMINATOR.len() - 1);

            match self.read_chunk().await? {
                ReadOutcome::Data(n) => {
                    accumulated.extend_from_slice(&self.buffer[..n]);
                    if let Some(pos) = find_terminator(&accumulated[search_from..]) {
                        break search_from + pos + http::HEADER_TERMINATOR.len();
                    }
                }
                outcome => {
                    warn!(
                        "Stream ended ({:?}) before header terminator after {} bytes",
                        outcome,
                        accumulated.len()
                    );
                    exhausted = true;
                    break accumulated.len();
                }
            }
        };

        let body_prefix = accumulated.split_off(split_at);
        let header = accumulated;
        let status = parse_status(&header)?;
        let content_length = parse_content_length(&header);

        debug!(
            "Read response head: status {}, content length {:?}, {} body bytes buffered",
            status,
            content_length,
            body_prefix.len()
        );

        Ok(ResponseHead {
            header,
            status,
            content_length,
            body_prefix,
            exhausted,
        })
    }

    /// Read the rest of the body after `head`
    pub async fn read_body(&mut self, head: ResponseHead) -> FetchResult<RawResponse> {
        let mut body = head.body_prefix;

        if !head.exhausted {
            while head.content_length.map_or(true, |bound| body.len() < bound) {
                match self.read_chunk().await? {
                    ReadOutcome::Data(n) => body.extend_from_slice(&self.buffer[..n]),
                    ReadOutcome::Closed => break,
                    ReadOutcome::TimedOut => {
                        if head.content_length.is_some() {
                            warn!(
                                "Read timed out with {} of {:?} body bytes",
                                body.len(),
                                head.content_length
                            );
                        }
                        break;
                    }
                }
            }
        }

        Ok(RawResponse {
            header: head.header,
            status: head.status,
            content_length: head.content_length,
            body,
        })
    }

    /// Read a full response without checking its status
    pub async fn read_response(&mut self) -> FetchResult<RawResponse> {
        let head = self.read_head().await?;
        self.read_body(head).await
    }
}

/// Position of the first `\r\n\r\n` in `bytes`
pub fn find_terminator(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(http::HEADER_TERMINATOR.len())
        .position(|window| window == http::HEADER_TERMINATOR)
}

/// Parse the numeric status token of the first header line
pub fn parse_status(header: &[u8]) -> FetchResult<u16> {
    let text = String::from_utf8_lossy(header);
    let status_line = text.lines().next().unwrap_or_default();

    status_line
        .split_whitespace()
        .nth(1)
        .and_then(|token| token.parse::<u16>().ok())
        .ok_or_else(|| FetchError::MalformedStatus {
            line: status_line.to_string(),
        })
}

/// Find the body length declared by a `Content-Length` header
///
/// Matching is case-sensitive. A missing or unparseable value means the body
/// runs until the peer stops sending.
pub fn parse_content_length(header: &[u8]) -> Option<usize> {
    let text = String::from_utf8_lossy(header);
    let line = text
        .lines()
        .skip(1)
        .find(|line| line.contains(http::CONTENT_LENGTH))?;

    let value = line.split_once(':')?.1.trim();
    match value.parse::<usize>() {
        Ok(length) => Some(length),
        Err(_) => {
            warn!("Ignoring unparseable Content-Length: {:?}", value);
            None
        }
    }
}
