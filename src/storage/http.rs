//! HTTP-backed storage
//!
//! Maps the storage operations onto plain HTTP verbs against a base URL:
//! `HEAD` for existence, `GET` to read, `PUT` to write and `DELETE` to remove.
//! Bulk deletion has no HTTP equivalent and reports
//! [`TierError::Unsupported`].

use super::{InputStream, OutputStream, Storage};
use crate::error::{TierError, TierResult};
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Storage served by an HTTP endpoint
#[derive(Clone)]
pub struct HttpStorage {
    base_url: String,
    name: String,
    agent: ureq::Agent,
}

impl HttpStorage {
    /// Create a store for `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a store for `base_url` with an explicit per-request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            name: format!("http:{}", base_url),
            base_url,
            agent,
        }
    }

    /// Base URL the identifiers are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for an identifier
    pub fn url_for(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(id))
    }
}

/// Classify a request failure, reporting 404 separately
fn request_error(url: &str, err: ureq::Error) -> Option<TierError> {
    match err {
        ureq::Error::StatusCode(404) => None,
        ureq::Error::Io(source) => Some(TierError::io(format!("requesting {}", url), source)),
        other => Some(TierError::Http {
            url: url.to_string(),
            reason: other.to_string(),
        }),
    }
}

impl Storage for HttpStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains(&self, id: &str) -> TierResult<bool> {
        let url = self.url_for(id);
        match self.agent.head(&url).call() {
            Ok(_) => Ok(true),
            Err(e) => match request_error(&url, e) {
                None => Ok(false),
                Some(err) => Err(err),
            },
        }
    }

    fn open_output_stream(&self, id: &str) -> TierResult<Box<dyn OutputStream>> {
        Ok(Box::new(HttpOutput {
            agent: self.agent.clone(),
            url: self.url_for(id),
            buffer: Vec::new(),
        }))
    }

    fn open_input_stream(&self, id: &str) -> TierResult<Box<dyn InputStream>> {
        let url = self.url_for(id);
        debug!("GET {}", url);
        match self.agent.get(&url).call() {
            Ok(response) => Ok(Box::new(HttpInput {
                reader: response.into_body().into_reader(),
            })),
            Err(e) => Err(request_error(&url, e).unwrap_or(TierError::NotFound(id.to_string()))),
        }
    }

    fn delete(&self, id: &str) -> TierResult<bool> {
        let url = self.url_for(id);
        debug!("DELETE {}", url);
        match self.agent.delete(&url).call() {
            Ok(_) => Ok(true),
            Err(e) => match request_error(&url, e) {
                None => Ok(false),
                Some(err) => Err(err),
            },
        }
    }

    fn delete_all(&self) -> TierResult<()> {
        Err(TierError::unsupported(self.name.clone(), "delete_all"))
    }
}

/// Streaming response body
struct HttpInput {
    reader: ureq::BodyReader<'static>,
}

impl Read for HttpInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl InputStream for HttpInput {}

/// Request body buffered until close, then sent with `PUT`
struct HttpOutput {
    agent: ureq::Agent,
    url: String,
    buffer: Vec<u8>,
}

impl Write for HttpOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl OutputStream for HttpOutput {
    fn close(self: Box<Self>) -> TierResult<()> {
        debug!("PUT {} ({} bytes)", self.url, self.buffer.len());
        self.agent
            .put(&self.url)
            .send(&self.buffer[..])
            .map(|_| ())
            .map_err(|e| {
                request_error(&self.url, e).unwrap_or_else(|| TierError::Http {
                    url: self.url.clone(),
                    reason: "404 Not Found".to_string(),
                })
            })
    }
}
