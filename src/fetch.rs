//! Network collaborator for external dialog content
//!
//! Dialog operations talk to the network through the [`Fetcher`] trait so the
//! HTTP client can be swapped (or replaced by an in-memory double in tests).
//! [`HttpFetcher`] is the blocking implementation over `ureq`.
//!
//! A fetcher reports whatever status the server returned; deciding that a
//! non-2xx status is a failure is left to the caller.

use crate::config::FetchConfig;
use crate::error::{DialogError, Result};
use std::io::Read;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Status, headers and (for GET) body of a response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16) -> Self {
        FetchResponse {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// `Content-Length`, when present and numeric
    pub fn content_length(&self) -> Option<u64> {
        self.header("Content-Length")
            .and_then(|value| value.trim().parse().ok())
    }
}

/// Retrieves metadata (HEAD) and content (GET) for a URL
pub trait Fetcher {
    /// Metadata only; the returned body is empty
    fn head(&self, url: &str) -> Result<FetchResponse>;

    /// Full content
    fn get(&self, url: &str) -> Result<FetchResponse>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn head(&self, url: &str) -> Result<FetchResponse> {
        (**self).head(url)
    }

    fn get(&self, url: &str) -> Result<FetchResponse> {
        (**self).get(url)
    }
}

/// Blocking HTTP fetcher
///
/// GET bodies larger than `max_body_bytes` are refused with `TooLarge`
/// rather than truncated.
pub struct HttpFetcher {
    config: FetchConfig,
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Build a fetcher from validated configuration
    pub fn new(config: FetchConfig) -> Result<Self> {
        validator::Validate::validate(&config).map_err(|e| DialogError::Config(e.to_string()))?;

        let redirects = if config.follow_redirects { 5 } else { 0 };
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(&config.user_agent)
            .redirects(redirects)
            .build();

        Ok(Self { config, agent })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn send(&self, method: &'static str, url: &str) -> Result<FetchResponse> {
        let parsed = Url::parse(url)?;
        debug!("{} {}", method, parsed);

        let response = match self.agent.request_url(method, &parsed).call() {
            Ok(response) => response,
            // Non-2xx still carries a response; the caller decides what it means
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(DialogError::Transport(transport.to_string()))
            }
        };

        let status = response.status();
        let headers = response
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                let value = response.header(&name)?.to_string();
                Some((name, value))
            })
            .collect();

        let mut body = Vec::new();
        if method == "GET" && (200..300).contains(&status) {
            let limit = self.config.max_body_bytes;
            let too_large = || DialogError::TooLarge {
                url: url.to_string(),
                limit,
            };

            let declared = response
                .header("Content-Length")
                .and_then(|value| value.trim().parse::<u64>().ok());
            if declared.is_some_and(|length| length > limit) {
                warn!("GET {} declares {:?} bytes, limit is {}", url, declared, limit);
                return Err(too_large());
            }

            // One byte past the limit tells a full body from a cut-off one
            response
                .into_reader()
                .take(limit.saturating_add(1))
                .read_to_end(&mut body)?;
            if body.len() as u64 > limit {
                warn!("GET {} body exceeds {} bytes", url, limit);
                return Err(too_large());
            }
        }

        debug!("{} {} -> {} ({} bytes)", method, url, status, body.len());
        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn head(&self, url: &str) -> Result<FetchResponse> {
        self.send("HEAD", url)
    }

    fn get(&self, url: &str) -> Result<FetchResponse> {
        self.send("GET", url)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        let config = FetchConfig::default();
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(&config.user_agent)
            .build();
        Self { config, agent }
    }
}
