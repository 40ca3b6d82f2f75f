//! Blocking retrieval of repository documents and artifacts.
//!
//! A retrieval has three outcomes: the content, "not found" (`Ok(None)`),
//! or a [`FetchError`]. Only "not found" lets a caller move on to the next
//! repository. Every call is bounded by a [`Deadline`].

use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use kiln_util::errors::{FetchError, KilnError, KilnResult};
use reqwest::blocking::Client;
use reqwest::StatusCode;

/// Streaming body of a retrieved artifact.
pub type Body = Box<dyn Read + Send>;

/// Source of repository content.
pub trait Transport: Send + Sync {
    /// Retrieve the whole content at `url`.
    fn fetch(&self, url: &str, deadline: &Deadline) -> Result<Option<Vec<u8>>, FetchError>;

    /// Open `url` for streaming.
    fn open(&self, url: &str, deadline: &Deadline) -> Result<Option<Body>, FetchError>;

    /// Retrieve `url` as text, replacing invalid UTF-8.
    fn fetch_text(&self, url: &str, deadline: &Deadline) -> Result<Option<String>, FetchError> {
        Ok(self
            .fetch(url, deadline)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// Shared flag that aborts every pending and future call of a session.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Time budget and cancellation for a resolution.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
    cancel: Option<CancelToken>,
}

impl Deadline {
    /// No time limit, not cancellable.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + budget),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Time left, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Fail if the budget is spent or the session was cancelled.
    pub fn check(&self) -> Result<(), FetchError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(FetchError::Cancelled);
        }
        if self.remaining().is_some_and(|left| left.is_zero()) {
            return Err(FetchError::DeadlineExceeded);
        }
        Ok(())
    }
}

/// Default transport: `http(s)://` through a blocking reqwest client and
/// `file://` straight from disk.
#[derive(Debug, Clone)]
pub struct UrlTransport {
    client: Client,
}

impl UrlTransport {
    pub fn new(user_agent: &str) -> KilnResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| KilnError::InvalidArgument {
                message: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    fn send(
        &self,
        url: &str,
        deadline: &Deadline,
    ) -> Result<Option<reqwest::blocking::Response>, FetchError> {
        deadline.check()?;
        let mut request = self.client.get(url);
        if let Some(left) = deadline.remaining() {
            request = request.timeout(left);
        }

        let response = request
            .send()
            .map_err(|e| transport_error(&e, deadline))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("{url}: not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        Ok(Some(response))
    }
}

fn transport_error(e: &reqwest::Error, deadline: &Deadline) -> FetchError {
    if e.is_timeout() && deadline.check().is_err() {
        FetchError::DeadlineExceeded
    } else {
        FetchError::Transport {
            message: e.to_string(),
        }
    }
}

fn file_path(url: &str) -> Option<PathBuf> {
    url.strip_prefix("file://").map(PathBuf::from)
}

fn missing_is_none<T>(result: std::io::Result<T>) -> Result<Option<T>, FetchError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FetchError::Io(e)),
    }
}

impl Transport for UrlTransport {
    fn fetch(&self, url: &str, deadline: &Deadline) -> Result<Option<Vec<u8>>, FetchError> {
        if let Some(path) = file_path(url) {
            deadline.check()?;
            return missing_is_none(std::fs::read(path));
        }
        match self.send(url, deadline)? {
            Some(response) => {
                let bytes = response
                    .bytes()
                    .map_err(|e| transport_error(&e, deadline))?;
                Ok(Some(bytes.to_vec()))
            }
            None => Ok(None),
        }
    }

    fn open(&self, url: &str, deadline: &Deadline) -> Result<Option<Body>, FetchError> {
        if let Some(path) = file_path(url) {
            deadline.check()?;
            return Ok(missing_is_none(std::fs::File::open(path))?.map(|f| Box::new(f) as Body));
        }
        Ok(self
            .send(url, deadline)?
            .map(|response| Box::new(response) as Body))
    }
}
