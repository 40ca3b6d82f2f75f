use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all kiln operations.
#[derive(Debug, Error, Diagnostic)]
pub enum KilnError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// None of the configured repositories had the requested document or artifact.
    #[error("Artifact {artifact} not found at {locations}")]
    #[diagnostic(help("Check the coordinate and the configured repositories"))]
    ArtifactNotFound { artifact: String, locations: String },

    /// A repository failed for a reason other than "not found".
    #[error("Failed to retrieve {artifact} from {url}")]
    ArtifactRetrieval {
        artifact: String,
        url: String,
        #[source]
        source: FetchError,
    },

    /// A document was retrieved but is not well-formed.
    #[error("Failed to parse {url} for {artifact}: {}", errors.join("; "))]
    ManifestParsing {
        artifact: String,
        url: String,
        errors: Vec<String>,
    },

    /// A manifest names itself as one of its own ancestors.
    #[error("Parent manifests of {artifact} form a cycle: {chain}")]
    ParentCycle { artifact: String, chain: String },

    /// Streaming an artifact to disk failed.
    #[error("Failed to download {artifact} from {url} into {}", file.display())]
    Download {
        artifact: String,
        url: String,
        file: PathBuf,
        #[source]
        source: FetchError,
    },

    /// A caller-supplied argument was rejected before any work was done.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.kiln/config.toml for syntax errors"))]
    Config { message: String },
}

impl KilnError {
    /// Whether this error means the artifact simply isn't published anywhere.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ArtifactNotFound { .. })
    }

    /// Whether this error is a not-found or retrieval failure, the two
    /// outcomes an existence probe treats as "doesn't exist".
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Self::ArtifactNotFound { .. } | Self::ArtifactRetrieval { .. }
        )
    }
}

/// Failure of a single network retrieval, distinct from "not found".
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status other than 404.
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// The request could not be performed (connection reset, DNS, TLS, ...).
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// Reading the body or writing it out failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session deadline passed before or during the call.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The session was cancelled.
    #[error("cancelled")]
    Cancelled,
}

/// Convenience alias for results carrying a [`KilnError`].
pub type KilnResult<T> = Result<T, KilnError>;
