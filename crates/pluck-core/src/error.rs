//! Error type for the resolve, download and verify pipeline.
//!
//! Every variant names the step that failed so the shell can print it as-is.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::checksum::ChecksumAlgorithm;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Source URL missing, unparsable, not HTTP(S), or without a usable file name.
    #[error("invalid source {url:?}: {reason}")]
    InvalidSource { url: String, reason: String },

    #[error("creating directory {} failed: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("initializing request failed: {reason}")]
    RequestInit { reason: String },

    /// Connection, DNS, TLS or protocol failure before the body started streaming.
    #[error("executing request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: curl::Error,
    },

    /// `timeout` is the limit named by `phase`, not the time spent so far.
    #[error("{phase} timed out after {}s", .timeout.as_secs_f64())]
    Timeout {
        phase: TimeoutPhase,
        timeout: Duration,
    },

    #[error("stopped after {limit} redirects")]
    TooManyRedirects { limit: usize },

    #[error("following redirect to {location:?} failed: {reason}")]
    Redirect { location: String, reason: String },

    /// Final response was not 200. Nothing was written to disk.
    #[error("request failed, status {status}")]
    HttpStatus { status: u32 },

    /// Streaming the body to disk failed. A partial file may remain.
    #[error("copying to {} failed: {source}", .path.display())]
    Transfer {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The written file could not be re-read for hashing. The file has been removed.
    #[error("failed to compute {algorithm} checksum of {}: {source}", .path.display())]
    ChecksumIo {
        algorithm: ChecksumAlgorithm,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Digest of the written file differs from the expected one. The file has been removed.
    #[error("{algorithm} checksum doesn't match, got {actual} and expected {expected}")]
    ChecksumMismatch {
        algorithm: ChecksumAlgorithm,
        expected: String,
        actual: String,
    },
}

/// Which transport limit expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    /// Per-hop connect timeout, before the server was reached.
    Connect,
    /// Overall budget across all redirect hops.
    Overall,
}

impl fmt::Display for TimeoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutPhase::Connect => write!(f, "connecting"),
            TimeoutPhase::Overall => write!(f, "request"),
        }
    }
}

impl FetchError {
    pub(crate) fn request_init(err: impl fmt::Display) -> Self {
        FetchError::RequestInit {
            reason: err.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }

    /// True for failures after which the destination file was deleted.
    pub fn removed_destination(&self) -> bool {
        matches!(
            self,
            FetchError::ChecksumIo { .. } | FetchError::ChecksumMismatch { .. }
        )
    }
}
