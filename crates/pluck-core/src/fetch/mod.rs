//! Authenticated download of one resource, followed by optional checksum
//! verification of the written file.
//!
//! Each run builds its own client from the run's `Settings`; nothing is
//! shared between runs.

mod client;
mod credentials;
mod handler;
mod redirect;

pub use credentials::Credentials;
pub use redirect::{is_redirect, resolve_location};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::checksum::{self, ChecksumAlgorithm, ExpectedChecksum};
use crate::destination::parse_source;
use crate::error::FetchError;
use crate::settings::Settings;
use client::Client;

/// Longest overall budget a run honours; larger values are clamped to it.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Transport limits for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    /// Overall budget across all redirect hops, capped at [`MAX_TIMEOUT`].
    pub timeout: Duration,
    /// Connection phase limit for each hop.
    pub connect_timeout: Duration,
    pub max_redirects: usize,
    /// libcurl's default agent is used when `None`.
    pub user_agent: Option<String>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            max_redirects: 10,
            user_agent: None,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct TransferSummary {
    pub destination: PathBuf,
    /// URL that finally answered 200, after redirects.
    pub url: String,
    pub bytes: u64,
    /// Verified hex digest, when a checksum was configured.
    pub checksum: Option<String>,
}

/// Downloads `settings.source` into `destination` and verifies the configured checksum.
///
/// On a non-200 response nothing is written. When verification fails the
/// file is removed; when streaming fails a partial file is left in place.
pub fn execute(
    settings: &Settings,
    destination: &Path,
    options: &TransferOptions,
) -> Result<TransferSummary, FetchError> {
    let url = parse_source(&settings.source).map_err(FetchError::request_init)?;
    let client = Client::new(Credentials::from_settings(settings), options);

    let fetched = client.get(url, destination)?;
    info!(
        url = %fetched.url,
        bytes = fetched.bytes,
        destination = %destination.display(),
        "download finished"
    );

    let checksum = match settings.expected_checksum() {
        Some(expected) => Some(verify(&expected, destination)?),
        None => None,
    };

    Ok(TransferSummary {
        destination: destination.to_path_buf(),
        url: fetched.url.to_string(),
        bytes: fetched.bytes,
        checksum,
    })
}

/// Re-reads `destination` and compares its digest; removes the file on any failure.
fn verify(expected: &ExpectedChecksum, destination: &Path) -> Result<String, FetchError> {
    verify_with(expected, destination, checksum::digest_path)
}

fn verify_with<F>(
    expected: &ExpectedChecksum,
    destination: &Path,
    digest: F,
) -> Result<String, FetchError>
where
    F: FnOnce(ChecksumAlgorithm, &Path) -> io::Result<String>,
{
    info!(hash = %expected.algorithm, "computing checksum");

    let actual = match digest(expected.algorithm, destination) {
        Ok(digest) => digest,
        Err(source) => {
            remove_destination(destination);
            return Err(FetchError::ChecksumIo {
                algorithm: expected.algorithm,
                path: destination.to_path_buf(),
                source,
            });
        }
    };

    if !expected.matches(&actual) {
        remove_destination(destination);
        return Err(FetchError::ChecksumMismatch {
            algorithm: expected.algorithm,
            expected: expected.value.clone(),
            actual,
        });
    }

    info!(checksum = %actual, "checksum matched");
    Ok(actual)
}

fn remove_destination(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => info!("removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("failed to remove {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = TransferOptions::default();
        assert_eq!(opts.timeout, Duration::from_secs(300));
        assert_eq!(opts.connect_timeout, Duration::from_secs(30));
        assert_eq!(opts.max_redirects, 10);
        assert!(opts.user_agent.is_none());
    }

    #[test]
    fn verify_keeps_matching_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, b"hello\n").unwrap();
        let expected = ExpectedChecksum::md5("B1946AC92492D2347C6235B4D2611184");

        let digest = verify(&expected, &path).unwrap();

        assert_eq!(digest, "b1946ac92492d2347c6235b4d2611184");
        assert!(path.exists());
    }

    #[test]
    fn verify_removes_mismatching_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, b"hello\n").unwrap();
        let expected = ExpectedChecksum::sha256(&"0".repeat(64));

        let err = verify(&expected, &path).unwrap_err();

        assert!(matches!(err, FetchError::ChecksumMismatch { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn verify_missing_file_is_checksum_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.bin");
        let expected = ExpectedChecksum::sha256(&"0".repeat(64));

        let err = verify(&expected, &path).unwrap_err();

        assert!(matches!(err, FetchError::ChecksumIo { .. }));
    }

    #[test]
    fn verify_read_failure_removes_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("written.bin");
        fs::write(&path, b"downloaded bytes").unwrap();
        let expected = ExpectedChecksum::sha256(&"0".repeat(64));

        let err = verify_with(&expected, &path, |algorithm, p| {
            assert_eq!(algorithm, ChecksumAlgorithm::Sha256);
            assert!(p.exists());
            Err(io::Error::new(io::ErrorKind::Other, "read interrupted"))
        })
        .unwrap_err();

        match &err {
            FetchError::ChecksumIo {
                algorithm, source, ..
            } => {
                assert_eq!(*algorithm, ChecksumAlgorithm::Sha256);
                assert_eq!(source.to_string(), "read interrupted");
            }
            other => panic!("expected ChecksumIo, got {:?}", other),
        }
        assert!(err.removed_destination());
        assert!(!path.exists());
    }

    #[test]
    fn execute_rejects_bad_source_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            source: "definitely not a url".to_string(),
            ..Settings::default()
        };
        let err = execute(&settings, &dir.path().join("x"), &TransferOptions::default())
            .unwrap_err();
        assert!(matches!(err, FetchError::RequestInit { .. }));
    }
}
