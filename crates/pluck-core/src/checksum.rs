//! Checksum verification of a finished download.
//!
//! Digests are computed by re-reading the file from disk after the transfer,
//! not inline with the body stream.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Md5,
    Sha256,
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumAlgorithm::Md5 => write!(f, "MD5"),
            ChecksumAlgorithm::Sha256 => write!(f, "SHA256"),
        }
    }
}

/// Digest the downloaded file must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedChecksum {
    pub algorithm: ChecksumAlgorithm,
    /// Lowercase hex.
    pub value: String,
}

impl ExpectedChecksum {
    pub fn md5(hex_value: &str) -> Self {
        Self {
            algorithm: ChecksumAlgorithm::Md5,
            value: hex_value.trim().to_ascii_lowercase(),
        }
    }

    pub fn sha256(hex_value: &str) -> Self {
        Self {
            algorithm: ChecksumAlgorithm::Sha256,
            value: hex_value.trim().to_ascii_lowercase(),
        }
    }

    /// Case-insensitive comparison against a hex digest.
    pub fn matches(&self, actual: &str) -> bool {
        self.value.eq_ignore_ascii_case(actual)
    }
}

/// Compute the digest of a file with `algorithm` and return it as lowercase hex.
pub fn digest_path(algorithm: ChecksumAlgorithm, path: &Path) -> io::Result<String> {
    match algorithm {
        ChecksumAlgorithm::Md5 => hash_file::<Md5>(path),
        ChecksumAlgorithm::Sha256 => hash_file::<Sha256>(path),
    }
}

/// Reads in chunks to keep memory use bounded; suitable for large files.
fn hash_file<D: Digest>(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
