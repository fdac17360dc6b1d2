//! Per-run download settings, filled in by the shell.

use std::fmt;

use crate::checksum::ExpectedChecksum;

/// Inputs for one download. Empty strings mean "not set".
#[derive(Clone, Default)]
pub struct Settings {
    /// Absolute HTTP(S) URL to fetch.
    pub source: String,
    /// Output file, or a directory when it ends with a path separator.
    pub destination: String,
    /// Sent verbatim as the `Authorization` header value.
    pub authorization: String,
    pub username: String,
    pub password: String,
    /// Expected hex MD5 of the body.
    pub md5: String,
    /// Expected hex SHA-256 of the body. Takes precedence over `md5`.
    pub sha256: String,
}

impl Settings {
    /// The checksum to verify after the download, if any.
    ///
    /// Only one digest is checked per run: SHA-256 when given, otherwise MD5.
    /// An MD5 value supplied next to a SHA-256 value is not verified.
    pub fn expected_checksum(&self) -> Option<ExpectedChecksum> {
        let sha256 = self.sha256.trim();
        let md5 = self.md5.trim();

        if !sha256.is_empty() {
            if !md5.is_empty() {
                tracing::warn!("both sha256 and md5 checksums configured; md5 is ignored");
            }
            return Some(ExpectedChecksum::sha256(sha256));
        }
        if !md5.is_empty() {
            return Some(ExpectedChecksum::md5(md5));
        }
        None
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("authorization", &redacted(&self.authorization))
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("md5", &self.md5)
            .field("sha256", &self.sha256)
            .finish()
    }
}
