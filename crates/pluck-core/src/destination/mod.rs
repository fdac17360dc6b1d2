//! Destination path resolution.
//!
//! Turns the source URL and the optional destination hint into the path the
//! download is written to, and makes sure the parent directory exists. No
//! network access happens here.

mod clean;
mod path;

pub use clean::clean;
pub use path::filename_from_url;

use crate::error::FetchError;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Resolves the output path for `source`.
///
/// - empty `hint`: the last segment of the URL path
/// - `hint` ending in a path separator: that directory joined with the URL's last segment
/// - any other `hint`: used as the file path
///
/// The result is lexically cleaned and its parent directory is created.
///
/// # Examples
///
/// - `resolve("https://example.com/a/file.deb", "")` → `file.deb`
/// - `resolve("https://example.com/a/file.deb", "out/")` → `out/file.deb`
/// - `resolve("https://example.com/a/file.deb", "out/../x.deb")` → `x.deb`
pub fn resolve(source: &str, hint: &str) -> Result<PathBuf, FetchError> {
    let url = parse_source(source)?;

    let target = if hint.is_empty() {
        PathBuf::from(basename(&url, source)?)
    } else if denotes_directory(hint) {
        Path::new(hint).join(basename(&url, source)?)
    } else {
        PathBuf::from(hint)
    };

    let target = clean(&target);
    create_parent(&target)?;
    Ok(target)
}

/// Parses and checks the source URL; only http and https are accepted.
pub fn parse_source(source: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidSource {
        url: source.to_string(),
        reason,
    };

    if source.trim().is_empty() {
        return Err(invalid("no source provided".to_string()));
    }
    let url = Url::parse(source).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {:?}", other))),
    }
}

fn basename(url: &Url, source: &str) -> Result<String, FetchError> {
    filename_from_url(url).ok_or_else(|| FetchError::InvalidSource {
        url: source.to_string(),
        reason: "url path has no file name".to_string(),
    })
}

fn denotes_directory(hint: &str) -> bool {
    hint.chars().last().is_some_and(std::path::is_separator)
}

/// Creates every missing parent directory of `target` (mode 0777 before umask).
fn create_parent(target: &Path) -> Result<(), FetchError> {
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }

    builder
        .create(parent)
        .map_err(|source| FetchError::DirectoryCreation {
            path: parent.to_path_buf(),
            source,
        })
}
