//! Redirect detection and `Location` resolution.

use url::Url;

/// Statuses followed as redirects. The method stays GET on every hop.
pub fn is_redirect(status: u32) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// Resolves a `Location` value against the URL that returned it.
/// Only http and https targets are followed.
pub fn resolve_location(current: &Url, location: &str) -> Result<Url, String> {
    let next = current.join(location).map_err(|e| e.to_string())?;
    match next.scheme() {
        "http" | "https" => Ok(next),
        other => Err(format!("unsupported scheme {:?}", other)),
    }
}
