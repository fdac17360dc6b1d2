//! Single-file HTTP GET with redirect following done hop by hop.
//!
//! libcurl's own redirect following is disabled so that every hop is a fresh
//! request built with the same `Credentials`, whatever host it points to.

use std::path::Path;
use std::time::{Duration, Instant};

use curl::easy::{Easy2, List};
use tracing::debug;
use url::Url;

use super::credentials::Credentials;
use super::handler::ResponseHandler;
use super::redirect::{is_redirect, resolve_location};
use super::{TransferOptions, MAX_TIMEOUT};
use crate::error::{FetchError, TimeoutPhase};

/// Outcome of a successful GET.
#[derive(Debug)]
pub(super) struct Fetched {
    /// URL of the request that returned 200.
    pub url: Url,
    pub bytes: u64,
}

pub(super) struct Client<'a> {
    credentials: Credentials,
    options: &'a TransferOptions,
}

impl<'a> Client<'a> {
    pub(super) fn new(credentials: Credentials, options: &'a TransferOptions) -> Self {
        Self {
            credentials,
            options,
        }
    }

    /// GETs `url`, following redirects, and streams the 200 body into `destination`.
    pub(super) fn get(&self, url: Url, destination: &Path) -> Result<Fetched, FetchError> {
        let budget = self.options.timeout.min(MAX_TIMEOUT);
        // None when the budget runs past the end of the monotonic clock.
        let deadline = Instant::now().checked_add(budget);
        let mut url = url;
        let mut redirects = 0usize;

        loop {
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => budget,
            };
            if remaining.is_zero() {
                return Err(FetchError::Timeout {
                    phase: TimeoutPhase::Overall,
                    timeout: budget,
                });
            }

            let mut easy = self.request(&url, destination, remaining)?;
            if let Err(e) = easy.perform() {
                return Err(self.classify_failure(
                    &url,
                    destination,
                    &mut easy,
                    e,
                    remaining,
                    budget,
                ));
            }

            let handler = easy.get_mut();
            let status = handler.status.unwrap_or(0);
            debug!(url = %url, status, "response received");

            if is_redirect(status) {
                if let Some(location) = handler.location.take() {
                    if redirects >= self.options.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            limit: self.options.max_redirects,
                        });
                    }
                    redirects += 1;
                    let next = resolve_location(&url, &location)
                        .map_err(|reason| FetchError::Redirect { location, reason })?;
                    debug!(from = %url, to = %next, status, "following redirect");
                    url = next;
                    continue;
                }
            }

            if status != 200 {
                return Err(FetchError::HttpStatus { status });
            }

            let bytes = handler.finish().map_err(|source| FetchError::Transfer {
                path: destination.to_path_buf(),
                source,
            })?;
            return Ok(Fetched { url, bytes });
        }
    }

    /// Builds one GET request with credentials applied.
    fn request(
        &self,
        url: &Url,
        destination: &Path,
        timeout: Duration,
    ) -> Result<Easy2<ResponseHandler>, FetchError> {
        let mut easy = Easy2::new(ResponseHandler::new(destination));
        easy.url(url.as_str()).map_err(FetchError::request_init)?;
        easy.get(true).map_err(FetchError::request_init)?;
        easy.follow_location(false).map_err(FetchError::request_init)?;
        // libcurl treats a zero timeout as "no timeout".
        let timeout = timeout.max(Duration::from_millis(1));
        easy.connect_timeout(self.options.connect_timeout.min(timeout))
            .map_err(FetchError::request_init)?;
        easy.timeout(timeout).map_err(FetchError::request_init)?;
        if let Some(agent) = &self.options.user_agent {
            easy.useragent(agent).map_err(FetchError::request_init)?;
        }

        let mut headers = List::new();
        self.credentials
            .apply(&mut headers)
            .map_err(FetchError::request_init)?;
        easy.http_headers(headers).map_err(FetchError::request_init)?;

        Ok(easy)
    }

    /// Maps a failed `perform` to the step that failed.
    ///
    /// `remaining` is the budget this hop started with and `budget` the
    /// overall one; they pick which limit a timeout is reported against.
    fn classify_failure(
        &self,
        url: &Url,
        destination: &Path,
        easy: &mut Easy2<ResponseHandler>,
        err: curl::Error,
        remaining: Duration,
        budget: Duration,
    ) -> FetchError {
        // libcurl leaves the connect time at zero until a connection is up.
        let connected = easy.get_ref().status.is_some()
            || easy.connect_time().map(|t| !t.is_zero()).unwrap_or(false);
        let handler = easy.get_mut();

        if let Some(source) = handler.write_error.take() {
            return FetchError::Transfer {
                path: destination.to_path_buf(),
                source,
            };
        }
        if err.is_operation_timedout() {
            let connect_limit = self.options.connect_timeout.min(remaining);
            return if !connected && connect_limit < remaining {
                FetchError::Timeout {
                    phase: TimeoutPhase::Connect,
                    timeout: connect_limit,
                }
            } else {
                FetchError::Timeout {
                    phase: TimeoutPhase::Overall,
                    timeout: budget,
                }
            };
        }
        if handler.started_writing() {
            // Body was streaming when the connection broke; the partial file stays.
            return FetchError::Transfer {
                path: destination.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, err),
            };
        }
        FetchError::Network {
            url: url.to_string(),
            source: err,
        }
    }
}
