//! Request authentication applied to every hop of a transfer.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

use crate::settings::Settings;

/// Credentials injected into each request, including every redirected one.
///
/// Built once per run from `Settings` and handed to the client, which calls
/// [`Credentials::apply`] whenever it builds a request.
#[derive(Clone, Default)]
pub struct Credentials {
    basic: Option<(String, String)>,
    authorization: Option<String>,
}

impl Credentials {
    /// Basic auth is used only when both username and password are non-empty.
    pub fn from_settings(settings: &Settings) -> Self {
        let basic = if !settings.username.is_empty() && !settings.password.is_empty() {
            Some((settings.username.clone(), settings.password.clone()))
        } else {
            None
        };
        let authorization = Some(settings.authorization.clone()).filter(|v| !v.is_empty());
        Self {
            basic,
            authorization,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.basic.is_none() && self.authorization.is_none()
    }

    /// `Authorization` header values, in the order they are sent.
    ///
    /// Basic credentials come first and the raw header value second; when
    /// both are configured the request carries both headers.
    pub fn header_values(&self) -> Vec<String> {
        let mut values = Vec::with_capacity(2);
        if let Some((username, password)) = &self.basic {
            let encoded = STANDARD.encode(format!("{}:{}", username, password));
            values.push(format!("Basic {}", encoded));
        }
        if let Some(raw) = &self.authorization {
            values.push(raw.clone());
        }
        values
    }

    /// Adds one `Authorization` line per configured scheme to a request's header list.
    pub fn apply(&self, headers: &mut curl::easy::List) -> Result<(), curl::Error> {
        for value in self.header_values() {
            headers.append(&format!("Authorization: {}", value))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("basic_user", &self.basic.as_ref().map(|(u, _)| u))
            .field("authorization", &self.authorization.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
