//! # HTTP Client
//!
//! Factory for the [`reqwest::Client`] used to replay warm requests.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::warn;

use crate::error::WarmError;
use crate::request::CACHE_BUSTER_HEADER;

/// Settings every warm request shares.
///
/// These travel with queued jobs as well, so deferred requests replay
/// with the same identity the inline run would have used.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Whether TLS certificates are verified.
    pub verify: bool,

    /// Basic-auth credentials as `(user, password)`.
    pub auth: Option<(String, String)>,

    /// Headers attached to every request.
    pub headers: Vec<(String, String)>,

    /// Total per-request timeout.
    pub timeout: Duration,

    /// Connection phase timeout.
    pub connect_timeout: Duration,

    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            verify: true,
            auth: None,
            headers: vec![(CACHE_BUSTER_HEADER.to_string(), "true".to_string())],
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Creates a client configured from [`ClientSettings`].
pub fn create_client(settings: &ClientSettings) -> Result<Client, WarmError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &settings.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(name, value, "skipping malformed default header"),
        }
    }

    let client = Client::builder()
        .user_agent(settings.user_agent.clone())
        .default_headers(headers)
        .timeout(settings.timeout)
        .connect_timeout(settings.connect_timeout)
        .redirect(Policy::limited(10))
        .danger_accept_invalid_certs(!settings.verify)
        .build()?;

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_verify_tls_and_bust_caches() {
        let settings = ClientSettings::default();

        assert!(settings.verify);
        assert!(settings.auth.is_none());
        assert!(settings
            .headers
            .iter()
            .any(|(name, value)| name == CACHE_BUSTER_HEADER && value == "true"));
    }

    #[test]
    fn client_builds_from_default_settings() {
        assert!(create_client(&ClientSettings::default()).is_ok());
    }

    #[test]
    fn client_builds_with_verification_disabled() {
        let settings = ClientSettings {
            verify: false,
            auth: Some(("warm".to_string(), "secret".to_string())),
            ..Default::default()
        };

        assert!(create_client(&settings).is_ok());
    }
}
