//! Confluence REST API client.
//!
//! Provides sync HTTP client for the Confluence Cloud REST API with basic
//! authentication (account email and API token).

mod attachments;
mod pages;

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use ureq::Agent;
use ureq::http::Response;

use mdconf_config::ConfluenceConfig;

use crate::error::{ConfluenceError, api_message};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Characters left unescaped in query values and path segments.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a URL query value or path segment.
fn encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    site_url: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create client for a Confluence Cloud site.
    ///
    /// # Arguments
    /// * `site_url` - Site URL including the `/wiki` context path
    /// * `email` - Account email
    /// * `api_token` - API token
    /// * `timeout` - Per-request timeout
    #[must_use]
    pub fn new(site_url: &str, email: &str, api_token: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        let credentials = BASE64_STANDARD.encode(format!("{email}:{api_token}"));

        Self {
            agent,
            site_url: site_url.trim_end_matches('/').to_owned(),
            auth_header: format!("Basic {credentials}"),
        }
    }

    /// Create client from resolved configuration.
    #[must_use]
    pub fn from_config(config: &ConfluenceConfig) -> Self {
        Self::new(
            &config.site_url(),
            &config.email,
            &config.api_token,
            Duration::from_secs(DEFAULT_TIMEOUT),
        )
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.site_url)
    }
}

/// Check the response status and deserialize the JSON body.
fn read_json<T: DeserializeOwned>(response: Response<ureq::Body>) -> Result<T, ConfluenceError> {
    let status = response.status();
    let mut body = response.into_body();

    if status.as_u16() >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::Api {
            status: status.as_u16(),
            message: api_message(&error_body, status.canonical_reason()),
        });
    }

    let text = body.read_to_string()?;
    Ok(serde_json::from_str(&text)?)
}
