//! Kroki diagram rendering over HTTP.

use std::sync::OnceLock;
use std::time::Duration;

use tracing::{debug, warn};
use ureq::Agent;

use mdconf_markup::diagram::DIAGRAM_LANGUAGE;

use crate::backend::{DiagramBackend, RenderError};

/// PNG file signature.
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Create HTTP agent with the specified timeout.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Extract width and height from PNG image data.
///
/// PNG format: 8-byte signature, then IHDR chunk with width/height at bytes 16-24.
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || &data[0..8] != PNG_SIGNATURE {
        return None;
    }

    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

/// Diagram backend using a Kroki server.
///
/// Availability is probed once via `GET {server}/health` and remembered for
/// the lifetime of the backend.
pub struct KrokiBackend {
    agent: Agent,
    server_url: String,
    healthy: OnceLock<bool>,
}

impl KrokiBackend {
    /// Create a backend for `server_url` with a per-request timeout.
    #[must_use]
    pub fn new(server_url: &str, timeout: Duration) -> Self {
        Self {
            agent: create_agent(timeout),
            server_url: server_url.trim_end_matches('/').to_owned(),
            healthy: OnceLock::new(),
        }
    }

    fn probe(&self) -> bool {
        let url = format!("{}/health", self.server_url);
        match self.agent.get(&url).call() {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(url = %url, status = response.status().as_u16(), "Kroki health check failed");
                false
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Kroki server unreachable");
                false
            }
        }
    }
}

impl DiagramBackend for KrokiBackend {
    fn name(&self) -> &str {
        &self.server_url
    }

    fn available(&self) -> bool {
        *self.healthy.get_or_init(|| self.probe())
    }

    fn render(&self, source: &str) -> Result<Vec<u8>, RenderError> {
        let url = format!("{}/{DIAGRAM_LANGUAGE}/png", self.server_url);

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .send(source.as_bytes())
            .map_err(|e| RenderError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(RenderError::Http(format!("HTTP {status}: {error_body}")));
        }

        let data = body
            .read_to_vec()
            .map_err(|e| RenderError::Io(e.to_string()))?;
        let (width, height) = png_dimensions(&data).ok_or(RenderError::InvalidPng)?;
        debug!(width, height, bytes = data.len(), "Rendered diagram");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&[0, 0, 0, 13]);
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data
    }

    #[test]
    fn test_png_dimensions() {
        assert_eq!(png_dimensions(&png_header(800, 600)), Some((800, 600)));
    }

    #[test]
    fn test_png_dimensions_rejects_non_png() {
        assert_eq!(png_dimensions(b"<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>"), None);
        assert_eq!(png_dimensions(PNG_SIGNATURE), None);
    }

    #[test]
    fn test_server_url_trailing_slash_trimmed() {
        let backend = KrokiBackend::new("https://kroki.io/", Duration::from_secs(1));
        assert_eq!(backend.name(), "https://kroki.io");
    }

    #[test]
    fn test_availability_uses_memoised_probe() {
        let backend = KrokiBackend::new("http://kroki.invalid", Duration::from_secs(1));
        backend.healthy.set(false).unwrap();
        assert!(!backend.available());
    }
}
