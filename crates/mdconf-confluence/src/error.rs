//! Error types for Confluence integration.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    /// Server returned an error status.
    #[error("Confluence API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the status reason.
        message: String,
    },

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response parsed but carried no result.
    #[error("Empty {0} response")]
    EmptyResponse(&'static str),
}

impl ConfluenceError {
    /// HTTP status code, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Actionable explanation for the user, keyed by status code.
    #[must_use]
    pub fn help_text(&self) -> String {
        match self.status() {
            Some(401) => "Authentication failed\n  \
                → Set CONFLUENCE_EMAIL and CONFLUENCE_API_TOKEN\n  \
                → Generate a token at https://id.atlassian.com/manage-profile/security/api-tokens"
                .to_owned(),
            Some(403) => "Permission denied\n  \
                → Verify you have access to this space/page\n  \
                → Check that the API token has the required permissions"
                .to_owned(),
            Some(404) => "Page not found\n  \
                → Check confluence-page-id in front matter\n  \
                → Verify the page exists and you have access"
                .to_owned(),
            Some(409) => "Version conflict\n  \
                → The page was changed while syncing\n  \
                → Run the sync again"
                .to_owned(),
            _ => self.to_string(),
        }
    }
}

/// Extract the error message from an API error body.
///
/// Confluence reports errors as JSON with a `message` (or `reason`) field.
pub(crate) fn api_message(body: &str, reason: Option<&str>) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "reason"]
                .iter()
                .find_map(|key| value.get(key)?.as_str().map(str::to_owned))
        })
        .filter(|message| !message.is_empty());

    from_json
        .or_else(|| reason.map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> ConfluenceError {
        ConfluenceError::Api {
            status,
            message: "boom".to_owned(),
        }
    }

    #[test]
    fn test_help_text_by_status() {
        assert!(api(401).help_text().starts_with("Authentication failed"));
        assert!(api(403).help_text().starts_with("Permission denied"));
        assert!(api(404).help_text().contains("confluence-page-id"));
        assert!(api(409).help_text().starts_with("Version conflict"));
    }

    #[test]
    fn test_help_text_falls_back_to_message() {
        assert_eq!(api(500).help_text(), "Confluence API error 500: boom");
        assert_eq!(
            ConfluenceError::EmptyResponse("attachment").help_text(),
            "Empty attachment response"
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(api(404).status(), Some(404));
        assert_eq!(ConfluenceError::EmptyResponse("page").status(), None);
    }

    #[test]
    fn test_api_message_from_json() {
        assert_eq!(
            api_message(r#"{"statusCode":400,"message":"Title taken"}"#, Some("Bad Request")),
            "Title taken"
        );
        assert_eq!(
            api_message(r#"{"reason":"Nope"}"#, Some("Bad Request")),
            "Nope"
        );
    }

    #[test]
    fn test_api_message_fallbacks() {
        assert_eq!(api_message("<html>", Some("Bad Gateway")), "Bad Gateway");
        assert_eq!(api_message(" plain ", None), "plain");
    }
}
