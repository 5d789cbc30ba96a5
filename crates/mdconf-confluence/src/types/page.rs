//! Confluence page types.

use serde::{Deserialize, Serialize};

/// Confluence page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Content type (always "page").
    #[serde(rename = "type", default = "default_content_type")]
    pub content_type: String,
    /// Page title.
    pub title: String,
    /// Version information.
    pub version: Version,
    /// Page body content.
    #[serde(default)]
    pub body: Option<Body>,
    /// Space the page lives in.
    #[serde(default)]
    pub space: Option<Space>,
    /// Parent pages, root first.
    #[serde(default)]
    pub ancestors: Vec<Ancestor>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

fn default_content_type() -> String {
    "page".to_owned()
}

impl Page {
    /// Stored markup, empty when the body was not expanded.
    #[must_use]
    pub fn storage_value(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|body| body.storage.as_ref())
            .map_or("", |storage| storage.value.as_str())
    }

    /// Web UI path relative to the site URL.
    #[must_use]
    pub fn webui(&self) -> Option<&str> {
        self.links.as_ref()?.webui.as_deref()
    }
}

/// Page version.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Version message/comment.
    #[serde(default)]
    pub message: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    /// XHTML content in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

/// Space reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Space {
    pub key: String,
}

/// Ancestor page reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Ancestor {
    pub id: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Links {
    /// Web UI link.
    #[serde(default)]
    pub webui: Option<String>,
    /// API self link.
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
}

/// Content search response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub results: Vec<Page>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_expanded_page() {
        let json = r#"{
            "id": "123",
            "type": "page",
            "status": "current",
            "title": "Guide",
            "space": {"key": "DOCS", "name": "Docs"},
            "ancestors": [{"id": "1"}, {"id": "2"}],
            "version": {"number": 7, "when": "2024-01-01"},
            "body": {"storage": {"value": "<p>Hi</p>", "representation": "storage"}},
            "_links": {"webui": "/spaces/DOCS/pages/123/Guide", "self": "https://x/rest/api/content/123"}
        }"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.version.number, 7);
        assert_eq!(page.storage_value(), "<p>Hi</p>");
        assert_eq!(page.space.as_ref().map(|s| s.key.as_str()), Some("DOCS"));
        assert_eq!(page.ancestors.len(), 2);
        assert_eq!(page.webui(), Some("/spaces/DOCS/pages/123/Guide"));
    }

    #[test]
    fn test_deserialize_minimal_page() {
        let json = r#"{"id": "9", "title": "T", "version": {"number": 1}}"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.content_type, "page");
        assert_eq!(page.storage_value(), "");
        assert!(page.webui().is_none());
        assert!(page.ancestors.is_empty());
    }

    #[test]
    fn test_deserialize_search_result() {
        let json = r#"{"results": [], "size": 0, "start": 0, "limit": 25}"#;
        let result: SearchResult = serde_json::from_str(json).unwrap();
        assert!(result.results.is_empty());
    }
}
