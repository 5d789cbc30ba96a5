//! Page operations for Confluence API.

use serde_json::{Value, json};
use tracing::info;

use super::{ConfluenceClient, encode, read_json};
use crate::error::ConfluenceError;
use crate::types::{Page, SearchResult};

/// Fields expanded when fetching a page by ID.
const PAGE_EXPAND: &str = "version,body.storage,space,ancestors";

/// Fields expanded in title search results.
const SEARCH_EXPAND: &str = "version,body.storage";

/// Storage format body payload.
fn storage_body(markup: &str) -> Value {
    json!({
        "storage": {
            "value": markup,
            "representation": "storage"
        }
    })
}

impl ConfluenceClient {
    /// Get page by ID with version, body, space and ancestors expanded.
    pub fn get_page(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        let url = format!(
            "{}/content/{}?expand={PAGE_EXPAND}",
            self.api_url(),
            encode(page_id)
        );

        info!("Getting page {}", page_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        read_json(response)
    }

    /// Find a page by exact title within a space.
    pub fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        let url = format!(
            "{}/content?spaceKey={}&title={}&expand={SEARCH_EXPAND}",
            self.api_url(),
            encode(space_key),
            encode(title)
        );

        info!("Looking up page '{}' in space {}", title, space_key);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let result: SearchResult = read_json(response)?;
        Ok(result.results.into_iter().next())
    }

    /// Create a page in a space, optionally under a parent page.
    pub fn create_page(
        &self,
        space_key: &str,
        title: &str,
        markup: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": {"key": space_key},
            "body": storage_body(markup)
        });
        if let Some(parent_id) = parent_id {
            payload["ancestors"] = json!([{"id": parent_id}]);
        }

        info!("Creating page '{}' in space {}", title, space_key);

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = read_json(response)?;
        info!("Created page {} ('{}')", page.id, page.title);
        Ok(page)
    }

    /// Update existing page, submitting `version + 1`.
    ///
    /// The server rejects the update with 409 if the page moved past
    /// `version` in the meantime.
    pub fn update_page(
        &self,
        page_id: &str,
        title: &str,
        markup: &str,
        version: u32,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), encode(page_id));

        let payload = json!({
            "type": "page",
            "title": title,
            "body": storage_body(markup),
            "version": {"number": version + 1}
        });

        info!(
            "Updating page {} from version {} to {}",
            page_id,
            version,
            version + 1
        );

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = read_json(response)?;
        info!(
            "Updated page {} to version {}",
            page_id, page.version.number
        );
        Ok(page)
    }

    /// Get web URL for page.
    pub fn page_url(&self, page: &Page) -> String {
        match page.webui() {
            Some(webui) => format!("{}{}", self.site_url, webui),
            None => format!(
                "{}/pages/viewpage.action?pageId={}",
                self.site_url, page.id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client() -> ConfluenceClient {
        ConfluenceClient::new(
            "https://acme.atlassian.net/wiki",
            "me@acme.com",
            "token",
            Duration::from_secs(1),
        )
    }

    fn page(links: Option<&str>) -> Page {
        let mut value = json!({"id": "42", "title": "T", "version": {"number": 1}});
        if let Some(webui) = links {
            value["_links"] = json!({"webui": webui});
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_page_url_from_webui() {
        assert_eq!(
            client().page_url(&page(Some("/spaces/DOCS/pages/42/T"))),
            "https://acme.atlassian.net/wiki/spaces/DOCS/pages/42/T"
        );
    }

    #[test]
    fn test_page_url_fallback() {
        assert_eq!(
            client().page_url(&page(None)),
            "https://acme.atlassian.net/wiki/pages/viewpage.action?pageId=42"
        );
    }

    #[test]
    fn test_storage_body_shape() {
        assert_eq!(
            storage_body("<p>x</p>"),
            json!({"storage": {"value": "<p>x</p>", "representation": "storage"}})
        );
    }
}
