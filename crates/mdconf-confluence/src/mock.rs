//! In-memory remote store for testing.
//!
//! Provides [`MockStore`], a [`RemoteStore`] that keeps pages and attachments
//! in memory and records every call made against it.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use mdconf_markup::AttachmentInfo;

use crate::error::ConfluenceError;
use crate::store::RemoteStore;
use crate::types::{Ancestor, Attachment, Body, Links, Page, Space, Storage, Version};

/// Site URL used for page links.
const MOCK_SITE_URL: &str = "https://mock.atlassian.net/wiki";

/// A call made against [`MockStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetPage {
        page_id: String,
    },
    FindPageByTitle {
        space_key: String,
        title: String,
    },
    CreatePage {
        space_key: String,
        title: String,
        parent_id: Option<String>,
    },
    UpdatePage {
        page_id: String,
        title: String,
        base_version: u32,
    },
    ListAttachments {
        page_id: String,
    },
    UploadAttachment {
        page_id: String,
        filename: String,
    },
    ReplaceAttachment {
        page_id: String,
        attachment_id: String,
        filename: String,
    },
}

impl StoreCall {
    /// Whether the call changes remote state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreatePage { .. }
                | Self::UpdatePage { .. }
                | Self::UploadAttachment { .. }
                | Self::ReplaceAttachment { .. }
        )
    }
}

#[derive(Debug, Default)]
struct MockState {
    pages: BTreeMap<String, Page>,
    attachments: BTreeMap<String, Vec<Attachment>>,
    /// Attachment data by attachment ID.
    attachment_data: HashMap<String, Vec<u8>>,
    /// Page IDs whose `get_page` fails with the given status.
    failures: HashMap<String, u16>,
    /// Page IDs whose `update_page` fails with the given status.
    update_failures: HashMap<String, u16>,
    next_id: u64,
    calls: Vec<StoreCall>,
}

impl MockState {
    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", 1000 + self.next_id)
    }
}

fn not_found(what: &str, id: &str) -> ConfluenceError {
    ConfluenceError::Api {
        status: 404,
        message: format!("No {what} with id {id}"),
    }
}

fn build_page(
    id: &str,
    space_key: &str,
    title: &str,
    markup: &str,
    version: u32,
    parent_id: Option<&str>,
) -> Page {
    Page {
        id: id.to_owned(),
        content_type: "page".to_owned(),
        title: title.to_owned(),
        version: Version {
            number: version,
            message: None,
        },
        body: Some(Body {
            storage: Some(Storage {
                value: markup.to_owned(),
                representation: "storage".to_owned(),
            }),
        }),
        space: Some(Space {
            key: space_key.to_owned(),
        }),
        ancestors: parent_id
            .map(|id| Ancestor { id: id.to_owned() })
            .into_iter()
            .collect(),
        links: Some(Links {
            webui: Some(format!("/spaces/{space_key}/pages/{id}")),
            self_link: None,
        }),
    }
}

/// Mock remote store for testing.
///
/// # Example
///
/// ```ignore
/// use mdconf_confluence::mock::MockStore;
///
/// let store = MockStore::new().with_page("42", "DOCS", "Guide", "<p>Hi</p>");
/// ```
#[derive(Debug, Default)]
pub struct MockStore {
    state: RwLock<MockState>,
}

impl MockStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page at version 1.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, id: &str, space_key: &str, title: &str, markup: &str) -> Self {
        let page = build_page(id, space_key, title, markup, 1, None);
        self.state
            .write()
            .unwrap()
            .pages
            .insert(id.to_owned(), page);
        self
    }

    /// Add an attachment to a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_attachment(self, page_id: &str, attachment_id: &str, filename: &str) -> Self {
        self.state
            .write()
            .unwrap()
            .attachments
            .entry(page_id.to_owned())
            .or_default()
            .push(Attachment {
                id: attachment_id.to_owned(),
                title: filename.to_owned(),
                metadata: None,
            });
        self
    }

    /// Make `get_page` for `page_id` fail with an API error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, page_id: &str, status: u16) -> Self {
        self.state
            .write()
            .unwrap()
            .failures
            .insert(page_id.to_owned(), status);
        self
    }

    /// Make `update_page` for `page_id` fail with an API error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_update_failure(self, page_id: &str, status: u16) -> Self {
        self.state
            .write()
            .unwrap()
            .update_failures
            .insert(page_id.to_owned(), status);
        self
    }

    /// Every call made so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.read().unwrap().calls.clone()
    }

    /// Calls that changed remote state.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(StoreCall::is_mutation)
            .collect()
    }

    /// Current state of a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page(&self, page_id: &str) -> Option<Page> {
        self.state.read().unwrap().pages.get(page_id).cloned()
    }

    /// Attachments on a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn attachments(&self, page_id: &str) -> Vec<Attachment> {
        self.state
            .read()
            .unwrap()
            .attachments
            .get(page_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Data last stored for an attachment.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn attachment_data(&self, attachment_id: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .unwrap()
            .attachment_data
            .get(attachment_id)
            .cloned()
    }

    fn record(&self, call: StoreCall) {
        self.state.write().unwrap().calls.push(call);
    }
}

impl RemoteStore for MockStore {
    fn get_page(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        self.record(StoreCall::GetPage {
            page_id: page_id.to_owned(),
        });
        let state = self.state.read().unwrap();
        if let Some(&status) = state.failures.get(page_id) {
            return Err(ConfluenceError::Api {
                status,
                message: format!("Injected failure for page {page_id}"),
            });
        }
        state
            .pages
            .get(page_id)
            .cloned()
            .ok_or_else(|| not_found("page", page_id))
    }

    fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        self.record(StoreCall::FindPageByTitle {
            space_key: space_key.to_owned(),
            title: title.to_owned(),
        });
        let state = self.state.read().unwrap();
        Ok(state
            .pages
            .values()
            .find(|page| {
                page.title == title
                    && page.space.as_ref().is_some_and(|space| space.key == space_key)
            })
            .cloned())
    }

    fn create_page(
        &self,
        space_key: &str,
        title: &str,
        markup: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        self.record(StoreCall::CreatePage {
            space_key: space_key.to_owned(),
            title: title.to_owned(),
            parent_id: parent_id.map(str::to_owned),
        });
        let mut state = self.state.write().unwrap();
        let id = state.allocate_id("");
        let page = build_page(&id, space_key, title, markup, 1, parent_id);
        state.pages.insert(id, page.clone());
        Ok(page)
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        markup: &str,
        base_version: u32,
    ) -> Result<Page, ConfluenceError> {
        self.record(StoreCall::UpdatePage {
            page_id: page_id.to_owned(),
            title: title.to_owned(),
            base_version,
        });
        let mut state = self.state.write().unwrap();
        if let Some(&status) = state.update_failures.get(page_id) {
            return Err(ConfluenceError::Api {
                status,
                message: format!("Injected update failure for page {page_id}"),
            });
        }
        let existing = state
            .pages
            .get(page_id)
            .ok_or_else(|| not_found("page", page_id))?;
        if existing.version.number != base_version {
            return Err(ConfluenceError::Api {
                status: 409,
                message: format!(
                    "Version must be incremented on update. Current version is: {}",
                    existing.version.number
                ),
            });
        }

        let space_key = existing
            .space
            .as_ref()
            .map(|space| space.key.clone())
            .unwrap_or_default();
        let parent_id = existing.ancestors.last().map(|a| a.id.clone());
        let page = build_page(
            page_id,
            &space_key,
            title,
            markup,
            base_version + 1,
            parent_id.as_deref(),
        );
        state.pages.insert(page_id.to_owned(), page.clone());
        Ok(page)
    }

    fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        self.record(StoreCall::ListAttachments {
            page_id: page_id.to_owned(),
        });
        Ok(self.attachments(page_id))
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        attachment: &AttachmentInfo,
    ) -> Result<Attachment, ConfluenceError> {
        self.record(StoreCall::UploadAttachment {
            page_id: page_id.to_owned(),
            filename: attachment.filename.clone(),
        });
        let mut state = self.state.write().unwrap();
        let id = state.allocate_id("att");
        let uploaded = Attachment {
            id: id.clone(),
            title: attachment.filename.clone(),
            metadata: None,
        };
        state
            .attachments
            .entry(page_id.to_owned())
            .or_default()
            .push(uploaded.clone());
        state.attachment_data.insert(id, attachment.data.clone());
        Ok(uploaded)
    }

    fn replace_attachment(
        &self,
        page_id: &str,
        attachment_id: &str,
        attachment: &AttachmentInfo,
    ) -> Result<Attachment, ConfluenceError> {
        self.record(StoreCall::ReplaceAttachment {
            page_id: page_id.to_owned(),
            attachment_id: attachment_id.to_owned(),
            filename: attachment.filename.clone(),
        });
        let mut state = self.state.write().unwrap();
        let existing = state
            .attachments
            .get(page_id)
            .and_then(|list| list.iter().find(|a| a.id == attachment_id))
            .cloned()
            .ok_or_else(|| not_found("attachment", attachment_id))?;
        state
            .attachment_data
            .insert(attachment_id.to_owned(), attachment.data.clone());
        Ok(existing)
    }

    fn page_url(&self, page: &Page) -> String {
        format!("{MOCK_SITE_URL}{}", page.webui().unwrap_or_default())
    }
}
