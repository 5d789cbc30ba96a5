//! Remote page store abstraction.
//!
//! The reconciler talks to Confluence only through [`RemoteStore`], so it can
//! be exercised against an in-memory store.

use mdconf_markup::AttachmentInfo;

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Attachment, Page};

/// Page and attachment operations used by sync.
pub trait RemoteStore {
    /// Fetch a page by ID. A missing page is an error (404).
    fn get_page(&self, page_id: &str) -> Result<Page, ConfluenceError>;

    /// Find a page by exact title within a space.
    fn find_page_by_title(&self, space_key: &str, title: &str)
    -> Result<Option<Page>, ConfluenceError>;

    /// Create a page, optionally under a parent page.
    fn create_page(
        &self,
        space_key: &str,
        title: &str,
        markup: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError>;

    /// Update a page. `base_version` is the version the update is based on;
    /// the store submits `base_version + 1`.
    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        markup: &str,
        base_version: u32,
    ) -> Result<Page, ConfluenceError>;

    /// List attachments on a page.
    fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError>;

    /// Upload a new attachment.
    fn upload_attachment(
        &self,
        page_id: &str,
        attachment: &AttachmentInfo,
    ) -> Result<Attachment, ConfluenceError>;

    /// Replace the data of an existing attachment.
    fn replace_attachment(
        &self,
        page_id: &str,
        attachment_id: &str,
        attachment: &AttachmentInfo,
    ) -> Result<Attachment, ConfluenceError>;

    /// Canonical web URL of a page.
    fn page_url(&self, page: &Page) -> String;
}

impl RemoteStore for ConfluenceClient {
    fn get_page(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        ConfluenceClient::get_page(self, page_id)
    }

    fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        ConfluenceClient::find_page_by_title(self, space_key, title)
    }

    fn create_page(
        &self,
        space_key: &str,
        title: &str,
        markup: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        ConfluenceClient::create_page(self, space_key, title, markup, parent_id)
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        markup: &str,
        base_version: u32,
    ) -> Result<Page, ConfluenceError> {
        ConfluenceClient::update_page(self, page_id, title, markup, base_version)
    }

    fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        ConfluenceClient::list_attachments(self, page_id)
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        attachment: &AttachmentInfo,
    ) -> Result<Attachment, ConfluenceError> {
        ConfluenceClient::upload_attachment(
            self,
            page_id,
            &attachment.filename,
            &attachment.data,
            &attachment.content_type,
        )
    }

    fn replace_attachment(
        &self,
        page_id: &str,
        attachment_id: &str,
        attachment: &AttachmentInfo,
    ) -> Result<Attachment, ConfluenceError> {
        ConfluenceClient::replace_attachment(
            self,
            page_id,
            attachment_id,
            &attachment.filename,
            &attachment.data,
            &attachment.content_type,
        )
    }

    fn page_url(&self, page: &Page) -> String {
        ConfluenceClient::page_url(self, page)
    }
}
