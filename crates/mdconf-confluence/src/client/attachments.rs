//! Attachment operations for Confluence API.

use rand::RngExt;
use tracing::info;

use super::{ConfluenceClient, encode, read_json};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentUpload, AttachmentsResponse};

/// Build a `multipart/form-data` body with a single `file` part.
///
/// Returns the boundary and the encoded body.
fn multipart_file(filename: &str, data: &[u8], content_type: &str) -> (String, Vec<u8>) {
    let boundary = format!("----MdconfFormBoundary{:016x}", rand::rng().random::<u64>());
    let mut body = Vec::with_capacity(data.len() + 256);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    (boundary, body)
}

impl ConfluenceClient {
    /// List attachments on a page.
    pub fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        let url = format!(
            "{}/content/{}/child/attachment",
            self.api_url(),
            encode(page_id)
        );

        info!("Getting attachments for page {}", page_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let attachments: AttachmentsResponse = read_json(response)?;
        Ok(attachments.results)
    }

    /// Upload a new attachment to a page.
    pub fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        let url = format!(
            "{}/content/{}/child/attachment",
            self.api_url(),
            encode(page_id)
        );

        info!(
            "Uploading new attachment '{}' to page {}",
            filename, page_id
        );
        self.post_file(&url, filename, data, content_type)
    }

    /// Replace the data of an existing attachment, keeping its ID.
    pub fn replace_attachment(
        &self,
        page_id: &str,
        attachment_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        let url = format!(
            "{}/content/{}/child/attachment/{}/data",
            self.api_url(),
            encode(page_id),
            encode(attachment_id)
        );

        info!(
            "Updating existing attachment '{}' (id={})",
            filename, attachment_id
        );
        self.post_file(&url, filename, data, content_type)
    }

    fn post_file(
        &self,
        url: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        let (boundary, body) = multipart_file(filename, data, content_type);

        let response = self
            .agent
            .post(url)
            .header("Authorization", &self.auth_header)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;

        let upload: AttachmentUpload = read_json(response)?;
        upload
            .into_attachment()
            .ok_or(ConfluenceError::EmptyResponse("attachment"))
    }
}
