//! Confluence REST API types.

mod attachment;
mod page;

pub use attachment::{Attachment, AttachmentMetadata, AttachmentUpload, AttachmentsResponse};
pub use page::{Ancestor, Body, Links, Page, SearchResult, Space, Storage, Version};
