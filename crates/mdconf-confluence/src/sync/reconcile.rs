//! Create/update/skip decision for a single page.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tracing::{debug, info};

use mdconf_markup::AttachmentInfo;

use super::{DRY_RUN_PAGE_ID, SyncAction, SyncOptions, SyncOutcome, content_hash};
use crate::error::ConfluenceError;
use crate::renderer::RenderedPage;
use crate::store::RemoteStore;
use crate::types::Page;

/// Reconciles rendered pages against a remote store.
pub struct Reconciler<'a, S: RemoteStore + ?Sized> {
    store: &'a S,
    options: &'a SyncOptions,
}

impl<'a, S: RemoteStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S, options: &'a SyncOptions) -> Self {
        Self { store, options }
    }

    /// Bring the remote page for `page` up to date.
    ///
    /// 1. Find the existing page by front matter ID, else by title.
    /// 2. Equal content hashes skip the page, different ones update it with
    ///    the next version number, no existing page creates one.
    /// 3. After a create or update, upload new attachments and replace
    ///    existing ones with the same filename.
    ///
    /// A dry run stops after step 2 and only reports the action.
    ///
    /// # Errors
    ///
    /// Returns the remote store error that stopped reconciliation. A page ID
    /// from front matter that does not exist is an error.
    pub fn reconcile(
        &self,
        file: &Path,
        page: &RenderedPage,
    ) -> Result<SyncOutcome, ConfluenceError> {
        let existing = self.find_existing(page)?;
        let action = plan(existing.as_ref(), &page.markup);
        debug!(title = %page.title, action = %action, "Planned sync action");

        let outcome = |remote: &Page, action| SyncOutcome {
            file: file.to_path_buf(),
            title: page.title.clone(),
            page_id: remote.id.clone(),
            url: self.store.page_url(remote),
            action,
        };

        if self.options.dry_run {
            info!("[dry run] Would {}: {}", action.verb(), page.title);
            return Ok(match &existing {
                Some(remote) => outcome(remote, action),
                None => SyncOutcome {
                    file: file.to_path_buf(),
                    title: page.title.clone(),
                    page_id: DRY_RUN_PAGE_ID.to_owned(),
                    url: String::new(),
                    action,
                },
            });
        }

        let remote = match existing {
            Some(remote) if action == SyncAction::Skipped => {
                info!("Skipped (no changes): {}", page.title);
                return Ok(outcome(&remote, action));
            }
            Some(remote) => {
                let updated = self.store.update_page(
                    &remote.id,
                    &page.title,
                    &page.markup,
                    remote.version.number,
                )?;
                info!("Updated: {}", page.title);
                updated
            }
            None => {
                let created = self.store.create_page(
                    &self.options.space_key,
                    &page.title,
                    &page.markup,
                    self.options.parent_page_id.as_deref(),
                )?;
                info!("Created: {}", page.title);
                created
            }
        };

        if !page.attachments.is_empty() {
            self.sync_attachments(&remote.id, &page.attachments)?;
        }

        Ok(outcome(&remote, action))
    }

    fn find_existing(&self, page: &RenderedPage) -> Result<Option<Page>, ConfluenceError> {
        match page.page_id() {
            Some(page_id) => self.store.get_page(page_id).map(Some),
            None => self
                .store
                .find_page_by_title(&self.options.space_key, &page.title),
        }
    }

    /// Upload new attachments and replace those whose filename exists.
    fn sync_attachments(
        &self,
        page_id: &str,
        attachments: &BTreeMap<String, AttachmentInfo>,
    ) -> Result<(), ConfluenceError> {
        let existing: HashMap<String, String> = self
            .store
            .list_attachments(page_id)?
            .into_iter()
            .map(|a| (a.title, a.id))
            .collect();

        for (filename, attachment) in attachments {
            match existing.get(filename) {
                Some(attachment_id) => {
                    self.store
                        .replace_attachment(page_id, attachment_id, attachment)?;
                    info!("  Updated attachment: {}", filename);
                }
                None => {
                    self.store.upload_attachment(page_id, attachment)?;
                    info!("  Uploaded attachment: {}", filename);
                }
            }
        }
        Ok(())
    }
}

/// Decide the action from the existing page and the new markup.
fn plan(existing: Option<&Page>, markup: &str) -> SyncAction {
    match existing {
        None => SyncAction::Created,
        Some(remote) if content_hash(remote.storage_value()) == content_hash(markup) => {
            SyncAction::Skipped
        }
        Some(_) => SyncAction::Updated,
    }
}
