//! Page reconciliation and batch sync.
//!
//! For each document the [`Reconciler`] decides between creating, updating
//! or skipping the remote page by comparing content hashes, then brings the
//! page's attachments in line. [`BatchSync`] runs this for a list of files,
//! one at a time, collecting a [`SyncReport`].

mod batch;
mod reconcile;

use std::fmt;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::error::ConfluenceError;
use crate::renderer::PageRenderError;

pub use batch::{BatchSync, expand_files};
pub use reconcile::Reconciler;

/// Page ID reported for pages a dry run would create.
pub const DRY_RUN_PAGE_ID: &str = "new";

/// SHA-256 hex digest of storage format markup.
#[must_use]
pub fn content_hash(markup: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(markup.as_bytes());
    hex::encode(hasher.finalize())
}

/// Where and how pages are synced.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Space key for title lookup and page creation.
    pub space_key: String,
    /// Parent page for created pages.
    pub parent_page_id: Option<String>,
    /// Predict actions without mutating calls.
    pub dry_run: bool,
}

/// Action taken for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Created,
    Updated,
    Skipped,
}

impl SyncAction {
    /// Lowercase past-tense name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
        }
    }

    /// Imperative verb used for dry-run messages.
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Created => "create",
            Self::Updated => "update",
            Self::Skipped => "skip",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of syncing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub file: PathBuf,
    pub title: String,
    /// Remote page ID, or [`DRY_RUN_PAGE_ID`] for a predicted creation.
    pub page_id: String,
    /// Web URL, empty for a predicted creation.
    pub url: String,
    pub action: SyncAction,
}

/// Document that failed with a remote store error.
#[derive(Debug)]
pub struct SyncFailure {
    pub file: PathBuf,
    pub error: ConfluenceError,
}

/// Result of a batch sync.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Outcomes in processing order.
    pub outcomes: Vec<SyncOutcome>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    /// Number of outcomes with the given action.
    #[must_use]
    pub fn count(&self, action: SyncAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    /// Outcomes that created or updated a page.
    pub fn changed(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.action != SyncAction::Skipped)
    }

    /// Whether every document synced.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Error that aborts a batch.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Reading a document failed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendering a document failed.
    #[error("Failed to render {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: PageRenderError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(action: SyncAction) -> SyncOutcome {
        SyncOutcome {
            file: PathBuf::from("a.md"),
            title: "A".to_owned(),
            page_id: "1".to_owned(),
            url: String::new(),
            action,
        }
    }

    #[test]
    fn test_content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(content_hash("<p>a</p>"), content_hash("<p>b</p>"));
    }

    #[test]
    fn test_report_counts() {
        let report = SyncReport {
            outcomes: vec![
                outcome(SyncAction::Created),
                outcome(SyncAction::Skipped),
                outcome(SyncAction::Updated),
                outcome(SyncAction::Created),
            ],
            failures: Vec::new(),
        };
        assert_eq!(report.count(SyncAction::Created), 2);
        assert_eq!(report.count(SyncAction::Updated), 1);
        assert_eq!(report.count(SyncAction::Skipped), 1);
        assert_eq!(report.changed().count(), 3);
        assert!(report.is_success());
    }

    #[test]
    fn test_action_display() {
        assert_eq!(SyncAction::Updated.to_string(), "updated");
        assert_eq!(SyncAction::Created.verb(), "create");
    }
}
