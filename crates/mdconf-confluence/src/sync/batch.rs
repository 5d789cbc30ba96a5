//! Sequential sync of a list of Markdown files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::{Reconciler, SyncError, SyncFailure, SyncOptions, SyncReport};
use crate::renderer::PageRenderer;
use crate::store::RemoteStore;

/// Expand command-line paths into the Markdown files to sync.
///
/// Directories contribute their direct `.md` children in sorted order,
/// other files are kept only if they end in `.md`. Missing paths are
/// logged and skipped. An empty list means the current directory.
#[must_use]
pub fn expand_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    if paths.is_empty() {
        return markdown_children(Path::new("."));
    }

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(markdown_children(path));
        } else if path.is_file() {
            if is_markdown(path) {
                files.push(path.clone());
            }
        } else {
            warn!("File not found: {}", path.display());
        }
    }
    files
}

fn markdown_children(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to read directory {}: {e}", dir.display());
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_markdown(path))
        .collect();
    files.sort();
    files
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// Syncs files one at a time against a remote store.
pub struct BatchSync<'a, S: RemoteStore + ?Sized> {
    store: &'a S,
    renderer: &'a PageRenderer<'a>,
    options: &'a SyncOptions,
}

impl<'a, S: RemoteStore + ?Sized> BatchSync<'a, S> {
    pub fn new(store: &'a S, renderer: &'a PageRenderer<'a>, options: &'a SyncOptions) -> Self {
        Self {
            store,
            renderer,
            options,
        }
    }

    /// Sync `files` in order.
    ///
    /// A remote store error fails only its document and is recorded in the
    /// report. Reading and rendering errors abort the batch.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if a file cannot be read and
    /// [`SyncError::Render`] if a document cannot be rendered.
    pub fn run(&self, files: &[PathBuf]) -> Result<SyncReport, SyncError> {
        let reconciler = Reconciler::new(self.store, self.options);
        let mut report = SyncReport::default();

        for file in files {
            info!("Processing: {}", file.display());
            let markdown = fs::read_to_string(file).map_err(|source| SyncError::Io {
                path: file.clone(),
                source,
            })?;
            let page = self
                .renderer
                .render(&markdown, Some(file))
                .map_err(|source| SyncError::Render {
                    path: file.clone(),
                    source,
                })?;

            match reconciler.reconcile(file, &page) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    error!("Failed to sync {}: {}", file.display(), e.help_text());
                    report.failures.push(SyncFailure {
                        file: file.clone(),
                        error: e,
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use mdconf_diagrams::{DiagramBackend, RenderError};
    use mdconf_markup::ConversionConfig;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::mock::{MockStore, StoreCall};
    use crate::sync::SyncAction;

    struct NoBackend;

    impl DiagramBackend for NoBackend {
        fn name(&self) -> &str {
            "none"
        }

        fn available(&self) -> bool {
            false
        }

        fn render(&self, _source: &str) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Http("unavailable".to_owned()))
        }
    }

    fn options() -> SyncOptions {
        SyncOptions {
            space_key: "DOCS".to_owned(),
            ..SyncOptions::default()
        }
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_expand_directory_sorted_markdown_only() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.md", "");
        write(&dir, "a.md", "");
        write(&dir, "notes.txt", "");
        fs::create_dir(dir.path().join("nested.md")).unwrap();

        let files = expand_files(&[dir.path().to_path_buf()]);

        assert_eq!(
            files,
            vec![dir.path().join("a.md"), dir.path().join("b.md")]
        );
    }

    #[test]
    fn test_expand_skips_missing_and_non_markdown() {
        let dir = TempDir::new().unwrap();
        let doc = write(&dir, "doc.md", "");
        let txt = write(&dir, "doc.txt", "");

        let files = expand_files(&[dir.path().join("missing.md"), txt, doc.clone()]);

        assert_eq!(files, vec![doc]);
    }

    #[test]
    fn test_run_processes_files_in_order() {
        let dir = TempDir::new().unwrap();
        let first = write(&dir, "first.md", "# First\n\nOne");
        let second = write(&dir, "second.md", "# Second\n\nTwo");
        let store = MockStore::new().with_page("9", "DOCS", "Second", "<h1>Second</h1><p>Two</p>");
        let renderer = PageRenderer::new(&NoBackend, ConversionConfig::default());
        let opts = options();

        let report = BatchSync::new(&store, &renderer, &opts)
            .run(&[first, second])
            .unwrap();

        let summary: Vec<_> = report
            .outcomes
            .iter()
            .map(|o| (o.title.as_str(), o.action))
            .collect();
        assert_eq!(
            summary,
            vec![("First", SyncAction::Created), ("Second", SyncAction::Skipped)]
        );
        assert!(report.is_success());
    }

    #[test]
    fn test_remote_error_does_not_abort_batch() {
        let dir = TempDir::new().unwrap();
        let broken = write(&dir, "a.md", "---\nconfluence-page-id: 13\n---\n# Locked");
        let fine = write(&dir, "b.md", "# Fine");
        let store = MockStore::new().with_failure("13", 403);
        let renderer = PageRenderer::new(&NoBackend, ConversionConfig::default());
        let opts = options();

        let report = BatchSync::new(&store, &renderer, &opts)
            .run(&[broken.clone(), fine])
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file, broken);
        assert_eq!(report.failures[0].error.status(), Some(403));
        assert_eq!(report.count(SyncAction::Created), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_version_conflict_fails_only_that_document() {
        let dir = TempDir::new().unwrap();
        let conflicting = write(&dir, "a.md", "# Shared\n\nNew body");
        let next = write(&dir, "b.md", "# Next");
        let store = MockStore::new()
            .with_page("21", "DOCS", "Shared", "<p>old</p>")
            .with_update_failure("21", 409);
        let renderer = PageRenderer::new(&NoBackend, ConversionConfig::default());
        let opts = options();

        let report = BatchSync::new(&store, &renderer, &opts)
            .run(&[conflicting.clone(), next])
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file, conflicting);
        assert_eq!(report.failures[0].error.status(), Some(409));
        let updates = store
            .calls()
            .into_iter()
            .filter(|call| matches!(call, StoreCall::UpdatePage { .. }))
            .count();
        assert_eq!(updates, 1);
        assert_eq!(store.page("21").unwrap().version.number, 1);
        assert_eq!(
            report
                .outcomes
                .iter()
                .map(|o| (o.title.as_str(), o.action))
                .collect::<Vec<_>>(),
            vec![("Next", SyncAction::Created)]
        );
    }

    #[test]
    fn test_unavailable_backend_aborts_batch() {
        let dir = TempDir::new().unwrap();
        let diagram = write(&dir, "a.md", "```mermaid\ngraph TD; A-->B\n```");
        let after = write(&dir, "b.md", "# After");
        let store = MockStore::new();
        let renderer = PageRenderer::new(&NoBackend, ConversionConfig::default());
        let opts = options();

        let err = BatchSync::new(&store, &renderer, &opts)
            .run(&[diagram, after])
            .unwrap_err();

        assert!(matches!(err, SyncError::Render { .. }));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_unreadable_file_aborts_batch() {
        let dir = TempDir::new().unwrap();
        let store = MockStore::new();
        let renderer = PageRenderer::new(&NoBackend, ConversionConfig::default());
        let opts = options();

        let err = BatchSync::new(&store, &renderer, &opts)
            .run(&[dir.path().join("gone.md")])
            .unwrap_err();

        assert!(matches!(err, SyncError::Io { .. }));
    }
}
