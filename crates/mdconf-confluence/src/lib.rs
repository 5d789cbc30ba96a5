//! Confluence Cloud sync for mdconf.
//!
//! This crate turns Markdown documents into Confluence pages:
//! - [`ConfluenceClient`]: REST API client with basic authentication
//! - [`PageRenderer`]: Markdown to storage format with rendered diagrams
//! - [`Reconciler`]: create, update or skip one page by content hash
//! - [`BatchSync`]: sync a list of files and collect a [`SyncReport`]
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::time::Duration;
//! use mdconf_confluence::{BatchSync, ConfluenceClient, PageRenderer, SyncOptions};
//! use mdconf_diagrams::KrokiBackend;
//! use mdconf_markup::ConversionConfig;
//!
//! let client = ConfluenceClient::new(
//!     "https://example.atlassian.net/wiki",
//!     "me@example.com",
//!     "api-token",
//!     Duration::from_secs(30),
//! );
//! let backend = KrokiBackend::new("https://kroki.io", Duration::from_secs(30));
//! let renderer = PageRenderer::new(&backend, ConversionConfig::default());
//! let options = SyncOptions {
//!     space_key: "DOCS".to_owned(),
//!     ..SyncOptions::default()
//! };
//!
//! let report = BatchSync::new(&client, &renderer, &options).run(&[PathBuf::from("README.md")])?;
//! println!("{} created", report.count(mdconf_confluence::SyncAction::Created));
//! ```

// API client
mod client;
pub use client::ConfluenceClient;

// Errors
pub mod error;
pub use error::ConfluenceError;

// Types returned by the API
pub mod types;

// Remote store seam
mod store;
pub use store::RemoteStore;

// Conversion pipeline
mod renderer;
pub use renderer::{PageRenderError, PageRenderer, RenderedPage};

// Reconciliation and batch sync
pub mod sync;
pub use sync::{
    BatchSync, DRY_RUN_PAGE_ID, Reconciler, SyncAction, SyncError, SyncFailure, SyncOptions,
    SyncOutcome, SyncReport, content_hash, expand_files,
};

#[cfg(any(test, feature = "mock"))]
pub mod mock;
