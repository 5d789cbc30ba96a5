//! Diagram rendering for mdconf.
//!
//! Mermaid code blocks are rendered to PNG before conversion so the code
//! emitter can reference them as page attachments:
//!
//! - [`DiagramBackend`]: renders one diagram source to image bytes
//! - [`KrokiBackend`]: backend using a Kroki server over HTTP
//! - [`DiagramPreprocessor`]: finds diagram blocks in a document, renders
//!   every distinct diagram in parallel and stores the images in the
//!   conversion context

mod backend;
mod kroki;
mod preprocess;

pub use backend::{DiagramBackend, RenderError};
pub use kroki::KrokiBackend;
pub use preprocess::{DiagramPreprocessor, PreprocessError};
