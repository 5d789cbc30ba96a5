//! Diagram rendering backend abstraction.

/// Single diagram rendering error.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("invalid PNG data")]
    InvalidPng,
}

/// Renders diagram source to PNG bytes.
///
/// Implementations are shared across the rendering thread pool.
pub trait DiagramBackend: Sync {
    /// Human-readable backend name used in errors.
    fn name(&self) -> &str;

    /// Whether the backend can render at all.
    fn available(&self) -> bool;

    /// Render one diagram.
    fn render(&self, source: &str) -> Result<Vec<u8>, RenderError>;
}
