use downlevel_dom::DomError;
use downlevel_xsl::XslError;
use thiserror::Error;

/// Errors surfaced by the transpiler entry points.
#[derive(Error, Debug)]
pub enum TranspileError {
    /// The document was rejected before any rewriting happened.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Transformation failed: {0}")]
    Xsl(#[from] XslError),

    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(String),
}
