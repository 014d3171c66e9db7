//! Error types for the generation pipeline
//!
//! One structured error enum covers the whole pipeline so every entry point
//! (synchronous handler, lightweight worker, durable job) reports failures the
//! same way. NotFound and Validation abort before any filesystem write; the
//! remaining variants surface synthesis, I/O and archival failures.

use thiserror::Error;

/// Errors raised while loading a schema, synthesizing a source tree,
/// packaging an artifact, or tracking a generation run.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Project not found by id
    #[error("Project {0} not found")]
    ProjectNotFound(i32),

    /// Some other record (owner, job, file) not found
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed schema, caught before any filesystem write
    #[error("Schema validation failed: {0}")]
    Validation(String),

    /// Unexpected error while building the source tree
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// Template rendering failed
    #[error("Template rendering failed: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Filesystem error while writing or reading generated output
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Archive creation or extraction failed
    #[error("Archive failure: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A caller-supplied relative path resolved outside the project root
    #[error("Path escapes the project root")]
    PathEscape,

    /// Shutdown interrupted an in-flight run
    #[error("Generation cancelled by shutdown")]
    Cancelled,

    /// The lightweight queue has been closed by shutdown
    #[error("Generation queue is closed")]
    QueueClosed,
}

impl GenerationError {
    /// True when the failure was caught before any filesystem mutation.
    pub fn is_pre_write(&self) -> bool {
        matches!(
            self,
            GenerationError::ProjectNotFound(_)
                | GenerationError::NotFound(_)
                | GenerationError::Validation(_)
        )
    }
}

/// Result type alias for generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;
