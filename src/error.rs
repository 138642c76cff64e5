use thiserror::Error;

/// Errors surfaced by workspace operations.
///
/// All of these are recoverable: the caller shows the message to the user
/// and the workspace is left exactly as it was before the operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaygroundError {
    #[error("File name cannot be empty")]
    EmptyFileName,

    #[error("Please use a .py or .js extension: {0}")]
    UnsupportedExtension(String),

    #[error("A file named '{0}' already exists")]
    DuplicateFile(String),

    #[error("No open file named '{0}'")]
    UnknownFile(String),

    #[error("You must have at least one file open")]
    LastFileOpen,
}
