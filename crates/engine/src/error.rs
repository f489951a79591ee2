//! Error types for engine interface loading

/// Error type for interface loading operations
#[derive(Debug, thiserror::Error)]
pub enum InterfaceError {
    /// The module is not loaded or exports no CreateInterface
    #[error("No factory for module: {0}")]
    MissingFactory(String),

    /// CreateInterface did not know the version string
    #[error("{module} does not provide {version} (code {code})")]
    NotFound {
        version: String,
        module: String,
        code: i32,
    },

    /// Version strings in the table must be null-terminated
    #[error("Invalid version string: {0}")]
    InvalidVersionString(String),

    #[error("Engine already initialized")]
    AlreadyInitialized,
}
