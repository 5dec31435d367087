//! Error types for ferrule-util.

/// Errors produced by utility functions.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// An I/O operation failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A glob pattern was invalid.
    #[error("invalid glob pattern `{pattern}`: {message}")]
    GlobPattern { pattern: String, message: String },

    /// A glob match could not be read.
    #[error("cannot read glob match under {path}: {message}")]
    GlobMatch { path: String, message: String },

    /// A Maven coordinate string is malformed.
    #[error("invalid Maven coordinate \"{coordinate}\": {reason}")]
    InvalidMavenCoordinate { coordinate: String, reason: String },

    /// Cannot determine the user's home directory.
    #[error("cannot determine home directory: set the HOME environment variable")]
    NoHomeDir,
}
