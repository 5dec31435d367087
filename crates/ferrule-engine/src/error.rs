//! Error types for ferrule-engine.

/// Errors produced while resolving a configuration.
///
/// The merge engine never wraps these: whatever a backend, a dependency hook,
/// a file collection, or a filter reports reaches the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A file collection could not be enumerated.
    #[error("{0}")]
    Util(#[from] ferrule_util::error::UtilError),

    /// A manifest could not be loaded.
    #[error("{0}")]
    Manifest(#[from] ferrule_config::manifest::ManifestError),

    /// The lockfile could not be loaded.
    #[error("{0}")]
    Lockfile(#[from] ferrule_config::lockfile::LockfileError),

    /// A module dependency has no entry in the lockfile.
    #[error("cannot resolve module {module} for configuration `{configuration}`: not in ferrule.lock")]
    UnresolvedModule {
        module: String,
        configuration: String,
    },

    /// A dependency cycle was found among projects or locked modules.
    #[error("dependency cycle detected: {cycle}")]
    DependencyCycle { cycle: String },

    /// A project dependency does not point at a Ferrule project.
    #[error("project dependency `{name}` not found at {path}")]
    ProjectNotFound { name: String, path: String },

    /// A project dependency path leaves the allowed tree.
    #[error("project dependency `{name}` at {path} escapes the project tree")]
    ProjectPathEscape { name: String, path: String },

    /// An artifact filter could not be evaluated.
    #[error("cannot evaluate filter for artifact {artifact}: {message}")]
    Filter { artifact: String, message: String },

    /// A backend resolver failed for a reason of its own.
    #[error("cannot resolve configuration `{configuration}`: {message}")]
    Backend {
        configuration: String,
        message: String,
    },
}
