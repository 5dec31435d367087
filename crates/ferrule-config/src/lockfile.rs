use serde::{Deserialize, Serialize};
use std::path::Path;

/// The `ferrule.lock` lockfile: a pre-resolved module graph.
///
/// Each module appears once, keyed by its `group:artifact:version` id, together
/// with the ids of the modules it depends on and the artifacts it publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Lockfile {
    #[serde(default, rename = "module", skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<ModuleLock>,
}

/// A locked module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLock {
    /// `group:artifact:version`.
    pub id: String,
    /// Ids of the modules this module depends on, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Published artifacts. Empty means the single main artifact.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactLock>,
}

/// A locked artifact of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLock {
    /// Artifact name; defaults to the module's artifact id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

fn default_extension() -> String {
    "jar".to_owned()
}

impl Lockfile {
    /// Read and parse a `ferrule.lock` from the given path.
    /// Returns an empty lockfile if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, contains invalid
    /// TOML, or locks the same module twice.
    pub fn from_path(path: &Path) -> Result<Self, LockfileError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| LockfileError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let lockfile: Lockfile = toml::from_str(&content).map_err(|e| LockfileError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        if let Some(id) = lockfile.first_duplicate() {
            return Err(LockfileError::DuplicateModule {
                path: path.display().to_string(),
                id: id.to_owned(),
            });
        }
        Ok(lockfile)
    }

    /// Find a locked module by id.
    pub fn module(&self, id: &str) -> Option<&ModuleLock> {
        self.modules.iter().find(|m| m.id == id)
    }

    fn first_duplicate(&self) -> Option<&str> {
        let mut seen = std::collections::HashSet::new();
        self.modules
            .iter()
            .map(|m| m.id.as_str())
            .find(|id| !seen.insert(*id))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LockfileError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid ferrule.lock at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid ferrule.lock at {path}: module `{id}` is locked more than once")]
    DuplicateModule { path: String, id: String },
}
