//! Maven coordinate parsing and local repository layout.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::UtilError;

/// A parsed Maven coordinate identifying a single module artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenCoordinate {
    /// Maven group identifier, e.g. `"org.slf4j"`.
    pub group_id: String,
    /// Maven artifact identifier, e.g. `"slf4j-api"`.
    pub artifact_id: String,
    /// Artifact version, e.g. `"2.0.9"`.
    pub version: String,
    /// File extension / packaging type (defaults to `"jar"`).
    pub packaging: String,
}

impl MavenCoordinate {
    /// Create a new coordinate with default packaging ("jar").
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_owned(),
            artifact_id: artifact_id.to_owned(),
            version: version.to_owned(),
            packaging: "jar".to_owned(),
        }
    }

    /// Builder method to override the packaging type.
    pub fn with_packaging(mut self, packaging: &str) -> Self {
        self.packaging = packaging.to_owned();
        self
    }

    /// Parse a Maven coordinate string.
    ///
    /// Accepted formats:
    /// - `"group:artifact:version"` (3 parts, packaging defaults to "jar")
    /// - `"group:artifact:version:packaging"` (4 parts)
    ///
    /// # Errors
    /// Returns `UtilError::InvalidMavenCoordinate` when the string has fewer
    /// than 3 or more than 4 colon-separated parts, or any part is empty.
    pub fn parse(coord: &str) -> Result<Self, UtilError> {
        let parts: Vec<&str> = coord.split(':').collect();

        if !(3..=4).contains(&parts.len()) {
            return Err(UtilError::InvalidMavenCoordinate {
                coordinate: coord.to_owned(),
                reason: format!(
                    "expected group:artifact:version[:packaging], got {} parts",
                    parts.len()
                ),
            });
        }

        const LABELS: [&str; 4] = ["group_id", "artifact_id", "version", "packaging"];
        for (part, label) in parts.iter().zip(LABELS) {
            if part.trim().is_empty() {
                return Err(UtilError::InvalidMavenCoordinate {
                    coordinate: coord.to_owned(),
                    reason: format!("{label} is empty"),
                });
            }
        }

        let (Some(group), Some(artifact), Some(version)) =
            (parts.first(), parts.get(1), parts.get(2))
        else {
            return Err(UtilError::InvalidMavenCoordinate {
                coordinate: coord.to_owned(),
                reason: "expected at least 3 parts".to_owned(),
            });
        };

        let mut result = Self::new(group, artifact, version);
        if let Some(pkg) = parts.get(3) {
            result.packaging = (*pkg).to_owned();
        }
        Ok(result)
    }

    /// Directory of this module's version inside a repository rooted at `repo_root`.
    ///
    /// Dots in `group_id` become path separators:
    /// `"{repo_root}/{group/path}/{artifact_id}/{version}"`.
    pub fn version_dir(&self, repo_root: &Path) -> PathBuf {
        let mut dir = repo_root.to_path_buf();
        for segment in self.group_id.split('.') {
            dir.push(segment);
        }
        dir.join(&self.artifact_id).join(&self.version)
    }

    /// Local file for an artifact of this module.
    ///
    /// `name` defaults to the artifact id; the filename is
    /// `"{name}-{version}[-{classifier}].{extension}"`.
    pub fn artifact_path(
        &self,
        repo_root: &Path,
        name: &str,
        classifier: Option<&str>,
        extension: &str,
    ) -> PathBuf {
        let filename = match classifier {
            Some(c) => format!("{name}-{}-{c}.{extension}", self.version),
            None => format!("{name}-{}.{extension}", self.version),
        };
        self.version_dir(repo_root).join(filename)
    }

    /// Local file of the module's main artifact.
    pub fn local_path(&self, repo_root: &Path) -> PathBuf {
        self.artifact_path(repo_root, &self.artifact_id, None, &self.packaging)
    }
}

impl fmt::Display for MavenCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}
