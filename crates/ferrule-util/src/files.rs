//! Lazily enumerated sets of files.
//!
//! A [`FileCollection`] describes *where* files come from without touching the
//! filesystem. Enumeration happens on every call to [`FileCollection::files`],
//! so a collection always reflects the current state of the disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::UtilError;

/// A lazily evaluated, ordered set of files.
pub trait FileCollection: fmt::Debug + Send + Sync {
    /// Enumerate the files in this collection.
    ///
    /// # Errors
    /// Returns an error if the backing source cannot be enumerated.
    fn files(&self) -> Result<Vec<PathBuf>, UtilError>;
}

/// An explicit list of files. Enumeration never touches the filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    paths: Vec<PathBuf>,
}

impl FileList {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl FileCollection for FileList {
    fn files(&self) -> Result<Vec<PathBuf>, UtilError> {
        Ok(self.paths.clone())
    }
}

/// Files below `base` matching a glob `pattern` (e.g. `"build/libs/*.jar"`), sorted by path.
///
/// A missing `base` directory yields no files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobFiles {
    base: PathBuf,
    pattern: String,
}

impl GlobFiles {
    pub fn new(base: &Path, pattern: &str) -> Self {
        Self {
            base: base.to_path_buf(),
            pattern: pattern.to_owned(),
        }
    }
}

impl FileCollection for GlobFiles {
    fn files(&self) -> Result<Vec<PathBuf>, UtilError> {
        // Glob metacharacters in the base directory match literally.
        let base = glob::Pattern::escape(&self.base.display().to_string());
        let full_pattern_str = format!("{base}{}{}", std::path::MAIN_SEPARATOR, self.pattern);

        let matches = glob::glob(&full_pattern_str).map_err(|e| UtilError::GlobPattern {
            pattern: full_pattern_str.clone(),
            message: e.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in matches {
            let path = entry.map_err(|e| UtilError::GlobMatch {
                path: e.path().display().to_string(),
                message: e.error().to_string(),
            })?;
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

/// All files with a given extension below a directory, recursively, sorted by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFiles {
    dir: PathBuf,
    extension: String,
}

impl ExtensionFiles {
    pub fn new(dir: &Path, extension: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            extension: extension.to_owned(),
        }
    }
}

impl FileCollection for ExtensionFiles {
    fn files(&self) -> Result<Vec<PathBuf>, UtilError> {
        crate::fs::collect_files(&self.dir, &self.extension)
    }
}

/// The concatenation of several collections, in order.
///
/// Duplicates across members are kept; callers that need set semantics
/// deduplicate after enumeration.
#[derive(Debug, Clone, Default)]
pub struct FileUnion {
    members: Vec<Arc<dyn FileCollection>>,
}

impl FileUnion {
    pub fn new(members: Vec<Arc<dyn FileCollection>>) -> Self {
        Self { members }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FileCollection for FileUnion {
    fn files(&self) -> Result<Vec<PathBuf>, UtilError> {
        let mut out = Vec::new();
        for member in &self.members {
            out.extend(member.files()?);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn file_list_preserves_order() {
        let list = FileList::new(["b.jar", "a.jar"]);
        assert_eq!(
            list.files().unwrap(),
            vec![PathBuf::from("b.jar"), PathBuf::from("a.jar")]
        );
    }

    #[test]
    fn file_list_does_not_check_existence() {
        let list = FileList::new(["/definitely/not/here.jar"]);
        assert_eq!(list.files().unwrap().len(), 1);
    }

    #[test]
    fn glob_matches_sorted_files_only() {
        let tmp = tempfile::tempdir().unwrap();
        let libs = tmp.path().join("build/libs");
        fs::create_dir_all(libs.join("nested.jar")).unwrap();
        fs::write(libs.join("z.jar"), b"").unwrap();
        fs::write(libs.join("a.jar"), b"").unwrap();
        fs::write(libs.join("notes.txt"), b"").unwrap();

        let files = GlobFiles::new(tmp.path(), "build/libs/*.jar").files().unwrap();
        assert_eq!(files, vec![libs.join("a.jar"), libs.join("z.jar")]);
    }

    #[test]
    fn glob_is_evaluated_lazily() {
        let tmp = tempfile::tempdir().unwrap();
        let collection = GlobFiles::new(tmp.path(), "*.jar");
        assert!(collection.files().unwrap().is_empty());

        fs::write(tmp.path().join("late.jar"), b"").unwrap();
        assert_eq!(collection.files().unwrap(), vec![tmp.path().join("late.jar")]);
    }

    #[test]
    fn glob_base_with_metacharacters_matches_literally() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("lib[1]");
        fs::create_dir_all(base.join("build/libs")).unwrap();
        fs::write(base.join("build/libs/lib.jar"), b"").unwrap();
        fs::create_dir_all(tmp.path().join("lib1/build/libs")).unwrap();
        fs::write(tmp.path().join("lib1/build/libs/other.jar"), b"").unwrap();

        let files = GlobFiles::new(&base, "build/libs/*.jar").files().unwrap();
        assert_eq!(files, vec![base.join("build/libs/lib.jar")]);
    }

    #[test]
    fn glob_missing_base_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let files = GlobFiles::new(&tmp.path().join("absent"), "*.jar")
            .files()
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn glob_invalid_pattern_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = GlobFiles::new(tmp.path(), "[")
            .files()
            .unwrap_err()
            .to_string();
        assert!(err.contains("invalid glob pattern"), "error was: {err}");
    }

    #[test]
    fn union_concatenates_in_order() {
        let first: Arc<dyn FileCollection> = Arc::new(FileList::new(["b.jar", "a.jar"]));
        let second: Arc<dyn FileCollection> = Arc::new(FileList::new(["a.jar", "c.jar"]));
        let union = FileUnion::new(vec![first, second]);
        assert_eq!(
            union.files().unwrap(),
            ["b.jar", "a.jar", "a.jar", "c.jar"].map(PathBuf::from).to_vec()
        );
    }

    #[test]
    fn union_propagates_member_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let ok: Arc<dyn FileCollection> = Arc::new(FileList::new(["a.jar"]));
        let missing: Arc<dyn FileCollection> =
            Arc::new(ExtensionFiles::new(&tmp.path().join("absent"), "jar"));
        let union = FileUnion::new(vec![ok, missing]);
        assert!(union.files().is_err());
    }

    #[test]
    fn extension_files_missing_dir_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let result = ExtensionFiles::new(&tmp.path().join("absent"), "jar").files();
        assert!(result.is_err());
    }
}
