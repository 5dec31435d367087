//! Filesystem utilities for Ferrule.

use std::path::{Path, PathBuf};

use crate::error::UtilError;

/// Return the Ferrule home directory (`~/.ferrule`).
///
/// Resolves via `HOME` (Unix) or `USERPROFILE` (Windows).
///
/// # Errors
/// Returns an error if neither environment variable is set.
pub fn ferrule_home() -> Result<PathBuf, UtilError> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .map_err(|_| UtilError::NoHomeDir)?;
    Ok(home.join(".ferrule"))
}

/// The default local repository that module artifacts are read from.
///
/// # Errors
/// Returns an error if the home directory cannot be determined.
pub fn default_repository() -> Result<PathBuf, UtilError> {
    Ok(ferrule_home()?.join("repository"))
}

/// Collect all files with the given `extension` under `dir`, recursively, sorted by path.
///
/// # Errors
/// Returns an error if `dir` or any directory below it cannot be read.
pub fn collect_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, UtilError> {
    let mut files = Vec::new();
    collect_files_recursive(dir, extension, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files_recursive(
    dir: &Path,
    extension: &str,
    out: &mut Vec<PathBuf>,
) -> Result<(), UtilError> {
    let entries = std::fs::read_dir(dir).map_err(|source| UtilError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| UtilError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();

        if path.is_dir() {
            collect_files_recursive(&path, extension, out)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == extension)
        {
            out.push(path);
        }
    }

    Ok(())
}

/// Join `rel_path` onto `root` unless it is already absolute.
pub fn resolve_relative(root: &Path, rel_path: &str) -> PathBuf {
    let path = Path::new(rel_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn collect_files_finds_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("libs");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("b.jar"), b"").unwrap();
        fs::write(sub.join("a.jar"), b"").unwrap();
        fs::write(tmp.path().join("c.jar"), b"").unwrap();
        fs::write(tmp.path().join("readme.md"), b"").unwrap();

        let files = collect_files(tmp.path(), "jar").unwrap();
        assert_eq!(files.len(), 3);
        for i in 0..files.len().saturating_sub(1) {
            assert!(files.get(i) <= files.get(i + 1));
        }
    }

    #[test]
    fn collect_files_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let files = collect_files(tmp.path(), "jar").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn collect_files_missing_dir_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let result = collect_files(&tmp.path().join("absent"), "jar");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot access"), "error was: {err}");
    }

    #[test]
    fn resolve_relative_keeps_absolute() {
        let root = Path::new("/work/project");
        assert_eq!(
            resolve_relative(root, "/opt/lib.jar"),
            Path::new("/opt/lib.jar")
        );
        assert_eq!(
            resolve_relative(root, "libs/a.jar"),
            Path::new("/work/project/libs/a.jar")
        );
    }
}
