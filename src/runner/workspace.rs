//! Working directory of a run.
//!
//! Every relative path a run touches (log file, script) is resolved here,
//! before any of them is opened.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RunError;

#[derive(Debug, Clone)]
pub(crate) struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub(crate) fn new(dir: &Path) -> Result<Self, RunError> {
        let root = std::path::absolute(dir).map_err(|source| RunError::Workspace {
            path: dir.to_path_buf(),
            source,
        })?;
        let meta = fs::metadata(&root).map_err(|source| RunError::Workspace {
            path: root.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(RunError::NotADirectory { path: root });
        }
        Ok(Self { root })
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_against_root() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path()).unwrap();
        assert_eq!(
            ws.resolve(Path::new("logs/update_log.txt")),
            dir.path().join("logs/update_log.txt")
        );
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path()).unwrap();
        let abs = other.path().join("script.py");
        assert_eq!(ws.resolve(&abs), abs);
    }

    #[test]
    fn relative_root_becomes_absolute() {
        let ws = Workspace::new(Path::new(".")).unwrap();
        assert!(ws.root().is_absolute());
    }

    #[test]
    fn missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Workspace::new(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, RunError::Workspace { .. }));
    }

    #[test]
    fn file_is_not_a_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let err = Workspace::new(&file).unwrap_err();
        assert!(matches!(err, RunError::NotADirectory { .. }));
    }
}
