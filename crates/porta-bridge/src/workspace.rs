//! Scoped working directory for one solver run.
//!
//! Every acquisition creates a fresh `porta_tmp_<random>` directory under the
//! base directory, so concurrent runs sharing a base never collide. The
//! directory is removed when the `Workspace` is dropped or released, on every
//! exit path (return, `?`, panic unwinding), unless `keep_on_exit` was set.
//! `release` returns a removal failure to the caller; an implicit drop logs it.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Name prefix of workspace directories.
pub const WORKSPACE_PREFIX: &str = "porta_tmp_";

#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
    keep: bool,
}

/// Create a new workspace under `base_dir`, which must be an existing directory.
pub fn acquire(base_dir: impl AsRef<Path>, keep_on_exit: bool) -> io::Result<Workspace> {
    let dir = tempfile::Builder::new()
        .prefix(WORKSPACE_PREFIX)
        .tempdir_in(base_dir.as_ref())?;
    let path = dir.path().to_path_buf();
    tracing::debug!(path = %path.display(), keep = keep_on_exit, "workspace acquired");
    Ok(Workspace {
        dir: Some(dir),
        path,
        keep: keep_on_exit,
    })
}

impl Workspace {
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn keeps_files(&self) -> bool {
        self.keep
    }

    /// Tear down now. Returns the directory path if it was kept, or the
    /// removal error; the caller decides how to report it.
    pub fn release(mut self) -> io::Result<Option<PathBuf>> {
        match self.dir.take() {
            Some(dir) if self.keep => Ok(Some(keep(dir))),
            Some(dir) => dir.close().map(|()| None),
            None => Ok(None),
        }
    }
}

fn keep(dir: TempDir) -> PathBuf {
    #[allow(deprecated)]
    let path = dir.into_path();
    tracing::info!(path = %path.display(), "keeping solver workspace");
    path
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        if self.keep {
            keep(dir);
        } else if let Err(err) = dir.close() {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to remove solver workspace"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn release_removes_directory_and_contents() {
        let base = tempfile::tempdir().unwrap();
        let ws = acquire(base.path(), false).unwrap();
        let path = ws.path().to_path_buf();
        assert!(path.starts_with(base.path()));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(WORKSPACE_PREFIX));
        fs::create_dir(path.join("nested")).unwrap();
        fs::write(path.join("nested/a.poi"), "DIM = 1\n").unwrap();
        assert_eq!(ws.release().unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn keep_on_exit_leaves_directory() {
        let base = tempfile::tempdir().unwrap();
        let ws = acquire(base.path(), true).unwrap();
        let path = ws.path().to_path_buf();
        fs::write(path.join("traf_tmp.poi"), "DIM = 1\n").unwrap();
        assert_eq!(ws.release().unwrap(), Some(path.clone()));
        assert!(path.join("traf_tmp.poi").exists());
    }

    #[test]
    fn early_return_still_cleans_up() {
        fn fails_inside(base: &Path) -> io::Result<PathBuf> {
            let ws = acquire(base, false)?;
            let path = ws.path().to_path_buf();
            fs::read_to_string(ws.path().join("missing"))?;
            Ok(path)
        }
        let base = tempfile::tempdir().unwrap();
        assert!(fails_inside(base.path()).is_err());
        assert_eq!(fs::read_dir(base.path()).unwrap().count(), 0);
    }

    #[test]
    fn release_reports_removal_failure() {
        let base = tempfile::tempdir().unwrap();
        let ws = acquire(base.path(), false).unwrap();
        fs::remove_dir(ws.path()).unwrap();
        let err = ws.release().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn acquisitions_are_distinct() {
        let base = tempfile::tempdir().unwrap();
        let a = acquire(base.path(), false).unwrap();
        let b = acquire(base.path(), false).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn base_must_be_a_directory() {
        let base = tempfile::tempdir().unwrap();
        let file = base.path().join("not_a_dir");
        fs::write(&file, "").unwrap();
        assert!(acquire(&file, false).is_err());
        assert!(acquire(base.path().join("missing"), false).is_err());
    }
}
