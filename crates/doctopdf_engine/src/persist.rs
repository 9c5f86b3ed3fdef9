use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0:?} exists but is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to {action} {path:?}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_error<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> PersistError + 'a {
    move |source| PersistError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

/// A directory of whole-file blobs, one per name.
///
/// The directory is created on the first write. Replacing a blob goes through a
/// temp file in the same directory, so a reader sees the old or the new content.
#[derive(Debug, Clone)]
pub struct BlobDir {
    root: PathBuf,
}

impl BlobDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn blob_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// `Ok(None)` when the blob was never written or has been discarded.
    pub fn read(&self, name: &str) -> Result<Option<String>, PersistError> {
        let path = self.blob_path(name);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error("read", &path)(err)),
        }
    }

    pub fn replace(&self, name: &str, content: &str) -> Result<PathBuf, PersistError> {
        self.prepare()?;
        let target = self.blob_path(name);
        let mut staged =
            NamedTempFile::new_in(&self.root).map_err(io_error("stage", &self.root))?;
        staged
            .write_all(content.as_bytes())
            .and_then(|()| staged.as_file_mut().sync_all())
            .map_err(io_error("write", staged.path()))?;
        staged
            .persist(&target)
            .map_err(|err| io_error("replace", &target)(err.error))?;
        Ok(target)
    }

    /// Missing blobs count as discarded.
    pub fn discard(&self, name: &str) -> Result<(), PersistError> {
        let path = self.blob_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error("remove", &path)(err)),
        }
    }

    fn prepare(&self) -> Result<(), PersistError> {
        match fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(PersistError::NotADirectory(self.root.clone())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.root).map_err(io_error("create", &self.root))
            }
            Err(err) => Err(io_error("inspect", &self.root)(err)),
        }
    }
}
