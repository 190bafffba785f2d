//! Picture library module
//!
//! Owns the root directory pictures are served from and the two operations on it:
//! listing the regular files directly inside the root, and resolving a client-supplied
//! name to a file that is guaranteed to live inside the root.

mod error;
mod lister;
mod resolver;

pub use error::PictureError;
pub use resolver::Picture;

use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, PictureError>;

/// The directory all pictures are served from.
///
/// Built once at startup and never mutated. The path is stored as configured; it is
/// canonicalized on every request so a directory created after startup is picked up.
#[derive(Debug, Clone)]
pub struct PictureRoot {
    path: PathBuf,
}

impl PictureRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Canonical form of the root, or `DirectoryNotFound` if it is missing or not a directory.
    async fn canonical(&self) -> Result<PathBuf> {
        let canonical = tokio::fs::canonicalize(&self.path)
            .await
            .map_err(|_| self.directory_not_found())?;

        match tokio::fs::metadata(&canonical).await {
            Ok(meta) if meta.is_dir() => Ok(canonical),
            _ => Err(self.directory_not_found()),
        }
    }

    fn directory_not_found(&self) -> PictureError {
        PictureError::DirectoryNotFound {
            path: self.path.clone(),
        }
    }
}
