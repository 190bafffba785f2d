//! Directory listing
//!
//! Enumerates the regular files directly inside the picture root.

use super::{PictureError, PictureRoot, Result};
use std::io;
use std::path::Path;
use tokio::fs::{self, DirEntry};

impl PictureRoot {
    /// List the names of regular files directly inside the root, sorted by name.
    ///
    /// Subdirectories are skipped, as are symlinks whose target is not a regular file
    /// inside the root. Names that are not valid UTF-8 cannot be requested over HTTP
    /// and are left out.
    pub async fn list_entries(&self) -> Result<Vec<String>> {
        let root = self.canonical().await?;

        let mut entries = fs::read_dir(&root).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => self.directory_not_found(),
            _ => PictureError::io(format!("reading directory '{}'", root.display()), e),
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PictureError::io(format!("reading directory '{}'", root.display()), e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                tracing::debug!(entry = ?entry.file_name(), "Skipping non UTF-8 file name");
                continue;
            };

            if is_picture_entry(&root, &entry).await {
                names.push(name);
            }
        }

        names.sort_unstable();
        Ok(names)
    }
}

async fn is_picture_entry(root: &Path, entry: &DirEntry) -> bool {
    let file_type = match entry.file_type().await {
        Ok(t) => t,
        Err(e) => {
            tracing::debug!(path = %entry.path().display(), error = %e, "Cannot read file type");
            return false;
        }
    };

    if file_type.is_file() {
        return true;
    }
    if !file_type.is_symlink() {
        return false;
    }

    // Symlinks count only when they point at a regular file that stays inside the root
    let Ok(target) = fs::canonicalize(entry.path()).await else {
        return false;
    };
    if !target.starts_with(root) {
        return false;
    }
    fs::metadata(&target).await.is_ok_and(|m| m.is_file())
}
