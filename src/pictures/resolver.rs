//! Picture resolution
//!
//! Turns an untrusted, client-supplied name into a file inside the picture root.
//! Containment is decided on canonical paths (symlinks and `..` resolved) and compared
//! component-wise, so neither traversal segments nor symlinks can leave the root.

use super::{PictureError, PictureRoot, Result};
use crate::http::mime;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

/// A picture read from disk, ready to be sent.
#[derive(Debug)]
pub struct Picture {
    /// Canonical path of the file
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub content_type: &'static str,
    /// Last modification time, when the platform reports one
    pub modified: Option<SystemTime>,
}

impl PictureRoot {
    /// Resolve `name` to the canonical path of a regular file inside the root.
    ///
    /// Nested names such as `thumbs/cat.jpg` are accepted as long as they stay inside
    /// the root.
    ///
    /// # Errors
    ///
    /// * `Forbidden` - the name climbs above the root, is absolute, or its canonical
    ///   form (after following symlinks) lies outside the root. For a missing name the
    ///   deepest existing part of the path decides, so missing and existing files behind
    ///   an escaping symlink both get `Forbidden`
    /// * `NotFound` - the name is contained but missing, or is not a regular file
    /// * `DirectoryNotFound` - the root itself is missing
    pub async fn resolve(&self, name: &str) -> Result<PathBuf> {
        // Rejected before touching the filesystem
        if escapes_root(name) {
            return Err(PictureError::forbidden(name));
        }

        let root = self.canonical().await?;
        let candidate = root.join(name);

        let canonical = match fs::canonicalize(&candidate).await {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(PictureError::io(
                    format!("resolving '{}'", candidate.display()),
                    e,
                ));
            }
            Err(_) => {
                // Missing names are judged by their deepest existing ancestor
                return match existing_ancestor(&candidate).await {
                    Some(ancestor) if !ancestor.starts_with(&root) => {
                        Err(PictureError::forbidden(name))
                    }
                    _ => Err(PictureError::not_found(name)),
                };
            }
        };

        if !canonical.starts_with(&root) {
            return Err(PictureError::forbidden(name));
        }

        match fs::metadata(&canonical).await {
            Ok(meta) if meta.is_file() => Ok(canonical),
            Ok(_) => Err(PictureError::not_found(name)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PictureError::not_found(name)),
            Err(e) => Err(PictureError::io(
                format!("reading metadata of '{}'", canonical.display()),
                e,
            )),
        }
    }

    /// Resolve `name` and read the file it points at.
    pub async fn open(&self, name: &str) -> Result<Picture> {
        let path = self.resolve(name).await?;

        let content = fs::read(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PictureError::not_found(name),
            _ => PictureError::io(format!("reading '{}'", path.display()), e),
        })?;

        let modified = fs::metadata(&path)
            .await
            .ok()
            .and_then(|meta| meta.modified().ok());

        let content_type = content_type_for(&path);

        Ok(Picture {
            path,
            content,
            content_type,
            modified,
        })
    }
}

/// Whether `name` leaves the root on its own, before any symlink is followed.
fn escapes_root(name: &str) -> bool {
    let mut depth = 0usize;
    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return true;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return true,
        }
    }
    false
}

/// Upper bound on symlinks followed while looking for an existing ancestor
const MAX_SYMLINK_HOPS: usize = 40;

/// Canonical form of the deepest part of `path` that exists.
///
/// Dangling symlinks are followed to their target first, so a link to a missing file
/// outside the root resolves to a directory outside the root. `None` on symlink loops.
async fn existing_ancestor(path: &Path) -> Option<PathBuf> {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_SYMLINK_HOPS {
        if let Ok(canonical) = fs::canonicalize(&current).await {
            return Some(canonical);
        }

        let is_symlink = fs::symlink_metadata(&current)
            .await
            .is_ok_and(|meta| meta.file_type().is_symlink());
        let parent = current.parent()?;
        current = if is_symlink {
            // Absolute targets replace the parent on join
            parent.join(fs::read_link(&current).await.ok()?)
        } else {
            parent.to_path_buf()
        };
    }
    None
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    mime::get_content_type(extension.as_deref())
}
