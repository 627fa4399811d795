//! Sandbox check for content files requested by the dashboard.
//!
//! A path is served only if it is a relative `.md` path inside one of the
//! project's content folders and still lies under the project root once
//! symlinks are resolved.

use std::path::{Path, PathBuf};

use crate::errors::{ControlError, GuardError};
use crate::project::CONTENT_FOLDERS;

pub const CONTENT_EXTENSION: &str = "md";

/// Validate `rel` textually, without touching the file system.
pub fn check_relative(rel: &str) -> Result<(), GuardError> {
    if rel.is_empty() {
        return Err(GuardError::Empty);
    }
    if rel.starts_with('/') || rel.starts_with('.') {
        return Err(GuardError::NotRelative(rel.to_string()));
    }
    if rel.contains('\\') || rel.split('/').any(|segment| segment == "..") {
        return Err(GuardError::Traversal(rel.to_string()));
    }
    let has_extension = Path::new(rel)
        .extension()
        .is_some_and(|ext| ext == CONTENT_EXTENSION);
    if !has_extension {
        return Err(GuardError::WrongExtension {
            path: rel.to_string(),
            expected: CONTENT_EXTENSION,
        });
    }
    let in_content_folder = CONTENT_FOLDERS
        .iter()
        .any(|folder| rel.starts_with(&format!("{}/", folder)));
    if !in_content_folder {
        return Err(GuardError::OutsideContentFolders(rel.to_string()));
    }
    Ok(())
}

/// Resolve `rel` against `root` and return the canonical path of an
/// existing plain file inside it.
pub fn resolve(root: &Path, rel: &str) -> Result<PathBuf, ControlError> {
    check_relative(rel)?;

    let not_found = || ControlError::ContentNotFound {
        path: rel.to_string(),
    };
    let escapes = || ControlError::from(GuardError::EscapesRoot(rel.to_string()));
    let root = root.canonicalize()?;
    let candidate = root.join(rel);
    let resolved = match candidate.canonicalize() {
        Ok(resolved) => resolved,
        Err(_) if escapes_when_missing(&root, &candidate) => return Err(escapes()),
        Err(_) => return Err(not_found()),
    };
    if !resolved.starts_with(&root) {
        return Err(escapes());
    }
    if !resolved.is_file() {
        return Err(not_found());
    }
    Ok(resolved)
}

/// Whether an unresolvable `candidate` would have led outside `root`.
///
/// The nearest ancestor that resolves decides; an unresolvable symlink on
/// the way counts as outside. A missing file behind an outside link is
/// therefore rejected exactly like an existing one.
fn escapes_when_missing(root: &Path, candidate: &Path) -> bool {
    for ancestor in candidate.ancestors() {
        if ancestor == root {
            return false;
        }
        if let Ok(resolved) = ancestor.canonicalize() {
            return !resolved.starts_with(root);
        }
        let is_link = ancestor
            .symlink_metadata()
            .is_ok_and(|meta| meta.file_type().is_symlink());
        if is_link {
            return true;
        }
    }
    false
}

/// Read a validated content file. The bytes are returned unchanged; files
/// that are not valid UTF-8 are refused rather than altered.
pub fn read_content(root: &Path, rel: &str) -> Result<String, ControlError> {
    let path = resolve(root, rel)?;
    let bytes = std::fs::read(&path)?;
    String::from_utf8(bytes).map_err(|_| ControlError::ContentNotText {
        path: rel.to_string(),
    })
}
