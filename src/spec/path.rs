use std::path::Path;

use crate::error::{Error, Result};

fn invalid(path: &Path, reason: &'static str) -> Error {
    Error::Path {
        path: path.to_path_buf(),
        reason,
    }
}

/// Checks that `path` names a file that can be created or replaced.
pub(crate) fn check_writable(path: &Path) -> Result<()> {
    let text = path.as_os_str().to_string_lossy();
    if text.is_empty() {
        return Err(invalid(path, "path is empty"));
    }
    if text.ends_with(std::path::is_separator) || path.file_name().is_none() {
        return Err(invalid(path, "path does not name a file"));
    }
    if path.is_dir() {
        return Err(invalid(path, "path is a directory"));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.is_dir()
    {
        return Err(invalid(path, "parent directory does not exist"));
    }
    Ok(())
}

/// Checks that `path` names an existing regular file.
pub(crate) fn check_readable(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(invalid(path, "path is empty"));
    }
    if !path.is_file() {
        return Err(invalid(path, "file does not exist"));
    }
    Ok(())
}
