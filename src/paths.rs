use crate::error::{Error, Result};

/// Normalize a repository path: strip leading/trailing slashes, collapse
/// repeated slashes and `.` segments, reject `..`.
///
/// An empty input (or one made only of slashes) returns an empty string,
/// which names the repository root.
///
/// # Errors
/// Returns [`Error::InvalidPath`] for `..` segments or paths that collapse
/// to nothing without being a root spelling.
pub fn normalize_path(path: &str) -> Result<String> {
    if is_root_path(path) {
        return Ok(String::new());
    }

    let mut segments = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                return Err(Error::invalid_path(format!(
                    "'..' not allowed in '{}'",
                    path
                )))
            }
            _ => segments.push(seg),
        }
    }

    if segments.is_empty() {
        // e.g. "." or "./." — content that collapsed away entirely
        return Err(Error::invalid_path(format!("'{}' names no entry", path)));
    }

    Ok(segments.join("/"))
}

/// Returns `true` when the path names the repository root (empty string or
/// only slashes).
pub fn is_root_path(path: &str) -> bool {
    path.bytes().all(|b| b == b'/')
}

/// Split a normalized path into its segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Append a child segment to a directory path. The root is spelled `"/"`.
pub fn join(dir: &str, name: &str) -> String {
    if is_root_path(dir) {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Validate a branch name per git's `check-ref-format` rules (the subset a
/// hosting API will accept): no whitespace, control, or glob characters,
/// no `..` or `@{`, no trailing `.` or `.lock`.
///
/// # Errors
/// Returns [`Error::InvalidRefName`] if the name violates any rule.
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_ref_name("ref name must not be empty"));
    }

    if let Some(ch) = name
        .chars()
        .find(|c| matches!(c, ':' | ' ' | '\t' | '\n' | '\r' | '\\' | '^' | '~' | '?' | '*' | '['))
    {
        return Err(Error::invalid_ref_name(format!(
            "ref name contains invalid character: {:?}",
            ch
        )));
    }

    if name.contains("..") {
        return Err(Error::invalid_ref_name("ref name must not contain '..'"));
    }
    if name.contains("@{") {
        return Err(Error::invalid_ref_name("ref name must not contain '@{'"));
    }
    if name.ends_with('.') {
        return Err(Error::invalid_ref_name("ref name must not end with '.'"));
    }
    if name.ends_with(".lock") {
        return Err(Error::invalid_ref_name(
            "ref name must not end with '.lock'",
        ));
    }

    Ok(())
}
