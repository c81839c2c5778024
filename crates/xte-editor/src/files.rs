//! File-name display
//!
//! A file input reports a platform path, possibly with the browser's
//! fakepath substitution. Only the trailing file name is shown to the user.

/// Trailing file-name component of a path as reported by a file input
pub fn display_file_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}
