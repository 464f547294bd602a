use std::borrow::Cow;

/// Extracts a normalized extension label from a file name.
///
/// Returns the extension in lowercase with a leading dot (e.g., ".rs"),
/// or "(no ext)" for files without a valid extension.
///
/// An extension is considered valid if it:
/// - Is non-empty
/// - Is at most 10 characters long
/// - Does not contain '/'
pub fn extension_label(file_name: &str) -> Cow<'static, str> {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.len() <= 10 && !ext.contains('/') => {
            Cow::Owned(format!(".{}", ext.to_ascii_lowercase()))
        }
        _ => Cow::Borrowed("(no ext)"),
    }
}

/// First directory component of a path, or "." for root-level files
pub fn top_level_dir(path: &str) -> &str {
    match path.split_once('/') {
        Some((dir, rest)) if !dir.is_empty() && !rest.is_empty() => dir,
        _ => ".",
    }
}
