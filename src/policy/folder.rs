//! Folder path helpers and the name-folder ownership rule.
//!
//! Uploader-restricted callers may only touch paths that live under the
//! top-level folder carrying their own username.

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim()
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
}

/// First segment of a folder path, ignoring leading and repeated slashes.
#[must_use]
pub fn first_segment(path: &str) -> Option<&str> {
    segments(path).next()
}

/// Splits `a/b/c` into the relative path `a/b` and the folder name `c`.
#[must_use]
pub fn split_folder_path(path: &str) -> (String, String) {
    let parts: Vec<&str> = segments(path).collect();
    match parts.split_last() {
        Some((name, parents)) => (parents.join("/"), (*name).to_string()),
        None => (String::new(), String::new()),
    }
}

/// True when `path` lies inside the uploader's name-folder.
#[must_use]
pub fn owns_path(uploader: &str, path: &str) -> bool {
    first_segment(path) == Some(uploader)
}

/// Ownership check for a folder identified by name plus relative path:
/// with no relative path the folder itself must be the name-folder,
/// otherwise the relative path must start with it.
#[must_use]
pub fn owns_folder(uploader: &str, folder_name: &str, relative_path: &str) -> bool {
    if first_segment(relative_path).is_none() {
        folder_name.trim_matches('/') == uploader
    } else {
        owns_path(uploader, relative_path)
    }
}
