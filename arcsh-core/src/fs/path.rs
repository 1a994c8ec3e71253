//! Lexical path helpers for the virtual filesystem.
//!
//! None of these functions touch the tree; they operate on strings only.

/// Path separator, also the name of the root directory.
pub const SEPARATOR: char = '/';

/// Absolute path of the root directory.
pub const ROOT: &str = "/";

/// Check whether a path starts at the root.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Split a path into its non-empty segments.
///
/// `.` and `..` are returned as-is; only empty segments (leading, trailing or
/// doubled separators) are dropped.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// Lexically normalize a path.
///
/// - Collapses repeated separators and removes `.` segments
/// - `..` removes the previous segment; above the root it is dropped for
///   absolute paths and kept for relative ones
/// - An empty relative result becomes `.`
///
/// # Examples
/// ```
/// use arcsh_core::fs::path::normalize;
/// assert_eq!(normalize("/a//b/./c/.."), "/a/b");
/// assert_eq!(normalize("/.."), "/");
/// assert_eq!(normalize("a/../.."), "..");
/// assert_eq!(normalize(""), ".");
/// ```
pub fn normalize(path: &str) -> String {
    let absolute = is_absolute(path);
    let mut stack: Vec<&str> = Vec::new();

    for segment in segments(path) {
        match segment {
            "." => {}
            ".." => {
                if stack.last().is_some_and(|last| *last != "..") {
                    stack.pop();
                } else if !absolute {
                    stack.push("..");
                }
            }
            name => stack.push(name),
        }
    }

    let joined = stack.join("/");
    if absolute {
        format!("{}{}", SEPARATOR, joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Join `path` onto `base`. An absolute `path` replaces `base` entirely.
pub fn join(base: &str, path: &str) -> String {
    if is_absolute(path) || base.is_empty() {
        path.to_string()
    } else if base.ends_with(SEPARATOR) {
        format!("{}{}", base, path)
    } else {
        format!("{}{}{}", base, SEPARATOR, path)
    }
}

/// Directory portion of a path (everything before the last separator).
///
/// # Examples
/// ```
/// use arcsh_core::fs::path::parent;
/// assert_eq!(parent("/a/b"), "/a");
/// assert_eq!(parent("/a"), "/");
/// assert_eq!(parent("/"), "/");
/// assert_eq!(parent("name"), "");
/// ```
pub fn parent(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(pos) => {
            let head = &path[..=pos];
            let trimmed = head.trim_end_matches(SEPARATOR);
            if trimmed.is_empty() {
                head
            } else {
                trimmed
            }
        }
        None => "",
    }
}

/// Normalize an archive member name into the segments of its location
/// below the root. `..` never climbs above the root.
pub fn entry_segments(name: &str) -> Vec<&str> {
    let mut stack = Vec::new();
    for segment in segments(name) {
        match segment {
            "." => {}
            ".." => {
                stack.pop();
            }
            name => stack.push(name),
        }
    }
    stack
}
