//! Path resolution and navigation over an [`ArchiveTree`].
//!
//! A [`PathResolver`] owns the session's current directory (the cursor) and
//! implements `ls`, `cd`, `pwd` and `tail` on top of [`PathResolver::resolve`].
//! All failures come back as [`ShellError::NotFound`]; the cursor is only
//! modified by a successful [`PathResolver::change_directory`].

use std::ptr;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::node::Node;
use super::path::{self, ROOT, SEPARATOR};
use super::tree::ArchiveTree;
use crate::error::{ShellError, ShellResult};

/// Number of lines `tail` prints when no count is given.
pub const DEFAULT_TAIL_LINES: i64 = 10;

/// How `..` is interpreted inside a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentResolution {
    /// `..` jumps to the parent of the cursor's path, wherever the walk is.
    /// At the root it does nothing. Matches the classic behaviour of the tool.
    #[default]
    Cursor,
    /// `..` steps back to the parent of the node reached so far.
    Walk,
}

/// Navigation state for one shell session.
#[derive(Debug, Clone)]
pub struct PathResolver {
    tree: Arc<ArchiveTree>,
    cursor: String,
    parent_resolution: ParentResolution,
}

impl PathResolver {
    /// Create a resolver positioned at the root.
    pub fn new(tree: Arc<ArchiveTree>) -> Self {
        Self {
            tree,
            cursor: ROOT.to_string(),
            parent_resolution: ParentResolution::default(),
        }
    }

    /// Select how `..` segments are resolved.
    pub fn with_parent_resolution(mut self, mode: ParentResolution) -> Self {
        self.parent_resolution = mode;
        self
    }

    pub fn tree(&self) -> &ArchiveTree {
        &self.tree
    }

    pub fn parent_resolution(&self) -> ParentResolution {
        self.parent_resolution
    }

    /// Resolve a path to a node.
    ///
    /// Absolute paths start at the root, relative paths at the cursor. An
    /// empty path resolves to the starting node. Nothing is created.
    pub fn resolve(&self, path: &str) -> ShellResult<&Node> {
        let resolved = match self.parent_resolution {
            ParentResolution::Cursor => self.resolve_with_cursor_parent(path),
            ParentResolution::Walk => self.resolve_with_walk_parent(path),
        };
        if resolved.is_none() {
            debug!(path, cursor = %self.cursor, "path did not resolve");
        }
        resolved.ok_or_else(|| ShellError::NotFound(path.to_string()))
    }

    fn resolve_with_cursor_parent(&self, path: &str) -> Option<&Node> {
        let root = self.tree.root();
        let mut current = if path::is_absolute(path) {
            root
        } else {
            self.tree.lookup(&self.cursor)?
        };

        for segment in path::segments(path) {
            match segment {
                "." => {}
                ".." => {
                    if !ptr::eq(current, root) {
                        current = self
                            .tree
                            .lookup(path::parent(&self.cursor))
                            .unwrap_or(root);
                    }
                }
                name => current = current.child(name)?,
            }
        }
        Some(current)
    }

    fn resolve_with_walk_parent(&self, path: &str) -> Option<&Node> {
        let mut stack = if path::is_absolute(path) {
            vec![self.tree.root()]
        } else {
            self.tree.ancestry(&self.cursor)?
        };

        for segment in path::segments(path) {
            let current = *stack.last()?;
            match segment {
                "." => {}
                ".." => {
                    if current.is_file() {
                        return None;
                    }
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                name => stack.push(current.child(name)?),
            }
        }
        stack.last().copied()
    }

    /// Sorted child names of a directory.
    pub fn list_directory(&self, path: &str) -> ShellResult<Vec<&str>> {
        let node = self.resolve(path)?;
        let children = node
            .children()
            .ok_or_else(|| ShellError::NotFound(path.to_string()))?;
        Ok(children.keys().map(String::as_str).collect())
    }

    /// Move the cursor to a directory.
    ///
    /// The new cursor is the normalized absolute form of the path. If the
    /// path does not resolve to a directory the cursor is left untouched.
    ///
    /// With [`ParentResolution::Cursor`] the normalized form can differ from
    /// the node `..` led to, and may name nothing. Relative paths then fail
    /// until the cursor is moved with an absolute path.
    pub fn change_directory(&mut self, path: &str) -> ShellResult<()> {
        let node = self.resolve(path)?;
        if !node.is_dir() {
            return Err(ShellError::NotFound(path.to_string()));
        }

        let joined = if path::is_absolute(path) {
            path::normalize(path)
        } else {
            path::normalize(&path::join(&self.cursor, path))
        };
        let target = if path::is_absolute(&joined) {
            joined
        } else {
            format!("{}{}", SEPARATOR, joined)
        };

        if !self.tree.lookup(&target).is_some_and(Node::is_dir) {
            debug!(path, target = %target, "cursor does not name a directory");
        }

        debug!(from = %self.cursor, to = %target, "changed directory");
        self.cursor = target;
        Ok(())
    }

    /// The cursor, verbatim.
    pub fn print_working_directory(&self) -> &str {
        &self.cursor
    }

    /// Last `line_count` lines of a file.
    ///
    /// A count of zero or less returns every line.
    pub fn tail(&self, path: &str, line_count: i64) -> ShellResult<Vec<&str>> {
        let content = self
            .resolve(path)?
            .content()
            .ok_or_else(|| ShellError::NotFound(path.to_string()))?;

        let lines = split_lines(content.as_text());
        let keep = usize::try_from(line_count)
            .ok()
            .filter(|&n| n > 0)
            .map_or(lines.len(), |n| n.min(lines.len()));
        Ok(lines[lines.len() - keep..].to_vec())
    }
}

/// Characters that end a line, besides `\r\n`.
const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Split text into lines. `\r\n` counts as one break. A trailing break does
/// not produce an empty final line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !LINE_BREAKS.contains(&c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                chars.next();
                start = next + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
