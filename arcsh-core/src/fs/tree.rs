//! Archive tree construction.

use tracing::{debug, info, warn};

use super::node::{FileContent, Node, NodeKind};
use super::path::{self, ROOT};
use crate::archive::{ArchiveEntry, EntryKind};

/// Counts gathered from a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Directories, not counting the root.
    pub directories: usize,
    pub files: usize,
    /// Files whose payload is not valid UTF-8.
    pub binary_files: usize,
    pub total_bytes: usize,
}

/// Immutable directory tree built from archive members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTree {
    root: Node,
}

impl Default for ArchiveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveTree {
    /// Create a tree containing only the root directory.
    pub fn new() -> Self {
        Self {
            root: Node::directory(ROOT),
        }
    }

    /// Build a tree from archive members, in archive order.
    ///
    /// Later members at the same path override earlier ones. Missing
    /// intermediate directories are created on demand.
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ArchiveEntry>,
    {
        let mut tree = Self::new();
        for entry in entries {
            tree.insert(entry);
        }
        let stats = tree.stats();
        info!(
            directories = stats.directories,
            files = stats.files,
            binary_files = stats.binary_files,
            bytes = stats.total_bytes,
            "archive tree built"
        );
        tree
    }

    fn insert(&mut self, entry: ArchiveEntry) {
        let ArchiveEntry { path: name, kind } = entry;
        let segments = path::entry_segments(&name);
        let Some((leaf, parents)) = segments.split_last() else {
            debug!(name = %name, "skipping entry without a name");
            return;
        };

        let mut current = &mut self.root;
        for segment in parents {
            let Some(children) = current.children_mut() else {
                return;
            };
            let child = children
                .entry(segment.to_string())
                .or_insert_with(|| Node::directory(*segment));
            if !child.is_dir() {
                debug!(name = %name, segment = *segment, "replacing file with implied directory");
                *child = Node::directory(*segment);
            }
            current = child;
        }
        let Some(children) = current.children_mut() else {
            return;
        };

        match kind {
            EntryKind::Directory => {
                if let Some(previous) = children.insert(leaf.to_string(), Node::directory(*leaf)) {
                    debug!(name = %name, replaced_dir = previous.is_dir(), "overwrote entry");
                }
            }
            EntryKind::File(bytes) => {
                let content = FileContent::decode(bytes);
                if content.is_binary() {
                    warn!(name = %name, "file is not valid UTF-8, treating as empty");
                }
                if let Some(previous) = children.insert(leaf.to_string(), Node::file(*leaf, content))
                {
                    debug!(name = %name, replaced_dir = previous.is_dir(), "overwrote entry");
                }
            }
        }
    }

    /// The root directory.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Walk an absolute, already normalized path from the root.
    ///
    /// `.` and empty segments are skipped. `..` is not interpreted and fails
    /// the lookup like any other missing name.
    pub fn lookup(&self, absolute: &str) -> Option<&Node> {
        path::segments(absolute)
            .filter(|s| *s != ".")
            .try_fold(&self.root, |node, segment| node.child(segment))
    }

    /// Nodes along an absolute path, starting with the root.
    pub fn ancestry(&self, absolute: &str) -> Option<Vec<&Node>> {
        let mut chain = vec![&self.root];
        for segment in path::segments(absolute).filter(|s| *s != ".") {
            let next = chain.last()?.child(segment)?;
            chain.push(next);
        }
        Some(chain)
    }

    /// Count directories, files and bytes.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut pending = vec![&self.root];
        while let Some(node) = pending.pop() {
            match node.kind() {
                NodeKind::Directory(children) => {
                    stats.directories += children.values().filter(|c| c.is_dir()).count();
                    pending.extend(children.values());
                }
                NodeKind::File(content) => {
                    stats.files += 1;
                    stats.total_bytes += content.len();
                    if content.is_binary() {
                        stats.binary_files += 1;
                    }
                }
            }
        }
        stats
    }
}
