//! Node model for the archive tree.

use std::collections::BTreeMap;

/// Payload of a file node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// Payload decoded as UTF-8.
    Text(String),
    /// Payload that is not valid UTF-8. Displays as empty text.
    Binary(Vec<u8>),
}

impl FileContent {
    /// Decode raw bytes, keeping the bytes when they are not UTF-8.
    pub fn decode(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => FileContent::Text(text),
            Err(e) => FileContent::Binary(e.into_bytes()),
        }
    }

    /// Text form of the content; undecodable payloads are empty.
    pub fn as_text(&self) -> &str {
        match self {
            FileContent::Text(text) => text,
            FileContent::Binary(_) => "",
        }
    }

    /// Size of the payload in bytes.
    pub fn len(&self) -> usize {
        match self {
            FileContent::Text(text) => text.len(),
            FileContent::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, FileContent::Binary(_))
    }
}

impl Default for FileContent {
    fn default() -> Self {
        FileContent::Text(String::new())
    }
}

/// Directory or file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Children keyed by name, kept sorted.
    Directory(BTreeMap<String, Node>),
    File(FileContent),
}

/// One entry in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    kind: NodeKind,
}

impl Node {
    /// Create an empty directory.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory(BTreeMap::new()),
        }
    }

    /// Create a file with the given content.
    pub fn file(name: impl Into<String>, content: FileContent) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File(content),
        }
    }

    /// The node's own name (not a full path).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File(_))
    }

    /// Children of a directory, `None` for files.
    pub fn children(&self) -> Option<&BTreeMap<String, Node>> {
        match &self.kind {
            NodeKind::Directory(children) => Some(children),
            NodeKind::File(_) => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut BTreeMap<String, Node>> {
        match &mut self.kind {
            NodeKind::Directory(children) => Some(children),
            NodeKind::File(_) => None,
        }
    }

    /// Look up a direct child by name. Files have no children.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children().and_then(|children| children.get(name))
    }

    /// Content of a file, `None` for directories.
    pub fn content(&self) -> Option<&FileContent> {
        match &self.kind {
            NodeKind::File(content) => Some(content),
            NodeKind::Directory(_) => None,
        }
    }
}
