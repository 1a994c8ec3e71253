//! Read-only virtual filesystem built from an archive.
//!
//! The filesystem is split into:
//! - `ArchiveTree`: immutable node tree built once from archive members
//! - `PathResolver`: cursor-based path resolution and navigation
//! - `path`: lexical helpers shared by both

mod node;
pub mod path;
mod resolver;
mod tree;

pub use node::{FileContent, Node, NodeKind};
pub use resolver::{ParentResolution, PathResolver, DEFAULT_TAIL_LINES};
pub use tree::{ArchiveTree, TreeStats};
