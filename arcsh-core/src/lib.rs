//! Archive Shell Core
//!
//! This crate provides the core components for browsing an archive as a
//! read-only filesystem from a shell:
//! - Archive reading (tar, tar.gz, ZIP) into ordered entries
//! - An immutable directory tree built from those entries
//! - Path resolution with a current-directory cursor
//! - Command dispatch for `ls`, `cd`, `pwd`, `tail` and `exit`
//!
//! # Architecture
//!
//! The shell uses a layered design:
//! - `ArchiveEntry`: one archive member, in archive order
//! - `ArchiveTree`: node tree built once from the entries
//! - `PathResolver`: owns the cursor, resolves paths, implements navigation
//! - `ShellConsole` trait: line output abstraction
//! - `Shell`: integrates the resolver with command parsing and output

pub mod archive;
pub mod config;
pub mod console;
pub mod error;
pub mod fs;
pub mod shell;

pub use archive::{load_archive_from_path, read_archive, ArchiveEntry, ArchiveFormat, EntryKind};
pub use config::ShellConfig;
pub use console::{HeadlessConsole, ShellConsole};
pub use error::{ShellError, ShellResult};
pub use fs::{
    ArchiveTree, FileContent, Node, NodeKind, ParentResolution, PathResolver, TreeStats,
    DEFAULT_TAIL_LINES,
};
pub use shell::{parse_tail_args, Builtin, Dispatch, Shell};
