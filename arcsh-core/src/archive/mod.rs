//! Archive readers.
//!
//! Archives are read fully into memory and flattened into an ordered list of
//! [`ArchiveEntry`] values. Order is preserved: later entries for the same
//! path override earlier ones when the tree is built.
//!
//! Supported formats:
//! - ZIP (via the `zip` crate)
//! - tar (ustar, GNU long names, pax path records)
//! - gzip-compressed tar

mod tarball;
mod zipfile;

use std::io::Cursor;
use std::path::Path;

use tracing::debug;

use crate::error::{ShellError, ShellResult};

pub use tarball::read_tar;
pub use zipfile::read_zip;

/// Kind of an archive member, with the raw payload for files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File(Vec<u8>),
}

/// One member of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Member name as stored in the archive (e.g. `./dir1/file1.txt`).
    pub path: String,
    pub kind: EntryKind,
}

impl ArchiveEntry {
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
        }
    }

    pub fn file(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File(data.into()),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }
}

/// Container format detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveFormat {
    /// Detect the format of archive data.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"PK\x03\x04") || data.starts_with(b"PK\x05\x06") {
            Some(ArchiveFormat::Zip)
        } else if tarball::is_gzip(data) {
            Some(ArchiveFormat::TarGz)
        } else if tarball::looks_like_tar(data) {
            Some(ArchiveFormat::Tar)
        } else {
            None
        }
    }
}

/// Read all members of an archive held in memory.
pub fn read_archive(data: &[u8]) -> ShellResult<Vec<ArchiveEntry>> {
    let format = ArchiveFormat::detect(data)
        .ok_or_else(|| ShellError::InvalidArchive("unrecognized archive format".to_string()))?;
    debug!(?format, bytes = data.len(), "reading archive");

    match format {
        ArchiveFormat::Zip => read_zip(Cursor::new(data)),
        ArchiveFormat::Tar => read_tar(data),
        ArchiveFormat::TarGz => read_tar(&tarball::decompress_gzip(data)?),
    }
}

/// Read all members of an archive file.
pub fn load_archive_from_path(path: &Path) -> ShellResult<Vec<ArchiveEntry>> {
    let data = std::fs::read(path)?;
    read_archive(&data)
}
