//! ZIP archive reader.

use std::io::{Read, Seek};

use tracing::debug;
use zip::ZipArchive;

use super::ArchiveEntry;
use crate::error::ShellResult;

/// Read every member of a ZIP archive, in central directory order.
pub fn read_zip<R: Read + Seek>(reader: R) -> ShellResult<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(reader)?;
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();

        if file.is_dir() {
            debug!(name = %name, "zip directory");
            entries.push(ArchiveEntry::directory(name));
            continue;
        }

        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        debug!(name = %name, size = content.len(), "zip file");
        entries.push(ArchiveEntry::file(name, content));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::EntryKind;
    use std::io::{Cursor, Write};

    fn create_test_zip() -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);

            zip.add_directory::<_, ()>("dir1/", Default::default())
                .unwrap();

            zip.start_file::<_, ()>("dir1/file1.txt", Default::default())
                .unwrap();
            zip.write_all(b"Line 1\nLine 2").unwrap();

            zip.start_file::<_, ()>("blob.bin", Default::default())
                .unwrap();
            zip.write_all(b"\xC3\x00\xFF").unwrap();

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_zip_preserves_order_and_kinds() {
        let entries = read_zip(Cursor::new(create_test_zip())).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].path, "dir1/");
        assert!(entries[0].is_dir());
        assert_eq!(entries[1].path, "dir1/file1.txt");
        assert_eq!(entries[1].kind, EntryKind::File(b"Line 1\nLine 2".to_vec()));
        assert_eq!(entries[2].kind, EntryKind::File(vec![0xC3, 0x00, 0xFF]));
    }

    #[test]
    fn test_read_zip_ignores_declared_size() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip.start_file::<_, ()>("big.txt", options).unwrap();
            zip.write_all(b"small").unwrap();
            zip.finish().unwrap();
        }

        // claim a ~4 GiB uncompressed size in the central directory
        let central = buf
            .windows(4)
            .rposition(|w| w == b"PK\x01\x02")
            .unwrap();
        buf[central + 24..central + 28].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());

        if let Ok(entries) = read_zip(Cursor::new(buf)) {
            assert_eq!(entries[0].kind, EntryKind::File(b"small".to_vec()));
        }
    }

    #[test]
    fn test_read_zip_invalid() {
        assert!(read_zip(Cursor::new(b"PK\x03\x04 truncated".to_vec())).is_err());
    }
}
