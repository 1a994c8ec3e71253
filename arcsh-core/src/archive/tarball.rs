//! tar archive reader, with optional gzip compression.

use std::io::Read;

use flate2::read::GzDecoder;
use tracing::{debug, warn};

use super::ArchiveEntry;
use crate::error::{ShellError, ShellResult};

const BLOCK_SIZE: usize = 512;

/// Read a null-terminated string from a fixed-size field.
fn read_string(header: &[u8], offset: usize, len: usize) -> String {
    let slice = &header[offset..offset + len];
    let end = slice.iter().position(|&b| b == 0).unwrap_or(len);
    String::from_utf8_lossy(&slice[..end]).to_string()
}

/// Read a numeric field: octal ASCII, or GNU base-256 when the high bit is set.
fn read_number(header: &[u8], offset: usize, len: usize) -> u64 {
    let field = &header[offset..offset + len];
    if field[0] & 0x80 != 0 {
        return field[1..]
            .iter()
            .fold(u64::from(field[0] & 0x7f), |acc, &b| (acc << 8) | u64::from(b));
    }
    let s = read_string(header, offset, len);
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0;
    }
    u64::from_str_radix(trimmed, 8).unwrap_or(0)
}

/// Check if a 512-byte block is all zeros (end-of-archive marker).
fn is_zero_block(block: &[u8]) -> bool {
    block.iter().all(|&b| b == 0)
}

/// Sum of all header bytes, treating the checksum field (148..156) as spaces.
fn calculate_checksum(header: &[u8]) -> u64 {
    header
        .iter()
        .enumerate()
        .map(|(i, &byte)| {
            if (148..156).contains(&i) {
                0x20
            } else {
                u64::from(byte)
            }
        })
        .sum()
}

fn verify_checksum(header: &[u8]) -> bool {
    read_number(header, 148, 8) == calculate_checksum(header)
}

/// Heuristic check for uncompressed tar data.
pub(crate) fn looks_like_tar(data: &[u8]) -> bool {
    if data.len() < BLOCK_SIZE {
        return false;
    }
    let header = &data[..BLOCK_SIZE];
    if is_zero_block(header) {
        // Empty archive: nothing but end-of-archive blocks
        return data.len() >= 2 * BLOCK_SIZE && is_zero_block(&data[..2 * BLOCK_SIZE]);
    }
    &header[257..262] == b"ustar" || verify_checksum(header)
}

/// Check if data is gzip compressed (magic bytes 0x1f 0x8b).
pub(crate) fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

/// Decompress gzip data.
pub(crate) fn decompress_gzip(data: &[u8]) -> ShellResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

/// Extract the `path` record from a pax extended header.
///
/// Records have the form `<len> <key>=<value>\n`.
fn pax_path(mut data: &[u8]) -> Option<String> {
    let mut path = None;
    while !data.is_empty() {
        let space = data.iter().position(|&b| b == b' ')?;
        let len: usize = std::str::from_utf8(&data[..space]).ok()?.parse().ok()?;
        if len <= space || len > data.len() {
            return path;
        }
        let record = &data[space + 1..len];
        let record = record.strip_suffix(b"\n").unwrap_or(record);
        if let Some(value) = record.strip_prefix(b"path=") {
            path = Some(String::from_utf8_lossy(value).into_owned());
        }
        data = &data[len..];
    }
    path
}

/// Parse an uncompressed tar archive into entries.
///
/// Regular files and directories are returned. GNU long names (`L`) and pax
/// `path` records (`x`) rename the entry that follows them; other member
/// types (links, devices, global headers) are skipped.
pub fn read_tar(data: &[u8]) -> ShellResult<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    let mut offset = 0;
    let mut zero_blocks = 0;
    let mut pending_name: Option<String> = None;

    while offset + BLOCK_SIZE <= data.len() {
        let header = &data[offset..offset + BLOCK_SIZE];

        if is_zero_block(header) {
            zero_blocks += 1;
            offset += BLOCK_SIZE;
            if zero_blocks >= 2 {
                break;
            }
            continue;
        }
        zero_blocks = 0;

        if !verify_checksum(header) {
            return Err(ShellError::InvalidArchive(format!(
                "tar: invalid header checksum at offset {}",
                offset
            )));
        }

        let name = read_string(header, 0, 100);
        let prefix = if &header[257..262] == b"ustar" {
            read_string(header, 345, 155)
        } else {
            String::new()
        };
        let size = read_number(header, 124, 12) as usize;
        let type_flag = header[156];

        offset += BLOCK_SIZE;
        let end = offset
            .checked_add(size)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                ShellError::InvalidArchive("tar: unexpected end of archive".to_string())
            })?;
        let payload = &data[offset..end];
        offset += size.div_ceil(BLOCK_SIZE) * BLOCK_SIZE;

        let header_path = if prefix.is_empty() {
            name
        } else {
            format!("{}/{}", prefix, name)
        };

        match type_flag {
            b'L' => {
                let long = read_string(payload, 0, payload.len());
                pending_name = Some(long);
            }
            b'x' => {
                if let Some(path) = pax_path(payload) {
                    pending_name = Some(path);
                }
            }
            b'0' | 0 | b'7' | b'5' => {
                let path = pending_name.take().unwrap_or(header_path);
                if type_flag == b'5' {
                    debug!(name = %path, "tar directory");
                    entries.push(ArchiveEntry::directory(path));
                } else {
                    debug!(name = %path, size, "tar file");
                    entries.push(ArchiveEntry::file(path, payload.to_vec()));
                }
            }
            other => {
                let path = pending_name.take().unwrap_or(header_path);
                warn!(
                    name = %path,
                    type_flag = %char::from(other),
                    "skipping unsupported tar member"
                );
            }
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::EntryKind;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn write_octal(header: &mut [u8], offset: usize, len: usize, value: u64) {
        let s = format!("{:0>width$o}", value, width = len - 1);
        header[offset..offset + len - 1].copy_from_slice(s.as_bytes());
    }

    fn header(name: &str, type_flag: u8, size: usize) -> [u8; BLOCK_SIZE] {
        let mut header = [0u8; BLOCK_SIZE];
        let bytes = name.as_bytes();
        let len = bytes.len().min(100);
        header[..len].copy_from_slice(&bytes[..len]);
        write_octal(&mut header, 100, 8, 0o644);
        write_octal(&mut header, 124, 12, size as u64);
        header[156] = type_flag;
        header[257..263].copy_from_slice(b"ustar\0");
        header[263..265].copy_from_slice(b"00");
        let checksum = calculate_checksum(&header);
        let s = format!("{:06o}\0 ", checksum);
        header[148..156].copy_from_slice(s.as_bytes());
        header
    }

    fn push_member(out: &mut Vec<u8>, name: &str, type_flag: u8, payload: &[u8]) {
        out.extend_from_slice(&header(name, type_flag, payload.len()));
        out.extend_from_slice(payload);
        let padding = (BLOCK_SIZE - payload.len() % BLOCK_SIZE) % BLOCK_SIZE;
        out.extend(std::iter::repeat(0u8).take(padding));
    }

    fn finish(mut out: Vec<u8>) -> Vec<u8> {
        out.extend(std::iter::repeat(0u8).take(2 * BLOCK_SIZE));
        out
    }

    #[test]
    fn test_read_files_and_directories() {
        let mut tar = Vec::new();
        push_member(&mut tar, "./", b'5', b"");
        push_member(&mut tar, "./dir1/", b'5', b"");
        push_member(&mut tar, "./dir1/file1.txt", b'0', b"Line 1\nLine 2\n");
        let tar = finish(tar);

        assert!(looks_like_tar(&tar));
        let entries = read_tar(&tar).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], ArchiveEntry::directory("./"));
        assert_eq!(entries[1], ArchiveEntry::directory("./dir1/"));
        assert_eq!(
            entries[2].kind,
            EntryKind::File(b"Line 1\nLine 2\n".to_vec())
        );
    }

    #[test]
    fn test_gnu_long_name() {
        let long_name = format!("{}/deep.txt", "d".repeat(120));
        let mut tar = Vec::new();
        let mut payload = long_name.as_bytes().to_vec();
        payload.push(0);
        push_member(&mut tar, "././@LongLink", b'L', &payload);
        push_member(&mut tar, "truncated", b'0', b"deep");
        let entries = read_tar(&finish(tar)).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, long_name);
    }

    #[test]
    fn test_pax_path_record() {
        let record = "path=very/long/name.txt\n";
        let len = record.len() + 3; // "NN " prefix
        let pax = format!("{} {}", len, record);
        assert_eq!(pax.len(), len);

        let mut tar = Vec::new();
        push_member(&mut tar, "PaxHeaders/name", b'x', pax.as_bytes());
        push_member(&mut tar, "name.txt", b'0', b"x");
        let entries = read_tar(&finish(tar)).unwrap();

        assert_eq!(entries[0].path, "very/long/name.txt");
    }

    #[test]
    fn test_symlinks_are_skipped() {
        let mut tar = Vec::new();
        push_member(&mut tar, "link", b'2', b"");
        push_member(&mut tar, "real.txt", b'0', b"data");
        let entries = read_tar(&finish(tar)).unwrap();

        assert_eq!(entries, vec![ArchiveEntry::file("real.txt", b"data".to_vec())]);
    }

    #[test]
    fn test_bad_checksum() {
        let mut tar = Vec::new();
        push_member(&mut tar, "a.txt", b'0', b"abc");
        tar[0] = b'b';
        assert!(matches!(
            read_tar(&finish(tar)),
            Err(ShellError::InvalidArchive(_))
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let mut tar = Vec::new();
        tar.extend_from_slice(&header("big.txt", b'0', 4096));
        tar.extend_from_slice(&[b'x'; 100]);
        assert!(read_tar(&tar).is_err());
    }

    #[test]
    fn test_gzip_round_trip() {
        let mut tar = Vec::new();
        push_member(&mut tar, "a.txt", b'0', b"hello");
        let tar = finish(tar);

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar).unwrap();
        let gz = encoder.finish().unwrap();

        assert!(is_gzip(&gz));
        assert_eq!(decompress_gzip(&gz).unwrap(), tar);
    }

    #[test]
    fn test_empty_archive() {
        let tar = finish(Vec::new());
        assert!(looks_like_tar(&tar));
        assert!(read_tar(&tar).unwrap().is_empty());
    }
}
