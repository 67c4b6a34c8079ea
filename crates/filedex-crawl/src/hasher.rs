//! Streaming file content hashing with skip policies.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use blake3::Hasher;

use filedex_core::{ContentHash, FileEntry, IndexConfig};

/// Fixed read block size for streaming hashes.
pub const HASH_BLOCK_SIZE: usize = 64 * 1024;

/// Why a file's hash was not computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashSkip {
    /// File content is not locally resident (cloud placeholder).
    Placeholder,
    /// File exceeds the configured hash ceiling.
    Oversized,
}

/// Outcome of hashing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashOutcome {
    /// File was fully read and hashed.
    Hashed(ContentHash),
    /// Hashing was skipped by policy; only size is recorded.
    Skipped(HashSkip),
}

/// Build a [`FileEntry`] for `path` from already-fetched metadata.
///
/// Skip policies are evaluated before any content read: placeholder
/// files and files above the ceiling get a size-only entry. A read
/// failure mid-stream is returned as `Err`; the caller records a
/// warning and falls back to a size-only entry, never aborting the
/// enclosing crawl.
pub fn hash_file(
    path: &Path,
    metadata: &std::fs::Metadata,
    config: &IndexConfig,
) -> Result<(FileEntry, HashOutcome), std::io::Error> {
    let size = metadata.len();

    if config.skip_placeholders && is_placeholder(metadata) {
        return Ok((
            FileEntry::size_only(size),
            HashOutcome::Skipped(HashSkip::Placeholder),
        ));
    }
    if size > config.hash_ceiling {
        return Ok((
            FileEntry::size_only(size),
            HashOutcome::Skipped(HashSkip::Oversized),
        ));
    }

    let hash = stream_hash(path)?;
    Ok((FileEntry::hashed(size, hash), HashOutcome::Hashed(hash)))
}

/// Stream a file through BLAKE3 in fixed-size blocks.
///
/// A 0-byte file yields the hash of empty input.
pub fn stream_hash(path: &Path) -> Result<ContentHash, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; HASH_BLOCK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}

/// Check whether a file's content is not locally resident.
///
/// Windows cloud-sync providers mark such stubs with
/// FILE_ATTRIBUTE_RECALL_ON_DATA_ACCESS; reading one would trigger a
/// download, so the crawl records size only.
#[cfg(windows)]
fn is_placeholder(metadata: &std::fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_RECALL_ON_DATA_ACCESS: u32 = 0x0040_0000;
    metadata.file_attributes() & FILE_ATTRIBUTE_RECALL_ON_DATA_ACCESS != 0
}

#[cfg(not(windows))]
fn is_placeholder(_metadata: &std::fs::Metadata) -> bool {
    false
}
