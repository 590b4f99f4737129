// Licensed under the Apache-2.0 license

//! Generic interface for removable-storage access.

use arrayvec::ArrayString;
use core::result::Result;

/// Maximum file-name length carried by a directory entry.
pub const MAX_NAME_LEN: usize = 64;

/// One entry of the root directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: ArrayString<MAX_NAME_LEN>,
    pub is_directory: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Named file does not exist.
    NotFound,
    /// The underlying medium failed the operation, or a stream ended
    /// before the promised length.
    Io,
    /// Handle is stale, or enumeration was used out of sequence.
    BadHandle,
}

/// Opaque handle to an open file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle(pub u32);

/// Access to the removable volume holding firmware images and update
/// markers. The install path only ever reads and removes; `create` and
/// `write` exist for the mount-time self-test. It is expected that drivers
/// for the storage medium would implement this trait.
pub trait Storage {
    /// Begin a single pass over the root directory listing.
    fn open_root(&mut self) -> Result<(), StorageError>;

    /// Produce the next entry of the listing, or `None` once exhausted.
    /// One pass per `open_root`; the sequence is not restartable mid-pass.
    fn next_entry(&mut self) -> Result<Option<DirEntry>, StorageError>;

    /// Open a file for reading. Fails with `NotFound` if absent.
    fn open(&mut self, name: &str) -> Result<FileHandle, StorageError>;

    /// Total byte length of an open file, known up front.
    fn size(&mut self, handle: FileHandle) -> Result<u32, StorageError>;

    /// Read up to `buf.len()` bytes; returns the number of bytes read,
    /// 0 at end of stream.
    fn read(&mut self, handle: FileHandle, buf: &mut [u8]) -> Result<usize, StorageError>;

    fn close(&mut self, handle: FileHandle) -> Result<(), StorageError>;

    /// Delete a file. Fails with `NotFound` if it does not exist; never
    /// silently succeeds on a missing file.
    fn remove(&mut self, name: &str) -> Result<(), StorageError>;

    /// Create (or truncate) a file and open it for writing.
    fn create(&mut self, name: &str) -> Result<FileHandle, StorageError>;

    /// Write `data` to an open file; returns the number of bytes written.
    fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, StorageError>;

    /// Fill `buf` completely, failing with `Io` if the stream ends early.
    fn read_exact(&mut self, handle: FileHandle, buf: &mut [u8]) -> Result<(), StorageError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(handle, &mut buf[filled..])?;
            if n == 0 {
                return Err(StorageError::Io);
            }
            filled += n;
        }
        Ok(())
    }
}
