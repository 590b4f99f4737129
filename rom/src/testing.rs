// Licensed under the Apache-2.0 license

//! In-memory collaborators for unit tests.

use crate::nvm::{NvmError, NvmStorage};
use crate::storage::{DirEntry, FileHandle, Storage, StorageError};
use arrayvec::ArrayString;
use boot_config::{PAGE_SIZE, ROW_SIZE};

struct OpenFile {
    handle: u32,
    name: String,
    pos: usize,
}

/// Map-of-names storage standing in for the SD card.
pub(crate) struct MemStorage {
    files: Vec<(String, Vec<u8>)>,
    dirs: Vec<String>,
    listing: Option<std::vec::IntoIter<DirEntry>>,
    open_files: Vec<OpenFile>,
    next_handle: u32,
}

impl MemStorage {
    pub fn new() -> Self {
        MemStorage {
            files: Vec::new(),
            dirs: Vec::new(),
            listing: None,
            open_files: Vec::new(),
            next_handle: 1,
        }
    }

    pub fn add_file(&mut self, name: &str, data: &[u8]) {
        self.files.push((name.to_string(), data.to_vec()));
    }

    pub fn add_dir(&mut self, name: &str) {
        self.dirs.push(name.to_string());
    }

    fn file_mut(&mut self, name: &str) -> Option<&mut Vec<u8>> {
        self.files
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data)
    }

    fn open_index(&self, handle: FileHandle) -> Result<usize, StorageError> {
        self.open_files
            .iter()
            .position(|f| f.handle == handle.0)
            .ok_or(StorageError::BadHandle)
    }
}

impl Storage for MemStorage {
    fn open_root(&mut self) -> Result<(), StorageError> {
        let mut entries = Vec::new();
        for name in &self.dirs {
            entries.push(DirEntry {
                name: ArrayString::from(name.as_str()).unwrap(),
                is_directory: true,
            });
        }
        for (name, _) in &self.files {
            entries.push(DirEntry {
                name: ArrayString::from(name.as_str()).unwrap(),
                is_directory: false,
            });
        }
        self.listing = Some(entries.into_iter());
        Ok(())
    }

    fn next_entry(&mut self) -> Result<Option<DirEntry>, StorageError> {
        match self.listing.as_mut() {
            Some(listing) => Ok(listing.next()),
            None => Err(StorageError::BadHandle),
        }
    }

    fn open(&mut self, name: &str) -> Result<FileHandle, StorageError> {
        if !self.files.iter().any(|(n, _)| n == name) {
            return Err(StorageError::NotFound);
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.open_files.push(OpenFile {
            handle,
            name: name.to_string(),
            pos: 0,
        });
        Ok(FileHandle(handle))
    }

    fn size(&mut self, handle: FileHandle) -> Result<u32, StorageError> {
        let idx = self.open_index(handle)?;
        let name = self.open_files[idx].name.clone();
        let data = self.file_mut(&name).ok_or(StorageError::NotFound)?;
        Ok(data.len() as u32)
    }

    fn read(&mut self, handle: FileHandle, buf: &mut [u8]) -> Result<usize, StorageError> {
        let idx = self.open_index(handle)?;
        let name = self.open_files[idx].name.clone();
        let pos = self.open_files[idx].pos;
        let data = self.file_mut(&name).ok_or(StorageError::NotFound)?;
        let n = buf.len().min(data.len().saturating_sub(pos));
        buf[..n].copy_from_slice(&data[pos..pos + n]);
        self.open_files[idx].pos += n;
        Ok(n)
    }

    fn close(&mut self, handle: FileHandle) -> Result<(), StorageError> {
        let idx = self.open_index(handle)?;
        self.open_files.remove(idx);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), StorageError> {
        let before = self.files.len();
        self.files.retain(|(n, _)| n != name);
        if self.files.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    fn create(&mut self, name: &str) -> Result<FileHandle, StorageError> {
        match self.file_mut(name) {
            Some(data) => data.clear(),
            None => self.files.push((name.to_string(), Vec::new())),
        }
        self.open(name)
    }

    fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, StorageError> {
        let idx = self.open_index(handle)?;
        let name = self.open_files[idx].name.clone();
        let file = self.file_mut(&name).ok_or(StorageError::NotFound)?;
        file.extend_from_slice(data);
        self.open_files[idx].pos += data.len();
        Ok(data.len())
    }
}

/// RAM-backed program memory with flash semantics: erase sets a row to
/// 0xFF, programming can only clear bits.
pub(crate) struct TestNvm {
    mem: Vec<u8>,
    erase_count: usize,
    write_count: usize,
    fail_erase_at: Option<usize>,
    fail_write_at: Option<usize>,
}

impl TestNvm {
    pub fn new(capacity: usize) -> Self {
        assert_eq!(capacity % ROW_SIZE, 0);
        TestNvm {
            mem: vec![0xFF; capacity],
            erase_count: 0,
            write_count: 0,
            fail_erase_at: None,
            fail_write_at: None,
        }
    }

    pub fn contents(&self) -> &[u8] {
        &self.mem
    }

    pub fn erase_count(&self) -> usize {
        self.erase_count
    }

    pub fn write_count(&self) -> usize {
        self.write_count
    }

    pub fn fail_erase_at(&mut self, offset: usize) {
        self.fail_erase_at = Some(offset);
    }

    pub fn fail_write_at(&mut self, offset: usize) {
        self.fail_write_at = Some(offset);
    }

    /// Raw program helper for test setup; bypasses page granularity.
    pub fn program(&mut self, offset: usize, data: &[u8]) {
        for (i, &b) in data.iter().enumerate() {
            self.mem[offset + i] &= b;
        }
    }
}

impl NvmStorage for TestNvm {
    fn erase_row(&mut self, offset: usize) -> Result<(), NvmError> {
        if offset % ROW_SIZE != 0 {
            return Err(NvmError::Misaligned);
        }
        if offset + ROW_SIZE > self.mem.len() {
            return Err(NvmError::OutOfBounds);
        }
        if self.fail_erase_at == Some(offset) {
            return Err(NvmError::EraseFault);
        }
        self.mem[offset..offset + ROW_SIZE].fill(0xFF);
        self.erase_count += 1;
        Ok(())
    }

    fn write_page(&mut self, offset: usize, data: &[u8]) -> Result<(), NvmError> {
        if offset % PAGE_SIZE != 0 {
            return Err(NvmError::Misaligned);
        }
        if data.len() != PAGE_SIZE || offset + PAGE_SIZE > self.mem.len() {
            return Err(NvmError::OutOfBounds);
        }
        if self.fail_write_at == Some(offset) {
            return Err(NvmError::WriteFault);
        }
        for (i, &b) in data.iter().enumerate() {
            self.mem[offset + i] &= b;
        }
        self.write_count += 1;
        Ok(())
    }

    fn mapped(&self, offset: usize, len: usize) -> Result<&[u8], NvmError> {
        if offset + len > self.mem.len() {
            return Err(NvmError::OutOfBounds);
        }
        Ok(&self.mem[offset..offset + len])
    }

    fn capacity(&self) -> usize {
        self.mem.len()
    }
}
