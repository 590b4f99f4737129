// Licensed under the Apache-2.0 license

//! SD-card model backed by a host directory. Files in the directory are
//! the card's root directory contents.

use arrayvec::ArrayString;
use boot_rom_common::{DirEntry, FileHandle, Storage, StorageError};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

pub struct DirStorage {
    root: PathBuf,
    listing: Option<std::vec::IntoIter<DirEntry>>,
    handles: HashMap<u32, File>,
    next_handle: u32,
}

fn map_io_err(e: std::io::Error) -> StorageError {
    match e.kind() {
        std::io::ErrorKind::NotFound => StorageError::NotFound,
        _ => StorageError::Io,
    }
}

impl DirStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirStorage {
            root: root.into(),
            listing: None,
            handles: HashMap::new(),
            next_handle: 1,
        }
    }

    fn file(&mut self, handle: FileHandle) -> Result<&mut File, StorageError> {
        self.handles.get_mut(&handle.0).ok_or(StorageError::BadHandle)
    }
}

impl Storage for DirStorage {
    fn open_root(&mut self) -> Result<(), StorageError> {
        let mut entries = Vec::new();
        for item in fs::read_dir(&self.root).map_err(map_io_err)? {
            let item = item.map_err(map_io_err)?;
            let name = item.file_name();
            // Names too long for a directory entry are not visible to the
            // bootloader, matching an 8.3-era card layout.
            let Ok(name) = ArrayString::from(&name.to_string_lossy()) else {
                continue;
            };
            let is_directory = item.file_type().map_err(map_io_err)?.is_dir();
            entries.push(DirEntry { name, is_directory });
        }
        // Host directory iteration order is unspecified; sort so every run
        // enumerates the card the same way.
        entries.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
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
        let file = File::open(self.root.join(name)).map_err(map_io_err)?;
        let handle = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(handle, file);
        Ok(FileHandle(handle))
    }

    fn size(&mut self, handle: FileHandle) -> Result<u32, StorageError> {
        let file = self.file(handle)?;
        let len = file.metadata().map_err(map_io_err)?.len();
        u32::try_from(len).map_err(|_| StorageError::Io)
    }

    fn read(&mut self, handle: FileHandle, buf: &mut [u8]) -> Result<usize, StorageError> {
        self.file(handle)?.read(buf).map_err(map_io_err)
    }

    fn close(&mut self, handle: FileHandle) -> Result<(), StorageError> {
        self.handles
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(StorageError::BadHandle)
    }

    fn remove(&mut self, name: &str) -> Result<(), StorageError> {
        fs::remove_file(self.root.join(name)).map_err(map_io_err)
    }

    fn create(&mut self, name: &str) -> Result<FileHandle, StorageError> {
        let file = File::create(self.root.join(name)).map_err(map_io_err)?;
        let handle = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(handle, file);
        Ok(FileHandle(handle))
    }

    fn write(&mut self, handle: FileHandle, data: &[u8]) -> Result<usize, StorageError> {
        self.file(handle)?.write_all(data).map_err(map_io_err)?;
        Ok(data.len())
    }
}
