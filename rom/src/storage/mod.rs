// Licensed under the Apache-2.0 license

pub mod fs_check;
pub mod hil;
pub use fs_check::run_storage_check;
pub use hil::{DirEntry, FileHandle, Storage, StorageError, MAX_NAME_LEN};
