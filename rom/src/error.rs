// Licensed under the Apache-2.0 license

use crate::checksum::ChecksumFault;
use crate::nvm::NvmError;
use crate::storage::StorageError;

/// Errors surfaced by the boot flow. Every variant maps to a stable u32
/// code reported through `fatal_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    /// Removable storage failed an operation.
    Storage(StorageError),
    /// The selected variant's image file is absent. The target region has
    /// not been touched when this is returned.
    ImageNotFound,
    /// Erase or program did not acknowledge success.
    Nvm(NvmError),
    /// The checksum engine failed to produce a code.
    ChecksumFault,
    /// Post-write verification failed: the row just written does not match
    /// the window just read. Fatal for the pass, never retried in place.
    ChecksumMismatch,
    /// The application region does not hold a plausible vector table.
    InvalidApplication,
}

impl BootError {
    pub fn code(&self) -> u32 {
        match self {
            BootError::Storage(StorageError::NotFound) => 0xb007_0001,
            BootError::Storage(StorageError::Io) => 0xb007_0002,
            BootError::Storage(StorageError::BadHandle) => 0xb007_0003,
            BootError::ImageNotFound => 0xb007_0004,
            BootError::Nvm(NvmError::EraseFault) => 0xb007_0005,
            BootError::Nvm(NvmError::WriteFault) => 0xb007_0006,
            BootError::Nvm(NvmError::OutOfBounds) => 0xb007_0007,
            BootError::Nvm(NvmError::Misaligned) => 0xb007_0008,
            BootError::ChecksumFault => 0xb007_0009,
            BootError::ChecksumMismatch => 0xb007_000a,
            BootError::InvalidApplication => 0xb007_000b,
        }
    }
}

impl From<StorageError> for BootError {
    fn from(err: StorageError) -> Self {
        BootError::Storage(err)
    }
}

impl From<NvmError> for BootError {
    fn from(err: NvmError) -> Self {
        BootError::Nvm(err)
    }
}

impl From<ChecksumFault> for BootError {
    fn from(_: ChecksumFault) -> Self {
        BootError::ChecksumFault
    }
}
