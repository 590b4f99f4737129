// Licensed under the Apache-2.0 license

//! Generic interface for the non-volatile program-memory controller.

use core::result::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvmError {
    /// Row erase did not acknowledge success.
    EraseFault,
    /// Page program did not acknowledge success. The containing row is left
    /// partially written; retrying without a fresh erase can corrupt bits
    /// that are no longer erasable.
    WriteFault,
    /// Operation falls outside the device.
    OutOfBounds,
    /// Offset is not aligned to the operation's unit.
    Misaligned,
}

/// Interface to the program memory. Erase granularity is one row
/// (`boot_config::ROW_SIZE`), program granularity one page
/// (`boot_config::PAGE_SIZE`); the medium requires a full row erase before
/// any page in that row can be programmed. It is expected that drivers for
/// the memory controller would implement this trait.
pub trait NvmStorage {
    /// Erase the row starting at `offset`. `offset` must be row-aligned.
    fn erase_row(&mut self, offset: usize) -> Result<(), NvmError>;

    /// Program exactly one page at `offset` within a previously erased row.
    /// `offset` must be page-aligned and `data` exactly one page long.
    fn write_page(&mut self, offset: usize, data: &[u8]) -> Result<(), NvmError>;

    /// Direct view of `len` bytes of mapped program memory at `offset`.
    /// The checksum engine runs over this view exactly as it runs over a
    /// RAM buffer.
    fn mapped(&self, offset: usize, len: usize) -> Result<&[u8], NvmError>;

    /// Total capacity of the device in bytes.
    fn capacity(&self) -> usize;
}
