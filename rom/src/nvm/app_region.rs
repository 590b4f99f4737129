// Licensed under the Apache-2.0 license

use crate::nvm::hil::{NvmError, NvmStorage};
use boot_config::{PAGE_SIZE, ROW_SIZE};

/// A bounds-checked view of the application region of program memory.
///
/// An `AppRegion` provides erase, row-write and mapped-read access to the
/// contiguous range `[base_offset, base_offset + length)` of the underlying
/// device; every operation is checked so it cannot reach outside the
/// region. Row writes are decomposed into page-sized programs issued in
/// address order, which is the only write pattern the medium supports.
pub struct AppRegion<'a> {
    nvm: &'a mut dyn NvmStorage,
    base_offset: usize,
    length: usize,
}

impl core::fmt::Debug for AppRegion<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppRegion")
            .field("base_offset", &self.base_offset)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl<'a> AppRegion<'a> {
    /// Creates a new `AppRegion` over `nvm`.
    ///
    /// Returns `Err(NvmError::OutOfBounds)` if the region exceeds the
    /// device capacity, or `Err(NvmError::Misaligned)` if `base_offset` is
    /// not row-aligned.
    pub fn new(
        nvm: &'a mut dyn NvmStorage,
        base_offset: usize,
        length: usize,
    ) -> Result<Self, NvmError> {
        if base_offset % ROW_SIZE != 0 {
            return Err(NvmError::Misaligned);
        }
        if base_offset + length > nvm.capacity() {
            return Err(NvmError::OutOfBounds);
        }
        Ok(AppRegion {
            nvm,
            base_offset,
            length,
        })
    }

    /// Erases the row at `region_offset` within the region.
    pub fn erase_row(&mut self, region_offset: usize) -> Result<(), NvmError> {
        if region_offset % ROW_SIZE != 0 {
            return Err(NvmError::Misaligned);
        }
        if region_offset + ROW_SIZE > self.length {
            return Err(NvmError::OutOfBounds);
        }
        self.nvm.erase_row(self.base_offset + region_offset)
    }

    /// Writes up to one row of `data` at `region_offset`, page by page in
    /// address order. A tail shorter than a full row is allowed; the last
    /// partial page is padded with 0xFF, the erased state, so padding never
    /// programs a bit.
    pub fn write_row(&mut self, region_offset: usize, data: &[u8]) -> Result<(), NvmError> {
        if region_offset % ROW_SIZE != 0 {
            return Err(NvmError::Misaligned);
        }
        if data.is_empty() || data.len() > ROW_SIZE {
            return Err(NvmError::OutOfBounds);
        }
        if region_offset + ROW_SIZE > self.length {
            return Err(NvmError::OutOfBounds);
        }
        for (i, chunk) in data.chunks(PAGE_SIZE).enumerate() {
            let page_offset = self.base_offset + region_offset + i * PAGE_SIZE;
            if chunk.len() == PAGE_SIZE {
                self.nvm.write_page(page_offset, chunk)?;
            } else {
                let mut page = [0xFFu8; PAGE_SIZE];
                page[..chunk.len()].copy_from_slice(chunk);
                self.nvm.write_page(page_offset, &page)?;
            }
        }
        Ok(())
    }

    /// Returns the mapped view of `len` bytes at `region_offset`.
    pub fn mapped(&self, region_offset: usize, len: usize) -> Result<&[u8], NvmError> {
        if region_offset + len > self.length {
            return Err(NvmError::OutOfBounds);
        }
        self.nvm.mapped(self.base_offset + region_offset, len)
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}
