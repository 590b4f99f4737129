// Licensed under the Apache-2.0 license

//! RAM-backed NVM controller model with flash row/page semantics.

use boot_config::{PAGE_SIZE, ROW_SIZE};
use boot_rom_common::{NvmError, NvmStorage};

/// One operation issued against the controller, in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvmOp {
    EraseRow { offset: usize },
    WritePage { offset: usize },
}

/// Emulated NVM controller. Erase sets a row to the erased state (0xFF),
/// programming can only clear bits, and every operation is recorded so
/// tests can assert on the exact command sequence.
pub struct RamNvmCtrl {
    mem: Vec<u8>,
    ops: Vec<NvmOp>,
    fail_erase_at: Option<usize>,
    fail_write_at: Option<usize>,
    corrupt_after_write: Option<usize>,
}

impl RamNvmCtrl {
    pub fn new(capacity: usize) -> Self {
        assert_eq!(capacity % ROW_SIZE, 0, "capacity must be row aligned");
        RamNvmCtrl {
            mem: vec![0xFF; capacity],
            ops: Vec::new(),
            fail_erase_at: None,
            fail_write_at: None,
            corrupt_after_write: None,
        }
    }

    pub fn contents(&self) -> &[u8] {
        &self.mem
    }

    pub fn ops(&self) -> &[NvmOp] {
        &self.ops
    }

    /// Fault injection: the next erase of the row at `offset` fails.
    pub fn fail_erase_at(&mut self, offset: usize) {
        self.fail_erase_at = Some(offset);
    }

    /// Fault injection: the next program of the page at `offset` fails.
    pub fn fail_write_at(&mut self, offset: usize) {
        self.fail_write_at = Some(offset);
    }

    /// Fault injection: the page at `offset` programs without error but a
    /// bit in the stored data flips, so readback verification sees a
    /// different value than what was written.
    pub fn corrupt_after_write(&mut self, offset: usize) {
        self.corrupt_after_write = Some(offset);
    }
}

impl NvmStorage for RamNvmCtrl {
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
        self.ops.push(NvmOp::EraseRow { offset });
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
        if self.corrupt_after_write == Some(offset) {
            self.mem[offset] ^= 0x01;
        }
        self.ops.push(NvmOp::WritePage { offset });
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
