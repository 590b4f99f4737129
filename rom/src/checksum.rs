// Licensed under the Apache-2.0 license

//! 32-bit integrity code used to verify each installed row.

use crc::{Crc, CRC_32_ISO_HDLC};

/// The engine did not acknowledge a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumFault;

/// Capability to compute the integrity code over a byte window.
///
/// The code is deterministic and order-sensitive, and must come out
/// identical whether the window lives in RAM or in mapped program memory;
/// the install loop compares a checksum of the window just read against a
/// checksum of the row just written. Implementations backed by a shared
/// hardware engine are non-reentrant, so the capability takes `&mut self`:
/// one owner, one computation at a time, back-to-back calls never
/// interleave.
pub trait ChecksumEngine {
    fn checksum(&mut self, data: &[u8]) -> Result<u32, ChecksumFault>;
}

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Software engine. Same polynomial family as the DSU CRC-32 peripheral,
/// so hardware and software produce interchangeable codes.
#[derive(Default)]
pub struct SoftwareCrc32 {}

impl SoftwareCrc32 {
    pub const fn new() -> Self {
        SoftwareCrc32 {}
    }
}

impl ChecksumEngine for SoftwareCrc32 {
    fn checksum(&mut self, data: &[u8]) -> Result<u32, ChecksumFault> {
        Ok(CRC32.checksum(data))
    }
}
