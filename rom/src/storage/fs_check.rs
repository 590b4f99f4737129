// Licensed under the Apache-2.0 license

//! Mount-time storage self-test: create, write, read back and compare.
//! Every step returns a typed result and the caller short-circuits, so a
//! failing medium is caught before the update scan touches it.

use crate::storage::{Storage, StorageError};
use core::fmt::Write;

pub const TEST_TEXT_FILE: &str = "sd_mmc_test.txt";
pub const TEST_BIN_FILE: &str = "sd_binary.bin";

const TEST_LINE: &[u8] = b"Test SD/MMC stack\n";
const TEST_PATTERN_LEN: usize = 256;

pub fn run_storage_check(storage: &mut dyn Storage) -> Result<(), StorageError> {
    boottime::println!("[boot] storage check started");

    write_text_file(storage)?;
    boottime::println!("[boot] text file write [OK]");

    write_binary_file(storage)?;
    boottime::println!("[boot] binary file write [OK]");

    verify_binary_file(storage)?;
    boottime::println!("[boot] binary file read back [OK]");

    storage.remove(TEST_TEXT_FILE)?;
    storage.remove(TEST_BIN_FILE)?;
    boottime::println!("[boot] storage check passed");
    Ok(())
}

fn write_text_file(storage: &mut dyn Storage) -> Result<(), StorageError> {
    let handle = storage.create(TEST_TEXT_FILE)?;
    let written = storage.write(handle, TEST_LINE)?;
    storage.close(handle)?;
    if written != TEST_LINE.len() {
        return Err(StorageError::Io);
    }
    Ok(())
}

fn write_binary_file(storage: &mut dyn Storage) -> Result<(), StorageError> {
    let mut pattern = [0u8; TEST_PATTERN_LEN];
    for (i, byte) in pattern.iter_mut().enumerate() {
        *byte = i as u8;
    }
    let handle = storage.create(TEST_BIN_FILE)?;
    let written = storage.write(handle, &pattern)?;
    storage.close(handle)?;
    if written != pattern.len() {
        return Err(StorageError::Io);
    }
    Ok(())
}

fn verify_binary_file(storage: &mut dyn Storage) -> Result<(), StorageError> {
    let handle = storage.open(TEST_BIN_FILE)?;
    if storage.size(handle)? as usize != TEST_PATTERN_LEN {
        storage.close(handle)?;
        return Err(StorageError::Io);
    }
    let mut readback = [0u8; TEST_PATTERN_LEN];
    storage.read_exact(handle, &mut readback)?;
    storage.close(handle)?;
    for (i, &byte) in readback.iter().enumerate() {
        if byte != i as u8 {
            boottime::println!(
                "[boot] storage check mismatch at index {}: expected {:02x}, got {:02x}",
                i,
                i as u8,
                byte
            );
            return Err(StorageError::Io);
        }
    }
    Ok(())
}
