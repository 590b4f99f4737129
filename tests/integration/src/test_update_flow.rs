// Licensed under the Apache-2.0 license

//! End-to-end update scenarios: a host directory plays the SD card, a
//! RAM-backed controller plays the NVM, and each test runs one full boot
//! pass and asserts on the exact command stream the NVM saw.

use boot_config::{BootMemoryMap, PAGE_SIZE, ROW_SIZE};
use boot_rom_common::{
    run_boot_pass, validate_application, BootEnv, BootError, BootParameters, SoftwareCrc32,
    UpdateOutcome,
};
use emulator_periph::{DirStorage, NvmOp, RamNvmCtrl};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn test_map() -> BootMemoryMap {
    BootMemoryMap {
        flash_size: 16 * ROW_SIZE as u32,
        app_offset: 4 * ROW_SIZE as u32,
        app_size: 12 * ROW_SIZE as u32,
    }
}

fn ramp_image(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}

fn stage(dir: &Path, files: &[(&str, &[u8])]) {
    for (name, data) in files {
        fs::write(dir.join(name), data).unwrap();
    }
}

fn run_pass(dir: &Path, nvm: &mut RamNvmCtrl, storage_check: bool) -> Result<UpdateOutcome, BootError> {
    let map = test_map();
    let mut storage = DirStorage::new(dir);
    let mut crc = SoftwareCrc32::new();
    let mut env = BootEnv::new(&mut storage, &mut *nvm, &mut crc);
    let params = BootParameters {
        map,
        storage_check,
        ..Default::default()
    };
    run_boot_pass(&mut env, &params)
}

/// The command stream expected for installing `rows` full-or-partial rows
/// starting at `base`: one erase per row, then its pages in address order.
fn expected_ops(base: usize, image_len: usize) -> Vec<NvmOp> {
    let mut ops = Vec::new();
    let mut offset = 0;
    let mut remaining = image_len;
    while remaining > 0 {
        let chunk = remaining.min(ROW_SIZE);
        ops.push(NvmOp::EraseRow {
            offset: base + offset,
        });
        let pages = chunk.div_ceil(PAGE_SIZE);
        for page in 0..pages {
            ops.push(NvmOp::WritePage {
                offset: base + offset + page * PAGE_SIZE,
            });
        }
        offset += ROW_SIZE;
        remaining -= chunk;
    }
    ops
}

#[test]
fn test_pending_update_is_installed_row_by_row() {
    let dir = TempDir::new().unwrap();
    let image = ramp_image(2 * ROW_SIZE);
    stage(dir.path(), &[("FLAGA.TXT", b""), ("FIRMA.BIN", &image)]);

    let map = test_map();
    let mut nvm = RamNvmCtrl::new(map.flash_size as usize);
    let outcome = run_pass(dir.path(), &mut nvm, false).unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Installed {
            rows: 2,
            bytes: image.len() as u32
        }
    );
    let base = map.app_offset as usize;
    assert_eq!(nvm.ops(), expected_ops(base, image.len()));
    assert_eq!(&nvm.contents()[base..base + image.len()], &image[..]);
    // The marker was consumed on the card.
    assert!(!dir.path().join("FLAGA.TXT").exists());
    assert!(dir.path().join("FIRMA.BIN").exists());
}

#[test]
fn test_no_marker_leaves_nvm_untouched() {
    let dir = TempDir::new().unwrap();
    stage(dir.path(), &[("README.TXT", b"not a marker")]);

    let mut nvm = RamNvmCtrl::new(test_map().flash_size as usize);
    let outcome = run_pass(dir.path(), &mut nvm, false).unwrap();

    assert_eq!(outcome, UpdateOutcome::NoUpdate);
    assert!(nvm.ops().is_empty());
}

#[test]
fn test_marker_without_image_consumes_marker_and_fails() {
    let dir = TempDir::new().unwrap();
    stage(dir.path(), &[("FLAGB.TXT", b"")]);

    let mut nvm = RamNvmCtrl::new(test_map().flash_size as usize);
    let err = run_pass(dir.path(), &mut nvm, false).unwrap_err();

    assert_eq!(err, BootError::ImageNotFound);
    assert!(nvm.ops().is_empty());
    // At most one attempt per marker, even when the image is missing.
    assert!(!dir.path().join("FLAGB.TXT").exists());
}

#[test]
fn test_verify_failure_stops_before_later_rows() {
    let dir = TempDir::new().unwrap();
    let image = ramp_image(2 * ROW_SIZE + 88);
    stage(dir.path(), &[("FLAGA.TXT", b""), ("FIRMA.BIN", &image)]);

    let map = test_map();
    let base = map.app_offset as usize;
    let mut nvm = RamNvmCtrl::new(map.flash_size as usize);
    // Second row programs without error but reads back corrupted.
    nvm.corrupt_after_write(base + ROW_SIZE);

    let err = run_pass(dir.path(), &mut nvm, false).unwrap_err();
    assert_eq!(err, BootError::ChecksumMismatch);

    // Rows one and two were attempted; the third was never touched.
    assert!(!nvm
        .ops()
        .iter()
        .any(|op| matches!(op, NvmOp::EraseRow { offset } if *offset == base + 2 * ROW_SIZE)));
    // The first row still verified and holds its data.
    assert_eq!(&nvm.contents()[base..base + ROW_SIZE], &image[..ROW_SIZE]);
}

#[test]
fn test_second_pass_after_install_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let image = ramp_image(ROW_SIZE);
    stage(dir.path(), &[("FLAGA.TXT", b""), ("FIRMA.BIN", &image)]);

    let mut nvm = RamNvmCtrl::new(test_map().flash_size as usize);
    run_pass(dir.path(), &mut nvm, false).unwrap();
    let ops_after_install = nvm.ops().len();

    let outcome = run_pass(dir.path(), &mut nvm, false).unwrap();
    assert_eq!(outcome, UpdateOutcome::NoUpdate);
    assert_eq!(nvm.ops().len(), ops_after_install);
}

#[test]
fn test_full_pass_with_storage_check_and_launch_validation() {
    let dir = TempDir::new().unwrap();
    let map = test_map();
    let mut image = ramp_image(ROW_SIZE);
    image[..4].copy_from_slice(&0x2000_8000u32.to_le_bytes());
    image[4..8].copy_from_slice(&(map.app_offset + 0x41).to_le_bytes());
    stage(dir.path(), &[("FLAGB.TXT", b""), ("FIRMB.BIN", &image)]);

    let mut nvm = RamNvmCtrl::new(map.flash_size as usize);
    let outcome = run_pass(dir.path(), &mut nvm, true).unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Installed {
            rows: 1,
            bytes: ROW_SIZE as u32
        }
    );
    assert!(validate_application(&nvm, &map).is_ok());
    // The self-test cleaned up its scratch files.
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(leftovers, ["FIRMB.BIN"]);
}
