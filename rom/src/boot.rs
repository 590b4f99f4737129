/*++

Licensed under the Apache-2.0 license.

File Name:

    boot.rs

Abstract:

    Top-level boot flow for the secondary-stage bootloader

--*/

use crate::boot_env::BootEnv;
use crate::error::BootError;
use crate::fatal_error;
use crate::launch::{transfer_control, validate_application, BootPeripherals};
use crate::storage::run_storage_check;
use crate::update::{UpdateOrchestrator, UpdateOutcome};
use boot_config::{BootMemoryMap, UpdateSlot, PAGE_SIZE, ROW_SIZE, UPDATE_CATALOG};
use core::fmt::Write;

pub struct BootParameters<'a> {
    pub map: BootMemoryMap,
    /// Marker-to-image catalog scanned for pending updates.
    pub catalog: &'a [UpdateSlot],
    /// Run the storage self-test before scanning.
    pub storage_check: bool,
    pub peripherals: Option<&'a mut dyn BootPeripherals>,
}

impl Default for BootParameters<'_> {
    fn default() -> Self {
        BootParameters {
            map: BootMemoryMap::default(),
            catalog: UPDATE_CATALOG,
            storage_check: true,
            peripherals: None,
        }
    }
}

/// Run one update pass: storage self-test, marker scan, and install if a
/// marker selected an image. Returns instead of diverging so hosts and
/// tests can observe the outcome; `boot_start` is the diverging entry.
pub fn run_boot_pass(
    env: &mut BootEnv,
    params: &BootParameters,
) -> Result<UpdateOutcome, BootError> {
    boottime::println!(
        "[boot] nvm geometry: page size {} bytes, row size {} bytes, app region {} bytes at {:#x}",
        PAGE_SIZE,
        ROW_SIZE,
        params.map.app_size,
        params.map.app_offset
    );
    if params.storage_check {
        run_storage_check(env.storage)?;
    }
    let mut orchestrator = UpdateOrchestrator::new(env, &params.map, params.catalog);
    orchestrator.run()
}

/// Full boot: update pass, application sanity check, peripheral shutdown,
/// then the one-way jump. Any fatal condition restarts the system through
/// the installed fatal error handler instead of launching an unverified
/// application.
pub fn boot_start(mut env: BootEnv, mut params: BootParameters) -> ! {
    boottime::println!("[boot] enter bootloader");

    match run_boot_pass(&mut env, &params) {
        Ok(UpdateOutcome::NoUpdate) => boottime::println!("[boot] no update pending"),
        Ok(UpdateOutcome::Installed { rows, bytes }) => {
            boottime::println!("[boot] installed firmware: {} rows, {} bytes", rows, bytes)
        }
        Err(e) => {
            boottime::println!("[boot] update pass failed: {:?}", e);
            fatal_error(e.code());
        }
    }

    if let Err(e) = validate_application(&*env.nvm, &params.map) {
        boottime::println!("[boot] no valid application in flash");
        fatal_error(e.code());
    }

    boottime::println!("[boot] exit bootloader");
    if let Some(peripherals) = params.peripherals.as_mut() {
        peripherals.shutdown();
    }
    transfer_control(params.map.app_offset)
}
