/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Common library for the SD-card secondary-stage bootloader.

--*/

#![cfg_attr(target_arch = "arm", no_std)]

pub mod checksum;
pub use checksum::{ChecksumEngine, ChecksumFault, SoftwareCrc32};
pub mod error;
pub use error::BootError;
pub mod launch;
pub use launch::{transfer_control, validate_application, BootPeripherals};
pub mod nvm;
pub use nvm::{AppRegion, NvmError, NvmStorage};
pub mod storage;
pub use storage::{DirEntry, FileHandle, Storage, StorageError};
pub mod update;
pub use update::{UpdateOrchestrator, UpdateOutcome, UpdateState};

mod boot;
pub use boot::{boot_start, run_boot_pass, BootParameters};
mod boot_env;
pub use boot_env::BootEnv;

#[cfg(test)]
mod testing;

pub trait FatalErrorHandler {
    /// Report the error code and stop this boot. On hardware the installed
    /// handler logs the code, waits a fixed delay so the line drains, and
    /// resets the system.
    fn fatal_error(&mut self, code: u32) -> !;
}

static mut FATAL_ERROR_HANDLER: Option<&'static mut dyn FatalErrorHandler> = None;

/// Set the fatal error handler.
///
/// SAFETY: it is important that the passed fatal handler is never used otherwise
/// and no other references exist to it. It is recommended to create a single instance
/// of the struct and pass it in immediatly, and never use it otherwise.
pub fn set_fatal_error_handler(handler: &'static mut dyn FatalErrorHandler) {
    unsafe {
        FATAL_ERROR_HANDLER = Some(handler);
    }
}

#[panic_handler]
#[inline(never)]
#[cfg(target_arch = "arm")]
fn boot_panic(_: &core::panic::PanicInfo) -> ! {
    fatal_error(0);
}

#[inline(never)]
#[allow(dead_code)]
#[allow(clippy::empty_loop)]
pub fn fatal_error(code: u32) -> ! {
    #[allow(static_mut_refs)]
    if let Some(handler) = unsafe { FATAL_ERROR_HANDLER.as_mut() } {
        handler.fatal_error(code);
    } else {
        // If no handler is set, just loop forever
        loop {}
    }
}
