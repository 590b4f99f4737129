/*++

Licensed under the Apache-2.0 license.

File Name:

    launch.rs

Abstract:

    Launch Sequencer - Hands control from the bootloader to the application

--*/

use crate::error::BootError;
use crate::nvm::NvmStorage;
use boot_config::BootMemoryMap;
use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::FromBytes;

/// Peripherals the bootloader brought up. `shutdown` runs on every exit
/// path before control is handed to the application.
pub trait BootPeripherals {
    fn shutdown(&mut self);
}

/// Check that the application region holds a plausible vector table before
/// jumping into it: the initial stack pointer and the reset vector at
/// base + 4 must be neither zero nor the erased state. A half-written
/// install from a previous boot fails this check instead of being executed.
pub fn validate_application(nvm: &dyn NvmStorage, map: &BootMemoryMap) -> Result<(), BootError> {
    let head = nvm.mapped(map.app_offset as usize, 8)?;
    let vectors = <[U32<LittleEndian>; 2]>::read_from_bytes(head)
        .map_err(|_| BootError::InvalidApplication)?;
    let stack_top = vectors[0].get();
    let reset_vector = vectors[1].get();
    if stack_top == 0 || stack_top == 0xffff_ffff {
        return Err(BootError::InvalidApplication);
    }
    if reset_vector == 0 || reset_vector == 0xffff_ffff {
        return Err(BootError::InvalidApplication);
    }
    Ok(())
}

/// One-way transfer into the application: rebase the main stack pointer
/// and the vector table to the application region, then jump through the
/// reset vector stored at base + 4. This call never returns; code after it
/// is unreachable.
pub fn transfer_control(app_offset: u32) -> ! {
    #[cfg(target_arch = "arm")]
    unsafe {
        // Vector table offset register; the low bits are reserved.
        const SCB_VTOR: *mut u32 = 0xe000_ed08 as *mut u32;
        let stack_top = core::ptr::read_volatile(app_offset as *const u32);
        let reset_vector = core::ptr::read_volatile((app_offset + 4) as *const u32);
        core::ptr::write_volatile(SCB_VTOR, app_offset & 0xffff_ff80);
        core::arch::asm!(
            "msr msp, {stack}",
            "bx {entry}",
            stack = in(reg) stack_top,
            entry = in(reg) reset_vector,
            options(noreturn),
        );
    }

    #[cfg(not(target_arch = "arm"))]
    {
        let _ = app_offset;
        panic!("Attempting to jump to the application on a non-ARM platform");
    }
}
