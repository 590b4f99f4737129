// Licensed under the Apache-2.0 license

use boot_rom_common::FatalErrorHandler;
use boottime::HexWord;
use core::fmt::Write;

pub(crate) struct HostWriter {}
pub(crate) static mut HOST_WRITER: HostWriter = HostWriter {};

impl Write for HostWriter {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        print!("{}", s);
        Ok(())
    }
}

pub(crate) struct HostFatalErrorHandler {}
pub(crate) static mut FATAL_ERROR_HANDLER: HostFatalErrorHandler = HostFatalErrorHandler {};

impl FatalErrorHandler for HostFatalErrorHandler {
    fn fatal_error(&mut self, code: u32) -> ! {
        let _ = writeln!(HostWriter {}, "Fatal error: {}", HexWord(code));
        exit_host(2);
    }
}

/// Route the bootloader's console and fatal error path to the host process:
/// log lines go to stdout, a fatal error exits with a nonzero status.
pub fn install_host_io() {
    #[allow(static_mut_refs)]
    unsafe {
        boottime::set_printer(&mut *core::ptr::addr_of_mut!(HOST_WRITER));
        boot_rom_common::set_fatal_error_handler(&mut *core::ptr::addr_of_mut!(
            FATAL_ERROR_HANDLER
        ));
    }
}

/// Exit the host process in place of a system reset.
pub fn exit_host(exit_code: u32) -> ! {
    std::process::exit(exit_code as i32);
}
