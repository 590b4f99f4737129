/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Host-side peripheral models for running the bootloader off-target.

--*/

mod io;
mod nvm_ctrl;
mod sd_storage;

pub use io::{exit_host, install_host_io};
pub use nvm_ctrl::{NvmOp, RamNvmCtrl};
pub use sd_storage::DirStorage;
