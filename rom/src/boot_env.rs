/*++

Licensed under the Apache-2.0 license.

File Name:

    boot_env.rs

Abstract:

    Boot Environment - Encapsulates the collaborators the boot flow drives

--*/

use crate::checksum::ChecksumEngine;
use crate::nvm::NvmStorage;
use crate::storage::Storage;

/// Boot environment containing the peripherals the update pass drives.
/// Owned state is threaded explicitly through the call chain; nothing in
/// the core is reached as ambient global state.
pub struct BootEnv<'a> {
    pub storage: &'a mut dyn Storage,
    pub nvm: &'a mut dyn NvmStorage,
    pub checksum: &'a mut dyn ChecksumEngine,
}

impl<'a> BootEnv<'a> {
    pub fn new(
        storage: &'a mut dyn Storage,
        nvm: &'a mut dyn NvmStorage,
        checksum: &'a mut dyn ChecksumEngine,
    ) -> Self {
        BootEnv {
            storage,
            nvm,
            checksum,
        }
    }
}
