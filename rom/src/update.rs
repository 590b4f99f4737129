/*++

Licensed under the Apache-2.0 license.

File Name:

    update.rs

Abstract:

    Update Orchestrator - Decides whether an update is pending and drives
    the chunked erase/write/verify loop

--*/

use crate::boot_env::BootEnv;
use crate::error::BootError;
use crate::nvm::AppRegion;
use crate::storage::StorageError;
use boot_config::{BootMemoryMap, UpdateSlot, ROW_SIZE};
use core::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Idle,
    Scanning,
    NoUpdate,
    UpdateSelected,
    Installing,
    InstallComplete,
    InstallFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No marker present; the target region was not touched.
    NoUpdate,
    /// Image fully installed with every row verified.
    Installed { rows: usize, bytes: u32 },
}

/// Owns the update state machine for one boot. The environment is borrowed
/// for the duration of the pass; the orchestrator is the sole mutator of
/// the target region while it runs.
pub struct UpdateOrchestrator<'a, 'e> {
    env: &'a mut BootEnv<'e>,
    map: &'a BootMemoryMap,
    catalog: &'a [UpdateSlot],
    state: UpdateState,
}

impl<'a, 'e> UpdateOrchestrator<'a, 'e> {
    pub fn new(
        env: &'a mut BootEnv<'e>,
        map: &'a BootMemoryMap,
        catalog: &'a [UpdateSlot],
    ) -> Self {
        UpdateOrchestrator {
            env,
            map,
            catalog,
            state: UpdateState::Idle,
        }
    }

    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// Run the full pass: scan for a marker, and if one is found install
    /// the matching image. The marker is consumed at selection time, before
    /// the install outcome is known, so a crash mid-install cannot retry
    /// the same marker forever.
    pub fn run(&mut self) -> Result<UpdateOutcome, BootError> {
        self.state = UpdateState::Scanning;
        let slot = match self.scan() {
            Ok(slot) => slot,
            Err(e) => {
                self.state = UpdateState::InstallFailed;
                return Err(e);
            }
        };
        let Some(slot) = slot else {
            self.state = UpdateState::NoUpdate;
            return Ok(UpdateOutcome::NoUpdate);
        };
        self.state = UpdateState::UpdateSelected;
        match self.install(&slot) {
            Ok(outcome) => {
                self.state = UpdateState::InstallComplete;
                Ok(outcome)
            }
            Err(e) => {
                self.state = UpdateState::InstallFailed;
                Err(e)
            }
        }
    }

    /// Enumerate the root directory once. The first entry whose name
    /// matches a catalog marker (case-sensitively) selects that variant;
    /// the marker is deleted on the spot. Remaining entries are still
    /// listed for the log.
    fn scan(&mut self) -> Result<Option<UpdateSlot>, BootError> {
        self.env.storage.open_root()?;
        boottime::println!("[boot] storage root contents:");
        let mut selected: Option<UpdateSlot> = None;
        while let Some(entry) = self.env.storage.next_entry()? {
            if entry.is_directory {
                boottime::println!("  DIR   {}", entry.name);
                continue;
            }
            let slot = self
                .catalog
                .iter()
                .find(|slot| slot.marker == entry.name.as_str());
            match slot {
                Some(slot) if selected.is_none() => {
                    boottime::println!("  FILE  {} -> update firmware {}", entry.name, slot.label);
                    selected = Some(*slot);
                    // Consume the marker now, regardless of install
                    // outcome: at most one attempt per marker.
                    match self.env.storage.remove(slot.marker) {
                        Ok(()) | Err(StorageError::NotFound) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                _ => boottime::println!("  FILE  {}", entry.name),
            }
        }
        Ok(selected)
    }

    /// Stream the image into the target region one row at a time:
    /// erase, read a window, program page by page, then compare checksums
    /// of the window and of the freshly written row. Any mismatch or fault
    /// ends the pass without advancing.
    fn install(&mut self, slot: &UpdateSlot) -> Result<UpdateOutcome, BootError> {
        self.state = UpdateState::Installing;
        let BootEnv {
            storage,
            nvm,
            checksum,
        } = &mut *self.env;

        let handle = match storage.open(slot.image) {
            Ok(handle) => handle,
            Err(StorageError::NotFound) => {
                boottime::println!("[boot] image {} not found", slot.image);
                return Err(BootError::ImageNotFound);
            }
            Err(e) => return Err(e.into()),
        };
        let total = storage.size(handle)?;
        boottime::println!("[boot] installing {} ({} bytes)", slot.image, total);

        let mut region = AppRegion::new(
            &mut **nvm,
            self.map.app_offset as usize,
            self.map.app_size as usize,
        )?;
        let mut window = [0u8; ROW_SIZE];
        let mut offset = 0usize;
        let mut remaining = total as usize;
        let mut rows = 0usize;

        while remaining > 0 {
            let chunk = remaining.min(ROW_SIZE);
            region.erase_row(offset)?;
            storage.read_exact(handle, &mut window[..chunk])?;
            region.write_row(offset, &window[..chunk])?;

            let source_sum = checksum.checksum(&window[..chunk])?;
            let target_sum = checksum.checksum(region.mapped(offset, chunk)?)?;
            if source_sum != target_sum {
                boottime::println!("[boot] checksum mismatch at row offset {:#x}", offset);
                return Err(BootError::ChecksumMismatch);
            }

            rows += 1;
            offset += ROW_SIZE;
            remaining -= chunk;
        }

        storage.close(handle)?;
        boottime::println!("[boot] install complete: {} rows, {} bytes", rows, total);
        Ok(UpdateOutcome::Installed { rows, bytes: total })
    }
}
