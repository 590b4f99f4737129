/*++

Licensed under the Apache-2.0 license.

File Name:

    main.rs

Abstract:

    Host emulator for the SD-card bootloader. Runs the full update pass
    against a directory standing in for the card and a RAM-backed NVM.

--*/

use anyhow::{anyhow, Context, Result};
use boot_config::BootMemoryMap;
use boot_rom_common::{
    run_boot_pass, validate_application, BootEnv, BootParameters, SoftwareCrc32, UpdateOutcome,
};
use clap::Parser;
use core::fmt::Write;
use emulator_periph::{install_host_io, DirStorage, RamNvmCtrl};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "SD-card bootloader emulator")]
struct EmulatorArgs {
    /// Directory that models the card's root directory
    #[arg(long)]
    storage: PathBuf,

    /// Emulated NVM capacity in bytes
    #[arg(long, default_value_t = 256 * 1024)]
    flash_size: u32,

    /// Offset of the application region inside the NVM
    #[arg(long, default_value_t = 0x1_2000)]
    app_offset: u32,

    /// Skip the storage self-test before scanning for updates
    #[arg(long)]
    skip_storage_check: bool,

    /// Write the final NVM contents to this file after the pass
    #[arg(long)]
    dump_nvm: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = EmulatorArgs::parse();
    install_host_io();

    let map = BootMemoryMap {
        flash_size: args.flash_size,
        app_offset: args.app_offset,
        app_size: args
            .flash_size
            .checked_sub(args.app_offset)
            .context("application offset is beyond the end of the NVM")?,
    };

    let mut storage = DirStorage::new(&args.storage);
    let mut nvm = RamNvmCtrl::new(args.flash_size as usize);
    let mut crc = SoftwareCrc32::new();
    let mut env = BootEnv::new(&mut storage, &mut nvm, &mut crc);
    let params = BootParameters {
        map,
        storage_check: !args.skip_storage_check,
        ..Default::default()
    };

    let outcome = run_boot_pass(&mut env, &params)
        .map_err(|e| anyhow!("update pass failed: {:?} (code {:#010x})", e, e.code()))?;
    match outcome {
        UpdateOutcome::NoUpdate => boottime::println!("[emulator] no update installed"),
        UpdateOutcome::Installed { rows, bytes } => {
            boottime::println!("[emulator] installed {} rows ({} bytes)", rows, bytes)
        }
    }

    if let Some(path) = &args.dump_nvm {
        std::fs::write(path, nvm.contents())
            .with_context(|| format!("writing NVM dump to {}", path.display()))?;
    }

    match validate_application(&nvm, &map) {
        Ok(()) => {
            boottime::println!(
                "[emulator] application valid at {:#x}; hand-off not performed on the host",
                map.app_offset
            );
            Ok(())
        }
        Err(e) => Err(anyhow!(
            "no valid application in flash: {:?} (code {:#010x})",
            e,
            e.code()
        )),
    }
}
