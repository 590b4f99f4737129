// Licensed under the Apache-2.0 license

#![cfg_attr(target_arch = "arm", no_std)]

/// Size in bytes of one write unit ("page") of the program memory.
pub const PAGE_SIZE: usize = 64;

/// Number of pages covered by a single row erase.
pub const PAGES_PER_ROW: usize = 4;

/// Size in bytes of one erase unit ("row") of the program memory.
pub const ROW_SIZE: usize = PAGE_SIZE * PAGES_PER_ROW;

/// Configures the program-memory layout seen by the bootloader.
/// These are the defaults that can be overridden and provided to the boot
/// flow for other flash geometries.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootMemoryMap {
    /// Total program-memory capacity in bytes.
    pub flash_size: u32,
    /// Offset of the application region. The bootloader itself occupies
    /// everything below this.
    pub app_offset: u32,
    /// Size of the application region in bytes.
    pub app_size: u32,
}

impl Default for BootMemoryMap {
    fn default() -> Self {
        BootMemoryMap {
            flash_size: 256 * 1024,
            app_offset: 0x1_2000,
            app_size: 256 * 1024 - 0x1_2000,
        }
    }
}

impl BootMemoryMap {
    /// Offset of the slot holding the application's reset-vector address.
    pub const fn reset_vector_offset(&self) -> u32 {
        self.app_offset + 4
    }
}

/// One installable firmware variant: the zero-length marker file that
/// requests it and the image file that provides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSlot {
    pub label: &'static str,
    pub marker: &'static str,
    pub image: &'static str,
}

/// Marker-to-image catalog scanned at boot. Marker names are matched
/// case-sensitively against root directory entries.
pub const UPDATE_CATALOG: &[UpdateSlot] = &[
    UpdateSlot {
        label: "A",
        marker: "FLAGA.TXT",
        image: "FIRMA.BIN",
    },
    UpdateSlot {
        label: "B",
        marker: "FLAGB.TXT",
        image: "FIRMB.BIN",
    },
];
