// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Memory region identification
//!
//! The GBA decodes the top byte of an address to select a region. Most
//! regions mirror their backing store across the whole 16MB window.

use super::{Backup, Bus};

/// Memory region identification
///
/// Used to route an access to the store or device behind an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRegion {
    /// BIOS ROM (0x00000000-0x00003FFF)
    Bios,
    /// On-board work RAM
    Ewram,
    /// In-chip work RAM
    Iwram,
    /// Memory-mapped I/O registers
    Io,
    /// Palette RAM
    Palette,
    /// Video RAM
    Vram,
    /// Object attribute memory
    Oam,
    /// Cartridge ROM windows
    Rom,
    /// EEPROM window inside the third ROM mirror
    Eeprom,
    /// SRAM / Flash save window
    Backup,
    /// No backing store (open bus)
    Unmapped,
}

impl Bus {
    /// Identify the memory region for an address
    ///
    /// # Arguments
    ///
    /// * `address` - Bus address
    ///
    /// # Returns
    ///
    /// The region that services the address. The EEPROM window only exists
    /// while the cartridge has (or may still attach) an EEPROM.
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::{Bus, MemoryRegion};
    ///
    /// let bus = Bus::new();
    ///
    /// assert_eq!(bus.identify_region(0x0000_0000), MemoryRegion::Bios);
    /// assert_eq!(bus.identify_region(0x0000_4000), MemoryRegion::Unmapped);
    /// assert_eq!(bus.identify_region(0x0300_7FFC), MemoryRegion::Iwram);
    /// assert_eq!(bus.identify_region(0x0800_0000), MemoryRegion::Rom);
    /// assert_eq!(bus.identify_region(0x0E00_0000), MemoryRegion::Backup);
    /// assert_eq!(bus.identify_region(0x1000_0000), MemoryRegion::Unmapped);
    /// ```
    pub fn identify_region(&self, address: u32) -> MemoryRegion {
        match address >> 24 {
            0x00 if address < 0x4000 => MemoryRegion::Bios,
            0x02 => MemoryRegion::Ewram,
            0x03 => MemoryRegion::Iwram,
            0x04 => MemoryRegion::Io,
            0x05 => MemoryRegion::Palette,
            0x06 => MemoryRegion::Vram,
            0x07 => MemoryRegion::Oam,
            0x08..=0x0c => MemoryRegion::Rom,
            0x0d => {
                let eeprom_capable = matches!(self.backup, Backup::None | Backup::Eeprom(_));
                if eeprom_capable && self.is_eeprom_window(address) {
                    MemoryRegion::Eeprom
                } else {
                    MemoryRegion::Rom
                }
            }
            0x0e | 0x0f => MemoryRegion::Backup,
            _ => MemoryRegion::Unmapped,
        }
    }
}
