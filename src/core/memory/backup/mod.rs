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

//! Cartridge save chips
//!
//! A cartridge carries at most one save chip. EEPROM is serial and lives in
//! the upper ROM window; SRAM and Flash are byte-wide and live at
//! 0x0E000000. The chip type is detected from the library ID string the
//! SDK links into every ROM.

mod eeprom;
mod flash;
mod sram;

#[cfg(test)]
mod tests;

pub use eeprom::Eeprom;
pub use flash::{Flash, FlashSize};
pub use sram::Sram;

use crate::core::error::{EmulatorError, Result};
use log::debug;

/// Save chip attached to the cartridge
#[derive(Debug, Clone, Default)]
pub enum Backup {
    /// No save chip detected (yet)
    #[default]
    None,
    /// Serial EEPROM (512B or 8KB)
    Eeprom(Eeprom),
    /// Command-driven Flash (64KB or 128KB)
    Flash(Flash),
    /// Battery-backed SRAM (32KB)
    Sram(Sram),
}

impl Backup {
    /// Detect the save chip from the ROM's library ID strings
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Backup;
    ///
    /// let mut rom = vec![0u8; 0x100];
    /// rom[0x40..0x49].copy_from_slice(b"FLASH1M_V");
    /// assert_eq!(Backup::detect(&rom).kind(), "Flash 128KB");
    /// ```
    pub fn detect(rom: &[u8]) -> Self {
        const IDS: [&[u8]; 5] = [b"EEPROM_V", b"SRAM_V", b"FLASH_V", b"FLASH512_V", b"FLASH1M_V"];

        let found = IDS
            .iter()
            .position(|id| rom.windows(id.len()).any(|window| window == *id));

        match found {
            Some(0) => Backup::Eeprom(Eeprom::new()),
            Some(1) => Backup::Sram(Sram::new()),
            Some(2) | Some(3) => Backup::Flash(Flash::new(FlashSize::Kb64)),
            Some(4) => Backup::Flash(Flash::new(FlashSize::Kb128)),
            _ => Backup::None,
        }
    }

    /// Human readable chip name
    pub fn kind(&self) -> &'static str {
        match self {
            Backup::None => "none",
            Backup::Eeprom(_) => "EEPROM",
            Backup::Flash(flash) => match flash.size() {
                FlashSize::Kb64 => "Flash 64KB",
                FlashSize::Kb128 => "Flash 128KB",
            },
            Backup::Sram(_) => "SRAM",
        }
    }

    /// Read a byte from the 0x0E save window
    pub(crate) fn read(&self, address: u32) -> u8 {
        match self {
            Backup::Flash(flash) => flash.read(address),
            Backup::Sram(sram) => sram.read(address),
            Backup::None | Backup::Eeprom(_) => 0xff,
        }
    }

    /// Write a byte to the 0x0E save window
    ///
    /// An undetected cartridge attaches a chip on first write: a Flash
    /// command prefix selects Flash, anything else selects SRAM.
    pub(crate) fn write(&mut self, address: u32, value: u8) {
        if let Backup::None = self {
            if address & 0xffff == 0x5555 && value == 0xaa {
                debug!("Flash command detected, attaching Flash 128KB");
                *self = Backup::Flash(Flash::new(FlashSize::Kb128));
            } else {
                debug!("Save write detected, attaching SRAM");
                *self = Backup::Sram(Sram::new());
            }
        }

        match self {
            Backup::Flash(flash) => flash.write(address, value),
            Backup::Sram(sram) => sram.write(address, value),
            Backup::None | Backup::Eeprom(_) => {}
        }
    }

    /// Raw chip contents, or `None` without a chip
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Backup::None => None,
            Backup::Eeprom(eeprom) => Some(eeprom.data()),
            Backup::Flash(flash) => Some(flash.data()),
            Backup::Sram(sram) => Some(sram.data()),
        }
    }

    /// Replace the chip contents with previously saved data
    ///
    /// # Returns
    ///
    /// `Err(EmulatorError::InvalidSaveSize)` if `data` does not match the chip.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let target: &mut [u8] = match self {
            Backup::None => return Ok(()),
            Backup::Eeprom(eeprom) => eeprom.data_mut(),
            Backup::Flash(flash) => flash.data_mut(),
            Backup::Sram(sram) => sram.data_mut(),
        };

        if target.len() != data.len() {
            return Err(EmulatorError::InvalidSaveSize {
                expected: target.len(),
                got: data.len(),
            });
        }

        target.copy_from_slice(data);
        Ok(())
    }

    /// Whether the chip changed since the last flush
    pub fn is_dirty(&self) -> bool {
        match self {
            Backup::None => false,
            Backup::Eeprom(eeprom) => eeprom.is_dirty(),
            Backup::Flash(flash) => flash.is_dirty(),
            Backup::Sram(sram) => sram.is_dirty(),
        }
    }

    pub(crate) fn clear_dirty(&mut self) {
        match self {
            Backup::None => {}
            Backup::Eeprom(eeprom) => eeprom.clear_dirty(),
            Backup::Flash(flash) => flash.clear_dirty(),
            Backup::Sram(sram) => sram.clear_dirty(),
        }
    }
}
