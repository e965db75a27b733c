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

//! Memory bus implementation for the Game Boy Advance
//!
//! The Bus is the central component for every memory operation in the
//! emulator. It decodes an address into a region, routes the access to
//! the backing store or peripheral, and charges the wait-state cost of the
//! access to its cycle counter.
//!
//! # Memory Map
//!
//! | Address Range         | Region          | Size    | Bus width |
//! |-----------------------|-----------------|---------|-----------|
//! | 0x00000000-0x00003FFF | BIOS            | 16KB    | 32        |
//! | 0x02000000-0x0203FFFF | EWRAM           | 256KB   | 16        |
//! | 0x03000000-0x03007FFF | IWRAM           | 32KB    | 32        |
//! | 0x04000000-0x040003FE | I/O registers   | -       | 32        |
//! | 0x05000000-0x050003FF | Palette RAM     | 1KB     | 16        |
//! | 0x06000000-0x06017FFF | VRAM            | 96KB    | 16        |
//! | 0x07000000-0x070003FF | OAM             | 1KB     | 32        |
//! | 0x08000000-0x0DFFFFFF | Cartridge ROM   | ≤32MB   | 16        |
//! | 0x0E000000-0x0E00FFFF | Save chip       | ≤128KB  | 8         |
//!
//! Smaller regions mirror across their 16MB window. Any address without a
//! backing store reads the most recently prefetched opcode (open bus).
//!
//! # Example
//!
//! ```
//! use gbarx::core::memory::{Access, Bus};
//!
//! let mut bus = Bus::new();
//!
//! bus.write32(0x0300_0000, 0x1234_5678, Access::NonSequential);
//!
//! // IWRAM mirrors every 32KB
//! assert_eq!(bus.read32(0x0300_8000, Access::NonSequential), 0x1234_5678);
//! ```

mod backup;
mod region;
mod waitstate;

#[cfg(test)]
mod tests;

pub use backup::{Backup, Eeprom, Flash, FlashSize, Sram};
pub use region::MemoryRegion;
pub use waitstate::WaitStates;

use crate::core::dma::DmaController;
use crate::core::error::{EmulatorError, Result};
use crate::core::interrupt::InterruptController;
use crate::core::io::IoRegisters;
use crate::core::sound_fifo::SoundFifos;
use crate::core::timer::Timers;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Bus access classification
///
/// Sequential accesses continue from the previous access on the same
/// region and pay the cheaper wait state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    NonSequential,
    Sequential,
}

/// Bus width per address top nibble, in bytes
///
/// A wider access on a narrower bus is split into two halves.
const BUS_WIDTH: [u32; 16] = [4, 4, 2, 4, 4, 2, 2, 4, 2, 2, 2, 2, 2, 2, 1, 1];

/// Memory bus managing all memory accesses
///
/// The Bus owns every addressable store and every memory-mapped peripheral
/// so that DMA, timers and the register file can interact without shared
/// ownership. The CPU borrows it mutably for the duration of each step.
pub struct Bus {
    /// BIOS ROM (16KB)
    bios: Vec<u8>,

    /// On-board work RAM (256KB, 16-bit bus, 2 wait states)
    ewram: Vec<u8>,

    /// In-chip work RAM (32KB, 32-bit bus)
    iwram: Vec<u8>,

    /// Palette RAM (1KB)
    pram: Vec<u8>,

    /// RGBA expansion of palette RAM, one entry per colour
    palette: Vec<u32>,

    /// Video RAM (96KB)
    vram: Vec<u8>,

    /// Object attribute memory (1KB)
    oam: Vec<u8>,

    /// Cartridge ROM image
    rom: Vec<u8>,

    /// Cartridge save chip
    pub(crate) backup: Backup,

    /// Display, sound, serial and system control registers
    pub(crate) io: IoRegisters,

    /// IE / IF / IME and halt state
    pub(crate) interrupts: InterruptController,

    /// Four DMA channels
    pub(crate) dma: DmaController,

    /// Four cascading timers
    pub(crate) timers: Timers,

    /// Direct sound FIFOs A and B
    pub(crate) fifos: SoundFifos,

    /// Cached cartridge wait states derived from WAITCNT
    waitstates: WaitStates,

    /// Cycles accrued in the current execution slice
    cycles: u32,

    /// Last opcode fetched from the BIOS
    bios_op: u32,

    /// Most recently prefetched opcode, returned by open-bus reads
    open_bus: u32,

    /// Address of the most recent prefetch
    fetch_pc: u32,
}

impl Bus {
    /// BIOS size (16KB)
    pub const BIOS_SIZE: usize = 16 * 1024;

    /// EWRAM size (256KB)
    const EWRAM_SIZE: usize = 256 * 1024;

    /// IWRAM size (32KB)
    const IWRAM_SIZE: usize = 32 * 1024;

    /// Palette RAM size (1KB)
    const PRAM_SIZE: usize = 1024;

    /// VRAM size (96KB)
    const VRAM_SIZE: usize = 96 * 1024;

    /// OAM size (1KB)
    const OAM_SIZE: usize = 1024;

    /// Largest supported cartridge image (32MB)
    pub const MAX_ROM_SIZE: usize = 32 * 1024 * 1024;

    /// Cartridges above this size only map EEPROM at 0x0DFFFF00
    const LARGE_ROM_SIZE: usize = 16 * 1024 * 1024;

    /// Create a new Bus instance
    ///
    /// All memory is zeroed, no cartridge is inserted and the wait states
    /// reflect WAITCNT = 0.
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::Bus;
    ///
    /// let bus = Bus::new();
    /// assert_eq!(bus.cycles(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            bios: vec![0u8; Self::BIOS_SIZE],
            ewram: vec![0u8; Self::EWRAM_SIZE],
            iwram: vec![0u8; Self::IWRAM_SIZE],
            pram: vec![0u8; Self::PRAM_SIZE],
            palette: vec![0u32; Self::PRAM_SIZE / 2],
            vram: vec![0u8; Self::VRAM_SIZE],
            oam: vec![0u8; Self::OAM_SIZE],
            rom: Vec::new(),
            backup: Backup::None,
            io: IoRegisters::new(),
            interrupts: InterruptController::new(),
            dma: DmaController::new(),
            timers: Timers::new(),
            fifos: SoundFifos::new(),
            waitstates: WaitStates::from_waitcnt(0),
            cycles: 0,
            bios_op: 0,
            open_bus: 0,
            fetch_pc: 0,
        }
    }

    /// Reset the bus to its power-on state
    ///
    /// Clears volatile memory and peripheral registers. BIOS, cartridge ROM
    /// and save chip contents are preserved.
    pub fn reset(&mut self) {
        self.ewram.fill(0);
        self.iwram.fill(0);
        self.pram.fill(0);
        self.palette.fill(0);
        self.vram.fill(0);
        self.oam.fill(0);
        self.io = IoRegisters::new();
        self.interrupts = InterruptController::new();
        self.dma = DmaController::new();
        self.timers = Timers::new();
        self.fifos = SoundFifos::new();
        self.waitstates = WaitStates::from_waitcnt(0);
        self.cycles = 0;
        self.bios_op = 0;
        self.open_bus = 0;
        self.fetch_pc = 0;
    }

    /// Load BIOS from file
    ///
    /// The file must be exactly 16KB.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the BIOS file
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the BIOS was loaded
    /// - `Err(EmulatorError::BiosNotFound)` if the file cannot be opened
    /// - `Err(EmulatorError::InvalidBiosSize)` if the size is wrong
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gbarx::core::memory::Bus;
    ///
    /// let mut bus = Bus::new();
    /// bus.load_bios("gba_bios.bin").unwrap();
    /// ```
    pub fn load_bios(&mut self, path: &str) -> Result<()> {
        let mut file =
            File::open(path).map_err(|_| EmulatorError::BiosNotFound(path.to_string()))?;

        let metadata = file.metadata()?;

        if metadata.len() != Self::BIOS_SIZE as u64 {
            return Err(EmulatorError::InvalidBiosSize {
                expected: Self::BIOS_SIZE,
                got: metadata.len() as usize,
            });
        }

        file.read_exact(&mut self.bios)?;

        info!("Loaded BIOS from {}", path);

        Ok(())
    }

    /// Load BIOS contents from memory
    ///
    /// # Returns
    ///
    /// `Err(EmulatorError::InvalidBiosSize)` unless `data` is exactly 16KB.
    pub fn load_bios_data(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != Self::BIOS_SIZE {
            return Err(EmulatorError::InvalidBiosSize {
                expected: Self::BIOS_SIZE,
                got: data.len(),
            });
        }
        self.bios.copy_from_slice(data);
        Ok(())
    }

    /// Load a cartridge image from file
    ///
    /// Images larger than 32MB are truncated. The save chip type is
    /// detected from the image contents.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the ROM file
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the ROM was loaded
    /// - `Err(EmulatorError::RomNotFound)` if the file cannot be opened
    /// - `Err(EmulatorError::EmptyRom)` if the file is empty
    pub fn load_rom(&mut self, path: &str) -> Result<()> {
        let mut file =
            File::open(path).map_err(|_| EmulatorError::RomNotFound(path.to_string()))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        if data.is_empty() {
            return Err(EmulatorError::EmptyRom(path.to_string()));
        }

        info!("Loaded ROM from {} ({} bytes)", path, data.len());

        self.load_rom_data(data);

        Ok(())
    }

    /// Insert a cartridge image held in memory
    ///
    /// Applies the same truncation and save detection as [`Bus::load_rom`].
    pub fn load_rom_data(&mut self, mut data: Vec<u8>) {
        if data.len() > Self::MAX_ROM_SIZE {
            warn!(
                "ROM is {} bytes, truncating to {} bytes",
                data.len(),
                Self::MAX_ROM_SIZE
            );
            data.truncate(Self::MAX_ROM_SIZE);
        }

        self.backup = Backup::detect(&data);
        debug!("Save chip: {}", self.backup.kind());

        self.rom = data;
    }

    /// Load save chip contents from a file
    ///
    /// A missing file is not an error: the cartridge simply starts blank.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if save data was loaded
    /// - `Ok(false)` if there is no save chip or no file
    /// - `Err(EmulatorError)` if the file cannot be read or has the wrong size
    pub fn load_save<P: AsRef<Path>>(&mut self, path: P) -> Result<bool> {
        let path = path.as_ref();

        if matches!(self.backup, Backup::None) {
            return Ok(false);
        }

        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No save file at {}, starting blank", path.display());
                return Ok(false);
            }
            Err(source) => {
                return Err(EmulatorError::SaveFile {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        self.backup.load(&data)?;
        info!("Loaded save data from {}", path.display());

        Ok(true)
    }

    /// Write save chip contents to a file if they changed
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the file was written
    /// - `Ok(false)` if there was nothing to write
    pub fn flush_save<P: AsRef<Path>>(&mut self, path: P) -> Result<bool> {
        let path = path.as_ref();

        if !self.backup.is_dirty() {
            return Ok(false);
        }

        if let Some(data) = self.backup.data() {
            fs::write(path, data).map_err(|source| EmulatorError::SaveFile {
                path: path.to_path_buf(),
                source,
            })?;
            self.backup.clear_dirty();
            info!("Wrote save data to {}", path.display());
            return Ok(true);
        }

        Ok(false)
    }

    /// Cycles accrued since the start of the current execution slice
    #[inline(always)]
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Charge internal (non-bus) cycles
    #[inline(always)]
    pub fn add_cycles(&mut self, cycles: u32) {
        self.cycles += cycles;
    }

    #[inline(always)]
    pub(crate) fn set_cycles(&mut self, cycles: u32) {
        self.cycles = cycles;
    }

    /// Current cartridge wait states
    pub fn waitstates(&self) -> &WaitStates {
        &self.waitstates
    }

    /// Recompute the wait-state tables after a WAITCNT write
    pub(crate) fn update_waitstates(&mut self) {
        self.waitstates = WaitStates::from_waitcnt(self.io.waitcnt());
    }

    /// Last opcode latched by the prefetcher
    pub fn open_bus(&self) -> u32 {
        self.open_bus
    }

    /// Palette RAM
    pub fn pram(&self) -> &[u8] {
        &self.pram
    }

    /// Palette as packed RGBA (`0xBBGGRRAA` in little-endian byte order)
    pub fn palette(&self) -> &[u32] {
        &self.palette
    }

    /// Video RAM
    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    /// Object attribute memory
    pub fn oam(&self) -> &[u8] {
        &self.oam
    }

    /// Display and sound registers
    pub fn io(&self) -> &IoRegisters {
        &self.io
    }

    /// Mutable access to the display and sound registers
    pub fn io_mut(&mut self) -> &mut IoRegisters {
        &mut self.io
    }

    /// Interrupt controller
    pub fn interrupts(&self) -> &InterruptController {
        &self.interrupts
    }

    /// Direct sound FIFOs
    pub fn fifos(&self) -> &SoundFifos {
        &self.fifos
    }

    /// Cartridge save chip
    pub fn backup(&self) -> &Backup {
        &self.backup
    }

    /// Size of the loaded cartridge image in bytes
    pub fn rom_size(&self) -> usize {
        self.rom.len()
    }

    // === Timing ===

    /// Charge a single bus access
    fn access_cycles(&mut self, address: u32, access: Access) {
        let mut cycles = 1;

        if address & 0x0800_0000 != 0 {
            let idx = ((address >> 25) & 3) as usize;
            cycles += match access {
                Access::NonSequential => self.waitstates.n[idx],
                Access::Sequential => self.waitstates.s[idx],
            };
        } else if address >> 24 == 0x02 {
            cycles += 2;
        }

        self.cycles += cycles;
    }

    /// Charge an access of `size` bytes, splitting it on narrow buses
    fn charge(&mut self, address: u32, size: u32, access: Access) {
        let width = BUS_WIDTH[((address >> 24) & 0xf) as usize];

        if width < size {
            self.access_cycles(address, access);
            self.access_cycles(address.wrapping_add(2), Access::Sequential);
        } else {
            self.access_cycles(address, access);
        }
    }

    /// Convert the sequential cost of the last prefetch into a non-sequential one
    ///
    /// Instructions with internal cycles break the sequential burst of the
    /// cartridge prefetcher, so the next code fetch from ROM pays the N cost.
    ///
    /// # Arguments
    ///
    /// * `pc` - Current program counter
    /// * `thumb` - Whether the CPU is in Thumb state
    pub fn seq_to_nonseq(&mut self, pc: u32, thumb: bool) {
        if pc & 0x0800_0000 != 0 {
            let idx = ((pc >> 25) & 3) as usize;
            let (n, s) = if thumb {
                (self.waitstates.n_thumb[idx], self.waitstates.s_thumb[idx])
            } else {
                (self.waitstates.n_arm[idx], self.waitstates.s_arm[idx])
            };
            self.cycles = self.cycles + n - s;
        }
    }

    // === Instruction fetch ===

    /// Fetch a 16-bit Thumb opcode
    ///
    /// Code fetches use per-region costs that differ from data reads, and
    /// latch the opcode for open-bus reads.
    pub fn fetch16(&mut self, address: u32, access: Access) -> u32 {
        self.fetch_pc = address;

        let value = match address >> 24 {
            0x00 => {
                self.cycles += 1;
                let v = read_u16(&self.bios, (address & 0x3ffe) as usize);
                self.bios_op = v | (v << 16);
                v
            }
            0x02 => {
                self.cycles += 3;
                read_u16(&self.ewram, (address & 0x3fffe) as usize)
            }
            0x03 => {
                self.cycles += 1;
                read_u16(&self.iwram, (address & 0x7ffe) as usize)
            }
            0x05 => {
                self.cycles += 1;
                read_u16(&self.pram, (address & 0x3fe) as usize)
            }
            0x06 => {
                self.cycles += 1;
                read_u16(&self.vram, vram_offset(address & !1))
            }
            0x07 => {
                self.cycles += 1;
                read_u16(&self.oam, (address & 0x3fe) as usize)
            }
            0x08..=0x0d => {
                let idx = ((address >> 25) & 3) as usize;
                self.cycles += match access {
                    Access::NonSequential => self.waitstates.n_thumb[idx],
                    Access::Sequential => self.waitstates.s_thumb[idx],
                };
                self.rom_half(address & !1)
            }
            _ => self.read16(address, access) & 0xffff,
        };

        self.open_bus = value | (value << 16);
        value
    }

    /// Fetch a 32-bit ARM opcode
    pub fn fetch32(&mut self, address: u32, access: Access) -> u32 {
        self.fetch_pc = address;

        let value = match address >> 24 {
            0x00 => {
                self.cycles += 1;
                let v = read_u32(&self.bios, (address & 0x3ffc) as usize);
                self.bios_op = v;
                v
            }
            0x02 => {
                self.cycles += 6;
                read_u32(&self.ewram, (address & 0x3fffc) as usize)
            }
            0x03 => {
                self.cycles += 1;
                read_u32(&self.iwram, (address & 0x7ffc) as usize)
            }
            0x05 => {
                self.cycles += 1;
                read_u32(&self.pram, (address & 0x3fc) as usize)
            }
            0x06 => {
                self.cycles += 1;
                read_u32(&self.vram, vram_offset(address & !3))
            }
            0x07 => {
                self.cycles += 1;
                read_u32(&self.oam, (address & 0x3fc) as usize)
            }
            0x08..=0x0d => {
                let idx = ((address >> 25) & 3) as usize;
                self.cycles += match access {
                    Access::NonSequential => self.waitstates.n_arm[idx],
                    Access::Sequential => self.waitstates.s_arm[idx],
                };
                let a = address & !3;
                self.rom_half(a) | (self.rom_half(a | 2) << 16)
            }
            _ => self.read32(address, access),
        };

        self.open_bus = value;
        value
    }

    // === Timed data access ===

    /// Read 8-bit value, charging bus cycles
    pub fn read8(&mut self, address: u32, access: Access) -> u8 {
        self.charge(address, 1, access);
        self.read_byte(address)
    }

    /// Read 16-bit value, charging bus cycles
    ///
    /// Misaligned reads return the aligned halfword rotated right by 8, as
    /// a 32-bit value.
    pub fn read16(&mut self, address: u32, access: Access) -> u32 {
        self.charge(address, 2, access);
        self.read_half(address)
    }

    /// Read 32-bit value, charging bus cycles
    ///
    /// Misaligned reads return the aligned word rotated right by the
    /// misalignment.
    pub fn read32(&mut self, address: u32, access: Access) -> u32 {
        self.charge(address, 4, access);
        self.read_word(address)
    }

    /// Write 8-bit value, charging bus cycles
    pub fn write8(&mut self, address: u32, value: u8, access: Access) {
        self.charge(address, 1, access);
        self.write_byte(address, value);
    }

    /// Write 16-bit value, charging bus cycles
    pub fn write16(&mut self, address: u32, value: u16, access: Access) {
        self.charge(address, 2, access);
        self.write_half(address, value);
    }

    /// Write 32-bit value, charging bus cycles
    pub fn write32(&mut self, address: u32, value: u32, access: Access) {
        self.charge(address, 4, access);
        self.write_word(address, value);
    }

    // === Untimed access (DMA and tests) ===

    /// Read 8-bit value without charging cycles
    pub fn read_byte(&mut self, address: u32) -> u8 {
        self.read_lane(address, true)
    }

    /// Read 16-bit value without charging cycles
    pub fn read_half(&mut self, address: u32) -> u32 {
        let a = address & !1;

        let value = if self.identify_region(a) == MemoryRegion::Backup {
            self.read_lane(address, true) as u32 * 0x0101
        } else {
            self.read_lane(a, true) as u32 | (self.read_lane(a | 1, false) as u32) << 8
        };

        value.rotate_right((address & 1) * 8)
    }

    /// Read 32-bit value without charging cycles
    pub fn read_word(&mut self, address: u32) -> u32 {
        let a = address & !3;

        let value = if self.identify_region(a) == MemoryRegion::Backup {
            self.read_lane(address, true) as u32 * 0x0101_0101
        } else {
            self.read_lane(a, true) as u32
                | (self.read_lane(a | 1, false) as u32) << 8
                | (self.read_lane(a | 2, false) as u32) << 16
                | (self.read_lane(a | 3, false) as u32) << 24
        };

        value.rotate_right((address & 3) * 8)
    }

    /// Write 8-bit value without charging cycles
    ///
    /// Byte writes to palette RAM and VRAM store the byte into both halves
    /// of the halfword. Byte writes to OAM are ignored.
    pub fn write_byte(&mut self, address: u32, value: u8) {
        match self.identify_region(address) {
            MemoryRegion::Oam => {}
            MemoryRegion::Palette | MemoryRegion::Vram => {
                let a = address & !1;
                self.write_lane(a, true, value);
                self.write_lane(a | 1, false, value);
            }
            _ => self.write_lane(address, true, value),
        }
    }

    /// Write 16-bit value without charging cycles
    pub fn write_half(&mut self, address: u32, value: u16) {
        if self.identify_region(address) == MemoryRegion::Backup {
            let lane = (address & 1) * 8;
            self.write_lane(address, true, (value >> lane) as u8);
            return;
        }

        let a = address & !1;
        self.write_lane(a, true, value as u8);
        self.write_lane(a | 1, false, (value >> 8) as u8);
    }

    /// Write 32-bit value without charging cycles
    pub fn write_word(&mut self, address: u32, value: u32) {
        if self.identify_region(address) == MemoryRegion::Backup {
            let lane = (address & 3) * 8;
            self.write_lane(address, true, (value >> lane) as u8);
            return;
        }

        let a = address & !3;
        self.write_lane(a, true, value as u8);
        self.write_lane(a | 1, false, (value >> 8) as u8);
        self.write_lane(a | 2, false, (value >> 16) as u8);
        self.write_lane(a | 3, false, (value >> 24) as u8);
    }

    // === Byte lanes ===

    /// Read one byte lane, falling back to open bus
    ///
    /// `first` marks the lowest lane of the access; the EEPROM only shifts
    /// its serial stream on that lane.
    fn read_lane(&mut self, address: u32, first: bool) -> u8 {
        match self.read_mapped(address, first) {
            Some(value) => value,
            None => (self.open_bus >> ((address & 3) * 8)) as u8,
        }
    }

    fn read_mapped(&mut self, address: u32, first: bool) -> Option<u8> {
        match self.identify_region(address) {
            MemoryRegion::Bios => {
                if (address | self.fetch_pc) < 0x4000 {
                    Some(self.bios[(address & 0x3fff) as usize])
                } else {
                    Some((self.bios_op >> ((address & 3) * 8)) as u8)
                }
            }
            MemoryRegion::Ewram => Some(self.ewram[(address & 0x3ffff) as usize]),
            MemoryRegion::Iwram => Some(self.iwram[(address & 0x7fff) as usize]),
            MemoryRegion::Io => self.io_read8(address),
            MemoryRegion::Palette => Some(self.pram[(address & 0x3ff) as usize]),
            MemoryRegion::Vram => Some(self.vram[vram_offset(address)]),
            MemoryRegion::Oam => Some(self.oam[(address & 0x3ff) as usize]),
            MemoryRegion::Rom => Some(self.rom_byte(address)),
            MemoryRegion::Eeprom => {
                if let Backup::Eeprom(eeprom) = &mut self.backup {
                    return Some(if first { eeprom.read_bit() } else { 0 });
                }
                Some(self.rom_byte(address))
            }
            MemoryRegion::Backup => Some(self.backup.read(address)),
            MemoryRegion::Unmapped => None,
        }
    }

    fn write_lane(&mut self, address: u32, first: bool, value: u8) {
        match self.identify_region(address) {
            MemoryRegion::Ewram => self.ewram[(address & 0x3ffff) as usize] = value,
            MemoryRegion::Iwram => self.iwram[(address & 0x7fff) as usize] = value,
            MemoryRegion::Io => self.io_write8(address, value),
            MemoryRegion::Palette => self.pram_write(address, value),
            MemoryRegion::Vram => self.vram[vram_offset(address)] = value,
            MemoryRegion::Oam => self.oam[(address & 0x3ff) as usize] = value,
            MemoryRegion::Eeprom => {
                if first {
                    let bits = self.dma.eeprom_transfer_len();
                    if matches!(self.backup, Backup::None) {
                        debug!("EEPROM access detected, attaching EEPROM");
                        self.backup = Backup::Eeprom(Eeprom::new());
                    }
                    if let Backup::Eeprom(eeprom) = &mut self.backup {
                        eeprom.write_bit(value, bits);
                    }
                }
            }
            MemoryRegion::Backup => self.backup.write(address, value),
            MemoryRegion::Bios | MemoryRegion::Rom | MemoryRegion::Unmapped => {}
        }
    }

    /// Store a palette byte and refresh its RGBA cache entry
    fn pram_write(&mut self, address: u32, value: u8) {
        self.pram[(address & 0x3ff) as usize] = value;

        let a = (address & 0x3fe) as usize;
        let pixel = self.pram[a] as u32 | (self.pram[a + 1] as u32) << 8;

        self.palette[a >> 1] = rgb555_to_rgba(pixel);
    }

    /// Cartridge ROM byte, or the address-derived pattern past the image end
    fn rom_byte(&self, address: u32) -> u8 {
        let offset = (address & 0x01ff_ffff) as usize;
        match self.rom.get(offset) {
            Some(&value) => value,
            None => ((address >> 1) >> ((address & 1) * 8)) as u8,
        }
    }

    fn rom_half(&self, address: u32) -> u32 {
        self.rom_byte(address) as u32 | (self.rom_byte(address | 1) as u32) << 8
    }

    /// Whether `address` falls in the EEPROM window for the loaded cartridge
    #[inline(always)]
    fn is_eeprom_window(&self, address: u32) -> bool {
        if self.rom.len() > Self::LARGE_ROM_SIZE {
            address >> 8 == 0x000d_ffff
        } else {
            address >> 24 == 0x0d
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

/// VRAM offset with the upper 32KB mirrored over the 96KB store
#[inline(always)]
fn vram_offset(address: u32) -> usize {
    let mask = if address & 0x10000 != 0 { 0x17fff } else { 0x1ffff };
    (address & mask) as usize
}

/// Expand a BGR555 colour to packed RGBA
///
/// Each 5-bit component is widened to 8 bits by replicating its top bits.
pub fn rgb555_to_rgba(pixel: u32) -> u32 {
    let r = (pixel & 0x1f) << 3;
    let g = ((pixel >> 5) & 0x1f) << 3;
    let b = ((pixel >> 10) & 0x1f) << 3;

    0xff | (r | (r >> 5)) << 8 | (g | (g >> 5)) << 16 | (b | (b >> 5)) << 24
}

#[inline(always)]
fn read_u16(mem: &[u8], offset: usize) -> u32 {
    mem[offset] as u32 | (mem[offset + 1] as u32) << 8
}

#[inline(always)]
fn read_u32(mem: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([mem[offset], mem[offset + 1], mem[offset + 2], mem[offset + 3]])
}
