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

//! System integration module
//!
//! Ties the CPU and the bus together and drives them one scanline at a
//! time. Pixel output is delegated to a [`LineRenderer`], called once per
//! visible line with read access to the bus.

#[cfg(test)]
mod tests;

use std::path::Path;

use super::cpu::CPU;
use super::dma::DmaTiming;
use super::error::Result;
use super::interrupt::IrqFlags;
use super::io::dispstat;
use super::memory::Bus;

pub use super::io::Key;

/// Visible scanlines per frame
pub const LINES_VISIBLE: u16 = 160;

/// Total scanlines per frame, including V-Blank
pub const LINES_TOTAL: u16 = 228;

/// CPU cycles from the start of a line to H-Blank
pub const CYCLES_HDRAW: u32 = 1006;

/// CPU cycles spent in H-Blank
pub const CYCLES_HBLANK: u32 = 226;

/// CPU cycles per scanline
pub const CYCLES_PER_LINE: u32 = CYCLES_HDRAW + CYCLES_HBLANK;

/// CPU cycles per frame (280,896)
pub const CYCLES_PER_FRAME: u32 = CYCLES_PER_LINE * LINES_TOTAL as u32;

/// Scanline renderer
///
/// Called after the H-Draw slice of every visible line. Implementations
/// read VRAM, palette, OAM and the display registers through the bus.
pub trait LineRenderer {
    fn render_line(&mut self, line: u16, bus: &Bus);
}

/// Renderer that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl LineRenderer for NullRenderer {
    fn render_line(&mut self, _line: u16, _bus: &Bus) {}
}

/// Game Boy Advance system
///
/// # Components
/// - CPU: ARM7TDMI processor
/// - Bus: memory map, cartridge, save chip and every peripheral
///
/// # Example
/// ```no_run
/// use gbarx::core::system::{NullRenderer, System};
///
/// let mut system = System::new();
/// system.load_bios("gba_bios.bin").unwrap();
/// system.load_rom("game.gba").unwrap();
/// system.reset();
///
/// system.run_frame(&mut NullRenderer);
/// ```
pub struct System {
    /// CPU instance
    cpu: CPU,

    /// Memory bus
    bus: Bus,

    /// Total cycles executed
    cycles: u64,

    /// Frames completed since reset
    frame_count: u64,
}

impl System {
    /// Create a new System instance
    ///
    /// The CPU sits at the reset vector with an empty BIOS and no
    /// cartridge.
    pub fn new() -> Self {
        let mut bus = Bus::new();
        let mut cpu = CPU::new();
        cpu.reset(&mut bus);
        bus.set_cycles(0);

        Self {
            cpu,
            bus,
            cycles: 0,
            frame_count: 0,
        }
    }

    /// Load BIOS from file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a 16KB BIOS image
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the BIOS was loaded
    /// - `Err(EmulatorError)` if the file is missing or the wrong size
    pub fn load_bios(&mut self, path: &str) -> Result<()> {
        self.bus.load_bios(path)
    }

    /// Load a cartridge image from file
    ///
    /// Call [`System::reset`] afterwards to boot it.
    pub fn load_rom(&mut self, path: &str) -> Result<()> {
        self.bus.load_rom(path)
    }

    /// Load the save chip contents
    ///
    /// # Returns
    ///
    /// `Ok(false)` if the file does not exist or the cartridge has no
    /// save chip
    pub fn load_save<P: AsRef<Path>>(&mut self, path: P) -> Result<bool> {
        self.bus.load_save(path)
    }

    /// Write the save chip contents if they changed
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the file was written
    pub fn flush_save<P: AsRef<Path>>(&mut self, path: P) -> Result<bool> {
        self.bus.flush_save(path)
    }

    /// Reset the system to its power-on state
    ///
    /// Volatile memory and peripherals are cleared; BIOS, cartridge and
    /// save data are kept. Execution restarts at the reset vector.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.bus.set_cycles(0);

        self.cycles = 0;
        self.frame_count = 0;
    }

    /// Execute one CPU instruction
    ///
    /// Timers advance by the cycles consumed. A halted CPU idles for one
    /// cycle instead. The bus cycle counter is left as it was, so stepping
    /// does not shorten the next frame slice.
    ///
    /// # Returns
    /// Number of cycles consumed
    pub fn step(&mut self) -> u32 {
        let before = self.bus.cycles();

        let cycles = if self.bus.interrupts.is_halted() {
            1
        } else {
            self.cpu.step(&mut self.bus)
        };

        self.bus.clock_timers(cycles);
        self.bus.set_cycles(before);

        self.cycles += cycles as u64;
        cycles
    }

    /// Execute one frame
    ///
    /// Runs 228 scanlines of 1232 cycles. V-Blank starts at line 160;
    /// every visible line is handed to `renderer` once H-Draw ends.
    pub fn run_frame(&mut self, renderer: &mut dyn LineRenderer) {
        self.bus.io.set_dispstat_flags(dispstat::VBLANK, false);

        for line in 0..LINES_TOTAL {
            self.bus.io.set_vcount(line);
            self.bus
                .io
                .set_dispstat_flags(dispstat::HBLANK | dispstat::VCOUNT, false);

            if line == self.bus.io.vcount_setting() {
                self.display_event(dispstat::VCOUNT, dispstat::VCOUNT_IRQ, IrqFlags::VCOUNT);
            }

            if line == LINES_VISIBLE {
                self.bus.io.latch_affine_reference();
                self.display_event(dispstat::VBLANK, dispstat::VBLANK_IRQ, IrqFlags::VBLANK);
                self.bus.run_dma(DmaTiming::VBlank);
            }

            self.cpu.run(&mut self.bus, CYCLES_HDRAW);

            if line < LINES_VISIBLE {
                renderer.render_line(line, &self.bus);
                self.bus.run_dma(DmaTiming::HBlank);
            }

            self.display_event(dispstat::HBLANK, dispstat::HBLANK_IRQ, IrqFlags::HBLANK);

            self.cpu.run(&mut self.bus, CYCLES_HBLANK);
        }

        self.cycles += CYCLES_PER_FRAME as u64;
        self.frame_count += 1;
    }

    /// Raise a display status flag, requesting its IRQ if DISPSTAT
    /// enables it
    fn display_event(&mut self, flag: u16, irq_enable: u16, irq: IrqFlags) {
        if self.bus.io.dispstat() & irq_enable != 0 {
            self.bus.raise_irq(irq);
        }

        self.bus.io.set_dispstat_flags(flag, true);
    }

    /// Press or release a key
    pub fn set_key(&mut self, key: Key, pressed: bool) {
        self.bus.set_key(key, pressed);
    }

    /// Address of the next instruction to execute
    pub fn pc(&self) -> u32 {
        self.cpu.next_address()
    }

    /// Total cycles executed since reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Frames completed since reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}
