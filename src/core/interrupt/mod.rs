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

//! GBA Interrupt Controller Implementation
//!
//! The interrupt controller collects requests from the display, timers,
//! DMA, keypad and serial hardware and signals the CPU when an enabled
//! request is pending and the master enable is set.
//!
//! ## Registers
//!
//! - **IE** (0x04000200): Interrupt enable register (R/W)
//! - **IF** (0x04000202): Interrupt request flags (R/W)
//!   - Reading returns current request flags
//!   - Writing 1 to a bit acknowledges that request (clears the bit)
//!   - Writing 0 to a bit has no effect
//! - **IME** (0x04000208): Interrupt master enable, bit 0 (R/W)
//!
//! ## Interrupt Sources (Bit Positions)
//!
//! ```text
//! Bit  | Source        | Description
//! -----|---------------|----------------------------------
//! 0    | VBLANK        | LCD vertical blank
//! 1    | HBLANK        | LCD horizontal blank
//! 2    | VCOUNT        | LCD vertical counter match
//! 3-6  | TIMER0-3      | Timer overflow
//! 7    | SERIAL        | Serial communication
//! 8-11 | DMA0-3        | DMA transfer complete
//! 12   | KEYPAD        | Keypad condition met
//! 13   | GAMEPAK       | Cartridge removed
//! 14-15| -             | Not used
//! ```
//!
//! Any request clears the halt state, even when it is not enabled.

#[cfg(test)]
mod tests;

use crate::core::io::{lane16, set_lane16};
use crate::core::memory::Bus;
use bitflags::bitflags;

bitflags! {
    /// Interrupt source bit flags as laid out in IE and IF
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IrqFlags: u16 {
        const VBLANK = 1 << 0;
        const HBLANK = 1 << 1;
        const VCOUNT = 1 << 2;
        const TIMER0 = 1 << 3;
        const TIMER1 = 1 << 4;
        const TIMER2 = 1 << 5;
        const TIMER3 = 1 << 6;
        const SERIAL = 1 << 7;
        const DMA0 = 1 << 8;
        const DMA1 = 1 << 9;
        const DMA2 = 1 << 10;
        const DMA3 = 1 << 11;
        const KEYPAD = 1 << 12;
        const GAMEPAK = 1 << 13;
    }
}

impl IrqFlags {
    /// Overflow flag for timer `idx` (0-3)
    #[inline(always)]
    pub fn timer(idx: usize) -> Self {
        Self::from_bits_truncate(Self::TIMER0.bits() << idx)
    }

    /// Completion flag for DMA channel `ch` (0-3)
    #[inline(always)]
    pub fn dma(ch: usize) -> Self {
        Self::from_bits_truncate(Self::DMA0.bits() << ch)
    }
}

/// GBA Interrupt Controller
///
/// Holds IE, IF, IME and the CPU halt state set by HALTCNT.
///
/// # Example
///
/// ```
/// use gbarx::core::interrupt::{InterruptController, IrqFlags};
///
/// let mut ic = InterruptController::new();
///
/// ic.request(IrqFlags::VBLANK);
/// ic.set_enable(IrqFlags::VBLANK);
/// ic.set_master(true);
/// assert!(ic.is_pending());
///
/// ic.acknowledge(IrqFlags::VBLANK);
/// assert!(!ic.is_pending());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InterruptController {
    /// IE (0x04000200)
    enable: u16,

    /// IF (0x04000202)
    flags: u16,

    /// IME (0x04000208)
    master: u32,

    /// Set by writing HALTCNT, cleared by any request
    halted: bool,
}

impl InterruptController {
    /// Create a new interrupt controller with everything disabled
    pub fn new() -> Self {
        Self {
            enable: 0,
            flags: 0,
            master: 0,
            halted: false,
        }
    }

    /// Request an interrupt
    ///
    /// Sets the request bit(s) in IF and wakes a halted CPU.
    pub fn request(&mut self, irq: IrqFlags) {
        self.flags |= irq.bits();
        self.halted = false;
        log::trace!("IRQ requested: {:?}, IF=0x{:04X}", irq, self.flags);
    }

    /// Clear request bits (IF write-one-to-clear)
    pub fn acknowledge(&mut self, irq: IrqFlags) {
        self.flags &= !irq.bits();
    }

    /// Whether the CPU should take an IRQ (before checking CPSR.I)
    ///
    /// # Returns
    ///
    /// true if IME bit 0 is set and (IE & IF) != 0
    #[inline(always)]
    pub fn is_pending(&self) -> bool {
        self.master & 1 != 0 && self.enable & self.flags != 0
    }

    pub fn enable(&self) -> IrqFlags {
        IrqFlags::from_bits_truncate(self.enable)
    }

    pub fn set_enable(&mut self, irq: IrqFlags) {
        self.enable = irq.bits();
    }

    pub fn flags(&self) -> IrqFlags {
        IrqFlags::from_bits_truncate(self.flags)
    }

    pub fn master_enabled(&self) -> bool {
        self.master & 1 != 0
    }

    pub fn set_master(&mut self, enabled: bool) {
        self.master = enabled as u32;
    }

    /// Halt the CPU until the next interrupt request
    pub fn halt(&mut self) {
        self.halted = true;
    }

    #[inline(always)]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Read one byte of IE, IF or IME
    pub fn read8(&self, offset: u32) -> Option<u8> {
        let value = match offset {
            0x200 => lane16(self.enable, offset),
            0x201 => lane16(self.enable, offset) & 0x3f,
            0x202 => lane16(self.flags, offset),
            0x203 => lane16(self.flags, offset) & 0x3f,
            0x208 => self.master as u8 & 0x01,
            0x209..=0x20b => 0,
            _ => return None,
        };

        Some(value)
    }

    /// Write one byte of IE, IF or IME
    ///
    /// Bytes written to IF acknowledge the set bits.
    pub fn write8(&mut self, offset: u32, value: u8) {
        match offset {
            0x200..=0x201 => set_lane16(&mut self.enable, offset, value),
            0x202..=0x203 => self.flags &= !((value as u16) << ((offset & 1) * 8)),
            0x208..=0x20b => {
                let shift = (offset & 3) * 8;
                self.master = (self.master & !(0xff << shift)) | ((value as u32) << shift);
            }
            _ => {}
        }
    }
}

impl Bus {
    /// Raise an interrupt request
    ///
    /// # Arguments
    ///
    /// * `irq` - Source flag(s) to set in IF
    pub fn raise_irq(&mut self, irq: IrqFlags) {
        self.interrupts.request(irq);
    }
}
