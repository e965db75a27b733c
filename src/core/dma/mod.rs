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

//! DMA (Direct Memory Access) Controller
//!
//! The GBA has 4 general-purpose DMA channels that copy halfwords or
//! words between any two bus addresses without CPU involvement.
//!
//! # DMA Channels
//!
//! | Channel | Base Address | Special use                 |
//! |---------|--------------|-----------------------------|
//! | 0       | 0x040000B0   | -                           |
//! | 1       | 0x040000BC   | Sound FIFO                  |
//! | 2       | 0x040000C8   | Sound FIFO                  |
//! | 3       | 0x040000D4   | Cartridge EEPROM            |
//!
//! # Channel Registers
//!
//! - **SAD** (+0x00): Source address, write-only
//! - **DAD** (+0x04): Destination address, write-only
//! - **CNT_L** (+0x08): Transfer count, write-only (0 = maximum)
//! - **CNT_H** (+0x0A): Control
//!
//! # Control Register Format
//!
//! ```text
//! 15:    Enable
//! 14:    IRQ on completion
//! 13-12: Start timing (0=immediate, 1=V-Blank, 2=H-Blank, 3=special)
//! 10:    Transfer size (0=16-bit, 1=32-bit)
//! 9:     Repeat
//! 8-7:   Source control (0=inc, 1=dec, 2=fixed)
//! 6-5:   Destination control (0=inc, 1=dec, 2=fixed, 3=inc/reload)
//! ```
//!
//! Address and count registers are latched into internal copies on the
//! enable edge; transfers work on the internal copies.

#[cfg(test)]
mod tests;

use crate::core::interrupt::IrqFlags;
use crate::core::io::{lane16, set_lane16, set_lane32};
use crate::core::memory::{Backup, Bus};
use log::{debug, trace};

/// Register block stride per channel
const CHANNEL_STRIDE: u32 = 0x0c;

/// First DMA register offset
const DMA_BASE: u32 = 0xb0;

/// Control register bits
mod control {
    pub const REPEAT: u16 = 1 << 9;
    pub const WORD: u16 = 1 << 10;
    pub const IRQ: u16 = 1 << 14;
    pub const ENABLE: u16 = 1 << 15;
}

/// When a channel starts its transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaTiming {
    Immediate,
    VBlank,
    HBlank,
    /// Sound FIFO request for channels 1/2
    Special,
}

impl DmaTiming {
    fn from_control(control: u16) -> Self {
        match (control >> 12) & 3 {
            0 => DmaTiming::Immediate,
            1 => DmaTiming::VBlank,
            2 => DmaTiming::HBlank,
            _ => DmaTiming::Special,
        }
    }
}

/// Single DMA channel
#[derive(Debug, Clone, Copy, Default)]
pub struct DmaChannel {
    /// SAD as written
    source: u32,

    /// DAD as written
    dest: u32,

    /// CNT_L as written
    count: u16,

    /// CNT_H
    control: u16,

    /// Working source address
    internal_source: u32,

    /// Working destination address
    internal_dest: u32,

    /// Units left to transfer
    internal_count: u32,

    /// Channel number (0-3)
    id: usize,
}

impl DmaChannel {
    fn new(id: usize) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    #[inline(always)]
    pub fn enabled(&self) -> bool {
        self.control & control::ENABLE != 0
    }

    pub fn control(&self) -> u16 {
        self.control
    }

    pub fn timing(&self) -> DmaTiming {
        DmaTiming::from_control(self.control)
    }

    #[inline(always)]
    fn word_sized(&self) -> bool {
        self.control & control::WORD != 0
    }

    /// Transfer length in units, with 0 meaning the channel maximum
    fn transfer_count(&self) -> u32 {
        match (self.count, self.id) {
            (0, 3) => 0x10000,
            (0, _) => 0x4000,
            (count, _) => count as u32,
        }
    }

    /// Latch the internal registers on the enable edge
    fn latch(&mut self) {
        let align = if self.word_sized() { !3 } else { !1 };

        self.internal_source = self.source & align;
        self.internal_dest = self.dest & align;
        self.internal_count = self.transfer_count();
    }

    /// Source and destination step in bytes
    fn steps(&self) -> (i32, i32) {
        let unit = if self.word_sized() { 4 } else { 2 };

        let source = match (self.control >> 7) & 3 {
            0 => unit,
            1 => -unit,
            _ => 0,
        };
        let dest = match (self.control >> 5) & 3 {
            1 => -unit,
            2 => 0,
            _ => unit,
        };

        (source, dest)
    }
}

/// DMA Controller with 4 channels
///
/// # Examples
///
/// ```
/// use gbarx::core::dma::DmaController;
///
/// let mut dma = DmaController::new();
///
/// // CNT_L of channel 3 selects the EEPROM stream length
/// dma.write8(0xdc, 17);
/// assert_eq!(dma.eeprom_transfer_len(), 17);
/// ```
#[derive(Debug, Clone)]
pub struct DmaController {
    channels: [DmaChannel; 4],
}

impl DmaController {
    pub fn new() -> Self {
        Self {
            channels: [0, 1, 2, 3].map(DmaChannel::new),
        }
    }

    pub fn channel(&self, ch: usize) -> &DmaChannel {
        &self.channels[ch]
    }

    /// Split a register offset into (channel, offset within block)
    #[inline(always)]
    fn locate(offset: u32) -> (usize, u32) {
        let rel = offset - DMA_BASE;
        ((rel / CHANNEL_STRIDE) as usize, rel % CHANNEL_STRIDE)
    }

    /// Read one DMA register byte
    ///
    /// Addresses are write-only and the count reads as zero.
    pub fn read8(&self, offset: u32) -> Option<u8> {
        let (ch, reg) = Self::locate(offset);
        let channel = &self.channels[ch];

        match reg {
            0x08..=0x09 => Some(0),
            0x0a => Some(lane16(channel.control, 0) & 0xe0),
            0x0b => {
                let mask = if ch == 3 { 0xff } else { 0xf7 };
                Some(lane16(channel.control, 1) & mask)
            }
            _ => None,
        }
    }

    /// Write one DMA register byte
    ///
    /// # Returns
    ///
    /// true if a channel was just enabled, so immediate transfers must run
    pub fn write8(&mut self, offset: u32, value: u8) -> bool {
        let (ch, reg) = Self::locate(offset);
        let channel = &mut self.channels[ch];

        match reg {
            0x00..=0x03 => set_lane32(&mut channel.source, reg, value),
            0x04..=0x07 => set_lane32(&mut channel.dest, reg, value),
            0x08..=0x09 => set_lane16(&mut channel.count, reg, value),
            0x0a => set_lane16(&mut channel.control, 0, value),
            _ => {
                let was_enabled = channel.enabled();
                set_lane16(&mut channel.control, 1, value);

                if !was_enabled && channel.enabled() {
                    channel.latch();
                    debug!(
                        "DMA{} enabled: src=0x{:08X} dst=0x{:08X} count={} control=0x{:04X}",
                        ch,
                        channel.internal_source,
                        channel.internal_dest,
                        channel.internal_count,
                        channel.control
                    );
                    return true;
                }
            }
        }

        false
    }

    /// Length of the serial EEPROM stream, taken from channel 3's count
    pub fn eeprom_transfer_len(&self) -> u32 {
        self.channels[3].count as u32
    }
}

impl Default for DmaController {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Run every enabled channel whose start timing matches
    ///
    /// # Arguments
    ///
    /// * `timing` - The event that just occurred
    pub(crate) fn run_dma(&mut self, timing: DmaTiming) {
        for ch in 0..4 {
            let channel = self.dma.channels[ch];
            if !channel.enabled() || channel.timing() != timing {
                continue;
            }

            if ch == 3 {
                if let Backup::Eeprom(eeprom) = &mut self.backup {
                    eeprom.reset_index();
                }
            }

            let (source_step, dest_step) = channel.steps();
            let mut source = channel.internal_source;
            let mut dest = channel.internal_dest;

            trace!(
                "DMA{} {:?} transfer: 0x{:08X} -> 0x{:08X} x{}",
                ch,
                timing,
                source,
                dest,
                channel.internal_count
            );

            for _ in 0..channel.internal_count {
                if channel.word_sized() {
                    let value = self.read_word(source);
                    self.write_word(dest, value);
                } else {
                    let value = self.read_half(source) as u16;
                    self.write_half(dest, value);
                }

                source = source.wrapping_add_signed(source_step);
                dest = dest.wrapping_add_signed(dest_step);
            }

            let state = &mut self.dma.channels[ch];
            state.internal_source = source;
            state.internal_dest = dest;

            if state.control & control::REPEAT != 0 && timing != DmaTiming::Immediate {
                state.internal_count = state.transfer_count();

                if (state.control >> 5) & 3 == 3 {
                    let align = if state.word_sized() { !3 } else { !1 };
                    state.internal_dest = state.dest & align;
                }
            } else {
                state.control &= !control::ENABLE;
            }

            if channel.control & control::IRQ != 0 {
                self.raise_irq(IrqFlags::dma(ch));
            }
        }
    }

    /// Refill a sound FIFO from channel 1 or 2
    ///
    /// Moves 4 words to the channel's fixed destination regardless of
    /// its count and destination control.
    pub(crate) fn run_fifo_dma(&mut self, ch: usize) {
        let channel = self.dma.channels[ch];
        if !channel.enabled() || channel.timing() != DmaTiming::Special {
            return;
        }

        let source_step = match (channel.control >> 7) & 3 {
            0 => 4,
            1 => -4,
            _ => 0,
        };
        let mut source = channel.internal_source;

        for _ in 0..4 {
            let value = self.read_word(source);
            self.write_word(channel.internal_dest, value);
            source = source.wrapping_add_signed(source_step);
        }

        self.dma.channels[ch].internal_source = source;

        if channel.control & control::IRQ != 0 {
            self.raise_irq(IrqFlags::dma(ch));
        }
    }
}
