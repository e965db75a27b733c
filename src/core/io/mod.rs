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

//! Memory-mapped I/O register file
//!
//! All registers are accessed one byte at a time; wider bus accesses are
//! composed from byte accesses by the bus. Each register keeps its last
//! written value and applies a read mask, so write-only bits read back as
//! zero and write-only registers read as open bus.
//!
//! ## Register Ranges
//!
//! ```text
//! Offset      | Owner
//! ------------|--------------------------------------------
//! 0x000-0x057 | Display (DISPCNT, DISPSTAT, BG, window, blend)
//! 0x060-0x0A7 | Sound (PSG registers, wave RAM, FIFO A/B)
//! 0x0B0-0x0DF | DMA channels 0-3          (core::dma)
//! 0x100-0x10F | Timers 0-3                (core::timer)
//! 0x120-0x135 | Serial I/O and keypad
//! 0x200-0x20B | IE, IF, WAITCNT, IME      (core::interrupt)
//! 0x300-0x301 | POSTFLG, HALTCNT
//! ```

#[cfg(test)]
mod tests;

use crate::core::dma::DmaTiming;
use crate::core::interrupt::IrqFlags;
use crate::core::memory::Bus;
use log::debug;

/// DISPSTAT status flags
pub mod dispstat {
    /// V-Blank in progress (bit 0)
    pub const VBLANK: u16 = 1 << 0;
    /// H-Blank in progress (bit 1)
    pub const HBLANK: u16 = 1 << 1;
    /// VCOUNT matches the setting in bits 8-15 (bit 2)
    pub const VCOUNT: u16 = 1 << 2;
    /// V-Blank IRQ enable (bit 3)
    pub const VBLANK_IRQ: u16 = 1 << 3;
    /// H-Blank IRQ enable (bit 4)
    pub const HBLANK_IRQ: u16 = 1 << 4;
    /// VCOUNT match IRQ enable (bit 5)
    pub const VCOUNT_IRQ: u16 = 1 << 5;
}

/// SOUNDCNT_X master enable
const SOUND_MASTER_ENABLE: u8 = 1 << 7;

/// First sound register offset
const SOUND_BASE: u32 = 0x60;

/// Read masks for 0x060-0x08B; write-only bits read as zero
const SOUND_READ_MASK: [u8; 0x2c] = [
    0x7f, 0x00, 0xc0, 0xff, 0x00, 0x40, 0x00, 0x00, // 0x60 SOUND1CNT_L/H/X
    0xc0, 0xff, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, // 0x68 SOUND2CNT_L/H
    0xe0, 0x00, 0x00, 0xe0, 0x00, 0x40, 0x00, 0x00, // 0x70 SOUND3CNT_L/H/X
    0x00, 0xff, 0x00, 0x00, 0xff, 0x40, 0x00, 0x00, // 0x78 SOUND4CNT_L/H
    0x77, 0xff, 0x0f, 0x77, 0x8f, 0x00, 0x00, 0x00, // 0x80 SOUNDCNT_L/H/X
    0xff, 0xc3, 0x00, 0x00, // 0x88 SOUNDBIAS
];

/// Keypad buttons, by KEYINPUT bit position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Right = 4,
    Left = 5,
    Up = 6,
    Down = 7,
    R = 8,
    L = 9,
}

impl Key {
    /// KEYINPUT / KEYCNT bit for this key
    #[inline(always)]
    pub fn mask(self) -> u16 {
        1 << self as u16
    }
}

/// Byte lane `address & 1` of a 16-bit register
#[inline(always)]
pub(crate) fn lane16(value: u16, address: u32) -> u8 {
    (value >> ((address & 1) * 8)) as u8
}

/// Replace byte lane `address & 1` of a 16-bit register
#[inline(always)]
pub(crate) fn set_lane16(reg: &mut u16, address: u32, value: u8) {
    let shift = (address & 1) * 8;
    *reg = (*reg & !(0xff << shift)) | ((value as u16) << shift);
}

/// Byte lane `address & 3` of a 32-bit register
#[inline(always)]
pub(crate) fn lane32(value: u32, address: u32) -> u8 {
    (value >> ((address & 3) * 8)) as u8
}

/// Replace byte lane `address & 3` of a 32-bit register
#[inline(always)]
pub(crate) fn set_lane32(reg: &mut u32, address: u32, value: u8) {
    let shift = (address & 3) * 8;
    *reg = (*reg & !(0xff << shift)) | ((value as u32) << shift);
}

/// Display, sound, serial, keypad and system control registers
///
/// DMA, timer and interrupt registers live with their controllers.
#[derive(Debug, Clone)]
pub struct IoRegisters {
    dispcnt: u16,
    green_swap: u16,
    dispstat: u16,
    vcount: u16,

    bgcnt: [u16; 4],
    bghofs: [u16; 4],
    bgvofs: [u16; 4],

    /// PA, PB, PC, PD for BG2 and BG3
    bg_affine: [[u16; 4]; 2],
    /// Reference point (X, Y) as written, for BG2 and BG3
    bg_ref_external: [[u32; 2]; 2],
    /// Reference point (X, Y) used by the renderer, for BG2 and BG3
    bg_ref_internal: [[u32; 2]; 2],

    win_h: [u16; 2],
    win_v: [u16; 2],
    winin: u16,
    winout: u16,
    mosaic: u16,
    bldcnt: u16,
    bldalpha: u16,
    bldy: u16,

    /// Raw sound registers 0x060-0x08B
    sound: [u8; 0x2c],
    /// Two 16-byte wave RAM banks
    wave_ram: [u8; 0x20],

    sio_data32: u32,
    siocnt: u16,
    sio_data8: u8,
    rcnt: u16,

    keyinput: u16,
    keycnt: u16,

    waitcnt: u16,
    postflg: u8,
}

impl IoRegisters {
    /// Create the register file in its power-on state
    ///
    /// All keys are released (KEYINPUT is active low).
    pub fn new() -> Self {
        Self {
            dispcnt: 0,
            green_swap: 0,
            dispstat: 0,
            vcount: 0,
            bgcnt: [0; 4],
            bghofs: [0; 4],
            bgvofs: [0; 4],
            bg_affine: [[0x100, 0, 0, 0x100]; 2],
            bg_ref_external: [[0; 2]; 2],
            bg_ref_internal: [[0; 2]; 2],
            win_h: [0; 2],
            win_v: [0; 2],
            winin: 0,
            winout: 0,
            mosaic: 0,
            bldcnt: 0,
            bldalpha: 0,
            bldy: 0,
            sound: [0; 0x2c],
            wave_ram: [0; 0x20],
            sio_data32: 0,
            siocnt: 0,
            sio_data8: 0,
            rcnt: 0,
            keyinput: 0x3ff,
            keycnt: 0,
            waitcnt: 0,
            postflg: 0,
        }
    }

    /// Read one register byte
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset from 0x04000000
    ///
    /// # Returns
    ///
    /// The masked register byte, or `None` for unmapped and write-only
    /// registers (open bus).
    pub fn read8(&self, offset: u32) -> Option<u8> {
        let value = match offset {
            0x000..=0x001 => lane16(self.dispcnt, offset),
            0x002 => lane16(self.green_swap, offset) & 0x01,
            0x003 => 0,
            0x004..=0x005 => lane16(self.dispstat, offset),
            0x006 => lane16(self.vcount, offset),
            0x007 => 0,

            0x008..=0x00f => {
                let bg = ((offset - 0x008) >> 1) as usize;
                let mask = if bg < 2 && offset & 1 != 0 { 0xdf } else { 0xff };
                lane16(self.bgcnt[bg], offset) & mask
            }

            0x048..=0x049 => lane16(self.winin, offset) & 0x3f,
            0x04a..=0x04b => lane16(self.winout, offset) & 0x3f,

            0x050 => lane16(self.bldcnt, offset),
            0x051 => lane16(self.bldcnt, offset) & 0x3f,
            0x052..=0x053 => lane16(self.bldalpha, offset) & 0x1f,

            0x060..=0x08b => {
                let idx = (offset - SOUND_BASE) as usize;
                self.sound[idx] & SOUND_READ_MASK[idx]
            }

            0x090..=0x09f => self.wave_ram[self.wave_index(offset)],

            0x120..=0x123 => lane32(self.sio_data32, offset),
            0x128..=0x129 => lane16(self.siocnt, offset),
            0x12a => self.sio_data8,
            0x130 => lane16(self.keyinput, offset),
            0x131 => lane16(self.keyinput, offset) & 0x03,
            0x132 => lane16(self.keycnt, offset),
            0x133 => lane16(self.keycnt, offset) & 0xc3,
            0x134..=0x135 => lane16(self.rcnt, offset),

            0x204 => lane16(self.waitcnt, offset),
            0x205 => lane16(self.waitcnt, offset) & 0xdf,
            0x206..=0x207 => 0,

            0x300 => self.postflg & 0x01,
            0x301 => 0,

            _ => return None,
        };

        Some(value)
    }

    /// Write one register byte
    ///
    /// Side effects that reach other devices (FIFO reset, wait states,
    /// halting) are applied by the bus after this returns.
    pub fn write8(&mut self, offset: u32, value: u8) {
        match offset {
            0x000..=0x001 => set_lane16(&mut self.dispcnt, offset, value),
            0x002..=0x003 => set_lane16(&mut self.green_swap, offset, value),
            0x004 => {
                // Status flags are read-only
                let keep = self.dispstat & 0x47;
                set_lane16(&mut self.dispstat, offset, value & !0x47);
                self.dispstat |= keep;
            }
            0x005 => set_lane16(&mut self.dispstat, offset, value),

            0x008..=0x00f => set_lane16(&mut self.bgcnt[((offset - 0x008) >> 1) as usize], offset, value),
            0x010..=0x01f => {
                let bg = ((offset - 0x010) >> 2) as usize;
                if offset & 2 == 0 {
                    set_lane16(&mut self.bghofs[bg], offset, value);
                } else {
                    set_lane16(&mut self.bgvofs[bg], offset, value);
                }
            }

            0x020..=0x027 | 0x030..=0x037 => {
                let bg = ((offset - 0x020) >> 4) as usize;
                let param = ((offset & 7) >> 1) as usize;
                set_lane16(&mut self.bg_affine[bg][param], offset, value);
            }
            0x028..=0x02f | 0x038..=0x03f => {
                // Writing a reference point also reloads the internal latch
                let bg = ((offset - 0x028) >> 4) as usize;
                let axis = ((offset >> 2) & 1) as usize;
                set_lane32(&mut self.bg_ref_external[bg][axis], offset, value);
                set_lane32(&mut self.bg_ref_internal[bg][axis], offset, value);
            }

            0x040..=0x043 => set_lane16(&mut self.win_h[((offset >> 1) & 1) as usize], offset, value),
            0x044..=0x047 => set_lane16(&mut self.win_v[((offset >> 1) & 1) as usize], offset, value),
            0x048..=0x049 => set_lane16(&mut self.winin, offset, value),
            0x04a..=0x04b => set_lane16(&mut self.winout, offset, value),
            0x04c..=0x04d => set_lane16(&mut self.mosaic, offset, value),
            0x050..=0x051 => set_lane16(&mut self.bldcnt, offset, value),
            0x052..=0x053 => set_lane16(&mut self.bldalpha, offset, value),
            0x054..=0x055 => set_lane16(&mut self.bldy, offset, value),

            0x060..=0x081 => {
                if self.sound_enabled() {
                    self.sound[(offset - SOUND_BASE) as usize] = value;

                    // Trigger bit restarts the channel and marks it active
                    if matches!(offset, 0x065 | 0x06d | 0x075 | 0x07d) && value & 0x80 != 0 {
                        let channel = (offset - 0x065) >> 3;
                        self.sound[(0x084 - SOUND_BASE) as usize] |= 1 << channel;
                    }
                }
            }
            0x082..=0x083 => self.sound[(offset - SOUND_BASE) as usize] = value,
            0x084 => {
                let idx = (offset - SOUND_BASE) as usize;
                self.sound[idx] = (self.sound[idx] & 0x0f) | (value & !0x0f);

                if value & SOUND_MASTER_ENABLE == 0 {
                    self.sound[..=(0x081 - SOUND_BASE) as usize].fill(0);
                    self.sound[idx] = 0;
                }
            }
            0x085..=0x08b => self.sound[(offset - SOUND_BASE) as usize] = value,

            0x090..=0x09f => {
                let idx = self.wave_index(offset);
                self.wave_ram[idx] = value;
            }

            0x120..=0x123 => set_lane32(&mut self.sio_data32, offset, value),
            0x128..=0x129 => set_lane16(&mut self.siocnt, offset, value),
            0x12a => self.sio_data8 = value,
            0x132..=0x133 => set_lane16(&mut self.keycnt, offset, value),
            0x134..=0x135 => set_lane16(&mut self.rcnt, offset, value),

            0x204..=0x205 => set_lane16(&mut self.waitcnt, offset, value),

            0x300 => self.postflg = value,

            _ => {}
        }
    }

    /// Wave RAM index; the CPU sees the bank not selected for playback
    #[inline(always)]
    fn wave_index(&self, offset: u32) -> usize {
        let bank = ((self.sound[(0x070 - SOUND_BASE) as usize] as usize) >> 2) & 0x10;
        (bank ^ 0x10) | (offset as usize & 0xf)
    }

    /// Whether SOUNDCNT_X master enable is set
    pub fn sound_enabled(&self) -> bool {
        self.sound[(0x084 - SOUND_BASE) as usize] & SOUND_MASTER_ENABLE != 0
    }

    /// SOUNDCNT_H (DMA sound control)
    pub fn soundcnt_h(&self) -> u16 {
        let idx = (0x082 - SOUND_BASE) as usize;
        self.sound[idx] as u16 | (self.sound[idx + 1] as u16) << 8
    }

    pub fn dispcnt(&self) -> u16 {
        self.dispcnt
    }

    pub fn dispstat(&self) -> u16 {
        self.dispstat
    }

    pub fn vcount(&self) -> u16 {
        self.vcount
    }

    pub(crate) fn set_vcount(&mut self, line: u16) {
        self.vcount = line;
    }

    /// Set or clear DISPSTAT status flags
    pub(crate) fn set_dispstat_flags(&mut self, flags: u16, set: bool) {
        if set {
            self.dispstat |= flags;
        } else {
            self.dispstat &= !flags;
        }
    }

    /// VCOUNT compare value (DISPSTAT bits 8-15)
    pub fn vcount_setting(&self) -> u16 {
        self.dispstat >> 8
    }

    pub fn bg_control(&self, bg: usize) -> u16 {
        self.bgcnt[bg]
    }

    /// Horizontal and vertical scroll for a text background
    pub fn bg_scroll(&self, bg: usize) -> (u16, u16) {
        (self.bghofs[bg] & 0x1ff, self.bgvofs[bg] & 0x1ff)
    }

    /// Affine parameters (PA, PB, PC, PD) for BG2 (`bg = 2`) or BG3
    pub fn bg_affine(&self, bg: usize) -> [i16; 4] {
        self.bg_affine[bg - 2].map(|p| p as i16)
    }

    /// Internal reference point for BG2 or BG3, as signed 20.8 fixed point
    pub fn bg_reference(&self, bg: usize) -> (i32, i32) {
        let [x, y] = self.bg_ref_internal[bg - 2];
        (sign_extend_28(x), sign_extend_28(y))
    }

    /// Copy the written reference points into the internal latches
    ///
    /// Happens at the start of V-Blank.
    pub(crate) fn latch_affine_reference(&mut self) {
        self.bg_ref_internal = self.bg_ref_external;
    }

    pub fn waitcnt(&self) -> u16 {
        self.waitcnt
    }

    pub fn keyinput(&self) -> u16 {
        self.keyinput
    }

    pub fn wave_ram(&self) -> &[u8] {
        &self.wave_ram
    }

    /// Press or release a key
    pub(crate) fn set_key(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.keyinput &= !key.mask();
        } else {
            self.keyinput |= key.mask();
        }
    }

    /// Whether the KEYCNT interrupt condition holds
    fn keypad_irq_condition(&self) -> bool {
        if self.keycnt & (1 << 14) == 0 {
            return false;
        }

        let selected = self.keycnt & 0x3ff;
        let pressed = !self.keyinput & 0x3ff & selected;

        if self.keycnt & (1 << 15) != 0 {
            selected != 0 && pressed == selected
        } else {
            pressed != 0
        }
    }
}

impl Default for IoRegisters {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
fn sign_extend_28(value: u32) -> i32 {
    ((value << 4) as i32) >> 4
}

impl Bus {
    /// Read one I/O register byte
    ///
    /// # Returns
    ///
    /// `None` for unmapped registers, which read as open bus.
    pub(crate) fn io_read8(&mut self, address: u32) -> Option<u8> {
        let offset = address & 0x00ff_ffff;

        match offset {
            0x0b0..=0x0df => self.dma.read8(offset),
            0x100..=0x10f => self.timers.read8(offset),
            0x200..=0x203 | 0x208..=0x20b => self.interrupts.read8(offset),
            _ => self.io.read8(offset),
        }
    }

    /// Write one I/O register byte and apply its side effects
    pub(crate) fn io_write8(&mut self, address: u32, value: u8) {
        let offset = address & 0x00ff_ffff;

        match offset {
            0x0a0..=0x0a7 => self.fifos.write8(offset, value),
            0x0b0..=0x0df => {
                if self.dma.write8(offset, value) {
                    self.run_dma(DmaTiming::Immediate);
                }
            }
            0x100..=0x10f => self.timers.write8(offset, value),
            0x200..=0x203 | 0x208..=0x20b => self.interrupts.write8(offset, value),
            0x204..=0x207 => {
                self.io.write8(offset, value);
                self.update_waitstates();
            }
            0x301 => {
                debug!("HALTCNT written, halting CPU");
                self.interrupts.halt();
            }
            _ => {
                self.io.write8(offset, value);

                if offset == 0x083 {
                    if value & 0x08 != 0 {
                        self.fifos.a.reset();
                    }
                    if value & 0x80 != 0 {
                        self.fifos.b.reset();
                    }
                }
            }
        }
    }

    /// Press or release a key, raising the keypad IRQ when KEYCNT matches
    pub fn set_key(&mut self, key: Key, pressed: bool) {
        self.io.set_key(key, pressed);

        if self.io.keypad_irq_condition() {
            self.raise_irq(IrqFlags::KEYPAD);
        }
    }
}
