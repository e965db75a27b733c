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

//! Single-register loads and address generation
//!
//! Address generation for single transfers is shared with the stores:
//!
//! - P (bit 24) set: pre-indexed, the offset is applied to the address
//! - P clear or W (bit 21) set: the base register is updated
//! - U (bit 23) selects add or subtract
//!
//! A load applies the base update before the access, so a load into the
//! base register keeps the loaded value.

use super::super::decode::Offset;
use super::super::psr::Psr;
use super::super::CPU;
use super::shift::shift_by_immediate;
use super::{low_reg, reg_field};
use crate::core::memory::{Access, Bus};

/// Resolved single-transfer address
#[derive(Debug, Clone, Copy)]
pub(super) struct Transfer {
    /// Transfer register
    pub rt: usize,

    /// Base register
    pub rn: usize,

    /// Address accessed
    pub address: u32,

    /// New base value, if written back
    pub writeback: Option<u32>,
}

impl Transfer {
    /// Thumb transfer: no base update
    fn fixed(rt: usize, address: u32) -> Self {
        Self {
            rt,
            rn: rt,
            address,
            writeback: None,
        }
    }
}

/// Width of a single load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadKind {
    Word,
    Byte,
    Half,
    SignedByte,
    SignedHalf,
}

impl CPU {
    // === Address generation ===

    /// Base register value; r15 is word-aligned
    fn transfer_base(&self, rn: usize) -> u32 {
        if rn == 15 {
            self.regs[15] & !3
        } else {
            self.regs[rn]
        }
    }

    fn indexed(&self, rt: usize, rn: usize, magnitude: u32) -> Transfer {
        let opcode = self.opcode;
        let pre = opcode & (1 << 24) != 0;
        let up = opcode & (1 << 23) != 0;
        let write = opcode & (1 << 21) != 0;

        let base = self.transfer_base(rn);
        let offset = if up {
            magnitude
        } else {
            magnitude.wrapping_neg()
        };

        let address = if pre { base.wrapping_add(offset) } else { base };
        let writeback = (!pre || write).then(|| self.regs[rn].wrapping_add(offset));

        Transfer {
            rt,
            rn,
            address,
            writeback,
        }
    }

    /// Word/byte addressing: `[Rn, #±imm12]` or `[Rn, ±Rm <shift> #imm5]`
    pub(super) fn word_transfer(&self, offset: Offset) -> Transfer {
        let rt = reg_field(self.opcode, 12);
        let rn = reg_field(self.opcode, 16);

        self.indexed(rt, rn, self.word_offset(offset))
    }

    fn word_offset(&self, offset: Offset) -> u32 {
        let opcode = self.opcode;

        match offset {
            Offset::Imm => opcode & 0xfff,
            Offset::Reg => {
                let rm = reg_field(opcode, 0);
                let kind = (opcode >> 5) & 3;
                let imm = (opcode >> 7) & 0x1f;

                shift_by_immediate(kind, self.regs[rm], imm, self.flag(Psr::C)).0
            }
        }
    }

    /// Halfword/doubleword addressing: `[Rn, #±imm8]` (split across bits
    /// 0-3 and 8-11) or `[Rn, ±Rm]`
    pub(super) fn half_transfer(&self, offset: Offset) -> Transfer {
        let opcode = self.opcode;
        let rt = reg_field(opcode, 12);
        let rn = reg_field(opcode, 16);

        let magnitude = match offset {
            Offset::Imm => (opcode & 0xf) | ((opcode >> 4) & 0xf0),
            Offset::Reg => self.regs[reg_field(opcode, 0)],
        };

        self.indexed(rt, rn, magnitude)
    }

    /// User-mode transfer addressing: always post-indexed from Rn
    pub(super) fn user_transfer(&self, offset: Offset) -> Transfer {
        let opcode = self.opcode;
        let rt = reg_field(opcode, 12);
        let rn = reg_field(opcode, 16);

        let magnitude = self.word_offset(offset);
        let base = self.regs[rn];
        let writeback = if opcode & (1 << 23) != 0 {
            base.wrapping_add(magnitude)
        } else {
            base.wrapping_sub(magnitude)
        };

        Transfer {
            rt,
            rn,
            address: base,
            writeback: Some(writeback),
        }
    }

    /// Apply a pending base update
    #[inline(always)]
    pub(super) fn write_back(&mut self, transfer: &Transfer) {
        if let Some(value) = transfer.writeback {
            self.regs[transfer.rn] = value;
        }
    }

    // === Load core ===

    /// Perform a non-sequential load into Rt
    ///
    /// Loading r15 realigns it and refills the pipeline. Costs one internal
    /// cycle.
    fn load(&mut self, bus: &mut Bus, transfer: Transfer, kind: LoadKind) {
        self.write_back(&transfer);

        let address = transfer.address;
        let value = match kind {
            LoadKind::Word => bus.read32(address, Access::NonSequential),
            LoadKind::Byte => bus.read8(address, Access::NonSequential) as u32,
            LoadKind::Half => bus.read16(address, Access::NonSequential),
            LoadKind::SignedByte => bus.read8(address, Access::NonSequential) as i8 as u32,
            LoadKind::SignedHalf => {
                let value = bus.read16(address, Access::NonSequential);

                // A misaligned LDRSH reads the addressed byte only
                if address & 1 != 0 {
                    value as i8 as u32
                } else {
                    value as i16 as u32
                }
            }
        };

        self.regs[transfer.rt] = value;

        if transfer.rt == 15 {
            self.align_pc();
            self.load_pipe(bus);
        }

        bus.add_cycles(1);
        self.seq_to_nonseq(bus);
    }

    // === ARM loads ===

    /// LDR: Load Word
    ///
    /// Format: cond | 01 | I | P | U | 0 | W | 1 | Rn | Rt | offset
    ///
    /// A misaligned address rotates the loaded word.
    pub(crate) fn op_ldr(&mut self, bus: &mut Bus, offset: Offset) {
        let transfer = self.word_transfer(offset);
        self.load(bus, transfer, LoadKind::Word);
    }

    /// LDRB: Load Byte (zero-extended)
    pub(crate) fn op_ldrb(&mut self, bus: &mut Bus, offset: Offset) {
        let transfer = self.word_transfer(offset);
        self.load(bus, transfer, LoadKind::Byte);
    }

    /// LDRBT: Load Byte with User-mode registers
    ///
    /// Always post-indexed. The base is updated in the current mode, the
    /// transfer register is the User mode one.
    pub(crate) fn op_ldrbt(&mut self, bus: &mut Bus, offset: Offset) {
        let mut transfer = self.user_transfer(offset);
        self.write_back(&transfer);
        transfer.writeback = None;

        self.with_user_registers(|cpu| cpu.load(bus, transfer, LoadKind::Byte));
    }

    /// LDRT: Load Word with User-mode registers
    pub(crate) fn op_ldrt(&mut self, bus: &mut Bus, offset: Offset) {
        let mut transfer = self.user_transfer(offset);
        self.write_back(&transfer);
        transfer.writeback = None;

        self.with_user_registers(|cpu| cpu.load(bus, transfer, LoadKind::Word));
    }

    /// LDRH: Load Halfword (zero-extended)
    ///
    /// Format: cond | 000 | P | U | I | W | 1 | Rn | Rt | imm4H | 1011 | imm4L/Rm
    pub(crate) fn op_ldrh(&mut self, bus: &mut Bus, offset: Offset) {
        let transfer = self.half_transfer(offset);
        self.load(bus, transfer, LoadKind::Half);
    }

    /// LDRSB: Load Signed Byte
    pub(crate) fn op_ldrsb(&mut self, bus: &mut Bus, offset: Offset) {
        let transfer = self.half_transfer(offset);
        self.load(bus, transfer, LoadKind::SignedByte);
    }

    /// LDRSH: Load Signed Halfword
    pub(crate) fn op_ldrsh(&mut self, bus: &mut Bus, offset: Offset) {
        let transfer = self.half_transfer(offset);
        self.load(bus, transfer, LoadKind::SignedHalf);
    }

    /// LDRD: Load Doubleword into Rt and Rt|1
    pub(crate) fn op_ldrd(&mut self, bus: &mut Bus, offset: Offset) {
        let transfer = self.half_transfer(offset);
        self.write_back(&transfer);

        let rt = transfer.rt;
        let rt2 = rt | 1;

        self.regs[rt] = bus.read32(transfer.address, Access::NonSequential);
        self.regs[rt2] = bus.read32(transfer.address.wrapping_add(4), Access::Sequential);

        if rt2 == 15 {
            self.align_pc();
            self.load_pipe(bus);
        }

        bus.add_cycles(1);
        self.seq_to_nonseq(bus);
    }

    /// SWP / SWPB: Swap
    ///
    /// Format: cond | 00010 | B | 00 | Rn | Rt | 0000 | 1001 | Rm
    /// Operation: tmp = [Rn]; [Rn] = Rm; Rt = tmp
    pub(crate) fn op_swp(&mut self, bus: &mut Bus) {
        let opcode = self.opcode;
        let rm = reg_field(opcode, 0);
        let rt = reg_field(opcode, 12);
        let rn = reg_field(opcode, 16);
        let byte = opcode & (1 << 22) != 0;

        let address = self.regs[rn];
        let source = self.regs[rm];

        let value = if byte {
            let value = bus.read8(address, Access::NonSequential) as u32;
            bus.write8(address, source as u8, Access::NonSequential);
            value
        } else {
            let value = bus.read32(address, Access::NonSequential);
            bus.write32(address, source, Access::NonSequential);
            value
        };

        self.regs[rt] = value;

        bus.add_cycles(1);
    }

    // === Thumb loads ===

    /// `[Rn, #imm5 * size]`: Rt = bits 0-2, Rn = bits 3-5
    pub(super) fn thumb_imm5_transfer(&self, size: u32) -> Transfer {
        let rn = low_reg(self.opcode, 3);
        let imm = (self.opcode >> 6) & 0x1f;

        Transfer::fixed(
            low_reg(self.opcode, 0),
            self.regs[rn].wrapping_add(imm * size),
        )
    }

    /// `[Rn, Rm]`: Rt = bits 0-2, Rn = bits 3-5, Rm = bits 6-8
    pub(super) fn thumb_reg_transfer(&self) -> Transfer {
        let rn = low_reg(self.opcode, 3);
        let rm = low_reg(self.opcode, 6);

        Transfer::fixed(
            low_reg(self.opcode, 0),
            self.regs[rn].wrapping_add(self.regs[rm]),
        )
    }

    /// `[SP, #imm8 * 4]`: Rt = bits 8-10
    pub(super) fn thumb_sp_transfer(&self) -> Transfer {
        let imm = (self.opcode & 0xff) << 2;

        Transfer::fixed(low_reg(self.opcode, 8), self.regs[13].wrapping_add(imm))
    }

    /// LDR Rt, [PC, #imm8 * 4] (PC word-aligned)
    pub(crate) fn op_thumb_ldr_pc(&mut self, bus: &mut Bus) {
        let imm = (self.opcode & 0xff) << 2;
        let transfer = Transfer::fixed(
            low_reg(self.opcode, 8),
            (self.regs[15] & !3).wrapping_add(imm),
        );

        self.load(bus, transfer, LoadKind::Word);
    }

    pub(crate) fn op_thumb_ldr_reg(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_reg_transfer();
        self.load(bus, transfer, LoadKind::Word);
    }

    pub(crate) fn op_thumb_ldrb_reg(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_reg_transfer();
        self.load(bus, transfer, LoadKind::Byte);
    }

    pub(crate) fn op_thumb_ldrh_reg(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_reg_transfer();
        self.load(bus, transfer, LoadKind::Half);
    }

    pub(crate) fn op_thumb_ldrsb_reg(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_reg_transfer();
        self.load(bus, transfer, LoadKind::SignedByte);
    }

    pub(crate) fn op_thumb_ldrsh_reg(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_reg_transfer();
        self.load(bus, transfer, LoadKind::SignedHalf);
    }

    /// LDR Rt, [Rn, #imm5 * 4]
    pub(crate) fn op_thumb_ldr_imm5(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_imm5_transfer(4);
        self.load(bus, transfer, LoadKind::Word);
    }

    /// LDRB Rt, [Rn, #imm5]
    pub(crate) fn op_thumb_ldrb_imm5(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_imm5_transfer(1);
        self.load(bus, transfer, LoadKind::Byte);
    }

    /// LDRH Rt, [Rn, #imm5 * 2]
    pub(crate) fn op_thumb_ldrh_imm5(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_imm5_transfer(2);
        self.load(bus, transfer, LoadKind::Half);
    }

    /// LDR Rt, [SP, #imm8 * 4]
    pub(crate) fn op_thumb_ldr_sp(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_sp_transfer();
        self.load(bus, transfer, LoadKind::Word);
    }
}
