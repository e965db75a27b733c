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

use super::super::psr::{condition_passed, Psr};
use super::super::CPU;
use super::reg_field;
use crate::core::memory::Bus;

/// Sign-extend the low `bits` of `value`
#[inline(always)]
fn sign_extend(value: u32, bits: u32) -> u32 {
    let shift = 32 - bits;
    (((value << shift) as i32) >> shift) as u32
}

impl CPU {
    // === ARM branches ===

    /// Signed 24-bit word offset of B/BL/BLX
    #[inline(always)]
    fn arm_branch_offset(&self) -> u32 {
        sign_extend(self.opcode & 0x00ff_ffff, 24) << 2
    }

    /// B: Branch
    ///
    /// Format: cond | 1010 | signed_imm24
    /// Operation: PC = PC + (signed_imm24 << 2)
    pub(crate) fn op_b(&mut self, bus: &mut Bus) {
        self.regs[15] = self.regs[15].wrapping_add(self.arm_branch_offset());
        self.load_pipe(bus);
    }

    /// BL: Branch with Link
    ///
    /// Format: cond | 1011 | signed_imm24
    /// Operation: LR = address of next instruction; PC += signed_imm24 << 2
    pub(crate) fn op_bl(&mut self, bus: &mut Bus) {
        let offset = self.arm_branch_offset();

        self.regs[14] = self.regs[15].wrapping_sub(4);
        self.regs[15] = (self.regs[15] & !3).wrapping_add(offset);

        self.load_pipe(bus);
    }

    /// BLX (immediate): Branch with Link and switch to Thumb
    ///
    /// Format: 1111 | 101 | H | signed_imm24
    ///
    /// H supplies bit 1 of the target, giving halfword resolution.
    pub(crate) fn op_blx_imm(&mut self, bus: &mut Bus) {
        let offset = self.arm_branch_offset() | ((self.opcode >> 23) & 2);

        self.set_flag(Psr::T, true);

        self.regs[14] = self.regs[15].wrapping_sub(4);
        self.regs[15] = self.regs[15].wrapping_add(offset);

        self.load_pipe(bus);
    }

    /// BLX (register): Branch with Link and Exchange
    ///
    /// Format: cond | 00010010 | 1111 | 1111 | 1111 | 0011 | Rm
    pub(crate) fn op_blx_reg(&mut self, bus: &mut Bus) {
        let target = self.regs[reg_field(self.opcode, 0)];

        self.regs[14] = self.regs[15].wrapping_sub(4);
        self.regs[15] = target;

        self.interwork(bus);
    }

    /// BX: Branch and Exchange
    ///
    /// Format: cond | 00010010 | 1111 | 1111 | 1111 | 0001 | Rm
    /// Operation: T = Rm[0]; PC = Rm & ~1
    pub(crate) fn op_bx(&mut self, bus: &mut Bus) {
        self.regs[15] = self.regs[reg_field(self.opcode, 0)];
        self.interwork(bus);
    }

    // === Thumb branches ===

    /// B<cond> label: signed 8-bit halfword offset, condition in bits 8-11
    pub(crate) fn op_thumb_b_cond(&mut self, bus: &mut Bus) {
        let cond = (self.opcode >> 8) & 0xf;

        if condition_passed(self.cpsr, cond) {
            let offset = sign_extend(self.opcode & 0xff, 8) << 1;

            self.regs[15] = self.regs[15].wrapping_add(offset);
            self.load_pipe(bus);
        }
    }

    /// B label: signed 11-bit halfword offset
    pub(crate) fn op_thumb_b(&mut self, bus: &mut Bus) {
        let offset = sign_extend(self.opcode & 0x7ff, 11) << 1;

        self.regs[15] = self.regs[15].wrapping_add(offset);
        self.load_pipe(bus);
    }

    /// BX Rm (Rm = bits 3-6, high registers allowed)
    pub(crate) fn op_thumb_bx(&mut self, bus: &mut Bus) {
        self.regs[15] = self.regs[reg_field(self.opcode, 3)];
        self.interwork(bus);
    }

    /// BLX Rm: LR = next instruction | 1
    pub(crate) fn op_thumb_blx(&mut self, bus: &mut Bus) {
        let target = self.regs[reg_field(self.opcode, 3)];

        self.regs[14] = self.regs[15].wrapping_sub(2) | 1;
        self.regs[15] = target;

        self.interwork(bus);
    }

    /// BL/BLX prefix: LR = PC + (signed_imm11 << 12)
    ///
    /// The upper half of the 22-bit offset is parked in LR for the suffix.
    pub(crate) fn op_thumb_bl_prefix(&mut self) {
        let offset = sign_extend(self.opcode & 0x7ff, 11) << 12;

        self.regs[14] = self.regs[15].wrapping_add(offset);
    }

    /// Complete a BL pair: PC = LR + (imm11 << 1), LR = return | 1
    fn thumb_bl_target(&mut self) {
        let target = self.regs[14].wrapping_add((self.opcode & 0x7ff) << 1);

        self.regs[14] = self.regs[15].wrapping_sub(2) | 1;
        self.regs[15] = target & !1;
    }

    /// BL suffix: stays in Thumb state
    pub(crate) fn op_thumb_bl_suffix(&mut self, bus: &mut Bus) {
        self.thumb_bl_target();
        self.load_pipe(bus);
    }

    /// BLX suffix: switches to ARM state
    pub(crate) fn op_thumb_blx_suffix(&mut self, bus: &mut Bus) {
        self.thumb_bl_target();
        self.interwork(bus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0x7f, 8), 0x7f);
        assert_eq!(sign_extend(0x80, 8), 0xffff_ff80);
        assert_eq!(sign_extend(0x7ff, 11), 0xffff_ffff);
        assert_eq!(sign_extend(0x00ff_fffe, 24), 0xffff_fffe);
    }
}
