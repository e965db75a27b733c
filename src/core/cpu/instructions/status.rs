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

use super::super::psr::{CpuMode, MODE_MASK, PRIV_MASK, STATE_MASK, USER_MASK};
use super::super::CPU;
use super::reg_field;

impl CPU {
    // === Status register transfer ===

    /// Bits of a PSR writable from the current mode
    ///
    /// User mode may only touch the flags; privileged modes also reach the
    /// control byte except T. The SPSR additionally accepts T and J.
    fn writable_psr_mask(&self, spsr: bool) -> u32 {
        let mut mask = if self.mode() == Some(CpuMode::User) {
            USER_MASK
        } else {
            PRIV_MASK
        };

        if spsr {
            mask |= STATE_MASK;
        }

        mask
    }

    /// MRS: Move PSR to Register
    ///
    /// Format: cond | 00010 | R | 001111 | Rd | 000000000000
    ///
    /// With R set the SPSR is read; in User and System mode Rd is left
    /// unchanged. CPSR reads mask out bits not visible from the current mode.
    pub(crate) fn op_mrs(&mut self) {
        let rd = reg_field(self.opcode, 12);

        if self.opcode & (1 << 22) != 0 {
            if let Some(spsr) = self.spsr() {
                self.regs[rd] = spsr;
            }
        } else {
            self.regs[rd] = self.cpsr & self.writable_psr_mask(false);
        }
    }

    /// MSR (immediate): Move rotated immediate to PSR fields
    ///
    /// Format: cond | 00110 | R | 10 | mask | 1111 | rot | imm8
    pub(crate) fn op_msr_imm(&mut self) {
        let imm = self.opcode & 0xff;
        let rot = ((self.opcode >> 8) & 0xf) * 2;

        self.write_psr(imm.rotate_right(rot));
    }

    /// MSR (register): Move Rm to PSR fields
    ///
    /// Format: cond | 00010 | R | 10 | mask | 1111 | 00000000 | Rm
    pub(crate) fn op_msr_reg(&mut self) {
        let value = self.regs[reg_field(self.opcode, 0)];
        self.write_psr(value);
    }

    /// Write the fields selected by bits 16-19 (c, x, s, f)
    ///
    /// A CPSR write that changes the mode re-banks the registers. A pending
    /// IRQ unmasked here is taken before the next instruction.
    fn write_psr(&mut self, value: u32) {
        let spsr = self.opcode & (1 << 22) != 0;
        let fields = (self.opcode >> 16) & 0xf;

        let mut mask = 0;
        for byte in 0..4 {
            if fields & (1 << byte) != 0 {
                mask |= 0xff << (byte * 8);
            }
        }
        mask &= self.writable_psr_mask(spsr);

        if spsr {
            if let Some(old) = self.spsr() {
                self.set_spsr((old & !mask) | (value & mask));
            }
        } else {
            let current = self.cpsr & MODE_MASK;
            self.cpsr = (self.cpsr & !mask) | (value & mask);
            self.rebank(current, self.cpsr & MODE_MASK);
        }
    }
}
