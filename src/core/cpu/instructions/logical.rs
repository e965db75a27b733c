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

use super::super::psr::Psr;
use super::super::CPU;
use super::{low_reg, reg_field, DataOp};
use crate::core::memory::Bus;

impl CPU {
    // === Logical Instructions ===

    /// Write a logical result (AND, EOR, ORR, BIC, MOV, MVN)
    ///
    /// With S set, N and Z come from the result and C from the shifter;
    /// V is preserved. With Rd = r15 the pipeline is reloaded, and S also
    /// restores CPSR from SPSR.
    pub(super) fn logic(&mut self, bus: &mut Bus, op: DataOp, result: u32) {
        self.regs[op.rd] = result;

        if op.rd == 15 {
            if op.set_flags {
                self.restore_cpsr();
            }
            self.align_pc();
            self.load_pipe(bus);
        } else if op.set_flags {
            self.set_nz(result);
            self.set_flag(Psr::C, op.carry);
        }
    }

    /// Flag-only logical test (TST, TEQ)
    pub(super) fn logic_test(&mut self, op: DataOp, result: u32) {
        self.set_nz(result);
        self.set_flag(Psr::C, op.carry);
    }

    /// CLZ: Count Leading Zeros
    ///
    /// Format: cond | 00010110 | 1111 | Rd | 1111 | 0001 | Rm
    /// Operation: Rd = number of leading zero bits in Rm (32 when Rm = 0)
    pub(crate) fn op_clz(&mut self) {
        let rd = reg_field(self.opcode, 12);
        let rm = reg_field(self.opcode, 0);

        self.regs[rd] = self.regs[rm].leading_zeros();
    }

    // === Thumb moves ===

    /// MOV Rd, Rm (encoded as LSL Rd, Rm, #0)
    ///
    /// Sets N and Z; C and V are preserved.
    pub(crate) fn op_thumb_mov_reg(&mut self) {
        let rd = low_reg(self.opcode, 0);
        let value = self.regs[low_reg(self.opcode, 3)];

        self.regs[rd] = value;
        self.set_nz(value);
    }

    /// MOV Rd, #imm8
    pub(crate) fn op_thumb_mov_imm8(&mut self) {
        let rd = low_reg(self.opcode, 8);
        let value = self.opcode & 0xff;

        self.regs[rd] = value;
        self.set_nz(value);
    }

    /// MOV Rd, Rm with high registers; flags unaffected
    ///
    /// A move into r15 clears bit 0 and reloads the pipeline without
    /// changing state.
    pub(crate) fn op_thumb_mov_hi(&mut self, bus: &mut Bus) {
        let rd = low_reg(self.opcode, 0) | (((self.opcode >> 4) & 8) as usize);
        let rm = reg_field(self.opcode, 3);

        self.regs[rd] = self.regs[rm];

        if rd == 15 {
            self.regs[15] &= !1;
            self.load_pipe(bus);
        }
    }
}
