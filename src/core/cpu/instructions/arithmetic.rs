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

use super::super::decode::{AluOp, Operand};
use super::super::psr::Psr;
use super::super::CPU;
use super::{low_reg, reg_field, DataOp};
use crate::core::memory::Bus;

impl CPU {
    // === Data processing ===

    /// ARM data-processing instruction
    ///
    /// Format: cond | 00 | I | opcode | S | Rn | Rd | shifter operand
    ///
    /// # Arguments
    ///
    /// * `bus` - Memory bus (pipeline reload when Rd is r15)
    /// * `op` - Operation
    /// * `form` - Shifter operand form
    pub(crate) fn op_alu(&mut self, bus: &mut Bus, op: AluOp, form: Operand) {
        let data = self.arm_operand(bus, form);
        self.alu(bus, op, data);
    }

    /// Apply `op` to resolved operands
    ///
    /// Shared by both instruction sets.
    pub(super) fn alu(&mut self, bus: &mut Bus, op: AluOp, data: DataOp) {
        let DataOp { lhs, rhs, .. } = data;

        match op {
            AluOp::And => self.logic(bus, data, lhs & rhs),
            AluOp::Eor => self.logic(bus, data, lhs ^ rhs),
            AluOp::Orr => self.logic(bus, data, lhs | rhs),
            AluOp::Bic => self.logic(bus, data, lhs & !rhs),
            AluOp::Mov => self.logic(bus, data, rhs),
            AluOp::Mvn => self.logic(bus, data, !rhs),
            AluOp::Tst => self.logic_test(data, lhs & rhs),
            AluOp::Teq => self.logic_test(data, lhs ^ rhs),
            AluOp::Add => self.arith_add(bus, data, false),
            AluOp::Adc => self.arith_add(bus, data, true),
            AluOp::Sub => self.arith_sub(bus, data, false),
            AluOp::Sbc => self.arith_sub(bus, data, true),
            AluOp::Rsb => self.arith_sub(bus, swap(data), false),
            AluOp::Rsc => self.arith_sub(bus, swap(data), true),
            AluOp::Cmp => self.arith_cmp(data),
            AluOp::Cmn => self.arith_cmn(data),
        }
    }

    /// Set N and Z from a 32-bit result
    #[inline(always)]
    pub(crate) fn set_nz(&mut self, result: u32) {
        self.set_flag(Psr::N, result & 0x8000_0000 != 0);
        self.set_flag(Psr::Z, result == 0);
    }

    /// ADD / ADC core
    ///
    /// Carry is the 33rd bit of the widened sum; overflow is set when both
    /// operands share a sign the result does not.
    fn arith_add(&mut self, bus: &mut Bus, op: DataOp, with_carry: bool) {
        let (result, carry, overflow) = self.add_with_flags(op.lhs, op.rhs, with_carry);
        self.arith_set(bus, op, result, carry, overflow);
    }

    /// SUB / SBC core (also RSB/RSC with swapped operands)
    ///
    /// Carry is NOT borrow: set when the widened difference stays below
    /// 2^32. SBC subtracts an extra 1 when C is clear.
    fn arith_sub(&mut self, bus: &mut Bus, op: DataOp, with_carry: bool) {
        let (result, carry, overflow) = self.sub_with_flags(op.lhs, op.rhs, with_carry);
        self.arith_set(bus, op, result, carry, overflow);
    }

    fn arith_cmp(&mut self, op: DataOp) {
        let (result, carry, overflow) = self.sub_with_flags(op.lhs, op.rhs, false);
        self.set_nzcv(result, carry, overflow);
    }

    fn arith_cmn(&mut self, op: DataOp) {
        let (result, carry, overflow) = self.add_with_flags(op.lhs, op.rhs, false);
        self.set_nzcv(result, carry, overflow);
    }

    fn add_with_flags(&self, lhs: u32, rhs: u32, with_carry: bool) -> (u32, bool, bool) {
        let carry_in = (with_carry && self.flag(Psr::C)) as u64;
        let wide = lhs as u64 + rhs as u64 + carry_in;
        let result = wide as u32;

        let overflow = !(lhs ^ rhs) & (lhs ^ result) & 0x8000_0000 != 0;

        (result, wide > 0xffff_ffff, overflow)
    }

    fn sub_with_flags(&self, lhs: u32, rhs: u32, with_carry: bool) -> (u32, bool, bool) {
        let borrow = (with_carry && !self.flag(Psr::C)) as u64;
        let wide = (lhs as u64).wrapping_sub(rhs as u64).wrapping_sub(borrow);
        let result = wide as u32;

        let overflow = (lhs ^ rhs) & (lhs ^ result) & 0x8000_0000 != 0;

        (result, wide < 0x1_0000_0000, overflow)
    }

    fn set_nzcv(&mut self, result: u32, carry: bool, overflow: bool) {
        self.set_nz(result);
        self.set_flag(Psr::C, carry);
        self.set_flag(Psr::V, overflow);
    }

    /// Write an arithmetic result
    ///
    /// With Rd = r15 the pipeline is reloaded; if S is also set, SPSR is
    /// first copied to CPSR (exception return).
    fn arith_set(&mut self, bus: &mut Bus, op: DataOp, result: u32, carry: bool, overflow: bool) {
        self.regs[op.rd] = result;

        if op.rd == 15 {
            if op.set_flags {
                self.restore_cpsr();
            }
            self.align_pc();
            self.load_pipe(bus);
        } else if op.set_flags {
            self.set_nzcv(result, carry, overflow);
        }
    }

    // === Saturating arithmetic ===

    /// Clamp to the signed 32-bit range, setting Q on clamp
    fn saturate(&mut self, value: i64) -> u32 {
        if value > i32::MAX as i64 {
            self.set_flag(Psr::Q, true);
            i32::MAX as u32
        } else if value < i32::MIN as i64 {
            self.set_flag(Psr::Q, true);
            i32::MIN as u32
        } else {
            value as i32 as u32
        }
    }

    /// Saturating operands: (Rm, Rn, Rd)
    fn saturating_operands(&self) -> (i64, i64, usize) {
        let rm = reg_field(self.opcode, 0);
        let rd = reg_field(self.opcode, 12);
        let rn = reg_field(self.opcode, 16);

        (self.regs[rm] as i32 as i64, self.regs[rn] as i32 as i64, rd)
    }

    /// QADD: Rd = sat(Rm + Rn)
    pub(crate) fn op_qadd(&mut self) {
        let (m, n, rd) = self.saturating_operands();
        self.regs[rd] = self.saturate(m + n);
    }

    /// QSUB: Rd = sat(Rm - Rn)
    pub(crate) fn op_qsub(&mut self) {
        let (m, n, rd) = self.saturating_operands();
        self.regs[rd] = self.saturate(m - n);
    }

    /// QDADD: Rd = sat(Rm + sat(Rn * 2))
    pub(crate) fn op_qdadd(&mut self) {
        let (m, n, rd) = self.saturating_operands();
        let doubled = self.saturate(n * 2) as i32 as i64;
        self.regs[rd] = self.saturate(m + doubled);
    }

    /// QDSUB: Rd = sat(Rm - sat(Rn * 2))
    pub(crate) fn op_qdsub(&mut self) {
        let (m, n, rd) = self.saturating_operands();
        let doubled = self.saturate(n * 2) as i32 as i64;
        self.regs[rd] = self.saturate(m - doubled);
    }

    // === Thumb operands ===

    /// Format 4 operands: Rd/Rn = bits 0-2, Rm = bits 3-5
    pub(super) fn thumb_rdn3_operand(&self) -> DataOp {
        let rd = low_reg(self.opcode, 0);

        DataOp {
            rd,
            lhs: self.regs[rd],
            rhs: self.regs[low_reg(self.opcode, 3)],
            carry: self.flag(Psr::C),
            set_flags: true,
        }
    }

    /// Format 2 register operands: Rd = bits 0-2, Rn = bits 3-5, Rm = bits 6-8
    fn thumb_reg_operand(&self) -> DataOp {
        DataOp {
            rd: low_reg(self.opcode, 0),
            lhs: self.regs[low_reg(self.opcode, 3)],
            rhs: self.regs[low_reg(self.opcode, 6)],
            carry: false,
            set_flags: true,
        }
    }

    /// Format 2 immediate operands: Rd = bits 0-2, Rn = bits 3-5, imm3 = bits 6-8
    fn thumb_imm3_operand(&self) -> DataOp {
        DataOp {
            rd: low_reg(self.opcode, 0),
            lhs: self.regs[low_reg(self.opcode, 3)],
            rhs: (self.opcode >> 6) & 7,
            carry: false,
            set_flags: true,
        }
    }

    /// Format 3 operands: Rd = bits 8-10, imm8 = bits 0-7
    fn thumb_imm8_operand(&self) -> DataOp {
        let rd = low_reg(self.opcode, 8);

        DataOp {
            rd,
            lhs: self.regs[rd],
            rhs: self.opcode & 0xff,
            carry: false,
            set_flags: true,
        }
    }

    /// Format 5 operands: Rd = bits 0-2 with H1 (bit 7), Rm = bits 3-6
    fn thumb_hi_operand(&self, set_flags: bool) -> DataOp {
        let rd = low_reg(self.opcode, 0) | (((self.opcode >> 4) & 8) as usize);

        DataOp {
            rd,
            lhs: self.regs[rd],
            rhs: self.regs[reg_field(self.opcode, 3)],
            carry: false,
            set_flags,
        }
    }

    /// ADD Rd, Rn, Rm
    pub(crate) fn op_thumb_add_reg(&mut self, bus: &mut Bus) {
        let op = self.thumb_reg_operand();
        self.arith_add(bus, op, false);
    }

    /// SUB Rd, Rn, Rm
    pub(crate) fn op_thumb_sub_reg(&mut self, bus: &mut Bus) {
        let op = self.thumb_reg_operand();
        self.arith_sub(bus, op, false);
    }

    /// ADD Rd, Rn, #imm3
    pub(crate) fn op_thumb_add_imm3(&mut self, bus: &mut Bus) {
        let op = self.thumb_imm3_operand();
        self.arith_add(bus, op, false);
    }

    /// SUB Rd, Rn, #imm3
    pub(crate) fn op_thumb_sub_imm3(&mut self, bus: &mut Bus) {
        let op = self.thumb_imm3_operand();
        self.arith_sub(bus, op, false);
    }

    /// CMP Rd, #imm8
    pub(crate) fn op_thumb_cmp_imm8(&mut self) {
        let op = self.thumb_imm8_operand();
        self.arith_cmp(op);
    }

    /// ADD Rd, #imm8
    pub(crate) fn op_thumb_add_imm8(&mut self, bus: &mut Bus) {
        let op = self.thumb_imm8_operand();
        self.arith_add(bus, op, false);
    }

    /// SUB Rd, #imm8
    pub(crate) fn op_thumb_sub_imm8(&mut self, bus: &mut Bus) {
        let op = self.thumb_imm8_operand();
        self.arith_sub(bus, op, false);
    }

    /// ADD Rd, Rm with high registers; flags unaffected
    ///
    /// With Rd = r15 the result is realigned and the pipeline reloaded.
    pub(crate) fn op_thumb_add_hi(&mut self, bus: &mut Bus) {
        let op = self.thumb_hi_operand(false);
        self.arith_add(bus, op, false);
    }

    /// CMP Rd, Rm with high registers
    pub(crate) fn op_thumb_cmp_hi(&mut self) {
        let op = self.thumb_hi_operand(true);
        self.arith_cmp(op);
    }

    /// ADD Rd, PC, #imm8*4 (ADR); PC is word-aligned first
    pub(crate) fn op_thumb_adr(&mut self, bus: &mut Bus) {
        let op = DataOp {
            rd: low_reg(self.opcode, 8),
            lhs: self.regs[15] & !3,
            rhs: (self.opcode & 0xff) << 2,
            carry: false,
            set_flags: false,
        };
        self.arith_add(bus, op, false);
    }

    /// ADD Rd, SP, #imm8*4
    pub(crate) fn op_thumb_add_sp_rd(&mut self, bus: &mut Bus) {
        let op = DataOp {
            rd: low_reg(self.opcode, 8),
            lhs: self.regs[13],
            rhs: (self.opcode & 0xff) << 2,
            carry: false,
            set_flags: false,
        };
        self.arith_add(bus, op, false);
    }

    /// SP operands for ADD/SUB SP, #imm7*4
    fn thumb_sp_operand(&self) -> DataOp {
        DataOp {
            rd: 13,
            lhs: self.regs[13],
            rhs: (self.opcode & 0x7f) << 2,
            carry: false,
            set_flags: false,
        }
    }

    /// ADD SP, #imm7*4; flags unaffected
    pub(crate) fn op_thumb_add_sp(&mut self, bus: &mut Bus) {
        let op = self.thumb_sp_operand();
        self.arith_add(bus, op, false);
    }

    /// SUB SP, #imm7*4; flags unaffected
    pub(crate) fn op_thumb_sub_sp(&mut self, bus: &mut Bus) {
        let op = self.thumb_sp_operand();
        self.arith_sub(bus, op, false);
    }
}

/// Swap operands for reverse subtraction
#[inline(always)]
fn swap(op: DataOp) -> DataOp {
    DataOp {
        lhs: op.rhs,
        rhs: op.lhs,
        ..op
    }
}
