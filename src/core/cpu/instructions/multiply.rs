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

//! Multiply instructions
//!
//! Operand fields shared by every ARM multiply:
//!
//! | Bits  | Field                         |
//! |-------|-------------------------------|
//! | 0-3   | Rm (multiplicand)             |
//! | 8-11  | Rs (multiplier)               |
//! | 12-15 | Rn / RdLo (accumulate, low)   |
//! | 16-19 | Rd / RdHi (destination, high) |
//! | 20    | S                             |
//!
//! The early-termination cost depends only on the multiplier.

use super::super::psr::Psr;
use super::super::CPU;
use super::{low_reg, reg_field};
use crate::core::memory::Bus;

/// Decoded multiply operands
#[derive(Debug, Clone, Copy)]
struct MulOp {
    lhs: u32,
    rhs: u32,
    ra: usize,
    rd: usize,
    set_flags: bool,
}

/// Internal cycles for a multiply by `rhs`
///
/// One cycle per significant byte of the multiplier. Signed multiplies also
/// terminate early on leading all-ones bytes.
pub(super) fn multiplier_cycles(rhs: u32, signed: bool) -> u32 {
    let significant = |mask: u32| rhs & mask == 0 || (signed && rhs & mask == mask);

    if significant(0xffff_ff00) {
        1
    } else if significant(0xffff_0000) {
        2
    } else if significant(0xff00_0000) {
        3
    } else {
        4
    }
}

/// Select the top (`true`) or bottom half of `value`, sign-extended
#[inline(always)]
fn half(value: u32, top: bool) -> i64 {
    if top {
        (value >> 16) as i16 as i64
    } else {
        value as i16 as i64
    }
}

impl CPU {
    fn mul_operands(&self) -> MulOp {
        let opcode = self.opcode;

        MulOp {
            lhs: self.regs[reg_field(opcode, 0)],
            rhs: self.regs[reg_field(opcode, 8)],
            ra: reg_field(opcode, 12),
            rd: reg_field(opcode, 16),
            set_flags: opcode & (1 << 20) != 0,
        }
    }

    /// Charge the multiplier cost plus `extra` internal cycles
    fn mul_cycles(&self, bus: &mut Bus, rhs: u32, signed: bool, extra: u32) {
        bus.add_cycles(multiplier_cycles(rhs, signed) + extra);
        self.seq_to_nonseq(bus);
    }

    /// Write a 64-bit result to RdHi:RdLo, updating N and Z if S is set
    fn set_long(&mut self, op: MulOp, result: u64) {
        self.regs[op.ra] = result as u32;
        self.regs[op.rd] = (result >> 32) as u32;

        if op.set_flags {
            self.set_flag(Psr::N, result & (1 << 63) != 0);
            self.set_flag(Psr::Z, result == 0);
        }
    }

    /// Read RdHi:RdLo as a 64-bit accumulator
    fn long_accumulator(&self, op: MulOp) -> u64 {
        ((self.regs[op.rd] as u64) << 32) | self.regs[op.ra] as u64
    }

    /// MUL: Multiply
    ///
    /// Format: cond | 0000000 | S | Rd | 0000 | Rs | 1001 | Rm
    /// Operation: Rd = Rm * Rs
    pub(crate) fn op_mul(&mut self, bus: &mut Bus) {
        let op = self.mul_operands();
        let result = op.lhs.wrapping_mul(op.rhs);

        self.regs[op.rd] = result;
        if op.set_flags {
            self.set_nz(result);
        }

        self.mul_cycles(bus, op.rhs, true, 0);
    }

    /// MLA: Multiply Accumulate
    ///
    /// Format: cond | 0000001 | S | Rd | Rn | Rs | 1001 | Rm
    /// Operation: Rd = Rm * Rs + Rn
    pub(crate) fn op_mla(&mut self, bus: &mut Bus) {
        let op = self.mul_operands();
        let result = op.lhs.wrapping_mul(op.rhs).wrapping_add(self.regs[op.ra]);

        self.regs[op.rd] = result;
        if op.set_flags {
            self.set_nz(result);
        }

        self.mul_cycles(bus, op.rhs, true, 1);
    }

    /// UMULL: Unsigned Multiply Long
    ///
    /// Operation: RdHi:RdLo = Rm * Rs (unsigned)
    pub(crate) fn op_umull(&mut self, bus: &mut Bus) {
        let op = self.mul_operands();
        let result = op.lhs as u64 * op.rhs as u64;

        self.set_long(op, result);
        self.mul_cycles(bus, op.rhs, false, 1);
    }

    /// UMLAL: Unsigned Multiply Accumulate Long
    ///
    /// Operation: RdHi:RdLo += Rm * Rs (unsigned)
    pub(crate) fn op_umlal(&mut self, bus: &mut Bus) {
        let op = self.mul_operands();
        let product = op.lhs as u64 * op.rhs as u64;
        let result = self.long_accumulator(op).wrapping_add(product);

        self.set_long(op, result);
        self.mul_cycles(bus, op.rhs, false, 2);
    }

    /// SMULL: Signed Multiply Long
    ///
    /// Operation: RdHi:RdLo = Rm * Rs (signed)
    pub(crate) fn op_smull(&mut self, bus: &mut Bus) {
        let op = self.mul_operands();
        let result = (op.lhs as i32 as i64).wrapping_mul(op.rhs as i32 as i64);

        self.set_long(op, result as u64);
        self.mul_cycles(bus, op.rhs, true, 1);
    }

    /// SMLAL: Signed Multiply Accumulate Long
    ///
    /// Operation: RdHi:RdLo += Rm * Rs (signed)
    pub(crate) fn op_smlal(&mut self, bus: &mut Bus) {
        let op = self.mul_operands();
        let product = (op.lhs as i32 as i64).wrapping_mul(op.rhs as i32 as i64);
        let result = self.long_accumulator(op).wrapping_add(product as u64);

        self.set_long(op, result);
        self.mul_cycles(bus, op.rhs, true, 2);
    }

    // === DSP halfword multiplies ===
    //
    // Bit 5 (x) picks the half of Rm, bit 6 (y) the half of Rs.

    #[inline(always)]
    fn half_selectors(&self) -> (bool, bool) {
        (self.opcode & (1 << 5) != 0, self.opcode & (1 << 6) != 0)
    }

    /// SMLA<x><y>: Rd = Rm.x * Rs.y + Rn
    ///
    /// Q is set if the accumulation overflows; the result wraps.
    pub(crate) fn op_smla_xy(&mut self, bus: &mut Bus) {
        let op = self.mul_operands();
        let (x, y) = self.half_selectors();

        let product = (half(op.lhs, x) * half(op.rhs, y)) as i32;
        let (result, overflow) = product.overflowing_add(self.regs[op.ra] as i32);

        self.regs[op.rd] = result as u32;
        if overflow {
            self.set_flag(Psr::Q, true);
        }

        self.mul_cycles(bus, op.rhs, true, 1);
    }

    /// SMLAL<x><y>: RdHi:RdLo += Rm.x * Rs.y
    pub(crate) fn op_smlal_xy(&mut self, bus: &mut Bus) {
        let op = self.mul_operands();
        let (x, y) = self.half_selectors();

        let product = half(op.lhs, x) * half(op.rhs, y);
        let result = self.long_accumulator(op).wrapping_add(product as u64);

        self.regs[op.ra] = result as u32;
        self.regs[op.rd] = (result >> 32) as u32;

        self.mul_cycles(bus, op.rhs, true, 2);
    }

    /// SMLAW<y>: Rd = (Rm * Rs.y) >> 16 + Rn
    ///
    /// Q is set if the accumulation overflows.
    pub(crate) fn op_smlaw_y(&mut self, bus: &mut Bus) {
        let op = self.mul_operands();
        let (_, y) = self.half_selectors();

        let product = ((op.lhs as i32 as i64 * half(op.rhs, y)) >> 16) as i32;
        let (result, overflow) = product.overflowing_add(self.regs[op.ra] as i32);

        self.regs[op.rd] = result as u32;
        if overflow {
            self.set_flag(Psr::Q, true);
        }

        self.mul_cycles(bus, op.rhs, true, 1);
    }

    /// SMUL<x><y>: Rd = Rm.x * Rs.y
    pub(crate) fn op_smul_xy(&mut self, bus: &mut Bus) {
        let op = self.mul_operands();
        let (x, y) = self.half_selectors();

        self.regs[op.rd] = (half(op.lhs, x) * half(op.rhs, y)) as u32;

        self.mul_cycles(bus, op.rhs, true, 0);
    }

    /// SMULW<y>: Rd = (Rm * Rs.y) >> 16
    pub(crate) fn op_smulw_y(&mut self, bus: &mut Bus) {
        let op = self.mul_operands();
        let (_, y) = self.half_selectors();

        self.regs[op.rd] = ((op.lhs as i32 as i64 * half(op.rhs, y)) >> 16) as u32;

        self.mul_cycles(bus, op.rhs, true, 0);
    }

    /// Thumb MUL Rd, Rm
    ///
    /// Operation: Rd = Rd * Rm; sets N and Z
    pub(crate) fn op_thumb_mul(&mut self, bus: &mut Bus) {
        let rd = low_reg(self.opcode, 0);
        let rhs = self.regs[low_reg(self.opcode, 3)];
        let result = self.regs[rd].wrapping_mul(rhs);

        self.regs[rd] = result;
        self.set_nz(result);

        self.mul_cycles(bus, rhs, true, 0);
    }
}
