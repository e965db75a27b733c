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

//! Barrel shifter
//!
//! The free functions implement register-specified shift amounts (the low
//! byte of a register). Immediate-amount encodings are translated onto
//! them by [`shift_by_immediate`].

use super::super::decode::Operand;
use super::super::psr::Psr;
use super::super::CPU;
use super::{low_reg, reg_field, DataOp};
use crate::core::memory::Bus;

/// Shift function: `(value, amount, carry_in) -> (result, carry_out)`
pub(super) type ShiftFn = fn(u32, u32, bool) -> (u32, bool);

/// Logical shift left
///
/// An amount of 32 yields 0 with carry = bit 0; above 32 both are 0.
pub(super) fn lsl(value: u32, amount: u32, carry: bool) -> (u32, bool) {
    match amount {
        0 => (value, carry),
        1..=31 => (value << amount, value & (1 << (32 - amount)) != 0),
        32 => (0, value & 1 != 0),
        _ => (0, false),
    }
}

/// Logical shift right
///
/// An amount of 32 yields 0 with carry = bit 31; above 32 both are 0.
pub(super) fn lsr(value: u32, amount: u32, carry: bool) -> (u32, bool) {
    match amount {
        0 => (value, carry),
        1..=31 => (value >> amount, value & (1 << (amount - 1)) != 0),
        32 => (0, value & 0x8000_0000 != 0),
        _ => (0, false),
    }
}

/// Arithmetic shift right
///
/// Amounts of 32 and above fill with the sign bit, which is also the carry.
pub(super) fn asr(value: u32, amount: u32, carry: bool) -> (u32, bool) {
    match amount {
        0 => (value, carry),
        1..=31 => (
            ((value as i32) >> amount) as u32,
            value & (1 << (amount - 1)) != 0,
        ),
        _ => (((value as i32) >> 31) as u32, value & 0x8000_0000 != 0),
    }
}

/// Rotate right
///
/// A non-zero multiple of 32 leaves the value unchanged with carry = bit 31.
pub(super) fn ror(value: u32, amount: u32, carry: bool) -> (u32, bool) {
    if amount == 0 {
        return (value, carry);
    }

    match amount & 0x1f {
        0 => (value, value & 0x8000_0000 != 0),
        n => (value.rotate_right(n), value & (1 << (n - 1)) != 0),
    }
}

/// Rotate right extended: a 33-bit rotation through carry
pub(super) fn rrx(value: u32, carry: bool) -> (u32, bool) {
    (((carry as u32) << 31) | (value >> 1), value & 1 != 0)
}

/// Apply an immediate-amount shift (ARM register operand, Thumb format 1)
///
/// LSR #0 and ASR #0 encode a shift by 32; ROR #0 encodes RRX.
///
/// # Arguments
///
/// * `kind` - Shift type (0 = LSL, 1 = LSR, 2 = ASR, 3 = ROR)
/// * `value` - Value to shift
/// * `imm` - 5-bit immediate amount
/// * `carry` - Current C flag
pub(super) fn shift_by_immediate(kind: u32, value: u32, imm: u32, carry: bool) -> (u32, bool) {
    match (kind & 3, imm) {
        (0, _) => lsl(value, imm, carry),
        (1, 0) => lsr(value, 32, carry),
        (1, _) => lsr(value, imm, carry),
        (2, 0) => asr(value, 32, carry),
        (2, _) => asr(value, imm, carry),
        (_, 0) => rrx(value, carry),
        (_, _) => ror(value, imm, carry),
    }
}

/// Apply a register-amount shift
pub(super) fn shift_by_register(kind: u32, value: u32, amount: u32, carry: bool) -> (u32, bool) {
    let amount = amount & 0xff;

    match kind & 3 {
        0 => lsl(value, amount, carry),
        1 => lsr(value, amount, carry),
        2 => asr(value, amount, carry),
        _ => ror(value, amount, carry),
    }
}

impl CPU {
    // === ARM shifter operands ===

    /// Decode the operands of an ARM data-processing instruction
    ///
    /// Format: cond | 00 | I | opcode | S | Rn | Rd | shifter operand
    ///
    /// - Imm: `imm8 ROR (rot * 2)`; carry-out is bit 31 of the result when
    ///   rotated, the current C flag otherwise
    /// - RegImm: `Rm <shift> #imm5`
    /// - RegReg: `Rm <shift> Rs`; costs one internal cycle, and r15 reads
    ///   4 bytes further ahead as either Rn or Rm
    pub(super) fn arm_operand(&mut self, bus: &mut Bus, form: Operand) -> DataOp {
        let opcode = self.opcode;
        let rn = reg_field(opcode, 16);
        let rd = reg_field(opcode, 12);
        let set_flags = opcode & (1 << 20) != 0;
        let carry_in = self.flag(Psr::C);

        let mut lhs = self.regs[rn];

        let (rhs, carry) = match form {
            Operand::Imm => {
                let imm = opcode & 0xff;
                let rot = ((opcode >> 8) & 0xf) * 2;
                let value = imm.rotate_right(rot);

                if rot == 0 {
                    (value, carry_in)
                } else {
                    (value, value & 0x8000_0000 != 0)
                }
            }
            Operand::RegImm => {
                let rm = reg_field(opcode, 0);
                let kind = (opcode >> 5) & 3;
                let imm = (opcode >> 7) & 0x1f;

                shift_by_immediate(kind, self.regs[rm], imm, carry_in)
            }
            Operand::RegReg => {
                let rm = reg_field(opcode, 0);
                let rs = reg_field(opcode, 8);
                let kind = (opcode >> 5) & 3;

                let mut value = self.regs[rm];
                if rm == 15 {
                    value = value.wrapping_add(4);
                }
                if rn == 15 {
                    lhs = lhs.wrapping_add(4);
                }

                bus.add_cycles(1);
                self.seq_to_nonseq(bus);

                shift_by_register(kind, value, self.regs[rs], carry_in)
            }
        };

        DataOp {
            rd,
            lhs,
            rhs,
            carry,
            set_flags,
        }
    }

    // === Thumb shifts ===

    /// Format 1 operands: Rd = bits 0-2, Rm = bits 3-5, imm5 = bits 6-10
    fn thumb_imm5_operand(&self) -> DataOp {
        let opcode = self.opcode;

        DataOp {
            rd: low_reg(opcode, 0),
            lhs: self.regs[low_reg(opcode, 3)],
            rhs: (opcode >> 6) & 0x1f,
            carry: self.flag(Psr::C),
            set_flags: true,
        }
    }

    /// Write a shift result and update N, Z and C
    fn thumb_shift_result(&mut self, rd: usize, result: u32, carry: bool) {
        self.regs[rd] = result;
        self.set_nz(result);
        self.set_flag(Psr::C, carry);
    }

    /// LSL Rd, Rm, #imm5
    ///
    /// The #0 encoding is claimed by MOV Rd, Rm in the decode table.
    pub(crate) fn op_thumb_lsl_imm(&mut self, _bus: &mut Bus) {
        let op = self.thumb_imm5_operand();
        let (result, carry) = shift_by_immediate(0, op.lhs, op.rhs, op.carry);
        self.thumb_shift_result(op.rd, result, carry);
    }

    /// LSR Rd, Rm, #imm5 (#0 shifts by 32)
    pub(crate) fn op_thumb_lsr_imm(&mut self, _bus: &mut Bus) {
        let op = self.thumb_imm5_operand();
        let (result, carry) = shift_by_immediate(1, op.lhs, op.rhs, op.carry);
        self.thumb_shift_result(op.rd, result, carry);
    }

    /// ASR Rd, Rm, #imm5 (#0 shifts by 32)
    pub(crate) fn op_thumb_asr_imm(&mut self, _bus: &mut Bus) {
        let op = self.thumb_imm5_operand();
        let (result, carry) = shift_by_immediate(2, op.lhs, op.rhs, op.carry);
        self.thumb_shift_result(op.rd, result, carry);
    }

    /// LSL/LSR/ASR/ROR Rd, Rs (format 4)
    ///
    /// The amount is the low byte of Rs. Like the ARM register-shift form
    /// this costs one internal cycle.
    pub(super) fn thumb_shift_reg(&mut self, bus: &mut Bus, op: DataOp, shift: ShiftFn) {
        let (result, carry) = shift(op.lhs, op.rhs & 0xff, self.flag(Psr::C));
        self.thumb_shift_result(op.rd, result, carry);

        bus.add_cycles(1);
        self.seq_to_nonseq(bus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsl_edges() {
        assert_eq!(lsl(0x8000_0001, 1, false), (2, true));
        assert_eq!(lsl(1, 32, false), (0, true));
        assert_eq!(lsl(1, 33, true), (0, false));
    }

    #[test]
    fn test_lsr_edges() {
        assert_eq!(lsr(0x8000_0000, 31, false), (1, false));
        assert_eq!(lsr(0x8000_0000, 32, false), (0, true));
        assert_eq!(lsr(0xFFFF_FFFF, 40, true), (0, false));
    }

    #[test]
    fn test_asr_fills_sign() {
        assert_eq!(asr(0x8000_0000, 4, false), (0xF800_0000, false));
        assert_eq!(asr(0x8000_0000, 100, false), (0xFFFF_FFFF, true));
        assert_eq!(asr(0x4000_0000, 32, true), (0, false));
    }

    #[test]
    fn test_ror_multiples_of_32() {
        assert_eq!(ror(0x8000_0001, 32, false), (0x8000_0001, true));
        assert_eq!(ror(0x0000_0001, 64, true), (0x0000_0001, false));
        assert_eq!(ror(0x0000_0001, 1, false), (0x8000_0000, true));
    }

    #[test]
    fn test_zero_amount_keeps_carry() {
        let shifts: [ShiftFn; 4] = [lsl, lsr, asr, ror];

        for shift in shifts {
            assert_eq!(shift(0x1234, 0, true), (0x1234, true));
            assert_eq!(shift(0x1234, 0, false), (0x1234, false));
        }
    }

    #[test]
    fn test_immediate_zero_encodings() {
        assert_eq!(shift_by_immediate(0, 7, 0, true), (7, true));
        assert_eq!(shift_by_immediate(1, 0x8000_0000, 0, false), (0, true));
        assert_eq!(shift_by_immediate(2, 0x8000_0000, 0, false), (0xFFFF_FFFF, true));
        assert_eq!(shift_by_immediate(3, 3, 0, true), (0x8000_0001, true));
    }

    #[test]
    fn test_register_amount_uses_low_byte() {
        assert_eq!(shift_by_register(0, 1, 0x104, false), (0x10, false));
        assert_eq!(shift_by_register(3, 0xF, 0x100, true), (0xF, true));
    }
}
