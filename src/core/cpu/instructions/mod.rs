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

//! CPU instruction implementations
//!
//! Handlers are grouped by instruction class. Each ARM and Thumb handler is
//! a `pub(crate) fn op_*` on [`CPU`] that decodes its own operand fields
//! from the current opcode.

use super::decode::{AluOp, ArmOp, ThumbAlu, ThumbOp};
use super::psr::condition_passed;
use super::CPU;
use crate::core::memory::Bus;

mod arithmetic;
mod block;
mod branch;
mod exception;
mod load;
mod logical;
mod multiply;
mod shift;
mod status;
mod store;

/// Resolved data-processing operands
///
/// Built by the operand decoders of both instruction sets and consumed by
/// the arithmetic and logical cores.
#[derive(Debug, Clone, Copy)]
pub(super) struct DataOp {
    /// Destination register
    pub rd: usize,

    /// First operand (Rn)
    pub lhs: u32,

    /// Second operand after the barrel shifter
    pub rhs: u32,

    /// Shifter carry-out
    pub carry: bool,

    /// Update flags (S bit)
    pub set_flags: bool,
}

/// Extract a 4-bit register field
#[inline(always)]
pub(super) fn reg_field(opcode: u32, shift: u32) -> usize {
    ((opcode >> shift) & 0xf) as usize
}

/// Extract a 3-bit Thumb low register field
#[inline(always)]
pub(super) fn low_reg(opcode: u32, shift: u32) -> usize {
    ((opcode >> shift) & 0x7) as usize
}

impl CPU {
    /// Execute the current ARM opcode
    ///
    /// Condition code 0xF selects the unconditional table; any other code
    /// must pass against CPSR before the handler runs.
    pub(super) fn execute_arm(&mut self, bus: &mut Bus) {
        let opcode = self.opcode;
        let cond = opcode >> 28;

        if cond != 0xf && !condition_passed(self.cpsr, cond) {
            return;
        }

        match self.tables.arm(opcode) {
            ArmOp::Undefined => self.op_undefined(bus),
            ArmOp::Alu(op, form) => self.op_alu(bus, op, form),
            ArmOp::B => self.op_b(bus),
            ArmOp::Bl => self.op_bl(bus),
            ArmOp::BlxImm => self.op_blx_imm(bus),
            ArmOp::BlxReg => self.op_blx_reg(bus),
            ArmOp::Bx => self.op_bx(bus),
            ArmOp::Bkpt => self.op_bkpt(bus),
            ArmOp::Svc => self.op_svc(bus),
            ArmOp::Clz => self.op_clz(),
            ArmOp::Mul => self.op_mul(bus),
            ArmOp::Mla => self.op_mla(bus),
            ArmOp::Umull => self.op_umull(bus),
            ArmOp::Umlal => self.op_umlal(bus),
            ArmOp::Smull => self.op_smull(bus),
            ArmOp::Smlal => self.op_smlal(bus),
            ArmOp::SmlaXy => self.op_smla_xy(bus),
            ArmOp::SmlalXy => self.op_smlal_xy(bus),
            ArmOp::SmlawY => self.op_smlaw_y(bus),
            ArmOp::SmulXy => self.op_smul_xy(bus),
            ArmOp::SmulwY => self.op_smulw_y(bus),
            ArmOp::Qadd => self.op_qadd(),
            ArmOp::Qsub => self.op_qsub(),
            ArmOp::Qdadd => self.op_qdadd(),
            ArmOp::Qdsub => self.op_qdsub(),
            ArmOp::Mrs => self.op_mrs(),
            ArmOp::MsrImm => self.op_msr_imm(),
            ArmOp::MsrReg => self.op_msr_reg(),
            ArmOp::Swp => self.op_swp(bus),
            ArmOp::Ldm => self.op_ldm(bus),
            ArmOp::LdmUser => self.op_ldm_user(bus),
            ArmOp::Stm => self.op_stm(bus),
            ArmOp::StmUser => self.op_stm_user(bus),
            ArmOp::Ldr(offset) => self.op_ldr(bus, offset),
            ArmOp::Ldrb(offset) => self.op_ldrb(bus, offset),
            ArmOp::Ldrbt(offset) => self.op_ldrbt(bus, offset),
            ArmOp::Ldrt(offset) => self.op_ldrt(bus, offset),
            ArmOp::Str(offset) => self.op_str(bus, offset),
            ArmOp::Strb(offset) => self.op_strb(bus, offset),
            ArmOp::Strbt(offset) => self.op_strbt(bus, offset),
            ArmOp::Strt(offset) => self.op_strt(bus, offset),
            ArmOp::Ldrh(offset) => self.op_ldrh(bus, offset),
            ArmOp::Ldrsb(offset) => self.op_ldrsb(bus, offset),
            ArmOp::Ldrsh(offset) => self.op_ldrsh(bus, offset),
            ArmOp::Ldrd(offset) => self.op_ldrd(bus, offset),
            ArmOp::Strh(offset) => self.op_strh(bus, offset),
            ArmOp::Strd(offset) => self.op_strd(bus, offset),
            ArmOp::Coprocessor | ArmOp::Pld => {}
        }
    }

    /// Execute the current Thumb opcode
    pub(super) fn execute_thumb(&mut self, bus: &mut Bus) {
        match self.tables.thumb(self.opcode) {
            ThumbOp::Undefined => self.op_undefined(bus),
            ThumbOp::LslImm => self.op_thumb_lsl_imm(bus),
            ThumbOp::LsrImm => self.op_thumb_lsr_imm(bus),
            ThumbOp::AsrImm => self.op_thumb_asr_imm(bus),
            ThumbOp::AddReg => self.op_thumb_add_reg(bus),
            ThumbOp::SubReg => self.op_thumb_sub_reg(bus),
            ThumbOp::AddImm3 => self.op_thumb_add_imm3(bus),
            ThumbOp::SubImm3 => self.op_thumb_sub_imm3(bus),
            ThumbOp::MovReg => self.op_thumb_mov_reg(),
            ThumbOp::MovImm8 => self.op_thumb_mov_imm8(),
            ThumbOp::CmpImm8 => self.op_thumb_cmp_imm8(),
            ThumbOp::AddImm8 => self.op_thumb_add_imm8(bus),
            ThumbOp::SubImm8 => self.op_thumb_sub_imm8(bus),
            ThumbOp::Alu(op) => self.op_thumb_alu(bus, op),
            ThumbOp::AddHi => self.op_thumb_add_hi(bus),
            ThumbOp::CmpHi => self.op_thumb_cmp_hi(),
            ThumbOp::MovHi => self.op_thumb_mov_hi(bus),
            ThumbOp::Bx => self.op_thumb_bx(bus),
            ThumbOp::Blx => self.op_thumb_blx(bus),
            ThumbOp::LdrPc => self.op_thumb_ldr_pc(bus),
            ThumbOp::LdrReg => self.op_thumb_ldr_reg(bus),
            ThumbOp::LdrbReg => self.op_thumb_ldrb_reg(bus),
            ThumbOp::LdrhReg => self.op_thumb_ldrh_reg(bus),
            ThumbOp::LdrsbReg => self.op_thumb_ldrsb_reg(bus),
            ThumbOp::LdrshReg => self.op_thumb_ldrsh_reg(bus),
            ThumbOp::StrReg => self.op_thumb_str_reg(bus),
            ThumbOp::StrbReg => self.op_thumb_strb_reg(bus),
            ThumbOp::StrhReg => self.op_thumb_strh_reg(bus),
            ThumbOp::LdrImm5 => self.op_thumb_ldr_imm5(bus),
            ThumbOp::LdrbImm5 => self.op_thumb_ldrb_imm5(bus),
            ThumbOp::LdrhImm5 => self.op_thumb_ldrh_imm5(bus),
            ThumbOp::StrImm5 => self.op_thumb_str_imm5(bus),
            ThumbOp::StrbImm5 => self.op_thumb_strb_imm5(bus),
            ThumbOp::StrhImm5 => self.op_thumb_strh_imm5(bus),
            ThumbOp::LdrSp => self.op_thumb_ldr_sp(bus),
            ThumbOp::StrSp => self.op_thumb_str_sp(bus),
            ThumbOp::Adr => self.op_thumb_adr(bus),
            ThumbOp::AddSpRd => self.op_thumb_add_sp_rd(bus),
            ThumbOp::AddSp => self.op_thumb_add_sp(bus),
            ThumbOp::SubSp => self.op_thumb_sub_sp(bus),
            ThumbOp::Push => self.op_thumb_push(bus),
            ThumbOp::Pop => self.op_thumb_pop(bus),
            ThumbOp::Bkpt => self.op_bkpt(bus),
            ThumbOp::Ldm => self.op_thumb_ldm(bus),
            ThumbOp::Stm => self.op_thumb_stm(bus),
            ThumbOp::BCond => self.op_thumb_b_cond(bus),
            ThumbOp::Svc => self.op_svc(bus),
            ThumbOp::B => self.op_thumb_b(bus),
            ThumbOp::BlxSuffix => self.op_thumb_blx_suffix(bus),
            ThumbOp::BlPrefix => self.op_thumb_bl_prefix(),
            ThumbOp::BlSuffix => self.op_thumb_bl_suffix(bus),
        }
    }

    /// Thumb format 4: register-to-register ALU operation on r0-r7
    fn op_thumb_alu(&mut self, bus: &mut Bus, op: ThumbAlu) {
        let data = self.thumb_rdn3_operand();

        match op {
            ThumbAlu::And => self.alu(bus, AluOp::And, data),
            ThumbAlu::Eor => self.alu(bus, AluOp::Eor, data),
            ThumbAlu::Lsl => self.thumb_shift_reg(bus, data, shift::lsl),
            ThumbAlu::Lsr => self.thumb_shift_reg(bus, data, shift::lsr),
            ThumbAlu::Asr => self.thumb_shift_reg(bus, data, shift::asr),
            ThumbAlu::Ror => self.thumb_shift_reg(bus, data, shift::ror),
            ThumbAlu::Adc => self.alu(bus, AluOp::Adc, data),
            ThumbAlu::Sbc => self.alu(bus, AluOp::Sbc, data),
            ThumbAlu::Tst => self.alu(bus, AluOp::Tst, data),
            ThumbAlu::Neg => {
                // RSB Rd, Rm, #0
                let neg = DataOp {
                    lhs: 0,
                    rhs: data.rhs,
                    ..data
                };
                self.alu(bus, AluOp::Sub, neg);
            }
            ThumbAlu::Cmp => self.alu(bus, AluOp::Cmp, data),
            ThumbAlu::Cmn => self.alu(bus, AluOp::Cmn, data),
            ThumbAlu::Orr => self.alu(bus, AluOp::Orr, data),
            ThumbAlu::Mul => self.op_thumb_mul(bus),
            ThumbAlu::Bic => self.alu(bus, AluOp::Bic, data),
            ThumbAlu::Mvn => self.alu(bus, AluOp::Mvn, data),
        }
    }
}
