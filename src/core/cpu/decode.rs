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

//! Instruction decode tables
//!
//! Both instruction sets dispatch through flat lookup tables built once by
//! expanding bit-pattern/mask registrations into every matching slot.
//!
//! - ARM: 12-bit key made of opcode bits 27:20 and 7:4, with one table for
//!   conditional opcodes and one for the 0xF condition space
//! - Thumb: 11-bit key made of opcode bits 15:5
//!
//! Registration order encodes precedence: a later registration overwrites
//! the slots it shares with an earlier one. Slots nobody claims decode as
//! undefined.

use std::sync::OnceLock;

/// Data-processing operation (ARM opcode bits 24:21)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    And,
    Eor,
    Sub,
    Rsb,
    Add,
    Adc,
    Sbc,
    Rsc,
    Tst,
    Teq,
    Cmp,
    Cmn,
    Orr,
    Mov,
    Bic,
    Mvn,
}

impl AluOp {
    /// Compare/test operations only update flags
    #[inline(always)]
    pub fn is_compare(self) -> bool {
        matches!(self, Self::Tst | Self::Teq | Self::Cmp | Self::Cmn)
    }
}

/// Second operand form of a data-processing instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// 8-bit immediate rotated right by an even amount
    Imm,
    /// Register shifted by a 5-bit immediate
    RegImm,
    /// Register shifted by the low byte of another register
    RegReg,
}

/// Offset form of a single data transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    Imm,
    Reg,
}

/// ARM instruction handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOp {
    Undefined,
    Alu(AluOp, Operand),
    B,
    Bl,
    BlxImm,
    BlxReg,
    Bx,
    Bkpt,
    Svc,
    Clz,
    Mul,
    Mla,
    Umull,
    Umlal,
    Smull,
    Smlal,
    SmlaXy,
    SmlalXy,
    SmlawY,
    SmulXy,
    SmulwY,
    Qadd,
    Qsub,
    Qdadd,
    Qdsub,
    Mrs,
    MsrImm,
    MsrReg,
    Swp,
    Ldm,
    LdmUser,
    Stm,
    StmUser,
    Ldr(Offset),
    Ldrb(Offset),
    Ldrbt(Offset),
    Ldrt(Offset),
    Str(Offset),
    Strb(Offset),
    Strbt(Offset),
    Strt(Offset),
    Ldrh(Offset),
    Ldrsb(Offset),
    Ldrsh(Offset),
    Ldrd(Offset),
    Strh(Offset),
    Strd(Offset),
    /// CDP, LDC, STC, MCR, MRC, MCRR, MRRC: no coprocessors are attached
    Coprocessor,
    /// Preload hint
    Pld,
}

/// Thumb format 4 register ALU operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbAlu {
    And,
    Eor,
    Lsl,
    Lsr,
    Asr,
    Adc,
    Sbc,
    Ror,
    Tst,
    Neg,
    Cmp,
    Cmn,
    Orr,
    Mul,
    Bic,
    Mvn,
}

/// Thumb instruction handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbOp {
    Undefined,
    LslImm,
    LsrImm,
    AsrImm,
    AddReg,
    SubReg,
    AddImm3,
    SubImm3,
    /// MOV Rd, Rm (LSL #0 alias, sets N and Z only)
    MovReg,
    MovImm8,
    CmpImm8,
    AddImm8,
    SubImm8,
    Alu(ThumbAlu),
    AddHi,
    CmpHi,
    MovHi,
    Bx,
    Blx,
    LdrPc,
    LdrReg,
    LdrbReg,
    LdrhReg,
    LdrsbReg,
    LdrshReg,
    StrReg,
    StrbReg,
    StrhReg,
    LdrImm5,
    LdrbImm5,
    LdrhImm5,
    StrImm5,
    StrbImm5,
    StrhImm5,
    LdrSp,
    StrSp,
    Adr,
    AddSpRd,
    AddSp,
    SubSp,
    Push,
    Pop,
    Bkpt,
    Ldm,
    Stm,
    BCond,
    Svc,
    B,
    /// Second half of BLX imm (switches to ARM)
    BlxSuffix,
    /// First half of BL/BLX imm (high offset into LR)
    BlPrefix,
    /// Second half of BL imm
    BlSuffix,
}

/// Size of each ARM table
pub const ARM_TABLE_SIZE: usize = 4096;

/// Size of the Thumb table
pub const THUMB_TABLE_SIZE: usize = 2048;

/// Lookup tables for both instruction sets
pub struct DecodeTables {
    /// Conditional ARM space (cond != 0xF)
    arm_cond: Vec<ArmOp>,

    /// Unconditional ARM space (cond == 0xF)
    arm_uncond: Vec<ArmOp>,

    thumb: Vec<ThumbOp>,
}

static TABLES: OnceLock<DecodeTables> = OnceLock::new();

/// Shared decode tables, built on first use
pub fn tables() -> &'static DecodeTables {
    TABLES.get_or_init(DecodeTables::build)
}

/// ARM table key: opcode bits 27:20 followed by bits 7:4
#[inline(always)]
pub fn arm_key(opcode: u32) -> usize {
    (((opcode >> 16) & 0xff0) | ((opcode >> 4) & 0xf)) as usize
}

/// Thumb table key: opcode bits 15:5
#[inline(always)]
pub fn thumb_key(opcode: u32) -> usize {
    ((opcode >> 5) & 0x7ff) as usize
}

/// Fill every slot of `table` matching `pattern` on the bits set in `mask`
///
/// Bits clear in `mask` are don't-care; all 2^n combinations of them are
/// written.
///
/// # Arguments
///
/// * `table` - Table to fill
/// * `op` - Handler stored in every matching slot
/// * `pattern` - Required bit values
/// * `mask` - Bits of `pattern` that must match
/// * `bits` - Width of the table key
fn register<T: Copy>(table: &mut [T], op: T, pattern: u32, mask: u32, bits: u32) {
    let free: Vec<u32> = (0..bits).filter(|&i| mask & (1 << i) == 0).collect();
    let base = pattern & mask;

    for combo in 0..(1u32 << free.len()) {
        let mut key = base;

        for (j, &pos) in free.iter().enumerate() {
            key |= ((combo >> j) & 1) << pos;
        }

        table[key as usize] = op;
    }
}

impl DecodeTables {
    /// Build both instruction tables
    pub fn build() -> Self {
        let mut cond = vec![ArmOp::Undefined; ARM_TABLE_SIZE];
        let mut uncond = vec![ArmOp::Undefined; ARM_TABLE_SIZE];
        let mut thumb = vec![ThumbOp::Undefined; THUMB_TABLE_SIZE];

        Self::register_arm(&mut cond, &mut uncond);
        Self::register_thumb(&mut thumb);

        log::trace!(
            "Decode tables built: {} ARM / {} Thumb slots defined",
            cond.iter().filter(|&&op| op != ArmOp::Undefined).count(),
            thumb.iter().filter(|&&op| op != ThumbOp::Undefined).count()
        );

        Self {
            arm_cond: cond,
            arm_uncond: uncond,
            thumb,
        }
    }

    /// Handler for a 32-bit ARM opcode
    #[inline(always)]
    pub fn arm(&self, opcode: u32) -> ArmOp {
        let key = arm_key(opcode);

        if opcode >> 28 == 0xf {
            self.arm_uncond[key]
        } else {
            self.arm_cond[key]
        }
    }

    /// Handler for a 16-bit Thumb opcode
    #[inline(always)]
    pub fn thumb(&self, opcode: u32) -> ThumbOp {
        self.thumb[thumb_key(opcode)]
    }

    #[rustfmt::skip]
    fn register_arm(cond: &mut [ArmOp], uncond: &mut [ArmOp]) {
        // Conditional space
        register(cond, ArmOp::Alu(AluOp::Adc, Operand::Imm), 0b001010100000, 0b111111100000, 12);
        register(cond, ArmOp::Alu(AluOp::Adc, Operand::RegImm), 0b000010100000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::Adc, Operand::RegReg), 0b000010100001, 0b111111101001, 12);
        register(cond, ArmOp::Alu(AluOp::Add, Operand::Imm), 0b001010000000, 0b111111100000, 12);
        register(cond, ArmOp::Alu(AluOp::Add, Operand::RegImm), 0b000010000000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::Add, Operand::RegReg), 0b000010000001, 0b111111101001, 12);
        register(cond, ArmOp::Alu(AluOp::And, Operand::Imm), 0b001000000000, 0b111111100000, 12);
        register(cond, ArmOp::Alu(AluOp::And, Operand::RegImm), 0b000000000000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::And, Operand::RegReg), 0b000000000001, 0b111111101001, 12);
        register(cond, ArmOp::Alu(AluOp::Mov, Operand::RegImm), 0b000110100000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::Mov, Operand::RegReg), 0b000110100001, 0b111111101001, 12);
        register(cond, ArmOp::B, 0b101000000000, 0b111100000000, 12);
        register(cond, ArmOp::Alu(AluOp::Bic, Operand::Imm), 0b001111000000, 0b111111100000, 12);
        register(cond, ArmOp::Alu(AluOp::Bic, Operand::RegImm), 0b000111000000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::Bic, Operand::RegReg), 0b000111000001, 0b111111101001, 12);
        register(cond, ArmOp::Bkpt, 0b000100100111, 0b111111111111, 12);
        register(cond, ArmOp::Bl, 0b101100000000, 0b111100000000, 12);
        register(cond, ArmOp::BlxReg, 0b000100100011, 0b111111111111, 12);
        register(cond, ArmOp::Bx, 0b000100100001, 0b111111111111, 12);
        register(cond, ArmOp::Coprocessor, 0b111000000000, 0b111100000001, 12);
        register(cond, ArmOp::Clz, 0b000101100001, 0b111111111111, 12);
        register(cond, ArmOp::Alu(AluOp::Cmn, Operand::Imm), 0b001101110000, 0b111111110000, 12);
        register(cond, ArmOp::Alu(AluOp::Cmn, Operand::RegImm), 0b000101110000, 0b111111110001, 12);
        register(cond, ArmOp::Alu(AluOp::Cmn, Operand::RegReg), 0b000101110001, 0b111111111001, 12);
        register(cond, ArmOp::Alu(AluOp::Cmp, Operand::Imm), 0b001101010000, 0b111111110000, 12);
        register(cond, ArmOp::Alu(AluOp::Cmp, Operand::RegImm), 0b000101010000, 0b111111110001, 12);
        register(cond, ArmOp::Alu(AluOp::Cmp, Operand::RegReg), 0b000101010001, 0b111111111001, 12);
        register(cond, ArmOp::Alu(AluOp::Eor, Operand::Imm), 0b001000100000, 0b111111100000, 12);
        register(cond, ArmOp::Alu(AluOp::Eor, Operand::RegImm), 0b000000100000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::Eor, Operand::RegReg), 0b000000100001, 0b111111101001, 12);
        register(cond, ArmOp::Coprocessor, 0b110000010000, 0b111000010000, 12);
        register(cond, ArmOp::Ldm, 0b100000010000, 0b111001010000, 12);
        register(cond, ArmOp::LdmUser, 0b100001010000, 0b111001010000, 12);
        register(cond, ArmOp::Ldr(Offset::Imm), 0b010000010000, 0b111001010000, 12);
        register(cond, ArmOp::Ldr(Offset::Reg), 0b011000010000, 0b111001010001, 12);
        register(cond, ArmOp::Ldrb(Offset::Imm), 0b010001010000, 0b111001010000, 12);
        register(cond, ArmOp::Ldrb(Offset::Reg), 0b011001010000, 0b111001010001, 12);
        register(cond, ArmOp::Ldrbt(Offset::Imm), 0b010001110000, 0b111101110000, 12);
        register(cond, ArmOp::Ldrbt(Offset::Reg), 0b011001110000, 0b111101110001, 12);
        register(cond, ArmOp::Ldrt(Offset::Imm), 0b010000110000, 0b111101110000, 12);
        register(cond, ArmOp::Ldrt(Offset::Reg), 0b011000110000, 0b111101110001, 12);
        register(cond, ArmOp::Ldrd(Offset::Imm), 0b000001001101, 0b111001011111, 12);
        register(cond, ArmOp::Ldrd(Offset::Reg), 0b000000001101, 0b111001011111, 12);
        register(cond, ArmOp::Ldrh(Offset::Imm), 0b000001011011, 0b111001011111, 12);
        register(cond, ArmOp::Ldrh(Offset::Reg), 0b000000011011, 0b111001011111, 12);
        register(cond, ArmOp::Ldrsb(Offset::Imm), 0b000001011101, 0b111001011111, 12);
        register(cond, ArmOp::Ldrsb(Offset::Reg), 0b000000011101, 0b111001011111, 12);
        register(cond, ArmOp::Ldrsh(Offset::Imm), 0b000001011111, 0b111001011111, 12);
        register(cond, ArmOp::Ldrsh(Offset::Reg), 0b000000011111, 0b111001011111, 12);
        register(cond, ArmOp::Coprocessor, 0b111000000001, 0b111100010001, 12);
        register(cond, ArmOp::Coprocessor, 0b110001000000, 0b111111110000, 12);
        register(cond, ArmOp::Mla, 0b000000101001, 0b111111101111, 12);
        register(cond, ArmOp::Alu(AluOp::Mov, Operand::Imm), 0b001110100000, 0b111111100000, 12);
        register(cond, ArmOp::Coprocessor, 0b111000010001, 0b111100010001, 12);
        register(cond, ArmOp::Coprocessor, 0b110001010000, 0b111111110000, 12);
        register(cond, ArmOp::Mrs, 0b000100000000, 0b111110111111, 12);
        register(cond, ArmOp::MsrImm, 0b001100100000, 0b111110110000, 12);
        register(cond, ArmOp::MsrReg, 0b000100100000, 0b111110111111, 12);
        register(cond, ArmOp::Mul, 0b000000001001, 0b111111101111, 12);
        register(cond, ArmOp::Alu(AluOp::Mvn, Operand::Imm), 0b001111100000, 0b111111100000, 12);
        register(cond, ArmOp::Alu(AluOp::Mvn, Operand::RegImm), 0b000111100000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::Mvn, Operand::RegReg), 0b000111100001, 0b111111101001, 12);
        register(cond, ArmOp::Alu(AluOp::Orr, Operand::Imm), 0b001110000000, 0b111111100000, 12);
        register(cond, ArmOp::Alu(AluOp::Orr, Operand::RegImm), 0b000110000000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::Orr, Operand::RegReg), 0b000110000001, 0b111111101001, 12);
        register(cond, ArmOp::Qadd, 0b000100000101, 0b111111111111, 12);
        register(cond, ArmOp::Qdadd, 0b000101000101, 0b111111111111, 12);
        register(cond, ArmOp::Qdsub, 0b000101100101, 0b111111111111, 12);
        register(cond, ArmOp::Qsub, 0b000100100101, 0b111111111111, 12);
        register(cond, ArmOp::Alu(AluOp::Rsb, Operand::Imm), 0b001001100000, 0b111111100000, 12);
        register(cond, ArmOp::Alu(AluOp::Rsb, Operand::RegImm), 0b000001100000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::Rsb, Operand::RegReg), 0b000001100001, 0b111111101001, 12);
        register(cond, ArmOp::Alu(AluOp::Rsc, Operand::Imm), 0b001011100000, 0b111111100000, 12);
        register(cond, ArmOp::Alu(AluOp::Rsc, Operand::RegImm), 0b000011100000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::Rsc, Operand::RegReg), 0b000011100001, 0b111111101001, 12);
        register(cond, ArmOp::Alu(AluOp::Sbc, Operand::Imm), 0b001011000000, 0b111111100000, 12);
        register(cond, ArmOp::Alu(AluOp::Sbc, Operand::RegImm), 0b000011000000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::Sbc, Operand::RegReg), 0b000011000001, 0b111111101001, 12);
        register(cond, ArmOp::SmlaXy, 0b000100001000, 0b111111111001, 12);
        register(cond, ArmOp::Smlal, 0b000011101001, 0b111111101111, 12);
        register(cond, ArmOp::SmlalXy, 0b000101001000, 0b111111111001, 12);
        register(cond, ArmOp::SmlawY, 0b000100101000, 0b111111111011, 12);
        register(cond, ArmOp::SmulXy, 0b000101101000, 0b111111111001, 12);
        register(cond, ArmOp::Smull, 0b000011001001, 0b111111101111, 12);
        register(cond, ArmOp::SmulwY, 0b000100101010, 0b111111111011, 12);
        register(cond, ArmOp::Coprocessor, 0b110000000000, 0b111000010000, 12);
        register(cond, ArmOp::Stm, 0b100000000000, 0b111001010000, 12);
        register(cond, ArmOp::StmUser, 0b100001000000, 0b111001010000, 12);
        register(cond, ArmOp::Str(Offset::Imm), 0b010000000000, 0b111001010000, 12);
        register(cond, ArmOp::Str(Offset::Reg), 0b011000000000, 0b111001010001, 12);
        register(cond, ArmOp::Strb(Offset::Imm), 0b010001000000, 0b111001010000, 12);
        register(cond, ArmOp::Strb(Offset::Reg), 0b011001000000, 0b111001010001, 12);
        register(cond, ArmOp::Strbt(Offset::Imm), 0b010001100000, 0b111101110000, 12);
        register(cond, ArmOp::Strbt(Offset::Reg), 0b011001100000, 0b111101110001, 12);
        register(cond, ArmOp::Strt(Offset::Imm), 0b010000100000, 0b111101110000, 12);
        register(cond, ArmOp::Strt(Offset::Reg), 0b011000100000, 0b111101110001, 12);
        register(cond, ArmOp::Strd(Offset::Imm), 0b000001001111, 0b111001011111, 12);
        register(cond, ArmOp::Strd(Offset::Reg), 0b000000001111, 0b111001011111, 12);
        register(cond, ArmOp::Strh(Offset::Imm), 0b000001001011, 0b111001011111, 12);
        register(cond, ArmOp::Strh(Offset::Reg), 0b000000001011, 0b111001011111, 12);
        register(cond, ArmOp::Alu(AluOp::Sub, Operand::Imm), 0b001001000000, 0b111111100000, 12);
        register(cond, ArmOp::Alu(AluOp::Sub, Operand::RegImm), 0b000001000000, 0b111111100001, 12);
        register(cond, ArmOp::Alu(AluOp::Sub, Operand::RegReg), 0b000001000001, 0b111111101001, 12);
        register(cond, ArmOp::Svc, 0b111100000000, 0b111100000000, 12);
        register(cond, ArmOp::Swp, 0b000100001001, 0b111110111111, 12);
        register(cond, ArmOp::Alu(AluOp::Teq, Operand::Imm), 0b001100110000, 0b111111110000, 12);
        register(cond, ArmOp::Alu(AluOp::Teq, Operand::RegImm), 0b000100110000, 0b111111110001, 12);
        register(cond, ArmOp::Alu(AluOp::Teq, Operand::RegReg), 0b000100110001, 0b111111111001, 12);
        register(cond, ArmOp::Alu(AluOp::Tst, Operand::Imm), 0b001100010000, 0b111111110000, 12);
        register(cond, ArmOp::Alu(AluOp::Tst, Operand::RegImm), 0b000100010000, 0b111111110001, 12);
        register(cond, ArmOp::Alu(AluOp::Tst, Operand::RegReg), 0b000100010001, 0b111111111001, 12);
        register(cond, ArmOp::Umlal, 0b000010101001, 0b111111101111, 12);
        register(cond, ArmOp::Umull, 0b000010001001, 0b111111101111, 12);

        // Unconditional space
        register(uncond, ArmOp::BlxImm, 0b101000000000, 0b111000000000, 12);
        register(uncond, ArmOp::Coprocessor, 0b111000000000, 0b111100000001, 12);
        register(uncond, ArmOp::Coprocessor, 0b110000010000, 0b111000010000, 12);
        register(uncond, ArmOp::Coprocessor, 0b111000000001, 0b111100010001, 12);
        register(uncond, ArmOp::Coprocessor, 0b110001000000, 0b111111110000, 12);
        register(uncond, ArmOp::Coprocessor, 0b111000010001, 0b111100010001, 12);
        register(uncond, ArmOp::Coprocessor, 0b110001010000, 0b111111110000, 12);
        register(uncond, ArmOp::Pld, 0b010101010000, 0b111101110000, 12);
        register(uncond, ArmOp::Pld, 0b011101010000, 0b111101110000, 12);
        register(uncond, ArmOp::Coprocessor, 0b110000000000, 0b111000010000, 12);
    }

    #[rustfmt::skip]
    fn register_thumb(thumb: &mut [ThumbOp]) {
        register(thumb, ThumbOp::Alu(ThumbAlu::Adc), 0b01000001010, 0b11111111110, 11);
        register(thumb, ThumbOp::AddImm3, 0b00011100000, 0b11111110000, 11);
        register(thumb, ThumbOp::AddImm8, 0b00110000000, 0b11111000000, 11);
        register(thumb, ThumbOp::AddReg, 0b00011000000, 0b11111110000, 11);
        register(thumb, ThumbOp::AddHi, 0b01000100000, 0b11111111000, 11);
        register(thumb, ThumbOp::AddSp, 0b10110000000, 0b11111000000, 11);
        register(thumb, ThumbOp::AddSpRd, 0b10101000000, 0b11111000000, 11);
        register(thumb, ThumbOp::Adr, 0b10100000000, 0b11111000000, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::And), 0b01000000000, 0b11111111110, 11);
        register(thumb, ThumbOp::AsrImm, 0b00010000000, 0b11111000000, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Asr), 0b01000001000, 0b11111111110, 11);
        register(thumb, ThumbOp::BCond, 0b11010000000, 0b11110000000, 11);
        register(thumb, ThumbOp::B, 0b11100000000, 0b11111000000, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Bic), 0b01000011100, 0b11111111110, 11);
        register(thumb, ThumbOp::Bkpt, 0b10111110000, 0b11111111000, 11);
        register(thumb, ThumbOp::Blx, 0b01000111100, 0b11111111100, 11);
        register(thumb, ThumbOp::BlxSuffix, 0b11101000000, 0b11111000000, 11);
        register(thumb, ThumbOp::BlPrefix, 0b11110000000, 0b11111000000, 11);
        register(thumb, ThumbOp::BlSuffix, 0b11111000000, 0b11111000000, 11);
        register(thumb, ThumbOp::Bx, 0b01000111000, 0b11111111100, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Cmn), 0b01000010110, 0b11111111110, 11);
        register(thumb, ThumbOp::CmpImm8, 0b00101000000, 0b11111000000, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Cmp), 0b01000010100, 0b11111111110, 11);
        register(thumb, ThumbOp::CmpHi, 0b01000101000, 0b11111111000, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Eor), 0b01000000010, 0b11111111110, 11);
        register(thumb, ThumbOp::Ldm, 0b11001000000, 0b11111000000, 11);
        register(thumb, ThumbOp::LdrImm5, 0b01101000000, 0b11111000000, 11);
        register(thumb, ThumbOp::LdrSp, 0b10011000000, 0b11111000000, 11);
        register(thumb, ThumbOp::LdrPc, 0b01001000000, 0b11111000000, 11);
        register(thumb, ThumbOp::LdrReg, 0b01011000000, 0b11111110000, 11);
        register(thumb, ThumbOp::LdrbImm5, 0b01111000000, 0b11111000000, 11);
        register(thumb, ThumbOp::LdrbReg, 0b01011100000, 0b11111110000, 11);
        register(thumb, ThumbOp::LdrhImm5, 0b10001000000, 0b11111000000, 11);
        register(thumb, ThumbOp::LdrhReg, 0b01011010000, 0b11111110000, 11);
        register(thumb, ThumbOp::LdrsbReg, 0b01010110000, 0b11111110000, 11);
        register(thumb, ThumbOp::LdrshReg, 0b01011110000, 0b11111110000, 11);
        register(thumb, ThumbOp::LslImm, 0b00000000000, 0b11111000000, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Lsl), 0b01000000100, 0b11111111110, 11);
        register(thumb, ThumbOp::LsrImm, 0b00001000000, 0b11111000000, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Lsr), 0b01000000110, 0b11111111110, 11);
        register(thumb, ThumbOp::MovImm8, 0b00100000000, 0b11111000000, 11);
        register(thumb, ThumbOp::MovHi, 0b01000110000, 0b11111111000, 11);
        register(thumb, ThumbOp::MovReg, 0b00000000000, 0b11111111110, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Mul), 0b01000011010, 0b11111111110, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Mvn), 0b01000011110, 0b11111111110, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Orr), 0b01000011000, 0b11111111110, 11);
        register(thumb, ThumbOp::Pop, 0b10111100000, 0b11111110000, 11);
        register(thumb, ThumbOp::Push, 0b10110100000, 0b11111110000, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Ror), 0b01000001110, 0b11111111110, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Neg), 0b01000010010, 0b11111111110, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Sbc), 0b01000001100, 0b11111111110, 11);
        register(thumb, ThumbOp::Stm, 0b11000000000, 0b11111000000, 11);
        register(thumb, ThumbOp::StrImm5, 0b01100000000, 0b11111000000, 11);
        register(thumb, ThumbOp::StrSp, 0b10010000000, 0b11111000000, 11);
        register(thumb, ThumbOp::StrReg, 0b01010000000, 0b11111110000, 11);
        register(thumb, ThumbOp::StrbImm5, 0b01110000000, 0b11111000000, 11);
        register(thumb, ThumbOp::StrbReg, 0b01010100000, 0b11111110000, 11);
        register(thumb, ThumbOp::StrhImm5, 0b10000000000, 0b11111000000, 11);
        register(thumb, ThumbOp::StrhReg, 0b01010010000, 0b11111110000, 11);
        register(thumb, ThumbOp::SubImm3, 0b00011110000, 0b11111110000, 11);
        register(thumb, ThumbOp::SubImm8, 0b00111000000, 0b11111000000, 11);
        register(thumb, ThumbOp::SubReg, 0b00011010000, 0b11111110000, 11);
        register(thumb, ThumbOp::SubSp, 0b10110000100, 0b11111111100, 11);
        register(thumb, ThumbOp::Svc, 0b11011111100, 0b11111111000, 11);
        register(thumb, ThumbOp::Alu(ThumbAlu::Tst), 0b01000010000, 0b11111111110, 11);
    }
}
