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

use super::super::*;
use super::{arm_program, CODE};

/// Run one shift instruction with r0 = value, r1 = amount and C = carry
fn shifted(opcode: u32, value: u32, amount: u32, carry: bool) -> (u32, bool) {
    let (mut cpu, mut bus) = arm_program(&[opcode]);
    cpu.set_reg(0, value);
    cpu.set_reg(1, amount);
    cpu.set_flag(Psr::C, carry);

    cpu.step(&mut bus);

    (cpu.reg(2), cpu.flag(Psr::C))
}

#[test]
fn test_lsl_immediate() {
    // MOV r2, r0, LSL #4
    let (result, _) = shifted(0xE1A02200, 0xF1, 0, false);
    assert_eq!(result, 0xF10);
}

#[test]
fn test_lsr_immediate_carry() {
    // MOVS r2, r0, LSR #1
    assert_eq!(shifted(0xE1B020A0, 3, 0, false), (1, true));
}

#[test]
fn test_lsr_zero_encodes_32() {
    // MOVS r2, r0, LSR #32
    assert_eq!(shifted(0xE1B02020, 0x8000_0000, 0, false), (0, true));
}

#[test]
fn test_asr_zero_encodes_32() {
    // MOVS r2, r0, ASR #32
    assert_eq!(shifted(0xE1B02040, 0x8000_0000, 0, false), (0xFFFF_FFFF, true));
    assert_eq!(shifted(0xE1B02040, 0x7FFF_FFFF, 0, true), (0, false));
}

#[test]
fn test_ror_zero_encodes_rrx() {
    // MOVS r2, r0, RRX
    assert_eq!(shifted(0xE1B02060, 1, 0, true), (0x8000_0000, true));
    assert_eq!(shifted(0xE1B02060, 2, 0, false), (1, false));
}

#[test]
fn test_ror_immediate() {
    // MOVS r2, r0, ROR #8
    assert_eq!(shifted(0xE1B02460, 0x1234_5678, 0, true), (0x7812_3456, false));
}

#[test]
fn test_register_shift_amounts() {
    // MOVS r2, r0, LSL r1
    assert_eq!(shifted(0xE1B02110, 1, 31, false), (0x8000_0000, false));
    assert_eq!(shifted(0xE1B02110, 1, 32, false), (0, true));
    assert_eq!(shifted(0xE1B02110, 1, 33, true), (0, false));
}

#[test]
fn test_register_shift_uses_low_byte() {
    // MOVS r2, r0, LSL r1: amount 0x100 is a shift by 0, carry unchanged
    assert_eq!(shifted(0xE1B02110, 0x55, 0x100, true), (0x55, true));
    assert_eq!(shifted(0xE1B02110, 0x55, 0x101, false), (0xAA, false));
}

#[test]
fn test_register_shift_reads_pc_plus_12() {
    // ADD r2, pc, pc, LSL r1
    let (result, _) = shifted(0xE08F211F, 0, 0, false);
    assert_eq!(result, (CODE + 12) * 2);
}

#[test]
fn test_register_shift_costs_internal_cycle() {
    // MOV r2, r0, LSL #4 / MOVS r2, r0, LSL r1
    let (mut cpu, mut bus) = arm_program(&[0xE1A02200, 0xE1B02110]);

    let immediate = cpu.step(&mut bus);
    let register = cpu.step(&mut bus);

    assert_eq!(immediate, 1);
    assert_eq!(register, 2);
}
