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
use super::{arm_program, CODE, DATA};

/// One-instruction program with r1 pointing at `DATA`
fn setup(opcode: u32) -> (CPU, Bus) {
    let (mut cpu, bus) = arm_program(&[opcode]);
    cpu.set_reg(1, DATA);
    (cpu, bus)
}

// === Single transfers ===

#[test]
fn test_ldr_offset() {
    // LDR r0, [r1]
    let (mut cpu, mut bus) = setup(0xE5910000);
    bus.write_word(DATA, 0xDEAD_BEEF);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0xDEAD_BEEF);
    assert_eq!(cpu.reg(1), DATA);
}

#[test]
fn test_ldr_pre_indexed_writeback() {
    // LDR r0, [r1, #4]!
    let (mut cpu, mut bus) = setup(0xE5B10004);
    bus.write_word(DATA + 4, 0x1234_5678);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0x1234_5678);
    assert_eq!(cpu.reg(1), DATA + 4);
}

#[test]
fn test_ldr_post_indexed() {
    // LDR r0, [r1], #4
    let (mut cpu, mut bus) = setup(0xE4910004);
    bus.write_word(DATA, 0xAAAA_5555);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0xAAAA_5555);
    assert_eq!(cpu.reg(1), DATA + 4);
}

#[test]
fn test_ldr_negative_offset() {
    // LDR r0, [r1, #-4]
    let (mut cpu, mut bus) = setup(0xE5110004);
    cpu.set_reg(1, DATA + 4);
    bus.write_word(DATA, 0x0BAD_F00D);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0x0BAD_F00D);
    assert_eq!(cpu.reg(1), DATA + 4);
}

#[test]
fn test_ldr_scaled_register_offset() {
    // LDR r0, [r1, r2, LSL #2]
    let (mut cpu, mut bus) = setup(0xE7910102);
    cpu.set_reg(2, 2);
    bus.write_word(DATA + 8, 0x0000_0808);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0x0000_0808);
}

#[test]
fn test_ldr_misaligned_rotates() {
    // LDR r0, [r1]
    let (mut cpu, mut bus) = setup(0xE5910000);
    cpu.set_reg(1, DATA + 1);
    bus.write_word(DATA, 0x1122_3344);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0x4411_2233);
}

#[test]
fn test_ldrb_zero_extends() {
    // LDRB r0, [r1]
    let (mut cpu, mut bus) = setup(0xE5D10000);
    cpu.set_reg(1, DATA + 3);
    bus.write_word(DATA, 0x8022_3344);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0x80);
}

#[test]
fn test_load_into_base_keeps_loaded_value() {
    // LDR r1, [r1, #4]!
    let (mut cpu, mut bus) = setup(0xE5B11004);
    bus.write_word(DATA + 4, 0x5555_AAAA);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(1), 0x5555_AAAA);
}

#[test]
fn test_ldr_pc_jumps() {
    // LDR pc, [r1]
    let (mut cpu, mut bus) = setup(0xE591F000);
    bus.write_word(DATA, CODE + 0x100);

    cpu.step(&mut bus);

    assert_eq!(cpu.next_address(), CODE + 0x100);
    assert!(!cpu.is_thumb());
}

#[test]
fn test_str_and_strb() {
    // STR r0, [r1] / STRB r0, [r1]
    let (mut cpu, mut bus) = setup(0xE5810000);
    cpu.set_reg(0, 0xCAFE_BABE);
    cpu.step(&mut bus);
    assert_eq!(bus.read_word(DATA), 0xCAFE_BABE);

    let (mut cpu, mut bus) = setup(0xE5C10000);
    bus.write_word(DATA, 0xFFFF_FFFF);
    cpu.set_reg(0, 0x1234_5642);
    cpu.step(&mut bus);
    assert_eq!(bus.read_word(DATA), 0xFFFF_FF42);
}

#[test]
fn test_str_pc_stores_plus_12() {
    // STR pc, [r1]
    let (mut cpu, mut bus) = setup(0xE581F000);

    cpu.step(&mut bus);

    assert_eq!(bus.read_word(DATA), CODE + 12);
}

#[test]
fn test_store_base_reads_before_writeback() {
    // STR r1, [r1, #4]!
    let (mut cpu, mut bus) = setup(0xE5A11004);

    cpu.step(&mut bus);

    assert_eq!(bus.read_word(DATA + 4), DATA);
    assert_eq!(cpu.reg(1), DATA + 4);
}

// === Halfword and signed transfers ===

#[test]
fn test_ldrh_and_strh() {
    // STRH r0, [r1, #2] / LDRH r0, [r1, #2]
    let (mut cpu, mut bus) = setup(0xE1C100B2);
    cpu.set_reg(0, 0xFFFF_BEEF);
    cpu.step(&mut bus);
    assert_eq!(bus.read_word(DATA), 0xBEEF_0000);

    let (mut cpu, mut bus) = setup(0xE1D100B2);
    bus.write_word(DATA, 0x8001_0000);
    cpu.step(&mut bus);
    assert_eq!(cpu.reg(0), 0x8001);
}

#[test]
fn test_ldrsb_sign_extends() {
    // LDRSB r0, [r1]
    let (mut cpu, mut bus) = setup(0xE1D100D0);
    bus.write_byte(DATA, 0x80);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0xFFFF_FF80);
}

#[test]
fn test_ldrsh_sign_extends() {
    // LDRSH r0, [r1]
    let (mut cpu, mut bus) = setup(0xE1D100F0);
    bus.write_half(DATA, 0x8000);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0xFFFF_8000);
}

#[test]
fn test_ldrsh_misaligned_reads_byte() {
    // LDRSH r0, [r1] at an odd address
    let (mut cpu, mut bus) = setup(0xE1D100F0);
    cpu.set_reg(1, DATA + 1);
    bus.write_half(DATA, 0xFF00);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0xFFFF_FFFF);
}

#[test]
fn test_ldrd_and_strd() {
    // STRD r2, [r1]
    let (mut cpu, mut bus) = setup(0xE1C120F0);
    cpu.set_reg(2, 0x1111_1111);
    cpu.set_reg(3, 0x2222_2222);
    cpu.step(&mut bus);
    assert_eq!(bus.read_word(DATA), 0x1111_1111);
    assert_eq!(bus.read_word(DATA + 4), 0x2222_2222);

    // LDRD r2, [r1]
    let (mut cpu, mut bus) = setup(0xE1C120D0);
    bus.write_word(DATA, 0x3333_3333);
    bus.write_word(DATA + 4, 0x4444_4444);
    cpu.step(&mut bus);
    assert_eq!(cpu.reg(2), 0x3333_3333);
    assert_eq!(cpu.reg(3), 0x4444_4444);
}

// === Swap ===

#[test]
fn test_swp() {
    // SWP r0, r2, [r1]
    let (mut cpu, mut bus) = setup(0xE1010092);
    cpu.set_reg(2, 0xABCD_EF01);
    bus.write_word(DATA, 0x1234_5678);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0x1234_5678);
    assert_eq!(bus.read_word(DATA), 0xABCD_EF01);
}

#[test]
fn test_swpb() {
    // SWPB r0, r2, [r1]
    let (mut cpu, mut bus) = setup(0xE1410092);
    cpu.set_reg(2, 0xFFFF_FF99);
    bus.write_word(DATA, 0x1234_5678);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0x78);
    assert_eq!(bus.read_word(DATA), 0x1234_5699);
}

// === User-mode transfers ===

#[test]
fn test_ldrbt_targets_user_register() {
    // LDRBT r13, [r1], #1 from Supervisor mode
    let (mut cpu, mut bus) = setup(0xE4F1D001);
    cpu.set_reg(13, 0x0300_7FE0);
    bus.write_byte(DATA, 0x5A);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(13), 0x0300_7FE0);
    assert_eq!(cpu.reg(1), DATA + 1);

    cpu.switch_mode(CpuMode::System);
    assert_eq!(cpu.reg(13), 0x5A);
}

#[test]
fn test_strbt_stores_user_register() {
    // STRBT r14, [r1]
    let (mut cpu, mut bus) = setup(0xE4E1E000);
    cpu.switch_mode(CpuMode::System);
    cpu.set_reg(14, 0x77);
    cpu.switch_mode(CpuMode::Supervisor);
    cpu.set_reg(14, 0x33);

    cpu.step(&mut bus);

    assert_eq!(bus.read_byte(DATA), 0x77);
    assert_eq!(cpu.reg(14), 0x33);
    assert_eq!(cpu.mode(), Some(CpuMode::Supervisor));
}

#[test]
fn test_ldrt_targets_user_register() {
    // LDRT r13, [r1], #4 from Supervisor mode
    let (mut cpu, mut bus) = setup(0xE4B1D004);
    cpu.set_reg(13, 0x0300_7FE0);
    bus.write_word(DATA, 0xCAFE_BABE);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(13), 0x0300_7FE0);
    assert_eq!(cpu.reg(1), DATA + 4);

    cpu.switch_mode(CpuMode::System);
    assert_eq!(cpu.reg(13), 0xCAFE_BABE);
}

#[test]
fn test_strt_stores_user_register() {
    // STRT r14, [r1]
    let (mut cpu, mut bus) = setup(0xE4A1E000);
    cpu.switch_mode(CpuMode::System);
    cpu.set_reg(14, 0x1122_3344);
    cpu.switch_mode(CpuMode::Supervisor);
    cpu.set_reg(14, 0x33);

    cpu.step(&mut bus);

    assert_eq!(bus.read_word(DATA), 0x1122_3344);
    assert_eq!(cpu.reg(14), 0x33);
    assert_eq!(cpu.mode(), Some(CpuMode::Supervisor));
}

// === Block transfers ===

#[test]
fn test_ldmia_writeback() {
    // LDMIA r0!, {r1-r3}
    let (mut cpu, mut bus) = arm_program(&[0xE8B0000E]);
    cpu.set_reg(0, DATA);
    for i in 0..3 {
        bus.write_word(DATA + i * 4, 10 + i);
    }

    cpu.step(&mut bus);

    assert_eq!((cpu.reg(1), cpu.reg(2), cpu.reg(3)), (10, 11, 12));
    assert_eq!(cpu.reg(0), DATA + 12);
}

#[test]
fn test_ldm_addressing_modes() {
    // LDMDB r0!, {r1, r2}
    let (mut cpu, mut bus) = arm_program(&[0xE9300006]);
    cpu.set_reg(0, DATA + 8);
    bus.write_word(DATA, 1);
    bus.write_word(DATA + 4, 2);
    cpu.step(&mut bus);
    assert_eq!((cpu.reg(1), cpu.reg(2)), (1, 2));
    assert_eq!(cpu.reg(0), DATA);

    // LDMIB r0, {r1}
    let (mut cpu, mut bus) = arm_program(&[0xE9900002]);
    cpu.set_reg(0, DATA);
    bus.write_word(DATA + 4, 3);
    cpu.step(&mut bus);
    assert_eq!(cpu.reg(1), 3);
    assert_eq!(cpu.reg(0), DATA);

    // LDMDA r0, {r1, r2}
    let (mut cpu, mut bus) = arm_program(&[0xE8100006]);
    cpu.set_reg(0, DATA + 4);
    bus.write_word(DATA, 4);
    bus.write_word(DATA + 4, 5);
    cpu.step(&mut bus);
    assert_eq!((cpu.reg(1), cpu.reg(2)), (4, 5));
}

#[test]
fn test_stmdb_push() {
    // STMDB sp!, {r0, r1, lr}
    let (mut cpu, mut bus) = arm_program(&[0xE92D4003]);
    cpu.set_reg(13, DATA + 0x100);
    cpu.set_reg(0, 0xA0);
    cpu.set_reg(1, 0xA1);
    cpu.set_reg(14, 0xAE);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(13), DATA + 0x100 - 12);
    assert_eq!(bus.read_word(DATA + 0xF4), 0xA0);
    assert_eq!(bus.read_word(DATA + 0xF8), 0xA1);
    assert_eq!(bus.read_word(DATA + 0xFC), 0xAE);
}

#[test]
fn test_stm_base_first_stores_original() {
    // STMIA r0!, {r0, r1}
    let (mut cpu, mut bus) = arm_program(&[0xE8A00003]);
    cpu.set_reg(0, DATA);
    cpu.set_reg(1, 0x11);

    cpu.step(&mut bus);

    assert_eq!(bus.read_word(DATA), DATA);
    assert_eq!(cpu.reg(0), DATA + 8);
}

#[test]
fn test_stm_base_later_stores_updated() {
    // STMIA r1!, {r0, r1}
    let (mut cpu, mut bus) = arm_program(&[0xE8A10003]);
    cpu.set_reg(0, 0x10);
    cpu.set_reg(1, DATA);

    cpu.step(&mut bus);

    assert_eq!(bus.read_word(DATA), 0x10);
    assert_eq!(bus.read_word(DATA + 4), DATA + 8);
}

#[test]
fn test_ldm_base_in_list_keeps_loaded() {
    // LDMIA r0!, {r0, r1}
    let (mut cpu, mut bus) = arm_program(&[0xE8B00003]);
    cpu.set_reg(0, DATA);
    bus.write_word(DATA, 0x1234);
    bus.write_word(DATA + 4, 0x5678);

    cpu.step(&mut bus);

    assert_eq!(cpu.reg(0), 0x1234);
    assert_eq!(cpu.reg(1), 0x5678);
}

#[test]
fn test_ldm_pc_jumps() {
    // LDMIA r0, {pc}
    let (mut cpu, mut bus) = arm_program(&[0xE8908000]);
    cpu.set_reg(0, DATA);
    bus.write_word(DATA, CODE + 0x40);

    cpu.step(&mut bus);

    assert_eq!(cpu.next_address(), CODE + 0x40);
}
