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

use proptest::prelude::*;

use super::super::*;
use super::arm_program;

/// Modes with their own r13/r14 bank
const MODES: [CpuMode; 6] = [
    CpuMode::User,
    CpuMode::Fiq,
    CpuMode::Irq,
    CpuMode::Supervisor,
    CpuMode::Abort,
    CpuMode::Undefined,
];

fn run_one(opcode: u32, r0: u32, r1: u32) -> CPU {
    let (mut cpu, mut bus) = arm_program(&[opcode]);
    cpu.set_reg(0, r0);
    cpu.set_reg(1, r1);
    cpu.step(&mut bus);
    cpu
}

proptest! {
    #[test]
    fn banked_registers_survive_mode_switches(values in prop::array::uniform6(any::<u32>())) {
        let mut cpu = CPU::new();

        for (mode, &value) in MODES.iter().zip(values.iter()) {
            cpu.switch_mode(*mode);
            cpu.set_reg(13, value);
            cpu.set_reg(14, !value);
        }

        for (mode, &value) in MODES.iter().zip(values.iter()) {
            cpu.switch_mode(*mode);
            prop_assert_eq!(cpu.reg(13), value);
            prop_assert_eq!(cpu.reg(14), !value);
        }
    }

    #[test]
    fn adds_flags_match_wide_arithmetic(a in any::<u32>(), b in any::<u32>()) {
        // ADDS r2, r0, r1
        let cpu = run_one(0xE0902001, a, b);
        let result = a.wrapping_add(b);

        prop_assert_eq!(cpu.reg(2), result);
        prop_assert_eq!(cpu.flag(Psr::C), a as u64 + b as u64 > u32::MAX as u64);
        prop_assert_eq!(cpu.flag(Psr::V), (a as i32).checked_add(b as i32).is_none());
        prop_assert_eq!(cpu.flag(Psr::Z), result == 0);
        prop_assert_eq!(cpu.flag(Psr::N), result & 0x8000_0000 != 0);
    }

    #[test]
    fn subs_flags_match_wide_arithmetic(a in any::<u32>(), b in any::<u32>()) {
        // SUBS r2, r0, r1
        let cpu = run_one(0xE0502001, a, b);

        prop_assert_eq!(cpu.reg(2), a.wrapping_sub(b));
        prop_assert_eq!(cpu.flag(Psr::C), a >= b);
        prop_assert_eq!(cpu.flag(Psr::V), (a as i32).checked_sub(b as i32).is_none());
    }

    #[test]
    fn clz_matches_leading_zeros(value in any::<u32>()) {
        // CLZ r2, r0
        let cpu = run_one(0xE16F2F10, value, 0);
        prop_assert_eq!(cpu.reg(2), value.leading_zeros());
    }

    #[test]
    fn user_msr_cannot_change_mode(value in any::<u32>()) {
        // MSR CPSR_fc, r0
        let (mut cpu, mut bus) = arm_program(&[0xE129F000]);
        cpu.set_cpsr(CpuMode::User.bits());
        cpu.set_reg(0, value);

        cpu.step(&mut bus);

        prop_assert_eq!(cpu.mode(), Some(CpuMode::User));
        prop_assert!(!cpu.is_thumb());
        prop_assert_eq!(cpu.cpsr() & 0xF000_0000, value & 0xF000_0000);
    }

    #[test]
    fn qadd_matches_saturating_add(a in any::<i32>(), b in any::<i32>()) {
        // QADD r2, r0, r1
        let cpu = run_one(0xE1012050, a as u32, b as u32);

        prop_assert_eq!(cpu.reg(2) as i32, a.saturating_add(b));
        prop_assert_eq!(cpu.flag(Psr::Q), a.checked_add(b).is_none());
    }

    #[test]
    fn ror_register_matches_rotate_right(value in any::<u32>(), amount in 0u32..256) {
        // MOV r2, r0, ROR r1
        let cpu = run_one(0xE1A02170, value, amount);
        prop_assert_eq!(cpu.reg(2), value.rotate_right(amount & 31));
    }

    #[test]
    fn lsl_then_lsr_masks_low_bits(value in any::<u32>(), amount in 0u32..32) {
        // MOV r2, r0, LSL r1 / MOV r2, r2, LSR r1
        let (mut cpu, mut bus) = arm_program(&[0xE1A02110, 0xE1A02132]);
        cpu.set_reg(0, value);
        cpu.set_reg(1, amount);

        super::run_steps(&mut cpu, &mut bus, 2);

        prop_assert_eq!(cpu.reg(2), value & (u32::MAX >> amount));
    }

    #[test]
    fn adds_adc_chain_adds_64_bits(a in any::<u64>(), b in any::<u64>()) {
        // ADDS r0, r0, r2 / ADC r1, r1, r3
        let (mut cpu, mut bus) = arm_program(&[0xE0900002, 0xE0A11003]);
        cpu.set_reg(0, a as u32);
        cpu.set_reg(1, (a >> 32) as u32);
        cpu.set_reg(2, b as u32);
        cpu.set_reg(3, (b >> 32) as u32);

        super::run_steps(&mut cpu, &mut bus, 2);

        let sum = (cpu.reg(1) as u64) << 32 | cpu.reg(0) as u64;
        prop_assert_eq!(sum, a.wrapping_add(b));
    }
}
