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
use super::{arm_program, thumb_program, CODE};
use crate::core::interrupt::IrqFlags;

/// Drop to System mode with interrupts unmasked
fn unmask(cpu: &mut CPU) {
    cpu.set_cpsr(CpuMode::System.bits());
}

/// Enable and raise the VBlank interrupt
fn raise_vblank(bus: &mut Bus) {
    bus.interrupts.set_enable(IrqFlags::VBLANK);
    bus.interrupts.set_master(true);
    bus.raise_irq(IrqFlags::VBLANK);
}

#[test]
fn test_svc_arm() {
    // SVC #5
    let (mut cpu, mut bus) = arm_program(&[0xEF000005]);
    unmask(&mut cpu);
    let cpsr = cpu.cpsr();

    cpu.step(&mut bus);

    assert_eq!(cpu.mode(), Some(CpuMode::Supervisor));
    assert_eq!(cpu.reg(14), CODE + 4);
    assert_eq!(cpu.next_address(), 0x08);
    assert_eq!(cpu.pc(), 0x10);
    assert_eq!(cpu.spsr(), Some(cpsr));
    assert!(cpu.flag(Psr::I));
    assert!(!cpu.flag(Psr::F));
}

#[test]
fn test_svc_thumb() {
    // SVC #5
    let (mut cpu, mut bus) = thumb_program(&[0xDF05]);
    cpu.set_cpsr(CpuMode::System.bits() | Psr::T.bits());

    cpu.step(&mut bus);

    assert!(!cpu.is_thumb());
    assert_eq!(cpu.reg(14), CODE + 2);
    assert_eq!(cpu.next_address(), 0x08);
    assert_eq!(cpu.spsr().map(|spsr| spsr & Psr::T.bits()), Some(Psr::T.bits()));
}

#[test]
fn test_undefined_instruction() {
    let (mut cpu, mut bus) = arm_program(&[0xE7F000F0]);
    unmask(&mut cpu);

    cpu.step(&mut bus);

    assert_eq!(cpu.mode(), Some(CpuMode::Undefined));
    assert_eq!(cpu.reg(14), CODE + 4);
    assert_eq!(cpu.next_address(), 0x04);
}

#[test]
fn test_bkpt_enters_abort() {
    // BKPT #0
    let (mut cpu, mut bus) = arm_program(&[0xE1200070]);
    unmask(&mut cpu);

    cpu.step(&mut bus);

    assert_eq!(cpu.mode(), Some(CpuMode::Abort));
    assert_eq!(cpu.reg(14), CODE + 4);
    assert_eq!(cpu.next_address(), 0x0C);
}

#[test]
fn test_irq_entry_arm() {
    let (mut cpu, mut bus) = arm_program(&[0xE3A00001]);
    unmask(&mut cpu);
    raise_vblank(&mut bus);

    assert!(cpu.check_irq(&mut bus));

    assert_eq!(cpu.mode(), Some(CpuMode::Irq));
    assert_eq!(cpu.reg(14), CODE + 4);
    assert_eq!(cpu.next_address(), 0x18);
    assert!(cpu.flag(Psr::I));
}

#[test]
fn test_irq_entry_thumb() {
    let (mut cpu, mut bus) = thumb_program(&[0x2001]);
    cpu.set_cpsr(CpuMode::System.bits() | Psr::T.bits());
    raise_vblank(&mut bus);

    assert!(cpu.check_irq(&mut bus));

    assert!(!cpu.is_thumb());
    assert_eq!(cpu.reg(14), CODE + 4);
}

#[test]
fn test_masked_irq_is_not_taken() {
    // MOV r0, #1
    let (mut cpu, mut bus) = arm_program(&[0xE3A00001]);
    raise_vblank(&mut bus);

    cpu.step(&mut bus);

    assert_eq!(cpu.mode(), Some(CpuMode::Supervisor));
    assert_eq!(cpu.reg(0), 1);
}

#[test]
fn test_irq_needs_master_enable() {
    let (mut cpu, mut bus) = arm_program(&[0xE3A00001]);
    unmask(&mut cpu);
    bus.interrupts.set_enable(IrqFlags::VBLANK);
    bus.raise_irq(IrqFlags::VBLANK);

    assert!(!cpu.check_irq(&mut bus));
}

#[test]
fn test_irq_handler_round_trip() {
    // BIOS IRQ vector: SUBS pc, lr, #4
    let mut bios = vec![0u8; Bus::BIOS_SIZE];
    bios[0x18..0x1C].copy_from_slice(&0xE25E_F004u32.to_le_bytes());

    // MOV r0, #1 / MOV r1, #2
    let (mut cpu, mut bus) = arm_program(&[0xE3A00001, 0xE3A01002]);
    bus.load_bios_data(&bios).unwrap();
    unmask(&mut cpu);
    raise_vblank(&mut bus);

    // Enter the vector and run the return in the same step
    cpu.step(&mut bus);
    assert_eq!(cpu.mode(), Some(CpuMode::System));
    assert_eq!(cpu.next_address(), CODE);
    assert!(!cpu.flag(Psr::I));

    bus.interrupts.acknowledge(IrqFlags::VBLANK);

    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.reg(0), 1);
    assert_eq!(cpu.reg(1), 2);
}

#[test]
fn test_irq_handler_runs_each_instruction_once() {
    // IRQ vector: MOV r5, #1 ; ADD r6, r6, #1 ; ADD r2, r2, #1 ; B .
    let mut bios = vec![0u8; Bus::BIOS_SIZE];
    let handler = [0xE3A05001u32, 0xE2866001, 0xE2822001, 0xEAFFFFFE];
    for (i, word) in handler.iter().enumerate() {
        let at = 0x18 + i * 4;
        bios[at..at + 4].copy_from_slice(&word.to_le_bytes());
    }

    let (mut cpu, mut bus) = arm_program(&[0xE3A00001]);
    bus.load_bios_data(&bios).unwrap();
    unmask(&mut cpu);
    raise_vblank(&mut bus);

    for _ in 0..4 {
        cpu.step(&mut bus);
    }

    assert_eq!(cpu.mode(), Some(CpuMode::Irq));
    assert_eq!(cpu.reg(5), 1);
    assert_eq!(cpu.reg(6), 1);
    assert_eq!(cpu.reg(2), 1);
    assert_eq!(cpu.next_address(), 0x24);
}

#[test]
fn test_fiq_masks_fiq() {
    let (mut cpu, mut bus) = arm_program(&[0xE3A00001]);
    unmask(&mut cpu);

    cpu.enter_exception(&mut bus, Exception::Fiq);

    assert_eq!(cpu.mode(), Some(CpuMode::Fiq));
    assert!(cpu.flag(Psr::F));
    assert!(cpu.flag(Psr::I));
    assert_eq!(cpu.next_address(), 0x1C);
}

#[test]
fn test_exception_vectors() {
    let vectors = [
        (Exception::Reset, 0x00, CpuMode::Supervisor),
        (Exception::Undefined, 0x04, CpuMode::Undefined),
        (Exception::SoftwareInterrupt, 0x08, CpuMode::Supervisor),
        (Exception::PrefetchAbort, 0x0C, CpuMode::Abort),
        (Exception::DataAbort, 0x10, CpuMode::Abort),
        (Exception::Irq, 0x18, CpuMode::Irq),
        (Exception::Fiq, 0x1C, CpuMode::Fiq),
    ];

    for (exception, vector, mode) in vectors {
        assert_eq!(exception.vector(), vector);
        assert_eq!(exception.mode(), mode);
    }
}
