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

//! CPU test modules
//!
//! Tests are organized into the following categories:
//! - `basic`: CPU initialization, reset, register access, pipeline
//! - `banking`: Mode switching, banked registers, SPSR
//! - `decode`: Decode table lookups
//! - `alu`: Data-processing results and flags
//! - `shifter`: Barrel shifter operands
//! - `multiply`: Multiply and DSP multiply instructions
//! - `load_store`: Single, block and swap transfers
//! - `branch`: ARM and Thumb branches
//! - `exceptions`: SVC, undefined, breakpoint, IRQ entry and return
//! - `thumb`: Thumb data-processing and memory instructions
//! - `timing`: Cycle accounting and the run loop
//! - `properties`: Property-based checks
//!
//! Programs are assembled by hand into IWRAM, which has no wait states.

use super::*;

/// Load address of test programs (IWRAM)
const CODE: u32 = 0x0300_0000;

/// Scratch data area (IWRAM)
const DATA: u32 = 0x0300_1000;

/// Write ARM opcodes at [`CODE`] and point the pipeline at them
fn arm_program(program: &[u32]) -> (CPU, Bus) {
    let mut bus = Bus::new();

    for (i, &opcode) in program.iter().enumerate() {
        bus.write_word(CODE + i as u32 * 4, opcode);
    }

    let mut cpu = CPU::new();
    cpu.jump(&mut bus, CODE);

    (cpu, bus)
}

/// Write Thumb opcodes at [`CODE`] and enter Thumb state there
fn thumb_program(program: &[u16]) -> (CPU, Bus) {
    let mut bus = Bus::new();

    for (i, &opcode) in program.iter().enumerate() {
        bus.write_half(CODE + i as u32 * 2, opcode);
    }

    let mut cpu = CPU::new();
    cpu.jump(&mut bus, CODE | 1);

    (cpu, bus)
}

/// Execute `count` instructions
fn run_steps(cpu: &mut CPU, bus: &mut Bus, count: usize) {
    for _ in 0..count {
        cpu.step(bus);
    }
}





#[cfg(test)]
mod shifter;


#[cfg(test)]
mod load_store;


#[cfg(test)]
mod exceptions;



#[cfg(test)]
mod properties;
