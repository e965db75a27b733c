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

//! Block data transfer: LDM, STM, PUSH, POP
//!
//! Registers transfer in ascending order from the lowest address, whatever
//! the addressing mode. The first access is non-sequential, every later
//! one sequential.

use super::super::CPU;
use super::reg_field;
use crate::core::memory::{Access, Bus};

/// Resolved block transfer
#[derive(Debug, Clone, Copy)]
struct Block {
    /// Register list, bit n = rn
    list: u16,

    /// Base register
    rn: usize,

    /// Lowest address transferred
    address: u32,

    /// Base adjustment applied by writeback (zero without W)
    disp: u32,
}

/// Access type of the `n`th transfer in a block
#[inline(always)]
fn block_access(n: usize) -> Access {
    if n == 0 {
        Access::NonSequential
    } else {
        Access::Sequential
    }
}

impl CPU {
    /// ARM block addressing
    ///
    /// Format: cond | 100 | P | U | S | W | L | Rn | register list
    ///
    /// | P | U | Mode | First address   |
    /// |---|---|------|-----------------|
    /// | 0 | 1 | IA   | Rn              |
    /// | 1 | 1 | IB   | Rn + 4          |
    /// | 0 | 0 | DA   | Rn - 4n + 4     |
    /// | 1 | 0 | DB   | Rn - 4n         |
    fn arm_block(&self) -> Block {
        let opcode = self.opcode;
        let list = (opcode & 0xffff) as u16;
        let rn = reg_field(opcode, 16);
        let write = opcode & (1 << 21) != 0;
        let up = opcode & (1 << 23) != 0;
        let pre = opcode & (1 << 24) != 0;

        let size = list.count_ones() * 4;
        let mut address = self.regs[rn] & !3;

        if !up {
            address = address.wrapping_sub(size);
        }
        if up == pre {
            address = address.wrapping_add(4);
        }

        let disp = match (write, up) {
            (false, _) => 0,
            (true, true) => size,
            (true, false) => size.wrapping_neg(),
        };

        Block {
            list,
            rn,
            address,
            disp,
        }
    }

    /// Thumb LDMIA/STMIA Rn!, {list}: Rn = bits 8-10, always written back
    fn thumb_block(&self) -> Block {
        let list = (self.opcode & 0xff) as u16;
        let rn = ((self.opcode >> 8) & 7) as usize;

        Block {
            list,
            rn,
            address: self.regs[rn] & !3,
            disp: list.count_ones() * 4,
        }
    }

    /// Load the listed registers
    ///
    /// The base is written back before the loads, so a loaded base keeps
    /// the loaded value. Loading r15 refills the pipeline.
    fn load_block(&mut self, bus: &mut Bus, block: Block) {
        let mut address = block.address;

        self.regs[block.rn] = self.regs[block.rn].wrapping_add(block.disp);

        for (n, i) in (0..16).filter(|i| block.list & (1 << i) != 0).enumerate() {
            self.regs[i] = bus.read32(address, block_access(n));
            address = address.wrapping_add(4);
        }

        if block.list & 0x8000 != 0 {
            self.align_pc();
            self.load_pipe(bus);
        }

        bus.add_cycles(1);
        self.seq_to_nonseq(bus);
    }

    /// Store the listed registers
    ///
    /// The base is written back after the first store, so a stored base
    /// is the original value only when it is the lowest listed register.
    fn store_block(&mut self, bus: &mut Bus, block: Block) {
        let mut address = block.address;

        for (n, i) in (0..16).filter(|i| block.list & (1 << i) != 0).enumerate() {
            let value = self.store_value(i);
            bus.write32(address, value, block_access(n));

            if n == 0 {
                self.regs[block.rn] = self.regs[block.rn].wrapping_add(block.disp);
            }

            address = address.wrapping_add(4);
        }

        self.seq_to_nonseq(bus);
    }

    /// LDM: Load Multiple
    pub(crate) fn op_ldm(&mut self, bus: &mut Bus) {
        let block = self.arm_block();
        self.load_block(bus, block);
    }

    /// LDM with the S bit
    ///
    /// With r15 in the list this is an exception return: SPSR is copied to
    /// CPSR before the pipeline refill, so the refill uses the restored
    /// instruction set. Otherwise the User mode registers are loaded.
    pub(crate) fn op_ldm_user(&mut self, bus: &mut Bus) {
        let block = self.arm_block();

        if block.list & 0x8000 != 0 {
            let mut address = block.address;

            self.regs[block.rn] = self.regs[block.rn].wrapping_add(block.disp);

            for (n, i) in (0..16).filter(|i| block.list & (1 << i) != 0).enumerate() {
                self.regs[i] = bus.read32(address, block_access(n));
                address = address.wrapping_add(4);
            }

            self.restore_cpsr();
            self.align_pc();
            self.load_pipe(bus);

            bus.add_cycles(1);
            self.seq_to_nonseq(bus);
        } else {
            self.with_user_registers(|cpu| cpu.load_block(bus, block));
        }
    }

    /// STM: Store Multiple
    pub(crate) fn op_stm(&mut self, bus: &mut Bus) {
        let block = self.arm_block();
        self.store_block(bus, block);
    }

    /// STM with the S bit: stores the User mode registers
    pub(crate) fn op_stm_user(&mut self, bus: &mut Bus) {
        let block = self.arm_block();
        self.with_user_registers(|cpu| cpu.store_block(bus, block));
    }

    /// Thumb LDMIA Rn!, {list}
    pub(crate) fn op_thumb_ldm(&mut self, bus: &mut Bus) {
        let block = self.thumb_block();
        self.load_block(bus, block);
    }

    /// Thumb STMIA Rn!, {list}
    pub(crate) fn op_thumb_stm(&mut self, bus: &mut Bus) {
        let block = self.thumb_block();
        self.store_block(bus, block);
    }

    /// PUSH {list, LR}
    ///
    /// Bit 8 adds r14 to the list. SP is word-aligned and decremented by
    /// the full size before the stores.
    pub(crate) fn op_thumb_push(&mut self, bus: &mut Bus) {
        let list = ((self.opcode & 0xff) | ((self.opcode << 6) & 0x4000)) as u16;
        let size = list.count_ones() * 4;
        let address = (self.regs[13] & !3).wrapping_sub(size);

        self.regs[13] = address;

        let block = Block {
            list,
            rn: 13,
            address,
            disp: 0,
        };
        self.store_block(bus, block);
    }

    /// POP {list, PC}
    ///
    /// Bit 8 adds r15 to the list. Popping r15 stays in Thumb state.
    pub(crate) fn op_thumb_pop(&mut self, bus: &mut Bus) {
        let list = ((self.opcode & 0xff) | ((self.opcode << 7) & 0x8000)) as u16;
        let address = self.regs[13] & !3;

        let block = Block {
            list,
            rn: 13,
            address,
            disp: list.count_ones() * 4,
        };

        // Base update lands before the loads, as with LDMIA SP!
        self.regs[13] = address;
        self.load_block(bus, block);
    }
}
