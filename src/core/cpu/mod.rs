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

//! ARM7TDMI CPU core
//!
//! The CPU executes both instruction sets through a two-slot prefetch
//! pipeline. `pipe[0]` holds the opcode executed next and `pipe[1]` the one
//! after it, so r15 always reads two instructions ahead of the executing
//! one (8 bytes in ARM state, 4 in Thumb state).
//!
//! Every memory access goes through the [`Bus`], which charges wait states
//! to its cycle counter. The CPU itself only adds internal cycles.

use crate::core::memory::{Access, Bus};

mod decode;
mod instructions;
mod psr;
mod registers;
#[cfg(test)]
mod tests;

pub use decode::{tables, AluOp, ArmOp, DecodeTables, Offset, Operand, ThumbAlu, ThumbOp};
pub use psr::{condition_passed, CpuMode, Psr, MODE_MASK, PRIV_MASK, STATE_MASK, USER_MASK};
use registers::RegisterBanks;

/// Exception kinds, in vector table order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    Reset,
    Undefined,
    SoftwareInterrupt,
    PrefetchAbort,
    DataAbort,
    Irq,
    Fiq,
}

impl Exception {
    /// Vector address
    pub fn vector(self) -> u32 {
        match self {
            Self::Reset => 0x00,
            Self::Undefined => 0x04,
            Self::SoftwareInterrupt => 0x08,
            Self::PrefetchAbort => 0x0c,
            Self::DataAbort => 0x10,
            Self::Irq => 0x18,
            Self::Fiq => 0x1c,
        }
    }

    /// Mode entered by the exception
    pub fn mode(self) -> CpuMode {
        match self {
            Self::Reset | Self::SoftwareInterrupt => CpuMode::Supervisor,
            Self::Undefined => CpuMode::Undefined,
            Self::PrefetchAbort | Self::DataAbort => CpuMode::Abort,
            Self::Irq => CpuMode::Irq,
            Self::Fiq => CpuMode::Fiq,
        }
    }

    /// Amount subtracted from r15 to form the return address
    ///
    /// | Exception      | ARM | Thumb |
    /// |----------------|-----|-------|
    /// | Undefined, SWI | 4   | 2     |
    /// | IRQ, FIQ, PABT | 4   | 0     |
    /// | Data abort     | 0   | 0     |
    /// | Reset          | 0   | 0     |
    fn return_offset(self, thumb: bool) -> u32 {
        match self {
            Self::Undefined | Self::SoftwareInterrupt => {
                if thumb {
                    2
                } else {
                    4
                }
            }
            Self::Irq | Self::Fiq | Self::PrefetchAbort => {
                if thumb {
                    0
                } else {
                    4
                }
            }
            Self::DataAbort | Self::Reset => 0,
        }
    }
}

/// CPU (ARM7TDMI) emulation implementation
///
/// # Specifications
/// - Architecture: ARMv4T, with the ARMv5TE DSP and BLX extensions decoded
/// - Clock frequency: 16.78 MHz
/// - Registers: 16 visible general-purpose registers, CPSR, banked
///   r8-r14 and one SPSR per exception mode
///
/// # Example
/// ```
/// use gbarx::core::cpu::{CpuMode, CPU};
/// use gbarx::core::memory::Bus;
///
/// let mut cpu = CPU::new();
/// let mut bus = Bus::new();
/// cpu.reset(&mut bus);
///
/// assert_eq!(cpu.mode(), Some(CpuMode::Supervisor));
/// assert_eq!(cpu.pc(), 8); // two fetches ahead of the reset vector
/// ```
pub struct CPU {
    /// Active registers r0-r15
    regs: [u32; 16],

    /// Current program status register
    cpsr: u32,

    /// Inactive banked registers and SPSRs
    banks: RegisterBanks,

    /// Prefetched opcodes: `pipe[0]` executes next
    pipe: [u32; 2],

    /// Set by a pipeline reload; suppresses the next r15 advance
    pipe_reload: bool,

    /// Opcode being executed
    opcode: u32,

    /// Decode tables shared by every CPU instance
    tables: &'static DecodeTables,
}

impl CPU {
    /// Create a new CPU instance
    ///
    /// Registers are zeroed and CPSR holds Supervisor mode with IRQ and FIQ
    /// disabled. The pipeline is empty until [`CPU::reset`] fills it.
    pub fn new() -> Self {
        Self {
            regs: [0u32; 16],
            cpsr: CpuMode::Supervisor.bits() | Psr::I.bits() | Psr::F.bits(),
            banks: RegisterBanks::default(),
            pipe: [0u32; 2],
            pipe_reload: false,
            opcode: 0,
            tables: tables(),
        }
    }

    /// Power-on reset
    ///
    /// Clears every register and enters the reset vector: Supervisor mode,
    /// IRQ and FIQ disabled, ARM state, PC = 0. The first two fetches come
    /// from 0x00000000 and 0x00000004.
    pub fn reset(&mut self, bus: &mut Bus) {
        self.regs = [0u32; 16];
        self.cpsr = 0;
        self.banks = RegisterBanks::default();
        self.pipe = [0u32; 2];
        self.pipe_reload = false;
        self.opcode = 0;

        self.enter_exception(bus, Exception::Reset);
    }

    /// Read register
    ///
    /// r15 reads as the address of the executing instruction plus two
    /// instruction widths.
    #[inline(always)]
    pub fn reg(&self, index: usize) -> u32 {
        self.regs[index & 0xf]
    }

    /// Write register
    ///
    /// Writing r15 directly does not refill the pipeline; use
    /// [`CPU::jump`] to redirect execution.
    #[inline(always)]
    pub fn set_reg(&mut self, index: usize, value: u32) {
        self.regs[index & 0xf] = value;
    }

    /// Current r15 (pipeline-advanced program counter)
    #[inline(always)]
    pub fn pc(&self) -> u32 {
        self.regs[15]
    }

    /// Address of the instruction in `pipe[0]`, which executes next
    pub fn next_address(&self) -> u32 {
        self.regs[15].wrapping_sub(2 * self.width())
    }

    /// Current program status register
    #[inline(always)]
    pub fn cpsr(&self) -> u32 {
        self.cpsr
    }

    /// Overwrite CPSR, re-banking if the mode field changes
    pub fn set_cpsr(&mut self, value: u32) {
        let current = self.cpsr & MODE_MASK;
        self.cpsr = value;
        self.rebank(current, value & MODE_MASK);
    }

    #[inline(always)]
    pub fn flag(&self, flag: Psr) -> bool {
        self.cpsr & flag.bits() != 0
    }

    #[inline(always)]
    pub fn set_flag(&mut self, flag: Psr, value: bool) {
        if value {
            self.cpsr |= flag.bits();
        } else {
            self.cpsr &= !flag.bits();
        }
    }

    /// Whether the CPU is in Thumb state
    #[inline(always)]
    pub fn is_thumb(&self) -> bool {
        self.flag(Psr::T)
    }

    /// Prefetched opcodes
    pub fn pipeline(&self) -> [u32; 2] {
        self.pipe
    }

    /// Opcode most recently executed
    pub fn opcode(&self) -> u32 {
        self.opcode
    }

    /// Redirect execution to `address` and refill the pipeline
    ///
    /// Bit 0 of `address` selects the instruction set, as with BX.
    pub fn jump(&mut self, bus: &mut Bus, address: u32) {
        self.regs[15] = address;
        self.interwork(bus);
    }

    /// Width in bytes of the current instruction set
    #[inline(always)]
    fn width(&self) -> u32 {
        if self.is_thumb() {
            2
        } else {
            4
        }
    }

    // === Pipeline ===

    fn fetch(&mut self, bus: &mut Bus, access: Access) -> u32 {
        let pc = self.regs[15];

        if self.is_thumb() {
            bus.fetch16(pc, access)
        } else {
            bus.fetch32(pc, access)
        }
    }

    /// Refill both pipeline slots from r15
    ///
    /// The first fetch is non-sequential, the second sequential. r15 ends
    /// up two instructions past the target. Inside an instruction, the
    /// post-step advance is suppressed once.
    pub(crate) fn load_pipe(&mut self, bus: &mut Bus) {
        let width = self.width();

        self.pipe[0] = self.fetch(bus, Access::NonSequential);
        self.regs[15] = self.regs[15].wrapping_add(width);

        self.pipe[1] = self.fetch(bus, Access::Sequential);
        self.regs[15] = self.regs[15].wrapping_add(width);

        self.pipe_reload = true;
    }

    /// Clear the low r15 bits that the current instruction set ignores
    #[inline(always)]
    pub(crate) fn align_pc(&mut self) {
        if self.is_thumb() {
            self.regs[15] &= !1;
        } else {
            self.regs[15] &= !3;
        }
    }

    /// Take the instruction set from bit 0 of r15, then reload
    pub(crate) fn interwork(&mut self, bus: &mut Bus) {
        let thumb = self.regs[15] & 1 != 0;
        self.set_flag(Psr::T, thumb);

        self.align_pc();
        self.load_pipe(bus);
    }

    /// Charge the sequential-to-non-sequential correction for the next fetch
    #[inline(always)]
    pub(crate) fn seq_to_nonseq(&self, bus: &mut Bus) {
        bus.seq_to_nonseq(self.regs[15], self.is_thumb());
    }

    // === Execution ===

    /// Execute one instruction
    ///
    /// Takes a pending IRQ first, so an interrupt raised between two steps
    /// runs the vector's first instruction in this step.
    ///
    /// # Returns
    ///
    /// Bus cycles consumed
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::cpu::CPU;
    /// use gbarx::core::memory::{Access, Bus};
    ///
    /// let mut cpu = CPU::new();
    /// let mut bus = Bus::new();
    ///
    /// // MOV r0, #42 in IWRAM
    /// bus.write32(0x0300_0000, 0xe3a0_002a, Access::NonSequential);
    /// cpu.jump(&mut bus, 0x0300_0000);
    ///
    /// let cycles = cpu.step(&mut bus);
    /// assert_eq!(cpu.reg(0), 42);
    /// assert!(cycles > 0);
    /// ```
    pub fn step(&mut self, bus: &mut Bus) -> u32 {
        let start = bus.cycles();

        self.check_irq(bus);

        // Only a reload done by this instruction holds r15 back
        self.pipe_reload = false;

        self.opcode = self.pipe[0];
        self.pipe[0] = self.pipe[1];
        self.pipe[1] = self.fetch(bus, Access::Sequential);

        if self.is_thumb() {
            self.execute_thumb(bus);
        } else {
            self.execute_arm(bus);
        }

        if self.pipe_reload {
            self.pipe_reload = false;
        } else {
            let width = self.width();
            self.regs[15] = self.regs[15].wrapping_add(width);
        }

        bus.cycles().wrapping_sub(start)
    }

    /// Run until the bus cycle counter reaches `target`
    ///
    /// Timers are clocked by the cycles each instruction consumed. The
    /// counter is then reduced by `target`, so any overshoot carries into
    /// the next slice. While halted, only the timers advance.
    pub fn run(&mut self, bus: &mut Bus, target: u32) {
        if bus.interrupts.is_halted() {
            bus.clock_timers(target);
            return;
        }

        while bus.cycles() < target {
            let before = bus.cycles();

            self.step(bus);

            if bus.interrupts.is_halted() {
                bus.set_cycles(target);
            }

            let elapsed = bus.cycles().wrapping_sub(before);
            bus.clock_timers(elapsed);
        }

        bus.set_cycles(bus.cycles() - target);
    }

    // === Exceptions ===

    /// Enter an exception
    ///
    /// Banks into the exception's mode, saves the old CPSR into its SPSR,
    /// forms the return address in r14, switches to ARM state with IRQs
    /// disabled (and FIQs for reset/FIQ), then jumps to the vector.
    pub fn enter_exception(&mut self, bus: &mut Bus, exception: Exception) {
        let cpsr = self.cpsr;
        let thumb = self.is_thumb();

        self.switch_mode(exception.mode());
        self.set_spsr(cpsr);

        if matches!(exception, Exception::Fiq | Exception::Reset) {
            self.set_flag(Psr::F, true);
        }

        let offset = exception.return_offset(thumb);
        let return_address = self.regs[15].wrapping_sub(offset);

        self.set_flag(Psr::T, false);
        self.set_flag(Psr::I, true);

        log::trace!(
            "Exception {:?}: return=0x{:08X}, CPSR=0x{:08X}",
            exception,
            return_address,
            cpsr
        );

        self.regs[14] = return_address;
        self.regs[15] = exception.vector();

        self.load_pipe(bus);
    }

    /// Take an IRQ if one is pending, enabled and not masked by CPSR.I
    ///
    /// # Returns
    ///
    /// true if the IRQ vector was entered
    pub fn check_irq(&mut self, bus: &mut Bus) -> bool {
        if !self.flag(Psr::I) && bus.interrupts.is_pending() {
            self.enter_exception(bus, Exception::Irq);
            true
        } else {
            false
        }
    }

    /// Log all CPU registers at debug level
    pub fn dump_registers(&self) {
        log::debug!(
            "PC: 0x{:08X}  CPSR: 0x{:08X}  SPSR: {:?}",
            self.regs[15],
            self.cpsr,
            self.spsr()
        );

        for (i, regs) in self.regs.chunks(4).enumerate() {
            log::debug!(
                "r{:<2}: 0x{:08X}  r{:<2}: 0x{:08X}  r{:<2}: 0x{:08X}  r{:<2}: 0x{:08X}",
                i * 4,
                regs[0],
                i * 4 + 1,
                regs[1],
                i * 4 + 2,
                regs[2],
                i * 4 + 3,
                regs[3]
            );
        }
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}
