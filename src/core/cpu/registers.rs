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

//! Banked register storage and mode switching
//!
//! Only one copy of each banked register lives in the flat `regs` array.
//! Switching modes first stores the active copies into the outgoing mode's
//! bank, then loads the incoming mode's bank. Every mode change goes
//! through [`CPU::switch_mode`] so that ordering holds everywhere.

use super::psr::{CpuMode, MODE_MASK};
use super::CPU;

/// Inactive copies of the banked registers
#[derive(Debug, Clone, Default)]
pub(super) struct RegisterBanks {
    /// r8-r12 shared by every mode except FIQ
    r8_r12_usr: [u32; 5],

    /// r8-r12 private to FIQ
    r8_r12_fiq: [u32; 5],

    /// r13-r14 per bank, indexed by [`CpuMode::bank`]
    r13_r14: [[u32; 2]; CpuMode::BANKS],

    /// SPSR per bank; slot 0 (User/System) is never used
    spsr: [u32; CpuMode::BANKS],
}

impl CPU {
    /// Current processor mode
    ///
    /// # Returns
    ///
    /// `None` if the mode field holds a reserved encoding
    #[inline(always)]
    pub fn mode(&self) -> Option<CpuMode> {
        CpuMode::from_bits(self.cpsr)
    }

    /// Switch to `mode`, exchanging banked registers
    ///
    /// Writes the new mode field into CPSR, saves the active registers
    /// into the bank of the previous mode, then loads the bank of `mode`.
    pub fn switch_mode(&mut self, mode: CpuMode) {
        let current = self.cpsr & MODE_MASK;

        self.cpsr = (self.cpsr & !MODE_MASK) | mode.bits();

        self.rebank(current, mode.bits());
    }

    /// Exchange banks after the mode field changed from `from` to `to`
    pub(super) fn rebank(&mut self, from: u32, to: u32) {
        self.store_bank(from);
        self.load_bank(to);
    }

    fn store_bank(&mut self, mode: u32) {
        let mode = CpuMode::from_bits(mode);

        if mode != Some(CpuMode::Fiq) {
            self.banks.r8_r12_usr.copy_from_slice(&self.regs[8..13]);
        }

        if let Some(mode) = mode {
            if mode == CpuMode::Fiq {
                self.banks.r8_r12_fiq.copy_from_slice(&self.regs[8..13]);
            }

            self.banks.r13_r14[mode.bank()] = [self.regs[13], self.regs[14]];
        }
    }

    fn load_bank(&mut self, mode: u32) {
        let mode = CpuMode::from_bits(mode);

        if mode == Some(CpuMode::Fiq) {
            self.regs[8..13].copy_from_slice(&self.banks.r8_r12_fiq);
        } else {
            self.regs[8..13].copy_from_slice(&self.banks.r8_r12_usr);
        }

        if let Some(mode) = mode {
            let [r13, r14] = self.banks.r13_r14[mode.bank()];
            self.regs[13] = r13;
            self.regs[14] = r14;
        }
    }

    /// Run `f` with the User mode registers active
    ///
    /// Used by the user-bank block transfers and the `T` loads/stores. The
    /// previous mode field is restored afterwards, even if it was a
    /// reserved encoding.
    pub(super) fn with_user_registers<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mode = self.cpsr & MODE_MASK;

        self.switch_mode(CpuMode::User);
        let result = f(self);

        self.cpsr = (self.cpsr & !MODE_MASK) | mode;
        self.rebank(CpuMode::User.bits(), mode);

        result
    }

    /// SPSR of the current mode
    ///
    /// # Returns
    ///
    /// `None` in User and System mode, which have no SPSR
    pub fn spsr(&self) -> Option<u32> {
        match self.mode() {
            Some(mode) if mode.has_spsr() => Some(self.banks.spsr[mode.bank()]),
            _ => None,
        }
    }

    /// Write the SPSR of the current mode; ignored in User and System mode
    pub fn set_spsr(&mut self, value: u32) {
        if let Some(mode) = self.mode() {
            if mode.has_spsr() {
                self.banks.spsr[mode.bank()] = value;
            }
        }
    }

    /// Copy SPSR into CPSR and re-bank for the restored mode
    ///
    /// This is the return-from-exception path. Without an SPSR the CPSR is
    /// left unchanged.
    pub(super) fn restore_cpsr(&mut self) {
        let Some(spsr) = self.spsr() else {
            return;
        };

        let current = self.cpsr & MODE_MASK;
        self.cpsr = spsr;
        self.rebank(current, spsr & MODE_MASK);
    }
}
