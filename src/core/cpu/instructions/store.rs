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

use super::super::decode::Offset;
use super::super::CPU;
use super::load::Transfer;
use crate::core::memory::{Access, Bus};

/// Width of a single store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreKind {
    Word,
    Byte,
    Half,
}

impl CPU {
    /// Register value as seen by a store: r15 reads 12 bytes ahead in ARM
    /// state (6 in Thumb state)
    #[inline(always)]
    pub(super) fn store_value(&self, index: usize) -> u32 {
        if index == 15 {
            self.regs[15].wrapping_add(4)
        } else {
            self.regs[index]
        }
    }

    /// Perform a non-sequential store of Rt
    ///
    /// Rt is read before the base update, so storing the base register
    /// writes its original value.
    fn store(&mut self, bus: &mut Bus, transfer: Transfer, kind: StoreKind) {
        let value = self.store_value(transfer.rt);
        self.write_back(&transfer);

        match kind {
            StoreKind::Word => bus.write32(transfer.address, value, Access::NonSequential),
            StoreKind::Byte => bus.write8(transfer.address, value as u8, Access::NonSequential),
            StoreKind::Half => bus.write16(transfer.address, value as u16, Access::NonSequential),
        }

        self.seq_to_nonseq(bus);
    }

    // === ARM stores ===

    /// STR: Store Word
    ///
    /// Format: cond | 01 | I | P | U | 0 | W | 0 | Rn | Rt | offset
    pub(crate) fn op_str(&mut self, bus: &mut Bus, offset: Offset) {
        let transfer = self.word_transfer(offset);
        self.store(bus, transfer, StoreKind::Word);
    }

    /// STRB: Store Byte
    pub(crate) fn op_strb(&mut self, bus: &mut Bus, offset: Offset) {
        let transfer = self.word_transfer(offset);
        self.store(bus, transfer, StoreKind::Byte);
    }

    /// STRBT: Store Byte with User-mode registers
    pub(crate) fn op_strbt(&mut self, bus: &mut Bus, offset: Offset) {
        let mut transfer = self.user_transfer(offset);
        self.write_back(&transfer);
        transfer.writeback = None;

        self.with_user_registers(|cpu| cpu.store(bus, transfer, StoreKind::Byte));
    }

    /// STRT: Store Word with User-mode registers
    pub(crate) fn op_strt(&mut self, bus: &mut Bus, offset: Offset) {
        let mut transfer = self.user_transfer(offset);
        self.write_back(&transfer);
        transfer.writeback = None;

        self.with_user_registers(|cpu| cpu.store(bus, transfer, StoreKind::Word));
    }

    /// STRH: Store Halfword
    pub(crate) fn op_strh(&mut self, bus: &mut Bus, offset: Offset) {
        let transfer = self.half_transfer(offset);
        self.store(bus, transfer, StoreKind::Half);
    }

    /// STRD: Store Doubleword from Rt and Rt|1
    pub(crate) fn op_strd(&mut self, bus: &mut Bus, offset: Offset) {
        let transfer = self.half_transfer(offset);

        let low = self.store_value(transfer.rt);
        let high = self.store_value(transfer.rt | 1);
        self.write_back(&transfer);

        bus.write32(transfer.address, low, Access::NonSequential);
        bus.write32(transfer.address.wrapping_add(4), high, Access::Sequential);

        self.seq_to_nonseq(bus);
    }

    // === Thumb stores ===

    pub(crate) fn op_thumb_str_reg(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_reg_transfer();
        self.store(bus, transfer, StoreKind::Word);
    }

    pub(crate) fn op_thumb_strb_reg(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_reg_transfer();
        self.store(bus, transfer, StoreKind::Byte);
    }

    pub(crate) fn op_thumb_strh_reg(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_reg_transfer();
        self.store(bus, transfer, StoreKind::Half);
    }

    /// STR Rt, [Rn, #imm5 * 4]
    pub(crate) fn op_thumb_str_imm5(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_imm5_transfer(4);
        self.store(bus, transfer, StoreKind::Word);
    }

    /// STRB Rt, [Rn, #imm5]
    pub(crate) fn op_thumb_strb_imm5(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_imm5_transfer(1);
        self.store(bus, transfer, StoreKind::Byte);
    }

    /// STRH Rt, [Rn, #imm5 * 2]
    pub(crate) fn op_thumb_strh_imm5(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_imm5_transfer(2);
        self.store(bus, transfer, StoreKind::Half);
    }

    /// STR Rt, [SP, #imm8 * 4]
    pub(crate) fn op_thumb_str_sp(&mut self, bus: &mut Bus) {
        let transfer = self.thumb_sp_transfer();
        self.store(bus, transfer, StoreKind::Word);
    }
}
