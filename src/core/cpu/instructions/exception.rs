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

use super::super::{Exception, CPU};
use crate::core::memory::Bus;

impl CPU {
    // === Exception-generating instructions ===

    /// Undefined instruction: enter the undefined vector
    pub(crate) fn op_undefined(&mut self, bus: &mut Bus) {
        log::warn!(
            "Undefined instruction 0x{:08X} at 0x{:08X}",
            self.opcode,
            self.next_address()
        );

        self.enter_exception(bus, Exception::Undefined);
    }

    /// SVC (SWI): Supervisor Call
    ///
    /// Format: cond | 1111 | imm24 (ARM), 11011111 | imm8 (Thumb)
    ///
    /// The comment field is ignored; BIOS handlers read it back through LR.
    pub(crate) fn op_svc(&mut self, bus: &mut Bus) {
        log::trace!("SVC 0x{:02X}", self.svc_comment());
        self.enter_exception(bus, Exception::SoftwareInterrupt);
    }

    /// BKPT: Breakpoint, taken as a prefetch abort
    pub(crate) fn op_bkpt(&mut self, bus: &mut Bus) {
        log::debug!("BKPT at 0x{:08X}", self.next_address());
        self.enter_exception(bus, Exception::PrefetchAbort);
    }

    /// BIOS function number of the executing SVC
    fn svc_comment(&self) -> u32 {
        if self.is_thumb() {
            self.opcode & 0xff
        } else {
            (self.opcode >> 16) & 0xff
        }
    }
}
