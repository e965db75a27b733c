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

//! Cartridge wait-state tables
//!
//! WAITCNT (0x04000204) selects the first-access (N) and sequential (S)
//! wait states for the three ROM windows and the SRAM window. The bus
//! caches the decoded values, plus the derived code-fetch costs for each
//! instruction set.
//!
//! ```text
//! Bits  | Field
//! ------|------------------------------
//! 0-1   | SRAM wait           (4,3,2,8)
//! 2-3   | WS0 first access    (4,3,2,8)
//! 4     | WS0 second access   (2,1)
//! 5-6   | WS1 first access    (4,3,2,8)
//! 7     | WS1 second access   (4,1)
//! 8-9   | WS2 first access    (4,3,2,8)
//! 10    | WS2 second access   (8,1)
//! ```

const FIRST_ACCESS: [u32; 4] = [4, 3, 2, 8];
const WS0_SECOND: [u32; 2] = [2, 1];
const WS1_SECOND: [u32; 2] = [4, 1];
const WS2_SECOND: [u32; 2] = [8, 1];

/// Decoded wait states, indexed by `(address >> 25) & 3`
///
/// Index 0-2 are the ROM windows at 0x08, 0x0A and 0x0C; index 3 is the
/// save window at 0x0E.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitStates {
    /// Extra cycles for a non-sequential data access
    pub n: [u32; 4],
    /// Extra cycles for a sequential data access
    pub s: [u32; 4],
    /// Total non-sequential 16-bit code fetch cost
    pub n_thumb: [u32; 4],
    /// Total sequential 16-bit code fetch cost
    pub s_thumb: [u32; 4],
    /// Total non-sequential 32-bit code fetch cost
    pub n_arm: [u32; 4],
    /// Total sequential 32-bit code fetch cost
    pub s_arm: [u32; 4],
}

impl WaitStates {
    /// Decode a WAITCNT value
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::memory::WaitStates;
    ///
    /// let ws = WaitStates::from_waitcnt(0x4317);
    /// assert_eq!(ws.n[0], 3);
    /// assert_eq!(ws.s[0], 1);
    /// assert_eq!(ws.n_arm[0], 4 + 2);
    /// ```
    pub fn from_waitcnt(waitcnt: u16) -> Self {
        let w = waitcnt as usize;
        let sram = FIRST_ACCESS[w & 3];

        let n = [
            FIRST_ACCESS[(w >> 2) & 3],
            FIRST_ACCESS[(w >> 5) & 3],
            FIRST_ACCESS[(w >> 8) & 3],
            sram,
        ];
        let s = [
            WS0_SECOND[(w >> 4) & 1],
            WS1_SECOND[(w >> 7) & 1],
            WS2_SECOND[(w >> 10) & 1],
            sram,
        ];

        let mut ws = Self {
            n,
            s,
            n_thumb: [0; 4],
            s_thumb: [0; 4],
            n_arm: [0; 4],
            s_arm: [0; 4],
        };

        for i in 0..4 {
            ws.n_thumb[i] = n[i] + 1;
            ws.s_thumb[i] = s[i] + 1;
            // A word fetch on the 16-bit cartridge bus is two halfword fetches
            ws.n_arm[i] = ws.n_thumb[i] + ws.s_thumb[i];
            ws.s_arm[i] = ws.s_thumb[i] << 1;
        }

        ws
    }
}

impl Default for WaitStates {
    fn default() -> Self {
        Self::from_waitcnt(0)
    }
}
