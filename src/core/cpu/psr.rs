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

//! Program status register flags, processor modes and condition codes

use bitflags::bitflags;

bitflags! {
    /// CPSR / SPSR flag bits
    ///
    /// The low five bits hold the processor mode and are accessed through
    /// [`CpuMode`] instead.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Psr: u32 {
        /// Negative
        const N = 1 << 31;
        /// Zero
        const Z = 1 << 30;
        /// Carry / not borrow
        const C = 1 << 29;
        /// Signed overflow
        const V = 1 << 28;
        /// Sticky saturation
        const Q = 1 << 27;
        /// IRQ disable
        const I = 1 << 7;
        /// FIQ disable
        const F = 1 << 6;
        /// Thumb state
        const T = 1 << 5;
    }
}

/// Mode field mask
pub const MODE_MASK: u32 = 0x1f;

/// Bits of the PSR visible to MRS in privileged modes and writable by MSR
pub const PRIV_MASK: u32 = 0xf8ff_03df;

/// Bits of the PSR visible and writable from User mode
pub const USER_MASK: u32 = 0xf8ff_0000;

/// Execution state bits, writable through MSR only when targeting the SPSR
pub const STATE_MASK: u32 = 0x0100_0020;

/// Processor mode
///
/// User and System share one register bank; FIQ banks r8-r14; every other
/// exception mode banks r13-r14 and owns an SPSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CpuMode {
    User = 0x10,
    Fiq = 0x11,
    Irq = 0x12,
    Supervisor = 0x13,
    Monitor = 0x16,
    Abort = 0x17,
    Undefined = 0x1b,
    System = 0x1f,
}

impl CpuMode {
    /// Number of distinct r13/r14 banks
    pub const BANKS: usize = 7;

    /// Decode a mode field
    ///
    /// # Returns
    ///
    /// `None` for reserved encodings
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits & MODE_MASK {
            0x10 => Some(Self::User),
            0x11 => Some(Self::Fiq),
            0x12 => Some(Self::Irq),
            0x13 => Some(Self::Supervisor),
            0x16 => Some(Self::Monitor),
            0x17 => Some(Self::Abort),
            0x1b => Some(Self::Undefined),
            0x1f => Some(Self::System),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Index of the r13/r14 bank (and SPSR slot) used by this mode
    ///
    /// User and System share bank 0, which has no SPSR.
    #[inline(always)]
    pub fn bank(self) -> usize {
        match self {
            Self::User | Self::System => 0,
            Self::Fiq => 1,
            Self::Irq => 2,
            Self::Supervisor => 3,
            Self::Monitor => 4,
            Self::Abort => 5,
            Self::Undefined => 6,
        }
    }

    /// Whether the mode owns a saved program status register
    #[inline(always)]
    pub fn has_spsr(self) -> bool {
        self.bank() != 0
    }
}

/// Evaluate a 4-bit condition code against the flags of `cpsr`
///
/// The upper three bits select the base test; bit 0 inverts it. Code 0xE
/// (AL) always passes. Code 0xF is handled by the decoder as the
/// unconditional instruction space and never reaches here.
///
/// | cond>>1 | Test            |
/// |---------|-----------------|
/// | 0       | Z (EQ/NE)       |
/// | 1       | C (CS/CC)       |
/// | 2       | N (MI/PL)       |
/// | 3       | V (VS/VC)       |
/// | 4       | C && !Z (HI/LS) |
/// | 5       | N == V (GE/LT)  |
/// | 6       | !Z && N == V    |
/// | 7       | always          |
#[inline(always)]
pub fn condition_passed(cpsr: u32, cond: u32) -> bool {
    let n = cpsr & Psr::N.bits() != 0;
    let z = cpsr & Psr::Z.bits() != 0;
    let c = cpsr & Psr::C.bits() != 0;
    let v = cpsr & Psr::V.bits() != 0;

    let result = match (cond >> 1) & 7 {
        0 => z,
        1 => c,
        2 => n,
        3 => v,
        4 => c && !z,
        5 => n == v,
        6 => !z && n == v,
        _ => true,
    };

    if cond & 1 != 0 {
        !result
    } else {
        result
    }
}
