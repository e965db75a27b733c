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

//! Game Boy Advance emulator core library
//!
//! This library provides the core emulation components for a Game Boy Advance
//! emulator, including the ARM7TDMI CPU, memory bus, and the timer, DMA and
//! interrupt hardware the CPU talks to.
//!
//! # Example
//!
//! ```
//! use gbarx::core::cpu::CPU;
//! use gbarx::core::memory::Bus;
//!
//! let mut bus = Bus::new();
//! let mut cpu = CPU::new();
//! cpu.reset(&mut bus);
//!
//! // Execute one instruction
//! let cycles = cpu.step(&mut bus);
//! assert!(cycles > 0);
//! ```

pub mod core;
