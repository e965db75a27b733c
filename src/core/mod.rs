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

//! Core emulation components
//!
//! This module contains all hardware emulation components:
//! - CPU (ARM7TDMI, ARM and Thumb states)
//! - Memory bus with wait states and cartridge save chips
//! - Interrupt controller
//! - I/O registers (display status, keypad, system control)
//! - DMA (4 channels)
//! - Timer (4 cascadable timer/counter channels)
//! - Direct sound FIFOs
//! - System integration and frame timing

pub mod config;
pub mod cpu;
pub mod dma;
pub mod error;
pub mod interrupt;
pub mod io;
pub mod memory;
pub mod sound_fifo;
pub mod system;
pub mod timer;

// Re-export commonly used types
pub use config::EmulatorConfig;
pub use cpu::CPU;
pub use dma::DmaController;
pub use error::{EmulatorError, Result};
pub use interrupt::{InterruptController, IrqFlags};
pub use io::{IoRegisters, Key};
pub use memory::Bus;
pub use system::{LineRenderer, NullRenderer, System};
pub use timer::Timers;
