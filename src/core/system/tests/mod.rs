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

//! System module tests
//!
//! - `basic`: construction, reset, stepping and accessors
//! - `frame`: scanline driver, display status, V-Blank/H-Blank DMA
//! - `loading`: BIOS, ROM and save files

use super::*;

/// BIOS image with `B .` at the reset vector
fn looping_bios() -> Vec<u8> {
    let mut bios = vec![0u8; Bus::BIOS_SIZE];
    bios[0..4].copy_from_slice(&0xEAFF_FFFEu32.to_le_bytes());
    bios
}

/// System booted into a BIOS that spins at the reset vector
fn looping_system() -> System {
    let mut system = System::new();
    system.bus_mut().load_bios_data(&looping_bios()).unwrap();
    system.reset();
    system
}
