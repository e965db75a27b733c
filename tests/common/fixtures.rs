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

//! Test fixtures for common test scenarios

use gbarx::core::memory::Bus;
use gbarx::core::system::System;

/// Cartridge ROM base address
#[allow(dead_code)]
pub const ROM_BASE: u32 = 0x0800_0000;

/// Build a 16KB BIOS image from ARM opcodes placed at the given offsets
#[allow(dead_code)]
pub fn bios_image(code: &[(usize, &[u32])]) -> Vec<u8> {
    let mut bios = vec![0u8; Bus::BIOS_SIZE];

    for &(offset, words) in code {
        for (i, word) in words.iter().enumerate() {
            let at = offset + i * 4;
            bios[at..at + 4].copy_from_slice(&word.to_le_bytes());
        }
    }

    bios
}

/// Assemble a ROM image from 32-bit words
#[allow(dead_code)]
pub fn rom_image(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Create a System running `bios`, with `rom` inserted, freshly reset
#[allow(dead_code)]
pub fn create_system(bios: &[u8], rom: Vec<u8>) -> System {
    let mut system = System::new();
    system
        .bus_mut()
        .load_bios_data(bios)
        .expect("BIOS image must be 16KB");
    system.bus_mut().load_rom_data(rom);
    system.reset();
    system
}

/// Execute N steps through the system
#[allow(dead_code)]
pub fn execute_n_steps(system: &mut System, n: usize) {
    for _ in 0..n {
        system.step();
    }
}
