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

//! Battery-backed SRAM save chip

/// SRAM size (32KB)
const SRAM_SIZE: usize = 0x8000;

/// Plain byte-addressed SRAM
#[derive(Debug, Clone)]
pub struct Sram {
    data: Vec<u8>,
    dirty: bool,
}

impl Sram {
    pub fn new() -> Self {
        Self {
            data: vec![0xff; SRAM_SIZE],
            dirty: false,
        }
    }

    pub fn read(&self, address: u32) -> u8 {
        self.data[address as usize & (SRAM_SIZE - 1)]
    }

    pub fn write(&mut self, address: u32, value: u8) {
        self.data[address as usize & (SRAM_SIZE - 1)] = value;
        self.dirty = true;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl Default for Sram {
    fn default() -> Self {
        Self::new()
    }
}
