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

//! Flash save chip
//!
//! Flash is driven by JEDEC-style command sequences. Every command starts
//! with `0xAA` written to 0x5555 and `0x55` written to 0x2AAA, followed by
//! the command byte at 0x5555:
//!
//! | Command | Effect                                   |
//! |---------|------------------------------------------|
//! | 0x90    | Enter ID mode                            |
//! | 0xF0    | Leave ID mode                            |
//! | 0x80    | Arm erase                                |
//! | 0x10    | Erase the whole chip (erase armed)       |
//! | 0x30    | Erase the 4KB sector written to (armed)  |
//! | 0xA0    | Program the next written byte            |
//! | 0xB0    | Switch bank via a write to 0x0000        |
//!
//! The 128KB part exposes two 64KB banks through the same window.

use log::debug;

/// Flash capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashSize {
    /// 512Kbit part (Panasonic)
    Kb64,
    /// 1Mbit part with two banks (Sanyo)
    Kb128,
}

impl FlashSize {
    fn bytes(self) -> usize {
        match self {
            FlashSize::Kb64 => 0x10000,
            FlashSize::Kb128 => 0x20000,
        }
    }

    /// Manufacturer and device ID bytes
    fn id(self) -> [u8; 2] {
        match self {
            FlashSize::Kb64 => [0x32, 0x1b],
            FlashSize::Kb128 => [0x62, 0x13],
        }
    }
}

/// Position in the command prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandState {
    Ready,
    Unlock1,
    Unlock2,
}

/// Flash chip state
#[derive(Debug, Clone)]
pub struct Flash {
    data: Vec<u8>,
    size: FlashSize,
    state: CommandState,
    /// Offset of the active 64KB bank
    bank: usize,
    id_mode: bool,
    erase_armed: bool,
    program_armed: bool,
    bank_armed: bool,
    dirty: bool,
}

impl Flash {
    /// Create an erased Flash chip
    pub fn new(size: FlashSize) -> Self {
        Self {
            data: vec![0xff; size.bytes()],
            size,
            state: CommandState::Ready,
            bank: 0,
            id_mode: false,
            erase_armed: false,
            program_armed: false,
            bank_armed: false,
            dirty: false,
        }
    }

    pub fn size(&self) -> FlashSize {
        self.size
    }

    /// Currently selected bank (0 or 1)
    pub fn bank(&self) -> usize {
        self.bank >> 16
    }

    pub fn read(&self, address: u32) -> u8 {
        let offset = (address & 0xffff) as usize;

        if self.id_mode && offset < 2 {
            return self.size.id()[offset];
        }

        self.data[self.bank | offset]
    }

    pub fn write(&mut self, address: u32, value: u8) {
        let offset = (address & 0xffff) as usize;

        if self.program_armed {
            self.program_armed = false;
            self.data[self.bank | offset] = value;
            self.dirty = true;
            return;
        }

        if self.bank_armed && offset == 0 {
            self.bank_armed = false;
            if self.size == FlashSize::Kb128 {
                self.bank = ((value & 1) as usize) << 16;
            }
            return;
        }

        self.state = match (self.state, offset, value) {
            (CommandState::Ready, 0x5555, 0xaa) => CommandState::Unlock1,
            (CommandState::Unlock1, 0x2aaa, 0x55) => CommandState::Unlock2,
            (CommandState::Unlock2, _, _) => {
                self.command(offset, value);
                CommandState::Ready
            }
            _ => CommandState::Ready,
        };
    }

    fn command(&mut self, offset: usize, value: u8) {
        if offset != 0x5555 {
            if value == 0x30 && self.erase_armed {
                let start = self.bank | (offset & 0xf000);
                self.data[start..start + 0x1000].fill(0xff);
                self.erase_armed = false;
                self.dirty = true;
                debug!("Flash sector erase at 0x{:05X}", start);
            }
            return;
        }

        match value {
            0x90 => self.id_mode = true,
            0xf0 => self.id_mode = false,
            0x80 => self.erase_armed = true,
            0x10 if self.erase_armed => {
                self.data.fill(0xff);
                self.erase_armed = false;
                self.dirty = true;
                debug!("Flash chip erase");
            }
            0xa0 => self.program_armed = true,
            0xb0 => self.bank_armed = true,
            _ => {}
        }
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
