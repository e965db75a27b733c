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

//! Serial EEPROM save chip
//!
//! The EEPROM is accessed one bit per transfer through DMA channel 3. A
//! request is a bit stream written MSB first:
//!
//! ```text
//! Read:  11 | address (6 or 14 bits) | 0
//! Write: 10 | address (6 or 14 bits) | 64 data bits | 0
//! ```
//!
//! The address width (512B vs 8KB chip) is inferred from the stream length,
//! which equals the DMA3 word count. After a read request the chip returns
//! 4 dummy bits followed by the 64 data bits of the addressed record.

use log::trace;

/// Chip size; 512B parts use the first 64 records
const EEPROM_SIZE: usize = 0x2000;

/// Request codes in the top two bits of the stream
const WRITE_REQUEST: u8 = 2;
const READ_REQUEST: u8 = 3;

/// Bits returned per read: 4 dummy bits then one 64-bit record
const READ_STREAM_BITS: u32 = 4 + 64;

/// Serial EEPROM state
#[derive(Debug, Clone)]
pub struct Eeprom {
    data: Vec<u8>,
    /// Incoming request bits
    buffer: [u8; 0x100],
    /// Bit position in the current request or read stream
    index: u32,
    /// Byte offset of the record being streamed out
    read_address: usize,
    dirty: bool,
}

impl Eeprom {
    /// Create an erased EEPROM
    pub fn new() -> Self {
        Self {
            data: vec![0xff; EEPROM_SIZE],
            buffer: [0; 0x100],
            index: 0,
            read_address: 0,
            dirty: false,
        }
    }

    /// Restart the serial stream; called when DMA channel 3 starts
    pub fn reset_index(&mut self) {
        self.index = 0;
    }

    /// Shift one request bit in
    ///
    /// # Arguments
    ///
    /// * `value` - Bus value; only bit 0 is used
    /// * `stream_len` - Total request length in bits (DMA3 word count)
    pub fn write_bit(&mut self, value: u8, stream_len: u32) {
        if self.index == 0 {
            self.buffer.fill(0);
        }

        let byte = ((self.index >> 3) & 0xff) as usize;
        let bit = self.index & 7;
        self.buffer[byte] |= (value & 1) << (bit ^ 7);

        self.index += 1;

        if self.index == stream_len {
            self.process_request();
        }
    }

    fn process_request(&mut self) {
        let mode = self.buffer[0] >> 6;

        if mode & WRITE_REQUEST != 0 {
            let data_bits = if mode == WRITE_REQUEST { 64 } else { 0 };
            let narrow = self.index == 2 + 6 + data_bits + 1;

            let record = if narrow {
                (self.buffer[0] & 0x3f) as usize
            } else {
                ((self.buffer[0] & 0x3f) as usize) << 8 | self.buffer[1] as usize
            };
            let address = (record & (EEPROM_SIZE / 8 - 1)) << 3;

            if mode == WRITE_REQUEST {
                let start = if narrow { 1 } else { 2 };
                self.data[address..address + 8].copy_from_slice(&self.buffer[start..start + 8]);
                self.dirty = true;
                trace!("EEPROM write record at 0x{:04X}", address);
            } else {
                self.read_address = address;
                trace!("EEPROM read request at 0x{:04X}", address);
            }
        }

        self.index = 0;
    }

    /// Shift one response bit out
    ///
    /// Returns 1 (ready) outside a read stream.
    pub fn read_bit(&mut self) -> u8 {
        if self.buffer[0] >> 6 != READ_REQUEST {
            return 1;
        }

        let mut value = 0;

        if self.index >= 4 {
            let pos = self.index - 4;
            let byte = ((pos >> 3) & 7) as usize;
            let bit = pos & 7;
            value = (self.data[self.read_address | byte] >> (bit ^ 7)) & 1;
        }

        self.index += 1;

        if self.index == READ_STREAM_BITS {
            self.index = 0;
            self.buffer[0] = 0;
        }

        value
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

impl Default for Eeprom {
    fn default() -> Self {
        Self::new()
    }
}
