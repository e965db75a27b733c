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

//! Direct sound FIFOs
//!
//! Two 32-byte queues of signed 8-bit PCM samples. Software or DMA writes
//! whole words to FIFO_A (0x040000A0) / FIFO_B (0x040000A4); the timer
//! selected in SOUNDCNT_H pops one sample per overflow. Sample mixing and
//! audio output are not emulated, but the latest sample is exposed.

use std::collections::VecDeque;

/// Capacity of each FIFO in bytes
pub const FIFO_CAPACITY: usize = 32;

/// One direct sound channel
#[derive(Debug, Clone)]
pub struct SoundFifo {
    queue: VecDeque<i8>,

    /// Bytes written to the FIFO register, pushed once the top lane lands
    latch: [u8; 4],

    /// Most recently popped sample
    sample: i8,
}

impl SoundFifo {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::with_capacity(FIFO_CAPACITY),
            latch: [0; 4],
            sample: 0,
        }
    }

    /// Latch one byte of the FIFO register
    ///
    /// Writing the top lane pushes the latched word.
    pub fn write_latch(&mut self, lane: usize, value: u8) {
        self.latch[lane] = value;

        if lane == 3 {
            self.push_latch();
        }
    }

    /// Push the latched word; dropped if the FIFO lacks room for all four bytes
    fn push_latch(&mut self) {
        if self.queue.len() + 4 > FIFO_CAPACITY {
            log::trace!("Sound FIFO full, dropping word");
            return;
        }

        self.queue.extend(self.latch.iter().map(|&b| b as i8));
    }

    /// Advance to the next sample; an empty FIFO repeats the last one
    pub fn pop(&mut self) {
        if let Some(sample) = self.queue.pop_front() {
            self.sample = sample;
        }
    }

    pub fn reset(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Current output sample
    pub fn sample(&self) -> i8 {
        self.sample
    }
}

impl Default for SoundFifo {
    fn default() -> Self {
        Self::new()
    }
}

/// FIFO A and FIFO B
#[derive(Debug, Clone, Default)]
pub struct SoundFifos {
    pub a: SoundFifo,
    pub b: SoundFifo,
}

impl SoundFifos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one byte of FIFO_A (0xA0-0xA3) or FIFO_B (0xA4-0xA7)
    pub fn write8(&mut self, offset: u32, value: u8) {
        let lane = (offset & 3) as usize;

        if offset & 4 == 0 {
            self.a.write_latch(lane, value);
        } else {
            self.b.write_latch(lane, value);
        }
    }

    /// Current output sample of FIFO A (`ch = 0`) or FIFO B
    pub fn sample(&self, ch: usize) -> i8 {
        if ch == 0 {
            self.a.sample()
        } else {
            self.b.sample()
        }
    }
}
