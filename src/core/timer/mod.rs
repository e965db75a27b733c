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

//! GBA Timer Implementation
//!
//! The GBA has 4 incrementing 16-bit timers. Each counts system cycles
//! through a prescaler, or counts overflows of the previous timer when
//! cascaded, and reloads on overflow.
//!
//! ## Register Layout
//!
//! Each timer has 2 registers at 4-byte intervals:
//! - `0x04000100 + (n * 4)`: Counter (read) / Reload (write)
//! - `0x04000102 + (n * 4)`: Control (R/W)
//!
//! ## Control Register Format (16 bits)
//!
//! ```text
//! 15-8:  Not used
//! 7:     Timer enable
//! 6:     IRQ on overflow
//! 5-3:   Not used
//! 2:     Count-up (cascade) timing, ignored for timer 0
//! 1-0:   Prescaler (0=F/1, 1=F/64, 2=F/256, 3=F/1024)
//! ```
//!
//! Timers 0 and 1 also pace the direct sound FIFOs: every overflow of
//! the timer selected in SOUNDCNT_H advances the corresponding FIFO.

#[cfg(test)]
mod tests;

use crate::core::interrupt::IrqFlags;
use crate::core::io::{lane16, set_lane16};
use crate::core::memory::Bus;

/// Prescaler shift per control bits 0-1
const PRESCALER_SHIFT: [u32; 4] = [0, 6, 8, 10];

/// Control register bits
mod control {
    pub const CASCADE: u16 = 1 << 2;
    pub const IRQ: u16 = 1 << 6;
    pub const ENABLE: u16 = 1 << 7;
}

/// A single timer channel
#[derive(Debug, Clone, Default)]
pub struct Timer {
    /// Value loaded on enable and on overflow
    reload: u16,

    /// Current counter; may briefly exceed 0xFFFF before overflow handling
    counter: u32,

    /// Control register
    control: u16,

    /// Cycles accumulated towards the next prescaled tick
    prescale: u32,
}

impl Timer {
    pub fn counter(&self) -> u16 {
        self.counter as u16
    }

    pub fn reload(&self) -> u16 {
        self.reload
    }

    pub fn control(&self) -> u16 {
        self.control
    }

    #[inline(always)]
    pub fn enabled(&self) -> bool {
        self.control & control::ENABLE != 0
    }

    #[inline(always)]
    pub fn irq_enabled(&self) -> bool {
        self.control & control::IRQ != 0
    }

    #[inline(always)]
    fn cascade(&self) -> bool {
        self.control & control::CASCADE != 0
    }

    /// Write the low control byte
    ///
    /// Enabling a stopped timer reloads the counter and restarts the
    /// prescaler.
    fn write_control(&mut self, value: u8) {
        let was_enabled = self.enabled();
        set_lane16(&mut self.control, 0, value);

        if !was_enabled && self.enabled() {
            self.counter = self.reload as u32;
            self.prescale = 0;
        }
    }

    /// Add ticks to the counter
    ///
    /// # Returns
    ///
    /// Number of overflows
    fn add_ticks(&mut self, ticks: u32) -> u32 {
        self.counter += ticks;

        let mut overflows = 0;
        while self.counter > 0xffff {
            self.counter = self.reload as u32 + (self.counter - 0x10000);
            overflows += 1;
        }
        overflows
    }
}

/// The four system timers
///
/// # Example
///
/// ```
/// use gbarx::core::timer::Timers;
///
/// let mut timers = Timers::new();
///
/// // Reload 0xFFFE, enable at F/1
/// timers.write8(0x100, 0xfe);
/// timers.write8(0x101, 0xff);
/// timers.write8(0x102, 0x80);
///
/// assert_eq!(timers.advance(2), [1, 0, 0, 0]);
/// assert_eq!(timers.timer(0).counter(), 0xfffe);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Timers {
    timers: [Timer; 4],
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timer(&self, idx: usize) -> &Timer {
        &self.timers[idx]
    }

    /// Whether any timer is running
    pub fn any_enabled(&self) -> bool {
        self.timers.iter().any(Timer::enabled)
    }

    /// Read one timer register byte
    ///
    /// The counter reads the live value; the reload value is write-only.
    pub fn read8(&self, offset: u32) -> Option<u8> {
        let timer = &self.timers[((offset >> 2) & 3) as usize];

        let value = match offset & 3 {
            0 | 1 => lane16(timer.counter as u16, offset),
            2 => timer.control as u8 & 0xc7,
            _ => 0,
        };

        Some(value)
    }

    /// Write one timer register byte
    pub fn write8(&mut self, offset: u32, value: u8) {
        let timer = &mut self.timers[((offset >> 2) & 3) as usize];

        match offset & 3 {
            0 | 1 => set_lane16(&mut timer.reload, offset, value),
            2 => timer.write_control(value),
            _ => set_lane16(&mut timer.control, 1, value),
        }
    }

    /// Run the timers for a number of system cycles
    ///
    /// # Arguments
    ///
    /// * `cycles` - Elapsed system cycles
    ///
    /// # Returns
    ///
    /// Overflow count per timer
    pub fn advance(&mut self, cycles: u32) -> [u32; 4] {
        let mut overflows = [0; 4];

        for idx in 0..4 {
            let timer = &mut self.timers[idx];
            if !timer.enabled() {
                continue;
            }

            let ticks = if idx > 0 && timer.cascade() {
                overflows[idx - 1]
            } else {
                timer.prescale += cycles;
                let shift = PRESCALER_SHIFT[(timer.control & 3) as usize];
                let ticks = timer.prescale >> shift;
                timer.prescale &= (1 << shift) - 1;
                ticks
            };

            if ticks > 0 {
                overflows[idx] = timer.add_ticks(ticks);
            }
        }

        overflows
    }
}

impl Bus {
    /// Clock the timers and deliver their overflow side effects
    ///
    /// Each overflow of the timer feeding a direct sound FIFO consumes one
    /// sample and refills the FIFO by DMA once it is half empty.
    pub(crate) fn clock_timers(&mut self, cycles: u32) {
        if !self.timers.any_enabled() {
            return;
        }

        let overflows = self.timers.advance(cycles);
        let soundcnt_h = self.io.soundcnt_h();

        for (idx, &count) in overflows.iter().enumerate() {
            if count == 0 {
                continue;
            }

            if idx < 2 {
                for _ in 0..count {
                    if ((soundcnt_h >> 10) & 1) as usize == idx {
                        self.fifos.a.pop();
                        if self.fifos.a.len() <= 16 {
                            self.run_fifo_dma(1);
                        }
                    }

                    if ((soundcnt_h >> 14) & 1) as usize == idx {
                        self.fifos.b.pop();
                        if self.fifos.b.len() <= 16 {
                            self.run_fifo_dma(2);
                        }
                    }
                }
            }

            if self.timers.timer(idx).irq_enabled() {
                self.raise_irq(IrqFlags::timer(idx));
            }
        }
    }
}
