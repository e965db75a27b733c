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

//! Direct sound FIFO pacing tests

use super::super::*;

#[test]
fn test_overflow_pops_selected_fifo() {
    let mut bus = Bus::new();

    // Master sound enable, FIFO A on timer 0, FIFO B on timer 1
    bus.write_byte(0x0400_0084, 0x80);
    bus.write_half(0x0400_0082, 1 << 14);

    for i in 0..8u32 {
        bus.write_word(0x0400_00a0, 0x0403_0201 + i);
        bus.write_word(0x0400_00a4, 0x0403_0201 + i);
    }
    assert_eq!(bus.fifos().a.len(), 32);

    bus.write_half(0x0400_0100, 0xffff);
    bus.write_half(0x0400_0102, 0x0080);
    bus.clock_timers(1);

    assert_eq!(bus.fifos().a.len(), 31);
    assert_eq!(bus.fifos().a.sample(), 0x01);
    assert_eq!(bus.fifos().b.len(), 32);
}

#[test]
fn test_low_fifo_requests_dma() {
    let mut bus = Bus::new();

    bus.write_word(0x0200_0000, 0x1111_1111);
    bus.write_word(0x0200_0004, 0x2222_2222);
    bus.write_word(0x0200_0008, 0x3333_3333);
    bus.write_word(0x0200_000c, 0x4444_4444);

    // DMA1: EWRAM -> FIFO A, 32-bit, special timing, repeat
    bus.write_word(0x0400_00bc, 0x0200_0000);
    bus.write_word(0x0400_00c0, 0x0400_00a0);
    bus.write_half(0x0400_00c4, 4);
    bus.write_half(0x0400_00c6, 0xb600);

    bus.write_half(0x0400_0100, 0xffff);
    bus.write_half(0x0400_0102, 0x0080);
    bus.clock_timers(1);

    assert_eq!(bus.fifos().a.len(), 16);
}
