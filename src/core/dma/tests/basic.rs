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

//! Register access tests

use super::super::*;

#[test]
fn test_addresses_are_write_only() {
    let mut dma = DmaController::new();

    dma.write8(0xb0, 0x12);
    dma.write8(0xb4, 0x34);

    assert_eq!(dma.read8(0xb0), None);
    assert_eq!(dma.read8(0xb7), None);
}

#[test]
fn test_count_reads_zero() {
    let mut dma = DmaController::new();

    dma.write8(0xb8, 0xff);
    assert_eq!(dma.read8(0xb8), Some(0));
    assert_eq!(dma.read8(0xb9), Some(0));
}

#[test]
fn test_control_read_masks() {
    let mut dma = DmaController::new();

    dma.write8(0xba, 0xff);
    dma.write8(0xde, 0xff);

    assert_eq!(dma.read8(0xba), Some(0xe0));
    assert_eq!(dma.read8(0xde), Some(0xe0));

    // Only the write that sets bit 15 is an enable edge
    assert!(!dma.write8(0xbb, 0x07));
    assert!(!dma.write8(0xbb, 0x07));
    assert!(dma.write8(0xbb, 0x87));
    assert!(!dma.write8(0xbb, 0xff));
    assert_eq!(dma.read8(0xbb), Some(0xf7));

    assert!(dma.write8(0xdf, 0xff));
    assert_eq!(dma.read8(0xdf), Some(0xff));
}

#[test]
fn test_enable_latches_aligned_addresses() {
    let mut dma = DmaController::new();

    for (i, b) in 0x0200_0003u32.to_le_bytes().into_iter().enumerate() {
        dma.write8(0xc8 + i as u32, b);
    }
    for (i, b) in 0x0300_0006u32.to_le_bytes().into_iter().enumerate() {
        dma.write8(0xcc + i as u32, b);
    }
    dma.write8(0xd0, 0x10);

    // 32-bit, enabled
    dma.write8(0xd3, 0x84);

    let channel = dma.channel(2);
    assert_eq!(channel.internal_source, 0x0200_0000);
    assert_eq!(channel.internal_dest, 0x0300_0004);
    assert_eq!(channel.internal_count, 0x10);
}

#[test]
fn test_zero_count_means_maximum() {
    let mut dma = DmaController::new();

    dma.write8(0xbb, 0x80);
    dma.write8(0xdf, 0x80);

    assert_eq!(dma.channel(0).internal_count, 0x4000);
    assert_eq!(dma.channel(3).internal_count, 0x10000);
}

#[test]
fn test_timing_decode() {
    assert_eq!(DmaTiming::from_control(0x0000), DmaTiming::Immediate);
    assert_eq!(DmaTiming::from_control(0x1000), DmaTiming::VBlank);
    assert_eq!(DmaTiming::from_control(0x2000), DmaTiming::HBlank);
    assert_eq!(DmaTiming::from_control(0x3000), DmaTiming::Special);
}
