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

//! BIOS loading and read protection tests

use super::super::*;
use std::io::Write;

fn bios_image() -> Vec<u8> {
    (0..Bus::BIOS_SIZE).map(|i| i as u8).collect()
}

#[test]
fn test_load_bios_data_checks_size() {
    let mut bus = Bus::new();

    let err = bus.load_bios_data(&[0u8; 16]).unwrap_err();
    assert!(matches!(
        err,
        EmulatorError::InvalidBiosSize {
            expected: 16384,
            got: 16
        }
    ));

    bus.load_bios_data(&bios_image()).unwrap();
}

#[test]
fn test_load_bios_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bios_image()).unwrap();

    let mut bus = Bus::new();
    bus.load_bios(file.path().to_str().unwrap()).unwrap();

    bus.fetch32(0x0000_0000, Access::NonSequential);
    assert_eq!(bus.read_byte(0x0000_0010), 0x10);
}

#[test]
fn test_load_bios_missing_file() {
    let mut bus = Bus::new();

    let result = bus.load_bios("/nonexistent/gba_bios.bin");
    assert!(matches!(result, Err(EmulatorError::BiosNotFound(_))));
}

#[test]
fn test_bios_readable_while_executing_bios() {
    let mut bus = Bus::new();
    bus.load_bios_data(&bios_image()).unwrap();

    bus.fetch32(0x0000_0100, Access::NonSequential);

    assert_eq!(bus.read_word(0x0000_0004), 0x0706_0504);
}

#[test]
fn test_bios_protected_outside_bios() {
    let mut bus = Bus::new();
    bus.load_bios_data(&bios_image()).unwrap();

    // Last BIOS opcode fetched
    bus.fetch32(0x0000_0020, Access::NonSequential);

    // Leave the BIOS
    bus.write_word(0x0300_0000, 0);
    bus.fetch32(0x0300_0000, Access::NonSequential);

    assert_eq!(bus.read_word(0x0000_0004), 0x2322_2120);
}

#[test]
fn test_bios_writes_ignored() {
    let mut bus = Bus::new();
    bus.load_bios_data(&bios_image()).unwrap();

    bus.write_word(0x0000_0000, 0xffff_ffff);
    assert_eq!(bus.read_word(0x0000_0000), 0x0302_0100);
}
