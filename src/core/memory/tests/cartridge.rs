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

//! Cartridge ROM, EEPROM window and save file tests

use super::super::*;

#[test]
fn test_rom_reads() {
    let mut bus = Bus::new();

    bus.load_rom_data((0..=255u8).cycle().take(0x1000).collect());

    assert_eq!(bus.read_byte(0x0800_0010), 0x10);
    assert_eq!(bus.read_word(0x0800_0000), 0x0302_0100);

    // All three wait-state mirrors show the same image
    assert_eq!(bus.read_byte(0x0a00_0020), 0x20);
    assert_eq!(bus.read_byte(0x0c00_0030), 0x30);
}

#[test]
fn test_rom_past_end_returns_address_pattern() {
    let mut bus = Bus::new();

    bus.load_rom_data(vec![0u8; 0x100]);

    assert_eq!(bus.read_half(0x0800_1000), 0x0800);
    assert_eq!(bus.read_half(0x0800_1002), 0x0801);
}

#[test]
fn test_rom_is_read_only() {
    let mut bus = Bus::new();

    bus.load_rom_data(vec![0x11; 0x100]);
    bus.write_word(0x0800_0000, 0);

    assert_eq!(bus.read_word(0x0800_0000), 0x1111_1111);
}

#[test]
fn test_load_rom_errors() {
    let mut bus = Bus::new();

    assert!(matches!(
        bus.load_rom("/nonexistent/game.gba"),
        Err(EmulatorError::RomNotFound(_))
    ));

    let file = tempfile::NamedTempFile::new().unwrap();
    assert!(matches!(
        bus.load_rom(file.path().to_str().unwrap()),
        Err(EmulatorError::EmptyRom(_))
    ));
}

#[test]
fn test_eeprom_window_depends_on_rom_size() {
    let mut bus = Bus::new();

    bus.load_rom_data(vec![0u8; 0x1000]);
    assert_eq!(bus.identify_region(0x0d00_0000), MemoryRegion::Eeprom);

    bus.load_rom_data(vec![0u8; Bus::LARGE_ROM_SIZE + 1]);
    assert_eq!(bus.identify_region(0x0d00_0000), MemoryRegion::Rom);
    assert_eq!(bus.identify_region(0x0dff_ff00), MemoryRegion::Eeprom);
}

#[test]
fn test_eeprom_window_closed_for_other_chips() {
    let mut bus = Bus::new();

    let mut rom = vec![0u8; 0x1000];
    rom[0x100..0x106].copy_from_slice(b"SRAM_V");
    bus.load_rom_data(rom);

    assert_eq!(bus.identify_region(0x0d00_0000), MemoryRegion::Rom);
}

#[test]
fn test_eeprom_attached_on_first_access() {
    let mut bus = Bus::new();

    bus.load_rom_data(vec![0u8; 0x1000]);
    bus.write_half(0x0400_00dc, 9);
    bus.write_half(0x0d00_0000, 1);

    assert_eq!(bus.backup().kind(), "EEPROM");
    assert_eq!(bus.read_half(0x0d00_0000), 1);
}

#[test]
fn test_save_window_is_byte_wide() {
    let mut bus = Bus::new();

    let mut rom = vec![0u8; 0x1000];
    rom[0x100..0x106].copy_from_slice(b"SRAM_V");
    bus.load_rom_data(rom);

    bus.write_byte(0x0e00_0000, 0x12);
    assert_eq!(bus.read_half(0x0e00_0000), 0x1212);
    assert_eq!(bus.read_word(0x0e00_0000), 0x1212_1212);

    // Wider writes store the addressed lane only
    bus.write_word(0x0e00_0011, 0xaabb_ccdd);
    assert_eq!(bus.read_byte(0x0e00_0011), 0xcc);
    assert_eq!(bus.read_byte(0x0e00_0010), 0xff);
}

#[test]
fn test_save_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.sav");

    let mut rom = vec![0u8; 0x1000];
    rom[0x100..0x106].copy_from_slice(b"SRAM_V");

    let mut bus = Bus::new();
    bus.load_rom_data(rom.clone());

    // Nothing changed yet
    assert!(!bus.flush_save(&path).unwrap());

    bus.write_byte(0x0e00_0042, 0x99);
    assert!(bus.flush_save(&path).unwrap());
    assert!(!bus.backup().is_dirty());

    let mut restored = Bus::new();
    restored.load_rom_data(rom);
    assert!(restored.load_save(&path).unwrap());
    assert_eq!(restored.read_byte(0x0e00_0042), 0x99);
}

#[test]
fn test_missing_save_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();

    let mut rom = vec![0u8; 0x1000];
    rom[0x100..0x109].copy_from_slice(b"FLASH1M_V");

    let mut bus = Bus::new();
    bus.load_rom_data(rom);

    assert!(!bus.load_save(dir.path().join("missing.sav")).unwrap());
}

#[test]
fn test_wrong_size_save_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.sav");
    std::fs::write(&path, [0u8; 10]).unwrap();

    let mut rom = vec![0u8; 0x1000];
    rom[0x100..0x106].copy_from_slice(b"SRAM_V");

    let mut bus = Bus::new();
    bus.load_rom_data(rom);

    assert!(matches!(
        bus.load_save(&path),
        Err(EmulatorError::InvalidSaveSize { .. })
    ));
}
