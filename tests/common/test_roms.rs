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

//! Small hand-assembled test programs

/// BIOS stub: jump straight to the cartridge
///
/// Place at offset 0; the literal at 0x04 is the jump target.
#[allow(dead_code)]
pub fn boot_stub() -> Vec<u32> {
    vec![
        0xe51ff004, // ldr pc, [pc, #-4]
        0x08000000, // .word ROM entry
    ]
}

/// IRQ handler for the 0x18 vector
///
/// Acknowledges VBlank in IF and counts interrupts in r7.
#[allow(dead_code)]
pub fn vblank_handler() -> Vec<u32> {
    vec![
        0xe3a08301, // mov r8, #0x04000000
        0xe2888c02, // add r8, r8, #0x200
        0xe3a09001, // mov r9, #1
        0xe1c890b2, // strh r9, [r8, #2]    ; IF = VBLANK
        0xe2877001, // add r7, r7, #1
        0xe25ef004, // subs pc, lr, #4
    ]
}

/// Sum 10 + 9 + ... + 1 into r0 and store it at 0x03000000
#[allow(dead_code)]
pub fn test_program_sum_loop() -> Vec<u32> {
    vec![
        0xe3a00000, // mov r0, #0
        0xe3a0100a, // mov r1, #10
        0xe0800001, // loop: add r0, r0, r1
        0xe2511001, // subs r1, r1, #1
        0x1afffffc, // bne loop
        0xe3a02403, // mov r2, #0x03000000
        0xe5820000, // str r0, [r2]
        0xeafffffe, // b .
    ]
}

/// Switch to Thumb with BX and compute 7 << 4 in r0
#[allow(dead_code)]
pub fn test_program_thumb_switch() -> Vec<u32> {
    vec![
        0xe28f3001, // add r3, pc, #1       ; r3 = 0x08000009
        0xe12fff13, // bx r3
        0x01002007, // mov r0, #7 ; lsl r0, r0, #4
        0x0000e7fe, // b .
    ]
}

/// Enable the VBlank interrupt, unmask IRQs and spin
#[allow(dead_code)]
pub fn test_program_vblank_irq() -> Vec<u32> {
    vec![
        0xe3a00301, // mov r0, #0x04000000
        0xe3a01008, // mov r1, #8
        0xe1c010b4, // strh r1, [r0, #4]    ; DISPSTAT VBlank IRQ
        0xe2802c02, // add r2, r0, #0x200
        0xe3a01001, // mov r1, #1
        0xe1c210b0, // strh r1, [r2]        ; IE = VBLANK
        0xe1c210b8, // strh r1, [r2, #8]    ; IME = 1
        0xe10f3000, // mrs r3, cpsr
        0xe3c33080, // bic r3, r3, #0x80
        0xe121f003, // msr cpsr_c, r3
        0xeafffffe, // b .
    ]
}

/// Same setup as [`test_program_vblank_irq`], then halt until each IRQ
#[allow(dead_code)]
pub fn test_program_halt_loop() -> Vec<u32> {
    let mut program = test_program_vblank_irq();
    program.pop();
    program.extend([
        0xe3a01000, // mov r1, #0
        0xe5c01301, // halt: strb r1, [r0, #0x301]  ; HALTCNT
        0xe2866001, // add r6, r6, #1
        0xeafffffc, // b halt
    ]);
    program
}

/// Get BIOS path from environment or default location
#[allow(dead_code)]
pub fn get_bios_path() -> Option<String> {
    std::env::var("GBA_BIOS_PATH").ok().or_else(|| {
        let default_path = "gba_bios.bin";
        if std::path::Path::new(default_path).exists() {
            Some(default_path.to_string())
        } else {
            None
        }
    })
}

/// Check if BIOS is available for testing
#[allow(dead_code)]
pub fn is_bios_available() -> bool {
    get_bios_path().is_some()
}
