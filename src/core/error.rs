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

/// Emulator error types
use std::path::PathBuf;
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Main error type for the emulator
///
/// The CPU and bus never fail at runtime: undefined encodings go through the
/// undefined-instruction vector and unmapped accesses read open bus. Errors
/// only come from loading images, persisting save data and parsing config.
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("BIOS file not found: {0}")]
    BiosNotFound(String),

    #[error("Invalid BIOS size: {got} bytes (expected {expected})")]
    InvalidBiosSize { expected: usize, got: usize },

    #[error("ROM file not found: {0}")]
    RomNotFound(String),

    #[error("ROM image is empty: {0}")]
    EmptyRom(String),

    #[error("Save file error ({path}): {source}")]
    SaveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid save size: {got} bytes (expected {expected})")]
    InvalidSaveSize { expected: usize, got: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
