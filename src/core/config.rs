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

//! Emulator configuration
//!
//! Settings are read from a TOML file and then overridden by command line
//! flags. Every field has a default so an empty file is a valid config.
//!
//! ```toml
//! bios_path = "gba_bios.bin"
//! save_path = "game.sav"
//! frames = 600
//! log_interval = 60
//! ```

use super::error::{EmulatorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration for a headless emulation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Path to the 16 KiB BIOS image
    pub bios_path: Option<PathBuf>,

    /// Path of the cartridge save file
    ///
    /// Defaults to the ROM path with a `.sav` extension when unset.
    pub save_path: Option<PathBuf>,

    /// Number of frames to run
    pub frames: u32,

    /// Frames between progress log lines
    pub log_interval: u32,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            bios_path: None,
            save_path: None,
            frames: 60,
            log_interval: 60,
        }
    }
}

impl EmulatorConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file
    ///
    /// # Returns
    ///
    /// - `Ok(EmulatorConfig)` with defaults filled in for missing keys
    /// - `Err(EmulatorError)` if the file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// Parse configuration from TOML text
    ///
    /// # Example
    ///
    /// ```
    /// use gbarx::core::config::EmulatorConfig;
    ///
    /// let config = EmulatorConfig::parse("frames = 10").unwrap();
    /// assert_eq!(config.frames, 10);
    /// assert_eq!(config.log_interval, 60);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EmulatorError::Config(e.to_string()))
    }

    /// Serialize configuration back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| EmulatorError::Config(e.to_string()))
    }

    /// Resolve the save file path for a ROM
    ///
    /// Returns the configured save path, or the ROM path with its extension
    /// replaced by `sav`.
    pub fn save_path_for(&self, rom_path: &Path) -> PathBuf {
        self.save_path
            .clone()
            .unwrap_or_else(|| rom_path.with_extension("sav"))
    }
}
