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

use clap::Parser;
use gbarx::core::config::EmulatorConfig;
use gbarx::core::error::{EmulatorError, Result};
use gbarx::core::system::{NullRenderer, System};
use log::{error, info};
use std::path::PathBuf;

/// Game Boy Advance emulator
#[derive(Parser)]
#[command(name = "gbarx")]
#[command(about = "Game Boy Advance emulator", long_about = None)]
struct Args {
    /// Path to the cartridge ROM (.gba)
    rom: PathBuf,

    /// Path to the 16KB GBA BIOS (e.g., gba_bios.bin)
    #[arg(short = 'b', long)]
    bios: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(short = 'n', long)]
    frames: Option<u32>,

    /// Path of the save file (defaults to the ROM path with .sav)
    #[arg(short = 's', long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Optional .env for RUST_LOG and friends
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize logger with default level INFO
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("gbarx v{}", env!("CARGO_PKG_VERSION"));
    info!("Game Boy Advance emulator");

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            EmulatorConfig::load(path)?
        }
        None => EmulatorConfig::default(),
    };

    // Command line flags win over the config file
    if args.bios.is_some() {
        config.bios_path = args.bios.clone();
    }
    if args.save.is_some() {
        config.save_path = args.save.clone();
    }
    if let Some(frames) = args.frames {
        config.frames = frames;
    }

    let bios_path = config
        .bios_path
        .clone()
        .ok_or_else(|| EmulatorError::Config("no BIOS given (use --bios or bios_path)".into()))?;
    let save_path = config.save_path_for(&args.rom);

    let mut system = System::new();

    info!("Loading BIOS from: {}", bios_path.display());
    if let Err(e) = system.load_bios(&bios_path.to_string_lossy()) {
        error!("Failed to load BIOS: {}", e);
        return Err(e);
    }

    info!("Loading ROM from: {}", args.rom.display());
    if let Err(e) = system.load_rom(&args.rom.to_string_lossy()) {
        error!("Failed to load ROM: {}", e);
        return Err(e);
    }

    system.load_save(&save_path)?;

    info!("Starting emulation...");
    system.reset();

    let mut renderer = NullRenderer;
    let log_interval = config.log_interval.max(1);

    for frame in 1..=config.frames {
        system.run_frame(&mut renderer);

        if frame % log_interval == 0 {
            info!(
                "Frame {}/{} | PC: 0x{:08X} | Cycles: {}",
                frame,
                config.frames,
                system.pc(),
                system.cycles()
            );
        }
    }

    if system.flush_save(&save_path)? {
        info!("Save data written to {}", save_path.display());
    }

    info!("Emulation completed successfully!");
    info!("Total frames: {}", system.frame_count());
    info!("Total cycles: {}", system.cycles());
    info!("Final PC: 0x{:08X}", system.pc());

    Ok(())
}
