//! Reference emulators for alegym.
//!
//! Software implementations of the `Emulator` trait, for running and testing
//! environments without a native arcade core:
//! - `ToyArcade` - Deterministic paddle games loaded from small ROM files
//! - `ScriptedEmulator` - Replays scripted rewards and records every call

mod scripted;
mod toy;

pub use scripted::{Call, ScriptedEmulator};
pub use toy::{
    write_rom, Cartridge, Rule, ToyArcade, ToyError, CARTRIDGES, RAM_SIZE, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};
