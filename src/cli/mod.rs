//! CLI command handlers for DataHand Layers.
//!
//! This module provides headless, scriptable access to the layer controller
//! and its keymaps for automation, testing, and CI integration.

pub mod common;
pub mod config;
pub mod keymap;
pub mod leds;
pub mod simulate;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use keymap::KeymapArgs;
pub use leds::LedsArgs;
pub use simulate::SimulateArgs;
