//! Shared test fixtures for scenario and E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use datahand_layers::config::Config;
use datahand_layers::keymap::Keymap;
use datahand_layers::leds::LedPins;
use datahand_layers::sim::{parse_script, Keyboard};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the datahand-layers binary
pub fn datahand_bin() -> &'static str {
    env!("CARGO_BIN_EXE_datahand-layers")
}

/// Runs the binary with `args` against an isolated config file in
/// `config_dir`, writing a default one first if none exists.
pub fn run_isolated(args: &[&str], config_dir: &Path) -> Output {
    let config = config_dir.join("config.toml");
    if !config.exists() {
        Config::new()
            .save_to(&config)
            .expect("Failed to write test config");
    }
    run_with_config(args, &config)
}

/// Runs the binary with `args` and `--config <config>`.
pub fn run_with_config(args: &[&str], config: &Path) -> Output {
    Command::new(datahand_bin())
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

/// A keyboard with the built-in keymap and default pins, after boot.
pub fn boot() -> Keyboard {
    Keyboard::new(Keymap::datahand_dvorak(), LedPins::default()).expect("default pins are valid")
}

/// Boots a keyboard and runs `script` on it.
pub fn run_script(script: &str) -> Keyboard {
    let mut keyboard = boot();
    let steps = parse_script(script).expect("script parses");
    keyboard.run(&steps).expect("script runs");
    keyboard
}

/// Writes `content` to `dir/name` and returns the path.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture file");
    path
}

/// A minimal valid keymap: two keys per layer.
pub const TWO_KEY_KEYMAP: &str = r#"// two-key test layout
{
    name: "two-key",
    description: "Two keys per layer",
    layers: {
        NORMAL: ["NS", "KC_A"],
        GAME: ["_______", "KC_B"],
        FUNCTION_MOUSE: ["_______", "KC_C"],
        NAS: ["_______", "KC_1"],
        NAS_NUMLOCK: ["_______", "KC_KP_1"],
    },
}
"#;

/// A keymap whose NAS layer is one key short.
pub const SHORT_LAYER_KEYMAP: &str = r#"{
    name: "short",
    layers: {
        NORMAL: ["NS", "KC_A"],
        GAME: ["_______", "KC_B"],
        FUNCTION_MOUSE: ["_______", "KC_C"],
        NAS: ["_______"],
        NAS_NUMLOCK: ["_______", "KC_KP_1"],
    },
}
"#;

/// Parses stdout as JSON, failing with stderr in the message.
pub fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}). stdout: {} stderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}
