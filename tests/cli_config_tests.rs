//! End-to-end tests for `datahand-layers config` commands.

use std::fs;
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_config_init_writes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let output = run_with_config(&["config", "init"], &path);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(path.exists());

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("[leds]"));
    assert!(content.contains("mode_normal = 5"));
    assert!(content.contains("level = \"info\""));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "config.toml", "[logging]\nlevel = \"debug\"\n");

    let output = run_with_config(&["config", "init"], &path);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--force"));
    assert!(fs::read_to_string(&path).unwrap().contains("debug"));

    let output = run_with_config(&["config", "init", "--force"], &path);
    assert_eq!(output.status.code(), Some(0));
    assert!(fs::read_to_string(&path).unwrap().contains("info"));
}

// ============================================================================
// Show Command Tests
// ============================================================================

#[test]
fn test_config_show_json() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "config.toml",
        "[leds]\nmode_nas = 0\n\n[logging]\nlevel = \"warn\"\n",
    );

    let output = run_isolated(&["config", "show", "--json"], dir.path());
    assert_eq!(output.status.code(), Some(0));

    let json = stdout_json(&output);
    assert_eq!(json["leds"]["mode_nas"], 0);
    assert_eq!(json["leds"]["mode_normal"], 5);
    assert_eq!(json["logging"]["level"], "warn");
    assert!(json["keymap"].get("path").is_none());
}

#[test]
fn test_config_show_human_readable() {
    let dir = TempDir::new().unwrap();
    let output = run_isolated(&["config", "show"], dir.path());
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DataHand Layers Configuration"));
    assert!(stdout.contains("built-in datahand-dvorak"));
}

#[test]
fn test_config_show_invalid_pins() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "config.toml",
        "[leds]\nlock_num = 6\nlock_caps = 6\n",
    );

    let output = run_isolated(&["config", "show"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("lock_caps"));
}

#[test]
fn test_invalid_config_blocks_other_commands() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "config.toml", "[leds]\nmode_fn = 9\n");

    let output = run_isolated(&["simulate", "--events", "N"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load configuration"));
}

#[test]
fn test_configured_keymap_is_used() {
    let dir = TempDir::new().unwrap();
    let keymap = write_file(&dir, "two.json5", TWO_KEY_KEYMAP);
    write_file(
        &dir,
        "config.toml",
        &format!("[keymap]\npath = {:?}\n", keymap.to_str().unwrap()),
    );

    let output = run_isolated(&["keymap", "show", "--json"], dir.path());
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_json(&output)["name"], "two-key");
}

#[test]
fn test_relative_keymap_path_follows_config_file() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("keymaps")).unwrap();
    fs::write(dir.path().join("keymaps").join("two.json5"), TWO_KEY_KEYMAP).unwrap();
    write_file(&dir, "config.toml", "[keymap]\npath = \"keymaps/two.json5\"\n");

    let output = run_isolated(&["keymap", "show", "--json"], dir.path());
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(stdout_json(&output)["name"], "two-key");
}

#[test]
fn test_verbose_logs_config_load() {
    let dir = TempDir::new().unwrap();
    let output = run_isolated(&["--verbose", "leds", "--mask", "1"], dir.path());

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("config loaded"));
}

// ============================================================================
// Path Command Tests
// ============================================================================

#[test]
fn test_config_path_prints_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("elsewhere.toml");

    let output = run_with_config(&["config", "path"], &path);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        path.display().to_string()
    );
}
