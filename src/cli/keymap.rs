//! Keymap inspection and validation commands.

use crate::cli::common::{load_keymap, print_json, read_keymap_file, CliError, CliResult};
use crate::config::Config;
use crate::keymap::Keymap;
use crate::models::{Keycode, LayerId};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Keys printed per row in human-readable output
const KEYS_PER_ROW: usize = 8;

/// Keymap commands
#[derive(Args, Debug)]
pub struct KeymapArgs {
    #[command(subcommand)]
    command: KeymapCommand,
}

#[derive(Subcommand, Debug)]
enum KeymapCommand {
    /// Display a keymap
    Show(KeymapShowArgs),
    /// Check a keymap file
    Validate(KeymapValidateArgs),
}

/// Display a keymap
#[derive(Args, Debug)]
pub struct KeymapShowArgs {
    /// Only show this layer (name or index)
    #[arg(short, long, value_name = "NAME")]
    layer: Option<LayerId>,

    /// JSON5 keymap file (defaults to the configured keymap)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Check a keymap file
#[derive(Args, Debug)]
pub struct KeymapValidateArgs {
    /// JSON5 keymap file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug)]
struct LayerOutput<'a> {
    keymap: &'a str,
    layer: LayerId,
    keys: &'a [Keycode],
}

#[derive(Serialize, Debug)]
struct ValidateOutput {
    valid: bool,
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl KeymapArgs {
    /// Execute keymap subcommand
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        match &self.command {
            KeymapCommand::Show(args) => args.execute(config),
            KeymapCommand::Validate(args) => args.execute(),
        }
    }
}

impl KeymapShowArgs {
    /// Execute show command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let keymap = load_keymap(self.file.as_deref(), config)?;

        match (self.layer, self.json) {
            (Some(layer), true) => print_json(&LayerOutput {
                keymap: keymap.name(),
                layer,
                keys: keymap.layer(layer),
            })?,
            (None, true) => print_json(&keymap)?,
            (Some(layer), false) => {
                print_header(&keymap);
                print_layer(&keymap, layer);
            }
            (None, false) => {
                print_header(&keymap);
                for layer in LayerId::ALL {
                    print_layer(&keymap, layer);
                }
            }
        }

        Ok(())
    }
}

impl KeymapValidateArgs {
    /// Execute validate command
    pub fn execute(&self) -> CliResult<()> {
        let content = read_keymap_file(&self.file)?;

        let result = Keymap::from_json5(&content);
        let output = match &result {
            Ok(keymap) => ValidateOutput {
                valid: true,
                file: self.file.display().to_string(),
                name: Some(keymap.name().to_string()),
                key_count: Some(keymap.key_count()),
                error: None,
            },
            Err(e) => ValidateOutput {
                valid: false,
                file: self.file.display().to_string(),
                name: None,
                key_count: None,
                error: Some(format!("{e:#}")),
            },
        };

        if self.json {
            print_json(&output)?;
        } else if let Some(error) = &output.error {
            println!("✗ {}: {error}", output.file);
        } else {
            println!(
                "✓ {}: keymap '{}' is valid ({} keys per layer)",
                output.file,
                output.name.as_deref().unwrap_or_default(),
                output.key_count.unwrap_or_default()
            );
        }

        match result {
            Ok(_) => Ok(()),
            Err(_) => Err(CliError::validation("Keymap validation failed")),
        }
    }
}

fn print_header(keymap: &Keymap) {
    println!("Keymap: {}", keymap.name());
    if let Some(description) = keymap.description() {
        println!("{description}");
    }
    println!();
}

fn print_layer(keymap: &Keymap, layer: LayerId) {
    let keys = keymap.layer(layer);
    println!("{} (layer {}, {} keys)", layer, layer.index(), keys.len());
    for (row, chunk) in keys.chunks(KEYS_PER_ROW).enumerate() {
        let cells: Vec<String> = chunk
            .iter()
            .map(|k| format!("{:<16}", k.to_string()))
            .collect();
        println!("  {:>2}: {}", row * KEYS_PER_ROW, cells.join("").trim_end());
    }
    println!();
}
