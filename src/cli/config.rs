//! Configuration management CLI commands.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::Config;
use crate::constants::{APP_BINARY_NAME, APP_NAME};
use crate::models::ModeLed;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init(ConfigInitArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Write a default configuration file
#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

impl ConfigArgs {
    /// Execute config subcommand against `config_path` (or the default location)
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(config_path),
            ConfigCommand::Path => {
                println!("{}", resolve_path(config_path)?.display());
                Ok(())
            }
            ConfigCommand::Init(args) => args.execute(config_path),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let config = Config::load(config_path)
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if self.json {
            print_json(&config)?;
        } else {
            output_human_readable(&config);
        }

        Ok(())
    }
}

impl ConfigInitArgs {
    /// Execute init command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let path = resolve_path(config_path)?;

        if path.exists() && !self.force {
            return Err(CliError::validation(format!(
                "Configuration file already exists: {} (use --force to overwrite)",
                path.display()
            )));
        }

        Config::new()
            .save_to(&path)
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Wrote default configuration to {}", path.display());
        println!("Run '{APP_BINARY_NAME} config show' to review it.");
        Ok(())
    }
}

fn resolve_path(config_path: Option<&Path>) -> CliResult<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_file_path()
            .map_err(|e| CliError::io(format!("Failed to locate configuration: {e}"))),
    }
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) {
    println!("{APP_NAME} Configuration");
    println!("=======================");
    println!();

    println!("Mode LEDs (port bit):");
    for led in ModeLed::ALL {
        let bit = match led {
            ModeLed::Normal => config.leds.mode_normal,
            ModeLed::Tenkey => config.leds.mode_tenkey,
            ModeLed::Fn => config.leds.mode_fn,
            ModeLed::Nas => config.leds.mode_nas,
        };
        println!("  {:<8} {bit}", led.name());
    }
    println!();

    println!("Lock LEDs (port bit):");
    println!("  num_lock    {}", config.leds.lock_num);
    println!("  caps_lock   {}", config.leds.lock_caps);
    println!("  scroll_lock {}", config.leds.lock_scroll);
    println!();

    println!("Keymap:");
    match &config.keymap.path {
        Some(path) => println!("  File: {}", path.display()),
        None => println!("  File: (built-in datahand-dvorak)"),
    }
    println!();

    println!("Logging:");
    println!("  Level: {}", config.logging.level);
}
