//! DataHand Layers - layer controller simulator and keymap tool
//!
//! Drives the DataHand layer controller from event scripts, projects host
//! lock-LED masks, and inspects or validates keymap files.
//!
//! # Usage
//!
//! ```bash
//! # Hold NAS, tap numlock, release NAS
//! datahand-layers simulate --events "NS+ NLK NS-"
//!
//! # Which lock LEDs does the host mask 0b011 light?
//! datahand-layers leds --mask 0b011
//!
//! # Print the NAS layer of the built-in keymap
//! datahand-layers keymap show --layer NAS
//! ```

use clap::{Parser, Subcommand};
use datahand_layers::cli::{CliError, ConfigArgs, KeymapArgs, LedsArgs, SimulateArgs};
use datahand_layers::config::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// DataHand Layers - layer controller simulator and keymap tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run key events through the layer controller
    Simulate(SimulateArgs),
    /// Project a host lock-LED mask onto the lock indicators
    Leds(LedsArgs),
    /// Inspect or validate keymaps
    Keymap(KeymapArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

/// Installs the stderr subscriber. `RUST_LOG` overrides `level`.
fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();

    // Install before loading the config when the level is already known.
    let early = cli.verbose || std::env::var_os("RUST_LOG").is_some();
    if early {
        init_tracing("debug");
    }

    let loaded = Config::load(cli.config.as_deref());
    if !early {
        let level = loaded
            .as_ref()
            .map_or_else(|_| "info".to_string(), |config| config.logging.level.clone());
        init_tracing(&level);
    }

    let result = match (&cli.command, &loaded) {
        (Commands::Config(args), _) => args.execute(cli.config.as_deref()),
        (_, Err(e)) => Err(CliError::validation(format!(
            "Failed to load configuration: {e:#}"
        ))),
        (Commands::Simulate(args), Ok(config)) => args.execute(config),
        (Commands::Leds(args), Ok(config)) => args.execute(config),
        (Commands::Keymap(args), Ok(config)) => args.execute(config),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err.message);
        std::process::exit(err.exit_code());
    }
}
