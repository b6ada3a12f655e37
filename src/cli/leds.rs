//! LED projection command: show which lock indicators a host mask lights.

use crate::cli::common::{join_or_none, print_json, CliError, CliResult};
use crate::config::Config;
use crate::keymap::Keymap;
use crate::models::{LockLed, LockMask};
use crate::sim::Keyboard;
use clap::Args;
use serde::Serialize;

/// Project a host lock-LED mask onto the lock indicators
#[derive(Debug, Clone, Args)]
pub struct LedsArgs {
    /// Host LED mask (decimal, 0x hex or 0b binary; bit 0 num, 1 caps, 2 scroll)
    #[arg(short, long, value_name = "MASK")]
    pub mask: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct LedsOutput {
    mask: u8,
    lit: Vec<LockLed>,
    port: u8,
}

impl LedsArgs {
    /// Execute the leds command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let mask = LockMask::parse(&self.mask).map_err(|e| CliError::validation(e.to_string()))?;

        let mut keyboard = Keyboard::new(Keymap::default(), config.leds)
            .map_err(|e| CliError::validation(format!("Invalid LED pins: {e}")))?;
        keyboard.set_lock_mask(mask);

        let host = keyboard.host();
        let output = LedsOutput {
            mask: mask.0,
            lit: host.lit_lock_leds(),
            port: host.lock_port().value(),
        };

        if self.json {
            print_json(&output)?;
        } else {
            println!("Mask:      {:#010b}", output.mask);
            for led in LockLed::ALL {
                println!(
                    "  {:<12} {}",
                    led.name(),
                    if host.lock_led_lit(led) { "lit" } else { "dark" }
                );
            }
            println!("Lit:       {}", join_or_none(&output.lit));
            println!("Port:      {:#010b}", output.port);
        }

        Ok(())
    }
}
