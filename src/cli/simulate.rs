//! Simulate command: run an event script through the layer controller.

use crate::cli::common::{join_or_none, load_keymap, print_json, CliError, CliResult};
use crate::config::Config;
use crate::sim::{parse_script, HostOutput, Keyboard, Snapshot, TraceEntry};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Run key events through the controller and report the resulting state
#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// Inline event script (e.g. "NS+ NLK NS-")
    #[arg(
        short,
        long,
        value_name = "STEPS",
        conflicts_with = "script",
        required_unless_present = "script"
    )]
    pub events: Option<String>,

    /// Event script file
    #[arg(short, long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// JSON5 keymap file (overrides the configured keymap)
    #[arg(short, long, value_name = "FILE")]
    pub keymap: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Report the state after every step
    #[arg(long)]
    pub trace: bool,
}

/// JSON output for the simulate command
#[derive(Debug, Serialize)]
struct SimulateOutput<'a> {
    keymap: &'a str,
    steps: usize,
    state: &'a Snapshot,
    output: &'a [HostOutput],
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a [TraceEntry]>,
}

impl SimulateArgs {
    /// Execute the simulate command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let content = match (&self.events, &self.script) {
            (Some(events), _) => events.clone(),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                CliError::io(format!(
                    "Failed to read script file {}: {e}",
                    path.display()
                ))
            })?,
            (None, None) => {
                return Err(CliError::validation(
                    "Either --events or --script must be given",
                ))
            }
        };

        let steps = parse_script(&content)
            .map_err(|e| CliError::validation(format!("Invalid event script: {e:#}")))?;

        let keymap = load_keymap(self.keymap.as_deref(), config)?;

        let mut keyboard = Keyboard::new(keymap, config.leds)
            .map_err(|e| CliError::validation(format!("Invalid LED pins: {e}")))?;
        let trace = keyboard
            .run(&steps)
            .map_err(|e| CliError::validation(format!("Simulation failed: {e:#}")))?;
        let state = keyboard.snapshot();

        if self.json {
            print_json(&SimulateOutput {
                keymap: keyboard.controller().keymap().name(),
                steps: steps.len(),
                state: &state,
                output: keyboard.host().output(),
                trace: self.trace.then_some(trace.as_slice()),
            })?;
        } else {
            if self.trace {
                for (number, entry) in trace.iter().enumerate() {
                    println!(
                        "{:>3}. {:<12} {}{}",
                        number + 1,
                        entry.step,
                        describe_layer(&entry.state),
                        describe_emitted(&entry.emitted)
                    );
                }
                println!();
            }
            print_state(keyboard.controller().keymap().name(), steps.len(), &state);
            println!("Output:    {}", join_or_none(keyboard.host().output()));
        }

        Ok(())
    }
}

fn describe_layer(state: &Snapshot) -> String {
    let layer = state
        .visible_layer
        .map_or_else(|| format!("layer {}", state.highest_index), |l| l.to_string());
    format!("{layer} [{}]", join_or_none(&state.mode_leds))
}

fn describe_emitted(emitted: &[HostOutput]) -> String {
    if emitted.is_empty() {
        String::new()
    } else {
        format!("  -> {}", join_or_none(emitted))
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn print_state(keymap: &str, steps: usize, state: &Snapshot) {
    println!("Keymap:    {keymap}");
    println!("Steps:     {steps}");
    println!();
    println!("Layer:     {}", describe_layer(state));
    println!("Active:    {}", join_or_none(&state.active_layers));
    println!("Numlock:   {}", on_off(state.numlock_enabled));
    println!("NAS lock:  {}", on_off(state.nas_locked));
    println!("Lock LEDs: {}", join_or_none(&state.lock_leds));
}
