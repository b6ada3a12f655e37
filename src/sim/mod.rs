//! In-process host firmware for driving the layer controller.
//!
//! [`SimulatedHost`] implements [`Host`] with a layer set, two active-low
//! indicator ports and an output log. [`Keyboard`] plays the role of the
//! host's scan loop: it delivers one event at a time to the controller, runs
//! the host's default processing when asked to, then reports every queued
//! layer change back through the notification callback.

pub mod script;

use crate::controller::{LayerController, NumlockKey};
use crate::host::Host;
use crate::keymap::Keymap;
use crate::leds::{IndicatorPort, LedPins};
use crate::models::{
    KeyEdge, KeyEvent, Keycode, LayerAction, LayerId, LayerState, LockLed, LockMask, ModeLed,
};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace};

pub use script::{parse_script, ScriptStep, StepAction};

/// Something the host sent to the connected system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostOutput {
    /// Basic keycode pressed
    KeyDown {
        /// Keycode name
        keycode: String,
    },
    /// Basic keycode released
    KeyUp {
        /// Keycode name
        keycode: String,
    },
    /// Synthetic numlock transition forwarded by the controller
    Numlock {
        /// Press or release
        edge: KeyEdge,
    },
}

impl std::fmt::Display for HostOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyDown { keycode } => write!(f, "{keycode} down"),
            Self::KeyUp { keycode } => write!(f, "{keycode} up"),
            Self::Numlock { edge: KeyEdge::Press } => f.write_str("KC_NUM down"),
            Self::Numlock { edge: KeyEdge::Release } => f.write_str("KC_NUM up"),
        }
    }
}

/// Host firmware stand-in.
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    pins: LedPins,
    layers: LayerState,
    mode_port: IndicatorPort,
    lock_port: IndicatorPort,
    output: Vec<HostOutput>,
    pending_changes: Vec<LayerState>,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::with_pins(LedPins::default())
    }
}

impl SimulatedHost {
    /// Creates a host with no active layers and every LED dark.
    ///
    /// Fails if `pins` does not pass [`LedPins::validate`].
    pub fn new(pins: LedPins) -> Result<Self> {
        pins.validate()?;
        Ok(Self::with_pins(pins))
    }

    fn with_pins(pins: LedPins) -> Self {
        Self {
            pins,
            layers: LayerState::new(),
            mode_port: IndicatorPort::new(),
            lock_port: IndicatorPort::new(),
            output: Vec::new(),
            pending_changes: Vec::new(),
        }
    }

    /// Replaces the active-layer set, queueing a notification if it changed.
    pub fn set_layer_state(&mut self, state: LayerState) {
        if state != self.layers {
            trace!(from = self.layers.bits(), to = state.bits(), "layer state change");
            self.layers = state;
            self.pending_changes.push(state);
        }
    }

    /// Takes the layer changes queued since the last call.
    pub fn take_layer_changes(&mut self) -> Vec<LayerState> {
        std::mem::take(&mut self.pending_changes)
    }

    /// Output log since creation.
    #[must_use]
    pub fn output(&self) -> &[HostOutput] {
        &self.output
    }

    /// Pin assignment in use.
    #[must_use]
    pub const fn pins(&self) -> &LedPins {
        &self.pins
    }

    /// Raw mode port register.
    #[must_use]
    pub const fn mode_port(&self) -> IndicatorPort {
        self.mode_port
    }

    /// Raw lock port register.
    #[must_use]
    pub const fn lock_port(&self) -> IndicatorPort {
        self.lock_port
    }

    /// Mode indicators currently lit.
    #[must_use]
    pub fn lit_mode_leds(&self) -> Vec<ModeLed> {
        self.mode_port.lit_modes(&self.pins)
    }

    /// Lock indicators currently lit.
    #[must_use]
    pub fn lit_lock_leds(&self) -> Vec<LockLed> {
        self.lock_port.lit_locks(&self.pins)
    }

    /// Whether one lock indicator is lit.
    #[must_use]
    pub fn lock_led_lit(&self, led: LockLed) -> bool {
        self.lock_port.is_lit(self.pins.lock_mask(led))
    }

    /// The host's own handling of a keycode, run after the controller asks
    /// for default processing.
    ///
    /// Layer actions change the layer set; basic keycodes go to the output
    /// log. Controller keycodes, transparent and no-op keys do nothing here.
    pub fn default_process(&mut self, event: &KeyEvent) {
        let pressed = event.pressed();
        match &event.keycode {
            Keycode::Layer(action) => self.layer_action(*action, pressed),
            Keycode::Basic(code) => {
                let keycode = code.clone();
                self.output.push(if pressed {
                    HostOutput::KeyDown { keycode }
                } else {
                    HostOutput::KeyUp { keycode }
                });
            }
            Keycode::Custom(_) | Keycode::Transparent | Keycode::NoOp => {}
        }
    }

    fn layer_action(&mut self, action: LayerAction, pressed: bool) {
        match action {
            LayerAction::Toggle(layer) => {
                if pressed {
                    let mut state = self.layers;
                    if state.contains(layer) {
                        state.remove(layer);
                    } else {
                        state.insert(layer);
                    }
                    self.set_layer_state(state);
                }
            }
            LayerAction::Momentary(layer) => self.layer_set(layer, pressed),
            LayerAction::To(layer) => {
                if pressed {
                    self.set_layer_state([layer].into_iter().collect());
                }
            }
        }
    }
}

impl Host for SimulatedHost {
    fn layer_on(&mut self, layer: LayerId) {
        let mut state = self.layers;
        state.insert(layer);
        self.set_layer_state(state);
    }

    fn layer_off(&mut self, layer: LayerId) {
        let mut state = self.layers;
        state.remove(layer);
        self.set_layer_state(state);
    }

    fn layer_state(&self) -> LayerState {
        self.layers
    }

    fn send_numlock(&mut self, edge: KeyEdge) {
        self.output.push(HostOutput::Numlock { edge });
    }

    fn write_mode_leds(&mut self, lit: ModeLed) {
        self.mode_port.write_exclusive(&self.pins, lit);
    }

    fn write_lock_led(&mut self, led: LockLed, on: bool) {
        let mask = self.pins.lock_mask(led);
        self.lock_port.set(mask, on);
    }
}

/// Observable keyboard state after a settle point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Highest active layer, if it is a named layer
    pub visible_layer: Option<LayerId>,
    /// Index of the highest active layer
    pub highest_index: u8,
    /// Active named layers, lowest priority first
    pub active_layers: Vec<LayerId>,
    /// Keypad overlay enabled
    pub numlock_enabled: bool,
    /// NAS latched on
    pub nas_locked: bool,
    /// Forwarded numlock key position
    pub numlock_key: NumlockKey,
    /// Mode indicators lit
    pub mode_leds: Vec<ModeLed>,
    /// Lock indicators lit
    pub lock_leds: Vec<LockLed>,
}

/// One script step and what it produced.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    /// Step as written in the script
    pub step: String,
    /// Host output emitted by this step
    pub emitted: Vec<HostOutput>,
    /// State once the step settled
    pub state: Snapshot,
}

/// Serialized scan loop around a controller and a simulated host.
#[derive(Debug, Clone)]
pub struct Keyboard {
    controller: LayerController,
    host: SimulatedHost,
    /// Keycode resolved when each held position went down.
    held: HashMap<usize, Keycode>,
}

impl Keyboard {
    /// Boots a keyboard: the host reports the initial (empty) layer state so
    /// the NORMAL indicator comes up lit.
    ///
    /// Fails if `pins` does not pass [`LedPins::validate`].
    pub fn new(keymap: Keymap, pins: LedPins) -> Result<Self> {
        Ok(Self::boot(keymap, SimulatedHost::new(pins)?))
    }

    fn boot(keymap: Keymap, mut host: SimulatedHost) -> Self {
        let controller = LayerController::new(keymap);
        let initial = host.layer_state();
        controller.layer_state_set(&mut host, initial);

        Self {
            controller,
            host,
            held: HashMap::new(),
        }
    }

    /// The controller.
    #[must_use]
    pub const fn controller(&self) -> &LayerController {
        &self.controller
    }

    /// The simulated host.
    #[must_use]
    pub const fn host(&self) -> &SimulatedHost {
        &self.host
    }

    /// Delivers one key event and settles. Returns the controller's
    /// continue-processing answer.
    pub fn key_event(&mut self, event: &KeyEvent) -> bool {
        debug!(keycode = %event.keycode, edge = ?event.edge, "key event");
        let proceed = self.controller.process_record(&mut self.host, event);
        if proceed {
            self.host.default_process(event);
        }
        self.settle();
        proceed
    }

    /// Presses the key at a physical position.
    pub fn press_position(&mut self, index: usize) -> Result<()> {
        let keycode = self.resolve_position(index)?;
        self.held.insert(index, keycode.clone());
        self.key_event(&KeyEvent::press(keycode));
        Ok(())
    }

    /// Releases the key at a physical position, using the keycode it was
    /// pressed with.
    pub fn release_position(&mut self, index: usize) -> Result<()> {
        let keycode = match self.held.remove(&index) {
            Some(keycode) => keycode,
            None => self.resolve_position(index)?,
        };
        self.key_event(&KeyEvent::release(keycode));
        Ok(())
    }

    /// Host lock-mask report.
    pub fn set_lock_mask(&mut self, mask: LockMask) {
        debug!(mask = mask.0, "lock mask");
        self.controller.led_set(&mut self.host, mask);
    }

    /// Applies one script step.
    pub fn apply(&mut self, step: &ScriptStep) -> Result<()> {
        match step {
            ScriptStep::Key { keycode, action } => {
                for edge in action.edges() {
                    self.key_event(&KeyEvent {
                        keycode: keycode.clone(),
                        edge,
                    });
                }
            }
            ScriptStep::Position { index, action } => {
                for edge in action.edges() {
                    match edge {
                        KeyEdge::Press => self.press_position(*index)?,
                        KeyEdge::Release => self.release_position(*index)?,
                    }
                }
            }
            ScriptStep::LockMask(mask) => self.set_lock_mask(*mask),
        }
        Ok(())
    }

    /// Runs a script, recording each step.
    pub fn run(&mut self, steps: &[ScriptStep]) -> Result<Vec<TraceEntry>> {
        let mut trace = Vec::with_capacity(steps.len());
        for step in steps {
            let before = self.host.output().len();
            self.apply(step)?;
            trace.push(TraceEntry {
                step: step.to_string(),
                emitted: self.host.output()[before..].to_vec(),
                state: self.snapshot(),
            });
        }
        Ok(trace)
    }

    /// Current observable state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let layers = self.host.layer_state();
        let flags = self.controller.state();
        Snapshot {
            visible_layer: layers.highest(),
            highest_index: layers.highest_index(),
            active_layers: layers.active_layers().collect(),
            numlock_enabled: flags.numlock_enabled,
            nas_locked: flags.nas_locked,
            numlock_key: flags.numlock_key,
            mode_leds: self.host.lit_mode_leds(),
            lock_leds: self.host.lit_lock_leds(),
        }
    }

    fn resolve_position(&self, index: usize) -> Result<Keycode> {
        let keymap = self.controller.keymap();
        keymap
            .resolve(self.host.layer_state(), index)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Key position {} is out of range (keymap '{}' has {} keys)",
                    index,
                    keymap.name(),
                    keymap.key_count()
                )
            })
    }

    /// Reports every queued layer change to the controller, in order.
    fn settle(&mut self) {
        for state in self.host.take_layer_changes() {
            self.controller.layer_state_set(&mut self.host, state);
        }
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::boot(Keymap::default(), SimulatedHost::default())
    }
}
