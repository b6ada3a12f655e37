//! Layer controller: momentary, toggle and lock modifiers over five layers.
//!
//! The controller owns the two mode flags and the injected keymap. The host
//! calls three entry points, always serialized:
//!
//! - [`LayerController::process_record`] for every key transition
//! - [`LayerController::layer_state_set`] whenever the active-layer set changes
//! - [`LayerController::led_set`] whenever the host's lock-LED mask changes
//!
//! None of them can fail.

use crate::host::Host;
use crate::keymap::Keymap;
use crate::models::{
    CustomKeycode, KeyEdge, KeyEvent, LayerId, LayerState, LockLed, LockMask, ModeLed,
};
use serde::Serialize;
use tracing::debug;

/// Position of the numlock key forwarded to the connected system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumlockKey {
    /// Not held
    #[default]
    Up,
    /// Key-down sent, key-up pending
    Down,
}

/// Snapshot of the controller's mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControllerState {
    /// Keypad overlay enabled for NAS
    pub numlock_enabled: bool,
    /// NAS latched on by NSL
    pub nas_locked: bool,
    /// Forwarded numlock key position
    pub numlock_key: NumlockKey,
}

/// Layer-switching state machine for a DataHand-style keyboard.
#[derive(Debug, Clone)]
pub struct LayerController {
    keymap: Keymap,
    numlock_enabled: bool,
    nas_locked: bool,
    numlock_key: NumlockKey,
}

impl LayerController {
    /// Creates a controller with both flags cleared.
    #[must_use]
    pub fn new(keymap: Keymap) -> Self {
        Self {
            keymap,
            numlock_enabled: false,
            nas_locked: false,
            numlock_key: NumlockKey::Up,
        }
    }

    /// Layout table this controller was built with.
    #[must_use]
    pub const fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Whether the keypad overlay is enabled.
    #[must_use]
    pub const fn numlock_enabled(&self) -> bool {
        self.numlock_enabled
    }

    /// Whether NAS is latched on.
    #[must_use]
    pub const fn nas_locked(&self) -> bool {
        self.nas_locked
    }

    /// Forwarded numlock key position.
    #[must_use]
    pub const fn numlock_key(&self) -> NumlockKey {
        self.numlock_key
    }

    /// Current flags.
    #[must_use]
    pub const fn state(&self) -> ControllerState {
        ControllerState {
            numlock_enabled: self.numlock_enabled,
            nas_locked: self.nas_locked,
            numlock_key: self.numlock_key,
        }
    }

    /// Handles one key transition.
    ///
    /// Only the controller's custom keycodes are acted on; everything else is
    /// left to the host. Always returns `true` so the host continues its own
    /// processing for the event.
    pub fn process_record<H: Host + ?Sized>(&mut self, host: &mut H, event: &KeyEvent) -> bool {
        let Some(code) = event.keycode.as_custom() else {
            return true;
        };
        let pressed = event.pressed();

        match code {
            CustomKeycode::N => {
                if pressed {
                    self.set_normal(host);
                }
            }
            CustomKeycode::Ns => {
                if self.nas_locked {
                    debug!(pressed, "NS ignored while NAS is locked");
                } else {
                    self.set_nas(host, pressed);
                }
            }
            CustomKeycode::Nsl => {
                if pressed {
                    self.nas_locked = !self.nas_locked;
                    debug!(nas_locked = self.nas_locked, "NAS lock toggled");
                    self.set_nas(host, true);
                }
            }
            CustomKeycode::Nlk => self.numlock_key_event(host, event.edge),
            CustomKeycode::Fn => {
                if pressed {
                    self.set_function(host);
                }
            }
            CustomKeycode::Tk0 | CustomKeycode::Tk1 => {}
        }

        true
    }

    /// Layer-change notification: lights the mode indicator for the highest
    /// active layer and returns `state` unchanged.
    ///
    /// When the highest active index is not one of the five named layers the
    /// mode indicators are not written and keep their previous value.
    pub fn layer_state_set<H: Host + ?Sized>(&self, host: &mut H, state: LayerState) -> LayerState {
        match state.highest() {
            Some(layer) => {
                let led = ModeLed::for_layer(layer);
                debug!(%layer, %led, "mode indicator");
                host.write_mode_leds(led);
            }
            None => {
                debug!(
                    index = state.highest_index(),
                    "highest layer has no mode indicator, leaving LEDs unchanged"
                );
            }
        }
        state
    }

    /// Lock-LED projection: each lock bit drives its indicator independently.
    pub fn led_set<H: Host + ?Sized>(&self, host: &mut H, mask: LockMask) {
        for led in LockLed::ALL {
            host.write_lock_led(led, mask.is_set(led));
        }
    }

    /// Turns the NAS pair on or off. Turning NAS off also clears the lock.
    fn set_nas<H: Host + ?Sized>(&mut self, host: &mut H, on: bool) {
        if !on {
            self.nas_locked = false;
        }
        self.apply_nas_layers(host, on);
    }

    /// Drives NAS and its numlock overlay without touching the lock.
    fn apply_nas_layers<H: Host + ?Sized>(&self, host: &mut H, on: bool) {
        // Base NAS stays on under the overlay so its keys fall through.
        host.layer_set(LayerId::Nas, on);
        host.layer_set(LayerId::NasNumlock, on && self.numlock_enabled);
        debug!(
            on,
            numlock = on && self.numlock_enabled,
            "NAS layers updated"
        );
    }

    fn set_normal<H: Host + ?Sized>(&mut self, host: &mut H) {
        host.layer_off(LayerId::FunctionMouse);
        self.set_nas(host, false);
    }

    fn set_function<H: Host + ?Sized>(&mut self, host: &mut H) {
        // Leaves nas_locked alone: NS stays inert until N or NSL releases it.
        self.apply_nas_layers(host, false);
        host.layer_on(LayerId::FunctionMouse);
    }

    fn toggle_numlock<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.numlock_enabled = !self.numlock_enabled;
        debug!(numlock_enabled = self.numlock_enabled, "numlock toggled");
        host.write_lock_led(LockLed::NumLock, self.numlock_enabled);

        if host.layer_is_on(LayerId::Nas) {
            self.apply_nas_layers(host, true);
        }
    }

    /// Numlock key sub-state: press enters `Down` and forwards key-down,
    /// release enters `Up` and forwards key-up.
    fn numlock_key_event<H: Host + ?Sized>(&mut self, host: &mut H, edge: KeyEdge) {
        match edge {
            KeyEdge::Press => {
                self.toggle_numlock(host);
                self.numlock_key = NumlockKey::Down;
            }
            KeyEdge::Release => {
                self.numlock_key = NumlockKey::Up;
            }
        }
        host.send_numlock(edge);
    }
}
