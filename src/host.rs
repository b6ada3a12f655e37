//! Primitives the host firmware provides to the layer controller.
//!
//! Matrix scanning, USB transport and the real output registers live on the
//! host side. The controller only sees this trait, which keeps it testable
//! against [`crate::sim::SimulatedHost`].

use crate::models::{KeyEdge, LayerId, LayerState, LockLed, ModeLed};

/// Host firmware services consumed by [`crate::controller::LayerController`].
///
/// Calls are serialized: the host never invokes the controller while one of
/// these methods is running.
pub trait Host {
    /// Activates a layer. Activating an active layer is a no-op.
    fn layer_on(&mut self, layer: LayerId);

    /// Deactivates a layer. Deactivating an inactive layer is a no-op.
    fn layer_off(&mut self, layer: LayerId);

    /// Current active-layer set.
    fn layer_state(&self) -> LayerState;

    /// Whether a layer is active.
    fn layer_is_on(&self, layer: LayerId) -> bool {
        self.layer_state().contains(layer)
    }

    /// Sets a layer on or off.
    fn layer_set(&mut self, layer: LayerId, on: bool) {
        if on {
            self.layer_on(layer);
        } else {
            self.layer_off(layer);
        }
    }

    /// Emits a synthetic numlock key transition to the connected system.
    fn send_numlock(&mut self, edge: KeyEdge);

    /// Drives every mode indicator off, then lights `lit`.
    fn write_mode_leds(&mut self, lit: ModeLed);

    /// Drives one lock indicator.
    fn write_lock_led(&mut self, led: LockLed, on: bool);
}
