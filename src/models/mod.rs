//! Data models for layers, keycodes, and status indicators.
//!
//! These types are shared by the controller, the host abstraction, the
//! keymap table, and the simulator. They carry no behavior beyond parsing
//! and small lookups.

pub mod indicator;
pub mod keycode;
pub mod layer;

pub use indicator::{LockLed, LockMask, ModeLed};
pub use keycode::{CustomKeycode, KeyEdge, KeyEvent, Keycode, LayerAction};
pub use layer::{LayerId, LayerState};
