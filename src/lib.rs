//! DataHand Layers Library
//!
//! This library provides the layer controller for a DataHand keyboard
//! (numeric/arrow/symbol layer, keypad overlay, function/mouse layer and
//! the mode and lock indicator LEDs), the keymap tables it is paired with,
//! and an in-process simulated host for driving it from scripts and tests.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod controller;
pub mod host;
pub mod keymap;
pub mod leds;
pub mod models;
pub mod sim;
