//! Active-low indicator output ports.
//!
//! Each group of indicators sits on one 8-bit output register. A cleared bit
//! lights its LED, a set bit turns it off. Pin assignments come from
//! the `[leds]` section of [`crate::config::Config`].

use crate::models::{LockLed, ModeLed};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Bit assignments for the mode and lock indicator ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedPins {
    /// Mode port bit for the NORMAL indicator
    pub mode_normal: u8,
    /// Mode port bit for the TENKEY indicator
    pub mode_tenkey: u8,
    /// Mode port bit for the FN indicator
    pub mode_fn: u8,
    /// Mode port bit for the NAS indicator
    pub mode_nas: u8,
    /// Lock port bit for num lock
    pub lock_num: u8,
    /// Lock port bit for caps lock
    pub lock_caps: u8,
    /// Lock port bit for scroll lock
    pub lock_scroll: u8,
}

impl Default for LedPins {
    fn default() -> Self {
        Self {
            mode_fn: 4,
            mode_normal: 5,
            mode_nas: 6,
            mode_tenkey: 7,
            lock_num: 5,
            lock_caps: 6,
            lock_scroll: 7,
        }
    }
}

impl LedPins {
    /// Port mask for a mode indicator.
    #[must_use]
    pub fn mode_mask(&self, led: ModeLed) -> u8 {
        let bit = match led {
            ModeLed::Normal => self.mode_normal,
            ModeLed::Tenkey => self.mode_tenkey,
            ModeLed::Fn => self.mode_fn,
            ModeLed::Nas => self.mode_nas,
        };
        1u8.checked_shl(u32::from(bit)).unwrap_or(0)
    }

    /// Port mask covering every mode indicator.
    #[must_use]
    pub fn all_mode_mask(&self) -> u8 {
        ModeLed::ALL
            .iter()
            .fold(0, |mask, &led| mask | self.mode_mask(led))
    }

    /// Port mask for a lock indicator.
    #[must_use]
    pub fn lock_mask(&self, led: LockLed) -> u8 {
        let bit = match led {
            LockLed::NumLock => self.lock_num,
            LockLed::CapsLock => self.lock_caps,
            LockLed::ScrollLock => self.lock_scroll,
        };
        1u8.checked_shl(u32::from(bit)).unwrap_or(0)
    }

    /// Validates pin assignments.
    ///
    /// Checks:
    /// - every bit index is 0-7
    /// - mode indicators use distinct bits
    /// - lock indicators use distinct bits
    pub fn validate(&self) -> Result<()> {
        let mode = [
            ("mode_normal", self.mode_normal),
            ("mode_tenkey", self.mode_tenkey),
            ("mode_fn", self.mode_fn),
            ("mode_nas", self.mode_nas),
        ];
        let lock = [
            ("lock_num", self.lock_num),
            ("lock_caps", self.lock_caps),
            ("lock_scroll", self.lock_scroll),
        ];

        for (group, pins) in [("mode", &mode[..]), ("lock", &lock[..])] {
            let mut seen = HashSet::new();
            for (name, bit) in pins {
                if *bit > 7 {
                    anyhow::bail!("LED pin {} = {} is out of range (0-7)", name, bit);
                }
                if !seen.insert(*bit) {
                    anyhow::bail!(
                        "LED pin {} = {} is already used by another {} indicator",
                        name,
                        bit,
                        group
                    );
                }
            }
        }

        Ok(())
    }
}

/// An 8-bit active-low output register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorPort {
    value: u8,
}

impl Default for IndicatorPort {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorPort {
    /// Creates a port with every output driven high (all LEDs off).
    #[must_use]
    pub const fn new() -> Self {
        Self { value: 0xFF }
    }

    /// Raw register value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.value
    }

    /// Turns the LEDs under `mask` on (drives the bits low).
    pub fn light(&mut self, mask: u8) {
        self.value &= !mask;
    }

    /// Turns the LEDs under `mask` off (drives the bits high).
    pub fn darken(&mut self, mask: u8) {
        self.value |= mask;
    }

    /// Lights or darkens the LEDs under `mask`.
    pub fn set(&mut self, mask: u8, on: bool) {
        if on {
            self.light(mask);
        } else {
            self.darken(mask);
        }
    }

    /// Whether every LED under `mask` is lit. An empty mask is never lit.
    #[must_use]
    pub const fn is_lit(self, mask: u8) -> bool {
        mask != 0 && self.value & mask == 0
    }

    /// Drives all mode indicators off, then lights exactly `lit`.
    pub fn write_exclusive(&mut self, pins: &LedPins, lit: ModeLed) {
        self.darken(pins.all_mode_mask());
        self.light(pins.mode_mask(lit));
    }

    /// Mode indicators currently lit.
    #[must_use]
    pub fn lit_modes(self, pins: &LedPins) -> Vec<ModeLed> {
        ModeLed::ALL
            .into_iter()
            .filter(|&led| self.is_lit(pins.mode_mask(led)))
            .collect()
    }

    /// Lock indicators currently lit.
    #[must_use]
    pub fn lit_locks(self, pins: &LedPins) -> Vec<LockLed> {
        LockLed::ALL
            .into_iter()
            .filter(|&led| self.is_lit(pins.lock_mask(led)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pins_are_valid() {
        assert!(LedPins::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_mode_bits() {
        let pins = LedPins {
            mode_nas: 5,
            ..LedPins::default()
        };
        let err = pins.validate().unwrap_err().to_string();
        assert!(err.contains("mode_nas"));
    }

    #[test]
    fn test_validate_allows_overlap_across_ports() {
        // Mode and lock indicators live on separate registers.
        let pins = LedPins {
            mode_normal: 0,
            lock_num: 0,
            ..LedPins::default()
        };
        assert!(pins.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_bit() {
        let pins = LedPins {
            lock_scroll: 8,
            ..LedPins::default()
        };
        assert!(pins.validate().is_err());
    }

    #[test]
    fn test_new_port_is_dark() {
        let pins = LedPins::default();
        let port = IndicatorPort::new();
        assert!(port.lit_modes(&pins).is_empty());
        assert!(port.lit_locks(&pins).is_empty());
    }

    #[test]
    fn test_write_exclusive_lights_one() {
        let pins = LedPins::default();
        let mut port = IndicatorPort::new();

        port.write_exclusive(&pins, ModeLed::Nas);
        assert_eq!(port.lit_modes(&pins), vec![ModeLed::Nas]);

        port.write_exclusive(&pins, ModeLed::Fn);
        assert_eq!(port.lit_modes(&pins), vec![ModeLed::Fn]);
    }

    #[test]
    fn test_active_low_register_value() {
        let pins = LedPins::default();
        let mut port = IndicatorPort::new();

        port.set(pins.lock_mask(LockLed::NumLock), true);
        assert_eq!(port.value(), 0xFF & !(1 << 5));

        port.set(pins.lock_mask(LockLed::NumLock), false);
        assert_eq!(port.value(), 0xFF);
    }

    #[test]
    fn test_empty_mask_is_never_lit() {
        let mut port = IndicatorPort::new();
        assert!(!port.is_lit(0));

        port.light(0xFF);
        assert!(!port.is_lit(0));
    }

    #[test]
    fn test_out_of_range_pin_reads_dark() {
        let pins = LedPins {
            mode_nas: 9,
            ..LedPins::default()
        };
        let mut port = IndicatorPort::new();
        port.write_exclusive(&pins, ModeLed::Normal);
        assert_eq!(port.lit_modes(&pins), vec![ModeLed::Normal]);
    }
}
