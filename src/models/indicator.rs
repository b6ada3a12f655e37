//! Status indicator identifiers and the host's lock-LED mask.

use crate::models::LayerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mode indicators. Exactly one is lit after a layer change settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeLed {
    /// Base layer visible
    Normal,
    /// GAME layer visible
    Tenkey,
    /// FUNCTION_MOUSE layer visible
    Fn,
    /// NAS or NAS_NUMLOCK visible
    Nas,
}

impl ModeLed {
    /// All mode indicators.
    pub const ALL: [Self; 4] = [Self::Normal, Self::Tenkey, Self::Fn, Self::Nas];

    /// Indicator for the highest active layer.
    #[must_use]
    pub const fn for_layer(layer: LayerId) -> Self {
        match layer {
            LayerId::Normal => Self::Normal,
            LayerId::Game => Self::Tenkey,
            LayerId::FunctionMouse => Self::Fn,
            LayerId::Nas | LayerId::NasNumlock => Self::Nas,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Tenkey => "tenkey",
            Self::Fn => "fn",
            Self::Nas => "nas",
        }
    }
}

impl fmt::Display for ModeLed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lock indicators, driven independently of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockLed {
    /// Num lock
    NumLock,
    /// Caps lock
    CapsLock,
    /// Scroll lock
    ScrollLock,
}

impl LockLed {
    /// All lock indicators, in host mask bit order.
    pub const ALL: [Self; 3] = [Self::NumLock, Self::CapsLock, Self::ScrollLock];

    /// Bit position in the host lock mask.
    #[must_use]
    pub const fn mask_bit(self) -> u8 {
        match self {
            Self::NumLock => 0,
            Self::CapsLock => 1,
            Self::ScrollLock => 2,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NumLock => "num_lock",
            Self::CapsLock => "caps_lock",
            Self::ScrollLock => "scroll_lock",
        }
    }
}

impl fmt::Display for LockLed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lock-LED state reported by the host (USB HID keyboard LED byte).
///
/// Bit 0 is num lock, bit 1 caps lock, bit 2 scroll lock. Higher bits
/// (compose, kana) are carried but not projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LockMask(pub u8);

impl LockMask {
    /// Whether the given lock is reported on.
    #[must_use]
    pub const fn is_set(self, led: LockLed) -> bool {
        self.0 & (1u8 << led.mask_bit()) != 0
    }

    /// Parses a mask written in decimal, `0x` hex or `0b` binary.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u8::from_str_radix(hex, 16)
        } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
            u8::from_str_radix(bin, 2)
        } else {
            s.parse::<u8>()
        };

        parsed
            .map(Self)
            .map_err(|e| anyhow::anyhow!("Invalid lock mask '{}': {}", s, e))
    }
}
