//! Keycodes and key events delivered by the host.
//!
//! Keycodes stay opaque apart from the handful of forms the layer logic has
//! to recognise: the controller's custom keycodes, transparent and no-op
//! markers, and the host's own layer actions (`TG`, `MO`, `TO`).

use crate::models::LayerId;
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Keycodes owned by the layer controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CustomKeycode {
    /// Normal: return to the base layer and clear the NAS lock
    N,
    /// NAS: hold for numbers and symbols
    Ns,
    /// NAS lock: latch NAS on or off
    Nsl,
    /// Numlock: toggle the keypad overlay and forward numlock to the host
    Nlk,
    /// Function/mouse mode
    Fn,
    /// Ten-key off button (reserved, inert)
    Tk0,
    /// Ten-key on button (reserved, inert)
    Tk1,
}

impl CustomKeycode {
    /// All custom keycodes.
    pub const ALL: [Self; 7] = [
        Self::N,
        Self::Ns,
        Self::Nsl,
        Self::Nlk,
        Self::Fn,
        Self::Tk0,
        Self::Tk1,
    ];

    /// Keymap spelling of the keycode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::Ns => "NS",
            Self::Nsl => "NSL",
            Self::Nlk => "NLK",
            Self::Fn => "FN",
            Self::Tk0 => "TK0",
            Self::Tk1 => "TK1",
        }
    }

    /// Looks up a custom keycode by its exact keymap spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.name() == name)
    }
}

impl fmt::Display for CustomKeycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host layer actions that can appear in a keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerAction {
    /// `TG(x)`: toggle the layer on press
    Toggle(LayerId),
    /// `MO(x)`: layer on while held
    Momentary(LayerId),
    /// `TO(x)`: switch to the layer, turning the others off
    To(LayerId),
}

impl LayerAction {
    /// Target layer of the action.
    #[must_use]
    pub const fn layer(self) -> LayerId {
        match self {
            Self::Toggle(layer) | Self::Momentary(layer) | Self::To(layer) => layer,
        }
    }
}

impl fmt::Display for LayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle(layer) => write!(f, "TG({})", layer),
            Self::Momentary(layer) => write!(f, "MO({})", layer),
            Self::To(layer) => write!(f, "TO({})", layer),
        }
    }
}

/// A keycode as it appears in a keymap or an event script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Keycode {
    /// One of the controller's keycodes
    Custom(CustomKeycode),
    /// A host layer action
    Layer(LayerAction),
    /// Falls through to the next active layer (`_______`, `KC_TRNS`)
    Transparent,
    /// Does nothing (`XXXXXXX`, `KC_NO`)
    NoOp,
    /// Any other keycode, passed to the host untouched
    Basic(String),
}

fn layer_action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(TG|MO|TO)\(\s*([A-Za-z_]+|\d+)\s*\)$").expect("valid layer action regex")
    })
}

fn basic_keycode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").expect("valid keycode regex"))
}

impl Keycode {
    /// Parses a keycode string.
    ///
    /// # Examples
    ///
    /// ```
    /// use datahand_layers::models::{CustomKeycode, Keycode, LayerAction, LayerId};
    ///
    /// assert_eq!(Keycode::parse("NSL").unwrap(), Keycode::Custom(CustomKeycode::Nsl));
    /// assert_eq!(Keycode::parse("_______").unwrap(), Keycode::Transparent);
    /// assert_eq!(
    ///     Keycode::parse("TG(GAME)").unwrap(),
    ///     Keycode::Layer(LayerAction::Toggle(LayerId::Game))
    /// );
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(custom) = CustomKeycode::from_name(s) {
            return Ok(Self::Custom(custom));
        }

        match s {
            "_______" | "KC_TRNS" | "KC_TRANSPARENT" => return Ok(Self::Transparent),
            "XXXXXXX" | "KC_NO" => return Ok(Self::NoOp),
            _ => {}
        }

        if let Some(caps) = layer_action_regex().captures(s) {
            let layer: LayerId = caps[2]
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid layer action '{}': {}", s, e))?;
            let action = match &caps[1] {
                "TG" => LayerAction::Toggle(layer),
                "MO" => LayerAction::Momentary(layer),
                _ => LayerAction::To(layer),
            };
            return Ok(Self::Layer(action));
        }

        if basic_keycode_regex().is_match(s) {
            return Ok(Self::Basic(s.to_string()));
        }

        anyhow::bail!("Invalid keycode '{}'", s)
    }

    /// Returns the custom keycode, if this is one.
    #[must_use]
    pub const fn as_custom(&self) -> Option<CustomKeycode> {
        match self {
            Self::Custom(code) => Some(*code),
            _ => None,
        }
    }

    /// Checks if this key passes through to the layer below.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        matches!(self, Self::Transparent)
    }
}

impl FromStr for Keycode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(code) => write!(f, "{}", code),
            Self::Layer(action) => write!(f, "{}", action),
            Self::Transparent => f.write_str("_______"),
            Self::NoOp => f.write_str("XXXXXXX"),
            Self::Basic(code) => f.write_str(code),
        }
    }
}

impl Serialize for Keycode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Keycode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Press or release edge of a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEdge {
    /// Key went down
    Press,
    /// Key went up
    Release,
}

impl KeyEdge {
    /// Whether this is the press edge.
    #[must_use]
    pub const fn is_press(self) -> bool {
        matches!(self, Self::Press)
    }
}

/// A single key transition delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Keycode resolved for the transition
    pub keycode: Keycode,
    /// Press or release
    pub edge: KeyEdge,
}

impl KeyEvent {
    /// Creates a press event.
    pub fn press(keycode: impl Into<Keycode>) -> Self {
        Self {
            keycode: keycode.into(),
            edge: KeyEdge::Press,
        }
    }

    /// Creates a release event.
    pub fn release(keycode: impl Into<Keycode>) -> Self {
        Self {
            keycode: keycode.into(),
            edge: KeyEdge::Release,
        }
    }

    /// Whether this is a press.
    #[must_use]
    pub const fn pressed(&self) -> bool {
        self.edge.is_press()
    }
}

impl From<CustomKeycode> for Keycode {
    fn from(code: CustomKeycode) -> Self {
        Self::Custom(code)
    }
}

impl From<LayerAction> for Keycode {
    fn from(action: LayerAction) -> Self {
        Self::Layer(action)
    }
}
