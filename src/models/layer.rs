//! Layer identifiers and the host's active-layer set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five key-mapping layers, in priority order.
///
/// The discriminant is the layer index the host uses; a higher index wins
/// when several layers are active at once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerId {
    /// Base typing layer (the default layer)
    Normal = 0,
    /// Ten-key / gaming layer, reached through `TG(GAME)`
    Game = 1,
    /// Function keys, navigation and mouse
    FunctionMouse = 2,
    /// Numbers and symbols
    Nas = 3,
    /// Keypad overlay on top of NAS while numlock is enabled
    NasNumlock = 4,
}

impl LayerId {
    /// All layers, lowest priority first.
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Game,
        Self::FunctionMouse,
        Self::Nas,
        Self::NasNumlock,
    ];

    /// Number of named layers.
    pub const COUNT: usize = Self::ALL.len();

    /// Host layer index for this layer.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Looks up a layer by host index.
    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Name as written in keymaps (`NORMAL`, `FUNCTION_MOUSE`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Game => "GAME",
            Self::FunctionMouse => "FUNCTION_MOUSE",
            Self::Nas => "NAS",
            Self::NasNumlock => "NAS_NUMLOCK",
        }
    }

    /// True for NAS and its numlock overlay.
    #[must_use]
    pub const fn is_nas_family(self) -> bool {
        matches!(self, Self::Nas | Self::NasNumlock)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerId {
    type Err = anyhow::Error;

    /// Accepts a layer name (case-insensitive) or a numeric index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<u8>() {
            return Self::from_index(index)
                .ok_or_else(|| anyhow::anyhow!("Layer index {} out of range (0-4)", index));
        }

        Self::ALL
            .into_iter()
            .find(|layer| layer.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| anyhow::anyhow!("Unknown layer '{}'", trimmed))
    }
}

/// Set of active layer indices as reported by the host.
///
/// The host can track up to 32 layers, so indices outside the five named
/// layers are representable. The highest active layer is the maximum index
/// in the set; with nothing active the default layer (index 0) is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerState {
    bits: u32,
}

impl LayerState {
    /// Maximum number of layer indices the host tracks.
    pub const CAPACITY: u8 = 32;

    /// Creates an empty layer state (only the default layer visible).
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Builds a state from a raw host bitmask.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self { bits }
    }

    /// Raw host bitmask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Marks a raw index active. Indices past capacity are ignored.
    pub fn insert_index(&mut self, index: u8) {
        if index < Self::CAPACITY {
            self.bits |= 1u32 << index;
        }
    }

    /// Marks a raw index inactive.
    pub fn remove_index(&mut self, index: u8) {
        if index < Self::CAPACITY {
            self.bits &= !(1u32 << index);
        }
    }

    /// Whether a raw index is active.
    #[must_use]
    pub fn contains_index(self, index: u8) -> bool {
        index < Self::CAPACITY && self.bits & (1u32 << index) != 0
    }

    /// Marks a layer active.
    pub fn insert(&mut self, layer: LayerId) {
        self.insert_index(layer.index());
    }

    /// Marks a layer inactive.
    pub fn remove(&mut self, layer: LayerId) {
        self.remove_index(layer.index());
    }

    /// Whether a layer is active.
    #[must_use]
    pub fn contains(self, layer: LayerId) -> bool {
        self.contains_index(layer.index())
    }

    /// Active raw indices in ascending order.
    pub fn active_indices(self) -> impl Iterator<Item = u8> {
        (0..Self::CAPACITY).filter(move |&index| self.contains_index(index))
    }

    /// Active named layers in ascending priority.
    pub fn active_layers(self) -> impl Iterator<Item = LayerId> {
        self.active_indices().filter_map(LayerId::from_index)
    }

    /// Highest active index, or 0 (the default layer) when nothing is active.
    #[must_use]
    pub fn highest_index(self) -> u8 {
        self.active_indices().max().unwrap_or(0)
    }

    /// Highest active layer, if its index is one of the named layers.
    #[must_use]
    pub fn highest(self) -> Option<LayerId> {
        LayerId::from_index(self.highest_index())
    }

    /// Layers to consult for key resolution, highest priority first.
    ///
    /// The default layer is always included at the bottom.
    pub fn resolution_order(self) -> impl Iterator<Item = LayerId> {
        LayerId::ALL
            .into_iter()
            .rev()
            .filter(move |&layer| layer == LayerId::Normal || self.contains(layer))
    }
}

impl FromIterator<LayerId> for LayerState {
    fn from_iter<I: IntoIterator<Item = LayerId>>(iter: I) -> Self {
        let mut state = Self::new();
        for layer in iter {
            state.insert(layer);
        }
        state
    }
}
