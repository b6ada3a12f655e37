//! Per-layer layout table injected into the controller.
//!
//! A keymap lists, for each of the five layers, the keycode at every
//! physical key position in LAYOUT order. The built-in DataHand Dvorak table
//! is embedded at compile time; replacement tables are loaded from JSON5
//! files so they can carry comments like the built-in one.

use crate::models::{Keycode, LayerId, LayerState};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Number of physical keys on a DataHand.
pub const DATAHAND_KEY_COUNT: usize = 52;

/// Keymap file schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeymapFile {
    name: String,
    #[serde(default)]
    description: Option<String>,
    layers: BTreeMap<LayerId, Vec<Keycode>>,
}

/// Validated layout table covering all five layers.
///
/// # Validation
///
/// - Every layer is present
/// - Every layer has the same, non-zero number of keys
/// - Layer actions (`TG`, `MO`, `TO`) target named layers (enforced by parsing)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keymap {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    layers: BTreeMap<LayerId, Vec<Keycode>>,
}

impl Keymap {
    /// Builds a keymap from per-layer key lists.
    pub fn new(
        name: impl Into<String>,
        layers: BTreeMap<LayerId, Vec<Keycode>>,
    ) -> Result<Self> {
        let keymap = Self {
            name: name.into(),
            description: None,
            layers,
        };
        keymap.validate()?;
        Ok(keymap)
    }

    /// The built-in DataHand Dvorak layout.
    #[must_use]
    pub fn datahand_dvorak() -> Self {
        Self::from_json5(include_str!("datahand_dvorak.json5"))
            .expect("embedded datahand_dvorak.json5 is a valid keymap")
    }

    /// Parses and validates a JSON5 keymap document.
    pub fn from_json5(content: &str) -> Result<Self> {
        let file: KeymapFile = json5::from_str(content).context("Failed to parse keymap JSON5")?;
        let keymap = Self {
            name: file.name,
            description: file.description,
            layers: file.layers,
        };
        keymap.validate()?;
        Ok(keymap)
    }

    /// Loads a keymap file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read keymap file: {}", path.display()))?;
        let keymap = Self::from_json5(&content)
            .context(format!("Invalid keymap file: {}", path.display()))?;
        debug!(
            name = %keymap.name,
            keys = keymap.key_count(),
            path = %path.display(),
            "keymap loaded"
        );
        Ok(keymap)
    }

    /// Loads `path` if given, otherwise returns the built-in layout.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::datahand_dvorak()),
        }
    }

    /// Checks the layer set and layer sizes.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Keymap name cannot be empty");
        }

        let missing: Vec<&str> = LayerId::ALL
            .into_iter()
            .filter(|layer| !self.layers.contains_key(layer))
            .map(LayerId::name)
            .collect();
        if !missing.is_empty() {
            anyhow::bail!("Keymap is missing layers: {}", missing.join(", "));
        }

        let expected = self.layers[&LayerId::Normal].len();
        if expected == 0 {
            anyhow::bail!("Keymap layer NORMAL has no keys");
        }

        for (layer, keys) in &self.layers {
            if keys.len() != expected {
                anyhow::bail!(
                    "Keymap layer {} has {} keys, expected {} (same as NORMAL)",
                    layer,
                    keys.len(),
                    expected
                );
            }
        }

        Ok(())
    }

    /// Keymap name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Number of key positions per layer.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.layers.get(&LayerId::Normal).map_or(0, Vec::len)
    }

    /// Keys of one layer in LAYOUT order.
    #[must_use]
    pub fn layer(&self, layer: LayerId) -> &[Keycode] {
        self.layers.get(&layer).map_or(&[][..], Vec::as_slice)
    }

    /// Keycode stored at a position on one layer.
    #[must_use]
    pub fn key(&self, layer: LayerId, index: usize) -> Option<&Keycode> {
        self.layer(layer).get(index)
    }

    /// Resolves a position through the active layers.
    ///
    /// Walks from the highest active layer down to NORMAL and returns the
    /// first non-transparent keycode. A position that is transparent all the
    /// way down resolves to [`Keycode::NoOp`]; an out-of-range position
    /// resolves to `None`.
    #[must_use]
    pub fn resolve(&self, state: LayerState, index: usize) -> Option<Keycode> {
        if index >= self.key_count() {
            return None;
        }

        let resolved = state
            .resolution_order()
            .filter_map(|layer| self.key(layer, index))
            .find(|keycode| !keycode.is_transparent())
            .cloned()
            .unwrap_or(Keycode::NoOp);
        Some(resolved)
    }

    /// Positions holding a given keycode on a layer.
    pub fn positions_of<'a>(
        &'a self,
        layer: LayerId,
        keycode: &'a Keycode,
    ) -> impl Iterator<Item = usize> + 'a {
        self.layer(layer)
            .iter()
            .enumerate()
            .filter(move |(_, k)| *k == keycode)
            .map(|(index, _)| index)
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::datahand_dvorak()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomKeycode, LayerAction};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn small_layers(sizes: [usize; 5]) -> BTreeMap<LayerId, Vec<Keycode>> {
        LayerId::ALL
            .into_iter()
            .zip(sizes)
            .map(|(layer, size)| (layer, vec![Keycode::Transparent; size]))
            .collect()
    }

    #[test]
    fn test_builtin_keymap_shape() {
        let keymap = Keymap::datahand_dvorak();
        assert_eq!(keymap.name(), "datahand-dvorak");
        assert_eq!(keymap.key_count(), DATAHAND_KEY_COUNT);
        for layer in LayerId::ALL {
            assert_eq!(keymap.layer(layer).len(), DATAHAND_KEY_COUNT);
        }
    }

    #[test]
    fn test_builtin_thumb_cluster() {
        let keymap = Keymap::datahand_dvorak();
        let ns = Keycode::Custom(CustomKeycode::Ns);
        assert_eq!(
            keymap.positions_of(LayerId::Normal, &ns).collect::<Vec<_>>(),
            vec![45]
        );
        assert_eq!(
            keymap.key(LayerId::Normal, 47),
            Some(&Keycode::Custom(CustomKeycode::Nsl))
        );
        assert_eq!(
            keymap.key(LayerId::Normal, 48),
            Some(&Keycode::Custom(CustomKeycode::N))
        );
        assert_eq!(
            keymap.key(LayerId::Normal, 51),
            Some(&Keycode::Custom(CustomKeycode::Fn))
        );
        assert_eq!(
            keymap.key(LayerId::Nas, 39),
            Some(&Keycode::Layer(LayerAction::Toggle(LayerId::Game)))
        );
    }

    #[test]
    fn test_resolve_falls_through_transparent_keys() {
        let keymap = Keymap::datahand_dvorak();
        let nas: LayerState = [LayerId::Nas].into_iter().collect();

        // NAS defines position 9 as KC_1 (index 9 is the first home-row centre key).
        assert_eq!(
            keymap.resolve(nas, 9),
            Some(Keycode::Basic("KC_1".to_string()))
        );
        // NS itself is transparent on NAS, so releasing it still finds NS.
        assert_eq!(
            keymap.resolve(nas, 45),
            Some(Keycode::Custom(CustomKeycode::Ns))
        );
    }

    #[test]
    fn test_resolve_numlock_overlay_over_nas() {
        let keymap = Keymap::datahand_dvorak();
        let state: LayerState = [LayerId::Nas, LayerId::NasNumlock].into_iter().collect();
        assert_eq!(
            keymap.resolve(state, 9),
            Some(Keycode::Basic("KC_KP_1".to_string()))
        );
        // Overlay is transparent on the north row, NAS shows through.
        assert_eq!(
            keymap.resolve(state, 0),
            Some(Keycode::Basic("KC_EXLM".to_string()))
        );
    }

    #[test]
    fn test_resolve_out_of_range() {
        let keymap = Keymap::datahand_dvorak();
        assert_eq!(keymap.resolve(LayerState::new(), DATAHAND_KEY_COUNT), None);
    }

    #[test]
    fn test_resolve_all_transparent_is_noop() {
        let keymap = Keymap::new("blank", small_layers([2; 5])).unwrap();
        assert_eq!(keymap.resolve(LayerState::new(), 1), Some(Keycode::NoOp));
    }

    #[test]
    fn test_validate_rejects_mismatched_layer_sizes() {
        let err = Keymap::new("bad", small_layers([4, 4, 4, 3, 4])).unwrap_err();
        assert!(err.to_string().contains("NAS has 3 keys"));
    }

    #[test]
    fn test_validate_rejects_missing_layer() {
        let mut layers = small_layers([4; 5]);
        layers.remove(&LayerId::Game);
        let err = Keymap::new("bad", layers).unwrap_err();
        assert!(err.to_string().contains("GAME"));
    }

    #[test]
    fn test_validate_rejects_empty_layers() {
        assert!(Keymap::new("empty", small_layers([0; 5])).is_err());
    }

    #[test]
    fn test_from_json5_rejects_bad_keycode() {
        let doc = r#"{
            name: "broken",
            layers: {
                NORMAL: ["KC_A"], GAME: ["KC_A"], FUNCTION_MOUSE: ["KC_A"],
                NAS: ["TG(RAISE)"], NAS_NUMLOCK: ["KC_A"],
            },
        }"#;
        assert!(Keymap::from_json5(doc).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"// two-key test layout
            {{
                name: "two-key",
                layers: {{
                    NORMAL: ["NS", "KC_A"],
                    GAME: ["_______", "KC_B"],
                    FUNCTION_MOUSE: ["_______", "KC_C"],
                    NAS: ["_______", "KC_1"],
                    NAS_NUMLOCK: ["_______", "KC_KP_1"],
                }},
            }}"#
        )
        .unwrap();

        let keymap = Keymap::load(file.path()).unwrap();
        assert_eq!(keymap.name(), "two-key");
        assert_eq!(keymap.key_count(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Keymap::load(Path::new("/nonexistent/keymap.json5")).unwrap_err();
        assert!(err.to_string().contains("Failed to read keymap file"));
    }
}
