use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Algorithm variant used to realize the warmth parameter.
///
/// `Simple` is a single linear color matrix; `Cinematic` is a
/// three-stage gamma + matrix pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarmthMode {
    Simple,
    Cinematic,
}

impl WarmthMode {
    /// Parse the persisted string form, rejecting unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "simple" => Some(WarmthMode::Simple),
            "cinematic" => Some(WarmthMode::Cinematic),
            _ => None,
        }
    }

    /// Single-letter prefix used in deterministic filter-graph ids.
    pub fn id_prefix(self) -> char {
        match self {
            WarmthMode::Simple => 's',
            WarmthMode::Cinematic => 'c',
        }
    }
}

/// One named bundle of enhancement parameters.
///
/// `brightness`, `contrast` and `saturate` are percentages (100 =
/// unchanged); `warmth` is signed in [-100, 100]; `intensity` scales
/// the deviation from neutral; `sharpness` is [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetParams {
    pub brightness: f64,
    pub contrast: f64,
    pub saturate: f64,
    pub warmth: f64,
    pub warmth_mode: WarmthMode,
    pub intensity: f64,
    pub sharpness: f64,
}

impl PresetParams {
    /// Merge a stored patch over these factory values, field by field.
    ///
    /// A field present in the patch wins; an absent or malformed field
    /// keeps the factory value. `warmthMode` is validated against the
    /// enumeration, falling back to the factory mode on invalid input.
    pub fn merged(&self, patch: &PresetPatch) -> PresetParams {
        PresetParams {
            brightness: patch.brightness.unwrap_or(self.brightness),
            contrast: patch.contrast.unwrap_or(self.contrast),
            saturate: patch.saturate.unwrap_or(self.saturate),
            warmth: patch.warmth.unwrap_or(self.warmth),
            warmth_mode: patch
                .warmth_mode
                .as_deref()
                .and_then(WarmthMode::parse)
                .unwrap_or(self.warmth_mode),
            intensity: patch.intensity.unwrap_or(self.intensity),
            sharpness: patch.sharpness.unwrap_or(self.sharpness),
        }
    }
}

/// Partially-specified persisted preset, as written by the settings UI.
///
/// Every field is optional; numeric fields tolerate malformed stored
/// values (strings, null, garbage) by treating them as absent, so one
/// bad field never poisons the rest of the preset.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PresetPatch {
    #[serde(deserialize_with = "lenient_number")]
    pub brightness: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub contrast: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub saturate: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub warmth: Option<f64>,
    pub warmth_mode: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub intensity: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub sharpness: Option<f64>,
}

/// Accept numbers or numeric strings; map anything else to `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

/// Name of the preset used when persisted data is absent or invalid.
pub const DEFAULT_ACTIVE_PRESET: &str = "balanced";

/// The fixed set of preset names; the key universe of every catalogue.
pub const FACTORY_PRESET_NAMES: [&str; 6] =
    ["subtle", "balanced", "vivid", "cinema", "gaming", "warm"];

/// Immutable factory parameters for a preset name.
pub fn factory_preset(name: &str) -> Option<PresetParams> {
    let p = |brightness, contrast, saturate, warmth, warmth_mode, sharpness| PresetParams {
        brightness,
        contrast,
        saturate,
        warmth,
        warmth_mode,
        intensity: 100.0,
        sharpness,
    };

    match name {
        "subtle" => Some(p(102.0, 108.0, 110.0, 0.0, WarmthMode::Simple, 0.0)),
        "balanced" => Some(p(105.0, 115.0, 120.0, 0.0, WarmthMode::Simple, 0.0)),
        "vivid" => Some(p(108.0, 125.0, 140.0, 0.0, WarmthMode::Simple, 0.0)),
        "cinema" => Some(p(100.0, 120.0, 115.0, 15.0, WarmthMode::Cinematic, 0.0)),
        "gaming" => Some(p(110.0, 130.0, 135.0, -5.0, WarmthMode::Simple, 0.0)),
        "warm" => Some(p(105.0, 110.0, 115.0, 25.0, WarmthMode::Cinematic, 0.0)),
        _ => None,
    }
}

/// The full factory catalogue.
pub fn factory_presets() -> HashMap<String, PresetParams> {
    FACTORY_PRESET_NAMES
        .iter()
        .map(|name| {
            let params = factory_preset(name).expect("factory name");
            ((*name).to_string(), params)
        })
        .collect()
}

/// Whether a preset currently differs from its factory values.
pub fn is_modified(name: &str, params: &PresetParams) -> bool {
    match factory_preset(name) {
        Some(factory) => *params != factory,
        None => false,
    }
}
