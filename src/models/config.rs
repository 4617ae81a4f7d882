use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::preset::{
    factory_preset, factory_presets, PresetParams, PresetPatch, WarmthMode,
    DEFAULT_ACTIVE_PRESET, FACTORY_PRESET_NAMES,
};

/// Persisted configuration exactly as it lives in storage.
///
/// Every field is optional; the engine only ever works with the
/// resolved form produced by [`StoredConfig::resolve`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredConfig {
    pub enabled: Option<bool>,
    pub active_preset: Option<String>,
    pub presets: Option<HashMap<String, PresetPatch>>,
}

impl StoredConfig {
    /// The shape written on first run: enabled, balanced, factory catalogue.
    pub fn factory() -> Self {
        let presets = factory_presets()
            .into_iter()
            .map(|(name, params)| (name, patch_from(&params)))
            .collect();

        Self {
            enabled: Some(true),
            active_preset: Some(DEFAULT_ACTIVE_PRESET.to_string()),
            presets: Some(presets),
        }
    }

    /// Reconcile persisted data over the factory catalogue.
    ///
    /// Applied independently per preset and per field: a present, valid
    /// stored value wins, everything else comes from the factory
    /// defaults. Stored preset names outside the factory set are
    /// dropped; an unknown active preset falls back to "balanced".
    pub fn resolve(&self) -> EnhancerConfig {
        let stored_presets = self.presets.as_ref();

        let presets: HashMap<String, PresetParams> = FACTORY_PRESET_NAMES
            .iter()
            .map(|name| {
                let factory = factory_preset(name).expect("factory name");
                let params = match stored_presets.and_then(|p| p.get(*name)) {
                    Some(patch) => factory.merged(patch),
                    None => factory,
                };
                ((*name).to_string(), params)
            })
            .collect();

        let active_preset = self
            .active_preset
            .as_deref()
            .filter(|name| presets.contains_key(*name))
            .unwrap_or(DEFAULT_ACTIVE_PRESET)
            .to_string();

        EnhancerConfig {
            enabled: self.enabled.unwrap_or(true),
            active_preset,
            presets,
        }
    }
}

fn patch_from(params: &PresetParams) -> PresetPatch {
    let mode = match params.warmth_mode {
        WarmthMode::Simple => "simple",
        WarmthMode::Cinematic => "cinematic",
    };

    PresetPatch {
        brightness: Some(params.brightness),
        contrast: Some(params.contrast),
        saturate: Some(params.saturate),
        warmth: Some(params.warmth),
        warmth_mode: Some(mode.to_string()),
        intensity: Some(params.intensity),
        sharpness: Some(params.sharpness),
    }
}

/// Fully-populated configuration the engine runs a reconciliation with.
#[derive(Debug, Clone)]
pub struct EnhancerConfig {
    pub enabled: bool,
    pub active_preset: String,
    pub presets: HashMap<String, PresetParams>,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            active_preset: DEFAULT_ACTIVE_PRESET.to_string(),
            presets: factory_presets(),
        }
    }
}

impl EnhancerConfig {
    /// Parameters of the active preset.
    ///
    /// Total: a missing entry resolves to the factory "balanced"
    /// parameters rather than failing.
    pub fn active_params(&self) -> PresetParams {
        self.presets
            .get(&self.active_preset)
            .cloned()
            .unwrap_or_else(|| factory_preset(DEFAULT_ACTIVE_PRESET).expect("factory name"))
    }
}
