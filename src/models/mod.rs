pub mod config;
pub mod preset;

pub use config::{EnhancerConfig, StoredConfig};
pub use preset::{PresetParams, PresetPatch, WarmthMode, DEFAULT_ACTIVE_PRESET};
