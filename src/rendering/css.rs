//! CSS filter-chain compositor.
//!
//! Turns brightness/contrast/saturate plus the overall intensity into
//! a single `filter` value, optionally ending with a `url(#...)`
//! reference so the SVG warmth/sharpening graph composes on top of the
//! CSS-level adjustments.

use crate::models::PresetParams;

/// Neutral percentage for brightness/contrast/saturate.
const NEUTRAL: f64 = 100.0;

/// Build the composited `filter` value for a preset.
///
/// Intensity acts as a lerp factor between neutral (100%) and the
/// configured value, independently per channel:
/// `effective = 100 + (configured - 100) * intensity/100`.
/// Non-finite inputs fall back to neutral before any arithmetic.
pub fn build_filter_string(params: &PresetParams, graph_id: Option<&str>) -> String {
    let intensity = numeric_or(params.intensity, NEUTRAL) / 100.0;

    let brightness = NEUTRAL + (numeric_or(params.brightness, NEUTRAL) - NEUTRAL) * intensity;
    let contrast = NEUTRAL + (numeric_or(params.contrast, NEUTRAL) - NEUTRAL) * intensity;
    let saturate = NEUTRAL + (numeric_or(params.saturate, NEUTRAL) - NEUTRAL) * intensity;

    let mut filter = format!(
        "brightness({brightness:.2}%) contrast({contrast:.2}%) saturate({saturate:.2}%)"
    );

    if let Some(id) = graph_id {
        filter.push_str(&format!(" url(#{id})"));
    }

    filter
}

fn numeric_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
