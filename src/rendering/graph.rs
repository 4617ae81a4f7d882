//! Filter-graph composition.
//!
//! Chains the warmth and sharpening stages into a single graph with a
//! deterministic identifier, and serializes the whole thing as a
//! hidden inline SVG `<filter>` definition.

use std::fmt::Write;

use crate::models::WarmthMode;
use crate::rendering::sharpen::sharpen_stages;
use crate::rendering::stages::{Primitive, SOURCE_GRAPHIC};
use crate::rendering::warmth::warmth_stages;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Base of every filter-graph identifier.
pub const FILTER_ID_BASE: &str = "video-enhancer-filter";

/// Warmth magnitudes at or below this are visually negligible and emit
/// no stage at all, so near-neutral settings never force a re-render.
pub const WARMTH_EPSILON: f64 = 0.5;

/// Round and clamp sharpness to an integer in [0, 100].
pub fn normalize_sharpness(sharpness: f64) -> i32 {
    if sharpness.is_finite() {
        (sharpness.round() as i32).clamp(0, 100)
    } else {
        0
    }
}

/// Clamp warmth to [-100, 100] without rounding; intensity scaling
/// legitimately produces fractional degrees.
pub fn normalize_warmth(warmth: f64) -> f64 {
    if warmth.is_finite() {
        warmth.clamp(-100.0, 100.0)
    } else {
        0.0
    }
}

/// Whether the (normalized) parameters require a filter graph at all.
pub fn needs_graph(sharpness: i32, warmth: f64) -> bool {
    sharpness > 0 || warmth.abs() > WARMTH_EPSILON
}

/// Deterministic identifier for a normalized parameter triple.
///
/// Identical triples always map to the same id regardless of call
/// order: `<base>-<modePrefix><warmth>-sh<sharpness>`.
pub fn filter_graph_id(mode: WarmthMode, warmth: f64, sharpness: i32) -> String {
    format!(
        "{FILTER_ID_BASE}-{}{}-sh{sharpness}",
        mode.id_prefix(),
        warmth.round() as i64
    )
}

/// A composed chain of filter stages under one identifier.
#[derive(Debug, Clone)]
pub struct FilterGraph {
    pub id: String,
    pub stages: Vec<Primitive>,
}

impl FilterGraph {
    /// Compose the graph for a normalized parameter triple.
    ///
    /// Stage order is fixed: warmth first (if above the suppression
    /// threshold), then sharpening (if positive), each stage reading
    /// the previous stage's output. Returns `None` when neither
    /// condition triggers.
    pub fn compose(sharpness: i32, warmth: f64, mode: WarmthMode) -> Option<FilterGraph> {
        if !needs_graph(sharpness, warmth) {
            return None;
        }

        let id = filter_graph_id(mode, warmth, sharpness);
        let mut stages = Vec::new();
        let mut current_input = SOURCE_GRAPHIC.to_string();
        let mut step_count = 0;

        if warmth.abs() > WARMTH_EPSILON {
            step_count += 1;
            let output = format!("step{step_count}");
            stages.extend(warmth_stages(warmth, mode, &current_input, &output));
            current_input = output;
        }

        if sharpness > 0 {
            step_count += 1;
            let output = format!("step{step_count}");
            stages.extend(sharpen_stages(sharpness, &current_input, &output));
        }

        Some(FilterGraph { id, stages })
    }

    /// Serialize as a zero-size, non-interactive inline SVG holding the
    /// `<filter>` definition.
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(512);
        let _ = write!(
            out,
            r#"<svg xmlns="{SVG_NAMESPACE}" aria-hidden="true" focusable="false" style="position:absolute;width:0;height:0;">"#
        );
        let _ = write!(
            out,
            r#"<filter id="{}" color-interpolation-filters="sRGB" x="0" y="0" width="100%" height="100%">"#,
            self.id
        );
        for stage in &self.stages {
            stage.write_svg(&mut out);
        }
        out.push_str("</filter></svg>");
        out
    }
}
