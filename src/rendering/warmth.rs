//! Warmth grading stages.
//!
//! Two algorithm variants interpret the signed warmth parameter:
//! `Simple` emits one linear color matrix, `Cinematic` a three-stage
//! gamma + matrix pipeline so the warm/cool bias lands asymmetrically
//! on midtones and highlights. The coefficients are empirically tuned
//! constants; visual parity depends on keeping them exactly as-is.

use crate::models::WarmthMode;
use crate::rendering::stages::{Primitive, TransferFunc};

/// Build the warmth stage(s) for the given mode.
///
/// `warmth` is expected pre-clamped to [-100, 100]; fractional values
/// are legal (intensity scaling produces them). The first stage reads
/// `input`, the last writes `output`.
pub fn warmth_stages(warmth: f64, mode: WarmthMode, input: &str, output: &str) -> Vec<Primitive> {
    match mode {
        WarmthMode::Simple => vec![simple_warmth(warmth, input, output)],
        WarmthMode::Cinematic => cinematic_warmth(warmth, input, output),
    }
}

/// One affine color matrix scaling red up and blue down (or the
/// reverse for negative warmth), with small opposing offsets.
fn simple_warmth(warmth: f64, input: &str, output: &str) -> Primitive {
    let w = warmth / 100.0;

    let r = 1.0 + w * 0.15;
    let g = 1.0 + w * 0.05;
    let b = 1.0 - w * 0.15;
    let r_offset = w * 0.02;
    let b_offset = -w * 0.02;

    Primitive::ColorMatrix {
        input: input.to_string(),
        result: output.to_string(),
        values: [
            r, 0.0, 0.0, 0.0, r_offset, //
            0.0, g, 0.0, 0.0, 0.0, //
            0.0, 0.0, b, 0.0, b_offset, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ],
    }
}

/// Gamma tonal separation, then a highlight color shift, then a final
/// grade. The gamma stage must come first: a single matrix cannot
/// express the nonlinearity that separates midtones from highlights.
fn cinematic_warmth(warmth: f64, input: &str, output: &str) -> Vec<Primitive> {
    let w = warmth / 100.0;

    let gamma = Primitive::ComponentTransfer {
        input: input.to_string(),
        result: "gammaCorrected".to_string(),
        channels: [
            TransferFunc::Gamma {
                amplitude: 1.0 + w * 0.12,
                exponent: 1.0 - w * 0.08,
                offset: w * 0.01,
            },
            TransferFunc::Gamma {
                amplitude: 1.0 + w * 0.04,
                exponent: 1.0 - w * 0.02,
                offset: 0.0,
            },
            TransferFunc::Gamma {
                amplitude: 1.0 - w * 0.10,
                exponent: 1.0 + w * 0.12,
                offset: w * 0.025,
            },
            TransferFunc::Identity,
        ],
    };

    let highlight = diagonal_matrix(
        1.0 + w * 0.05,
        1.0 - w * 0.05,
        "gammaCorrected",
        "highlightShifted",
    );

    let grade = diagonal_matrix(1.0 + w * 0.02, 1.0 - w * 0.02, "highlightShifted", output);

    vec![gamma, highlight, grade]
}

/// Color matrix scaling only the red and blue channels.
fn diagonal_matrix(r: f64, b: f64, input: &str, output: &str) -> Primitive {
    Primitive::ColorMatrix {
        input: input.to_string(),
        result: output.to_string(),
        values: [
            r, 0.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, b, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ],
    }
}
