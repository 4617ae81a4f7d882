//! Unsharp-mask sharpening.
//!
//! Blur the input with a fixed Gaussian to get a low-frequency copy,
//! then recombine with an arithmetic composite that amplifies the
//! original and subtracts a fraction of the blur, boosting edges
//! proportionally to the sharpness setting.

use crate::rendering::stages::Primitive;

/// Fixed blur radius of the low-frequency pass, in pixels.
const BLUR_STD_DEVIATION: f64 = 1.2;

/// Build the blur + composite pair for a sharpness value in [0, 100].
///
/// `result = k2 * original + k3 * blurred` with `k2 = 1 + strength`,
/// `k3 = -strength`, `strength = (sharpness / 100) * 3`.
pub fn sharpen_stages(sharpness: i32, input: &str, output: &str) -> Vec<Primitive> {
    let strength = (f64::from(sharpness) / 100.0) * 3.0;

    let blur = Primitive::GaussianBlur {
        input: input.to_string(),
        result: "sharpnessBlur".to_string(),
        std_deviation: BLUR_STD_DEVIATION,
    };

    let composite = Primitive::ArithmeticComposite {
        input: input.to_string(),
        input2: "sharpnessBlur".to_string(),
        result: output.to_string(),
        k1: 0.0,
        k2: 1.0 + strength,
        k3: -strength,
        k4: 0.0,
    };

    vec![blur, composite]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::stages::SOURCE_GRAPHIC;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_blur_composite_pair() {
        let stages = sharpen_stages(50, SOURCE_GRAPHIC, "step1");
        assert_eq!(stages.len(), 2);

        match &stages[0] {
            Primitive::GaussianBlur {
                input,
                result,
                std_deviation,
            } => {
                assert_eq!(input, SOURCE_GRAPHIC);
                assert_eq!(result, "sharpnessBlur");
                assert_eq!(*std_deviation, 1.2);
            }
            other => panic!("expected blur, got {other:?}"),
        }

        // strength = 1.5
        match &stages[1] {
            Primitive::ArithmeticComposite {
                input,
                input2,
                result,
                k1,
                k2,
                k3,
                k4,
            } => {
                assert_eq!(input, SOURCE_GRAPHIC);
                assert_eq!(input2, "sharpnessBlur");
                assert_eq!(result, "step1");
                assert_eq!(*k1, 0.0);
                assert_close(*k2, 2.5);
                assert_close(*k3, -1.5);
                assert_eq!(*k4, 0.0);
            }
            other => panic!("expected composite, got {other:?}"),
        }
    }

    #[test]
    fn test_strength_scales_with_sharpness() {
        for sharpness in [1, 25, 100] {
            let stages = sharpen_stages(sharpness, SOURCE_GRAPHIC, "out");
            let strength = (f64::from(sharpness) / 100.0) * 3.0;
            match &stages[1] {
                Primitive::ArithmeticComposite { k2, k3, .. } => {
                    assert_close(*k2, 1.0 + strength);
                    assert_close(*k3, -strength);
                }
                other => panic!("expected composite, got {other:?}"),
            }
        }
    }
}
