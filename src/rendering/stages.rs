//! Declarative filter-primitive stages.
//!
//! A stage describes one color/blur/composite processing step with named
//! input and output ports, independent of the rendering target. Each
//! stage serializes to the corresponding SVG filter-primitive element.

use std::fmt::Write;

/// Implicit input port: the unfiltered source image.
pub const SOURCE_GRAPHIC: &str = "SourceGraphic";

/// Per-channel transfer function for a component-transfer stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransferFunc {
    Identity,
    /// Power-law transfer: `out = amplitude * in^exponent + offset`.
    Gamma {
        amplitude: f64,
        exponent: f64,
        offset: f64,
    },
}

/// One processing stage of a filter graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// 4x5 affine color matrix (rows R,G,B,A; columns R,G,B,A,offset).
    ColorMatrix {
        input: String,
        result: String,
        values: [f64; 20],
    },
    /// Per-channel transfer functions, ordered R, G, B, A.
    ComponentTransfer {
        input: String,
        result: String,
        channels: [TransferFunc; 4],
    },
    GaussianBlur {
        input: String,
        result: String,
        std_deviation: f64,
    },
    /// Arithmetic composite: `k1*in*in2 + k2*in + k3*in2 + k4`.
    ArithmeticComposite {
        input: String,
        input2: String,
        result: String,
        k1: f64,
        k2: f64,
        k3: f64,
        k4: f64,
    },
}

impl Primitive {
    /// Output port name of this stage.
    pub fn result(&self) -> &str {
        match self {
            Primitive::ColorMatrix { result, .. }
            | Primitive::ComponentTransfer { result, .. }
            | Primitive::GaussianBlur { result, .. }
            | Primitive::ArithmeticComposite { result, .. } => result,
        }
    }

    /// Serialize this stage as an SVG filter-primitive element.
    pub fn write_svg(&self, out: &mut String) {
        match self {
            Primitive::ColorMatrix {
                input,
                result,
                values,
            } => {
                let values = values
                    .iter()
                    .map(|v| fmt_coef(*v))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(
                    out,
                    r#"<feColorMatrix in="{input}" type="matrix" values="{values}" result="{result}"/>"#
                );
            }
            Primitive::ComponentTransfer {
                input,
                result,
                channels,
            } => {
                let _ = write!(out, r#"<feComponentTransfer in="{input}" result="{result}">"#);
                for (func, name) in channels.iter().zip(["feFuncR", "feFuncG", "feFuncB", "feFuncA"])
                {
                    match func {
                        TransferFunc::Identity => {
                            let _ = write!(out, r#"<{name} type="identity"/>"#);
                        }
                        TransferFunc::Gamma {
                            amplitude,
                            exponent,
                            offset,
                        } => {
                            let _ = write!(
                                out,
                                r#"<{name} type="gamma" amplitude="{}" exponent="{}" offset="{}"/>"#,
                                fmt_coef(*amplitude),
                                fmt_coef(*exponent),
                                fmt_coef(*offset)
                            );
                        }
                    }
                }
                out.push_str("</feComponentTransfer>");
            }
            Primitive::GaussianBlur {
                input,
                result,
                std_deviation,
            } => {
                let _ = write!(
                    out,
                    r#"<feGaussianBlur in="{input}" stdDeviation="{std_deviation}" result="{result}"/>"#
                );
            }
            Primitive::ArithmeticComposite {
                input,
                input2,
                result,
                k1,
                k2,
                k3,
                k4,
            } => {
                let _ = write!(
                    out,
                    r#"<feComposite in="{input}" in2="{input2}" operator="arithmetic" k1="{}" k2="{}" k3="{}" k4="{}" result="{result}"/>"#,
                    fmt_coef(*k1),
                    fmt_coef(*k2),
                    fmt_coef(*k3),
                    fmt_coef(*k4)
                );
            }
        }
    }
}

/// Format a coefficient with four decimal places.
///
/// Negative zero is normalized so neutral coefficients never render as
/// "-0.0000".
pub(crate) fn fmt_coef(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.4}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_coef() {
        assert_eq!(fmt_coef(1.0), "1.0000");
        assert_eq!(fmt_coef(-0.45), "-0.4500");
        assert_eq!(fmt_coef(0.0), "0.0000");
        assert_eq!(fmt_coef(-0.0), "0.0000");
    }

    #[test]
    fn test_color_matrix_svg() {
        let mut values = [0.0; 20];
        values[0] = 1.15;
        values[6] = 1.05;
        values[12] = 0.85;
        values[18] = 1.0;

        let stage = Primitive::ColorMatrix {
            input: SOURCE_GRAPHIC.to_string(),
            result: "step1".to_string(),
            values,
        };

        let mut out = String::new();
        stage.write_svg(&mut out);
        assert!(out.starts_with(r#"<feColorMatrix in="SourceGraphic" type="matrix""#));
        assert!(out.contains("1.1500"));
        assert!(out.contains(r#"result="step1""#));
    }

    #[test]
    fn test_component_transfer_svg() {
        let stage = Primitive::ComponentTransfer {
            input: SOURCE_GRAPHIC.to_string(),
            result: "gammaCorrected".to_string(),
            channels: [
                TransferFunc::Gamma {
                    amplitude: 1.012,
                    exponent: 0.992,
                    offset: 0.001,
                },
                TransferFunc::Gamma {
                    amplitude: 1.004,
                    exponent: 0.998,
                    offset: 0.0,
                },
                TransferFunc::Gamma {
                    amplitude: 0.99,
                    exponent: 1.012,
                    offset: 0.0025,
                },
                TransferFunc::Identity,
            ],
        };

        let mut out = String::new();
        stage.write_svg(&mut out);
        assert!(out.contains(r#"<feFuncR type="gamma" amplitude="1.0120""#));
        assert!(out.contains(r#"<feFuncA type="identity"/>"#));
        assert!(out.ends_with("</feComponentTransfer>"));
    }

    #[test]
    fn test_composite_svg() {
        let stage = Primitive::ArithmeticComposite {
            input: SOURCE_GRAPHIC.to_string(),
            input2: "sharpnessBlur".to_string(),
            result: "step1".to_string(),
            k1: 0.0,
            k2: 2.5,
            k3: -1.5,
            k4: 0.0,
        };

        let mut out = String::new();
        stage.write_svg(&mut out);
        assert_eq!(
            out,
            r#"<feComposite in="SourceGraphic" in2="sharpnessBlur" operator="arithmetic" k1="0.0000" k2="2.5000" k3="-1.5000" k4="0.0000" result="step1"/>"#
        );
    }

    #[test]
    fn test_blur_svg() {
        let stage = Primitive::GaussianBlur {
            input: "step1".to_string(),
            result: "sharpnessBlur".to_string(),
            std_deviation: 1.2,
        };

        let mut out = String::new();
        stage.write_svg(&mut out);
        assert_eq!(
            out,
            r#"<feGaussianBlur in="step1" stdDeviation="1.2" result="sharpnessBlur"/>"#
        );
    }
}
