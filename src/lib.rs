//! Vibrance
//!
//! CSS/SVG filter-graph synthesis engine for in-page video enhancement.
//! Turns named preset parameters into a composited CSS `filter` chain
//! plus an SVG filter-primitive graph (warmth grading, unsharp-mask
//! sharpening), and reconciles them idempotently against a narrow
//! document boundary as settings and page content change.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
