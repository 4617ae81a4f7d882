//! Style injection.
//!
//! Owns the text of the singleton stylesheet: one rule block applying
//! the composited filter to video-element selectors, one forcing
//! `filter: none` on image-like selectors so thumbnails, posters and
//! icons are never graded along with the video. The filter-graph
//! container's own SVG subtree is excluded from the negation so the
//! graph definition itself is never suppressed.

use std::sync::Arc;

use crate::services::document::{PageDocument, GRAPH_CONTAINER_ID};

/// Selectors the filter applies to.
const VIDEO_SELECTORS: [&str; 6] = [
    "video",
    ".html5-main-video",
    ".video-stream",
    ".html5-video-player video",
    r#"[class*="player"] video"#,
    "[data-player] video",
];

/// Selectors forced back to `filter: none`.
const NEUTRALIZED_SELECTORS: [&str; 10] = [
    "img",
    "picture",
    r#"[role="img"]"#,
    "ytd-thumbnail",
    ".ytp-videowall-still-image",
    "yt-image",
    "yt-img-shadow",
    ".thumbnail",
    r#"[class*="thumbnail"]"#,
    r#"[class*="poster"]"#,
];

/// Build the full stylesheet text for a composited filter value.
pub fn stylesheet_text(filter_value: &str) -> String {
    let video_list = VIDEO_SELECTORS.join(",\n");

    let mut neutralized: Vec<String> = vec![
        NEUTRALIZED_SELECTORS[0].to_string(),
        NEUTRALIZED_SELECTORS[1].to_string(),
        format!("svg:not(#{GRAPH_CONTAINER_ID} svg)"),
    ];
    neutralized.extend(NEUTRALIZED_SELECTORS[2..].iter().map(|s| s.to_string()));
    let neutralized_list = neutralized.join(",\n");

    format!(
        "{video_list} {{\n    filter: {filter_value} !important;\n}}\n\n{neutralized_list} {{\n    filter: none !important;\n}}\n"
    )
}

/// Writes the stylesheet through the document boundary.
pub struct StyleInjector {
    document: Arc<dyn PageDocument>,
}

impl StyleInjector {
    pub fn new(document: Arc<dyn PageDocument>) -> Self {
        Self { document }
    }

    /// Overwrite the stylesheet with rules binding the given filter
    /// value. The element is created once and reused.
    pub fn apply(&self, filter_value: &str) {
        self.document.install_stylesheet(&stylesheet_text(filter_value));
    }

    /// Remove the stylesheet entirely.
    pub fn remove(&self) {
        self.document.remove_stylesheet();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::document::MemoryDocument;

    #[test]
    fn test_stylesheet_contains_both_rule_blocks() {
        let css = stylesheet_text("brightness(105.00%)");

        assert!(css.contains("filter: brightness(105.00%) !important;"));
        assert!(css.contains("filter: none !important;"));
    }

    #[test]
    fn test_video_selectors_present() {
        let css = stylesheet_text("saturate(120.00%)");
        for selector in VIDEO_SELECTORS {
            assert!(css.contains(selector), "missing selector {selector}");
        }
    }

    #[test]
    fn test_graph_container_excluded_from_negation() {
        let css = stylesheet_text("contrast(110.00%)");
        assert!(css.contains("svg:not(#video-enhancer-svg-container svg)"));
    }

    #[test]
    fn test_image_selectors_neutralized() {
        let css = stylesheet_text("brightness(100.00%)");
        let negation = css.split("filter: none").next().unwrap();
        // Spot-check that the thumbnail selectors sit in the stylesheet
        assert!(negation.contains("ytd-thumbnail"));
        assert!(negation.contains(r#"[class*="poster"]"#));
    }

    #[test]
    fn test_injector_overwrites_whole_text() {
        let doc = Arc::new(MemoryDocument::new());
        let injector = StyleInjector::new(doc.clone());

        injector.apply("brightness(105.00%)");
        injector.apply("brightness(110.00%)");

        let css = doc.stylesheet().unwrap();
        assert!(css.contains("brightness(110.00%)"));
        assert!(!css.contains("brightness(105.00%)"));
        assert_eq!(doc.stylesheet_write_count(), 2);

        injector.remove();
        assert!(doc.stylesheet().is_none());
    }
}
