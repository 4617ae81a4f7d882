//! Filter-graph cache and applier.
//!
//! Owns the runtime filter state (the last-applied parameter triple
//! and the installed graph id) and uses it to make graph installation
//! idempotent: reconciliations that change nothing perform no document
//! writes, so repeated triggers never cause flicker or relayout storms.

use std::sync::Arc;

use crate::models::WarmthMode;
use crate::rendering::graph::{normalize_sharpness, normalize_warmth, FilterGraph};
use crate::services::document::PageDocument;

/// Hook run when a deferred update can finally proceed; performs a
/// full settings reload, which re-runs the deferred graph update.
pub type ReloadHook = Arc<dyn Fn() + Send + Sync>;

/// Last-applied normalized parameters and the installed graph id.
///
/// Empty (all `None`) until the first install and again after filters
/// are removed. After a reconciliation that needed no graph, the
/// numeric fields hold the neutral values and the id is cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub sharpness: Option<i32>,
    pub warmth: Option<f64>,
    pub warmth_mode: Option<WarmthMode>,
    pub filter_id: Option<String>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.sharpness.is_none()
            && self.warmth.is_none()
            && self.warmth_mode.is_none()
            && self.filter_id.is_none()
    }
}

/// Result of a graph update.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphOutcome {
    /// A graph is installed (new or reused) under this id.
    Active(String),
    /// No graph is needed; any installed graph was removed.
    Inactive,
    /// The document is not ready; nothing was written and a retry was
    /// scheduled for document-ready.
    Deferred,
}

impl GraphOutcome {
    /// The id to reference from the CSS filter chain, if any.
    pub fn graph_id(&self) -> Option<&str> {
        match self {
            GraphOutcome::Active(id) => Some(id),
            GraphOutcome::Inactive | GraphOutcome::Deferred => None,
        }
    }
}

/// Installs filter graphs through the document boundary.
pub struct GraphApplier {
    document: Arc<dyn PageDocument>,
    reload: ReloadHook,
    state: FilterState,
    /// A ready callback is already queued with the document.
    retry_pending: bool,
}

impl GraphApplier {
    pub fn new(document: Arc<dyn PageDocument>, reload: ReloadHook) -> Self {
        Self {
            document,
            reload,
            state: FilterState::default(),
            retry_pending: false,
        }
    }

    /// Reconcile the installed graph with the requested parameters.
    ///
    /// Inputs are normalized first (sharpness rounded and clamped to
    /// [0, 100], warmth clamped to [-100, 100]). If the normalized
    /// triple matches the last-applied one, the cached outcome is
    /// returned and the document is not touched. Never fails: an
    /// unready document defers, it does not error, and however many
    /// updates defer, only one retry is scheduled for document-ready.
    pub fn update_graph(
        &mut self,
        sharpness: f64,
        warmth: f64,
        warmth_mode: WarmthMode,
    ) -> GraphOutcome {
        let sharpness = normalize_sharpness(sharpness);
        let warmth = normalize_warmth(warmth);

        if self.state.sharpness == Some(sharpness)
            && self.state.warmth == Some(warmth)
            && self.state.warmth_mode == Some(warmth_mode)
        {
            return match &self.state.filter_id {
                Some(id) => GraphOutcome::Active(id.clone()),
                None => GraphOutcome::Inactive,
            };
        }

        let Some(graph) = FilterGraph::compose(sharpness, warmth, warmth_mode) else {
            self.document.remove_graph();
            self.state = FilterState {
                sharpness: Some(0),
                warmth: Some(0.0),
                warmth_mode: None,
                filter_id: None,
            };
            return GraphOutcome::Inactive;
        };

        if !self.document.is_ready() {
            if !self.retry_pending {
                let reload = self.reload.clone();
                self.document.on_ready(Box::new(move || reload()));
                self.retry_pending = true;
            }
            tracing::debug!(sharpness, warmth, "Document not ready, deferring graph install");
            return GraphOutcome::Deferred;
        }
        self.retry_pending = false;

        self.document.install_graph(&graph.to_svg());
        tracing::debug!(filter_id = %graph.id, "Installed filter graph");

        let id = graph.id;
        self.state = FilterState {
            sharpness: Some(sharpness),
            warmth: Some(warmth),
            warmth_mode: Some(warmth_mode),
            filter_id: Some(id.clone()),
        };

        GraphOutcome::Active(id)
    }

    /// Remove any installed graph and reset the runtime state to empty.
    pub fn clear(&mut self) {
        self.document.remove_graph();
        self.state = FilterState::default();
    }

    /// Read-only snapshot of the runtime state.
    pub fn state(&self) -> FilterState {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::document::MemoryDocument;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn applier(document: Arc<MemoryDocument>) -> GraphApplier {
        GraphApplier::new(document, Arc::new(|| {}))
    }

    #[test]
    fn test_install_and_reuse_identical_triple() {
        let doc = Arc::new(MemoryDocument::new());
        let mut applier = applier(doc.clone());

        let first = applier.update_graph(40.0, 10.0, WarmthMode::Simple);
        let id = first.graph_id().unwrap().to_string();
        assert_eq!(doc.graph_install_count(), 1);

        // Identical normalized triple: same id, no second install
        let second = applier.update_graph(40.0, 10.0, WarmthMode::Simple);
        assert_eq!(second.graph_id(), Some(id.as_str()));
        assert_eq!(doc.graph_install_count(), 1);
    }

    #[test]
    fn test_normalization_makes_near_identical_calls_idempotent() {
        let doc = Arc::new(MemoryDocument::new());
        let mut applier = applier(doc.clone());

        applier.update_graph(40.4, 10.0, WarmthMode::Simple);
        // 39.6 rounds to 40 as well
        applier.update_graph(39.6, 10.0, WarmthMode::Simple);
        assert_eq!(doc.graph_install_count(), 1);
    }

    #[test]
    fn test_changed_triple_reinstalls() {
        let doc = Arc::new(MemoryDocument::new());
        let mut applier = applier(doc.clone());

        let first = applier.update_graph(40.0, 10.0, WarmthMode::Simple);
        let second = applier.update_graph(40.0, 10.0, WarmthMode::Cinematic);

        assert_ne!(first, second);
        assert_eq!(doc.graph_install_count(), 2);
        assert!(doc
            .graph_markup()
            .unwrap()
            .contains("<feComponentTransfer"));
    }

    #[test]
    fn test_neutral_parameters_remove_graph() {
        let doc = Arc::new(MemoryDocument::new());
        let mut applier = applier(doc.clone());

        applier.update_graph(40.0, 10.0, WarmthMode::Simple);
        assert!(doc.graph_markup().is_some());

        let outcome = applier.update_graph(0.0, 0.0, WarmthMode::Simple);
        assert_eq!(outcome, GraphOutcome::Inactive);
        assert!(doc.graph_markup().is_none());

        let state = applier.state();
        assert_eq!(state.sharpness, Some(0));
        assert_eq!(state.warmth, Some(0.0));
        assert_eq!(state.warmth_mode, None);
        assert_eq!(state.filter_id, None);
    }

    #[test]
    fn test_warmth_at_suppression_threshold_is_neutral() {
        let doc = Arc::new(MemoryDocument::new());
        let mut applier = applier(doc.clone());

        let outcome = applier.update_graph(0.0, 0.5, WarmthMode::Cinematic);
        assert_eq!(outcome, GraphOutcome::Inactive);
        assert_eq!(doc.graph_install_count(), 0);
    }

    #[test]
    fn test_deferred_when_document_not_ready() {
        let doc = Arc::new(MemoryDocument::deferred());
        let reloads = Arc::new(AtomicUsize::new(0));
        let counter = reloads.clone();
        let mut applier = GraphApplier::new(
            doc.clone(),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let outcome = applier.update_graph(40.0, 0.0, WarmthMode::Simple);
        assert_eq!(outcome, GraphOutcome::Deferred);
        // No writes, state untouched
        assert!(doc.graph_markup().is_none());
        assert!(applier.state().is_empty());
        assert_eq!(reloads.load(Ordering::SeqCst), 0);

        // Readiness fires the scheduled reload exactly once
        doc.set_ready();
        assert_eq!(reloads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_deferrals_schedule_one_reload() {
        let doc = Arc::new(MemoryDocument::deferred());
        let reloads = Arc::new(AtomicUsize::new(0));
        let counter = reloads.clone();
        let mut applier = GraphApplier::new(
            doc.clone(),
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        // A burst of updates before the document is ready
        assert_eq!(
            applier.update_graph(40.0, 0.0, WarmthMode::Simple),
            GraphOutcome::Deferred
        );
        assert_eq!(
            applier.update_graph(60.0, 0.0, WarmthMode::Simple),
            GraphOutcome::Deferred
        );
        assert_eq!(
            applier.update_graph(40.0, 10.0, WarmthMode::Cinematic),
            GraphOutcome::Deferred
        );

        doc.set_ready();
        assert_eq!(reloads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_resets_state_idempotently() {
        let doc = Arc::new(MemoryDocument::new());
        let mut applier = applier(doc.clone());

        applier.update_graph(40.0, 10.0, WarmthMode::Simple);
        applier.clear();
        assert!(applier.state().is_empty());
        assert!(doc.graph_markup().is_none());

        // Second clear is a no-op beyond the first
        applier.clear();
        assert!(applier.state().is_empty());
    }

    #[test]
    fn test_fractional_warmth_kept_in_state() {
        let doc = Arc::new(MemoryDocument::new());
        let mut applier = applier(doc);

        // Intensity-scaled warmth stays fractional; only the id rounds
        let outcome = applier.update_graph(0.0, 12.5, WarmthMode::Cinematic);
        assert_eq!(
            outcome.graph_id(),
            Some("video-enhancer-filter-c13-sh0")
        );
        assert_eq!(applier.state().warmth, Some(12.5));
    }
}
