//! Reactive reconciliation controller.
//!
//! Orchestrates one reconciliation cycle (read settings, synthesize
//! filters, apply through the document boundary) and wires it to the
//! three triggers: initial load, storage changes, and video-bearing
//! DOM mutations. Mutation bursts pass through a debounce so page
//! navigation and infinite-scroll insertions collapse into a single
//! cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::models::EnhancerConfig;
use crate::rendering::build_filter_string;
use crate::services::debounce::Debouncer;
use crate::services::document::PageDocument;
use crate::services::graph_cache::{FilterState, GraphApplier, ReloadHook};
use crate::services::storage::{SettingsStore, StorageArea};
use crate::services::style::StyleInjector;

/// Delay collapsing mutation bursts into one reconciliation.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(100);

pub struct EnhancerController {
    store: Arc<dyn SettingsStore>,
    document: Arc<dyn PageDocument>,
    applier: Mutex<GraphApplier>,
    injector: StyleInjector,
    debouncer: Debouncer,
    initialized: AtomicBool,
}

impl EnhancerController {
    /// Build a controller over a settings store and a document.
    ///
    /// Deferred graph installs and debounced mutation triggers both
    /// resolve into a full reload, so every path converges on the same
    /// reconciliation.
    pub fn new(store: Arc<dyn SettingsStore>, document: Arc<dyn PageDocument>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let reload: ReloadHook = {
                let weak = weak.clone();
                Arc::new(move || {
                    if let Some(controller) = weak.upgrade() {
                        tokio::spawn(async move {
                            controller.load_and_apply().await;
                        });
                    }
                })
            };

            Self {
                store,
                document: document.clone(),
                applier: Mutex::new(GraphApplier::new(document.clone(), reload.clone())),
                injector: StyleInjector::new(document),
                debouncer: Debouncer::new(DEBOUNCE_DELAY, reload),
                initialized: AtomicBool::new(false),
            }
        })
    }

    /// Start the reactive loop: initial load, storage-change
    /// subscription, and mutation observation.
    pub fn start(self: &Arc<Self>) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.load_and_apply().await;
        });

        let weak = Arc::downgrade(self);
        let mut storage_rx = self.store.subscribe();
        tokio::spawn(async move {
            loop {
                match storage_rx.recv().await {
                    Ok(change) => {
                        if change.area != StorageArea::Local {
                            continue;
                        }
                        let Some(controller) = weak.upgrade() else {
                            break;
                        };
                        controller.load_and_apply().await;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Storage change notifications lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let weak = Arc::downgrade(self);
        let mut mutation_rx = self.document.mutations();
        tokio::spawn(async move {
            loop {
                match mutation_rx.recv().await {
                    Ok(batch) => {
                        let Some(controller) = weak.upgrade() else {
                            break;
                        };
                        if batch.has_video() {
                            controller.debouncer.trigger();
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Mutation batches lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// One full reconciliation: read settings, then apply.
    ///
    /// A storage-read failure is recovered by applying the built-in
    /// neutral defaults, so the page is never left in an undefined
    /// visual state.
    pub async fn load_and_apply(&self) {
        match self.store.get().await {
            Ok(stored) => self.apply_config(&stored.resolve()).await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read settings, applying defaults");
                self.apply_config(&EnhancerConfig::default()).await;
            }
        }
    }

    /// Apply a resolved configuration to the document.
    pub async fn apply_config(&self, config: &EnhancerConfig) {
        if !config.enabled {
            self.remove_filters().await;
            return;
        }

        let params = config.active_params();
        let intensity = if params.intensity.is_finite() {
            params.intensity / 100.0
        } else {
            1.0
        };
        let warmth = if params.warmth.is_finite() {
            params.warmth * intensity
        } else {
            0.0
        };

        let outcome = self
            .applier
            .lock()
            .await
            .update_graph(params.sharpness, warmth, params.warmth_mode);

        let filter_value = build_filter_string(&params, outcome.graph_id());
        self.injector.apply(&filter_value);
        self.initialized.store(true, Ordering::SeqCst);

        tracing::debug!(
            preset = %config.active_preset,
            filter = %filter_value,
            "Applied enhancement filters"
        );
    }

    /// Remove the stylesheet and the graph container and reset the
    /// runtime filter state. Idempotent: repeated calls are no-ops
    /// beyond the first.
    pub async fn remove_filters(&self) {
        self.injector.remove();
        self.applier.lock().await.clear();
        tracing::debug!("Removed enhancement filters");
    }

    /// Whether at least one reconciliation has applied successfully.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Snapshot of the applier's runtime filter state.
    pub async fn filter_state(&self) -> FilterState {
        self.applier.lock().await.state()
    }
}
