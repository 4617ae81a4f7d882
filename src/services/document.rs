//! Narrow document boundary.
//!
//! The engine drives its rendering target through this interface:
//! install/remove one filter-graph container, install/remove one
//! stylesheet, query readiness, and observe added nodes. A browser
//! bridge implements it against the real DOM; [`MemoryDocument`] is the
//! in-crate implementation used by the harness and tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Id of the singleton stylesheet element.
pub const STYLE_ELEMENT_ID: &str = "firefox-hdr-optimizer-style";

/// Id of the singleton hidden container holding the SVG filter graph.
pub const GRAPH_CONTAINER_ID: &str = "video-enhancer-svg-container";

/// One-shot callback fired when the document becomes ready.
pub type ReadyCallback = Box<dyn FnOnce() + Send>;

/// A node added to the document, as seen by mutation observation.
#[derive(Debug, Clone)]
pub struct AddedNode {
    pub tag: String,
    pub contains_video: bool,
}

impl AddedNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            contains_video: false,
        }
    }

    pub fn video() -> Self {
        Self::element("video")
    }

    pub fn with_video(mut self) -> Self {
        self.contains_video = true;
        self
    }

    /// Whether this node is a video element or wraps one.
    pub fn is_video_bearing(&self) -> bool {
        self.tag.eq_ignore_ascii_case("video") || self.contains_video
    }
}

/// A burst of added nodes delivered in one observation callback.
#[derive(Debug, Clone)]
pub struct MutationBatch {
    pub added: Vec<AddedNode>,
}

impl MutationBatch {
    /// Short-circuits on the first video-bearing node.
    pub fn has_video(&self) -> bool {
        self.added.iter().any(AddedNode::is_video_bearing)
    }
}

/// The document operations the engine needs; nothing more.
///
/// All install operations are wholesale replacements of the singleton
/// element's content, never appends.
pub trait PageDocument: Send + Sync {
    /// Whether the document body exists yet.
    fn is_ready(&self) -> bool;

    /// Register a one-shot callback for readiness. Fires immediately
    /// if the document is already ready.
    fn on_ready(&self, callback: ReadyCallback);

    /// Replace the graph container's contents with the given markup,
    /// creating the container on first use.
    fn install_graph(&self, markup: &str);

    /// Remove the graph container entirely. No-op if absent.
    fn remove_graph(&self);

    /// Overwrite the singleton stylesheet's text, creating the element
    /// on first use.
    fn install_stylesheet(&self, css: &str);

    /// Remove the stylesheet element entirely. No-op if absent.
    fn remove_stylesheet(&self);

    /// Subscribe to added-node batches. Nothing is emitted before the
    /// document is ready.
    fn mutations(&self) -> broadcast::Receiver<MutationBatch>;
}

/// In-memory document for the native harness and tests.
///
/// Records installed markup and counts install calls so idempotence
/// can be asserted.
pub struct MemoryDocument {
    ready: AtomicBool,
    graph: Mutex<Option<String>>,
    stylesheet: Mutex<Option<String>>,
    graph_installs: AtomicUsize,
    stylesheet_writes: AtomicUsize,
    ready_callbacks: Mutex<Vec<ReadyCallback>>,
    mutation_sender: broadcast::Sender<MutationBatch>,
}

impl MemoryDocument {
    /// A document whose body is already available.
    pub fn new() -> Self {
        Self::with_readiness(true)
    }

    /// A document still waiting for its body; flip with [`set_ready`].
    ///
    /// [`set_ready`]: MemoryDocument::set_ready
    pub fn deferred() -> Self {
        Self::with_readiness(false)
    }

    fn with_readiness(ready: bool) -> Self {
        let (mutation_sender, _) = broadcast::channel(16);
        Self {
            ready: AtomicBool::new(ready),
            graph: Mutex::new(None),
            stylesheet: Mutex::new(None),
            graph_installs: AtomicUsize::new(0),
            stylesheet_writes: AtomicUsize::new(0),
            ready_callbacks: Mutex::new(Vec::new()),
            mutation_sender,
        }
    }

    /// Mark the document ready and fire deferred callbacks, each once.
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        let callbacks = {
            let mut pending = self.ready_callbacks.lock().expect("lock poisoned");
            std::mem::take(&mut *pending)
        };
        for callback in callbacks {
            callback();
        }
    }

    /// Deliver a batch of added nodes to mutation subscribers.
    ///
    /// Dropped silently while the document is not ready, mirroring
    /// observation starting at document-ready.
    pub fn insert_nodes(&self, added: Vec<AddedNode>) {
        if !self.is_ready() {
            return;
        }
        let _ = self.mutation_sender.send(MutationBatch { added });
    }

    /// Currently installed graph markup, if any.
    pub fn graph_markup(&self) -> Option<String> {
        self.graph.lock().expect("lock poisoned").clone()
    }

    /// Current stylesheet text, if any.
    pub fn stylesheet(&self) -> Option<String> {
        self.stylesheet.lock().expect("lock poisoned").clone()
    }

    /// How many times graph content was (re)installed.
    pub fn graph_install_count(&self) -> usize {
        self.graph_installs.load(Ordering::SeqCst)
    }

    /// How many times the stylesheet text was overwritten.
    pub fn stylesheet_write_count(&self) -> usize {
        self.stylesheet_writes.load(Ordering::SeqCst)
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PageDocument for MemoryDocument {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn on_ready(&self, callback: ReadyCallback) {
        if self.is_ready() {
            callback();
            return;
        }
        self.ready_callbacks
            .lock()
            .expect("lock poisoned")
            .push(callback);
    }

    fn install_graph(&self, markup: &str) {
        *self.graph.lock().expect("lock poisoned") = Some(markup.to_string());
        self.graph_installs.fetch_add(1, Ordering::SeqCst);
    }

    fn remove_graph(&self) {
        *self.graph.lock().expect("lock poisoned") = None;
    }

    fn install_stylesheet(&self, css: &str) {
        *self.stylesheet.lock().expect("lock poisoned") = Some(css.to_string());
        self.stylesheet_writes.fetch_add(1, Ordering::SeqCst);
    }

    fn remove_stylesheet(&self) {
        *self.stylesheet.lock().expect("lock poisoned") = None;
    }

    fn mutations(&self) -> broadcast::Receiver<MutationBatch> {
        self.mutation_sender.subscribe()
    }
}
