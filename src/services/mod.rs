pub mod controller;
pub mod debounce;
pub mod document;
pub mod graph_cache;
pub mod storage;
pub mod style;

pub use controller::EnhancerController;
pub use debounce::Debouncer;
pub use document::{AddedNode, MemoryDocument, MutationBatch, PageDocument};
pub use graph_cache::{FilterState, GraphApplier, GraphOutcome};
pub use storage::{JsonFileStore, MemoryStore, SettingsStore, StorageArea, StorageChange};
pub use style::StyleInjector;
