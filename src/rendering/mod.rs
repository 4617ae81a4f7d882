pub mod css;
pub mod graph;
pub mod sharpen;
pub mod stages;
pub mod warmth;

pub use css::build_filter_string;
pub use graph::{filter_graph_id, needs_graph, FilterGraph};
pub use stages::Primitive;
