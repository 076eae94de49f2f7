mod component;
mod layout;
mod render;
mod scene;
mod slot;
mod style;
mod types;

pub use component::GraphView;
pub use layout::LayoutKind;
#[cfg(test)]
pub(crate) use scene::GraphScene;
pub use types::{GraphData, GraphEdge, GraphNode};
