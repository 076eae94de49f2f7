/// Node handed to the renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	pub group: Option<String>,
	pub size: Option<f64>,
	pub color: Option<String>,
	pub is_root: bool,
}

/// Edge handed to the renderer. Endpoints that are not node ids drop the edge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	pub label: Option<String>,
	pub color: Option<String>,
}

impl GraphEdge {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			..Self::default()
		}
	}
}

/// One complete snapshot. A new query result replaces it wholesale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl GraphData {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
