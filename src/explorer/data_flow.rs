use crate::api::{DataFlowGraph, DataFlowNode};
use crate::components::graph_view::{GraphData, GraphEdge, GraphNode, LayoutKind};
use crate::params::{FlowDepth, FlowDirection};

pub const DATA_FLOW_LAYOUTS: &[LayoutKind] = &[
	LayoutKind::Hierarchical,
	LayoutKind::ForceDirected,
	LayoutKind::Circular,
];

/// Node kinds with a fixed color, in legend order.
pub const FLOW_KIND_COLORS: &[(&str, &str)] = &[
	("parameter", "#d29922"),
	("return", "#f778ba"),
	("local", "#8b949e"),
	("call", "#58a6ff"),
	("function", "#58a6ff"),
	("field", "#bc8cff"),
];

const FALLBACK_KIND_COLOR: &str = "#8b949e";

pub fn flow_kind_color(kind: &str) -> &'static str {
	FLOW_KIND_COLORS
		.iter()
		.find(|(k, _)| *k == kind)
		.map_or(FALLBACK_KIND_COLOR, |(_, color)| color)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataFlowQuery {
	pub id: String,
	pub depth: FlowDepth,
	pub direction: FlowDirection,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DataFlowEvent {
	Search(String),
	NodeClicked(String),
	NodeDoubleClicked(String),
	SetDepth(FlowDepth),
	SetDirection(FlowDirection),
	SetLayout(LayoutKind),
	Refresh,
	CloseDetail,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DataFlowEffect {
	FetchGraph(DataFlowQuery),
}

/// Slice origin, selection and parameters of the data-flow explorer. A selected
/// node's details come from the loaded slice, so selecting has no effect.
#[derive(Clone, Debug, PartialEq)]
pub struct DataFlowController {
	pub root_id: Option<String>,
	pub selected_id: Option<String>,
	pub depth: FlowDepth,
	pub direction: FlowDirection,
	pub layout: LayoutKind,
}

impl Default for DataFlowController {
	fn default() -> Self {
		Self {
			root_id: None,
			selected_id: None,
			depth: FlowDepth::saturating(3),
			direction: FlowDirection::Forward,
			layout: LayoutKind::Hierarchical,
		}
	}
}

impl DataFlowController {
	pub fn transition(mut self, event: DataFlowEvent) -> (Self, Option<DataFlowEffect>) {
		let effect = match event {
			DataFlowEvent::Search(id) | DataFlowEvent::NodeDoubleClicked(id) => {
				self.root_id = Some(id);
				self.selected_id = None;
				self.query().map(DataFlowEffect::FetchGraph)
			}
			DataFlowEvent::NodeClicked(id) => {
				self.selected_id = Some(id);
				None
			}
			DataFlowEvent::SetDepth(depth) => {
				self.depth = depth;
				None
			}
			DataFlowEvent::SetDirection(direction) => {
				self.direction = direction;
				None
			}
			DataFlowEvent::SetLayout(layout) => {
				if DATA_FLOW_LAYOUTS.contains(&layout) {
					self.layout = layout;
				}
				None
			}
			DataFlowEvent::Refresh => self.query().map(DataFlowEffect::FetchGraph),
			DataFlowEvent::CloseDetail => {
				self.selected_id = None;
				None
			}
		};
		(self, effect)
	}

	pub fn query(&self) -> Option<DataFlowQuery> {
		self.root_id.as_ref().map(|id| DataFlowQuery {
			id: id.clone(),
			depth: self.depth,
			direction: self.direction,
		})
	}

	/// The selected node as found in `graph`.
	pub fn selected<'a>(&self, graph: &'a DataFlowGraph) -> Option<&'a DataFlowNode> {
		let id = self.selected_id.as_deref()?;
		graph.nodes.iter().find(|n| n.id == id)
	}
}

pub fn data_flow_data(graph: &DataFlowGraph) -> GraphData {
	GraphData {
		nodes: graph
			.nodes
			.iter()
			.map(|n| GraphNode {
				id: n.id.clone(),
				label: format!("{} ({})", n.label, n.kind),
				group: Some(n.kind.clone()),
				size: Some(if n.depth == 0 { 40.0 } else { 25.0 }),
				color: Some(flow_kind_color(&n.kind).to_string()),
				is_root: n.depth == 0,
			})
			.collect(),
		edges: graph
			.edges
			.iter()
			.map(|e| GraphEdge::new(e.source.clone(), e.target.clone()))
			.collect(),
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;
	use rstest::rstest;

	use super::*;
	use crate::api::DataFlowEdge;
	use crate::params::Choice;

	fn flow_node(id: &str, kind: &str, depth: u32) -> DataFlowNode {
		DataFlowNode {
			id: id.into(),
			label: id.into(),
			kind: kind.into(),
			file: "main.go".into(),
			line: 10 + depth,
			depth,
		}
	}

	fn slice() -> DataFlowGraph {
		DataFlowGraph {
			nodes: vec![
				flow_node("cfg", "parameter", 0),
				flow_node("port", "local", 1),
				flow_node("ret", "return", 2),
			],
			edges: vec![
				DataFlowEdge {
					source: "cfg".into(),
					target: "port".into(),
				},
				DataFlowEdge {
					source: "port".into(),
					target: "ret".into(),
				},
			],
		}
	}

	fn traced() -> DataFlowController {
		DataFlowController::default()
			.transition(DataFlowEvent::Search("cfg".into()))
			.0
	}

	#[test]
	fn search_uses_default_depth_and_direction() {
		let (_, effect) =
			DataFlowController::default().transition(DataFlowEvent::Search("cfg".into()));
		assert_eq!(
			effect,
			Some(DataFlowEffect::FetchGraph(DataFlowQuery {
				id: "cfg".into(),
				depth: FlowDepth::new(3).unwrap(),
				direction: FlowDirection::Forward,
			}))
		);
	}

	#[test]
	fn every_depth_and_direction_reaches_the_request() {
		for &depth in FlowDepth::ALL {
			for &direction in FlowDirection::ALL {
				let (state, first) = traced().transition(DataFlowEvent::SetDepth(depth));
				let (state, second) = state.transition(DataFlowEvent::SetDirection(direction));
				assert_eq!((first, second), (None, None));
				assert_eq!(
					state.transition(DataFlowEvent::Refresh).1,
					Some(DataFlowEffect::FetchGraph(DataFlowQuery {
						id: "cfg".into(),
						depth,
						direction,
					}))
				);
			}
		}
	}

	#[test]
	fn click_resolves_detail_from_the_slice() {
		let graph = slice();
		let (state, effect) = traced().transition(DataFlowEvent::NodeClicked("port".into()));
		assert_eq!(effect, None);
		let node = state.selected(&graph).unwrap();
		assert_eq!(node.kind, "local");
		assert_eq!(node.line, 11);

		let (state, _) = state.transition(DataFlowEvent::NodeClicked("gone".into()));
		assert_eq!(state.selected(&graph), None);
	}

	#[test]
	fn double_click_retraces_from_the_node() {
		let (state, effect) = traced()
			.transition(DataFlowEvent::SetDirection(FlowDirection::Backward))
			.0
			.transition(DataFlowEvent::NodeDoubleClicked("ret".into()));
		assert_eq!(state.root_id.as_deref(), Some("ret"));
		assert_eq!(
			effect,
			Some(DataFlowEffect::FetchGraph(DataFlowQuery {
				id: "ret".into(),
				depth: FlowDepth::new(3).unwrap(),
				direction: FlowDirection::Backward,
			}))
		);
	}

	#[rstest]
	#[case("parameter", "#d29922")]
	#[case("return", "#f778ba")]
	#[case("call", "#58a6ff")]
	#[case("function", "#58a6ff")]
	#[case("field", "#bc8cff")]
	#[case("phi", "#8b949e")]
	fn kind_palette(#[case] kind: &str, #[case] color: &str) {
		assert_eq!(flow_kind_color(kind), color);
	}

	#[test]
	fn origin_is_large_and_root_like() {
		let data = data_flow_data(&slice());
		let origin = &data.nodes[0];
		assert!(origin.is_root);
		assert_eq!(origin.size, Some(40.0));
		assert_eq!(origin.label, "cfg (parameter)");
		assert!(data.nodes[1..].iter().all(|n| !n.is_root && n.size == Some(25.0)));
	}

	proptest! {
		#[test]
		fn parameter_nodes_are_always_amber(label in ".*", depth in 0u32..10) {
			let graph = DataFlowGraph {
				nodes: vec![DataFlowNode {
					id: "p".into(),
					label,
					kind: "parameter".into(),
					depth,
					..DataFlowNode::default()
				}],
				edges: Vec::new(),
			};
			let data = data_flow_data(&graph);
			prop_assert_eq!(data.nodes[0].color.as_deref(), Some("#d29922"));
		}
	}
}
