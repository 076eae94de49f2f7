use crate::api::CallGraph;
use crate::components::graph_view::{GraphData, GraphEdge, GraphNode, LayoutKind};
use crate::params::{CallDepth, CallDirection};

/// Layouts the call graph page offers.
pub const CALL_GRAPH_LAYOUTS: &[LayoutKind] = &[
	LayoutKind::Hierarchical,
	LayoutKind::ForceDirected,
	LayoutKind::Circular,
];

/// Arguments of one call graph request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallGraphQuery {
	pub id: String,
	pub depth: CallDepth,
	pub direction: CallDirection,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallGraphEvent {
	/// A function was picked in the search box.
	Search(String),
	NodeClicked(String),
	NodeDoubleClicked(String),
	/// "Explore Calls" in the detail panel.
	Explore(String),
	SetDepth(CallDepth),
	SetDirection(CallDirection),
	SetLayout(LayoutKind),
	Refresh,
	CloseDetail,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallGraphEffect {
	FetchGraph(CallGraphQuery),
	FetchDetail(String),
}

/// Root, selection and parameters of the call graph explorer.
#[derive(Clone, Debug, PartialEq)]
pub struct CallGraphController {
	pub root_id: Option<String>,
	pub selected_id: Option<String>,
	pub depth: CallDepth,
	pub direction: CallDirection,
	pub layout: LayoutKind,
}

impl Default for CallGraphController {
	fn default() -> Self {
		Self {
			root_id: None,
			selected_id: None,
			depth: CallDepth::saturating(2),
			direction: CallDirection::Both,
			layout: LayoutKind::Hierarchical,
		}
	}
}

impl CallGraphController {
	pub fn transition(mut self, event: CallGraphEvent) -> (Self, Option<CallGraphEffect>) {
		let effect = match event {
			CallGraphEvent::Search(id)
			| CallGraphEvent::NodeDoubleClicked(id)
			| CallGraphEvent::Explore(id) => {
				self.root_id = Some(id);
				self.selected_id = None;
				self.query().map(CallGraphEffect::FetchGraph)
			}
			CallGraphEvent::NodeClicked(id) => {
				self.selected_id = Some(id.clone());
				Some(CallGraphEffect::FetchDetail(id))
			}
			CallGraphEvent::SetDepth(depth) => {
				self.depth = depth;
				None
			}
			CallGraphEvent::SetDirection(direction) => {
				self.direction = direction;
				None
			}
			CallGraphEvent::SetLayout(layout) => {
				if CALL_GRAPH_LAYOUTS.contains(&layout) {
					self.layout = layout;
				}
				None
			}
			CallGraphEvent::Refresh => self.query().map(CallGraphEffect::FetchGraph),
			CallGraphEvent::CloseDetail => {
				self.selected_id = None;
				None
			}
		};
		(self, effect)
	}

	/// Request for the current root and parameters.
	pub fn query(&self) -> Option<CallGraphQuery> {
		self.root_id.as_ref().map(|id| CallGraphQuery {
			id: id.clone(),
			depth: self.depth,
			direction: self.direction,
		})
	}
}

/// Node diameter grows with cyclomatic complexity, capped at 60.
pub fn call_node_size(complexity: u32) -> f64 {
	20.0 + (complexity.max(1) as f64 * 3.0).min(40.0)
}

pub fn call_graph_data(graph: &CallGraph) -> GraphData {
	GraphData {
		nodes: graph
			.nodes
			.iter()
			.map(|n| GraphNode {
				id: n.id.clone(),
				label: n.label.clone(),
				group: Some(if n.is_root { "root" } else { "function" }.to_string()),
				size: Some(call_node_size(n.complexity)),
				color: None,
				is_root: n.is_root,
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
	use rstest::rstest;

	use super::*;
	use crate::api::{CallGraphEdge, CallGraphNode};
	use crate::components::graph_view::GraphScene;
	use crate::params::Choice;

	const PARSE_CONFIG: &str = "fn:main.parseConfig";

	fn explored() -> CallGraphController {
		CallGraphController::default()
			.transition(CallGraphEvent::Search(PARSE_CONFIG.into()))
			.0
	}

	fn parse_config_graph() -> CallGraph {
		let mut nodes = vec![CallGraphNode {
			id: PARSE_CONFIG.into(),
			label: "main.parseConfig".into(),
			complexity: 7,
			is_root: true,
			..CallGraphNode::default()
		}];
		let mut edges = Vec::new();
		for (i, name) in ["os.Getenv", "strconv.Atoi", "main.main", "fmt.Errorf", "main.init"]
			.into_iter()
			.enumerate()
		{
			let id = format!("fn:{name}");
			if i < 3 {
				edges.push(CallGraphEdge {
					source: PARSE_CONFIG.into(),
					target: id.clone(),
					kind: "call".into(),
				});
			} else {
				edges.push(CallGraphEdge {
					source: id.clone(),
					target: PARSE_CONFIG.into(),
					kind: "call".into(),
				});
			}
			nodes.push(CallGraphNode {
				id,
				label: name.into(),
				depth: 1,
				..CallGraphNode::default()
			});
		}
		CallGraph { nodes, edges }
	}

	#[test]
	fn selecting_parse_config_requests_its_neighborhood() {
		let (state, effect) =
			CallGraphController::default().transition(CallGraphEvent::Search(PARSE_CONFIG.into()));
		assert_eq!(
			effect,
			Some(CallGraphEffect::FetchGraph(CallGraphQuery {
				id: PARSE_CONFIG.into(),
				depth: CallDepth::new(2).unwrap(),
				direction: CallDirection::Both,
			}))
		);
		assert_eq!(state.root_id.as_deref(), Some(PARSE_CONFIG));
		assert_eq!(state.layout, LayoutKind::Hierarchical);
	}

	#[test]
	fn every_depth_and_direction_reaches_the_request() {
		for &depth in CallDepth::ALL {
			for &direction in CallDirection::ALL {
				let state = explored()
					.transition(CallGraphEvent::SetDepth(depth))
					.0
					.transition(CallGraphEvent::SetDirection(direction))
					.0;
				let (_, effect) = state.transition(CallGraphEvent::Refresh);
				assert_eq!(
					effect,
					Some(CallGraphEffect::FetchGraph(CallGraphQuery {
						id: PARSE_CONFIG.into(),
						depth,
						direction,
					}))
				);
			}
		}
	}

	#[rstest]
	#[case(CallGraphEvent::SetDepth(CallDepth::new(5).unwrap()))]
	#[case(CallGraphEvent::SetDirection(CallDirection::Callers))]
	#[case(CallGraphEvent::SetLayout(LayoutKind::Circular))]
	#[case(CallGraphEvent::CloseDetail)]
	fn parameter_changes_never_query(#[case] event: CallGraphEvent) {
		assert_eq!(explored().transition(event).1, None);
	}

	#[test]
	fn refresh_without_root_does_nothing() {
		let (state, effect) = CallGraphController::default().transition(CallGraphEvent::Refresh);
		assert_eq!(effect, None);
		assert_eq!(state, CallGraphController::default());
	}

	#[test]
	fn click_selects_without_moving_the_root() {
		let (state, effect) = explored().transition(CallGraphEvent::NodeClicked("fn:os.Getenv".into()));
		assert_eq!(
			effect,
			Some(CallGraphEffect::FetchDetail("fn:os.Getenv".into()))
		);
		assert_eq!(state.root_id.as_deref(), Some(PARSE_CONFIG));
		assert_eq!(state.selected_id.as_deref(), Some("fn:os.Getenv"));

		let (state, effect) = state.transition(CallGraphEvent::CloseDetail);
		assert_eq!(effect, None);
		assert_eq!(state.selected_id, None);
	}

	#[rstest]
	#[case(CallGraphEvent::NodeDoubleClicked("fn:main.main".into()))]
	#[case(CallGraphEvent::Explore("fn:main.main".into()))]
	fn recentering_moves_the_root_and_clears_selection(#[case] event: CallGraphEvent) {
		let state = explored()
			.transition(CallGraphEvent::NodeClicked("fn:os.Getenv".into()))
			.0
			.transition(CallGraphEvent::SetDepth(CallDepth::new(4).unwrap()))
			.0;
		let (state, effect) = state.transition(event);
		assert_eq!(state.root_id.as_deref(), Some("fn:main.main"));
		assert_eq!(state.selected_id, None);
		assert_eq!(
			effect,
			Some(CallGraphEffect::FetchGraph(CallGraphQuery {
				id: "fn:main.main".into(),
				depth: CallDepth::new(4).unwrap(),
				direction: CallDirection::Both,
			}))
		);
	}

	#[test]
	fn grid_layout_is_not_offered() {
		let (state, _) = explored().transition(CallGraphEvent::SetLayout(LayoutKind::Grid));
		assert_eq!(state.layout, LayoutKind::Hierarchical);
	}

	#[rstest]
	#[case(0, 23.0)]
	#[case(1, 23.0)]
	#[case(7, 41.0)]
	#[case(14, 60.0)]
	#[case(500, 60.0)]
	fn node_size_follows_complexity(#[case] complexity: u32, #[case] size: f64) {
		assert_eq!(call_node_size(complexity), size);
	}

	#[test]
	fn parse_config_renders_six_nodes_with_emphasized_root() {
		let scene = GraphScene::build(
			&call_graph_data(&parse_config_graph()),
			explored().layout,
			800.0,
			600.0,
		);
		assert_eq!(scene.nodes.len(), 6);
		assert_eq!(scene.edges.len(), 5);
		let root = scene.node(PARSE_CONFIG).unwrap();
		assert!(root.style.emphasized);
		assert_eq!(scene.nodes.iter().filter(|n| n.style.emphasized).count(), 1);
	}

	#[test]
	fn root_and_neighbors_map_to_six_nodes() {
		let data = call_graph_data(&parse_config_graph());
		assert_eq!(data.nodes.len(), 6);
		assert_eq!(data.edges.len(), 5);
		let roots: Vec<_> = data.nodes.iter().filter(|n| n.is_root).collect();
		assert_eq!(roots.len(), 1);
		assert_eq!(roots[0].group.as_deref(), Some("root"));
		assert!(
			data.nodes
				.iter()
				.filter(|n| !n.is_root)
				.all(|n| n.group.as_deref() == Some("function"))
		);
	}
}
