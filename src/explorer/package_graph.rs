use std::collections::{HashSet, VecDeque};

use crate::api::{PackageGraph, PackageGraphNode};
use crate::components::graph_view::{GraphData, GraphEdge, GraphNode, LayoutKind};
use crate::params::{Choice, PackageDepth, PackageDirection};

pub const PACKAGE_LAYOUTS: &[LayoutKind] = LayoutKind::ALL;

/// Functions listed for a selected package.
pub const PACKAGE_FUNCTION_LIMIT: u32 = 50;

/// Neighborhood shown on the package map. Without a focus the whole graph is shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageView {
	pub focus: Option<String>,
	pub depth: PackageDepth,
	pub direction: PackageDirection,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PackageEvent {
	/// A package was picked in the search box.
	Search(String),
	NodeClicked(String),
	NodeDoubleClicked(String),
	ClearFocus,
	SetDepth(PackageDepth),
	SetDirection(PackageDirection),
	SetLayout(LayoutKind),
	Refresh,
	CloseDetail,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PackageEffect {
	/// Re-fetch the package graph; `applied` already holds the view to show with it.
	FetchGraph,
	FetchFunctions(String),
}

/// Focus, selection and parameters of the package map.
///
/// `applied` is the view captured when the graph was last requested. Editing depth or
/// direction leaves it alone until the next request.
#[derive(Clone, Debug, PartialEq)]
pub struct PackageController {
	pub focus_id: Option<String>,
	pub selected_id: Option<String>,
	pub depth: PackageDepth,
	pub direction: PackageDirection,
	pub layout: LayoutKind,
	pub applied: PackageView,
}

impl Default for PackageController {
	fn default() -> Self {
		let (depth, direction) = (PackageDepth::saturating(1), PackageDirection::Both);
		Self {
			focus_id: None,
			selected_id: None,
			depth,
			direction,
			layout: LayoutKind::ForceDirected,
			applied: PackageView {
				focus: None,
				depth,
				direction,
			},
		}
	}
}

impl PackageController {
	pub fn transition(mut self, event: PackageEvent) -> (Self, Option<PackageEffect>) {
		let effect = match event {
			PackageEvent::Search(name) | PackageEvent::NodeDoubleClicked(name) => {
				self.focus_id = Some(name);
				self.selected_id = None;
				Some(self.issue())
			}
			PackageEvent::ClearFocus => {
				self.focus_id = None;
				Some(self.issue())
			}
			PackageEvent::Refresh => Some(self.issue()),
			PackageEvent::NodeClicked(name) => {
				self.selected_id = Some(name.clone());
				Some(PackageEffect::FetchFunctions(name))
			}
			PackageEvent::SetDepth(depth) => {
				self.depth = depth;
				None
			}
			PackageEvent::SetDirection(direction) => {
				self.direction = direction;
				None
			}
			PackageEvent::SetLayout(layout) => {
				if PACKAGE_LAYOUTS.contains(&layout) {
					self.layout = layout;
				}
				None
			}
			PackageEvent::CloseDetail => {
				self.selected_id = None;
				None
			}
		};
		(self, effect)
	}

	fn issue(&mut self) -> PackageEffect {
		self.applied = PackageView {
			focus: self.focus_id.clone(),
			depth: self.depth,
			direction: self.direction,
		};
		PackageEffect::FetchGraph
	}

	pub fn selected<'a>(&self, graph: &'a PackageGraph) -> Option<&'a PackageGraphNode> {
		let id = self.selected_id.as_deref()?;
		graph.nodes.iter().find(|n| n.id == id)
	}
}

/// Ids within `view.depth` hops of the focus, following dependency edges the way
/// `view.direction` says. `None` when the view has no focus.
pub fn neighborhood(graph: &PackageGraph, view: &PackageView) -> Option<HashSet<String>> {
	let focus = view.focus.as_deref()?;
	let mut reached: HashSet<String> = HashSet::new();
	if !graph.nodes.iter().any(|n| n.id == focus) {
		return Some(reached);
	}

	let (forward, backward) = match view.direction {
		PackageDirection::Both => (true, true),
		PackageDirection::Dependencies => (true, false),
		PackageDirection::Dependents => (false, true),
	};
	reached.insert(focus.to_string());
	let mut queue = VecDeque::from([(focus.to_string(), 0u8)]);
	while let Some((id, hops)) = queue.pop_front() {
		if hops == view.depth.get() {
			continue;
		}
		for e in &graph.edges {
			let next = if forward && e.source == id {
				&e.target
			} else if backward && e.target == id {
				&e.source
			} else {
				continue;
			};
			if reached.insert(next.clone()) {
				queue.push_back((next.clone(), hops + 1));
			}
		}
	}
	Some(reached)
}

pub fn package_node_size(total_complexity: u32) -> f64 {
	20.0 + ((total_complexity.max(1) as f64).sqrt() * 3.0).min(50.0)
}

pub fn package_graph_data(graph: &PackageGraph, view: &PackageView) -> GraphData {
	let keep = neighborhood(graph, view);
	let kept = |id: &str| keep.as_ref().is_none_or(|k| k.contains(id));
	let focus = view.focus.as_deref();

	GraphData {
		nodes: graph
			.nodes
			.iter()
			.filter(|n| kept(n.id.as_str()))
			.map(|n| GraphNode {
				id: n.id.clone(),
				label: n.label.clone(),
				group: Some("package".to_string()),
				size: Some(package_node_size(n.total_complexity)),
				color: None,
				is_root: focus == Some(n.id.as_str()),
			})
			.collect(),
		edges: graph
			.edges
			.iter()
			.filter(|e| kept(e.source.as_str()) && kept(e.target.as_str()))
			.map(|e| GraphEdge::new(e.source.clone(), e.target.clone()))
			.collect(),
	}
}
