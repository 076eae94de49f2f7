//! Layout strategies. Positions are computed to completion up front; the scene only
//! tweens toward them.

use std::collections::VecDeque;
use std::f64::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::params::{Choice, choice_enum};

/// Hierarchical layouts animate only below this many nodes.
pub const HIERARCHICAL_ANIMATE_BELOW: usize = 100;
/// Force-directed layouts animate only below this many nodes.
pub const FORCE_ANIMATE_BELOW: usize = 150;

const SIM_STEP: f32 = 0.016;

choice_enum! {
	/// Layout strategy, selected by name.
	#[derive(Default)]
	LayoutKind {
		/// Ranked left-to-right.
		#[default]
		Hierarchical => ("hierarchical", "Hierarchical"),
		/// Physics simulation.
		ForceDirected => ("force-directed", "Force-Directed"),
		/// Evenly spaced on a circle.
		Circular => ("circular", "Circle"),
		/// Row-major grid.
		Grid => ("grid", "Grid"),
	}
}

/// Trade-off between force layout quality and the time spent computing it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Quality {
	Draft,
	#[default]
	Default,
	Proof,
}

impl Quality {
	/// Full quality while the graph is small enough to animate, cheaper above that.
	pub fn for_node_count(node_count: usize) -> Self {
		if node_count < FORCE_ANIMATE_BELOW {
			Self::Proof
		} else if node_count < 400 {
			Self::Default
		} else {
			Self::Draft
		}
	}

	pub fn steps(self) -> usize {
		match self {
			Self::Draft => 60,
			Self::Default => 150,
			Self::Proof => 300,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
	pub node_repulsion: f64,
	pub ideal_edge_length: f64,
	pub gravity: f64,
	pub quality: Quality,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Strategy {
	Hierarchical { node_sep: f64, rank_sep: f64 },
	ForceDirected(ForceParams),
	Circular,
	Grid,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
	pub strategy: Strategy,
	pub animate: bool,
	pub animation_ms: f64,
}

impl LayoutKind {
	pub fn params(self, node_count: usize) -> LayoutParams {
		match self {
			Self::Hierarchical => LayoutParams {
				strategy: Strategy::Hierarchical {
					node_sep: 40.0,
					rank_sep: 80.0,
				},
				animate: node_count < HIERARCHICAL_ANIMATE_BELOW,
				animation_ms: 300.0,
			},
			Self::ForceDirected => LayoutParams {
				strategy: Strategy::ForceDirected(ForceParams {
					node_repulsion: 8000.0,
					ideal_edge_length: 120.0,
					gravity: 0.3,
					quality: Quality::for_node_count(node_count),
				}),
				animate: node_count < FORCE_ANIMATE_BELOW,
				animation_ms: 400.0,
			},
			Self::Circular => LayoutParams {
				strategy: Strategy::Circular,
				animate: true,
				animation_ms: 300.0,
			},
			Self::Grid => LayoutParams {
				strategy: Strategy::Grid,
				animate: true,
				animation_ms: 300.0,
			},
		}
	}
}

/// What a strategy needs to know about the graph: node diameters and edges as
/// index pairs.
#[derive(Clone, Debug, Default)]
pub struct LayoutInput {
	pub sizes: Vec<f64>,
	pub edges: Vec<(usize, usize)>,
}

impl LayoutInput {
	fn len(&self) -> usize {
		self.sizes.len()
	}

	fn max_size(&self) -> f64 {
		self.sizes.iter().copied().fold(0.0, f64::max)
	}
}

impl LayoutParams {
	/// Positions centered on the origin, one per node.
	pub fn positions(&self, input: &LayoutInput) -> Vec<(f64, f64)> {
		if input.len() == 0 {
			return Vec::new();
		}
		let positions = match self.strategy {
			Strategy::Hierarchical { node_sep, rank_sep } => {
				hierarchical(input, node_sep, rank_sep)
			}
			Strategy::ForceDirected(params) => force_directed(input, &params),
			Strategy::Circular => circular(input),
			Strategy::Grid => grid(input),
		};
		center(positions)
	}
}

fn center(mut positions: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
	let (min_x, max_x, min_y, max_y) = bounds(&positions);
	let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
	for p in &mut positions {
		p.0 -= cx;
		p.1 -= cy;
	}
	positions
}

pub fn bounds(positions: &[(f64, f64)]) -> (f64, f64, f64, f64) {
	positions.iter().fold(
		(f64::MAX, f64::MIN, f64::MAX, f64::MIN),
		|(x0, x1, y0, y1), &(x, y)| (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
	)
}

/// Longest-path ranks over the graph with DFS back edges removed.
fn ranks(n: usize, edges: &[(usize, usize)]) -> Vec<usize> {
	let mut out = vec![Vec::new(); n];
	for &(s, t) in edges {
		if s != t {
			out[s].push(t);
		}
	}

	// 0 = unvisited, 1 = on stack, 2 = done
	let mut color = vec![0u8; n];
	let mut forward = vec![Vec::new(); n];
	for start in 0..n {
		if color[start] != 0 {
			continue;
		}
		let mut stack = vec![(start, 0usize)];
		color[start] = 1;
		while let Some(top) = stack.last_mut() {
			let v = top.0;
			if let Some(&w) = out[v].get(top.1) {
				top.1 += 1;
				match color[w] {
					0 => {
						forward[v].push(w);
						color[w] = 1;
						stack.push((w, 0));
					}
					2 => forward[v].push(w),
					_ => {} // back edge
				}
			} else {
				color[v] = 2;
				stack.pop();
			}
		}
	}

	let mut indegree = vec![0usize; n];
	for targets in &forward {
		for &t in targets {
			indegree[t] += 1;
		}
	}
	let mut rank = vec![0usize; n];
	let mut queue: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
	while let Some(v) = queue.pop_front() {
		for &t in &forward[v] {
			rank[t] = rank[t].max(rank[v] + 1);
			indegree[t] -= 1;
			if indegree[t] == 0 {
				queue.push_back(t);
			}
		}
	}
	rank
}

fn hierarchical(input: &LayoutInput, node_sep: f64, rank_sep: f64) -> Vec<(f64, f64)> {
	let n = input.len();
	let rank = ranks(n, &input.edges);
	let rank_count = rank.iter().max().map_or(1, |r| r + 1);

	let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
	for v in 0..n {
		layers[rank[v]].push(v);
	}

	// One barycenter sweep: order each layer by the mean slot of its predecessors.
	let mut slot = vec![0.0f64; n];
	for (i, &v) in layers[0].iter().enumerate() {
		slot[v] = i as f64;
	}
	for r in 1..rank_count {
		let mut keyed: Vec<(f64, usize)> = layers[r]
			.iter()
			.enumerate()
			.map(|(i, &v)| {
				let preds: Vec<f64> = input
					.edges
					.iter()
					.filter(|&&(s, t)| t == v && rank[s] < r)
					.map(|&(s, _)| slot[s])
					.collect();
				let key = if preds.is_empty() {
					i as f64
				} else {
					preds.iter().sum::<f64>() / preds.len() as f64
				};
				(key, v)
			})
			.collect();
		keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
		layers[r] = keyed.into_iter().map(|(_, v)| v).collect();
		for (i, &v) in layers[r].iter().enumerate() {
			slot[v] = i as f64;
		}
	}

	let column = input.max_size() + rank_sep;
	let mut positions = vec![(0.0, 0.0); n];
	for (r, layer) in layers.iter().enumerate() {
		let extent: f64 = layer.iter().map(|&v| input.sizes[v] + node_sep).sum::<f64>() - node_sep;
		let mut y = -extent / 2.0;
		for &v in layer {
			let size = input.sizes[v];
			positions[v] = (r as f64 * column, y + size / 2.0);
			y += size + node_sep;
		}
	}
	positions
}

fn force_directed(input: &LayoutInput, params: &ForceParams) -> Vec<(f64, f64)> {
	let n = input.len();
	let mut graph: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
		force_charge: (params.node_repulsion / 50.0) as f32,
		force_spring: (6.0 / params.ideal_edge_length) as f32,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	});

	let seed_radius = params.ideal_edge_length.max(n as f64 * 4.0);
	let indices: Vec<_> = (0..n)
		.map(|i| {
			let angle = (i as f64) * 2.0 * PI / n as f64;
			graph.add_node(NodeData {
				x: (seed_radius * angle.cos()) as f32,
				y: (seed_radius * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: i,
			})
		})
		.collect();
	for &(s, t) in &input.edges {
		if s != t {
			graph.add_edge(indices[s], indices[t], EdgeData::default());
		}
	}

	let pull = (params.gravity * f64::from(SIM_STEP)) as f32;
	for _ in 0..params.quality.steps() {
		graph.update(SIM_STEP);
		graph.visit_nodes_mut(|node| {
			node.data.x -= node.data.x * pull;
			node.data.y -= node.data.y * pull;
		});
	}

	let mut positions = vec![(0.0, 0.0); n];
	graph.visit_nodes(|node| {
		positions[node.data.user_data] = (node.x() as f64, node.y() as f64);
	});
	positions
}

fn circular(input: &LayoutInput) -> Vec<(f64, f64)> {
	let n = input.len();
	if n == 1 {
		return vec![(0.0, 0.0)];
	}
	let radius = (n as f64 * (input.max_size() + 10.0) / (2.0 * PI)).max(80.0);
	(0..n)
		.map(|i| {
			let angle = -PI / 2.0 + (i as f64) * 2.0 * PI / n as f64;
			(radius * angle.cos(), radius * angle.sin())
		})
		.collect()
}

fn grid(input: &LayoutInput) -> Vec<(f64, f64)> {
	let n = input.len();
	let cols = (n as f64).sqrt().ceil() as usize;
	let cell = input.max_size() + 30.0;
	(0..n)
		.map(|i| ((i % cols) as f64 * cell, (i / cols) as f64 * cell))
		.collect()
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	fn chain(n: usize) -> LayoutInput {
		LayoutInput {
			sizes: vec![30.0; n],
			edges: (1..n).map(|i| (i - 1, i)).collect(),
		}
	}

	#[rstest]
	#[case(LayoutKind::Hierarchical, 99, true)]
	#[case(LayoutKind::Hierarchical, 100, false)]
	#[case(LayoutKind::ForceDirected, 149, true)]
	#[case(LayoutKind::ForceDirected, 150, false)]
	#[case(LayoutKind::Circular, 10_000, true)]
	#[case(LayoutKind::Grid, 10_000, true)]
	fn animation_thresholds(#[case] kind: LayoutKind, #[case] nodes: usize, #[case] animate: bool) {
		assert_eq!(kind.params(nodes).animate, animate);
	}

	#[rstest]
	#[case(20, Quality::Proof)]
	#[case(200, Quality::Default)]
	#[case(1_000, Quality::Draft)]
	fn force_quality_degrades_with_size(#[case] nodes: usize, #[case] quality: Quality) {
		let Strategy::ForceDirected(params) = LayoutKind::ForceDirected.params(nodes).strategy else {
			panic!("force-directed params expected");
		};
		assert_eq!(params.quality, quality);
		assert!(Quality::Draft.steps() < Quality::Proof.steps());
	}

	#[test]
	fn names_round_trip_through_choice() {
		for kind in LayoutKind::ALL {
			assert_eq!(LayoutKind::parse(kind.value()), Some(*kind));
		}
		assert_eq!(LayoutKind::parse("dagre"), None);
	}

	#[test]
	fn display_uses_the_wire_name() {
		assert_eq!(LayoutKind::ForceDirected.to_string(), "force-directed");
		assert_eq!(format!("{}", LayoutKind::Circular), "circular");
	}

	#[test]
	fn hierarchical_ranks_flow_left_to_right() {
		let pos = LayoutKind::Hierarchical.params(4).positions(&chain(4));
		assert!(pos.windows(2).all(|w| w[0].0 < w[1].0));
		assert!(pos.iter().all(|p| p.1.abs() < 1e-9));
	}

	#[test]
	fn cycles_do_not_break_ranking() {
		let input = LayoutInput {
			sizes: vec![30.0; 3],
			edges: vec![(0, 1), (1, 2), (2, 0), (1, 1)],
		};
		assert_eq!(ranks(3, &input.edges), vec![0, 1, 2]);
		let pos = LayoutKind::Hierarchical.params(3).positions(&input);
		assert_eq!(pos.len(), 3);
		assert!(pos.iter().all(|p| p.0.is_finite() && p.1.is_finite()));
	}

	#[test]
	fn siblings_in_a_rank_do_not_overlap() {
		let input = LayoutInput {
			sizes: vec![30.0, 60.0, 20.0],
			edges: vec![(0, 1), (0, 2)],
		};
		let pos = LayoutKind::Hierarchical.params(3).positions(&input);
		assert_eq!(pos[1].0, pos[2].0);
		let gap = (pos[1].1 - pos[2].1).abs();
		assert!(gap >= (60.0 + 20.0) / 2.0 + 40.0 - 1e-9);
	}

	#[test]
	fn circular_is_deterministic_and_equidistant() {
		let input = chain(8);
		let a = LayoutKind::Circular.params(8).positions(&input);
		let b = LayoutKind::Circular.params(8).positions(&input);
		assert_eq!(a, b);
		let r0 = a[0].0.hypot(a[0].1);
		assert!(a.iter().all(|p| (p.0.hypot(p.1) - r0).abs() < 1e-6));
	}

	#[test]
	fn grid_uses_square_columns() {
		let pos = LayoutKind::Grid.params(5).positions(&chain(5));
		let rows: std::collections::BTreeSet<i64> = pos.iter().map(|p| p.1.round() as i64).collect();
		assert_eq!(rows.len(), 2);
	}

	#[test]
	fn force_directed_places_every_node() {
		let pos = LayoutKind::ForceDirected.params(12).positions(&chain(12));
		assert_eq!(pos.len(), 12);
		assert!(pos.iter().all(|p| p.0.is_finite() && p.1.is_finite()));
	}

	#[test]
	fn empty_input_has_no_positions() {
		for kind in LayoutKind::ALL {
			assert!(kind.params(0).positions(&LayoutInput::default()).is_empty());
		}
	}
}
