use std::collections::{HashMap, HashSet};

use super::layout::{LayoutInput, LayoutKind, LayoutParams, bounds};
use super::style::{EDGE_COLOR, NodeStyle};
use super::types::GraphData;

pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 5.0;
const FIT_MAX_ZOOM: f64 = 1.5;
const FIT_PADDING: f64 = 30.0;
const DRAG_THRESHOLD: f64 = 3.0;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Debug)]
pub struct SceneNode {
	pub id: String,
	pub style: NodeStyle,
	pub x: f64,
	pub y: f64,
	start: (f64, f64),
	target: (f64, f64),
	pinned: bool,
}

impl SceneNode {
	pub fn radius(&self) -> f64 {
		self.style.diameter / 2.0
	}
}

#[derive(Clone, Debug)]
pub struct SceneEdge {
	pub source: usize,
	pub target: usize,
	pub label: Option<String>,
	pub color: String,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
	pub prev_node: Option<usize>,
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

/// Everything one renderer draws: styled nodes, validated edges, layout positions and
/// the interaction state of the surface.
pub struct GraphScene {
	pub nodes: Vec<SceneNode>,
	pub edges: Vec<SceneEdge>,
	pub layout: LayoutKind,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	params: LayoutParams,
	elapsed_ms: f64,
	index: HashMap<String, usize>,
	suppress_click: bool,
	pub dropped_nodes: usize,
	pub dropped_edges: usize,
}

impl GraphScene {
	/// Builds a scene from scratch. Duplicate node ids keep their first occurrence;
	/// edges naming an unknown id are dropped.
	pub fn build(data: &GraphData, layout: LayoutKind, width: f64, height: f64) -> Self {
		let mut index = HashMap::with_capacity(data.nodes.len());
		let mut nodes = Vec::with_capacity(data.nodes.len());
		for node in &data.nodes {
			if index.contains_key(&node.id) {
				continue;
			}
			index.insert(node.id.clone(), nodes.len());
			nodes.push(SceneNode {
				id: node.id.clone(),
				style: NodeStyle::resolve(node),
				x: 0.0,
				y: 0.0,
				start: (0.0, 0.0),
				target: (0.0, 0.0),
				pinned: false,
			});
		}

		let edges: Vec<SceneEdge> = data
			.edges
			.iter()
			.filter_map(|e| {
				let (&source, &target) = (index.get(&e.source)?, index.get(&e.target)?);
				Some(SceneEdge {
					source,
					target,
					label: e.label.clone(),
					color: e.color.clone().unwrap_or_else(|| EDGE_COLOR.to_string()),
				})
			})
			.collect();

		let params = layout.params(nodes.len());
		let input = LayoutInput {
			sizes: nodes.iter().map(|n| n.style.diameter).collect(),
			edges: edges.iter().map(|e| (e.source, e.target)).collect(),
		};
		for (node, (x, y)) in nodes.iter_mut().zip(params.positions(&input)) {
			node.target = (x, y);
			node.start = if params.animate {
				(x * 0.2, y * 0.2)
			} else {
				(x, y)
			};
			(node.x, node.y) = node.start;
		}

		let mut scene = Self {
			dropped_nodes: data.nodes.len() - nodes.len(),
			dropped_edges: data.edges.len() - edges.len(),
			nodes,
			edges,
			layout,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			params,
			elapsed_ms: 0.0,
			index,
			suppress_click: false,
		};
		scene.fit();
		scene
	}

	pub fn params(&self) -> &LayoutParams {
		&self.params
	}

	#[cfg(test)]
	pub fn node_ids(&self) -> HashSet<&str> {
		self.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	/// `(source id, target id)` of every kept edge, sorted.
	#[cfg(test)]
	pub fn edge_keys(&self) -> Vec<(&str, &str)> {
		let mut keys: Vec<_> = self
			.edges
			.iter()
			.map(|e| {
				(
					self.nodes[e.source].id.as_str(),
					self.nodes[e.target].id.as_str(),
				)
			})
			.collect();
		keys.sort_unstable();
		keys
	}

	pub fn node(&self, id: &str) -> Option<&SceneNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Zooms and centers so that the final layout fits the surface.
	pub fn fit(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let targets: Vec<_> = self.nodes.iter().map(|n| n.target).collect();
		let (x0, x1, y0, y1) = bounds(&targets);
		let pad = FIT_PADDING
			+ self
				.nodes
				.iter()
				.map(|n| n.style.diameter)
				.fold(0.0, f64::max);
		let (bw, bh) = ((x1 - x0) + 2.0 * pad, (y1 - y0) + 2.0 * pad);
		let k = (self.width / bw)
			.min(self.height / bh)
			.clamp(MIN_ZOOM, FIT_MAX_ZOOM);
		let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a surface point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.nodes
			.iter()
			.rposition(|n| (n.x - gx).hypot(n.y - gy) <= n.radius())
	}

	pub fn node_id_at(&self, sx: f64, sy: f64) -> Option<&str> {
		self.node_at_position(sx, sy)
			.map(|i| self.nodes[i].id.as_str())
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// keep the previous highlight around while it fades out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for e in &self.edges {
				if e.source == idx {
					self.hover.neighbors.insert(e.target);
				} else if e.target == idx {
					self.hover.neighbors.insert(e.source);
				}
			}
		}
	}

	pub fn hovered_label(&self) -> Option<&str> {
		self.hover
			.node
			.map(|i| self.nodes[i].style.full_label.as_str())
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn animating(&self) -> bool {
		self.params.animate && self.elapsed_ms < self.params.animation_ms
	}

	/// Advances the layout tween and the hover fade by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		if self.animating() {
			self.elapsed_ms = (self.elapsed_ms + dt * 1000.0).min(self.params.animation_ms);
			let t = ease_out_cubic(self.elapsed_ms / self.params.animation_ms);
			for node in self.nodes.iter_mut().filter(|n| !n.pinned) {
				node.x = node.start.0 + (node.target.0 - node.start.0) * t;
				node.y = node.start.1 + (node.target.1 - node.start.1) * t;
			}
		}

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Starts dragging the node under the pointer, or panning when there is none.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		self.suppress_click = false;
		if let Some(idx) = self.node_at_position(x, y) {
			self.drag = DragState {
				node: Some(idx),
				start_x: x,
				start_y: y,
				node_start_x: self.nodes[idx].x,
				node_start_y: self.nodes[idx].y,
				moved: false,
			};
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
				moved: false,
			};
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if let Some(idx) = self.drag.node {
			let (dx, dy) = (x - self.drag.start_x, y - self.drag.start_y);
			if dx.hypot(dy) > DRAG_THRESHOLD {
				self.drag.moved = true;
			}
			if self.drag.moved {
				let node = &mut self.nodes[idx];
				node.x = self.drag.node_start_x + dx / self.transform.k;
				node.y = self.drag.node_start_y + dy / self.transform.k;
				node.pinned = true;
			}
		} else if self.pan.active {
			let (dx, dy) = (x - self.pan.start_x, y - self.pan.start_y);
			if dx.hypot(dy) > DRAG_THRESHOLD {
				self.pan.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
		} else {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}
	}

	pub fn pointer_up(&mut self) {
		self.suppress_click = self.drag.moved || self.pan.moved;
		self.drag = DragState::default();
		self.pan = PanState::default();
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.set_hover(None);
	}

	/// Node id a click at this point refers to. Clicks ending a drag and clicks on empty
	/// canvas yield nothing.
	pub fn click_target(&mut self, x: f64, y: f64) -> Option<String> {
		if std::mem::take(&mut self.suppress_click) {
			return None;
		}
		self.node_id_at(x, y).map(str::to_string)
	}

	/// Zooms around a surface point; `zoom_in` picks the direction.
	pub fn zoom_at(&mut self, x: f64, y: f64, zoom_in: bool) {
		let factor = if zoom_in { 1.1 } else { 0.9 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}
}
