//! Node and edge appearance.

pub const DEFAULT_COLOR: &str = "#8b949e";
pub const ROOT_FILL: &str = "#1f6feb";
pub const ROOT_BORDER: &str = "#58a6ff";
pub const BORDER: &str = "#30394a";
pub const EDGE_COLOR: &str = "#30394a";
pub const LABEL_COLOR: &str = "#c9d1d9";
pub const BACKGROUND: &str = "#0d1117";

pub const MIN_NODE_SIZE: f64 = 20.0;
pub const MAX_NODE_SIZE: f64 = 60.0;
pub const DEFAULT_NODE_SIZE: f64 = 30.0;

pub const LABEL_CAP: usize = 30;
const LABEL_KEEP: usize = 28;

const GROUP_COLORS: &[(&str, &str)] = &[
	("root", "#58a6ff"),
	("function", "#58a6ff"),
	("package", "#3fb950"),
	("type", "#bc8cff"),
	("variable", "#d29922"),
	("call", "#58a6ff"),
	("dfg", "#3fb950"),
	("parameter", "#d29922"),
	("return", "#f778ba"),
	("local", "#8b949e"),
	("field", "#bc8cff"),
];

pub fn group_color(group: Option<&str>) -> &'static str {
	group
		.and_then(|g| GROUP_COLORS.iter().find(|(name, _)| *name == g))
		.map_or(DEFAULT_COLOR, |(_, color)| color)
}

/// Label as drawn next to the node: over [`LABEL_CAP`] characters it is cut and
/// ellipsized.
pub fn display_label(label: &str) -> String {
	if label.chars().count() > LABEL_CAP {
		let mut cut: String = label.chars().take(LABEL_KEEP).collect();
		cut.push_str("...");
		cut
	} else {
		label.to_string()
	}
}

pub fn clamp_size(size: Option<f64>) -> f64 {
	match size {
		Some(s) if s.is_finite() => s.clamp(MIN_NODE_SIZE, MAX_NODE_SIZE),
		_ => DEFAULT_NODE_SIZE,
	}
}

/// Resolved appearance of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	pub fill: String,
	pub border: &'static str,
	pub border_width: f64,
	pub diameter: f64,
	pub label: String,
	pub full_label: String,
	pub emphasized: bool,
}

impl NodeStyle {
	pub fn resolve(node: &super::GraphNode) -> Self {
		let fill = match &node.color {
			Some(color) => color.clone(),
			None if node.is_root => ROOT_FILL.to_string(),
			None => group_color(node.group.as_deref()).to_string(),
		};
		Self {
			fill,
			border: if node.is_root { ROOT_BORDER } else { BORDER },
			border_width: if node.is_root { 3.0 } else { 2.0 },
			diameter: clamp_size(node.size),
			label: display_label(&node.label),
			full_label: node.label.clone(),
			emphasized: node.is_root,
		}
	}
}
