//! Wire types returned by the CPG query service.
//!
//! Every field defaults when missing, and list fields also accept `null`, so a response
//! whose shape drifts degrades to empty values instead of failing to decode.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Aggregate counters for the whole graph. The service reports them as strings.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overview {
	pub total_packages: String,
	pub total_files: String,
	pub total_functions: String,
	pub total_types: String,
	pub total_nodes: String,
	pub total_edges: String,
	pub total_loc: String,
	pub avg_complexity: String,
	pub max_complexity: String,
	pub total_call_edges: String,
	pub total_dfg_edges: String,
	pub total_cfg_edges: String,
	pub total_goroutine_launches: String,
	pub total_defers: String,
	pub total_findings: String,
	pub total_interfaces: String,
}

/// One bar of a histogram.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Distribution {
	/// Bucket name.
	pub label: String,
	/// Items in the bucket.
	pub count: u64,
	/// Share of the total, when the service computed one.
	pub percentage: Option<f64>,
}

/// Histograms shown on the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Distributions {
	/// Node counts per node kind.
	#[serde(deserialize_with = "null_as_default")]
	pub node_kinds: Vec<Distribution>,
	/// Edge counts per edge kind.
	#[serde(deserialize_with = "null_as_default")]
	pub edge_kinds: Vec<Distribution>,
	/// Function counts per complexity bucket.
	#[serde(deserialize_with = "null_as_default")]
	pub complexity: Vec<Distribution>,
}

/// Package with aggregate metrics.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
	pub name: String,
	pub file_count: u32,
	pub function_count: u32,
	pub total_loc: u32,
	pub total_complexity: u32,
	pub avg_complexity: f64,
	pub max_complexity: u32,
	pub type_count: u32,
	pub interface_count: u32,
}

/// Node of the package dependency graph.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageGraphNode {
	pub id: String,
	pub label: String,
	pub function_count: u32,
	pub total_loc: u32,
	pub total_complexity: u32,
	pub avg_complexity: f64,
}

/// Import dependency between two packages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageGraphEdge {
	/// Importing package.
	pub source: String,
	/// Imported package.
	pub target: String,
	/// Number of call edges crossing the dependency.
	pub weight: u32,
}

/// Whole package dependency graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageGraph {
	/// Packages.
	#[serde(deserialize_with = "null_as_default")]
	pub nodes: Vec<PackageGraphNode>,
	/// Dependencies.
	#[serde(deserialize_with = "null_as_default")]
	pub edges: Vec<PackageGraphEdge>,
}

/// Function row as listed by package and search endpoints.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionItem {
	pub id: String,
	pub name: String,
	pub package: String,
	pub file: String,
	pub line: u32,
	pub end_line: u32,
	pub complexity: u32,
	pub fan_in: u32,
	pub fan_out: u32,
	pub loc: u32,
	pub num_params: u32,
}

/// Function with its full metric set. `callers` and `callees` are comma-separated names.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDetail {
	#[serde(flatten)]
	pub function: FunctionItem,
	pub signature: String,
	pub num_locals: u32,
	pub num_calls: u32,
	pub num_branches: u32,
	pub num_returns: u32,
	pub finding_count: u32,
	pub callers: String,
	pub callees: String,
}

impl FunctionDetail {
	/// Caller names, trimmed, without empty entries.
	pub fn caller_names(&self) -> Vec<&str> {
		split_names(&self.callers)
	}

	/// Callee names, trimmed, without empty entries.
	pub fn callee_names(&self) -> Vec<&str> {
		split_names(&self.callees)
	}
}

fn split_names(list: &str) -> Vec<&str> {
	list.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Function node of a call graph neighborhood.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallGraphNode {
	pub id: String,
	pub label: String,
	pub package: String,
	pub file: String,
	pub line: u32,
	pub complexity: u32,
	pub fan_in: u32,
	pub fan_out: u32,
	pub is_root: bool,
	pub depth: u32,
}

/// Call from `source` to `target`.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallGraphEdge {
	pub source: String,
	pub target: String,
	pub kind: String,
}

/// Call graph neighborhood of a root function.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallGraph {
	/// Functions, root included.
	#[serde(deserialize_with = "null_as_default")]
	pub nodes: Vec<CallGraphNode>,
	/// Calls between them.
	#[serde(deserialize_with = "null_as_default")]
	pub edges: Vec<CallGraphEdge>,
}

/// Node of a data-flow slice. `depth` is the hop distance from the slice origin.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFlowNode {
	pub id: String,
	pub label: String,
	pub kind: String,
	pub file: String,
	pub line: u32,
	pub depth: u32,
}

/// Definition-use edge.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFlowEdge {
	pub source: String,
	pub target: String,
}

/// Data-flow slice around one node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFlowGraph {
	/// Slice members, origin included.
	#[serde(deserialize_with = "null_as_default")]
	pub nodes: Vec<DataFlowNode>,
	/// Flow edges between them.
	#[serde(deserialize_with = "null_as_default")]
	pub edges: Vec<DataFlowEdge>,
}

/// Raw file contents.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFile {
	pub file: String,
	pub content: String,
	pub package: String,
}

/// Function ranked by the composite risk score.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotspot {
	pub function_id: String,
	pub name: String,
	pub package: String,
	pub file: String,
	pub complexity: u32,
	pub loc: u32,
	pub fan_in: u32,
	pub fan_out: u32,
	pub finding_count: u32,
	pub hotspot_score: f64,
}

/// Entity hit of the global symbol search.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
	pub id: String,
	pub name: String,
	pub kind: String,
	pub package: String,
	pub file: String,
	pub line: u32,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn null_edge_list_decodes_as_empty() {
		let graph: CallGraph = serde_json::from_str(
			r#"{"nodes":[{"id":"fn:a","label":"a","is_root":true}],"edges":null}"#,
		)
		.unwrap();
		assert_eq!(graph.nodes.len(), 1);
		assert!(graph.nodes[0].is_root);
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn missing_fields_default() {
		let node: DataFlowNode = serde_json::from_str(r#"{"id":"n1"}"#).unwrap();
		assert_eq!(node.kind, "");
		assert_eq!(node.depth, 0);
	}

	#[test]
	fn function_detail_flattens_function_fields() {
		let detail: FunctionDetail = serde_json::from_str(
			r#"{"id":"fn:x","name":"x","complexity":7,"signature":"func x()","callers":"a, b,,c","callees":""}"#,
		)
		.unwrap();
		assert_eq!(detail.function.id, "fn:x");
		assert_eq!(detail.function.complexity, 7);
		assert_eq!(detail.caller_names(), vec!["a", "b", "c"]);
		assert!(detail.callee_names().is_empty());
	}
}
