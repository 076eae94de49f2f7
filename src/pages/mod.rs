pub mod call_graph;
pub mod dashboard;
pub mod data_flow;
pub mod not_found;
pub mod package_map;
pub mod source_view;
