use leptos::prelude::*;
use leptos_router::components::A;

use crate::api::{ApiClient, DataFlowNode, SearchResult};
use crate::components::graph_view::{GraphData, GraphView, LayoutKind};
use crate::components::{
	ChoiceSelect, EmptyState, ErrorMessage, LoadingOverlay, SearchBar, source_href,
};
use crate::explorer::{
	CONTROLLER_SETTLE_POLICY, DATA_FLOW_LAYOUTS, DataFlowController, DataFlowEffect,
	DataFlowEvent, DataFlowQuery, FLOW_KIND_COLORS, data_flow_data,
};
use crate::params::{FlowDepth, FlowDirection};
use crate::query::use_lazy_query;

fn node_info(node: DataFlowNode, on_close: impl Fn() + Send + Sync + 'static) -> impl IntoView {
	let href = source_href(&node.file, node.line);
	let rows = [
		("Name", node.label),
		("Kind", node.kind),
		("File", node.file),
		("Line", node.line.to_string()),
		("Depth", node.depth.to_string()),
	];
	view! {
		<aside class="detail-panel">
			<header class="detail-header">
				<h3>"Selected Node"</h3>
				<button class="close" on:click=move |_| on_close()>
					"×"
				</button>
			</header>
			<dl class="info-rows">
				{rows
					.into_iter()
					.map(|(label, value)| {
						view! {
							<dt>{label}</dt>
							<dd>{value}</dd>
						}
					})
					.collect_view()}
			</dl>
			<div class="detail-actions">
				<A href=href attr:class="btn">
					"View Source"
				</A>
			</div>
		</aside>
	}
}

fn legend() -> impl IntoView {
	FLOW_KIND_COLORS
		.iter()
		.map(|&(kind, color)| {
			view! {
				<div class="legend-item">
					<span class="legend-dot" style=format!("background-color: {color}")></span>
					{kind}
				</div>
			}
		})
		.collect_view()
}

/// Data-flow slicer.
#[component]
pub fn DataFlowPage() -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let controller = RwSignal::new(DataFlowController::default());

	let slice = use_lazy_query(CONTROLLER_SETTLE_POLICY, move |q: DataFlowQuery| {
		let client = client.clone();
		async move { client.data_flow(&q.id, q.depth, q.direction).await }
	});

	let send = move |event: DataFlowEvent| {
		let effect = controller
			.try_update(|c| {
				let (next, effect) = std::mem::take(c).transition(event);
				*c = next;
				effect
			})
			.flatten();
		if let Some(DataFlowEffect::FetchGraph(q)) = effect {
			slice.execute(q);
		}
	};

	let data: Memo<GraphData> =
		Memo::new(move |_| slice.data().map(|g| data_flow_data(&g)).unwrap_or_default());
	let layout: Memo<LayoutKind> = Memo::new(move |_| controller.with(|c| c.layout));
	let has_root = move || controller.with(|c| c.root_id.is_some());

	let selected = move || {
		let graph = slice.data()?;
		let node = controller.with(|c| c.selected(&graph).cloned())?;
		Some(node_info(node, move || send(DataFlowEvent::CloseDetail)))
	};

	view! {
		<div class="explorer">
			<div class="explorer-main">
				<div class="toolbar">
					<SearchBar
						placeholder="Search variable or node..."
						on_select=move |r: SearchResult| send(DataFlowEvent::Search(r.id))
					/>
					<ChoiceSelect
						label="Depth"
						value=Signal::derive(move || controller.with(|c| c.depth))
						on_change=move |d: FlowDepth| send(DataFlowEvent::SetDepth(d))
					/>
					<ChoiceSelect
						label="Direction"
						value=Signal::derive(move || controller.with(|c| c.direction))
						on_change=move |d: FlowDirection| send(DataFlowEvent::SetDirection(d))
					/>
					<ChoiceSelect
						label="Layout"
						value=layout
						options=DATA_FLOW_LAYOUTS
						on_change=move |l: LayoutKind| send(DataFlowEvent::SetLayout(l))
					/>
					<Show when=has_root>
						<button class="btn" on:click=move |_| send(DataFlowEvent::Refresh)>
							"Refresh"
						</button>
					</Show>
				</div>
				<div class="graph-area">
					<GraphView
						data=data
						layout=layout
						on_node_click=move |id: String| send(DataFlowEvent::NodeClicked(id))
						on_node_dbl_click=move |id: String| {
							send(DataFlowEvent::NodeDoubleClicked(id))
						}
					/>
					<LoadingOverlay
						when=Signal::derive(move || slice.loading())
						message="Tracing data flow..."
					/>
					<ErrorMessage error=Signal::derive(move || slice.error()) />
					<EmptyState
						when=Signal::derive(move || !has_root() && !slice.loading())
						title="Data Flow Slicer"
						hint="Search for a variable, parameter, or function to trace data flow"
					/>
					<EmptyState
						when=Signal::derive(move || {
							has_root() && !slice.loading() && slice.has_data()
								&& data.with(GraphData::is_empty)
						})
						title="Empty slice"
						hint="Nothing flows from this node in the chosen direction"
					/>
					<Show when=move || !data.with(GraphData::is_empty)>
						<div class="graph-stats">
							{move || {
								data.with(|d| {
									format!("{} nodes, {} edges", d.nodes.len(), d.edges.len())
								})
							}}
						</div>
						<div class="legend">{legend()}</div>
					</Show>
				</div>
			</div>
			{selected}
		</div>
	}
}
