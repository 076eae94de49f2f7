use leptos::prelude::*;
use leptos_router::components::A;

use crate::api::{ApiClient, FunctionItem, PackageGraphNode, SearchResult};
use crate::components::graph_view::{GraphData, GraphView, LayoutKind};
use crate::components::{
	ChoiceSelect, EmptyState, ErrorMessage, LoadingOverlay, SearchBar, call_graph_href,
};
use crate::explorer::{
	CONTROLLER_SETTLE_POLICY, PACKAGE_FUNCTION_LIMIT, PACKAGE_LAYOUTS, PackageController,
	PackageEffect, PackageEvent, package_graph_data,
};
use crate::params::{PackageDepth, PackageDirection};
use crate::query::{use_lazy_query, use_query};

fn complexity_class(complexity: u32) -> &'static str {
	match complexity {
		c if c > 20 => "complexity high",
		c if c > 10 => "complexity medium",
		_ => "complexity",
	}
}

fn function_row(f: FunctionItem) -> impl IntoView {
	let badge = (f.complexity > 0).then(|| {
		view! { <span class=complexity_class(f.complexity)>{format!("C:{}", f.complexity)}</span> }
	});
	view! {
		<A href=call_graph_href(&f.id) attr:class="function-row">
			<div class="function-row-head">
				<span class="function-name">{f.name}</span>
				{badge}
			</div>
			<p class="function-location">{format!("{}:{}", f.file, f.line)}</p>
		</A>
	}
}

fn package_metrics(node: PackageGraphNode) -> impl IntoView {
	let metrics = [
		("Functions", node.function_count.to_string()),
		("LOC", node.total_loc.to_string()),
		("Complexity", node.total_complexity.to_string()),
		("Avg Complex.", format!("{:.1}", node.avg_complexity)),
	];
	view! {
		<div class="metrics-grid">
			{metrics
				.into_iter()
				.map(|(label, value)| {
					view! {
						<div class="metric">
							<span class="metric-value">{value}</span>
							<span class="metric-label">{label}</span>
						</div>
					}
				})
				.collect_view()}
		</div>
	}
}

/// Package dependency map.
#[component]
pub fn PackageMapPage() -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let controller = RwSignal::new(PackageController::default());

	let graph = use_query(|| (), {
		let client = client.clone();
		move |()| {
			let client = client.clone();
			async move { client.package_graph().await }
		}
	});
	let functions = use_lazy_query(CONTROLLER_SETTLE_POLICY, move |name: String| {
		let client = client.clone();
		async move { client.package_functions(&name, PACKAGE_FUNCTION_LIMIT).await }
	});

	let send = move |event: PackageEvent| {
		let effect = controller
			.try_update(|c| {
				let (next, effect) = std::mem::take(c).transition(event);
				*c = next;
				effect
			})
			.flatten();
		match effect {
			Some(PackageEffect::FetchGraph) => graph.refetch(),
			Some(PackageEffect::FetchFunctions(name)) => functions.execute(name),
			None => {}
		}
	};

	let data: Memo<GraphData> = Memo::new(move |_| {
		let view = controller.with(|c| c.applied.clone());
		graph
			.data()
			.map(|g| package_graph_data(&g, &view))
			.unwrap_or_default()
	});
	let layout: Memo<LayoutKind> = Memo::new(move |_| controller.with(|c| c.layout));
	let focused = move || controller.with(|c| c.applied.focus.is_some());

	let sidebar = move || {
		let name = controller.with(|c| c.selected_id.clone())?;
		let node = graph
			.data()
			.and_then(|g| controller.with(|c| c.selected(&g).cloned()));
		let list = move || {
			if functions.loading() {
				return view! { <div class="skeleton-list"></div> }.into_any();
			}
			match functions.data() {
				Some(fs) if !fs.is_empty() => view! {
					<div class="function-list">
						{fs.into_iter().map(function_row).collect_view()}
					</div>
				}
				.into_any(),
				_ => view! { <p class="muted">"No functions found"</p> }.into_any(),
			}
		};
		Some(view! {
			<aside class="detail-panel">
				<header class="detail-header">
					<h3 title=name.clone()>{name.clone()}</h3>
					<button class="close" on:click=move |_| send(PackageEvent::CloseDetail)>
						"×"
					</button>
				</header>
				{node.map(package_metrics)}
				<h4>"Functions"</h4>
				<ErrorMessage error=Signal::derive(move || functions.error()) />
				{list}
			</aside>
		})
	};

	view! {
		<div class="explorer">
			<div class="explorer-main">
				<div class="toolbar">
					<h2 class="toolbar-title">"Package Architecture"</h2>
					<SearchBar
						placeholder="Focus on a package..."
						kind="package"
						on_select=move |r: SearchResult| send(PackageEvent::Search(r.name))
					/>
					<ChoiceSelect
						label="Depth"
						value=Signal::derive(move || controller.with(|c| c.depth))
						on_change=move |d: PackageDepth| send(PackageEvent::SetDepth(d))
					/>
					<ChoiceSelect
						label="Direction"
						value=Signal::derive(move || controller.with(|c| c.direction))
						on_change=move |d: PackageDirection| send(PackageEvent::SetDirection(d))
					/>
					<ChoiceSelect
						label="Layout"
						value=layout
						options=PACKAGE_LAYOUTS
						on_change=move |l: LayoutKind| send(PackageEvent::SetLayout(l))
					/>
					<button class="btn" on:click=move |_| send(PackageEvent::Refresh)>
						"Refresh"
					</button>
					<Show when=focused>
						<button class="btn" on:click=move |_| send(PackageEvent::ClearFocus)>
							"Show All"
						</button>
					</Show>
					<span class="toolbar-stats">
						{move || {
							data.with(|d| {
								format!(
									"{} packages, {} dependencies",
									d.nodes.len(),
									d.edges.len(),
								)
							})
						}}
					</span>
				</div>
				<div class="graph-area">
					<GraphView
						data=data
						layout=layout
						on_node_click=move |id: String| send(PackageEvent::NodeClicked(id))
						on_node_dbl_click=move |id: String| send(PackageEvent::NodeDoubleClicked(id))
					/>
					<LoadingOverlay
						when=Signal::derive(move || graph.loading())
						message="Loading package graph..."
					/>
					<ErrorMessage error=Signal::derive(move || graph.error()) />
					<EmptyState
						when=Signal::derive(move || {
							!graph.loading() && graph.has_data() && data.with(GraphData::is_empty)
						})
						title="No packages"
						hint="Nothing matches the current focus"
					/>
				</div>
			</div>
			{sidebar}
		</div>
	}
}
