use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::api::{ApiClient, SearchResult};
use crate::components::graph_view::{GraphData, GraphView, LayoutKind};
use crate::components::{
	ChoiceSelect, EmptyState, ErrorMessage, FunctionDetailPanel, LoadingOverlay, SearchBar,
};
use crate::explorer::{
	CALL_GRAPH_LAYOUTS, CONTROLLER_SETTLE_POLICY, CallGraphController, CallGraphEffect,
	CallGraphEvent, CallGraphQuery, call_graph_data,
};
use crate::params::{CallDepth, CallDirection};
use crate::query::use_lazy_query;

/// What the detail column shows for the current selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DetailPane {
	Hidden,
	Loading,
	/// The last loaded detail, with any later failure shown above it.
	Retained,
	/// Nothing loaded yet; only the failure and a close button.
	Failed,
}

fn detail_pane(selected: bool, loading: bool, has_data: bool) -> DetailPane {
	match (selected, loading, has_data) {
		(false, ..) => DetailPane::Hidden,
		(true, true, _) => DetailPane::Loading,
		(true, false, true) => DetailPane::Retained,
		(true, false, false) => DetailPane::Failed,
	}
}

/// Call graph explorer. `?id=` starts at that function.
#[component]
pub fn CallGraphPage() -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let controller = RwSignal::new(CallGraphController::default());

	let graph = use_lazy_query(CONTROLLER_SETTLE_POLICY, {
		let client = client.clone();
		move |q: CallGraphQuery| {
			let client = client.clone();
			async move { client.call_graph(&q.id, q.depth, q.direction).await }
		}
	});
	let detail = use_lazy_query(CONTROLLER_SETTLE_POLICY, move |id: String| {
		let client = client.clone();
		async move { client.function_detail(&id).await }
	});

	let send = move |event: CallGraphEvent| {
		let effect = controller
			.try_update(|c| {
				let (next, effect) = std::mem::take(c).transition(event);
				*c = next;
				effect
			})
			.flatten();
		match effect {
			Some(CallGraphEffect::FetchGraph(q)) => graph.execute(q),
			Some(CallGraphEffect::FetchDetail(id)) => detail.execute(id),
			None => {}
		}
	};

	let query = use_query_map();
	Effect::new(move |_| {
		let Some(id) = query.with(|q| q.get("id")).filter(|id| !id.is_empty()) else {
			return;
		};
		if controller.with_untracked(|c| c.root_id.as_deref() != Some(id.as_str())) {
			send(CallGraphEvent::Search(id));
		}
	});

	let data: Memo<GraphData> =
		Memo::new(move |_| graph.data().map(|g| call_graph_data(&g)).unwrap_or_default());
	let layout: Memo<LayoutKind> = Memo::new(move |_| controller.with(|c| c.layout));
	let has_root = move || controller.with(|c| c.root_id.is_some());

	let detail_error = Signal::derive(move || detail.error());
	let close = move |_: ()| send(CallGraphEvent::CloseDetail);
	let detail_panel = move || {
		let selected = controller.with(|c| c.selected_id.is_some());
		match detail_pane(selected, detail.loading(), detail.has_data()) {
			DetailPane::Hidden => None,
			DetailPane::Loading => Some(
				view! {
					<aside class="detail-panel">
						<div class="spinner"></div>
					</aside>
				}
				.into_any(),
			),
			DetailPane::Retained => detail.data().map(|d| {
				view! {
					<FunctionDetailPanel
						detail=d
						error=detail_error
						on_close=close
						on_explore=move |id: String| send(CallGraphEvent::Explore(id))
					/>
				}
				.into_any()
			}),
			DetailPane::Failed => Some(
				view! {
					<aside class="detail-panel">
						<header class="detail-header">
							<h3>"Function"</h3>
							<button class="close" on:click=move |_| close(())>
								"×"
							</button>
						</header>
						<ErrorMessage error=detail_error />
					</aside>
				}
				.into_any(),
			),
		}
	};

	view! {
		<div class="explorer">
			<div class="explorer-main">
				<div class="toolbar">
					<SearchBar
						placeholder="Search function to explore..."
						kind="function"
						on_select=move |r: SearchResult| send(CallGraphEvent::Search(r.id))
					/>
					<ChoiceSelect
						label="Depth"
						value=Signal::derive(move || controller.with(|c| c.depth))
						on_change=move |d: CallDepth| send(CallGraphEvent::SetDepth(d))
					/>
					<ChoiceSelect
						label="Direction"
						value=Signal::derive(move || controller.with(|c| c.direction))
						on_change=move |d: CallDirection| send(CallGraphEvent::SetDirection(d))
					/>
					<ChoiceSelect
						label="Layout"
						value=layout
						options=CALL_GRAPH_LAYOUTS
						on_change=move |l: LayoutKind| send(CallGraphEvent::SetLayout(l))
					/>
					<Show when=has_root>
						<button class="btn" on:click=move |_| send(CallGraphEvent::Refresh)>
							"Refresh"
						</button>
					</Show>
				</div>
				<div class="graph-area">
					<GraphView
						data=data
						layout=layout
						on_node_click=move |id: String| send(CallGraphEvent::NodeClicked(id))
						on_node_dbl_click=move |id: String| {
							send(CallGraphEvent::NodeDoubleClicked(id))
						}
					/>
					<LoadingOverlay
						when=Signal::derive(move || graph.loading())
						message="Loading call graph..."
					/>
					<ErrorMessage error=Signal::derive(move || graph.error()) />
					<EmptyState
						when=Signal::derive(move || !has_root() && !graph.loading())
						title="Call Graph Explorer"
						hint="Search for a function to visualize its call graph"
					/>
					<EmptyState
						when=Signal::derive(move || {
							has_root() && !graph.loading() && graph.has_data()
								&& data.with(GraphData::is_empty)
						})
						title="No calls"
						hint="The function has no callers or callees at this depth"
					/>
					<Show when=move || !data.with(GraphData::is_empty)>
						<div class="graph-stats">
							{move || {
								data.with(|d| {
									format!("{} nodes, {} edges", d.nodes.len(), d.edges.len())
								})
							}}
						</div>
					</Show>
				</div>
			</div>
			{detail_panel}
		</div>
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;
	use crate::api::{FunctionDetail, FunctionItem};
	use crate::query::QueryMachine;

	#[rstest]
	#[case(false, true, true, DetailPane::Hidden)]
	#[case(true, true, false, DetailPane::Loading)]
	#[case(true, false, true, DetailPane::Retained)]
	#[case(true, false, false, DetailPane::Failed)]
	fn pane_follows_selection_and_query(
		#[case] selected: bool,
		#[case] loading: bool,
		#[case] has_data: bool,
		#[case] pane: DetailPane,
	) {
		assert_eq!(detail_pane(selected, loading, has_data), pane);
	}

	#[test]
	fn failed_detail_for_a_new_selection_is_surfaced_beside_the_old_one() {
		let detail = |id: &str| FunctionDetail {
			function: FunctionItem {
				id: id.into(),
				..FunctionItem::default()
			},
			..FunctionDetail::default()
		};
		let mut m = QueryMachine::new(CONTROLLER_SETTLE_POLICY);
		let a = m.begin();
		m.settle(a, Ok(detail("fn:a")));
		let b = m.begin();
		m.settle(b, Err(crate::api::ApiError::from_response(404, "")));

		let state = m.state();
		assert_eq!(
			detail_pane(true, state.loading, state.data.is_some()),
			DetailPane::Retained
		);
		assert!(state.error.is_some());
	}
}
