use leptos::prelude::*;
use leptos_router::components::A;
use url::form_urlencoded;

use super::ErrorMessage;
use crate::api::FunctionDetail;

/// Source browser location of `file`, scrolled to `line`.
pub fn source_href(file: &str, line: u32) -> String {
	let query = form_urlencoded::Serializer::new(String::new())
		.append_pair("file", file)
		.append_pair("line", &line.to_string())
		.finish();
	format!("/source?{query}")
}

/// Call graph page rooted at function `id`.
pub fn call_graph_href(id: &str) -> String {
	let query = form_urlencoded::Serializer::new(String::new())
		.append_pair("id", id)
		.finish();
	format!("/callgraph?{query}")
}

fn chips(names: Vec<&str>) -> impl IntoView + use<> {
	if names.is_empty() {
		return view! { <span class="muted">"none"</span> }.into_any();
	}
	names
		.into_iter()
		.map(|n| view! { <span class="chip">{n.to_string()}</span> })
		.collect_view()
		.into_any()
}

/// Metrics and neighbors of one function.
///
/// "Explore Calls" re-centers through `on_explore` when given, otherwise it links to
/// the call graph page. `error` is shown above the retained metrics.
#[component]
pub fn FunctionDetailPanel(
	detail: FunctionDetail,
	#[prop(into)] error: Signal<Option<String>>,
	#[prop(into)] on_close: Callback<()>,
	#[prop(optional, into)] on_explore: Option<Callback<String>>,
) -> impl IntoView {
	let f = &detail.function;
	let metrics = [
		("Complexity", f.complexity),
		("LOC", f.loc),
		("Fan In", f.fan_in),
		("Fan Out", f.fan_out),
		("Params", f.num_params),
		("Locals", detail.num_locals),
		("Calls", detail.num_calls),
		("Branches", detail.num_branches),
		("Returns", detail.num_returns),
	];
	let id = f.id.clone();
	let explore = match on_explore {
		Some(cb) => view! {
			<button class="btn" on:click=move |_| cb.run(id.clone())>
				"Explore Calls"
			</button>
		}
		.into_any(),
		None => view! {
			<A href=call_graph_href(&id) attr:class="btn">
				"Explore Calls"
			</A>
		}
		.into_any(),
	};

	view! {
		<aside class="detail-panel">
			<header class="detail-header">
				<h3>{f.name.clone()}</h3>
				<button class="close" on:click=move |_| on_close.run(())>
					"×"
				</button>
			</header>
			<ErrorMessage error=error />
			<code class="signature">{detail.signature.clone()}</code>
			<p class="location">{format!("{}:{}", f.file, f.line)}</p>
			<div class="metrics-grid">
				{metrics
					.into_iter()
					.map(|(name, value)| {
						view! {
							<div class="metric">
								<span class="metric-value">{value}</span>
								<span class="metric-label">{name}</span>
							</div>
						}
					})
					.collect_view()}
			</div>
			<p class="findings" class:has-findings={detail.finding_count > 0}>
				{format!("{} findings", detail.finding_count)}
			</p>
			<h4>"Callers"</h4>
			<div class="chips">{chips(detail.caller_names())}</div>
			<h4>"Callees"</h4>
			<div class="chips">{chips(detail.callee_names())}</div>
			<div class="detail-actions">
				<A href=source_href(&f.file, f.line) attr:class="btn">
					"View Source"
				</A>
				{explore}
			</div>
		</aside>
	}
}
