use leptos::prelude::*;
use leptos_router::components::A;

use crate::api::{ApiClient, Distribution, Hotspot, Overview};
use crate::components::{ErrorMessage, LoadingOverlay, call_graph_href};
use crate::query::use_query;

const HOTSPOT_LIMIT: u32 = 15;
const EDGE_KIND_LIMIT: usize = 10;

fn stat_cards(o: &Overview) -> [(&'static str, &str); 16] {
	[
		("Packages", o.total_packages.as_str()),
		("Files", o.total_files.as_str()),
		("Functions", o.total_functions.as_str()),
		("Types", o.total_types.as_str()),
		("Nodes", o.total_nodes.as_str()),
		("Edges", o.total_edges.as_str()),
		("Lines of Code", o.total_loc.as_str()),
		("Avg Complexity", o.avg_complexity.as_str()),
		("Call Edges", o.total_call_edges.as_str()),
		("DFG Edges", o.total_dfg_edges.as_str()),
		("CFG Edges", o.total_cfg_edges.as_str()),
		("Findings", o.total_findings.as_str()),
		("Goroutines", o.total_goroutine_launches.as_str()),
		("Defers", o.total_defers.as_str()),
		("Interfaces", o.total_interfaces.as_str()),
		("Max Complexity", o.max_complexity.as_str()),
	]
}

/// Bar width in percent of the widest bar. Empty histograms draw nothing.
fn bar_width(count: u64, max: u64) -> f64 {
	if max == 0 {
		return 0.0;
	}
	count as f64 / max as f64 * 100.0
}

fn bars(items: Vec<Distribution>) -> impl IntoView {
	let max = items.iter().map(|d| d.count).max().unwrap_or(0);
	items
		.into_iter()
		.map(|d| {
			let width = format!("width: {:.1}%", bar_width(d.count, max));
			view! {
				<div class="bar-row">
					<span class="bar-label">{d.label}</span>
					<div class="bar-track">
						<div class="bar-fill" style=width></div>
					</div>
					<span class="bar-count">{d.count}</span>
				</div>
			}
		})
		.collect_view()
}

fn hotspot_row(h: Hotspot) -> impl IntoView {
	view! {
		<tr>
			<td>
				<A href=call_graph_href(&h.function_id) attr:class="hotspot-link">
					{h.name}
				</A>
			</td>
			<td class="muted">{h.package}</td>
			<td>{h.complexity}</td>
			<td>{h.loc}</td>
			<td>{h.fan_in}</td>
			<td>{h.fan_out}</td>
			<td>{h.finding_count}</td>
			<td>{format!("{:.1}", h.hotspot_score)}</td>
		</tr>
	}
}

/// Overview counters, histograms and the most complex functions.
#[component]
pub fn DashboardPage() -> impl IntoView {
	let client = expect_context::<ApiClient>();

	let overview = use_query(|| (), {
		let client = client.clone();
		move |()| {
			let client = client.clone();
			async move { client.overview().await }
		}
	});
	let distributions = use_query(|| (), {
		let client = client.clone();
		move |()| {
			let client = client.clone();
			async move { client.distributions().await }
		}
	});
	let hotspots = use_query(|| (), move |()| {
		let client = client.clone();
		async move { client.hotspots(HOTSPOT_LIMIT).await }
	});

	let cards = move || {
		overview.data().map(|o| {
			stat_cards(&o)
				.into_iter()
				.map(|(label, value)| {
					let value = value.to_string();
					view! {
						<div class="stat-card">
							<span class="stat-value">{value}</span>
							<span class="stat-label">{label}</span>
						</div>
					}
				})
				.collect_view()
		})
	};

	let complexity = move || distributions.data().map(|d| bars(d.complexity));
	let edge_kinds = move || {
		distributions.data().map(|d| {
			let mut kinds = d.edge_kinds;
			kinds.truncate(EDGE_KIND_LIMIT);
			bars(kinds)
		})
	};
	let hotspot_rows =
		move || hotspots.data().map(|hs| hs.into_iter().map(hotspot_row).collect_view());

	view! {
		<div class="dashboard">
			<h2>"Overview"</h2>
			<section class="stat-grid">
				<LoadingOverlay
					when=Signal::derive(move || overview.loading())
					message="Loading overview..."
				/>
				<ErrorMessage error=Signal::derive(move || overview.error()) />
				{cards}
			</section>
			<div class="dashboard-charts">
				<section class="card">
					<h3>"Complexity Distribution"</h3>
					<ErrorMessage error=Signal::derive(move || distributions.error()) />
					{complexity}
				</section>
				<section class="card">
					<h3>"Edge Kinds"</h3>
					{edge_kinds}
				</section>
			</div>
			<section class="card">
				<h3>"Complexity Hotspots"</h3>
				<ErrorMessage error=Signal::derive(move || hotspots.error()) />
				<table class="hotspot-table">
					<thead>
						<tr>
							<th>"Function"</th>
							<th>"Package"</th>
							<th>"Complexity"</th>
							<th>"LOC"</th>
							<th>"Fan In"</th>
							<th>"Fan Out"</th>
							<th>"Findings"</th>
							<th>"Score"</th>
						</tr>
					</thead>
					<tbody>{hotspot_rows}</tbody>
				</table>
			</section>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(0, 0, 0.0)]
	#[case(5, 0, 0.0)]
	#[case(10, 10, 100.0)]
	#[case(5, 20, 25.0)]
	fn bars_scale_to_the_widest(#[case] count: u64, #[case] max: u64, #[case] width: f64) {
		assert_eq!(bar_width(count, max), width);
	}

	#[test]
	fn every_counter_gets_a_card() {
		let o = Overview {
			total_goroutine_launches: "7".into(),
			max_complexity: "42".into(),
			..Overview::default()
		};
		let cards = stat_cards(&o);
		assert!(cards.contains(&("Goroutines", "7")));
		assert_eq!(cards.last(), Some(&("Max Complexity", "42")));
	}
}
